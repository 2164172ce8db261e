//! Progress reporting for a batch run.
//!
//! The pipeline produces a finite stream of [`ProgressEvent`]s over an
//! unbounded channel; the caller drains the receiver to drive its display.

use crate::pipeline::BatchOutcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Aggregate progress went back to 0. Sent before and after every run.
    Reset,
    Started {
        index: usize,
        total: usize,
        file_name: String,
    },
    /// Aggregate progress across the whole batch, 0..=100.
    Progress(u8),
    /// A failed attempt is about to be retried. `attempt` is the upcoming attempt number.
    Retrying { index: usize, attempt: u32 },
    ImageUploaded { index: usize },
    Finished(BatchOutcome),
    Celebrate,
}

pub type ProgressSender = UnboundedSender<ProgressEvent>;
pub type ProgressReceiver = UnboundedReceiver<ProgressEvent>;

pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    unbounded_channel()
}

/// `round(((index + fraction) / total) * 100)`, clamped to 0..=100.
pub fn aggregate_percent(index: usize, fraction: f64, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let pct = ((index as f64 + fraction) / total as f64) * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}

/// Maps the byte progress of one upload attempt of image `index` onto the batch.
///
/// Cloned into the request body stream, so it is cheap to clone and `'static`.
/// Ticks that would move backwards within the same attempt are dropped.
#[derive(Debug, Clone)]
pub struct AttemptProgress {
    index: usize,
    total: usize,
    sender: Option<ProgressSender>,
    last_fraction: Arc<AtomicU64>,
}

impl AttemptProgress {
    pub fn new(index: usize, total: usize, sender: ProgressSender) -> Self {
        Self {
            index,
            total,
            sender: Some(sender),
            last_fraction: Arc::new(AtomicU64::new(0f64.to_bits())),
        }
    }

    /// A reporter that goes nowhere, for one-off uploads.
    pub fn detached() -> Self {
        Self {
            index: 0,
            total: 1,
            sender: None,
            last_fraction: Arc::new(AtomicU64::new(0f64.to_bits())),
        }
    }

    /// Fresh reporter for the next attempt of the same image; starts again from 0.
    pub fn restart(&self) -> Self {
        let next = Self {
            index: self.index,
            total: self.total,
            sender: self.sender.clone(),
            last_fraction: Arc::new(AtomicU64::new(0f64.to_bits())),
        };
        next.emit(0.0);
        next
    }

    pub fn report(&self, fraction: f64) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let previous = f64::from_bits(self.last_fraction.load(Ordering::Relaxed));
        if fraction < previous {
            return;
        }
        self.last_fraction.store(fraction.to_bits(), Ordering::Relaxed);
        self.emit(fraction);
    }

    /// Announces that attempt number `attempt` of this image is about to start.
    pub fn notify_retry(&self, attempt: u32) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(ProgressEvent::Retrying {
                index: self.index,
                attempt,
            });
        }
    }

    pub fn fraction(&self) -> f64 {
        f64::from_bits(self.last_fraction.load(Ordering::Relaxed))
    }

    fn emit(&self, fraction: f64) {
        if let Some(sender) = &self.sender {
            // The caller may have stopped listening; progress is best effort.
            let _ = sender.send(ProgressEvent::Progress(aggregate_percent(
                self.index, fraction, self.total,
            )));
        }
    }
}
