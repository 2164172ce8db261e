use crate::client::UploadTransport;
use crate::config::Quality;
use crate::error::{Result, ShareError};
use crate::processing::compress_image;
use crate::progress::{aggregate_percent, AttemptProgress, ProgressEvent, ProgressSender};
use crate::retry::RetryingUploader;
use crate::session::{Session, Status};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Succeeded { uploaded: usize },
    /// The photo at `index` could not be prepared or uploaded. Later photos were not attempted.
    Failed {
        index: usize,
        file_name: String,
        reason: String,
    },
    /// Stopped before photo `completed`; earlier photos were uploaded.
    Cancelled { completed: usize },
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Succeeded { .. })
    }
}

/// Compresses and uploads every pending photo of `session`, one at a time, in order.
///
/// The first photo that cannot be decoded or that exhausts its retries ends the
/// run; photos already uploaded stay uploaded. On success the selection and the
/// guest name are cleared. Progress is reset to 0 before and after the run.
pub async fn run_batch<T: UploadTransport>(
    session: &mut Session,
    uploader: &RetryingUploader<T>,
    events: &ProgressSender,
) -> Result<BatchOutcome> {
    run(session, uploader, events, None).await
}

/// Like [`run_batch`], but stops before compressing the next photo once `cancel`
/// fires. An upload already in flight is allowed to finish.
pub async fn run_batch_with_cancel<T: UploadTransport>(
    session: &mut Session,
    uploader: &RetryingUploader<T>,
    events: &ProgressSender,
    cancel: &CancellationToken,
) -> Result<BatchOutcome> {
    run(session, uploader, events, Some(cancel)).await
}

async fn run<T: UploadTransport>(
    session: &mut Session,
    uploader: &RetryingUploader<T>,
    events: &ProgressSender,
    cancel: Option<&CancellationToken>,
) -> Result<BatchOutcome> {
    if session.pending.is_empty() {
        return Err(ShareError::EmptyBatch);
    }

    let total = session.pending.len();
    let quality = Quality::default();
    let guest_name = session.guest_name.clone();

    reset_progress(session, events);
    session.status = Status::Uploading(0);
    crate::verbose!("Sharing {} photos as {}", total, session.display_name());

    let mut outcome = BatchOutcome::Succeeded { uploaded: total };
    for index in 0..total {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            crate::warn!("Upload cancelled after {} of {} photos", index, total);
            outcome = BatchOutcome::Cancelled { completed: index };
            break;
        }

        let image = &session.pending[index];
        send(
            events,
            ProgressEvent::Started {
                index,
                total,
                file_name: image.name.clone(),
            },
        );

        let progress = AttemptProgress::new(index, total, events.clone());
        let result = match compress_image(image, quality).await {
            Ok(compressed) => uploader.upload(&compressed, &guest_name, &progress).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(_attempts) => {
                session.progress = aggregate_percent(index, 1.0, total);
                session.status = Status::Uploading(session.progress);
                send(events, ProgressEvent::ImageUploaded { index });
            }
            Err(e) => {
                crate::error!("Failed to share {}: {}", image.name, e);
                outcome = BatchOutcome::Failed {
                    index,
                    file_name: image.name.clone(),
                    reason: e.to_string(),
                };
                break;
            }
        }
    }

    session.status = match &outcome {
        BatchOutcome::Succeeded { uploaded } => {
            session.clear_pending();
            session.guest_name.clear();
            send(events, ProgressEvent::Celebrate);
            Status::Succeeded(*uploaded)
        }
        BatchOutcome::Failed { reason, .. } => Status::Failed(reason.clone()),
        BatchOutcome::Cancelled { .. } => Status::Cancelled,
    };

    reset_progress(session, events);
    send(events, ProgressEvent::Finished(outcome.clone()));
    Ok(outcome)
}

fn reset_progress(session: &mut Session, events: &ProgressSender) {
    session.progress = 0;
    send(events, ProgressEvent::Reset);
}

fn send(events: &ProgressSender, event: ProgressEvent) {
    // Nobody listening is fine; the outcome is also returned.
    let _ = events.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{progress_channel, ProgressReceiver};
    use crate::selection::CandidateFile;
    use crate::test_support::ScriptedTransport;
    use bytes::Bytes;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn photo(name: &str) -> CandidateFile {
        let img = RgbImage::from_fn(16, 16, |x, y| image::Rgb([x as u8 * 8, y as u8 * 8, 90]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        CandidateFile::from_bytes(name, "image/png", Bytes::from(buf.into_inner()))
    }

    fn session_with(names: &[&str]) -> Session {
        let mut session = Session::with_guest("Anna & Ben");
        let rejections = session.add_files(names.iter().map(|n| photo(n)).collect());
        assert!(rejections.is_empty());
        session
    }

    fn drain(receiver: &mut ProgressReceiver) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    fn percentages(events: &[ProgressEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Progress(pct) => Some(*pct),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let uploader = RetryingUploader::new(ScriptedTransport::default());
        let (tx, mut rx) = progress_channel();
        let mut session = Session::with_guest("Anna");

        let result = run_batch(&mut session, &uploader, &tx).await;

        assert!(matches!(result, Err(ShareError::EmptyBatch)));
        assert!(uploader.transport().calls().is_empty());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(session.status(), &Status::Idle);
    }

    #[tokio::test]
    async fn test_all_uploads_succeed() {
        let uploader = RetryingUploader::new(ScriptedTransport::default());
        let (tx, mut rx) = progress_channel();
        let mut session = session_with(&["a.png", "b.png", "c.png"]);

        let outcome = run_batch(&mut session, &uploader, &tx).await.unwrap();

        assert_eq!(outcome, BatchOutcome::Succeeded { uploaded: 3 });
        assert_eq!(
            uploader.transport().calls(),
            vec![
                ("a.png".to_string(), "Anna & Ben".to_string()),
                ("b.png".to_string(), "Anna & Ben".to_string()),
                ("c.png".to_string(), "Anna & Ben".to_string()),
            ]
        );

        let events = drain(&mut rx);
        let pcts = percentages(&events);
        assert!(pcts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(pcts.last(), Some(&100));
        assert_eq!(events.first(), Some(&ProgressEvent::Reset));
        assert!(events.contains(&ProgressEvent::Celebrate));
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Finished(BatchOutcome::Succeeded { uploaded: 3 }))
        );

        assert!(session.pending().is_empty());
        assert!(session.guest_name.is_empty());
        assert_eq!(session.progress(), 0);
        assert_eq!(session.status(), &Status::Succeeded(3));
    }

    #[tokio::test]
    async fn test_failure_stops_at_failing_image() {
        let transport = ScriptedTransport::default().script("b.png", &[Some(500), Some(500)]);
        let uploader = RetryingUploader::new(transport);
        let (tx, mut rx) = progress_channel();
        let mut session = session_with(&["a.png", "b.png", "c.png"]);

        let outcome = run_batch(&mut session, &uploader, &tx).await.unwrap();

        match &outcome {
            BatchOutcome::Failed {
                index, file_name, ..
            } => {
                assert_eq!(*index, 1);
                assert_eq!(file_name, "b.png");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(uploader.transport().attempts_for("a.png"), 1);
        assert_eq!(uploader.transport().attempts_for("b.png"), 2);
        assert_eq!(uploader.transport().attempts_for("c.png"), 0);

        let events = drain(&mut rx);
        assert!(!events.contains(&ProgressEvent::Celebrate));
        assert!(!events.iter().any(|e| matches!(e, ProgressEvent::Started { index: 2, .. })));

        assert_eq!(session.pending().len(), 3);
        assert_eq!(session.guest_name, "Anna & Ben");
        assert_eq!(session.progress(), 0);
        assert!(matches!(session.status(), Status::Failed(_)));
    }

    #[tokio::test]
    async fn test_retry_dips_then_completes() {
        let transport = ScriptedTransport::default().script("b.png", &[Some(503), None]);
        let uploader = RetryingUploader::new(transport);
        let (tx, mut rx) = progress_channel();
        let mut session = session_with(&["a.png", "b.png", "c.png"]);

        let outcome = run_batch(&mut session, &uploader, &tx).await.unwrap();
        assert!(outcome.is_success());

        let events = drain(&mut rx);
        assert!(events.contains(&ProgressEvent::Retrying { index: 1, attempt: 2 }));
        // a: 17, 33; b: 50, (retry) 33, 50, 67; c: 83, 100
        assert_eq!(percentages(&events), vec![17, 33, 50, 33, 50, 67, 83, 100]);
    }

    #[tokio::test]
    async fn test_undecodable_photo_fails_batch() {
        let uploader = RetryingUploader::new(ScriptedTransport::default());
        let (tx, _rx) = progress_channel();
        let mut session = Session::new();
        session.add_files(vec![
            photo("a.png"),
            CandidateFile::from_bytes("broken.jpg", "image/jpeg", Bytes::from_static(b"nope")),
            photo("c.png"),
        ]);

        let outcome = run_batch(&mut session, &uploader, &tx).await.unwrap();

        assert!(matches!(outcome, BatchOutcome::Failed { index: 1, .. }));
        assert_eq!(
            uploader.transport().calls(),
            vec![("a.png".to_string(), String::new())]
        );
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let uploader = RetryingUploader::new(ScriptedTransport::default());
        let (tx, _rx) = progress_channel();
        let mut session = session_with(&["a.png", "b.png"]);
        let token = CancellationToken::new();
        token.cancel();

        let outcome = run_batch_with_cancel(&mut session, &uploader, &tx, &token)
            .await
            .unwrap();

        assert_eq!(outcome, BatchOutcome::Cancelled { completed: 0 });
        assert!(uploader.transport().calls().is_empty());
        assert_eq!(session.pending().len(), 2);
        assert_eq!(session.status(), &Status::Cancelled);
    }

    #[tokio::test]
    async fn test_closed_receiver_does_not_break_run() {
        let uploader = RetryingUploader::new(ScriptedTransport::default());
        let (tx, rx) = progress_channel();
        drop(rx);
        let mut session = session_with(&["a.png"]);

        let outcome = run_batch(&mut session, &uploader, &tx).await.unwrap();
        assert_eq!(outcome, BatchOutcome::Succeeded { uploaded: 1 });
    }
}
