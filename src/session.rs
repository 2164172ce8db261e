use crate::selection::{CandidateFile, PendingImage};
use crate::validation::{validate_and_add, Rejection};
use std::fmt;

/// The one line of status shown to the guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Uploading(u8),
    Succeeded(usize),
    Failed(String),
    Cancelled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "Ready to share"),
            Status::Uploading(pct) => write!(f, "Uploading... {}%", pct),
            Status::Succeeded(1) => write!(f, "Thank you! Your photo was shared"),
            Status::Succeeded(count) => write!(f, "Thank you! {} photos were shared", count),
            Status::Failed(reason) => write!(f, "Upload failed: {}", reason),
            Status::Cancelled => write!(f, "Upload cancelled"),
        }
    }
}

/// Everything a guest's sharing session holds between runs.
///
/// The batch pipeline is its only writer while a run is in progress; it takes
/// the session by `&mut`, so two runs cannot overlap on the same session.
#[derive(Debug)]
pub struct Session {
    pub guest_name: String,
    pub(crate) pending: Vec<PendingImage>,
    pub(crate) progress: u8,
    pub(crate) status: Status,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            guest_name: String::new(),
            pending: Vec::new(),
            progress: 0,
            status: Status::Idle,
        }
    }

    pub fn with_guest(guest_name: impl Into<String>) -> Self {
        Self {
            guest_name: guest_name.into(),
            ..Self::new()
        }
    }

    /// Validates `candidates` and adds the acceptable ones. See [`validate_and_add`].
    pub fn add_files(&mut self, candidates: Vec<CandidateFile>) -> Vec<Rejection> {
        let pending = std::mem::take(&mut self.pending);
        let (pending, rejections) = validate_and_add(pending, candidates);
        self.pending = pending;
        rejections
    }

    /// Removes the photo at `index`, releasing its preview.
    pub fn remove(&mut self, index: usize) -> Option<PendingImage> {
        if index < self.pending.len() {
            Some(self.pending.remove(index))
        } else {
            None
        }
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> &[PendingImage] {
        &self.pending
    }

    /// Guests who leave the name empty share anonymously.
    pub fn display_name(&self) -> &str {
        let name = self.guest_name.trim();
        if name.is_empty() {
            "anonymous guest"
        } else {
            name
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn status(&self) -> &Status {
        &self.status
    }
}
