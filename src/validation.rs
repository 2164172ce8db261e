use crate::constants::{MAX_IMAGE_BYTES, MAX_PENDING_IMAGES};
use crate::error::{Result, ShareError};
use crate::selection::{format_megabytes, CandidateFile, PendingImage};
use glob::glob;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    NotAnImage,
    TooLarge { size_bytes: u64 },
    /// Accepting this file would have pushed the selection past `max` photos.
    LimitReached { max: usize },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::NotAnImage => write!(f, "not an image"),
            RejectionReason::TooLarge { size_bytes } => {
                write!(f, "too large ({})", format_megabytes(*size_bytes))
            }
            RejectionReason::LimitReached { max } => {
                write!(f, "limit of {} photos reached", max)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file_name: String,
    pub reason: RejectionReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_name, self.reason)
    }
}

/// Filters `candidates` down to acceptable photos and appends them to `pending`.
///
/// Non-images and photos over the size limit are rejected one by one. If the
/// remaining photos would push the selection past the cap, none of them are
/// added and each is reported with [`RejectionReason::LimitReached`].
pub fn validate_and_add(
    mut pending: Vec<PendingImage>,
    candidates: Vec<CandidateFile>,
) -> (Vec<PendingImage>, Vec<Rejection>) {
    let mut rejections = Vec::new();
    let mut accepted = Vec::new();

    for candidate in candidates {
        if !candidate.is_image() {
            rejections.push(Rejection {
                file_name: candidate.name,
                reason: RejectionReason::NotAnImage,
            });
        } else if candidate.size > MAX_IMAGE_BYTES {
            rejections.push(Rejection {
                file_name: candidate.name,
                reason: RejectionReason::TooLarge {
                    size_bytes: candidate.size,
                },
            });
        } else {
            accepted.push(candidate);
        }
    }

    if pending.len() + accepted.len() > MAX_PENDING_IMAGES {
        crate::warn!(
            "Only {} photos can be shared at once; {} more were not added",
            MAX_PENDING_IMAGES,
            accepted.len()
        );
        rejections.extend(accepted.into_iter().map(|candidate| Rejection {
            file_name: candidate.name,
            reason: RejectionReason::LimitReached {
                max: MAX_PENDING_IMAGES,
            },
        }));
        return (pending, rejections);
    }

    pending.extend(accepted.into_iter().map(PendingImage::accept));
    (pending, rejections)
}

/// Expands a file, a directory or a glob pattern into candidate paths.
///
/// Hidden entries are skipped. No filtering by type happens here; that is
/// left to [`validate_and_add`] so unsupported files get reported.
pub fn collect_candidate_paths(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        paths.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path).into_iter()
        } else {
            WalkDir::new(input_path).max_depth(1).into_iter()
        };

        for entry in walker.filter_entry(|e| e.depth() == 0 || !is_hidden(e.path())) {
            let entry = entry?;
            if entry.file_type().is_file() {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
    } else if let Ok(pattern) = glob(input) {
        for entry in pattern.flatten() {
            if entry.is_file() && !is_hidden(&entry) {
                paths.push(entry);
            }
        }
        if paths.is_empty() {
            return Err(ShareError::NoCandidatesFound(input.to_string()));
        }
    } else {
        return Err(ShareError::NoCandidatesFound(input.to_string()));
    }

    Ok(paths)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
