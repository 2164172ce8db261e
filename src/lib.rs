pub mod logger;

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod pipeline;
pub mod processing;
pub mod progress;
pub mod retry;
pub mod selection;
pub mod session;
pub mod utils;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{HttpUploadClient, UploadTransport};
pub use config::{Destination, Quality};
pub use error::{Result, ShareError, TransportError};
pub use pipeline::{run_batch, run_batch_with_cancel, BatchOutcome};
pub use processing::{compress_file, compress_image, CompressedImage};
pub use progress::{progress_channel, AttemptProgress, ProgressEvent};
pub use retry::{RetryPolicy, RetryingUploader};
pub use selection::{CandidateFile, PendingImage};
pub use session::{Session, Status};
pub use validation::{collect_candidate_paths, validate_and_add, Rejection, RejectionReason};
