use crate::client::UploadTransport;
use crate::constants::MAX_UPLOAD_ATTEMPTS;
use crate::error::{Result, ShareError};
use crate::processing::CompressedImage;
use crate::progress::AttemptProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_ATTEMPTS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Attempting(u32),
    Done,
    Exhausted,
}

impl AttemptState {
    /// Transition after attempt `n` finished, successfully or not.
    pub fn next(self, succeeded: bool, policy: &RetryPolicy) -> Self {
        match self {
            AttemptState::Attempting(_) if succeeded => AttemptState::Done,
            AttemptState::Attempting(n) if n < policy.max_attempts => AttemptState::Attempting(n + 1),
            AttemptState::Attempting(_) => AttemptState::Exhausted,
            terminal => terminal,
        }
    }
}

/// Retries failed uploads immediately, with no delay between attempts.
pub struct RetryingUploader<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: UploadTransport> RetryingUploader<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, RetryPolicy::default())
    }

    pub fn with_policy(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Uploads `image`, returning the number of attempts it took.
    ///
    /// Every attempt reports progress from zero again. Once the budget is used
    /// up the last transport error is returned as [`ShareError::UploadExhausted`].
    pub async fn upload(
        &self,
        image: &CompressedImage,
        guest_name: &str,
        progress: &AttemptProgress,
    ) -> Result<u32> {
        let mut attempt = 1;
        let mut reporter = progress.clone();

        loop {
            crate::verbose!(
                "Uploading {} (attempt {}/{})",
                image.name,
                attempt,
                self.policy.max_attempts
            );

            let error = match self.transport.upload(image, guest_name, &reporter).await {
                Ok(()) => return Ok(attempt),
                Err(e) => e,
            };

            match AttemptState::Attempting(attempt).next(false, &self.policy) {
                AttemptState::Attempting(next) => {
                    crate::warn!(
                        "Upload of {} failed ({}); retrying, attempt {}/{}",
                        image.name,
                        error,
                        next,
                        self.policy.max_attempts
                    );
                    progress.notify_retry(next);
                    reporter = reporter.restart();
                    attempt = next;
                }
                _ => {
                    return Err(ShareError::UploadExhausted {
                        file_name: image.name.clone(),
                        attempts: attempt,
                        source: error,
                    })
                }
            }
        }
    }
}
