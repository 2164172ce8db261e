use crate::client::UploadTransport;
use crate::error::TransportError;
use crate::processing::CompressedImage;
use crate::progress::AttemptProgress;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Transport whose per-file outcomes are scripted in advance.
///
/// Each attempt reports half progress before resolving. Files without a
/// script, or whose script has run out, succeed.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Option<u16>>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    /// `statuses`: `None` succeeds, `Some(code)` fails with that HTTP status.
    pub fn script(self, file_name: &str, statuses: &[Option<u16>]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(file_name.to_string(), statuses.iter().copied().collect());
        self
    }

    /// Every attempt made so far as `(file_name, guest_name)`.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, file_name: &str) -> usize {
        self.calls().iter().filter(|(name, _)| name == file_name).count()
    }
}

#[async_trait]
impl UploadTransport for ScriptedTransport {
    async fn upload(
        &self,
        image: &CompressedImage,
        guest_name: &str,
        progress: &AttemptProgress,
    ) -> Result<(), TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((image.name.clone(), guest_name.to_string()));
        let outcome = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&image.name)
            .and_then(|script| script.pop_front())
            .flatten();

        progress.report(0.5);
        match outcome {
            Some(status) => Err(TransportError::Status { status }),
            None => {
                progress.report(1.0);
                Ok(())
            }
        }
    }
}
