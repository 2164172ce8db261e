use crate::config::Destination;
use crate::constants::{GUEST_CONTEXT_KEY, UPLOAD_CHUNK_SIZE, UPLOAD_TIMEOUT};
use crate::error::TransportError;
use crate::processing::CompressedImage;
use crate::progress::AttemptProgress;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use std::time::Duration;

/// One upload attempt of one photo. Implementations never retry.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(
        &self,
        image: &CompressedImage,
        guest_name: &str,
        progress: &AttemptProgress,
    ) -> Result<(), TransportError>;
}

/// Posts photos to the media host as multipart forms.
#[derive(Debug, Clone)]
pub struct HttpUploadClient {
    client: Client,
    destination: Destination,
}

impl HttpUploadClient {
    pub fn new(destination: Destination) -> Result<Self, TransportError> {
        Self::with_timeout(destination, UPLOAD_TIMEOUT)
    }

    /// A host that accepts the connection but never answers fails the attempt after `timeout`.
    pub fn with_timeout(destination: Destination, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, destination))
    }

    pub fn with_client(client: Client, destination: Destination) -> Self {
        Self {
            client,
            destination,
        }
    }
}

/// `guest=<name>`, passed through unescaped.
pub fn guest_context(guest_name: &str) -> String {
    format!("{}={}", GUEST_CONTEXT_KEY, guest_name)
}

/// Splits `data` into chunks and reports the cumulative fraction as each one is pulled.
fn progress_body(data: Bytes, progress: AttemptProgress) -> Body {
    let total = data.len();
    let chunks: Vec<Bytes> = (0..total)
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| data.slice(start..(start + UPLOAD_CHUNK_SIZE).min(total)))
        .collect();

    let mut sent = 0usize;
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len();
        progress.report(sent as f64 / total as f64);
        Ok::<Bytes, std::io::Error>(chunk)
    }));
    Body::wrap_stream(stream)
}

#[async_trait]
impl UploadTransport for HttpUploadClient {
    async fn upload(
        &self,
        image: &CompressedImage,
        guest_name: &str,
        progress: &AttemptProgress,
    ) -> Result<(), TransportError> {
        let body = progress_body(image.data.clone(), progress.clone());
        let file = Part::stream_with_length(body, image.size())
            .file_name(image.name.clone())
            .mime_str(image.media_type)?;

        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.destination.upload_preset.clone())
            .text("context", guest_context(guest_name));

        let response = self
            .client
            .post(&self.destination.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        progress.report(1.0);
        Ok(())
    }
}
