use std::path::PathBuf;
use thiserror::Error;

/// A single failed upload attempt. Retried by the uploader until the budget runs out.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("media host responded with status {status}")]
    Status { status: u16 },
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not decode {file_name} as an image: {source}")]
    Decode {
        file_name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Image encoding error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Invalid quality value: {0}. Must be greater than 0 and at most 1")]
    InvalidQuality(f32),

    #[error("Upload error: {0}")]
    Transport(#[from] TransportError),

    #[error("Upload of {file_name} failed after {attempts} attempts: {source}")]
    UploadExhausted {
        file_name: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("No photos selected")]
    EmptyBatch,

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("No files found in input path: {0}")]
    NoCandidatesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Invalid upload destination: {0}")]
    InvalidDestination(String),
}

pub type Result<T> = std::result::Result<T, ShareError>;
