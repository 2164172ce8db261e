//! Photos a guest has picked, before and after validation.

use crate::constants::media_type_for_name;
use crate::error::{Result, ShareError};
use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PREVIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Where a photo's bytes live. Files are only read when the photo is compressed.
#[derive(Debug, Clone)]
pub enum Payload {
    Memory(Bytes),
    File(PathBuf),
}

impl Payload {
    pub async fn read(&self) -> Result<Bytes> {
        match self {
            Payload::Memory(bytes) => Ok(bytes.clone()),
            Payload::File(path) => match tokio::fs::read(path).await {
                Ok(data) => Ok(Bytes::from(data)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(ShareError::FileNotFound(path.clone()))
                }
                Err(e) => Err(ShareError::Io(e)),
            },
        }
    }
}

/// A file offered for selection, not yet validated.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub payload: Payload,
}

impl CandidateFile {
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: data.len() as u64,
            payload: Payload::Memory(data),
        }
    }

    /// Describes a file on disk without reading it. The media type is taken from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ShareError::FileNotFound(path.to_path_buf()));
        }
        let size = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let media_type = media_type_for_name(&name).to_string();

        Ok(Self {
            name,
            media_type,
            size,
            payload: Payload::File(path.to_path_buf()),
        })
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Display handle for an accepted photo. Dropping it releases the preview.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: u64,
    label: String,
}

impl PreviewHandle {
    fn create(name: &str, size: u64) -> Self {
        Self {
            id: NEXT_PREVIEW_ID.fetch_add(1, Ordering::Relaxed),
            label: format!("{} ({})", name, format_size(size)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A photo accepted by validation, waiting to be compressed and uploaded.
#[derive(Debug)]
pub struct PendingImage {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub payload: Payload,
    preview: PreviewHandle,
}

impl PendingImage {
    pub(crate) fn accept(candidate: CandidateFile) -> Self {
        let preview = PreviewHandle::create(&candidate.name, candidate.size);
        Self {
            name: candidate.name,
            media_type: candidate.media_type,
            size: candidate.size,
            payload: candidate.payload,
            preview,
        }
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }
}

impl fmt::Display for PendingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.preview.label)
    }
}

/// Size in megabytes with one decimal place, e.g. `11.0 MB`.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format_megabytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_candidate_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("first_dance.JPG");
        File::create(&path).unwrap().write_all(&[0u8; 2048]).unwrap();

        let candidate = CandidateFile::from_path(&path).unwrap();
        assert_eq!(candidate.name, "first_dance.JPG");
        assert_eq!(candidate.media_type, "image/jpeg");
        assert_eq!(candidate.size, 2048);
        assert!(candidate.is_image());
    }

    #[test]
    fn test_candidate_from_path_not_found() {
        let result = CandidateFile::from_path(Path::new("nonexistent.jpg"));
        assert!(matches!(result, Err(ShareError::FileNotFound(_))));
    }

    #[test]
    fn test_previews_are_unique() {
        let a = PendingImage::accept(CandidateFile::from_bytes("a.png", "image/png", Bytes::from_static(b"a")));
        let b = PendingImage::accept(CandidateFile::from_bytes("b.png", "image/png", Bytes::from_static(b"b")));
        assert_ne!(a.preview().id(), b.preview().id());
        assert_eq!(a.preview().label(), "a.png (0.0 KB)");
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(11 * 1024 * 1024), "11.0 MB");
        assert_eq!(format_megabytes(10_590_617), "10.1 MB");
        assert_eq!(format_size(3 * 1024), "3.0 KB");
    }

    #[tokio::test]
    async fn test_payload_read_missing_file() {
        let payload = Payload::File(PathBuf::from("nonexistent.jpg"));
        let result = payload.read().await;
        assert!(matches!(result, Err(ShareError::FileNotFound(_))));
    }
}
