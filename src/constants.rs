/// Maximum number of photos a guest can have queued at once
pub const MAX_PENDING_IMAGES: usize = 10;
/// Maximum accepted size of a single photo before recompression (10 MiB)
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

pub const UPLOAD_QUALITY: f32 = 0.7;
pub const MIN_JPEG_QUALITY: u8 = 1;
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Total upload attempts per photo, including the first one
pub const MAX_UPLOAD_ATTEMPTS: u32 = 2;

/// Media type every recompressed photo is normalized to
pub const OUTPUT_MEDIA_TYPE: &str = "image/jpeg";
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Size of each streamed request body chunk; one progress tick per chunk
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;
/// Whole-request limit for one upload attempt, connect included
pub const UPLOAD_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Exit status when a second Ctrl-C abandons the run
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

pub const DEFAULT_MEDIA_HOST: &str = "https://api.cloudinary.com";
pub const DEFAULT_CLOUD_NAME: &str = "wedding-snap";
pub const DEFAULT_UPLOAD_PRESET: &str = "wedding_guests";

pub const GUEST_CONTEXT_KEY: &str = "guest";

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{bar:40.magenta/blue}] {pos:>3}% {msg}";
pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const CELEBRATION_PREFIX: &str = "🎉";
pub const VERBOSE_PREFIX: &str = "🔍";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapImageFormat {
    Jpeg,
    Png,
    WebP,
    Bmp,
    Tiff,
    Gif,
}

impl SnapImageFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SnapImageFormat::Jpeg),
            "png" => Some(SnapImageFormat::Png),
            "webp" => Some(SnapImageFormat::WebP),
            "bmp" => Some(SnapImageFormat::Bmp),
            "tif" | "tiff" => Some(SnapImageFormat::Tiff),
            "gif" => Some(SnapImageFormat::Gif),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SnapImageFormat::Jpeg => "image/jpeg",
            SnapImageFormat::Png => "image/png",
            SnapImageFormat::WebP => "image/webp",
            SnapImageFormat::Bmp => "image/bmp",
            SnapImageFormat::Tiff => "image/tiff",
            SnapImageFormat::Gif => "image/gif",
        }
    }
}

/// Guess a media type from a file name's extension, the way a browser file picker does.
///
/// Only formats the decoder can read map to `image/*`; HEIC and AVIF photos are
/// reported as not an image instead of failing the batch at compression time.
pub fn media_type_for_name(file_name: &str) -> &'static str {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(SnapImageFormat::from_extension)
        .map(|format| format.mime_type())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}
