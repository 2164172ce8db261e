use crate::config::Quality;
use crate::constants::OUTPUT_MEDIA_TYPE;
use crate::error::{Result, ShareError};
use crate::selection::{format_size, PendingImage};
use crate::utils::create_progress_spinner;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView};
use std::fs;
use std::path::Path;

/// A photo re-encoded for upload. Keeps the original file name.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub name: String,
    pub media_type: &'static str,
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Decodes `image` and re-encodes it as JPEG at `quality`, at native resolution.
///
/// Decoding and encoding run on the blocking pool. A payload that is not a
/// decodable image yields [`ShareError::Decode`].
pub async fn compress_image(image: &PendingImage, quality: Quality) -> Result<CompressedImage> {
    let data = image.payload.read().await?;
    let name = image.name.clone();

    let compressed = tokio::task::spawn_blocking(move || recompress_bytes(&name, &data, quality))
        .await
        .map_err(|e| ShareError::Io(std::io::Error::other(e)))??;

    crate::verbose!(
        "Compressed {}: {} -> {}",
        compressed.name,
        format_size(image.size),
        format_size(compressed.size())
    );
    Ok(compressed)
}

/// Synchronous core of [`compress_image`].
pub fn recompress_bytes(name: &str, data: &[u8], quality: Quality) -> Result<CompressedImage> {
    let img = image::load_from_memory(data).map_err(|source| ShareError::Decode {
        file_name: name.to_string(),
        source,
    })?;

    let encoded = encode_jpeg(&img, quality)?;
    let (width, height) = img.dimensions();

    Ok(CompressedImage {
        name: name.to_string(),
        media_type: OUTPUT_MEDIA_TYPE,
        data: Bytes::from(encoded),
        width,
        height,
    })
}

/// JPEG has no alpha channel; transparent pixels are flattened to RGB.
pub fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.to_jpeg_quality());
    encoder
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(ShareError::Encode)?;
    Ok(buf)
}

/// Recompresses a single file on disk, the same way photos are prepared for upload.
///
/// Returns `(original_size, compressed_size)`.
pub fn compress_file(input: &Path, output: &Path, quality: Quality) -> Result<(u64, u64)> {
    if !input.exists() {
        return Err(ShareError::FileNotFound(input.to_path_buf()));
    }

    crate::info!("🗜️  Compressing image: {:?}", input);
    crate::info!("📁 Output: {:?}", output);

    let pb = create_progress_spinner("Loading image...");
    let data = fs::read(input)?;
    let original_size = data.len() as u64;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    pb.set_message("Re-encoding...");
    let compressed = recompress_bytes(&name, &data, quality)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, &compressed.data)?;
    pb.finish_with_message(format!("{} Compression complete", crate::constants::SUCCESS_PREFIX));

    let compressed_size = compressed.size();
    let ratio = compression_ratio(original_size, compressed_size);

    crate::info!(
        "📊 Original size: {} bytes ({}x{})",
        original_size,
        compressed.width,
        compressed.height
    );
    crate::info!("📈 Compressed size: {} bytes", compressed_size);
    if ratio > 0.0 {
        crate::info!("✅ Successfully reduced file size by {:.1}%", ratio);
    } else {
        crate::warn!("File size increased by {:.1}%", ratio.abs());
    }

    Ok((original_size, compressed_size))
}

pub fn compression_ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    ((original as f64 - compressed as f64) / original as f64) * 100.0
}
