#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, RgbImage};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

/// Writes a small real PNG so it survives decoding.
pub fn create_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 120])
    });
    DynamicImage::ImageRgb8(img)
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

pub fn create_text_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    File::create(&path)
        .unwrap()
        .write_all(b"not an image")
        .unwrap();
    path
}

/// A file with an image extension whose contents cannot be decoded.
pub fn create_fake_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    File::create(&path)
        .unwrap()
        .write_all(b"fake image data")
        .unwrap();
    path
}

/// A sparse file just over the 10 MiB limit.
pub fn create_oversized_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    file.set_len(11 * 1024 * 1024).unwrap();
    path
}
