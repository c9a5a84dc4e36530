//! Test helpers: real image fixtures and an uploader over a scratch directory.
//!
//! Run from workspace root: `cargo test -p tricks-processing --test upload_test`.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tricks_core::{CropFailurePolicy, MediaDirectories};
use tricks_processing::image::ResizeFormat;
use tricks_processing::{ImageUploader, UploadParameters, UploadedFile};
use tricks_storage::LocalDirectoryStore;

pub const TARGET_KEY: &str = "trick_image";

/// Scratch media directory plus an uploader pointed at it.
pub struct TestMedia {
    pub dir: TempDir,
    pub uploader: ImageUploader,
}

impl TestMedia {
    pub fn new(policy: CropFailurePolicy) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let directories = MediaDirectories::new().with(TARGET_KEY, dir.path().join("media"));
        let store = Arc::new(LocalDirectoryStore::new(directories));
        Self {
            dir,
            uploader: ImageUploader::new(store, policy),
        }
    }

    pub fn media_dir(&self) -> PathBuf {
        self.dir.path().join("media")
    }

    /// Sorted filenames currently in the media directory.
    pub fn stored_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.media_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Write a `width × height` image in `format` as a temporary upload.
    pub fn upload_file(
        &self,
        name: &str,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> UploadedFile {
        let path = self.dir.path().join(name);
        write_image(&path, width, height, format);
        let mime = match format {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            _ => "application/octet-stream",
        };
        UploadedFile::new(path)
            .with_original_name(format!("source.{}", format.extensions_str()[0]))
            .with_mime_type(mime)
    }
}

/// Checkerboard with a semi-transparent corner so alpha handling is visible.
pub fn write_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x < width / 4 && y < height / 4 { 0 } else { 255 };
        if (x / 8 + y / 8) % 2 == 0 {
            Rgba([230, 60, 20, alpha])
        } else {
            Rgba([20, 90, 200, alpha])
        }
    });
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    img.save_with_format(path, format).unwrap();
}

pub fn crop_json(x: u32, y: u32, width: u32, height: u32) -> String {
    format!(
        r#"[{{"x":{},"y":{},"width":{},"height":{}}}]"#,
        x, y, width, height
    )
}

pub fn params(
    label: &str,
    crop: String,
    extension: &str,
    width: u32,
    height: u32,
) -> UploadParameters {
    UploadParameters {
        identifier_name: label.to_string(),
        dimensions_format: "original".to_string(),
        crop_json_data: crop,
        extension: extension.to_string(),
        resize_format: ResizeFormat { width, height },
    }
}
