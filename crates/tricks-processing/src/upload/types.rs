//! Types for the upload pipeline.

use crate::image::{ImageKind, ResizeFormat};
use image::ImageReader;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Temporary uploaded file, as handed over by the multipart layer.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
}

impl UploadedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            original_name: None,
            mime_type: None,
        }
    }

    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Best guess at the file's real extension: sniffed content first, then the
    /// declared MIME type, then the client filename.
    pub fn guess_extension(&self) -> String {
        if let Some(ext) = sniff_extension(&self.path) {
            return ext;
        }

        if let Some(kind) = self.mime_type.as_deref().and_then(ImageKind::from_mime_type) {
            return kind.canonical_extension().to_string();
        }

        self.original_name
            .as_deref()
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }
}

fn sniff_extension(path: &Path) -> Option<String> {
    let format = ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .format()?;
    format.extensions_str().first().map(|e| e.to_string())
}

/// Parameters submitted alongside the image.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParameters {
    /// Label embedded at the start of the filename (e.g. the username).
    pub identifier_name: String,
    /// Tag embedded in the intermediate filename before the real dimensions are known.
    pub dimensions_format: String,
    /// Serialized crop array; only the first rectangle is used.
    #[serde(rename = "cropJSONData")]
    pub crop_json_data: String,
    /// Output format: `jpeg`, `jpg`, `png` or `gif`.
    pub extension: String,
    pub resize_format: ResizeFormat,
}
