use crate::image::ImageKind;
use crate::upload::{UploadParameters, UploadedFile};
use std::path::Path;
use tricks_core::MediaConfig;

/// Validation errors raised before an upload reaches the pipeline
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Content type {content_type} does not match extension '{extension}'")]
    ContentTypeMismatch {
        content_type: String,
        extension: String,
    },

    #[error("Missing crop data")]
    MissingCropData,

    #[error("Empty file")]
    EmptyFile,

    #[error("Unreadable upload {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Upload constraints normally enforced by the submitting form
///
/// The pipeline trusts its inputs; callers that do not already validate the
/// form run this first.
pub struct UploadValidator {
    max_file_size: u64,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(
            config.max_file_size_bytes as u64,
            config.allowed_extensions.clone(),
        )
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the requested output extension
    pub fn validate_extension(&self, extension: &str) -> Result<(), ValidationError> {
        let extension = extension.trim().to_lowercase();

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Validate that the declared MIME type matches the upload's own file extension.
    /// Unknown extensions or MIME types are left to the decoder.
    pub fn validate_content_type(&self, file: &UploadedFile) -> Result<(), ValidationError> {
        let (Some(content_type), Some(extension)) = (
            file.mime_type.as_deref(),
            file.original_name
                .as_deref()
                .and_then(|n| Path::new(n).extension())
                .and_then(|e| e.to_str()),
        ) else {
            return Ok(());
        };

        let (Some(declared), Ok(named)) = (
            ImageKind::from_mime_type(content_type),
            ImageKind::parse(extension),
        ) else {
            tracing::debug!(
                extension = %extension,
                content_type = %content_type,
                "Unknown extension or content type, skipping cross-validation"
            );
            return Ok(());
        };

        if declared != named {
            return Err(ValidationError::ContentTypeMismatch {
                content_type: content_type.to_string(),
                extension: extension.to_string(),
            });
        }

        Ok(())
    }

    /// Validate everything the upload form would
    pub fn validate_all(
        &self,
        file: &UploadedFile,
        params: &UploadParameters,
    ) -> Result<(), ValidationError> {
        let size = std::fs::metadata(&file.path)
            .map_err(|e| ValidationError::Unreadable {
                path: file.path.display().to_string(),
                reason: e.to_string(),
            })?
            .len();

        self.validate_file_size(size)?;
        self.validate_extension(&params.extension)?;
        self.validate_content_type(file)?;

        if params.crop_json_data.trim().is_empty() {
            return Err(ValidationError::MissingCropData);
        }

        Ok(())
    }
}
