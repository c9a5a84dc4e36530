//! Error types module
//!
//! This module provides the core error types shared by the media pipeline and the
//! form-change detector. All failures are unified under the `AppError` enum so
//! callers can decide, per variant, whether to surface, recover or abort.

use std::io;
use std::path::PathBuf;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "CONFIGURATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the caller can recover locally (e.g. show a notice and continue)
    fn is_recoverable(&self) -> bool;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid crop rectangle: {0}")]
    InvalidCrop(String),

    #[error("Schema mismatch: expected fields {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Configuration(_) => "Configuration",
            AppError::Filesystem { .. } => "Filesystem",
            AppError::InvalidCrop(_) => "InvalidCrop",
            AppError::SchemaMismatch { .. } => "SchemaMismatch",
            AppError::ImageProcessing(_) => "ImageProcessing",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Timeout(_) => "Timeout",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, LogLevel) {
    match err {
        AppError::Configuration(_) => ("CONFIGURATION_ERROR", false, LogLevel::Error),
        AppError::Filesystem { .. } => ("FILESYSTEM_ERROR", true, LogLevel::Warn),
        AppError::InvalidCrop(_) => ("INVALID_CROP", false, LogLevel::Debug),
        AppError::SchemaMismatch { .. } => ("SCHEMA_MISMATCH", false, LogLevel::Error),
        AppError::ImageProcessing(_) => ("IMAGE_PROCESSING_ERROR", false, LogLevel::Warn),
        AppError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        AppError::Timeout(_) => ("TIMEOUT", true, LogLevel::Warn),
        AppError::Internal(_) => ("INTERNAL_ERROR", false, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Configuration(_) => "Media storage is misconfigured".to_string(),
            AppError::Filesystem { .. } => "The file could not be uploaded".to_string(),
            AppError::InvalidCrop(ref msg) => msg.clone(),
            AppError::SchemaMismatch { .. } => "Internal server error".to_string(),
            AppError::ImageProcessing(_) => {
                "The image could not be processed, try a different file".to_string()
            }
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Timeout(_) => "The upload took too long, please retry".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
