//! Storage abstraction trait
//!
//! This module defines the `MediaStore` trait implemented by the directory-backed
//! store used for uploaded images.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tricks_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unknown directory key: {0}")]
    UnknownDirectory(String),

    #[error("Invalid filename: {0}")]
    InvalidKey(String),

    #[error("Move failed from {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Delete failed for {}: {source}", path.display())]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnknownDirectory(key) => {
                AppError::Configuration(format!("Unknown directory key: {}", key))
            }
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::MoveFailed { to, source, .. } => AppError::filesystem(to, source),
            StorageError::DeleteFailed { path, source } => AppError::filesystem(path, source),
            StorageError::NotFound(name) => {
                AppError::InvalidInput(format!("File not found: {}", name))
            }
            StorageError::IoError(e) => AppError::Internal(format!("IO error: {}", e)),
        }
    }
}

/// Directory-keyed media store
///
/// Every operation takes the symbolic directory key from the configured table
/// (e.g. `avatar`) and a bare filename inside that directory.
pub trait MediaStore: Send + Sync {
    /// Absolute directory configured for `key`.
    fn directory(&self, key: &str) -> StorageResult<PathBuf>;

    /// Move `source` into the directory for `key` under `filename`.
    /// Returns the destination path.
    fn move_into(&self, key: &str, source: &Path, filename: &str) -> StorageResult<PathBuf>;

    /// Path that `filename` has (or would have) inside the directory for `key`.
    fn path_of(&self, key: &str, filename: &str) -> StorageResult<PathBuf>;

    /// Delete `filename` from the directory for `key`. Missing files are not an error.
    fn remove(&self, key: &str, filename: &str) -> StorageResult<()>;

    /// Check if `filename` exists in the directory for `key`.
    fn exists(&self, key: &str, filename: &str) -> StorageResult<bool>;

    /// Find a stored file from its bare name (no extension) by probing the
    /// given extensions in order.
    fn locate(&self, key: &str, stem: &str, extensions: &[&str]) -> StorageResult<PathBuf>;
}
