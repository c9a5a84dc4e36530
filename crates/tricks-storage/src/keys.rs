//! Shared filename validation for the directory store.

use crate::traits::{StorageError, StorageResult};

/// Reject anything that is not a single, visible path component.
pub fn validate_filename(filename: &str) -> StorageResult<()> {
    if filename.is_empty() {
        return Err(StorageError::InvalidKey("Filename is empty".to_string()));
    }

    if filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        return Err(StorageError::InvalidKey(format!(
            "Filename contains invalid characters: {}",
            filename
        )));
    }

    if filename.starts_with('.') {
        return Err(StorageError::InvalidKey(format!(
            "Filename must not start with a dot: {}",
            filename
        )));
    }

    Ok(())
}
