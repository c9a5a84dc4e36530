//! Shared constants

/// Image extensions accepted by the upload form.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// Length of the hex hash segment embedded in stored filenames.
pub const FILENAME_HASH_LEN: usize = 8;

pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 5;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
