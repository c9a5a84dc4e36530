//! Tricks Storage Library
//!
//! This crate resolves the configured media directories and performs the
//! filesystem side of the upload pipeline: moving an upload into place,
//! locating a stored image from its bare name and deleting it.
//!
//! # Filenames
//!
//! Stored filenames are a single path component. They must not contain `..`,
//! path separators or a leading dot. Validation is centralized in the `keys`
//! module so every operation applies the same rules.

pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalDirectoryStore;
pub use traits::{MediaStore, StorageError, StorageResult};
