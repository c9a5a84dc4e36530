//! Tricks Processing Library
//!
//! Image upload pipeline for trick and avatar pictures: move the upload into
//! its media directory, crop, resize onto a fresh canvas, re-encode at maximum
//! quality and rename from structured components.

pub mod image;
pub mod naming;
pub mod upload;
pub mod validator;

// Re-export commonly used types
pub use crate::image::{CropRegion, ImageKind, ImageTransformer, ResizeFormat};
pub use naming::{IntermediateName, StoredImageName};
pub use upload::{ImageUploader, UploadParameters, UploadedFile};
pub use validator::{UploadValidator, ValidationError};
