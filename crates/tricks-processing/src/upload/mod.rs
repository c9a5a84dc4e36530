//! Image upload: types and the upload pipeline.

pub mod types;
pub mod uploader;

pub use types::{UploadParameters, UploadedFile};
pub use uploader::ImageUploader;
