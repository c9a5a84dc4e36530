//! Tricks Core Library
//!
//! This crate provides the error taxonomy and configuration shared by the
//! media pipeline, the media store and the form-change detector.

pub mod config;
pub mod constants;
pub mod error;

// Re-export commonly used types
pub use config::{CropFailurePolicy, MediaConfig, MediaDirectories};
pub use error::{AppError, ErrorMetadata, LogLevel};
