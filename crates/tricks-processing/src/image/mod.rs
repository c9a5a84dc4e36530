//! Image processing module
//!
//! This module provides:
//! - Format dispatch with per-format codecs (format)
//! - Crop rectangles and resize targets (geometry)
//! - The crop → canvas → scale transform (transformer)

pub mod format;
pub mod geometry;
pub mod transformer;

pub use format::{Codec, ImageKind};
pub use geometry::{CropRegion, ResizeFormat};
pub use transformer::ImageTransformer;
