//! Crop rectangles and resize targets

use serde::{Deserialize, Serialize};
use tricks_core::AppError;

/// Pixel-space region selecting a sub-area of the source bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Crop data as sent by the browser cropper; coordinates may be fractional.
#[derive(Debug, Deserialize)]
struct RawCropRegion {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Parse the serialized crop array and take its first rectangle.
    ///
    /// Fractional values are truncated toward zero; negative values are rejected.
    pub fn from_json(data: &str) -> Result<Self, AppError> {
        let regions: Vec<RawCropRegion> = serde_json::from_str(data)
            .map_err(|e| AppError::InvalidCrop(format!("Malformed crop data: {}", e)))?;

        let raw = regions
            .into_iter()
            .next()
            .ok_or_else(|| AppError::InvalidCrop("Crop data contains no rectangle".to_string()))?;

        Ok(Self {
            x: pixel("x", raw.x)?,
            y: pixel("y", raw.y)?,
            width: pixel("width", raw.width)?,
            height: pixel("height", raw.height)?,
        })
    }

    /// Reject empty rectangles and rectangles not fully inside `width × height`.
    pub fn check_within(&self, width: u32, height: u32) -> Result<(), AppError> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::InvalidCrop(format!(
                "Crop rectangle {}x{} is empty",
                self.width, self.height
            )));
        }

        let right = u64::from(self.x) + u64::from(self.width);
        let bottom = u64::from(self.y) + u64::from(self.height);
        if right > u64::from(width) || bottom > u64::from(height) {
            return Err(AppError::InvalidCrop(format!(
                "Crop rectangle {}x{}+{}+{} exceeds image bounds {}x{}",
                self.width, self.height, self.x, self.y, width, height
            )));
        }

        Ok(())
    }
}

fn pixel(field: &str, value: f64) -> Result<u32, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::InvalidCrop(format!(
            "Crop {} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(value.trunc().min(f64::from(u32::MAX)) as u32)
}

/// Fixed output dimensions mandated by a media format (e.g. avatar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeFormat {
    pub width: u32,
    pub height: u32,
}

impl ResizeFormat {
    pub fn new(width: u32, height: u32) -> Result<Self, AppError> {
        if width == 0 || height == 0 {
            return Err(AppError::InvalidInput(format!(
                "Resize format must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }
}
