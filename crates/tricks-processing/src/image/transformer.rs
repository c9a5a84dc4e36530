//! Image transformer - crop, scale and copy onto an output canvas
//!
//! Every intermediate bitmap is owned by the function that creates it, so all of
//! them are released on return, whether the transform succeeds or not.

use crate::image::format::ImageKind;
use crate::image::geometry::{CropRegion, ResizeFormat};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbImage, RgbaImage};
use tricks_core::AppError;

/// Resampling filter used when scaling to the target format (bilinear).
pub const SCALE_FILTER: FilterType = FilterType::Triangle;

pub struct ImageTransformer;

impl ImageTransformer {
    /// Cut `region` out of `img`; the rectangle must lie inside the image.
    pub fn crop(img: &DynamicImage, region: CropRegion) -> Result<DynamicImage, AppError> {
        let (width, height) = img.dimensions();
        region.check_within(width, height)?;
        Ok(img.crop_imm(region.x, region.y, region.width, region.height))
    }

    /// Blank output canvas. PNG and GIF canvases start fully transparent and
    /// keep their alpha channel; JPEG canvases are opaque RGB.
    pub fn canvas(kind: ImageKind, size: ResizeFormat) -> DynamicImage {
        if kind.has_alpha() {
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                size.width,
                size.height,
                Rgba([0, 0, 0, 0]),
            ))
        } else {
            DynamicImage::ImageRgb8(RgbImage::new(size.width, size.height))
        }
    }

    /// Stretch to exactly `size`; aspect ratio is not preserved.
    pub fn scale(img: &DynamicImage, size: ResizeFormat) -> DynamicImage {
        img.resize_exact(size.width, size.height, SCALE_FILTER)
    }

    /// Crop, scale and copy onto a fresh canvas for `kind`.
    pub fn crop_and_resize(
        img: DynamicImage,
        region: CropRegion,
        size: ResizeFormat,
        kind: ImageKind,
    ) -> Result<DynamicImage, AppError> {
        let cropped = Self::crop(&img, region)?;
        drop(img);

        let mut canvas = Self::canvas(kind, size);
        let scaled = Self::scale(&cropped, size);
        drop(cropped);

        // Pixels are replaced, not blended, so transparency survives.
        imageops::replace(&mut canvas, &scaled, 0, 0);

        tracing::debug!(
            crop_x = region.x,
            crop_y = region.y,
            crop_width = region.width,
            crop_height = region.height,
            width = size.width,
            height = size.height,
            format = ?kind,
            "Cropped and resized image"
        );

        Ok(canvas)
    }
}
