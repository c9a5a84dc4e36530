//! Supported upload formats and their codecs
//!
//! Each `ImageKind` carries its own decode/encode functions, so adding a format
//! means adding a variant and the compiler points at every place that needs it.

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, Frame, ImageFormat, ImageReader, ImageResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tricks_core::AppError;

/// JPEG output is always written at maximum quality.
pub const JPEG_QUALITY: u8 = 100;

/// Decode and encode entry points for one format.
#[derive(Clone, Copy)]
pub struct Codec {
    pub decode: fn(&Path) -> ImageResult<DynamicImage>,
    pub encode: fn(&DynamicImage, &Path) -> ImageResult<()>,
}

const JPEG_CODEC: Codec = Codec {
    decode: decode_jpeg,
    encode: encode_jpeg,
};

const PNG_CODEC: Codec = Codec {
    decode: decode_png,
    encode: encode_png,
};

const GIF_CODEC: Codec = Codec {
    decode: decode_gif,
    encode: encode_gif,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    pub const ALL: [ImageKind; 3] = [ImageKind::Jpeg, ImageKind::Png, ImageKind::Gif];

    /// Parse an upload extension (`jpeg`, `jpg`, `png`, `gif`).
    pub fn parse(extension: &str) -> Result<Self, AppError> {
        match extension.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageKind::Jpeg),
            "png" => Ok(ImageKind::Png),
            "gif" => Ok(ImageKind::Gif),
            other => Err(AppError::InvalidInput(format!(
                "Unsupported image format: {}",
                other
            ))),
        }
    }

    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    pub fn codec(self) -> Codec {
        match self {
            ImageKind::Jpeg => JPEG_CODEC,
            ImageKind::Png => PNG_CODEC,
            ImageKind::Gif => GIF_CODEC,
        }
    }

    /// Whether the output canvas keeps an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, ImageKind::Png | ImageKind::Gif)
    }

    /// Every extension that maps to this kind, canonical one first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageKind::Jpeg => &["jpg", "jpeg"],
            ImageKind::Png => &["png"],
            ImageKind::Gif => &["gif"],
        }
    }

    pub fn canonical_extension(self) -> &'static str {
        self.extensions()[0]
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
        }
    }
}

fn decode_with(path: &Path, format: ImageFormat) -> ImageResult<DynamicImage> {
    let file = File::open(path)?;
    ImageReader::with_format(BufReader::new(file), format).decode()
}

fn decode_jpeg(path: &Path) -> ImageResult<DynamicImage> {
    decode_with(path, ImageFormat::Jpeg)
}

fn decode_png(path: &Path) -> ImageResult<DynamicImage> {
    decode_with(path, ImageFormat::Png)
}

fn decode_gif(path: &Path) -> ImageResult<DynamicImage> {
    decode_with(path, ImageFormat::Gif)
}

fn encode_jpeg(img: &DynamicImage, path: &Path) -> ImageResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(())
}

fn encode_png(img: &DynamicImage, path: &Path) -> ImageResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder =
        PngEncoder::new_with_quality(&mut writer, CompressionType::Fast, FilterType::NoFilter);
    DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(())
}

fn encode_gif(img: &DynamicImage, path: &Path) -> ImageResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    {
        // The trailer is written when the encoder is dropped.
        let mut encoder = GifEncoder::new(&mut writer);
        encoder.encode_frame(Frame::new(img.to_rgba8()))?;
    }
    writer.flush()?;
    Ok(())
}
