//! Output encoding for finished mockups

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageOutputFormat, Rgba, RgbaImage};
use thiserror::Error;

/// Encoding errors
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Cannot encode an empty image")]
    EmptyImage,
}

/// Output format for encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy WebP, keeps alpha
    WebP { quality: u8 },
    /// Lossless PNG, keeps alpha
    Png,
    /// JPEG, flattened on white
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// Parse a format name (case-insensitive) with an optional quality.
    ///
    /// Defaults: WebP 85, JPEG 85.
    pub fn from_str(format: &str, quality: Option<u8>) -> Result<Self, EncodeError> {
        if let Some(q) = quality {
            if q == 0 || q > 100 {
                return Err(EncodeError::InvalidQuality(q));
            }
        }

        match format.trim().to_lowercase().as_str() {
            "webp" => Ok(OutputFormat::WebP { quality: quality.unwrap_or(85) }),
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg { quality: quality.unwrap_or(85) }),
            other => Err(EncodeError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::WebP { .. } => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg { .. } => "jpg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::WebP { .. } => "image/webp",
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    /// Encode an RGBA image
    pub fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EncodeError::EmptyImage);
        }

        match *self {
            OutputFormat::WebP { quality } => {
                let encoder = webp::Encoder::from_rgba(image.as_raw(), width, height);
                Ok(encoder.encode(quality as f32).to_vec())
            }
            OutputFormat::Png => encode_png(image),
            OutputFormat::Jpeg { quality } => {
                let flattened = flatten_on_white(image);
                let mut buffer = Vec::new();
                DynamicImage::ImageRgb8(flattened)
                    .write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::Jpeg(quality))?;
                Ok(buffer)
            }
        }
    }
}

/// Encode image to PNG bytes (preserves RGBA transparency)
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::Png)?;
    Ok(buffer)
}

/// Re-encode in the container the bytes originally came in.
///
/// JPEG is kept as JPEG; anything the build cannot write goes out as PNG.
pub fn encode_like(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        ImageFormat::Jpeg => OutputFormat::Jpeg { quality: 90 }.encode(image),
        ImageFormat::Png => encode_png(image),
        other => {
            let mut buffer = Vec::new();
            match image.write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::from(other)) {
                Ok(()) => Ok(buffer),
                Err(_) => encode_png(image),
            }
        }
    }
}

fn flatten_on_white(image: &RgbaImage) -> image::RgbImage {
    let (width, height) = image.dimensions();
    image::RgbImage::from_fn(width, height, |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let alpha = a as u32;
        let mix = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([mix(r), mix(g), mix(b)])
    })
}
