//! Garment color tinting
//!
//! A white t-shirt photo is colored by laying a translucent solid-color layer
//! over it. Multiply keeps the fabric's folds and shadows visible instead of
//! flattening them the way a plain recolor would.

use std::borrow::Cow;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{MockupSettings, DEFAULT_TINT_OPACITY};
use crate::domain::{ColorSpec, Rgb};

use super::blend::{blend_atop, BlendMode};
use super::encoder::encode_like;
use super::error::MockupError;

/// Opacity and blend mode of the color layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintSettings {
    pub opacity: f32,
    pub blend_mode: BlendMode,
}

impl Default for TintSettings {
    fn default() -> Self {
        TintSettings {
            opacity: DEFAULT_TINT_OPACITY,
            blend_mode: BlendMode::Multiply,
        }
    }
}

impl From<&MockupSettings> for TintSettings {
    fn from(settings: &MockupSettings) -> Self {
        TintSettings {
            opacity: settings.tint_opacity,
            blend_mode: settings.tint_blend_mode,
        }
    }
}

/// Tint an image in place. Dimensions and alpha are untouched.
pub fn tint_image(image: &mut RgbaImage, color: Rgb, settings: &TintSettings) {
    let channels = color.channels();
    let mode = settings.blend_mode;
    let opacity = settings.opacity;

    let pixels: &mut [u8] = image;
    pixels.par_chunks_exact_mut(4).for_each(|px| {
        let base = Rgba([px[0], px[1], px[2], px[3]]);
        let tinted = blend_atop(mode, &base, channels, opacity);
        px.copy_from_slice(&tinted.0);
    });
}

/// Resolve the color a garment is tinted with. An invalid color means the
/// garment stays untinted: logged as a warning, never an error.
pub fn tint_color(color_hex: &str) -> Option<ColorSpec> {
    match ColorSpec::parse(color_hex) {
        Ok(color) => Some(color),
        Err(e) => {
            warn!(color = %color_hex, error = %e, "Tint skipped, using untinted garment");
            None
        }
    }
}

/// Tint encoded image bytes.
///
/// An invalid color is not an error: the input comes back untouched
/// (borrowed, byte-for-byte) and a warning is logged. Output is encoded in
/// the same container as the input when the build can write it.
pub fn tint<'a>(
    base_image: &'a [u8],
    color_hex: &str,
    settings: &TintSettings,
) -> Result<Cow<'a, [u8]>, MockupError> {
    let Some(color) = tint_color(color_hex) else {
        return Ok(Cow::Borrowed(base_image));
    };

    let format = image::guess_format(base_image)?;
    let mut image = image::load_from_memory_with_format(base_image, format)?.to_rgba8();
    tint_image(&mut image, color.rgb(), settings);

    debug!(
        color = %color,
        width = image.width(),
        height = image.height(),
        "Tinted garment"
    );

    Ok(Cow::Owned(encode_like(&image, format)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::encoder::encode_png;

    fn garment(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    #[test]
    fn test_tint_image_colors_white_fabric() {
        let mut image = garment(3, 2);
        tint_image(&mut image, Rgb::new(0x33, 0x66, 0xCC), &TintSettings::default());

        assert_eq!(*image.get_pixel(1, 0), Rgba([194, 209, 240, 255]));
        assert_eq!(*image.get_pixel(2, 1), Rgba([194, 209, 240, 255]));
        // Transparent background stays transparent
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_zero_opacity_is_identity() {
        let original = garment(5, 5);
        let mut image = original.clone();
        let settings = TintSettings { opacity: 0.0, blend_mode: BlendMode::Multiply };
        tint_image(&mut image, Rgb::new(10, 20, 30), &settings);
        assert_eq!(image, original);
    }

    #[test]
    fn test_valid_colors_keep_dimensions() {
        let bytes = encode_png(&garment(37, 23)).unwrap();
        for hex in ["#3366CC", "3366cc", "#FFF", "abc", "#000000"] {
            let tinted = tint(&bytes, hex, &TintSettings::default()).unwrap();
            assert!(matches!(tinted, Cow::Owned(_)), "{hex} should tint");
            let decoded = image::load_from_memory(&tinted).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (37, 23), "{hex}");
        }
    }

    #[test]
    fn test_tint_color_resolution() {
        assert_eq!(tint_color("#3366cc").map(|c| c.rgb()), Some(Rgb::new(0x33, 0x66, 0xCC)));
        assert_eq!(tint_color("f00").map(|c| c.rgb()), Some(Rgb::new(255, 0, 0)));
        assert!(tint_color("xyz").is_none());
        assert!(tint_color("#12345").is_none());
    }

    #[test]
    fn test_invalid_color_returns_input_unchanged() {
        let bytes = encode_png(&garment(8, 8)).unwrap();
        for hex in ["xyz", "", "#12", "#GGGGGG", "blue"] {
            let result = tint(&bytes, hex, &TintSettings::default()).unwrap();
            assert!(matches!(result, Cow::Borrowed(_)));
            assert_eq!(result.as_ref(), bytes.as_slice());
        }
    }

    #[test]
    fn test_invalid_color_skips_even_undecodable_input() {
        let junk = b"not an image".to_vec();
        let result = tint(&junk, "nope", &TintSettings::default()).unwrap();
        assert_eq!(result.as_ref(), junk.as_slice());
    }

    #[test]
    fn test_valid_color_on_garbage_is_decode_error() {
        let result = tint(b"not an image", "#FF0000", &TintSettings::default());
        assert!(matches!(result, Err(MockupError::DecodeFailed(_))));
    }

    #[test]
    fn test_jpeg_input_stays_jpeg() {
        let jpeg = crate::engine::OutputFormat::Jpeg { quality: 90 }
            .encode(&RgbaImage::from_pixel(16, 16, Rgba([250, 250, 250, 255])))
            .unwrap();
        let tinted = tint(&jpeg, "#FF0000", &TintSettings::default()).unwrap();
        assert_eq!(image::guess_format(&tinted).unwrap(), image::ImageFormat::Jpeg);
    }
}
