//! Pixel blend modes
//!
//! All math works on straight (non-premultiplied) alpha in sRGB space without
//! any color-space conversion.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// How an overlay pixel's color mixes with the pixel underneath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    /// Darkens: `base * overlay`. Used to color light fabric.
    Multiply,
    Screen,
    Overlay,
}

impl BlendMode {
    /// Mix two normalized channel values
    fn mix(self, base: f32, overlay: f32) -> f32 {
        match self {
            BlendMode::Normal => overlay,
            BlendMode::Multiply => base * overlay,
            BlendMode::Screen => 1.0 - (1.0 - base) * (1.0 - overlay),
            BlendMode::Overlay => {
                if base < 0.5 {
                    2.0 * base * overlay
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - overlay)
                }
            }
        }
    }
}

#[inline]
fn to_channel(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Composite `overlay` over `base` ("source-over" with a blend mode).
///
/// Where the base is opaque this reduces to
/// `mix(base, overlay) * a + base * (1 - a)`.
pub fn blend_over(mode: BlendMode, base: &Rgba<u8>, overlay: &Rgba<u8>) -> Rgba<u8> {
    let src_a = overlay.0[3] as f32 / 255.0;
    if src_a <= 0.0 {
        return *base;
    }
    let dst_a = base.0[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    let mut result = [0u8; 4];
    for i in 0..3 {
        let b = base.0[i] as f32 / 255.0;
        let o = overlay.0[i] as f32 / 255.0;
        let mixed = mode.mix(b, o);

        let value = (src_a * (1.0 - dst_a) * o + src_a * dst_a * mixed + (1.0 - src_a) * dst_a * b) / out_a;
        result[i] = to_channel(value);
    }
    result[3] = to_channel(out_a);

    Rgba(result)
}

/// Blend a translucent solid color into `base`, keeping the base's alpha
/// ("source-atop"). Transparent template areas stay transparent.
pub fn blend_atop(mode: BlendMode, base: &Rgba<u8>, color: [u8; 3], opacity: f32) -> Rgba<u8> {
    let alpha = opacity.clamp(0.0, 1.0);
    if alpha <= 0.0 || base.0[3] == 0 {
        return *base;
    }

    let mut result = [0u8; 4];
    for i in 0..3 {
        let b = base.0[i] as f32 / 255.0;
        let o = color[i] as f32 / 255.0;
        result[i] = to_channel(mode.mix(b, o) * alpha + b * (1.0 - alpha));
    }
    result[3] = base.0[3];

    Rgba(result)
}
