//! Design decoding
//!
//! Designs arrive as raster images (PNG, WebP, JPEG) or as SVG. SVG is
//! rasterized at its intrinsic size so the compositor can fit it into the
//! placement box like any other image.

use image::RgbaImage;
use resvg::{tiny_skia, usvg};
use tracing::debug;

use super::error::MockupError;

/// Longest side an SVG is rasterized at
pub const MAX_SVG_DIMENSION: u32 = 4096;

/// Bytes inspected when sniffing for SVG markup
const SNIFF_LEN: usize = 1024;

/// Whether `bytes` look like SVG markup rather than a raster image
pub fn is_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let Ok(text) = std::str::from_utf8(head).or_else(|e| std::str::from_utf8(&head[..e.valid_up_to()])) else {
        return false;
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if !text.starts_with('<') {
        return false;
    }
    text.to_ascii_lowercase().contains("<svg")
}

/// Decode a design into straight-alpha RGBA
pub fn decode_design(bytes: &[u8]) -> Result<RgbaImage, MockupError> {
    if is_svg(bytes) {
        return rasterize_svg(bytes);
    }
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Rasterize SVG markup at its intrinsic size, scaled down when the longest
/// side exceeds [`MAX_SVG_DIMENSION`]
pub fn rasterize_svg(bytes: &[u8]) -> Result<RgbaImage, MockupError> {
    let mut options = usvg::Options::default();
    // Only inline data URIs; no file or network lookups from design markup
    options.image_href_resolver.resolve_string = Box::new(|_, _| None);

    let tree = usvg::Tree::from_data(bytes, &options)
        .map_err(|e| MockupError::SvgDecodeFailed(e.to_string()))?;

    let size = tree.size();
    let (source_width, source_height) = (size.width(), size.height());
    if !(source_width > 0.0 && source_height > 0.0) {
        return Err(MockupError::SvgDecodeFailed("SVG has no size".to_string()));
    }

    let longest = source_width.max(source_height);
    let scale = (MAX_SVG_DIMENSION as f32 / longest).min(1.0);
    let width = ((source_width * scale).round() as u32).clamp(1, MAX_SVG_DIMENSION);
    let height = ((source_height * scale).round() as u32).clamp(1, MAX_SVG_DIMENSION);

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| MockupError::SvgDecodeFailed(format!("invalid raster size {width}x{height}")))?;
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; the blend stages expect straight alpha
    let mut raw = Vec::with_capacity(pixmap.pixels().len() * 4);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        raw.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    debug!(width, height, "Rasterized SVG design");

    RgbaImage::from_raw(width, height, raw)
        .ok_or_else(|| MockupError::SvgDecodeFailed("raster buffer size mismatch".to_string()))
}
