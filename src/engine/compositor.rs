//! Design compositing
//!
//! Fits the design into the placement box and lays it over the (tinted)
//! garment, respecting the design's transparency.

use image::imageops::FilterType;
use image::RgbaImage;
use tracing::debug;

use crate::domain::DesignPlacement;

use super::blend::{blend_over, BlendMode};
use super::design::decode_design;
use super::encoder::encode_png;
use super::error::MockupError;

/// Places designs onto garment images
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    placement: DesignPlacement,
    blend_mode: BlendMode,
}

impl Compositor {
    pub fn new(placement: DesignPlacement, blend_mode: BlendMode) -> Self {
        Compositor { placement, blend_mode }
    }

    /// Resize the design to fit inside the placement box ("fit inside, no
    /// enlargement")
    pub fn fit_design(&self, design: &RgbaImage) -> RgbaImage {
        let (width, height) = design.dimensions();
        let (fitted_width, fitted_height) = self.placement.fit_dimensions(width, height);

        if (fitted_width, fitted_height) == (width, height) {
            return design.clone();
        }

        debug!(
            from_width = width,
            from_height = height,
            to_width = fitted_width,
            to_height = fitted_height,
            "Resizing design"
        );

        image::imageops::resize(design, fitted_width, fitted_height, FilterType::Lanczos3)
    }

    /// Overlay the fitted design onto the garment in place.
    ///
    /// Parts of the design falling outside the garment are clipped; the
    /// garment's dimensions never change.
    pub fn composite_image(&self, garment: &mut RgbaImage, design: &RgbaImage) {
        let fitted = self.fit_design(design);
        let (garment_width, garment_height) = garment.dimensions();
        let (design_width, design_height) = fitted.dimensions();

        for dy in 0..design_height {
            let y = self.placement.top + dy as i64;
            if y < 0 || y >= garment_height as i64 {
                continue;
            }

            for dx in 0..design_width {
                let x = self.placement.left + dx as i64;
                if x < 0 || x >= garment_width as i64 {
                    continue;
                }

                let design_pixel = fitted.get_pixel(dx, dy);

                // Skip fully transparent pixels
                if design_pixel.0[3] == 0 {
                    continue;
                }

                let base_pixel = garment.get_pixel(x as u32, y as u32);
                let blended = blend_over(self.blend_mode, base_pixel, design_pixel);
                garment.put_pixel(x as u32, y as u32, blended);
            }
        }
    }

    /// Composite encoded images (raster or SVG design); the result is a PNG at
    /// the garment's size
    pub fn composite(&self, garment_image: &[u8], design_image: &[u8]) -> Result<Vec<u8>, MockupError> {
        let mut garment = image::load_from_memory(garment_image)?.to_rgba8();
        let design = decode_design(design_image)?;

        self.composite_image(&mut garment, &design);

        Ok(encode_png(&garment)?)
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Compositor::new(DesignPlacement::default(), BlendMode::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn test_fit_design_downscales_into_box() {
        let compositor = Compositor::default();
        let design = RgbaImage::from_pixel(500, 250, RED);
        let fitted = compositor.fit_design(&design);
        assert_eq!(fitted.dimensions(), (300, 150));
    }

    #[test]
    fn test_fit_design_never_upscales() {
        let compositor = Compositor::default();
        let design = RgbaImage::from_pixel(40, 60, RED);
        assert_eq!(compositor.fit_design(&design).dimensions(), (40, 60));
    }

    #[test]
    fn test_design_lands_at_offset() {
        let compositor = Compositor::new(DesignPlacement::new(10, 10, 3, 2), BlendMode::Normal);
        let mut garment = RgbaImage::from_pixel(20, 20, WHITE);
        compositor.composite_image(&mut garment, &RgbaImage::from_pixel(4, 4, RED));

        assert_eq!(*garment.get_pixel(3, 2), RED);
        assert_eq!(*garment.get_pixel(6, 5), RED);
        assert_eq!(*garment.get_pixel(2, 2), WHITE);
        assert_eq!(*garment.get_pixel(7, 5), WHITE);
        assert_eq!(*garment.get_pixel(3, 6), WHITE);
    }

    #[test]
    fn test_transparent_design_pixels_do_not_occlude() {
        let compositor = Compositor::new(DesignPlacement::new(10, 10, 0, 0), BlendMode::Normal);
        let mut garment = RgbaImage::from_pixel(6, 6, WHITE);
        let design = RgbaImage::from_fn(4, 4, |x, _| if x < 2 { CLEAR } else { RED });
        compositor.composite_image(&mut garment, &design);

        assert_eq!(*garment.get_pixel(0, 0), WHITE);
        assert_eq!(*garment.get_pixel(1, 3), WHITE);
        assert_eq!(*garment.get_pixel(2, 0), RED);
    }

    #[test]
    fn test_design_is_clipped_to_garment() {
        let compositor = Compositor::new(DesignPlacement::new(50, 50, 8, -3), BlendMode::Normal);
        let mut garment = RgbaImage::from_pixel(10, 10, WHITE);
        compositor.composite_image(&mut garment, &RgbaImage::from_pixel(5, 5, RED));

        assert_eq!(garment.dimensions(), (10, 10));
        assert_eq!(*garment.get_pixel(9, 0), RED);
        assert_eq!(*garment.get_pixel(8, 1), RED);
        assert_eq!(*garment.get_pixel(8, 2), WHITE);
    }

    #[test]
    fn test_composite_bytes_keeps_garment_size() {
        let compositor = Compositor::default();
        let garment = encode_png(&RgbaImage::from_pixel(800, 900, WHITE)).unwrap();
        let design = encode_png(&RgbaImage::from_pixel(500, 500, Rgba([0, 0, 255, 200]))).unwrap();

        let output = compositor.composite(&garment, &design).unwrap();
        let decoded = image::load_from_memory(&output).unwrap().to_rgba8();

        assert_eq!(decoded.dimensions(), (800, 900));
        // Design fitted to 300x300 at (250, 150)
        assert_ne!(*decoded.get_pixel(250, 150), WHITE);
        assert_ne!(*decoded.get_pixel(549, 449), WHITE);
        assert_eq!(*decoded.get_pixel(550, 450), WHITE);
        assert_eq!(*decoded.get_pixel(249, 150), WHITE);
    }

    #[test]
    fn test_composite_on_small_garment_never_grows() {
        let compositor = Compositor::default();
        let garment = encode_png(&RgbaImage::from_pixel(200, 120, WHITE)).unwrap();
        let design = encode_png(&RgbaImage::from_pixel(1000, 1000, RED)).unwrap();

        let output = compositor.composite(&garment, &design).unwrap();
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 120));
    }

    #[test]
    fn test_undecodable_design_is_error() {
        let compositor = Compositor::default();
        let garment = encode_png(&RgbaImage::from_pixel(10, 10, WHITE)).unwrap();
        assert!(matches!(
            compositor.composite(&garment, b"<svg>"),
            Err(MockupError::DecodeFailed(_))
        ));
    }
}
