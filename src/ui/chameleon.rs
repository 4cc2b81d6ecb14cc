//! Chameleon colour substitution.
//!
//! A chameleon mask marks template regions with red (fill) and green
//! (border) markers; the button's live colours are substituted per pixel and
//! an optional overlay image is layered on top.

use super::raster::{alloc_pixels, blend_over, Raster};
use crate::error::Result;
use rayon::prelude::*;

/// Colour for one mask pixel
///
/// # Arguments
/// * `mask` - Template pixel (ARGB)
/// * `overlay` - Overlay pixel at the same position, 0 when there is none
/// * `fill` - Colour substituted for red markers
/// * `border` - Colour substituted for green markers
#[inline]
pub fn base_colour(mask: u32, overlay: u32, fill: u32, border: u32) -> u32 {
    let alpha = mask >> 24;
    if alpha == 0 {
        return overlay;
    }
    let red = (mask >> 16) & 0xFF;
    let green = (mask >> 8) & 0xFF;

    let colour = match (red > 0, green > 0) {
        (true, true) if green > red => border,
        (true, _) => fill,
        (false, true) => border,
        (false, false) => return 0,
    };
    // Marker alpha shapes the substituted colour
    let a = (colour >> 24) * alpha / 255;
    (colour & 0x00FF_FFFF) | (a << 24)
}

/// Colourize `mask` and composite `overlay` (if any) atop it.
///
/// The overlay is aligned to the mask's top-left corner; the result has the
/// mask's size.
pub fn colourize(mask: &Raster, overlay: Option<&Raster>, fill: u32, border: u32) -> Result<Raster> {
    let (width, height) = (mask.width(), mask.height());
    let mut pixels = alloc_pixels(width, height, 0)?;

    pixels
        .par_chunks_mut(width.max(1))
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let m = mask.pixels()[y * width + x];
                let o = overlay.map_or(0, |o| o.get(x as i32, y as i32));
                let base = base_colour(m, o, fill, border);
                // Transparent mask pixels already are the overlay
                *px = if m >> 24 == 0 { base } else { blend_over(base, o) };
            }
        });

    Raster::from_pixels(width, height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILL: u32 = 0xFF102030;
    const BORDER: u32 = 0xFFA0B0C0;

    #[test]
    fn test_marker_classification() {
        assert_eq!(base_colour(0xFFFF0000, 0, FILL, BORDER), FILL);
        assert_eq!(base_colour(0xFF00FF00, 0, FILL, BORDER), BORDER);
        assert_eq!(base_colour(0xFFC08000, 0, FILL, BORDER), FILL);
        assert_eq!(base_colour(0xFF40C000, 0, FILL, BORDER), BORDER);
        assert_eq!(base_colour(0xFF0000FF, 0, FILL, BORDER), 0);
    }

    #[test]
    fn test_equal_markers_pick_fill() {
        assert_eq!(base_colour(0xFF808000, 0, FILL, BORDER), FILL);
    }

    #[test]
    fn test_transparent_mask_passes_overlay() {
        assert_eq!(base_colour(0x00FF0000, 0xFF123456, FILL, BORDER), 0xFF123456);
        assert_eq!(base_colour(0x00FF0000, 0, FILL, BORDER), 0);
    }

    #[test]
    fn test_marker_alpha_scales_colour() {
        assert_eq!(base_colour(0x80FF0000, 0, FILL, BORDER), 0x80102030);
    }

    #[test]
    fn test_colourize_with_overlay() {
        let mut mask = Raster::filled(2, 1, 0xFFFF0000).unwrap();
        mask.put(1, 0, 0x00000000);
        let overlay = Raster::filled(2, 1, 0xFF00FF00).unwrap();
        let out = colourize(&mask, Some(&overlay), FILL, BORDER).unwrap();
        // Opaque overlay covers the substituted colour
        assert_eq!(out.get(0, 0), 0xFF00FF00);
        assert_eq!(out.get(1, 0), 0xFF00FF00);

        let out = colourize(&mask, None, FILL, BORDER).unwrap();
        assert_eq!(out.get(0, 0), FILL);
        assert_eq!(out.get(1, 0), 0);
    }
}
