//! Straight-alpha ARGB raster and the pixel primitives every layer builds on.
//!
//! Pixels are u32 in packed ARGB format: 0xAARRGGBB. Colour channels are not
//! premultiplied, so a raster can be handed to the display callback as-is.

use crate::error::{ButtonError, Result};
use crate::types::Rect;
use rayon::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

/// Allocate a pixel buffer without aborting the process on failure
pub(crate) fn alloc_pixels(width: usize, height: usize, fill: u32) -> Result<Vec<u32>> {
    let failure = || ButtonError::AllocationFailure { width, height };
    let len = width.checked_mul(height).ok_or_else(failure)?;
    let mut pixels = Vec::new();
    pixels.try_reserve_exact(len).map_err(|_| failure())?;
    pixels.resize(len, fill);
    Ok(pixels)
}

impl Raster {
    /// Fully transparent raster
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: usize, height: usize, colour: u32) -> Result<Self> {
        Ok(Self {
            width,
            height,
            pixels: alloc_pixels(width, height, colour)?,
        })
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(ButtonError::Decode(format!(
                "{} pixels for a {}x{} raster",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// From tightly packed RGBA8 bytes (the `image` crate layout)
    pub fn from_rgba8(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != width * height * 4 {
            return Err(ButtonError::Decode(format!(
                "{} bytes for a {}x{} RGBA raster",
                bytes.len(),
                width,
                height
            )));
        }
        let mut pixels = alloc_pixels(width, height, 0)?;
        pixels
            .par_iter_mut()
            .zip(bytes.par_chunks_exact(4))
            .for_each(|(px, c)| *px = pack_argb(c[0], c[1], c[2], c[3]));
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for &px in &self.pixels {
            let (r, g, b, a) = unpack_argb(px);
            bytes.extend_from_slice(&[r, g, b, a]);
        }
        bytes
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Memory held by the pixel buffer
    pub fn byte_size(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<u32>()
    }

    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width, self.height)
    }

    /// Pixel at (x, y); transparent outside the raster
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0;
        }
        self.pixels[y as usize * self.width + x as usize]
    }

    #[inline]
    pub fn put(&mut self, x: i32, y: i32, colour: u32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = colour;
    }

    /// Blend a colour onto one pixel with the given coverage
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, colour: u32, coverage: u8) {
        if coverage == 0 || x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height
        {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        let a = ((colour >> 24) * coverage as u32 + 127) / 255;
        self.pixels[idx] = blend_over(self.pixels[idx], (colour & 0x00FF_FFFF) | (a << 24));
    }

    pub fn is_transparent_at(&self, x: i32, y: i32) -> bool {
        self.get(x, y) >> 24 == 0
    }

    pub fn fill(&mut self, colour: u32) {
        self.pixels.par_iter_mut().for_each(|px| *px = colour);
    }

    /// Composite `src` source-over with its top-left at (left, top), clipped to this raster
    pub fn draw_over(&mut self, src: &Raster, left: i32, top: i32) {
        let clip = self.bounds();
        self.draw_over_clipped(src, left, top, clip);
    }

    /// Composite `src` source-over, touching only pixels inside `clip`
    pub fn draw_over_clipped(&mut self, src: &Raster, left: i32, top: i32, clip: Rect) {
        let Some(area) = intersect(self.bounds(), clip)
            .and_then(|c| intersect(c, Rect::new(left, top, src.width, src.height)))
        else {
            return;
        };

        let width = self.width;
        let x0 = area.left as usize;
        let x1 = x0 + area.width;
        let y0 = area.top as usize;
        let rows = &mut self.pixels[y0 * width..(y0 + area.height) * width];

        rows.par_chunks_mut(width)
            .enumerate()
            .for_each(|(row_idx, row)| {
                let sy = (y0 + row_idx) as i32 - top;
                let src_row = &src.pixels[sy as usize * src.width..(sy as usize + 1) * src.width];
                for x in x0..x1 {
                    let sx = (x as i32 - left) as usize;
                    row[x] = blend_over(row[x], src_row[sx]);
                }
            });
    }

    /// Copy of the area `rect` (clipped to the raster)
    pub fn crop(&self, rect: Rect) -> Result<Raster> {
        let Some(area) = intersect(self.bounds(), rect) else {
            return Raster::new(0, 0);
        };
        let mut out = alloc_pixels(area.width, area.height, 0)?;
        for (row_idx, row) in out.chunks_mut(area.width.max(1)).enumerate() {
            let start = (area.top as usize + row_idx) * self.width + area.left as usize;
            row.copy_from_slice(&self.pixels[start..start + area.width]);
        }
        Raster::from_pixels(area.width, area.height, out)
    }

    /// Scaled copy, alpha-correct (premultiplied while filtering)
    pub fn stretched(&self, width: usize, height: usize) -> Result<Raster> {
        use rgb::FromSlice;

        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        if width == 0 || height == 0 || self.is_empty() {
            return Raster::new(width, height);
        }

        let src = self.to_rgba8();
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(ButtonError::AllocationFailure { width, height })?;
        let mut dst = Vec::new();
        dst.try_reserve_exact(len)
            .map_err(|_| ButtonError::AllocationFailure { width, height })?;
        dst.resize(len, 0u8);

        let mut resizer = resize::new(
            self.width,
            self.height,
            width,
            height,
            resize::Pixel::RGBA8P,
            resize::Type::Triangle,
        )
        .map_err(|e| ButtonError::Decode(format!("Failed to create resizer: {:?}", e)))?;
        resizer
            .resize(src.as_rgba(), dst.as_rgba_mut())
            .map_err(|e| ButtonError::Decode(format!("Failed to resize: {:?}", e)))?;

        Raster::from_rgba8(width, height, &dst)
    }

    /// Clear an area to transparent
    pub fn erase_rect(&mut self, rect: Rect) {
        let Some(area) = intersect(self.bounds(), rect) else {
            return;
        };
        for y in area.top as usize..area.top as usize + area.height {
            let start = y * self.width + area.left as usize;
            self.pixels[start..start + area.width].fill(0);
        }
    }

    /// Multiply every pixel's alpha by `opacity / 255`
    pub fn scale_opacity(&mut self, opacity: u8) {
        if opacity == 255 {
            return;
        }
        self.pixels.par_iter_mut().for_each(|px| {
            let a = (*px >> 24) * opacity as u32 / 255;
            *px = (*px & 0x00FF_FFFF) | (a << 24);
        });
    }

    /// Solid `colour` shaped by this raster's alpha (asset tinting)
    pub fn colourized(&self, colour: u32) -> Result<Raster> {
        let mut pixels = alloc_pixels(self.width, self.height, 0)?;
        let ca = colour >> 24;
        pixels
            .par_iter_mut()
            .zip(self.pixels.par_iter())
            .for_each(|(out, &px)| {
                let a = (px >> 24) * ca / 255;
                *out = if a == 0 { 0 } else { (colour & 0x00FF_FFFF) | (a << 24) };
            });
        Raster::from_pixels(self.width, self.height, pixels)
    }
}

/// Overlap of two rectangles, `None` when empty
pub fn intersect(a: Rect, b: Rect) -> Option<Rect> {
    let left = a.left.max(b.left);
    let top = a.top.max(b.top);
    let right = (a.left + a.width as i32).min(b.left + b.width as i32);
    let bottom = (a.top + a.height as i32).min(b.top + b.height as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        left,
        top,
        (right - left) as usize,
        (bottom - top) as usize,
    ))
}

#[inline]
pub fn pack_argb(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline]
pub fn unpack_argb(pixel: u32) -> (u8, u8, u8, u8) {
    let a = (pixel >> 24) as u8;
    let r = (pixel >> 16) as u8;
    let g = (pixel >> 8) as u8;
    let b = pixel as u8;
    (r, g, b, a)
}

/// Exact `x / 255` of four 16-bit lanes, each lane at most 255 * 255
#[inline]
fn div255_lanes(x: u64) -> u64 {
    let t = x + ((x >> 8) & 0x00FF00FF00FF00FF) + 0x0001000100010001;
    (t >> 8) & 0x00FF00FF00FF00FF
}

/// Interpolate between two colours, all four channels. `t` = 0 gives `from`.
#[inline]
pub fn lerp_argb(from: u32, to: u32, t: u8) -> u32 {
    let mut a = from as u64;
    a = (a | (a << 16)) & 0x0000FFFF0000FFFF;
    a = (a | (a << 8)) & 0x00FF00FF00FF00FF;

    let mut b = to as u64;
    b = (b | (b << 16)) & 0x0000FFFF0000FFFF;
    b = (b | (b << 8)) & 0x00FF00FF00FF00FF;

    let mut blended = div255_lanes(a * (255 - t as u64) + b * t as u64);
    blended = (blended | (blended >> 8)) & 0x0000FFFF0000FFFF;
    blended = blended | (blended >> 16);

    blended as u32
}

/// Straight-alpha source-over of one pixel
#[inline]
pub fn blend_over(dst: u32, src: u32) -> u32 {
    let sa = src >> 24;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = dst >> 24;
    if da == 0 {
        return src;
    }
    if da == 255 {
        // Opaque backdrop: plain lerp of the colour lanes
        let mut d = dst as u64;
        d = (d | (d << 16)) & 0x0000FFFF0000FFFF;
        d = (d | (d << 8)) & 0x00FF00FF00FF00FF;

        let mut s = src as u64;
        s = (s | (s << 16)) & 0x0000FFFF0000FFFF;
        s = (s | (s << 8)) & 0x00FF00FF00FF00FF;

        let mut blended = div255_lanes(d * (255 - sa) as u64 + s * sa as u64);
        blended = (blended | (blended >> 8)) & 0x0000FFFF0000FFFF;
        blended = blended | (blended >> 16) | 0xFF000000;
        return blended as u32;
    }

    let out_a = sa + da * (255 - sa) / 255;
    let channel = |shift: u32| -> u32 {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        let num = s * sa * 255 + d * da * (255 - sa);
        (num / (out_a * 255)).min(255) << shift
    };
    (out_a << 24) | channel(16) | channel(8) | channel(0)
}
