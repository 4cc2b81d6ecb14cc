//! Glyph coverage masks and the text effect passes built from them.
//!
//! The fill pass and every effect pass read the same mask, so outlines,
//! glows and shadows always register exactly with the glyphs.

use super::raster::Raster;
use crate::error::{ButtonError, Result};
use crate::types::{EffectSize, ShadowTier, TextEffect};
use rayon::prelude::*;

/// 8-bit coverage, one byte per pixel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl CoverageMask {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let failure = || ButtonError::AllocationFailure { width, height };
        let len = width.checked_mul(height).ok_or_else(failure)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| failure())?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }

    /// Combine coverage with what is already there (max, so overlapping glyphs don't darken)
    #[inline]
    pub fn stamp(&mut self, x: i32, y: i32, coverage: u8) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.data[idx] = self.data[idx].max(coverage);
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&c| c == 0)
    }

    /// Grow coverage by `radius` pixels (circular structuring element)
    pub fn dilated(&self, radius: usize) -> CoverageMask {
        if radius == 0 {
            return self.clone();
        }
        let r = radius as i32;
        let offsets: Vec<(i32, i32)> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
            .collect();

        let width = self.width;
        let mut data = vec![0u8; self.data.len()];
        data.par_chunks_mut(width.max(1))
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let mut best = 0u8;
                    for &(dx, dy) in &offsets {
                        best = best.max(self.get(x as i32 + dx, y as i32 + dy));
                        if best == 255 {
                            break;
                        }
                    }
                    *out = best;
                }
            });
        CoverageMask {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Approximate Gaussian blur with three box passes
    pub fn blurred(&self, sigma: f32) -> CoverageMask {
        if sigma <= 0. {
            return self.clone();
        }
        // Box width for three passes of a Gaussian with this sigma
        let ideal = (12. * sigma * sigma / 3. + 1.).sqrt();
        let radius = ((ideal - 1.) / 2.).round().max(1.) as usize;

        let mut data: Vec<u16> = self.data.iter().map(|&c| c as u16).collect();
        for _ in 0..3 {
            data = box_pass(&data, self.width, self.height, radius, true);
            data = box_pass(&data, self.width, self.height, radius, false);
        }
        CoverageMask {
            width: self.width,
            height: self.height,
            data: data.into_iter().map(|v| v.min(255) as u8).collect(),
        }
    }

    /// Copy moved by (dx, dy); uncovered area is empty
    pub fn shifted(&self, dx: i32, dy: i32) -> CoverageMask {
        let mut out = CoverageMask {
            width: self.width,
            height: self.height,
            data: vec![0; self.data.len()],
        };
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let c = self.get(x - dx, y - dy);
                if c > 0 {
                    out.data[y as usize * self.width + x as usize] = c;
                }
            }
        }
        out
    }

    /// Blend `colour` into `raster` weighted by coverage
    pub fn paint(&self, raster: &mut Raster, colour: u32) {
        self.paint_scaled(raster, colour, 255);
    }

    /// As `paint`, with coverage multiplied by `alpha / 255`
    pub fn paint_scaled(&self, raster: &mut Raster, colour: u32, alpha: u8) {
        for y in 0..self.height.min(raster.height()) {
            for x in 0..self.width.min(raster.width()) {
                let c = self.data[y * self.width + x];
                if c > 0 {
                    let c = (c as u32 * alpha as u32 / 255) as u8;
                    raster.blend_pixel(x as i32, y as i32, colour, c);
                }
            }
        }
    }
}

/// One horizontal or vertical running-sum box filter pass
fn box_pass(src: &[u16], width: usize, height: usize, radius: usize, horizontal: bool) -> Vec<u16> {
    let mut out = vec![0u16; src.len()];
    let (lines, len) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };
    let index = |line: usize, i: usize| {
        if horizontal {
            line * width + i
        } else {
            i * width + line
        }
    };
    let window = (radius * 2 + 1) as u32;

    for line in 0..lines {
        let mut sum: u32 = 0;
        // Prime the window for position 0 (edges count as empty)
        for i in 0..=radius.min(len.saturating_sub(1)) {
            sum += src[index(line, i)] as u32;
        }
        for i in 0..len {
            out[index(line, i)] = (sum / window) as u16;
            let add = i + radius + 1;
            if add < len {
                sum += src[index(line, add)] as u32;
            }
            if i >= radius {
                sum -= src[index(line, i - radius)] as u32;
            }
        }
    }
    out
}

fn outline_width(size: EffectSize) -> usize {
    match size {
        EffectSize::Small => 1,
        EffectSize::Medium => 2,
        EffectSize::Large => 3,
        EffectSize::ExtraLarge => 4,
    }
}

fn glow_radius(size: EffectSize) -> f32 {
    match size {
        EffectSize::Small => 2.,
        EffectSize::Medium => 4.,
        EffectSize::Large => 6.,
        EffectSize::ExtraLarge => 8.,
    }
}

fn draw_shadow(raster: &mut Raster, mask: &CoverageMask, tier: ShadowTier, distance: u8, colour: u32) {
    let gap = distance.clamp(1, 8) as i32;
    let shadow = mask.shifted(gap, gap).blurred(tier.sigma());
    shadow.paint_scaled(raster, colour, tier.alpha());
}

/// Draw the passes of `effect` that go underneath the glyph fill
///
/// # Arguments
/// * `raster` - Button raster the text is drawn into
/// * `mask` - Glyph coverage of the whole text block, raster-sized
/// * `effect` - Effect selected for the instance
/// * `colour` - Effect colour (outline, glow and shadow all use it)
pub fn draw_under(raster: &mut Raster, mask: &CoverageMask, effect: TextEffect, colour: u32) {
    #[cfg(feature = "verbose-render")]
    log::trace!("Text effect {} ({})", effect.id(), effect.name());

    match effect {
        TextEffect::None => {}
        TextEffect::Outline(size) => {
            mask.dilated(outline_width(size)).paint(raster, colour);
        }
        TextEffect::Glow(size) => {
            mask.dilated(1).blurred(glow_radius(size) / 2.).paint(raster, colour);
        }
        TextEffect::DropShadow {
            tier,
            distance,
            outline,
        } => {
            draw_shadow(raster, mask, tier, distance, colour);
            if outline {
                mask.dilated(1).paint(raster, colour);
            }
        }
    }
}
