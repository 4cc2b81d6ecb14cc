//! Shared drawing primitives: solid and gradient fills, strokes, circles.
//!
//! Everything works on a `Raster` and composites source-over, so a primitive
//! drawn after other layers never wipes them out.

use super::raster::{blend_over, lerp_argb, Raster};
use crate::error::Result;
use crate::types::{Gradient, GradientKind, Rect};
use rayon::prelude::*;

/// Composite a flat colour over the whole raster
///
/// # Arguments
/// * `raster` - Destination
/// * `colour` - ARGB fill colour
pub fn fill_solid(raster: &mut Raster, colour: u32) -> Result<()> {
    if colour >> 24 == 0 {
        return Ok(());
    }
    let source = Raster::filled(raster.width(), raster.height(), colour)?;
    raster.draw_over(&source, 0, 0);
    Ok(())
}

/// Composite a flat colour over an area
pub fn fill_rect(raster: &mut Raster, rect: Rect, colour: u32) -> Result<()> {
    if rect.is_empty() || colour >> 24 == 0 {
        return Ok(());
    }
    let source = Raster::filled(rect.width, rect.height, colour)?;
    raster.draw_over(&source, rect.left, rect.top);
    Ok(())
}

/// Rasterize a gradient into a same-size source and composite it
///
/// # Arguments
/// * `raster` - Destination
/// * `gradient` - Kind and evenly spaced colour stops
pub fn fill_gradient(raster: &mut Raster, gradient: &Gradient) -> Result<()> {
    let (width, height) = (raster.width(), raster.height());
    if width == 0 || height == 0 || gradient.colours.is_empty() {
        return Ok(());
    }
    let mut source = Raster::new(width, height)?;
    let colours = &gradient.colours;
    let kind = gradient.kind;

    source
        .pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| draw_gradient_row(row, y, width, height, kind, colours));

    raster.draw_over(&source, 0, 0);
    Ok(())
}

/// One row of a gradient; `t` runs 0.0..=1.0 across the colour stops
#[inline]
fn draw_gradient_row(
    row: &mut [u32],
    y: usize,
    width: usize,
    height: usize,
    kind: GradientKind,
    colours: &[u32],
) {
    let (w, h) = (width as f32, height as f32);
    let py = y as f32 + 0.5;

    match kind {
        GradientKind::Linear { angle } => {
            let (sin, cos) = angle.to_radians().sin_cos();
            // Project the corners to find the extent along the gradient axis
            let corners = [(0., 0.), (w, 0.), (0., h), (w, h)];
            let (mut min, mut max) = (f32::MAX, f32::MIN);
            for (cx, cy) in corners {
                let d = cx * cos + cy * sin;
                min = min.min(d);
                max = max.max(d);
            }
            let span = (max - min).max(f32::EPSILON);
            for (x, px) in row.iter_mut().enumerate() {
                let d = (x as f32 + 0.5) * cos + py * sin;
                *px = sample_stops(colours, (d - min) / span);
            }
        }
        GradientKind::Radial { centre, radius } => {
            let (cx, cy) = (centre.0 * w, centre.1 * h);
            let r = (radius * (w * w + h * h).sqrt() / 2.).max(f32::EPSILON);
            for (x, px) in row.iter_mut().enumerate() {
                let dx = x as f32 + 0.5 - cx;
                let dy = py - cy;
                *px = sample_stops(colours, (dx * dx + dy * dy).sqrt() / r);
            }
        }
        GradientKind::Sweep { centre } => {
            let (cx, cy) = (centre.0 * w, centre.1 * h);
            for (x, px) in row.iter_mut().enumerate() {
                let angle = (py - cy).atan2(x as f32 + 0.5 - cx);
                let t = (angle + std::f32::consts::PI) / std::f32::consts::TAU;
                *px = sample_stops(colours, t);
            }
        }
    }
}

/// Colour at `t` along evenly spaced stops
pub fn sample_stops(colours: &[u32], t: f32) -> u32 {
    match colours.len() {
        0 => 0,
        1 => colours[0],
        n => {
            let pos = t.clamp(0., 1.) * (n - 1) as f32;
            let i = (pos.floor() as usize).min(n - 2);
            let frac = ((pos - i as f32) * 255.).round() as u8;
            lerp_argb(colours[i], colours[i + 1], frac)
        }
    }
}

/// Stroke a rectangle outline `pen` pixels wide, inside `rect`
pub fn stroke_rect(raster: &mut Raster, rect: Rect, pen: usize, colour: u32) -> Result<()> {
    if pen == 0 || rect.is_empty() {
        return Ok(());
    }
    let pen_w = pen.min(rect.width);
    let pen_h = pen.min(rect.height);
    let right = rect.left + rect.width as i32 - pen_w as i32;
    let bottom = rect.top + rect.height as i32 - pen_h as i32;

    fill_rect(raster, Rect::new(rect.left, rect.top, rect.width, pen_h), colour)?;
    fill_rect(raster, Rect::new(rect.left, bottom, rect.width, pen_h), colour)?;
    let inner_h = rect.height.saturating_sub(pen_h * 2);
    let inner_top = rect.top + pen_h as i32;
    fill_rect(raster, Rect::new(rect.left, inner_top, pen_w, inner_h), colour)?;
    fill_rect(raster, Rect::new(right, inner_top, pen_w, inner_h), colour)
}

/// Anti-aliased rounded-rectangle outline
///
/// # Arguments
/// * `rect` - Outer bounds of the stroke
/// * `radius` - Corner radius (clamped to half the shorter side)
/// * `pen` - Stroke width
pub fn stroke_rounded_rect(
    raster: &mut Raster,
    rect: Rect,
    radius: usize,
    pen: usize,
    colour: u32,
) {
    if rect.is_empty() || pen == 0 {
        return;
    }
    let (w, h) = (rect.width as f32, rect.height as f32);
    let r = (radius as f32).min(w / 2.).min(h / 2.);
    let pen = pen as f32;

    for y in 0..rect.height {
        for x in 0..rect.width {
            let d = rounded_rect_distance(x as f32 + 0.5, y as f32 + 0.5, w, h, r);
            // Coverage of the band [-pen, 0] with a one-pixel soft edge on both sides
            let outer = (0.5 - d).clamp(0., 1.);
            let inner = (d + pen + 0.5).clamp(0., 1.);
            let coverage = (outer.min(inner) * 255.) as u8;
            raster.blend_pixel(rect.left + x as i32, rect.top + y as i32, colour, coverage);
        }
    }
}

/// Signed distance to the edge of a rounded rectangle at the origin (negative inside)
fn rounded_rect_distance(px: f32, py: f32, w: f32, h: f32, r: f32) -> f32 {
    let qx = (px - w / 2.).abs() - (w / 2. - r);
    let qy = (py - h / 2.).abs() - (h / 2. - r);
    let outside = (qx.max(0.).powi(2) + qy.max(0.).powi(2)).sqrt();
    outside + qx.max(qy).min(0.) - r
}

/// Anti-aliased filled circle
///
/// # Arguments
/// * `cx`, `cy` - Centre in raster coordinates
/// * `radius` - Outer radius; the last pixel ring is the soft edge
pub fn fill_circle(raster: &mut Raster, cx: i32, cy: i32, radius: usize, colour: u32) {
    let r_outer = radius as i32;
    let r_outer2 = r_outer * r_outer;
    let r_inner = r_outer.saturating_sub(1);
    let r_inner2 = r_inner * r_inner;
    let edge_range = (r_outer2 - r_inner2).max(1);

    for dy in -r_outer..=r_outer {
        let dy2 = dy * dy;
        for dx in -r_outer..=r_outer {
            let dist2 = dx * dx + dy2;
            if dist2 > r_outer2 {
                continue;
            }
            // 255 inside, fading to 0 across the edge band
            let coverage = if dist2 <= r_inner2 {
                255
            } else {
                255 - (((dist2 - r_inner2) << 8) / edge_range).min(255)
            };
            raster.blend_pixel(cx + dx, cy + dy, colour, coverage as u8);
        }
    }
}

/// Shade the four edges of a rectangle: top/left by `light`, bottom/right by `dark`
pub fn bevel_edges(raster: &mut Raster, width: usize, light: u32, dark: u32) {
    let (w, h) = (raster.width() as i32, raster.height() as i32);
    for i in 0..width as i32 {
        for x in i..w - i {
            let top = raster.get(x, i);
            raster.put(x, i, blend_over(top, light));
            let bottom = raster.get(x, h - 1 - i);
            raster.put(x, h - 1 - i, blend_over(bottom, dark));
        }
        for y in i + 1..h - 1 - i {
            let left = raster.get(i, y);
            raster.put(i, y, blend_over(left, light));
            let right = raster.get(w - 1 - i, y);
            raster.put(w - 1 - i, y, blend_over(right, dark));
        }
    }
}
