//! Level geometry for bargraphs and joysticks: how much of the "full" image a
//! level reveals, where the slider and cursor go, and which level a pointer
//! position stands for.

use super::border::{AssetAccess, BorderInsets};
use super::drawing::fill_circle;
use super::raster::Raster;
use super::theme;
use crate::error::{ButtonError, Result};
use crate::storage::CacheKind;
use crate::types::{Direction, LevelRange, MarkerSpec, Rect};

/// Orientation of a level axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Axis {
    pub direction: Direction,
    pub inverted: bool,
}

impl Axis {
    pub fn new(direction: Direction, inverted: bool) -> Self {
        Self {
            direction,
            inverted,
        }
    }

    fn extent(&self, size: (usize, usize)) -> usize {
        match self.direction {
            Direction::Vertical => size.1,
            Direction::Horizontal => size.0,
        }
    }
}

/// Pixels revealed along an axis of `extent` pixels
pub fn reveal_span(level: i32, range: &LevelRange, extent: usize) -> usize {
    let span = (range.fraction(level) * extent as f64).floor() as usize;
    span.min(extent)
}

/// Area of the "full" image shown for a span.
///
/// Vertical bars grow bottom-up (top-down when inverted), horizontal bars
/// from the left (from the right when inverted).
pub fn reveal_rect(span: usize, size: (usize, usize), axis: Axis) -> Rect {
    let (w, h) = size;
    match (axis.direction, axis.inverted) {
        (Direction::Vertical, false) => Rect::new(0, (h - span.min(h)) as i32, w, span.min(h)),
        (Direction::Vertical, true) => Rect::new(0, 0, w, span.min(h)),
        (Direction::Horizontal, false) => Rect::new(0, 0, span.min(w), h),
        (Direction::Horizontal, true) => Rect::new((w - span.min(w)) as i32, 0, span.min(w), h),
    }
}

/// Copy the revealed part of `full` into an intermediate raster and
/// composite it over `empty`
pub fn reveal(empty: &mut Raster, full: &Raster, area: Rect) -> Result<()> {
    if area.is_empty() {
        return Ok(());
    }
    let part = full.crop(area)?;
    empty.draw_over(&part, area.left, area.top);
    Ok(())
}

/// Reveal boundary in button coordinates; it travels inside the border insets
pub fn slider_boundary(level: i32, range: &LevelRange, size: (usize, usize), insets: BorderInsets, axis: Axis) -> i32 {
    let (w, h) = size;
    match axis.direction {
        Direction::Vertical => {
            let inner = h.saturating_sub(insets.top + insets.bottom);
            let travel = reveal_span(level, range, inner) as i32;
            if axis.inverted {
                insets.top as i32 + travel
            } else {
                (h - insets.bottom) as i32 - travel
            }
        }
        Direction::Horizontal => {
            let inner = w.saturating_sub(insets.left + insets.right);
            let travel = reveal_span(level, range, inner) as i32;
            if axis.inverted {
                (w - insets.right) as i32 - travel
            } else {
                insets.left as i32 + travel
            }
        }
    }
}

/// Draw the slider asset centred on the reveal boundary
///
/// # Arguments
/// * `raster` - Button raster
/// * `slider` - Slider asset name and colour
/// * `boundary` - Position from `slider_boundary` along the level axis
/// * `insets` - Border insets; the slider spans the cross axis between them
pub fn draw_slider(
    assets: &AssetAccess,
    raster: &mut Raster,
    slider: &MarkerSpec,
    axis: Axis,
    boundary: i32,
    insets: BorderInsets,
) -> Result<()> {
    let asset = assets
        .catalogue
        .slider(&slider.name, axis.direction)
        .ok_or_else(|| ButtonError::AssetMissing(format!("slider '{}'", slider.name)))?;
    let image = assets.tinted(&asset, slider.colour, CacheKind::Slider)?;
    if image.is_empty() {
        return Ok(());
    }

    let (w, h) = (raster.width(), raster.height());
    match axis.direction {
        Direction::Vertical => {
            let cross = w.saturating_sub(insets.left + insets.right);
            let length = (image.height() * cross / image.width()).max(1);
            let knob = image.stretched(cross, length)?;
            raster.draw_over(&knob, insets.left as i32, boundary - length as i32 / 2);
        }
        Direction::Horizontal => {
            let cross = h.saturating_sub(insets.top + insets.bottom);
            let length = (image.width() * cross / image.height()).max(1);
            let knob = image.stretched(length, cross)?;
            raster.draw_over(&knob, boundary - length as i32 / 2, insets.top as i32);
        }
    }
    Ok(())
}

/// Cursor centre for joystick levels
pub fn cursor_centre(x: i32, y: i32, range: &LevelRange, size: (usize, usize), aux_inverted: bool) -> (i32, i32) {
    let (w, h) = (size.0 as f64, size.1 as f64);
    let cx = (range.fraction(x) * w).round() as i32;
    let fy = range.fraction(y);
    let fy = if aux_inverted { 1. - fy } else { fy };
    (cx, (fy * h).round() as i32)
}

/// Draw the joystick cursor; the built-in circle stands in when there's no asset
pub fn draw_cursor(
    assets: &AssetAccess,
    raster: &mut Raster,
    cursor: Option<&MarkerSpec>,
    centre: (i32, i32),
) -> Result<()> {
    let (cx, cy) = centre;
    let asset = cursor.and_then(|c| assets.catalogue.cursor(&c.name).map(|a| (a, c.colour)));
    match asset {
        Some((asset, colour)) => {
            let image = assets.tinted(&asset, colour, CacheKind::Cursor)?;
            raster.draw_over(
                &image,
                cx - image.width() as i32 / 2,
                cy - image.height() as i32 / 2,
            );
        }
        None => {
            let colour = cursor.map_or(theme::CURSOR_COLOUR, |c| c.colour);
            fill_circle(raster, cx, cy, theme::CURSOR_RADIUS, colour);
        }
    }
    Ok(())
}

/// Level selected by pressing at (x, y) on an active bargraph
pub fn level_at(x: i32, y: i32, size: (usize, usize), axis: Axis, range: &LevelRange) -> i32 {
    let extent = axis.extent(size).max(1) as f64;
    let pos = match axis.direction {
        Direction::Vertical => extent - y as f64,
        Direction::Horizontal => x as f64,
    };
    let pos = if axis.inverted { extent - pos } else { pos };
    let fraction = (pos / extent).clamp(0., 1.);
    range.clamp(range.low + (fraction * range.span() as f64).round() as i32)
}

/// Joystick levels for a press at (x, y)
pub fn joystick_at(x: i32, y: i32, size: (usize, usize), range: &LevelRange, aux_inverted: bool) -> (i32, i32) {
    let (w, h) = (size.0.max(1) as f64, size.1.max(1) as f64);
    let fx = (x as f64 / w).clamp(0., 1.);
    let fy = (y as f64 / h).clamp(0., 1.);
    let fy = if aux_inverted { 1. - fy } else { fy };
    let span = range.span() as f64;
    (
        range.clamp(range.low + (fx * span).round() as i32),
        range.clamp(range.low + (fy * span).round() as i32),
    )
}

/// Level change for a pointer drag from `from` to `to`
pub fn drag_delta(from: (i32, i32), to: (i32, i32), size: (usize, usize), axis: Axis, range: &LevelRange) -> i32 {
    let extent = axis.extent(size).max(1) as f64;
    let travel = match axis.direction {
        Direction::Vertical => from.1 - to.1,
        Direction::Horizontal => to.0 - from.0,
    };
    let travel = if axis.inverted { -travel } else { travel };
    (travel as f64 / extent * range.span() as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ImageCache, MemoryImages, StaticCatalogue};

    fn percent() -> LevelRange {
        LevelRange {
            low: 0,
            high: 100,
            ..Default::default()
        }
    }

    #[test]
    fn test_reveal_span_clamps() {
        let r = percent();
        assert_eq!(reveal_span(50, &r, 50), 25);
        assert_eq!(reveal_span(0, &r, 50), 0);
        assert_eq!(reveal_span(100, &r, 50), 50);
        assert_eq!(reveal_span(-20, &r, 50), 0);
        assert_eq!(reveal_span(300, &r, 50), 50);
        assert_eq!(reveal_span(33, &r, 50), 16);
    }

    #[test]
    fn test_reveal_rect_orientation() {
        let v = Axis::new(Direction::Vertical, false);
        assert_eq!(reveal_rect(25, (100, 50), v), Rect::new(0, 25, 100, 25));
        let vi = Axis::new(Direction::Vertical, true);
        assert_eq!(reveal_rect(25, (100, 50), vi), Rect::new(0, 0, 100, 25));
        let hz = Axis::new(Direction::Horizontal, false);
        assert_eq!(reveal_rect(40, (100, 50), hz), Rect::new(0, 0, 40, 50));
        let hi = Axis::new(Direction::Horizontal, true);
        assert_eq!(reveal_rect(40, (100, 50), hi), Rect::new(60, 0, 40, 50));
    }

    #[test]
    fn test_reveal_composites_full_over_empty() {
        let mut empty = Raster::filled(4, 4, 0xFF000000).unwrap();
        let full = Raster::filled(4, 4, 0xFFFFFFFF).unwrap();
        let area = reveal_rect(2, (4, 4), Axis::new(Direction::Vertical, false));
        reveal(&mut empty, &full, area).unwrap();
        assert_eq!(empty.get(0, 1), 0xFF000000);
        assert_eq!(empty.get(0, 2), 0xFFFFFFFF);
        assert_eq!(empty.get(3, 3), 0xFFFFFFFF);
    }

    #[test]
    fn test_level_from_press() {
        let r = percent();
        let v = Axis::new(Direction::Vertical, false);
        assert_eq!(level_at(10, 0, (20, 100), v, &r), 100);
        assert_eq!(level_at(10, 100, (20, 100), v, &r), 0);
        assert_eq!(level_at(10, 75, (20, 100), v, &r), 25);
        let hi = Axis::new(Direction::Horizontal, true);
        assert_eq!(level_at(20, 5, (100, 10), hi, &r), 80);
    }

    #[test]
    fn test_joystick_mapping() {
        let r = percent();
        assert_eq!(joystick_at(50, 25, (100, 100), &r, false), (50, 25));
        assert_eq!(joystick_at(50, 25, (100, 100), &r, true), (50, 75));
        assert_eq!(cursor_centre(50, 25, &r, (200, 100), false), (100, 25));
        assert_eq!(cursor_centre(50, 25, &r, (200, 100), true), (100, 75));
    }

    #[test]
    fn test_drag_delta() {
        let r = percent();
        let v = Axis::new(Direction::Vertical, false);
        assert_eq!(drag_delta((5, 80), (5, 30), (10, 100), v, &r), 50);
        let vi = Axis::new(Direction::Vertical, true);
        assert_eq!(drag_delta((5, 80), (5, 30), (10, 100), vi, &r), -50);
    }

    #[test]
    fn test_slider_boundary_stays_inside_border() {
        let r = percent();
        let insets = BorderInsets::uniform(5);
        let v = Axis::new(Direction::Vertical, false);
        assert_eq!(slider_boundary(0, &r, (20, 110), insets, v), 105);
        assert_eq!(slider_boundary(100, &r, (20, 110), insets, v), 5);
        assert_eq!(slider_boundary(50, &r, (20, 110), insets, v), 55);
    }

    #[test]
    fn test_cursor_falls_back_to_circle() {
        let catalogue = StaticCatalogue::new();
        let images = MemoryImages::new();
        let cache = ImageCache::new(1 << 20);
        let assets = AssetAccess {
            catalogue: &catalogue,
            loader: &images,
            cache: &cache,
        };
        let mut raster = Raster::new(40, 40).unwrap();
        let spec = MarkerSpec {
            name: "missing".into(),
            colour: 0xFFFF0000,
        };
        draw_cursor(&assets, &mut raster, Some(&spec), (20, 20)).unwrap();
        assert_eq!(raster.get(20, 20), 0xFFFF0000);
        assert_eq!(raster.get(2, 2), 0);
    }
}
