//! Placement of bitmaps, icons and text blocks inside a button.

use crate::types::{Align, Justification, Rect};

/// Where an element of `content` size lands inside the button.
///
/// `scaled` is set when the content must be stretched to `width` x `height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub left: i32,
    pub top: i32,
    pub width: usize,
    pub height: usize,
    pub scaled: bool,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

/// Offset along one axis for a 3x3 grid alignment
fn align(align: Align, extent: usize, content: usize, inset: usize) -> i32 {
    match align {
        Align::Start => inset as i32,
        Align::Middle => (extent as i32 - content as i32) / 2,
        Align::End => extent as i32 - content as i32 - inset as i32,
    }
}

/// Position `content` inside a `button`-sized area.
///
/// # Arguments
/// * `button` - Button width and height
/// * `content` - Natural width and height of the element
/// * `inset` - Border thickness (plus padding for text) kept clear on every side
/// * `justification` - Grid cell, absolute offset or scaling mode
pub fn place(
    button: (usize, usize),
    content: (usize, usize),
    inset: usize,
    justification: Justification,
) -> Placement {
    let (bw, bh) = button;
    let (cw, ch) = content;
    let inner_w = bw.saturating_sub(inset * 2);
    let inner_h = bh.saturating_sub(inset * 2);

    match justification {
        Justification::Absolute { x, y } => Placement {
            left: x,
            top: y,
            width: cw,
            height: ch,
            scaled: false,
        },
        Justification::ScaleFit => Placement {
            left: inset as i32,
            top: inset as i32,
            width: inner_w,
            height: inner_h,
            scaled: (cw, ch) != (inner_w, inner_h),
        },
        Justification::ScaleAspect => {
            let (w, h) = aspect_fit((cw, ch), (inner_w, inner_h));
            Placement {
                left: (bw as i32 - w as i32) / 2,
                top: (bh as i32 - h as i32) / 2,
                width: w,
                height: h,
                scaled: (cw, ch) != (w, h),
            }
        }
        grid => Placement {
            left: align(grid.column(), bw, cw, inset),
            top: align(grid.row(), bh, ch, inset),
            width: cw,
            height: ch,
            scaled: false,
        },
    }
}

/// Largest size with the aspect ratio of `content` that fits in `area`
pub fn aspect_fit(content: (usize, usize), area: (usize, usize)) -> (usize, usize) {
    let (cw, ch) = content;
    let (aw, ah) = area;
    if cw == 0 || ch == 0 {
        return (0, 0);
    }
    let scale = (aw as f64 / cw as f64).min(ah as f64 / ch as f64);
    (
        ((cw as f64 * scale).round() as usize).min(aw),
        ((ch as f64 * scale).round() as usize).min(ah),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_positions() {
        let p = place((100, 50), (20, 10), 2, Justification::TopLeft);
        assert_eq!((p.left, p.top), (2, 2));
        let p = place((100, 50), (20, 10), 2, Justification::CentreMiddle);
        assert_eq!((p.left, p.top), (40, 20));
        let p = place((100, 50), (20, 10), 2, Justification::BottomRight);
        assert_eq!((p.left, p.top), (78, 38));
        assert!(!p.scaled);
    }

    #[test]
    fn test_oversized_content_centres_negative() {
        let p = place((40, 40), (60, 20), 0, Justification::CentreMiddle);
        assert_eq!(p.left, -10);
    }

    #[test]
    fn test_scale_fit_uses_inner_area() {
        let p = place((100, 50), (10, 10), 3, Justification::ScaleFit);
        assert_eq!(p.rect(), Rect::new(3, 3, 94, 44));
        assert!(p.scaled);
    }

    #[test]
    fn test_scale_aspect() {
        let p = place((100, 50), (20, 20), 0, Justification::ScaleAspect);
        assert_eq!((p.width, p.height), (50, 50));
        assert_eq!((p.left, p.top), (25, 0));
        assert_eq!(aspect_fit((0, 5), (10, 10)), (0, 0));
    }

    #[test]
    fn test_absolute() {
        let p = place((100, 50), (20, 10), 5, Justification::Absolute { x: -3, y: 7 });
        assert_eq!((p.left, p.top), (-3, 7));
    }
}
