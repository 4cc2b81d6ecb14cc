// Default colours, fonts and the built-in system border table
// All colours are u32 in packed ARGB format: 0xAARRGGBB

// Instance defaults
pub const DEFAULT_FILL: u32 = 0xFF_00_00_00;
pub const DEFAULT_BORDER: u32 = 0xFF_FF_FF_FF;
pub const DEFAULT_TEXT: u32 = 0xFF_FF_FF_FF;
pub const DEFAULT_EFFECT: u32 = 0xFF_00_00_00;

// Level controls
pub const SLIDER_COLOUR: u32 = 0xFF_D0_D0_D0;
pub const CURSOR_COLOUR: u32 = 0xFF_F0_F0_F0;
pub const CURSOR_RADIUS: usize = 6;

// Fonts
pub const DEFAULT_FONT_ID: u32 = 1;
pub const DEFAULT_FONT_FAMILY: &str = "Open Sans";
pub const DEFAULT_FONT_SIZE: f32 = 10.;

/// Bevel shading deltas (light edge, dark edge)
pub const BEVEL_INSET: (i16, i16) = (-20, 20);
pub const BEVEL_RAISED: (i16, i16) = (10, -10);

/// Procedural border drawn when the asset catalogue has no fragments for a name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemBorder {
    /// Plain rectangular stroke of the given width
    Frame(usize),
    /// Stroke with a second inner line
    PictureFrame,
    /// Rounded stroke with the given corner radius
    Circle(usize),
    /// Shaded edges (light delta, dark delta)
    Bevel(i16, i16),
}

impl SystemBorder {
    /// Stroke thickness, used to inset bitmaps and text
    pub fn thickness(self) -> usize {
        match self {
            SystemBorder::Frame(w) => w,
            SystemBorder::PictureFrame => 6,
            SystemBorder::Circle(_) => 2,
            SystemBorder::Bevel(_, _) => 4,
        }
    }
}

/// Built-in border by name (case-insensitive)
pub fn system_border(name: &str) -> Option<SystemBorder> {
    let name = name.trim().to_ascii_lowercase();
    match name.as_str() {
        "single line" | "single frame" => return Some(SystemBorder::Frame(1)),
        "double line" | "double frame" => return Some(SystemBorder::Frame(2)),
        "quad line" | "quad frame" => return Some(SystemBorder::Frame(4)),
        "picture frame" => return Some(SystemBorder::PictureFrame),
        "bevel inset -s" | "bevel inset -m" | "bevel inset -l" | "bevel inset" => {
            return Some(SystemBorder::Bevel(BEVEL_INSET.0, BEVEL_INSET.1))
        }
        "bevel raised -s" | "bevel raised -m" | "bevel raised -l" | "bevel raised" => {
            return Some(SystemBorder::Bevel(BEVEL_RAISED.0, BEVEL_RAISED.1))
        }
        _ => {}
    }

    // "Circle 15" .. "Circle 195": diameter of the rounded corners
    let diameter = name.strip_prefix("circle")?.trim().parse::<usize>().ok()?;
    (15..=195)
        .contains(&diameter)
        .then_some(SystemBorder::Circle(diameter / 2))
}
