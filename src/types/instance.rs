use super::draw_order::DrawOrder;
use crate::ui::theme;
use std::time::Duration;

/// Maximum number of stacked bitmap layers per instance
pub const MAX_BITMAP_LAYERS: usize = 5;

/// Placement of a bitmap, icon or text block inside the button.
///
/// Numeric codes follow the project format: 0 absolute, 1..=9 the 3x3 grid
/// read left to right and top to bottom, 10 scale to fit, 11 scale keeping
/// aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Justification {
    Absolute { x: i32, y: i32 },
    TopLeft,
    TopMiddle,
    TopRight,
    CentreLeft,
    #[default]
    CentreMiddle,
    CentreRight,
    BottomLeft,
    BottomMiddle,
    BottomRight,
    ScaleFit,
    ScaleAspect,
}

/// Horizontal or vertical third of the 3x3 grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Start,
    Middle,
    End,
}

impl Justification {
    pub fn from_code(code: u8, x: i32, y: i32) -> Self {
        match code {
            0 => Justification::Absolute { x, y },
            1 => Justification::TopLeft,
            2 => Justification::TopMiddle,
            3 => Justification::TopRight,
            4 => Justification::CentreLeft,
            6 => Justification::CentreRight,
            7 => Justification::BottomLeft,
            8 => Justification::BottomMiddle,
            9 => Justification::BottomRight,
            10 => Justification::ScaleFit,
            11 => Justification::ScaleAspect,
            _ => Justification::CentreMiddle,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Justification::Absolute { .. } => 0,
            Justification::TopLeft => 1,
            Justification::TopMiddle => 2,
            Justification::TopRight => 3,
            Justification::CentreLeft => 4,
            Justification::CentreMiddle => 5,
            Justification::CentreRight => 6,
            Justification::BottomLeft => 7,
            Justification::BottomMiddle => 8,
            Justification::BottomRight => 9,
            Justification::ScaleFit => 10,
            Justification::ScaleAspect => 11,
        }
    }

    /// Horizontal alignment; scaled and absolute placements report `Middle`
    pub fn column(self) -> Align {
        match self {
            Justification::TopLeft | Justification::CentreLeft | Justification::BottomLeft => {
                Align::Start
            }
            Justification::TopRight | Justification::CentreRight | Justification::BottomRight => {
                Align::End
            }
            _ => Align::Middle,
        }
    }

    pub fn row(self) -> Align {
        match self {
            Justification::TopLeft | Justification::TopMiddle | Justification::TopRight => {
                Align::Start
            }
            Justification::BottomLeft
            | Justification::BottomMiddle
            | Justification::BottomRight => Align::End,
            _ => Align::Middle,
        }
    }

    pub fn is_scaled(self) -> bool {
        matches!(self, Justification::ScaleFit | Justification::ScaleAspect)
    }
}

/// Remote bitmap fetched out-of-band
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteSource {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Re-fetch interval; `None` fetches once
    pub refresh: Option<Duration>,
}

impl RemoteSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            user: None,
            password: None,
            refresh: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BitmapSource {
    File(String),
    Remote(RemoteSource),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitmapLayer {
    pub source: BitmapSource,
    pub justification: Justification,
}

impl BitmapLayer {
    pub fn file(name: &str) -> Self {
        Self {
            source: BitmapSource::File(name.to_string()),
            justification: Justification::CentreMiddle,
        }
    }

    pub fn remote(source: RemoteSource) -> Self {
        Self {
            source: BitmapSource::Remote(source),
            justification: Justification::CentreMiddle,
        }
    }

    pub fn justified(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.source, BitmapSource::Remote(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconRef {
    pub index: u32,
    pub justification: Justification,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientKind {
    /// Angle in degrees, 0 = left to right, 90 = top to bottom
    Linear { angle: f32 },
    /// Centre as fractions of the button size, radius as a fraction of the half-diagonal
    Radial { centre: (f32, f32), radius: f32 },
    Sweep { centre: (f32, f32) },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    /// Evenly spaced colour stops, at least one
    pub colours: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FontRef {
    /// Font table entry of the project
    Id(u32),
    /// Font file with explicit point size
    File { file: String, size: f32 },
}

impl Default for FontRef {
    fn default() -> Self {
        FontRef::Id(theme::DEFAULT_FONT_ID)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl EffectSize {
    fn from_index(i: u8) -> Self {
        match i {
            0 => EffectSize::Small,
            1 => EffectSize::Medium,
            2 => EffectSize::Large,
            _ => EffectSize::ExtraLarge,
        }
    }

    fn index(self) -> u8 {
        self as u8
    }

    fn suffix(self) -> char {
        ['S', 'M', 'L', 'X'][self.index() as usize]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowTier {
    Soft,
    Medium,
    Hard,
}

impl ShadowTier {
    fn from_index(i: u8) -> Self {
        match i {
            0 => ShadowTier::Soft,
            1 => ShadowTier::Medium,
            _ => ShadowTier::Hard,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ShadowTier::Soft => "Soft",
            ShadowTier::Medium => "Medium",
            ShadowTier::Hard => "Hard",
        }
    }

    /// Gaussian sigma of the shadow blur
    pub fn sigma(self) -> f32 {
        match self {
            ShadowTier::Soft => 3.0,
            ShadowTier::Medium => 2.0,
            ShadowTier::Hard => 1.1,
        }
    }

    /// Peak shadow alpha
    pub fn alpha(self) -> u8 {
        match self {
            ShadowTier::Soft => 127,
            ShadowTier::Medium => 159,
            ShadowTier::Hard => 207,
        }
    }
}

/// Text effect, numbered 0..=56 in the project format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEffect {
    #[default]
    None,
    Outline(EffectSize),
    Glow(EffectSize),
    DropShadow {
        tier: ShadowTier,
        /// Offset in pixels on both axes, 1..=8
        distance: u8,
        outline: bool,
    },
}

impl TextEffect {
    pub fn from_id(id: u8) -> Self {
        match id {
            1..=4 => TextEffect::Outline(EffectSize::from_index(id - 1)),
            5..=8 => TextEffect::Glow(EffectSize::from_index(id - 5)),
            9..=56 => {
                let n = id - 9;
                TextEffect::DropShadow {
                    tier: ShadowTier::from_index((n / 8) % 3),
                    distance: n % 8 + 1,
                    outline: n >= 24,
                }
            }
            _ => TextEffect::None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            TextEffect::None => 0,
            TextEffect::Outline(size) => 1 + size.index(),
            TextEffect::Glow(size) => 5 + size.index(),
            TextEffect::DropShadow {
                tier,
                distance,
                outline,
            } => {
                let base = if outline { 33 } else { 9 };
                base + tier as u8 * 8 + distance.clamp(1, 8) - 1
            }
        }
    }

    /// Effect from its display name, e.g. "Glow-M" or "Hard Drop Shadow 3 with outline"
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("none") {
            return Some(TextEffect::None);
        }
        (1..=56).map(TextEffect::from_id).find(|e| e.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> String {
        match self {
            TextEffect::None => "None".to_string(),
            TextEffect::Outline(size) => format!("Outline-{}", size.suffix()),
            TextEffect::Glow(size) => format!("Glow-{}", size.suffix()),
            TextEffect::DropShadow {
                tier,
                distance,
                outline,
            } => {
                let mut name = format!("{} Drop Shadow {}", tier.label(), distance);
                if outline {
                    name.push_str(" with outline");
                }
                name
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarqueeMode {
    #[default]
    Left,
    Right,
    PingPong,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Marquee {
    pub mode: MarqueeMode,
    /// Scroll rate, 1 (slow) to 10 (fast)
    pub rate: u8,
    pub enabled: bool,
}

/// One visual state of a button
#[derive(Clone, Debug, PartialEq)]
pub struct ButtonInstance {
    pub index: usize,
    pub fill: u32,
    pub gradient: Option<Gradient>,
    pub border_colour: u32,
    /// Border name, empty = no border
    pub border_style: String,
    pub bitmaps: Vec<BitmapLayer>,
    /// Chameleon template mask; the first bitmap layer becomes its overlay
    pub chameleon: Option<String>,
    pub icon: Option<IconRef>,
    pub text: String,
    pub text_colour: u32,
    pub effect_colour: u32,
    pub font: FontRef,
    pub text_justification: Justification,
    pub word_wrap: bool,
    pub effect: TextEffect,
    pub marquee: Option<Marquee>,
    /// `None` inherits full opacity
    pub opacity: Option<u8>,
    pub draw_order: Option<DrawOrder>,
}

impl ButtonInstance {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            fill: theme::DEFAULT_FILL,
            gradient: None,
            border_colour: theme::DEFAULT_BORDER,
            border_style: String::new(),
            bitmaps: Vec::new(),
            chameleon: None,
            icon: None,
            text: String::new(),
            text_colour: theme::DEFAULT_TEXT,
            effect_colour: theme::DEFAULT_EFFECT,
            font: FontRef::default(),
            text_justification: Justification::CentreMiddle,
            word_wrap: false,
            effect: TextEffect::None,
            marquee: None,
            opacity: None,
            draw_order: None,
        }
    }

    pub fn has_border(&self) -> bool {
        !self.border_style.is_empty()
    }

    /// Chameleon rendering applies only when a mask is set and no border is drawn
    pub fn uses_chameleon(&self) -> bool {
        self.chameleon.is_some() && !self.has_border()
    }

    pub fn is_marquee_line(&self) -> bool {
        self.marquee.map_or(false, |m| m.enabled)
    }
}
