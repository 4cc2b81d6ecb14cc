use std::fmt;
use std::time::Duration;

/// Button handle: page/subpage number in the high 16 bits, button id in the low 16
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ButtonHandle(pub u32);

impl ButtonHandle {
    pub fn new(page: u16, id: u16) -> Self {
        Self(((page as u32) << 16) | id as u32)
    }

    /// Handle of the page or subpage owning this button
    pub fn parent(self) -> u32 {
        self.0 & 0xFFFF_0000
    }

    pub fn id(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl fmt::Display for ButtonHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0 >> 16, self.id())
    }
}

/// Pixel rectangle, origin top-left
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(left: i32, top: i32, width: usize, height: usize) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn sized(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left
            && y >= self.top
            && x < self.left + self.width as i32
            && y < self.top + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ButtonType {
    #[default]
    General,
    MultistateGeneral,
    Bargraph,
    MultistateBargraph,
    Joystick,
    TextInput,
    Listbox,
    SubviewAnchor,
}

impl ButtonType {
    /// Types whose visual state is driven by a level value
    pub fn is_level_driven(self) -> bool {
        matches!(
            self,
            ButtonType::Bargraph | ButtonType::MultistateBargraph | ButtonType::Joystick
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Feedback {
    #[default]
    None,
    Channel,
    InvertedChannel,
    AlwaysOn,
    Momentary,
    Blink,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LevelFunction {
    #[default]
    DisplayOnly,
    Active,
    ActiveCentering,
    Drag,
    DragCentering,
}

impl LevelFunction {
    pub fn is_centering(self) -> bool {
        matches!(self, LevelFunction::ActiveCentering | LevelFunction::DragCentering)
    }

    pub fn is_drag(self) -> bool {
        matches!(self, LevelFunction::Drag | LevelFunction::DragCentering)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

/// How a press decides whether it hit the button
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HitTest {
    /// Presses on fully transparent pixels fall through
    #[default]
    Pixels,
    Bounds,
}

/// Port/code pair. Port 0 or code 0 means "not bound".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Address {
    pub port: u16,
    pub code: u16,
}

impl Address {
    pub fn new(port: u16, code: u16) -> Self {
        Self { port, code }
    }

    pub fn is_bound(&self) -> bool {
        self.port > 0 && self.code > 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    pub address: Address,
    pub channel: Address,
    pub level: Address,
}

impl Bindings {
    /// Level address carrying the joystick Y axis
    pub fn level_y(&self) -> Address {
        Address::new(self.level.port, self.level.code.saturating_add(1))
    }
}

/// Cyclic animation timing: step counts and per-step times for up and down
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationTiming {
    pub up_steps: u32,
    pub up_time: Duration,
    pub down_steps: u32,
    pub down_time: Duration,
}

impl AnimationTiming {
    pub fn interval(&self) -> Duration {
        self.up_time * self.up_steps + self.down_time * self.down_steps
    }

    pub fn is_cyclic(&self) -> bool {
        !self.interval().is_zero()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelRange {
    pub low: i32,
    pub high: i32,
    /// Level units per drag step
    pub drag_increment: i32,
    /// Time for a full-range move upward (zero = jump)
    pub ramp_up: Duration,
    pub ramp_down: Duration,
}

impl Default for LevelRange {
    fn default() -> Self {
        Self {
            low: 0,
            high: 255,
            drag_increment: 2,
            ramp_up: Duration::ZERO,
            ramp_down: Duration::ZERO,
        }
    }
}

impl LevelRange {
    pub fn clamp(&self, level: i32) -> i32 {
        level.clamp(self.low.min(self.high), self.high.max(self.low))
    }

    pub fn span(&self) -> i32 {
        self.high - self.low
    }

    pub fn centre(&self) -> i32 {
        self.low + self.span() / 2
    }

    /// Fraction 0.0..=1.0 of `level` within the range
    pub fn fraction(&self, level: i32) -> f64 {
        if self.span() == 0 {
            return 0.;
        }
        (self.clamp(level) - self.low) as f64 / self.span() as f64
    }

    pub fn ramp_for(&self, from: i32, to: i32) -> Duration {
        if to >= from {
            self.ramp_up
        } else {
            self.ramp_down
        }
    }
}

/// Themed asset drawn on top of a level control (slider knob or joystick cursor)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerSpec {
    pub name: String,
    pub colour: u32,
}

/// Static geometry and configuration of a button. Immutable after construction.
#[derive(Clone, Debug)]
pub struct ButtonGeometry {
    pub handle: ButtonHandle,
    pub name: String,
    pub kind: ButtonType,
    pub rect: Rect,
    pub bindings: Bindings,
    /// Raw string sent on press (empty = none)
    pub command: String,
    pub feedback: Feedback,
    pub level_function: LevelFunction,
    pub direction: Direction,
    pub animation: AnimationTiming,
    pub range: LevelRange,
    /// Reverse the level axis
    pub inverted: bool,
    /// Reverse the joystick Y axis
    pub aux_inverted: bool,
    pub slider: Option<MarkerSpec>,
    pub cursor: Option<MarkerSpec>,
    pub hit_test: HitTest,
    /// Password protection level, 0 = none, 1..=4
    pub password_level: u8,
    /// Let presses on the button reach elements beneath it
    pub pass_through: bool,
    /// Listbox row height in pixels
    pub row_height: usize,
}

impl Default for ButtonGeometry {
    fn default() -> Self {
        Self {
            handle: ButtonHandle::default(),
            name: String::new(),
            kind: ButtonType::General,
            rect: Rect::sized(100, 50),
            bindings: Bindings::default(),
            command: String::new(),
            feedback: Feedback::None,
            level_function: LevelFunction::DisplayOnly,
            direction: Direction::Vertical,
            animation: AnimationTiming::default(),
            range: LevelRange::default(),
            inverted: false,
            aux_inverted: false,
            slider: None,
            cursor: None,
            hit_test: HitTest::Pixels,
            password_level: 0,
            pass_through: false,
            row_height: 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_parent() {
        let handle = ButtonHandle::new(501, 12);
        assert_eq!(handle.parent(), 501 << 16);
        assert_eq!(handle.id(), 12);
        assert_eq!(handle.to_string(), "501:12");
    }

    #[test]
    fn test_range_clamp_and_fraction() {
        let range = LevelRange {
            low: 0,
            high: 100,
            ..Default::default()
        };
        assert_eq!(range.clamp(-5), 0);
        assert_eq!(range.clamp(140), 100);
        assert_eq!(range.centre(), 50);
        assert!((range.fraction(25) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_animation_interval() {
        let timing = AnimationTiming {
            up_steps: 2,
            up_time: Duration::from_millis(50),
            down_steps: 1,
            down_time: Duration::from_millis(100),
        };
        assert_eq!(timing.interval(), Duration::from_millis(200));
        assert!(!AnimationTiming::default().is_cyclic());
    }

    #[test]
    fn test_joystick_y_binding() {
        let bindings = Bindings {
            level: Address::new(1, 7),
            ..Default::default()
        };
        assert_eq!(bindings.level_y(), Address::new(1, 8));
    }
}
