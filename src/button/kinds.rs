//! Per-type button behaviour: how each type composes and what a press does.

use super::{ButtonCore, FrameState};
use crate::error::Result;
use crate::types::ButtonType;
use crate::ui::compositing::{render_bargraph, render_instance, render_joystick, Composed, RenderContext};

pub(crate) trait Renderable {
    fn compose(&self, ctx: &RenderContext, frame: &FrameState) -> Result<Composed>;
}

pub(crate) trait Clickable {
    /// Handle a press or release at button-local (x, y). Returns `false` when
    /// the button does not take pointer input.
    fn click(&self, core: &ButtonCore, x: i32, y: i32, pressed: bool) -> bool;
}

pub(crate) trait Behaviour: Renderable + Clickable + Send + Sync {
    /// Instance a level selects, for types that show whole instances per level
    fn instance_for_level(&self, _level: i32, _count: usize) -> Option<usize> {
        None
    }
}

fn whole_instance(level: i32, count: usize) -> Option<usize> {
    let last = count.saturating_sub(1) as i32;
    Some(level.clamp(0, last) as usize)
}

fn compose_active(ctx: &RenderContext, frame: &FrameState) -> Result<Composed> {
    render_instance(ctx, frame.active_instance(), frame.global_opacity)
}

pub(crate) struct General;
pub(crate) struct MultistateGeneral;
pub(crate) struct Bargraph;
pub(crate) struct MultistateBargraph;
pub(crate) struct Joystick;
pub(crate) struct TextInput;
pub(crate) struct Listbox;
pub(crate) struct SubviewAnchor;

impl Renderable for General {
    fn compose(&self, ctx: &RenderContext, frame: &FrameState) -> Result<Composed> {
        compose_active(ctx, frame)
    }
}

impl Clickable for General {
    fn click(&self, core: &ButtonCore, _x: i32, _y: i32, pressed: bool) -> bool {
        core.press_general(pressed);
        true
    }
}

impl Behaviour for General {}

impl Renderable for MultistateGeneral {
    fn compose(&self, ctx: &RenderContext, frame: &FrameState) -> Result<Composed> {
        compose_active(ctx, frame)
    }
}

impl Clickable for MultistateGeneral {
    fn click(&self, core: &ButtonCore, _x: i32, _y: i32, pressed: bool) -> bool {
        core.press_general(pressed);
        true
    }
}

impl Behaviour for MultistateGeneral {
    fn instance_for_level(&self, level: i32, count: usize) -> Option<usize> {
        whole_instance(level, count)
    }
}

impl Renderable for Bargraph {
    fn compose(&self, ctx: &RenderContext, frame: &FrameState) -> Result<Composed> {
        let instances = &frame.instances;
        let full = instances.get(1).unwrap_or(&instances[0]);
        render_bargraph(ctx, &instances[0], full, frame.level.level, frame.global_opacity)
    }
}

impl Clickable for Bargraph {
    fn click(&self, core: &ButtonCore, x: i32, y: i32, pressed: bool) -> bool {
        core.press_level(x, y, pressed)
    }
}

impl Behaviour for Bargraph {}

impl Renderable for MultistateBargraph {
    fn compose(&self, ctx: &RenderContext, frame: &FrameState) -> Result<Composed> {
        compose_active(ctx, frame)
    }
}

impl Clickable for MultistateBargraph {
    fn click(&self, core: &ButtonCore, x: i32, y: i32, pressed: bool) -> bool {
        core.press_level(x, y, pressed)
    }
}

impl Behaviour for MultistateBargraph {
    fn instance_for_level(&self, level: i32, count: usize) -> Option<usize> {
        whole_instance(level, count)
    }
}

impl Renderable for Joystick {
    fn compose(&self, ctx: &RenderContext, frame: &FrameState) -> Result<Composed> {
        render_joystick(
            ctx,
            frame.active_instance(),
            frame.level.joy_x,
            frame.level.joy_y,
            frame.global_opacity,
        )
    }
}

impl Clickable for Joystick {
    fn click(&self, core: &ButtonCore, x: i32, y: i32, pressed: bool) -> bool {
        core.press_joystick(x, y, pressed)
    }
}

impl Behaviour for Joystick {}

impl Renderable for TextInput {
    fn compose(&self, ctx: &RenderContext, frame: &FrameState) -> Result<Composed> {
        compose_active(ctx, frame)
    }
}

impl Clickable for TextInput {
    fn click(&self, core: &ButtonCore, _x: i32, _y: i32, pressed: bool) -> bool {
        core.press_text_input(pressed);
        true
    }
}

impl Behaviour for TextInput {}

impl Renderable for Listbox {
    fn compose(&self, ctx: &RenderContext, frame: &FrameState) -> Result<Composed> {
        compose_active(ctx, frame)
    }
}

impl Clickable for Listbox {
    fn click(&self, core: &ButtonCore, _x: i32, y: i32, pressed: bool) -> bool {
        core.press_listbox(y, pressed);
        true
    }
}

impl Behaviour for Listbox {}

impl Renderable for SubviewAnchor {
    fn compose(&self, ctx: &RenderContext, frame: &FrameState) -> Result<Composed> {
        compose_active(ctx, frame)
    }
}

impl Clickable for SubviewAnchor {
    fn click(&self, _core: &ButtonCore, _x: i32, _y: i32, _pressed: bool) -> bool {
        false
    }
}

impl Behaviour for SubviewAnchor {}

pub(crate) fn behaviour_for(kind: ButtonType) -> Box<dyn Behaviour> {
    match kind {
        ButtonType::General => Box::new(General),
        ButtonType::MultistateGeneral => Box::new(MultistateGeneral),
        ButtonType::Bargraph => Box::new(Bargraph),
        ButtonType::MultistateBargraph => Box::new(MultistateBargraph),
        ButtonType::Joystick => Box::new(Joystick),
        ButtonType::TextInput => Box::new(TextInput),
        ButtonType::Listbox => Box::new(Listbox),
        ButtonType::SubviewAnchor => Box::new(SubviewAnchor),
    }
}
