//! Pointer input, password gating and inbound state.
//!
//! Coordinates are button-local pixels. A press runs through the hit test and
//! the password gate before the button type sees it; every handled transition
//! then puts its push/release or string command on the wire.

use super::{Button, ButtonCore, DragOrigin};
use crate::jobs::LevelTarget;
use crate::network::ProtocolCommand;
use crate::types::{Direction, Feedback, HitTest, LevelFunction};
use crate::ui::bargraph::{self, Axis};

impl ButtonCore {
    fn size(&self) -> (usize, usize) {
        (self.geometry.rect.width, self.geometry.rect.height)
    }

    /// Show `index`, capped to the last instance
    fn show_state(&self, index: usize) {
        let last = self.instance_count().saturating_sub(1);
        let _ = self.select_instance(index.min(last));
    }

    pub(crate) fn click(&self, x: i32, y: i32, pressed: bool) -> bool {
        if self.is_destroyed() || !self.state().visible {
            return false;
        }
        if pressed && self.geometry.hit_test == HitTest::Pixels {
            let transparent = self.rendered().map_or(false, |i| i.is_transparent_at(x, y));
            if transparent {
                log::trace!("Button {}: press at {},{} falls through", self.geometry.handle, x, y);
                return false;
            }
        }
        if self.gate_blocks(x, y, pressed) {
            return true;
        }
        self.dispatch_click(x, y, pressed)
    }

    fn dispatch_click(&self, x: i32, y: i32, pressed: bool) -> bool {
        self.state().pressed = pressed;
        if !self.behaviour.click(self, x, y, pressed) {
            return false;
        }
        self.send_button_commands(pressed);
        true
    }

    /// Holds presses back until the password of the button's level is supplied
    fn gate_blocks(&self, x: i32, y: i32, pressed: bool) -> bool {
        let level = self.geometry.password_level;
        if level == 0 {
            return false;
        }
        let ask = {
            let mut st = self.state();
            if st.gate.unlocked {
                return false;
            }
            if pressed {
                let first = st.gate.press.is_none();
                st.gate.press = Some((x, y));
                st.gate.release = None;
                first
            } else {
                if st.gate.press.is_some() {
                    st.gate.release = Some((x, y));
                }
                false
            }
        };
        if ask {
            match &self.services.prompt {
                Some(prompt) => prompt.request_password(self.geometry.handle, level),
                None => log::warn!(
                    "Button {}: password level {} but no prompt to ask",
                    self.geometry.handle,
                    level
                ),
            }
        }
        true
    }

    pub(crate) fn supply_credential(&self, password: &str) -> bool {
        let level = self.geometry.password_level;
        let Some(expected) = self.services.config.password(level) else {
            log::warn!("Button {}: no password configured for level {}", self.geometry.handle, level);
            return false;
        };
        if expected != password {
            log::warn!("Button {}: wrong password", self.geometry.handle);
            return false;
        }
        let (press, release) = {
            let mut st = self.state();
            st.gate.unlocked = true;
            (st.gate.press.take(), st.gate.release.take())
        };
        log::debug!("Button {} unlocked", self.geometry.handle);
        if let Some((x, y)) = press {
            self.dispatch_click(x, y, true);
        }
        if let Some((x, y)) = release {
            self.dispatch_click(x, y, false);
        }
        true
    }

    /// Push/release on the channel, or the string command in their place
    fn send_button_commands(&self, pressed: bool) {
        let bindings = &self.geometry.bindings;
        let device = self.device();

        if !self.geometry.command.is_empty() {
            if pressed {
                let address = if bindings.address.is_bound() {
                    bindings.address
                } else {
                    bindings.channel
                };
                self.send(ProtocolCommand::string(device, address, &self.geometry.command));
            }
            return;
        }
        if !bindings.channel.is_bound() {
            return;
        }
        if pressed || self.geometry.feedback == Feedback::AlwaysOn {
            self.send(ProtocolCommand::push(device, bindings.channel));
        } else {
            self.send(ProtocolCommand::release(device, bindings.channel));
        }
    }

    pub(crate) fn press_general(&self, pressed: bool) {
        match self.geometry.feedback {
            Feedback::Momentary => self.show_state(usize::from(pressed)),
            Feedback::InvertedChannel => self.show_state(usize::from(!pressed)),
            Feedback::AlwaysOn => self.show_state(1),
            Feedback::Channel | Feedback::None | Feedback::Blink => {}
        }
    }

    pub(crate) fn press_text_input(&self, pressed: bool) {
        if pressed {
            self.show_state(1);
        }
    }

    pub(crate) fn press_listbox(&self, y: i32, pressed: bool) {
        if !pressed {
            return;
        }
        let row = y.max(0) / self.geometry.row_height.max(1) as i32 + 1;
        log::debug!("Button {}: row {} selected", self.geometry.handle, row);
        self.level.set_level(row);
        let level = self.geometry.bindings.level;
        if level.is_bound() {
            self.level.mark_level_sent(row);
            self.send(ProtocolCommand::level(self.device(), level, row));
        }
        self.touch();
        self.refresh_if_visible();
    }

    fn begin_drag(&self, x: i32, y: i32) {
        let s = self.level.snapshot();
        self.state().drag = Some(DragOrigin {
            point: (x, y),
            level: s.level,
            joystick: (s.joy_x, s.joy_y),
        });
    }

    fn end_drag(&self) -> Option<DragOrigin> {
        self.state().drag.take()
    }

    /// Bargraph and multistate bargraph presses
    pub(crate) fn press_level(&self, x: i32, y: i32, pressed: bool) -> bool {
        let function = self.geometry.level_function;
        let range = self.geometry.range;
        let axis = Axis::new(self.geometry.direction, self.geometry.inverted);

        match function {
            LevelFunction::DisplayOnly => {}
            LevelFunction::Active | LevelFunction::ActiveCentering => {
                if pressed {
                    self.apply_level(bargraph::level_at(x, y, self.size(), axis, &range), true);
                } else if function.is_centering() {
                    self.apply_level(range.centre(), true);
                }
            }
            LevelFunction::Drag | LevelFunction::DragCentering => {
                if pressed {
                    self.begin_drag(x, y);
                } else if let Some(origin) = self.end_drag() {
                    let delta = bargraph::drag_delta(origin.point, (x, y), self.size(), axis, &range);
                    let target = range.clamp(origin.level + delta);
                    let confirmed = self.level.level();
                    if function.is_centering() {
                        self.apply_level(target, true);
                        self.move_level(target, range.centre(), true);
                    } else if target != confirmed {
                        self.move_level(confirmed, target, true);
                    }
                }
            }
        }
        true
    }

    /// Clamp, store and (for user input) send both joystick axes
    fn apply_joystick(&self, x: i32, y: i32, send: bool) {
        let range = self.geometry.range;
        let (x, y) = (range.clamp(x), range.clamp(y));
        self.level.set_joystick(x, y);
        let bindings = &self.geometry.bindings;
        if send && bindings.level.is_bound() {
            let (send_x, send_y) = self.level.mark_joystick_sent(x, y);
            if send_x {
                self.send(ProtocolCommand::level(self.device(), bindings.level, x));
            }
            if send_y {
                self.send(ProtocolCommand::level(self.device(), bindings.level_y(), y));
            }
        }
        self.touch();
        self.refresh_if_visible();
    }

    pub(crate) fn press_joystick(&self, x: i32, y: i32, pressed: bool) -> bool {
        let function = self.geometry.level_function;
        let range = self.geometry.range;
        let centre = range.centre();

        match function {
            LevelFunction::DisplayOnly => {}
            LevelFunction::Active | LevelFunction::ActiveCentering => {
                if pressed {
                    let (jx, jy) = bargraph::joystick_at(x, y, self.size(), &range, self.geometry.aux_inverted);
                    self.apply_joystick(jx, jy, true);
                } else if function.is_centering() {
                    self.apply_joystick(centre, centre, true);
                }
            }
            LevelFunction::Drag | LevelFunction::DragCentering => {
                if pressed {
                    self.begin_drag(x, y);
                } else if let Some(origin) = self.end_drag() {
                    let size = self.size();
                    let dx = bargraph::drag_delta(
                        origin.point,
                        (x, y),
                        size,
                        Axis::new(Direction::Horizontal, false),
                        &range,
                    );
                    // Joystick Y grows downwards unless the aux axis is inverted
                    let dy = bargraph::drag_delta(
                        origin.point,
                        (x, y),
                        size,
                        Axis::new(Direction::Vertical, !self.geometry.aux_inverted),
                        &range,
                    );
                    let (ox, oy) = origin.joystick;
                    self.apply_joystick(ox + dx, oy + dy, true);
                    if function.is_centering() {
                        self.apply_joystick(centre, centre, true);
                    }
                }
            }
        }
        true
    }

    pub(crate) fn set_level(&self, level: i32) {
        let to = self.geometry.range.clamp(level);
        let from = self.level.level();
        self.move_level(from, to, false);
    }

    pub(crate) fn set_joystick(&self, x: i32, y: i32) {
        self.apply_joystick(x, y, false);
    }

    pub(crate) fn set_channel_state(&self, on: bool) {
        match self.geometry.feedback {
            Feedback::Channel => self.show_state(usize::from(on)),
            Feedback::InvertedChannel => self.show_state(usize::from(!on)),
            _ => log::trace!("Button {}: channel state ignored", self.geometry.handle),
        }
    }

    pub(crate) fn blink_tick(&self) {
        if self.geometry.feedback != Feedback::Blink {
            return;
        }
        let next = if self.state().active == 0 { 1 } else { 0 };
        self.show_state(next);
    }
}

impl Button {
    /// Pointer press or release at button-local (x, y).
    /// Returns `false` when the event was not handled (hidden button, press on
    /// a transparent pixel, or a type that takes no pointer input).
    pub fn click(&self, x: i32, y: i32, pressed: bool) -> bool {
        self.core.click(x, y, pressed)
    }

    /// Answer to a password prompt. A match unlocks the button for good and
    /// replays the press (and release) held back by the gate.
    pub fn supply_credential(&self, password: &str) -> bool {
        self.core.supply_credential(password)
    }

    /// Inbound level: clamped, shared with every button on the same level and
    /// ramped when ramp times are configured. Never sent back out.
    pub fn set_level(&self, level: i32) {
        self.core.set_level(level);
    }

    pub fn set_joystick(&self, x: i32, y: i32) {
        self.core.set_joystick(x, y);
    }

    /// Inbound channel state for channel and inverted-channel feedback
    pub fn set_channel_state(&self, on: bool) {
        self.core.set_channel_state(on);
    }

    /// Toggle a blink-feedback button between its two instances
    pub fn blink_tick(&self) {
        self.core.blink_tick();
    }

    /// Unlock state of a password-protected button
    pub fn is_unlocked(&self) -> bool {
        self.core.geometry.password_level == 0 || self.core.state().gate.unlocked
    }
}
