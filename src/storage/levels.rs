//! Shared level state.
//!
//! Every button bound to the same (type, address, channel, level) signature
//! shares one record, so a bargraph and the slider next to it always agree on
//! the current value.

use crate::lock;
use crate::types::{ButtonGeometry, ButtonType};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelSignature {
    pub kind: ButtonType,
    pub address_port: u16,
    pub address_code: u16,
    pub channel_port: u16,
    pub channel_code: u16,
    pub level_port: u16,
    pub level_code: u16,
}

impl LevelSignature {
    pub fn of(geometry: &ButtonGeometry) -> Self {
        let b = &geometry.bindings;
        Self {
            kind: geometry.kind,
            address_port: b.address.port,
            address_code: b.address.code,
            channel_port: b.channel.port,
            channel_code: b.channel.code,
            level_port: b.level.port,
            level_code: b.level.code,
        }
    }
}

/// Last known values of one logical level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub level: i32,
    pub joy_x: i32,
    pub joy_y: i32,
    /// Last values put on the wire, `None` until the first send
    pub sent_level: Option<i32>,
    pub sent_x: Option<i32>,
    pub sent_y: Option<i32>,
}

#[derive(Debug, Default)]
pub struct SharedLevelState {
    inner: Mutex<LevelSnapshot>,
}

impl SharedLevelState {
    pub fn snapshot(&self) -> LevelSnapshot {
        *lock(&self.inner)
    }

    pub fn level(&self) -> i32 {
        lock(&self.inner).level
    }

    pub fn set_level(&self, level: i32) {
        lock(&self.inner).level = level;
    }

    pub fn set_joystick(&self, x: i32, y: i32) {
        let mut s = lock(&self.inner);
        s.joy_x = x;
        s.joy_y = y;
    }

    /// Record `level` as sent; false when it equals the last sent value
    pub fn mark_level_sent(&self, level: i32) -> bool {
        let mut s = lock(&self.inner);
        if s.sent_level == Some(level) {
            return false;
        }
        s.sent_level = Some(level);
        true
    }

    /// Record joystick axes as sent; returns which axes changed
    pub fn mark_joystick_sent(&self, x: i32, y: i32) -> (bool, bool) {
        let mut s = lock(&self.inner);
        let changed = (s.sent_x != Some(x), s.sent_y != Some(y));
        s.sent_x = Some(x);
        s.sent_y = Some(y);
        changed
    }
}

/// Owner of every `SharedLevelState`; records live as long as the registry
#[derive(Default)]
pub struct LevelRegistry {
    states: Mutex<HashMap<LevelSignature, Arc<SharedLevelState>>>,
}

impl LevelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared state for `signature`, created on first lookup
    pub fn lookup(&self, signature: LevelSignature) -> Arc<SharedLevelState> {
        Arc::clone(lock(&self.states).entry(signature).or_default())
    }

    pub fn len(&self) -> usize {
        lock(&self.states).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Bindings};

    fn geometry(level_code: u16) -> ButtonGeometry {
        ButtonGeometry {
            kind: ButtonType::Bargraph,
            bindings: Bindings {
                level: Address::new(1, level_code),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_same_signature_shares_state() {
        let registry = LevelRegistry::new();
        let a = registry.lookup(LevelSignature::of(&geometry(5)));
        let b = registry.lookup(LevelSignature::of(&geometry(5)));
        let c = registry.lookup(LevelSignature::of(&geometry(6)));
        a.set_level(42);
        assert_eq!(b.level(), 42);
        assert_eq!(c.level(), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_sent_tracking() {
        let state = SharedLevelState::default();
        assert!(state.mark_level_sent(10));
        assert!(!state.mark_level_sent(10));
        assert!(state.mark_level_sent(11));
        assert_eq!(state.mark_joystick_sent(1, 2), (true, true));
        assert_eq!(state.mark_joystick_sent(1, 3), (false, true));
    }
}
