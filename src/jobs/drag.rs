//! Ramped level moves: walk a level one unit at a time towards a target.

use super::StopToken;
use std::time::Duration;

pub trait LevelTarget: Send + Sync {
    /// Store and redraw an intermediate level; also put it on the wire when `send`
    fn apply_level(&self, level: i32, send: bool);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelMove {
    pub from: i32,
    pub to: i32,
    /// Time a move across the whole range takes
    pub full_range: Duration,
    /// Width of the range in level units
    pub span: i32,
    /// User drags re-send every step; inbound levels only redraw
    pub send: bool,
}

impl LevelMove {
    pub fn step_interval(&self) -> Duration {
        self.full_range / self.span.unsigned_abs().max(1)
    }

    pub fn distance(&self) -> i32 {
        (self.to - self.from).abs()
    }
}

/// Walk from `from` to `to`, applying every level on the way. Returns the
/// last level applied (the target unless cancelled).
pub fn run_level_move(target: &dyn LevelTarget, mv: LevelMove, token: &StopToken, poll: Duration) -> i32 {
    let step = (mv.to - mv.from).signum();
    let interval = mv.step_interval();
    let mut level = mv.from;

    while level != mv.to {
        if !token.sleep(interval, poll) {
            log::debug!("Level move cancelled at {}", level);
            break;
        }
        level += step;
        target.apply_level(level, mv.send);
    }
    level
}
