//! Instance animation jobs.

use super::StopToken;
use crate::error::{ButtonError, Result};
use std::time::{Duration, Instant};

/// What an animation drives: the active instance of a button
pub trait AnimationTarget: Send + Sync {
    fn instance_count(&self) -> usize;

    /// Make `index` the active instance and redraw. `false` aborts the animation.
    fn show_instance(&self, index: usize) -> bool;
}

/// Step through all instances, wrapping to 0, until stopped
pub fn run_cyclic(target: &dyn AnimationTarget, interval: Duration, token: &StopToken, poll: Duration) {
    let count = target.instance_count();
    if count == 0 || interval.is_zero() {
        return;
    }
    let mut index = 0;
    while !token.is_cancelled() {
        if !target.show_instance(index) {
            log::debug!("Animation aborted at instance {}", index);
            break;
        }
        index = (index + 1) % count;
        if !token.sleep(interval, poll) {
            break;
        }
    }
}

/// Animation over instances `start..=end`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeAnimation {
    pub start: usize,
    pub end: usize,
    /// Time for one pass through the range
    pub duration: Duration,
    /// Keep cycling until this much time has passed; `None` runs a single pass
    pub cutoff: Option<Duration>,
}

impl RangeAnimation {
    pub fn once(start: usize, end: usize, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
            cutoff: None,
        }
    }

    pub fn cycling_for(mut self, cutoff: Duration) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    /// Reject empty or out-of-bounds ranges and zero durations
    pub fn validate(&self, instance_count: usize) -> Result<()> {
        if self.start >= self.end || self.end >= instance_count {
            return Err(ButtonError::InvalidInstance {
                index: self.end,
                count: instance_count,
            });
        }
        if self.duration.is_zero() {
            return Err(ButtonError::InvalidDefinition(
                "animation duration must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Time each instance is shown: the pass duration split over the range
    pub fn interval(&self) -> Duration {
        self.duration / (self.end - self.start).max(1) as u32
    }
}

pub fn run_range(target: &dyn AnimationTarget, range: RangeAnimation, token: &StopToken, poll: Duration) {
    let began = Instant::now();
    let interval = range.interval();
    let mut index = range.start;

    while !token.is_cancelled() {
        if !target.show_instance(index) {
            break;
        }
        if index == range.end {
            match range.cutoff {
                None => break,
                Some(_) => index = range.start,
            }
        } else {
            index += 1;
        }
        if !token.sleep(interval, poll) {
            break;
        }
        if let Some(cutoff) = range.cutoff {
            if began.elapsed() >= cutoff {
                break;
            }
        }
    }
}
