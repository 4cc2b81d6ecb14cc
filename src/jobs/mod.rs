//! Per-button background jobs.
//!
//! Every job runs on its own named thread and owns a `StopToken`. A per-kind
//! slot holds the running state; `start` claims it with a compare-and-swap,
//! so at most one job of a kind runs per button and a second start is a
//! silent no-op. Cancellation is cooperative: `request_stop` sets the token
//! and `await_stopped` polls the slot until the job has returned.

pub mod animation;
pub mod drag;
pub mod refresh;

use crate::lock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub use animation::{AnimationTarget, RangeAnimation};
pub use drag::{LevelMove, LevelTarget};
pub use refresh::RefreshTarget;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Cyclic instance animation
    Animation,
    /// Animation over an instance range
    RangeAnimation,
    /// Remote image fetch for one bitmap layer from one source
    ImageRefresh { layer: usize, source: u64 },
    /// Level walk towards a target
    DragLevelMove,
}

impl JobKind {
    /// Refresh job of `layer` fetching `url`; another URL on the same layer is a different job
    pub fn image_refresh(layer: usize, url: &str) -> JobKind {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        JobKind::ImageRefresh {
            layer,
            source: hasher.finish(),
        }
    }

    /// Kinds that drive the same state share one slot and exclude each other
    fn slot_key(self) -> JobKind {
        match self {
            JobKind::RangeAnimation => JobKind::Animation,
            other => other,
        }
    }

    fn label(self) -> String {
        match self {
            JobKind::Animation => "anim".to_string(),
            JobKind::RangeAnimation => "anim-range".to_string(),
            JobKind::ImageRefresh { layer, .. } => format!("refresh{}", layer),
            JobKind::DragLevelMove => "level".to_string(),
        }
    }
}

/// Cooperative cancellation flag shared between a job and its owner
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Sleep `duration` in slices of at most `poll`.
    /// Returns `false` as soon as the token is cancelled.
    pub fn sleep(&self, duration: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let poll = poll.max(Duration::from_millis(1));
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(poll));
        }
    }
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;

struct Running {
    kind: JobKind,
    token: StopToken,
}

#[derive(Default)]
struct JobSlot {
    state: AtomicU8,
    /// Kind and token of the current run; held across the claim so a stop
    /// request never sees a stale token
    current: Mutex<Option<Running>>,
}

/// Resets the slot to idle when the job thread returns (or panics)
struct SlotGuard(Arc<JobSlot>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut current = lock(&self.0.current);
        *current = None;
        self.0.state.store(IDLE, Ordering::Release);
    }
}

pub struct JobEngine {
    owner: String,
    slots: Mutex<HashMap<JobKind, Arc<JobSlot>>>,
    poll: Duration,
}

impl JobEngine {
    /// # Arguments
    /// * `owner` - Used in thread names and log lines
    /// * `poll` - Sleep slice for cancellable waits
    pub fn new(owner: &str, poll: Duration) -> Self {
        Self {
            owner: owner.to_string(),
            slots: Mutex::new(HashMap::new()),
            poll,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    fn slot(&self, kind: JobKind) -> Arc<JobSlot> {
        Arc::clone(lock(&self.slots).entry(kind.slot_key()).or_default())
    }

    fn existing_slot(&self, kind: JobKind) -> Option<Arc<JobSlot>> {
        lock(&self.slots).get(&kind.slot_key()).cloned()
    }

    /// Start `job` unless a job of this kind (or one sharing its slot) runs.
    ///
    /// Returns `true` when a new thread was started.
    pub fn start<F>(&self, kind: JobKind, job: F) -> bool
    where
        F: FnOnce(StopToken) + Send + 'static,
    {
        let slot = self.slot(kind);
        let token = StopToken::new();
        {
            let mut current = lock(&slot.current);
            if slot
                .state
                .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                log::debug!("{}: {:?} already running", self.owner, kind);
                return false;
            }
            *current = Some(Running {
                kind,
                token: token.clone(),
            });
        }

        let guard = SlotGuard(Arc::clone(&slot));
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", self.owner, kind.label()))
            .spawn(move || {
                let _guard = guard;
                job(token);
            });
        match spawned {
            Ok(_) => {
                log::trace!("{}: started {:?}", self.owner, kind);
                true
            }
            Err(e) => {
                // The closure (and its guard) was dropped, so the slot is idle again
                log::error!("{}: failed to spawn {:?} job: {}", self.owner, kind, e);
                false
            }
        }
    }

    /// Signal the job of `kind` to stop. Does not wait.
    pub fn request_stop(&self, kind: JobKind) {
        let Some(slot) = self.existing_slot(kind) else {
            return;
        };
        let current = lock(&slot.current);
        if let Some(running) = current.as_ref().filter(|r| r.kind == kind) {
            let _ = slot
                .state
                .compare_exchange(RUNNING, STOPPING, Ordering::AcqRel, Ordering::Acquire);
            running.token.cancel();
        }
    }

    pub fn is_running(&self, kind: JobKind) -> bool {
        self.existing_slot(kind).map_or(false, |slot| {
            slot.state.load(Ordering::Acquire) != IDLE
                && lock(&slot.current).as_ref().map_or(false, |r| r.kind == kind)
        })
    }

    /// Poll until the job of `kind` has returned; `false` on timeout
    pub fn await_stopped(&self, kind: JobKind, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_running(kind) {
            if Instant::now() >= deadline {
                log::warn!("{}: {:?} did not stop within {:?}", self.owner, kind, timeout);
                return false;
            }
            thread::sleep(self.poll);
        }
        true
    }

    /// Kinds with a job currently running
    pub fn running(&self) -> Vec<JobKind> {
        let slots: Vec<Arc<JobSlot>> = lock(&self.slots).values().cloned().collect();
        slots
            .iter()
            .filter(|s| s.state.load(Ordering::Acquire) != IDLE)
            .filter_map(|s| lock(&s.current).as_ref().map(|r| r.kind))
            .collect()
    }

    /// Stop every job, then wait for each. Returns `false` if any timed out.
    pub fn stop_all(&self, timeout: Duration) -> bool {
        let kinds = self.running();
        for &kind in &kinds {
            self.request_stop(kind);
        }
        kinds
            .into_iter()
            .fold(true, |ok, kind| self.await_stopped(kind, timeout) && ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn engine() -> JobEngine {
        JobEngine::new("test", Duration::from_millis(2))
    }

    #[test]
    fn test_token_sleep_cancelled() {
        let token = StopToken::new();
        assert!(token.sleep(Duration::from_millis(5), Duration::from_millis(1)));
        token.cancel();
        assert!(!token.sleep(Duration::from_secs(10), Duration::from_millis(1)));
    }

    #[test]
    fn test_second_start_is_noop() {
        let engine = engine();
        let runs = Arc::new(AtomicUsize::new(0));
        let job = |runs: Arc<AtomicUsize>| {
            move |token: StopToken| {
                runs.fetch_add(1, Ordering::SeqCst);
                while token.sleep(Duration::from_millis(2), Duration::from_millis(1)) {}
            }
        };
        assert!(engine.start(JobKind::Animation, job(Arc::clone(&runs))));
        assert!(!engine.start(JobKind::Animation, job(Arc::clone(&runs))));
        assert!(engine.is_running(JobKind::Animation));

        engine.request_stop(JobKind::Animation);
        assert!(engine.await_stopped(JobKind::Animation, Duration::from_secs(2)));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!engine.is_running(JobKind::Animation));
    }

    #[test]
    fn test_animation_kinds_exclude_each_other() {
        let engine = engine();
        assert!(engine.start(JobKind::RangeAnimation, |token| {
            while token.sleep(Duration::from_millis(2), Duration::from_millis(1)) {}
        }));
        assert!(!engine.start(JobKind::Animation, |_| {}));
        assert!(engine.is_running(JobKind::RangeAnimation));
        assert!(!engine.is_running(JobKind::Animation));

        // A stop for the other animation kind doesn't touch this one
        engine.request_stop(JobKind::Animation);
        assert!(engine.is_running(JobKind::RangeAnimation));
        assert!(engine.stop_all(Duration::from_secs(2)));
    }

    #[test]
    fn test_slot_reusable_after_finish() {
        let engine = engine();
        let first = JobKind::image_refresh(0, "http://cam/a.jpg");
        assert!(engine.start(first, |_| {}));
        assert!(engine.await_stopped(first, Duration::from_secs(2)));
        assert!(engine.start(first, |_| {}));
        assert!(engine.start(JobKind::image_refresh(1, "http://cam/a.jpg"), |_| {}));
        assert!(engine.stop_all(Duration::from_secs(2)));
    }

    #[test]
    fn test_refresh_identity_includes_source() {
        let engine = engine();
        let a = JobKind::image_refresh(0, "http://cam/a.jpg");
        let b = JobKind::image_refresh(0, "http://cam/b.jpg");
        assert_ne!(a, b);
        assert_eq!(a, JobKind::image_refresh(0, "http://cam/a.jpg"));

        let wait = |token: StopToken| {
            while token.sleep(Duration::from_millis(5), Duration::from_millis(1)) {}
        };
        assert!(engine.start(a, wait));
        assert!(!engine.start(a, wait));
        assert!(engine.start(b, wait));

        engine.request_stop(a);
        assert!(engine.await_stopped(a, Duration::from_secs(2)));
        assert!(engine.is_running(b));
        assert!(engine.stop_all(Duration::from_secs(2)));
    }
}
