//! Button visual state and compositing engine for touch-panel clients.
//!
//! A `Button` owns a table of visual instances and turns the active one into
//! an ARGB raster: fill, bitmaps, icon, text and border composited in a
//! configurable order. Bargraphs and joysticks are driven by level values,
//! general buttons by presses and channel feedback. Background jobs animate
//! instances, walk levels and refresh remote images; pointer input is turned
//! into outbound protocol commands.

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the data if a panicking thread poisoned it.
///
/// Render state is always left consistent between statements, so a panic in
/// one job must not take every other user of the lock down with it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// Per-layer render tracing - compiled out unless built with --features verbose-render
#[cfg(feature = "verbose-render")]
#[macro_export]
macro_rules! render_trace {
    ($($arg:tt)*) => {
        log::trace!($($arg)*)
    };
}

#[cfg(not(feature = "verbose-render"))]
#[macro_export]
macro_rules! render_trace {
    ($($arg:tt)*) => {};
}

/// Initialize env_logger for binaries and tests.
///
/// `RUST_LOG` overrides the default filter, which keeps the font and HTTP
/// stacks quiet. Calling it twice is harmless.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info,cosmic_text=warn,reqwest=warn");
    let _ = env_logger::Builder::from_env(env).try_init();
}

pub mod button;
pub mod config;
pub mod error;
pub mod jobs;
pub mod network;
pub mod storage;
pub mod types;
pub mod ui;

// Re-export commonly used items from submodules
pub use button::{Button, ButtonDefinition, InstanceSel, RenderedImage, Services};
pub use config::EngineConfig;
pub use error::{ButtonError, Result};
pub use ui::Raster;

pub use types::*;
