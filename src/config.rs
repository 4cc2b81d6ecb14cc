//! Engine-wide configuration.
//!
//! Defaults match a stock panel; `from_env()` lets hosts and the demo binary
//! override the common knobs without a config file.

use std::path::PathBuf;
use std::time::Duration;

/// Panel device number used as the source address of outbound commands
pub const DEFAULT_DEVICE: u16 = 10001;

/// Byte budget of the shared image cache (64 MiB of ARGB pixels)
pub const DEFAULT_CACHE_BYTES: usize = 64 * 1024 * 1024;

/// Point size to pixel size factor used for button fonts
pub const FONT_SCALE: f32 = 1.322;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub device: u16,
    pub cache_bytes: usize,
    /// Sleep between polls while waiting for a job to stop
    pub stop_poll_interval: Duration,
    /// Upper bound on how long teardown waits for a single job
    pub stop_timeout: Duration,
    pub fetch_timeout: Duration,
    /// Passwords for protection levels 1 to 4 (index 0 = level 1)
    pub passwords: [Option<String>; 4],
    pub font_scale: f32,
    /// Invisible padding between border and text
    pub text_padding: usize,
    pub asset_root: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE,
            cache_bytes: DEFAULT_CACHE_BYTES,
            stop_poll_interval: Duration::from_millis(20),
            stop_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(10),
            passwords: [None, None, None, None],
            font_scale: FONT_SCALE,
            text_padding: 4,
            asset_root: PathBuf::from("."),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `PANEL_DEVICE`, `PANEL_CACHE_BYTES`,
    /// `PANEL_ASSETS` and `PANEL_FETCH_TIMEOUT_MS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(device) = env_parse::<u16>("PANEL_DEVICE") {
            config.device = device;
        }
        if let Some(bytes) = env_parse::<usize>("PANEL_CACHE_BYTES") {
            config.cache_bytes = bytes;
        }
        if let Some(ms) = env_parse::<u64>("PANEL_FETCH_TIMEOUT_MS") {
            config.fetch_timeout = Duration::from_millis(ms);
        }
        if let Ok(root) = std::env::var("PANEL_ASSETS") {
            config.asset_root = PathBuf::from(root);
        }
        config
    }

    /// Password for a protection level (1..=4)
    pub fn password(&self, level: u8) -> Option<&str> {
        match level {
            1..=4 => self.passwords[level as usize - 1].as_deref(),
            _ => None,
        }
    }

    pub fn with_password(mut self, level: u8, password: &str) -> Self {
        if (1..=4).contains(&level) {
            self.passwords[level as usize - 1] = Some(password.to_string());
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring unparsable {}={}", key, value);
            None
        }
    }
}
