//! Engine tunables and data locations.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::platform;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "BLOCK_HISTORY_DATA_DIR";

/// Prefix for per-field overrides, e.g. `BLOCK_HISTORY_WINDOW_DAYS=7`.
const ENV_PREFIX: &str = "BLOCK_HISTORY_";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Limits and pacing for scanning and eradication.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScrubConfig {
    /// Width of one scan window.
    pub window_days: u32,
    /// Hard cap on windows per scan.
    pub max_windows: u32,
    /// `max_results` sent with each window query.
    pub max_results_per_window: usize,
    /// Pause between scan windows.
    pub window_pause_ms: u64,
    /// Deletes issued concurrently per batch.
    pub batch_size: usize,
    /// Pause between eradication batches.
    pub batch_pause_ms: u64,
    /// Half-width of the time-range fallback delete around a residual visit.
    pub fallback_window_ms: i64,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            max_windows: 120,
            max_results_per_window: 10_000,
            window_pause_ms: 50,
            batch_size: 5,
            batch_pause_ms: 100,
            fallback_window_ms: 5 * 60 * 1000,
        }
    }
}

impl ScrubConfig {
    /// Defaults overridden by any parseable `BLOCK_HISTORY_*` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        override_field(&lookup, "WINDOW_DAYS", &mut config.window_days);
        override_field(&lookup, "MAX_WINDOWS", &mut config.max_windows);
        override_field(&lookup, "MAX_RESULTS_PER_WINDOW", &mut config.max_results_per_window);
        override_field(&lookup, "WINDOW_PAUSE_MS", &mut config.window_pause_ms);
        override_field(&lookup, "BATCH_SIZE", &mut config.batch_size);
        override_field(&lookup, "BATCH_PAUSE_MS", &mut config.batch_pause_ms);
        override_field(&lookup, "FALLBACK_WINDOW_MS", &mut config.fallback_window_ms);
        config
    }

    /// Zero pauses; for tests and the demo.
    pub fn without_pauses(mut self) -> Self {
        self.window_pause_ms = 0;
        self.batch_pause_ms = 0;
        self
    }

    pub fn window_ms(&self) -> i64 {
        i64::from(self.window_days.max(1)) * DAY_MS
    }

    pub fn window_pause(&self) -> Duration {
        Duration::from_millis(self.window_pause_ms)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

fn override_field<T, F>(lookup: &F, field: &str, slot: &mut T)
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let name = format!("{}{}", ENV_PREFIX, field);
    if let Some(raw) = lookup(&name) {
        match raw.trim().parse::<T>() {
            Ok(value) => *slot = value,
            Err(_) => tracing::warn!(variable = %name, value = %raw, "Ignoring unparseable config override"),
        }
    }
}

/// Directory holding `block-history.db`.
pub fn data_dir() -> PathBuf {
    match std::env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => platform::get_data_dir(),
    }
}

/// Full path of the SQLite database file.
pub fn database_path() -> PathBuf {
    data_dir().join("block-history.db")
}
