// Block History shared type definitions
// Each submodule defines types used across the crate.

pub mod errors;
pub mod history;
pub mod rpc;
pub mod settings;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in milliseconds since the UNIX epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
