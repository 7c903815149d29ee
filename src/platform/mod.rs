// Block History platform paths
// Resolves where the local history database lives on each OS.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "block-history";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the platform-specific data directory for Block History.
///
/// - **Linux**: `$XDG_DATA_HOME/block-history` or `~/.local/share/block-history`
/// - **macOS**: `~/Library/Application Support/block-history`
/// - **Windows**: `%APPDATA%/block-history`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join(APP_DIR)
    }
    #[cfg(target_os = "windows")]
    {
        match env::var("APPDATA") {
            Ok(appdata) => PathBuf::from(appdata).join(APP_DIR),
            Err(_) => home_dir().join("AppData").join("Roaming").join(APP_DIR),
        }
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_DATA_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
            _ => home_dir().join(".local").join("share").join(APP_DIR),
        }
    }
}
