// Block History services
// The scrubbing core: matching, settings policy, scanning, eradication, and
// the live new-visit monitor.

pub mod history_eradicator;
pub mod history_scanner;
pub mod keyword_matcher;
pub mod live_monitor;
pub mod settings_store;
