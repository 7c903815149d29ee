use serde::{Deserialize, Serialize};

/// Storage key the settings object lives under.
pub const SETTINGS_KEY: &str = "settings";

/// Schema version written by this build.
pub const CURRENT_SETTINGS_VERSION: &str = "1.0.0";

/// Version assumed for stored settings that carry no `version` field.
pub const UNVERSIONED: &str = "0.0.0";

pub const MAX_KEYWORDS: usize = 100;
pub const MAX_KEYWORD_LENGTH: usize = 100;

/// Characters a keyword may not contain.
pub const FORBIDDEN_KEYWORD_CHARS: &[char] = &['<', '>', '\'', '"', '&'];

/// Persisted blocking policy.
///
/// `is_enabled` blocks all new history; `keywords` independently blocks
/// matching URLs. Either, both or neither may be active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub is_enabled: bool,
    pub keywords: Vec<String>,
    /// Milliseconds since the UNIX epoch.
    pub last_updated: i64,
    pub version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_enabled: false,
            keywords: Vec::new(),
            last_updated: super::now_millis(),
            version: CURRENT_SETTINGS_VERSION.to_string(),
        }
    }
}

impl Settings {
    /// True when `keyword` equals an existing entry under trimmed, case-insensitive comparison.
    pub fn has_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.trim().to_lowercase();
        self.keywords
            .iter()
            .any(|existing| existing.trim().to_lowercase() == needle)
    }
}

/// Settings backup document produced by export and accepted by import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsExport {
    pub version: String,
    pub timestamp: i64,
    pub settings: serde_json::Value,
}
