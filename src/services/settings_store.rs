//! Settings Store for Block History.
//!
//! Persists the blocking policy under the `settings` key of a
//! [`StorageManagerTrait`] area. Reads never fail: an absent or unreadable
//! document yields defaults. Merging, migration and validation only ever add
//! missing structural fields; they never drop the user's keywords or the
//! enabled flag.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::managers::storage_manager::StorageManagerTrait;
use crate::types::errors::{CommandError, StorageError, ValidationError};
use crate::types::now_millis;
use crate::types::rpc::{InstallReason, StorageInfo};
use crate::types::settings::{
    Settings, SettingsExport, CURRENT_SETTINGS_VERSION, FORBIDDEN_KEYWORD_CHARS, MAX_KEYWORDS,
    MAX_KEYWORD_LENGTH, SETTINGS_KEY, UNVERSIONED,
};

/// Checks a user-entered keyword and returns its stored form (trimmed, lowercased).
pub fn sanitize_keyword(keyword: &str) -> Result<String, ValidationError> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_KEYWORD_LENGTH {
        return Err(ValidationError::TooLong(len));
    }
    if trimmed.contains(FORBIDDEN_KEYWORD_CHARS) {
        return Err(ValidationError::ForbiddenCharacters(trimmed.to_string()));
    }
    Ok(trimmed.to_lowercase())
}

/// Settings persistence and keyword CRUD.
#[derive(Clone)]
pub struct SettingsStore {
    storage: Arc<dyn StorageManagerTrait>,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn StorageManagerTrait>) -> Self {
        Self { storage }
    }

    /// The stored document as-is, without defaults applied.
    pub async fn get_raw(&self) -> Result<Option<Value>, StorageError> {
        self.storage.get(SETTINGS_KEY).await
    }

    /// Current settings; defaults when absent or unreadable.
    pub async fn get(&self) -> Settings {
        match self.get_raw().await {
            Ok(Some(raw)) => Self::merge_with_defaults(&raw),
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read settings, using defaults");
                Settings::default()
            }
        }
    }

    /// Stamps `last_updated` and persists. Returns what was written.
    pub async fn save(&self, settings: Settings) -> Result<Settings, StorageError> {
        let stamped = Settings {
            last_updated: now_millis(),
            ..settings
        };
        self.persist(&stamped).await?;
        debug!(keywords = stamped.keywords.len(), enabled = stamped.is_enabled, "Settings saved");
        Ok(stamped)
    }

    /// Writes without touching `last_updated`.
    async fn persist(&self, settings: &Settings) -> Result<(), StorageError> {
        let value = serde_json::to_value(settings)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(SETTINGS_KEY, &value).await
    }

    /// Appends a keyword after validation; duplicates are rejected case-insensitively.
    pub async fn add_keyword(&self, keyword: &str) -> Result<Settings, CommandError> {
        let sanitized = sanitize_keyword(keyword)?;
        let mut settings = self.get().await;
        if settings.has_keyword(&sanitized) {
            return Err(ValidationError::Duplicate(sanitized).into());
        }
        if settings.keywords.len() >= MAX_KEYWORDS {
            return Err(ValidationError::LimitReached(MAX_KEYWORDS).into());
        }
        settings.keywords.push(sanitized);
        Ok(self.save(settings).await?)
    }

    /// Removes exact (case-sensitive) matches. Nothing is written when none match.
    pub async fn remove_keyword(&self, keyword: &str) -> Result<Settings, StorageError> {
        let mut settings = self.get().await;
        let before = settings.keywords.len();
        settings.keywords.retain(|k| k != keyword);
        if settings.keywords.len() == before {
            debug!(keyword = %keyword, "Keyword not present, nothing removed");
            return Ok(settings);
        }
        self.save(settings).await
    }

    pub async fn clear_keywords(&self) -> Result<Settings, StorageError> {
        let mut settings = self.get().await;
        settings.keywords.clear();
        self.save(settings).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<Settings, StorageError> {
        let mut settings = self.get().await;
        settings.is_enabled = enabled;
        self.save(settings).await
    }

    /// Explicit user reset.
    pub async fn reset_to_defaults(&self) -> Result<Settings, StorageError> {
        let settings = self.save(Settings::default()).await?;
        info!("Settings reset to defaults");
        Ok(settings)
    }

    /// True when `isEnabled`, `keywords` and `lastUpdated` are present with the right types.
    pub fn validate(raw: &Value) -> bool {
        let Some(obj) = raw.as_object() else {
            return false;
        };
        let enabled_ok = obj.get("isEnabled").is_some_and(Value::is_boolean);
        let keywords_ok = obj
            .get("keywords")
            .and_then(Value::as_array)
            .is_some_and(|list| list.iter().all(Value::is_string));
        let updated_ok = obj.get("lastUpdated").is_some_and(Value::is_number);
        enabled_ok && keywords_ok && updated_ok
    }

    /// Builds a full `Settings` from any stored shape, keeping user data where present.
    ///
    /// A missing `version` is reported as `0.0.0` so migration picks it up.
    pub fn merge_with_defaults(raw: &Value) -> Settings {
        let defaults = Settings::default();
        let is_enabled = raw
            .get("isEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.is_enabled);
        let keywords = raw
            .get("keywords")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.keywords);
        let last_updated = raw
            .get("lastUpdated")
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(defaults.last_updated);
        let version = raw
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(UNVERSIONED)
            .to_string();

        Settings {
            is_enabled,
            keywords,
            last_updated,
            version,
        }
    }

    /// Rewrites an older document into the current shape and persists it if anything changed.
    pub async fn migrate(&self, raw: &Value) -> Settings {
        let mut migrated = Self::merge_with_defaults(raw);
        if migrated.version == CURRENT_SETTINGS_VERSION && Self::validate(raw) {
            return migrated;
        }

        info!(from = %migrated.version, to = CURRENT_SETTINGS_VERSION, "Migrating settings");
        migrated.version = CURRENT_SETTINGS_VERSION.to_string();

        match serde_json::to_value(&migrated) {
            Ok(value) if value == *raw => {}
            Ok(_) => {
                if let Err(e) = self.persist(&migrated).await {
                    error!(error = %e, "Failed to persist migrated settings");
                }
            }
            Err(e) => error!(error = %e, "Failed to serialize migrated settings"),
        }
        migrated
    }

    /// Pretty-printed backup document.
    pub async fn export_settings(&self) -> Result<String, StorageError> {
        let settings = serde_json::to_value(self.get().await)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let export = SettingsExport {
            version: CURRENT_SETTINGS_VERSION.to_string(),
            timestamp: now_millis(),
            settings,
        };
        serde_json::to_string_pretty(&export).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Restores a backup produced by [`export_settings`](Self::export_settings).
    pub async fn import_settings(&self, json: &str) -> Result<Settings, CommandError> {
        let doc: Value = serde_json::from_str(json)
            .map_err(|e| ValidationError::InvalidImport(e.to_string()))?;
        let settings = match doc.get("settings") {
            Some(s) if s.is_object() => s,
            _ => {
                return Err(
                    ValidationError::InvalidImport("missing settings object".to_string()).into(),
                )
            }
        };
        let mut merged = Self::merge_with_defaults(settings);
        merged.version = CURRENT_SETTINGS_VERSION.to_string();
        let saved = self.save(merged).await?;
        info!(keywords = saved.keywords.len(), "Settings imported");
        Ok(saved)
    }

    pub async fn storage_info(&self) -> Result<StorageInfo, StorageError> {
        let used = self.storage.bytes_in_use().await?;
        let quota = self.storage.quota_bytes();
        let percentage = if quota == 0 {
            0.0
        } else {
            used as f64 / quota as f64 * 100.0
        };
        Ok(StorageInfo {
            used,
            quota,
            percentage,
        })
    }

    /// Install/update hook. Fresh installs write defaults only when nothing is stored.
    pub async fn on_installed(&self, reason: InstallReason) -> Settings {
        let raw = match self.get_raw().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read settings during install handling");
                return Settings::default();
            }
        };

        match (reason, raw) {
            (_, None) => self.write_defaults().await,
            (InstallReason::Install, Some(raw)) => {
                info!("Existing settings found on install, preserving user data");
                Self::merge_with_defaults(&raw)
            }
            (InstallReason::Update, Some(raw)) => {
                let merged = Self::merge_with_defaults(&raw);
                match serde_json::to_value(&merged) {
                    Ok(value) if value != raw => {
                        if let Err(e) = self.persist(&merged).await {
                            error!(error = %e, "Failed to persist merged settings on update");
                        } else {
                            info!("Settings updated with new fields while preserving user data");
                        }
                    }
                    Ok(_) => debug!("Stored settings already complete"),
                    Err(e) => error!(error = %e, "Failed to serialize merged settings"),
                }
                let current = serde_json::to_value(&merged).unwrap_or(raw);
                self.migrate(&current).await
            }
        }
    }

    /// Startup hook: repair invalid documents, then migrate.
    pub async fn on_startup(&self) -> Settings {
        let raw = match self.get_raw().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("No settings found, initializing defaults");
                return self.write_defaults().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read settings on startup, using defaults");
                return Settings::default();
            }
        };

        let raw = if Self::validate(&raw) {
            raw
        } else {
            warn!("Stored settings invalid, repairing while preserving user data");
            let repaired = Self::merge_with_defaults(&raw);
            if let Err(e) = self.persist(&repaired).await {
                error!(error = %e, "Failed to persist repaired settings");
            }
            serde_json::to_value(&repaired).unwrap_or(raw)
        };
        self.migrate(&raw).await
    }

    async fn write_defaults(&self) -> Settings {
        match self.save(Settings::default()).await {
            Ok(settings) => settings,
            Err(e) => {
                error!(error = %e, "Failed to persist default settings");
                Settings::default()
            }
        }
    }
}
