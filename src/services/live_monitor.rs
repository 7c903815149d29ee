//! Live Monitor for Block History.
//!
//! Runs on every new history record: one settings read, at most one matcher
//! pass, at most one delete. No scanning and no batching. Keyword patterns
//! are compiled only when the stored keyword list changes.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::managers::history_manager::HistoryManagerTrait;
use crate::services::keyword_matcher::KeywordSet;
use crate::services::settings_store::SettingsStore;
use crate::types::history::HistoryRecord;
use crate::types::settings::Settings;

/// What the monitor decided for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum MonitorDecision {
    /// Global blocking is on; the record is removed without matching.
    BlockAll,
    /// The record matched this keyword.
    KeywordMatch { keyword: String },
    Allow,
}

impl MonitorDecision {
    /// Applies the policy: global switch first, then the first matching keyword.
    pub fn for_url(settings: &Settings, url: &str) -> Self {
        Self::decide(settings.is_enabled, &KeywordSet::compile(&settings.keywords), url)
    }

    /// Same policy over an already compiled keyword set.
    pub fn decide(block_all: bool, keywords: &KeywordSet, url: &str) -> Self {
        if block_all {
            return MonitorDecision::BlockAll;
        }
        match keywords.first_match(url) {
            Some(keyword) => MonitorDecision::KeywordMatch {
                keyword: keyword.to_string(),
            },
            None => MonitorDecision::Allow,
        }
    }

    pub fn blocks(&self) -> bool {
        !matches!(self, MonitorDecision::Allow)
    }
}

/// Clones share one compiled-keyword cache.
#[derive(Clone)]
pub struct LiveMonitor {
    history: Arc<dyn HistoryManagerTrait>,
    settings: SettingsStore,
    compiled: Arc<Mutex<Arc<KeywordSet>>>,
}

impl LiveMonitor {
    pub fn new(history: Arc<dyn HistoryManagerTrait>, settings: SettingsStore) -> Self {
        Self {
            history,
            settings,
            compiled: Arc::new(Mutex::new(Arc::new(KeywordSet::default()))),
        }
    }

    /// Compiled patterns for `settings.keywords`, recompiled only when the list differs.
    pub fn patterns_for(&self, settings: &Settings) -> Arc<KeywordSet> {
        let mut cached = self.compiled.lock().unwrap_or_else(|p| p.into_inner());
        if cached.keywords() != settings.keywords.as_slice() {
            debug!(keywords = settings.keywords.len(), "Compiling keyword patterns");
            *cached = Arc::new(KeywordSet::compile(&settings.keywords));
        }
        Arc::clone(&cached)
    }

    /// Handles one new history record. Delete failures are logged, not returned.
    pub async fn on_visited(&self, record: &HistoryRecord) -> MonitorDecision {
        let settings = self.settings.get().await;
        let decision = if settings.is_enabled {
            MonitorDecision::BlockAll
        } else {
            MonitorDecision::decide(false, &self.patterns_for(&settings), &record.url)
        };
        if !decision.blocks() {
            debug!(url = %record.url, "Visit allowed");
            return decision;
        }

        match self.history.delete_url(&record.url).await {
            Ok(()) => match &decision {
                MonitorDecision::KeywordMatch { keyword } => {
                    info!(url = %record.url, keyword = %keyword, "Blocked keyword match")
                }
                _ => info!(url = %record.url, "Blocked new history"),
            },
            Err(e) => error!(url = %record.url, error = %e, "Failed to delete new history record"),
        }
        decision
    }
}
