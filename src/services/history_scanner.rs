//! History Scanner for Block History.
//!
//! The host API may silently cap results per query, so the scanner never
//! issues one unbounded search. It walks backward from now toward the epoch
//! in fixed windows, one bounded query per window, merging matching URLs into
//! a set. It stops at the window cap, at the first empty window, or at the
//! epoch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ScrubConfig;
use crate::managers::history_manager::HistoryManagerTrait;
use crate::services::keyword_matcher::KeywordPattern;
use crate::types::history::{HistoryQuery, MatchSet};
use crate::types::now_millis;

pub struct HistoryScanner {
    history: Arc<dyn HistoryManagerTrait>,
    config: ScrubConfig,
}

impl HistoryScanner {
    pub fn new(history: Arc<dyn HistoryManagerTrait>, config: ScrubConfig) -> Self {
        Self { history, config }
    }

    /// URLs anywhere in history matching `keyword`.
    pub async fn find_matches(&self, keyword: &str) -> MatchSet {
        self.find_matches_any(&[keyword]).await
    }

    /// URLs matching any of `keywords`.
    pub async fn find_matches_any<S: AsRef<str>>(&self, keywords: &[S]) -> MatchSet {
        let patterns: Vec<KeywordPattern> = keywords
            .iter()
            .filter_map(|k| KeywordPattern::new(k.as_ref()))
            .collect();
        if patterns.is_empty() {
            return MatchSet::new();
        }
        self.scan_from(now_millis(), &patterns).await
    }

    /// Scans windows ending at `now` and going backward.
    pub async fn scan_from(&self, now: i64, patterns: &[KeywordPattern]) -> MatchSet {
        let window_ms = self.config.window_ms();
        let mut matches = MatchSet::new();
        let mut end_time = now;
        let mut windows: u32 = 0;

        while windows < self.config.max_windows && end_time > 0 {
            if windows > 0 && !self.config.window_pause().is_zero() {
                tokio::time::sleep(self.config.window_pause()).await;
            }
            windows += 1;

            let start_time = end_time.saturating_sub(window_ms).max(0);
            let query = HistoryQuery {
                text: String::new(),
                start_time,
                end_time,
                max_results: self.config.max_results_per_window,
            };
            end_time = start_time;

            let records = match self.history.search(&query).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(start_time, end_time = query.end_time, error = %e, "History window query failed, skipping");
                    continue;
                }
            };
            if records.is_empty() {
                debug!(windows, "Empty window, reached beginning of history");
                break;
            }
            if records.len() >= self.config.max_results_per_window {
                warn!(start_time, "Window hit max_results, some records may be missed");
            }

            for record in &records {
                if patterns.iter().any(|p| p.is_match(&record.url)) {
                    matches.insert(record.url.clone());
                }
            }
        }

        info!(windows, matched = matches.len(), "History scan finished");
        matches
    }
}
