//! History Eradicator for Block History.
//!
//! Deletes each URL, verifies no visits remain, and falls back to deleting a
//! narrow time range around every surviving visit. URLs are processed in
//! small concurrent batches; a failure on one URL is logged and never aborts
//! the rest.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::ScrubConfig;
use crate::managers::history_manager::HistoryManagerTrait;
use crate::types::errors::HistoryError;
use crate::types::history::MatchSet;

pub struct HistoryEradicator {
    history: Arc<dyn HistoryManagerTrait>,
    config: ScrubConfig,
}

impl HistoryEradicator {
    pub fn new(history: Arc<dyn HistoryManagerTrait>, config: ScrubConfig) -> Self {
        Self { history, config }
    }

    /// Returns the number of URLs confirmed to have no remaining visits.
    pub async fn eradicate(&self, urls: &MatchSet) -> usize {
        let urls: Vec<&String> = urls.iter().collect();
        let batch_size = self.config.batch_size.max(1);
        let mut deleted = 0;

        for (index, batch) in urls.chunks(batch_size).enumerate() {
            if index > 0 && !self.config.batch_pause().is_zero() {
                tokio::time::sleep(self.config.batch_pause()).await;
            }

            let results = join_all(batch.iter().map(|url| self.eradicate_url(url))).await;
            for (url, result) in batch.iter().zip(results) {
                match result {
                    Ok(true) => deleted += 1,
                    Ok(false) => warn!(url = %url, "Visits remain after fallback delete"),
                    Err(e) => warn!(url = %url, error = %e, "Failed to eradicate URL"),
                }
            }
        }

        info!(requested = urls.len(), deleted, "Eradication finished");
        deleted
    }

    /// Delete, verify, fall back, verify again. `Ok(true)` means no visits remain.
    async fn eradicate_url(&self, url: &str) -> Result<bool, HistoryError> {
        self.history.delete_url(url).await?;

        let residue = self.history.get_visits(url).await?;
        if residue.is_empty() {
            debug!(url = %url, "Deleted");
            return Ok(true);
        }

        warn!(url = %url, remaining = residue.len(), "Visits survived delete-by-url, deleting by time range");
        let half = self.config.fallback_window_ms;
        for visit in &residue {
            self.history
                .delete_range(
                    visit.visit_time.saturating_sub(half),
                    visit.visit_time.saturating_add(half),
                )
                .await?;
        }

        Ok(self.history.get_visits(url).await?.is_empty())
    }
}
