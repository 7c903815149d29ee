//! App Core for Block History.
//!
//! `App` is the one context object built at process start and passed to
//! every handler. It owns the host adapters, the settings store, the engine
//! config, and the lock that serializes mutations with scrub runs.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ScrubConfig;
use crate::managers::history_manager::HistoryManagerTrait;
use crate::managers::storage_manager::StorageManagerTrait;
use crate::services::history_eradicator::HistoryEradicator;
use crate::services::history_scanner::HistoryScanner;
use crate::services::live_monitor::LiveMonitor;
use crate::services::settings_store::SettingsStore;
use crate::types::rpc::ScrubReport;

pub struct App {
    pub history: Arc<dyn HistoryManagerTrait>,
    pub settings: SettingsStore,
    pub config: ScrubConfig,
    monitor: LiveMonitor,
    operation_lock: Mutex<()>,
}

impl App {
    pub fn new(
        history: Arc<dyn HistoryManagerTrait>,
        storage: Arc<dyn StorageManagerTrait>,
        config: ScrubConfig,
    ) -> Self {
        let settings = SettingsStore::new(storage);
        let monitor = LiveMonitor::new(history.clone(), settings.clone());
        Self {
            history,
            settings,
            config,
            monitor,
            operation_lock: Mutex::new(()),
        }
    }

    /// Held by every settings mutation and scrub run so they never interleave.
    pub async fn begin_operation(&self) -> MutexGuard<'_, ()> {
        self.operation_lock.lock().await
    }

    pub fn scanner(&self) -> HistoryScanner {
        HistoryScanner::new(self.history.clone(), self.config.clone())
    }

    pub fn eradicator(&self) -> HistoryEradicator {
        HistoryEradicator::new(self.history.clone(), self.config.clone())
    }

    /// The shared monitor; clones reuse its compiled keyword patterns.
    pub fn live_monitor(&self) -> LiveMonitor {
        self.monitor.clone()
    }

    /// Scans for and eradicates every URL matching any of `keywords`.
    ///
    /// Callers are expected to hold [`begin_operation`](Self::begin_operation).
    pub async fn scrub(&self, keywords: &[String]) -> ScrubReport {
        let matches = self.scanner().find_matches_any(keywords).await;
        if matches.is_empty() {
            return ScrubReport::default();
        }
        let deleted = self.eradicator().eradicate(&matches).await;
        ScrubReport {
            matched: matches.len(),
            deleted,
        }
    }

    /// Runs the live monitor on every record the history host publishes.
    ///
    /// Runs until the event channel closes; abort the handle to stop it sooner.
    pub fn spawn_live_monitor(&self) -> JoinHandle<()> {
        let mut events = self.history.subscribe();
        let monitor = self.live_monitor();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(record) => {
                        monitor.on_visited(&record).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Live monitor fell behind, events dropped");
                    }
                    Err(RecvError::Closed) => {
                        info!("History event channel closed, live monitor stopping");
                        break;
                    }
                }
            }
        })
    }
}
