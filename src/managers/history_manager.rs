//! History Manager for Block History.
//!
//! Defines `HistoryManagerTrait`, the host history API the scrubbing core
//! talks to, and `HistoryManager`, a SQLite-backed implementation used by the
//! binaries. Visits are stored one row each; searches aggregate them per URL.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::database::Database;
use crate::types::errors::HistoryError;
use crate::types::history::{HistoryQuery, HistoryRecord, VisitRecord};

/// Capacity of the new-visit broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Host history operations.
#[async_trait]
pub trait HistoryManagerTrait: Send + Sync {
    /// Returns records in `[start_time, end_time)` newest first, at most `max_results`.
    async fn search(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, HistoryError>;
    /// Removes every visit for exactly this URL.
    async fn delete_url(&self, url: &str) -> Result<(), HistoryError>;
    /// Removes every visit (of any URL) with `start_time <= visit_time <= end_time`.
    async fn delete_range(&self, start_time: i64, end_time: i64) -> Result<(), HistoryError>;
    /// Lists the remaining visits for exactly this URL.
    async fn get_visits(&self, url: &str) -> Result<Vec<VisitRecord>, HistoryError>;
    /// Push subscription for newly inserted history records.
    fn subscribe(&self) -> broadcast::Receiver<HistoryRecord>;
}

/// History manager backed by the shared SQLite database.
pub struct HistoryManager {
    db: Arc<Database>,
    events: broadcast::Sender<HistoryRecord>,
}

impl HistoryManager {
    pub fn new(db: Arc<Database>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { db, events }
    }

    /// Inserts a visit and notifies subscribers. Returns the aggregated record for the URL.
    pub fn record_visit(
        &self,
        url: &str,
        title: &str,
        visit_time: i64,
    ) -> Result<HistoryRecord, HistoryError> {
        let visit_count: i64 = {
            let conn = self.db.connection();
            conn.execute(
                "INSERT INTO history_visits (id, url, title, visit_time) VALUES (?1, ?2, ?3, ?4)",
                params![Uuid::new_v4().to_string(), url, title, visit_time],
            )
            .map_err(|e| HistoryError::Database(e.to_string()))?;
            conn.query_row(
                "SELECT COUNT(*) FROM history_visits WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .map_err(|e| HistoryError::Database(e.to_string()))?
        };

        let record = HistoryRecord {
            url: url.to_string(),
            visit_time,
            visit_count,
        };
        // No subscribers is not an error.
        let _ = self.events.send(record.clone());
        Ok(record)
    }

    /// Total number of stored visits.
    pub fn visit_count(&self) -> Result<i64, HistoryError> {
        self.db
            .connection()
            .query_row("SELECT COUNT(*) FROM history_visits", [], |row| row.get(0))
            .map_err(|e| HistoryError::Database(e.to_string()))
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<HistoryRecord> {
        Ok(HistoryRecord {
            url: row.get(0)?,
            visit_time: row.get(1)?,
            visit_count: row.get(2)?,
        })
    }
}

#[async_trait]
impl HistoryManagerTrait for HistoryManager {
    async fn search(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, HistoryError> {
        let conn = self.db.connection();
        let pattern = format!("%{}%", query.text);
        let limit = i64::try_from(query.max_results).unwrap_or(i64::MAX);
        let mut stmt = conn
            .prepare(
                "SELECT url, MAX(visit_time), COUNT(*) FROM history_visits \
                 WHERE visit_time >= ?1 AND visit_time < ?2 AND url LIKE ?3 \
                 GROUP BY url ORDER BY MAX(visit_time) DESC LIMIT ?4",
            )
            .map_err(|e| HistoryError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![query.start_time, query.end_time, pattern, limit],
                Self::row_to_record,
            )
            .map_err(|e| HistoryError::Query(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| HistoryError::Query(e.to_string()))?);
        }
        Ok(results)
    }

    async fn delete_url(&self, url: &str) -> Result<(), HistoryError> {
        self.db
            .connection()
            .execute("DELETE FROM history_visits WHERE url = ?1", params![url])
            .map_err(|e| HistoryError::Delete(e.to_string()))?;
        Ok(())
    }

    async fn delete_range(&self, start_time: i64, end_time: i64) -> Result<(), HistoryError> {
        self.db
            .connection()
            .execute(
                "DELETE FROM history_visits WHERE visit_time >= ?1 AND visit_time <= ?2",
                params![start_time, end_time],
            )
            .map_err(|e| HistoryError::Delete(e.to_string()))?;
        Ok(())
    }

    async fn get_visits(&self, url: &str) -> Result<Vec<VisitRecord>, HistoryError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, visit_time FROM history_visits WHERE url = ?1 ORDER BY visit_time DESC",
            )
            .map_err(|e| HistoryError::Query(e.to_string()))?;
        let rows = stmt
            .query_map(params![url], |row| {
                Ok(VisitRecord {
                    visit_id: row.get(0)?,
                    visit_time: row.get(1)?,
                })
            })
            .map_err(|e| HistoryError::Query(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| HistoryError::Query(e.to_string()))?);
        }
        Ok(results)
    }

    fn subscribe(&self) -> broadcast::Receiver<HistoryRecord> {
        self.events.subscribe()
    }
}
