//! Storage Manager for Block History.
//!
//! `StorageManagerTrait` is the synced key-value area the settings store
//! persists through. `StorageManager` backs it with SQLite and enforces the
//! same quotas a browser sync area imposes.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use crate::database::Database;
use crate::types::errors::StorageError;

/// Total bytes the area may hold.
pub const QUOTA_BYTES: usize = 102_400;

/// Bytes a single item (key + serialized value) may occupy.
pub const QUOTA_BYTES_PER_ITEM: usize = 8_192;

/// Key-value storage operations.
#[async_trait]
pub trait StorageManagerTrait: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
    async fn clear(&self) -> Result<(), StorageError>;
    async fn bytes_in_use(&self) -> Result<usize, StorageError>;
    fn quota_bytes(&self) -> usize;
}

/// Storage area persisted in the `storage_items` table.
pub struct StorageManager {
    db: Arc<Database>,
}

impl StorageManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn item_size(key: &str, serialized: &str) -> usize {
        key.len() + serialized.len()
    }
}

#[async_trait]
impl StorageManagerTrait for StorageManager {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let raw: Option<String> = self
            .db
            .connection()
            .query_row(
                "SELECT value FROM storage_items WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::Read(e.to_string()))?;

        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let serialized =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let size = Self::item_size(key, &serialized);
        if size > QUOTA_BYTES_PER_ITEM {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                bytes: size,
                quota: QUOTA_BYTES_PER_ITEM,
            });
        }

        let conn = self.db.connection();
        let others: i64 = conn
            .query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) \
                 FROM storage_items WHERE key != ?1",
                params![key],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::Read(e.to_string()))?;
        let total = others as usize + size;
        if total > QUOTA_BYTES {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                bytes: total,
                quota: QUOTA_BYTES,
            });
        }

        conn.execute(
            "INSERT INTO storage_items (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, serialized, crate::types::now_millis()],
        )
        .map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db
            .connection()
            .execute("DELETE FROM storage_items WHERE key = ?1", params![key])
            .map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.db
            .connection()
            .execute("DELETE FROM storage_items", [])
            .map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(())
    }

    async fn bytes_in_use(&self) -> Result<usize, StorageError> {
        let used: i64 = self
            .db
            .connection()
            .query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) \
                 FROM storage_items",
                [],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::Read(e.to_string()))?;
        Ok(used as usize)
    }

    fn quota_bytes(&self) -> usize {
        QUOTA_BYTES
    }
}
