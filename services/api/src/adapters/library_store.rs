//! services/api/src/adapters/library_store.rs
//!
//! This module contains the storage adapter, which is the concrete implementation
//! of the `LibraryStore` port from the `core` crate. Each collection is one JSON
//! array kept under a fixed key of any `KeyValueStore`.

use crate::adapters::kv::KeyValueStore;
use crate::adapters::records::{BookRecord, LoanEventRecord};
use async_trait::async_trait;
use library_catalog_core::domain::{Book, LoanEvent};
use library_catalog_core::ports::{LibraryStore, PortError, PortResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

pub const CATALOG_KEY: &str = "catalog";
pub const ACTIVITY_LOG_KEY: &str = "activity-log";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that implements the `LibraryStore` port.
#[derive(Clone)]
pub struct KvLibraryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl KvLibraryStore {
    /// Creates a new `KvLibraryStore`.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Reads the array under `key`. A missing key is an empty collection, and
    /// so is a blob that no longer decodes; the latter is logged and will be
    /// replaced by the next save.
    async fn load<R: DeserializeOwned>(&self, key: &str) -> PortResult<Vec<R>> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<R>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(key, error = %e, "Stored collection is unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save<R: serde::Serialize + Sync>(&self, key: &str, records: &[R]) -> PortResult<()> {
        let raw = serde_json::to_string(records)
            .map_err(|e| PortError::Unexpected(format!("Failed to encode {}: {}", key, e)))?;
        self.kv.set(key, raw).await
    }
}

//=========================================================================================
// `LibraryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl LibraryStore for KvLibraryStore {
    async fn load_books(&self) -> PortResult<Vec<Book>> {
        let records: Vec<BookRecord> = self.load(CATALOG_KEY).await?;
        Ok(records.into_iter().map(BookRecord::to_domain).collect())
    }

    async fn save_books(&self, books: &[Book]) -> PortResult<()> {
        let records: Vec<BookRecord> = books.iter().map(BookRecord::from_domain).collect();
        self.save(CATALOG_KEY, &records).await
    }

    async fn load_events(&self) -> PortResult<Vec<LoanEvent>> {
        let records: Vec<LoanEventRecord> = self.load(ACTIVITY_LOG_KEY).await?;
        Ok(records.into_iter().map(LoanEventRecord::to_domain).collect())
    }

    async fn save_events(&self, events: &[LoanEvent]) -> PortResult<()> {
        let records: Vec<LoanEventRecord> = events.iter().map(LoanEventRecord::from_domain).collect();
        self.save(ACTIVITY_LOG_KEY, &records).await
    }
}
