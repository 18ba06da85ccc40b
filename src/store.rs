//! Key-value persistence.
//!
//! A redb file standing in for the browser's origin-scoped local storage:
//! synchronous, string-keyed, one JSON document per key. Reads of missing
//! or corrupt keys yield `None`; rejected writes yield `false`. Callers
//! treat persistence as best-effort and never see a panic from here.

use redb::{Database, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

const KV_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),
}

/// Thin handle to the storage file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct KvStore {
    db: Arc<Database>,
}

impl KvStore {
    /// Open (or create) the storage file at the given path.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Ok(Self::open_inner(path)?)
    }

    fn open_inner(path: &str) -> Result<Self, redb::Error> {
        let db = Database::create(path)?;

        // Ensure the table exists
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(KV_TABLE)?;
        }
        txn.commit()?;

        Ok(KvStore { db: Arc::new(db) })
    }

    /// Read and decode the value under `key`. Missing key, read failure and
    /// undecodable value all collapse to `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.read_raw(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "read failed");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is not valid JSON, treating as absent");
                None
            }
        }
    }

    /// Encode `value` as JSON and replace whatever is under `key`.
    /// Returns false when the write is rejected; the caller decides whether
    /// that matters.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key, error = %e, "value failed to serialize");
                return false;
            }
        };

        match self.write_raw(key, &bytes) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "write rejected");
                false
            }
        }
    }

    /// Delete the value under `key`. True if something was removed.
    pub fn remove(&self, key: &str) -> bool {
        match self.remove_raw(key) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(key, error = %e, "remove rejected");
                false
            }
        }
    }

    fn read_raw(&self, key: &str) -> Result<Option<Vec<u8>>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(KV_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn write_raw(&self, key: &str, bytes: &[u8]) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(KV_TABLE)?;
            table.insert(key, bytes)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<bool, redb::Error> {
        let txn = self.db.begin_write()?;
        let removed;
        {
            let mut table = txn.open_table(KV_TABLE)?;
            removed = table.remove(key)?.is_some();
        }
        txn.commit()?;
        Ok(removed)
    }
}
