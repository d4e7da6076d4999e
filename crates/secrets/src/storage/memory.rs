//! In-memory storage view

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{Storage, StorageEntry};
use crate::core::StorageError;

/// In-memory implementation of [`Storage`]
///
/// Clones share the same map, so a test can keep a handle while the backend
/// owns another.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<DashMap<String, Vec<u8>>>,
    fail_on_put: Arc<AtomicBool>,
    put_count: Arc<AtomicU32>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next put fail
    pub fn fail_next_put(&self) {
        self.fail_on_put.store(true, Ordering::SeqCst);
    }

    /// Number of successful puts
    pub fn put_count(&self) -> u32 {
        self.put_count.load(Ordering::SeqCst)
    }

    /// Raw bytes stored under `key`
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError> {
        Ok(self.entries.get(key).map(|entry| StorageEntry {
            key: key.to_string(),
            value: entry.value().clone(),
        }))
    }

    async fn put(&self, entry: StorageEntry) -> Result<(), StorageError> {
        if self.fail_on_put.swap(false, Ordering::SeqCst) {
            return Err(StorageError::WriteFailure {
                key: entry.key,
                source: std::io::Error::other("mock failure"),
            });
        }
        tracing::debug!(key = %entry.key, bytes = entry.value.len(), "storage put");
        self.entries.insert(entry.key, entry.value);
        self.put_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
