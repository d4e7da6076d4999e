//! Host storage view
//!
//! The host hands every mount a private key-value view. Only whole-entry
//! get/put/delete is used; the host serializes individual calls.

mod memory;

pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::StorageError;

/// One stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    /// Logical key inside the mount's view
    pub key: String,
    /// Raw bytes, JSON for every record this crate writes
    pub value: Vec<u8>,
}

impl StorageEntry {
    /// Encode `value` as a JSON entry under `key`
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> Result<Self, StorageError> {
        let key = key.into();
        match serde_json::to_vec(value) {
            Ok(value) => Ok(Self { key, value }),
            Err(source) => Err(StorageError::Decode { key, source }),
        }
    }

    /// Decode the entry's JSON payload
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, StorageError> {
        serde_json::from_slice(&self.value).map_err(|source| StorageError::Decode {
            key: self.key.clone(),
            source,
        })
    }
}

/// Key-value storage contract supplied by the host
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch an entry; `Ok(None)` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError>;

    /// Write an entry, replacing any previous value atomically
    async fn put(&self, entry: StorageEntry) -> Result<(), StorageError>;

    /// Remove an entry; removing an absent key is not an error
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
