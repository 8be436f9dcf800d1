//! Encrypted single-key settings store

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use zeroize::Zeroizing;

use super::{StorageBackend, StoreKey, crypto};
use crate::Result;

/// One encrypted setting stored under a fixed key.
///
/// Writes encrypt and replace the stored envelope in one backend call. Reads
/// never fail: a missing entry, a backend error, a wrong key or corrupted
/// data all read as `None`, which callers treat as "not configured yet".
#[derive(Debug, Clone)]
pub struct SecureStore {
    storage: Arc<dyn StorageBackend>,
    key: Arc<StoreKey>,
    item_key: String,
}

impl SecureStore {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        key: Arc<StoreKey>,
        item_key: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            key,
            item_key: item_key.into(),
        }
    }

    /// The storage key this store writes under.
    pub fn item_key(&self) -> &str {
        &self.item_key
    }

    /// Encrypt and persist `value`, replacing any previous value.
    pub fn set_item(&self, value: &Value) -> Result<()> {
        self.set(value)
    }

    /// Read and decrypt the stored value.
    pub fn get_item(&self) -> Option<Value> {
        self.get()
    }

    /// Encrypt and persist any serializable value.
    pub fn set<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let plaintext = Zeroizing::new(serde_json::to_vec(value)?);
        let envelope = crypto::encrypt(&self.key, &plaintext)?;
        self.storage.set(&self.item_key, envelope)?;
        tracing::debug!(key = %self.item_key, "stored encrypted setting");
        Ok(())
    }

    /// Read, decrypt and deserialize the stored value.
    pub fn get<T: DeserializeOwned>(&self) -> Option<T> {
        let stored = match self.storage.get(&self.item_key) {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.item_key, "Failed to read setting from storage: {e}");
                return None;
            }
        };

        let plaintext = match crypto::decrypt(&self.key, &stored) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                tracing::debug!(key = %self.item_key, "Treating undecryptable setting as absent: {e}");
                return None;
            }
        };

        match serde_json::from_slice(&plaintext) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key = %self.item_key, "Treating undeserializable setting as absent: {e}");
                None
            }
        }
    }

    /// Delete the stored value.
    pub fn remove_item(&self) -> Result<()> {
        self.storage.remove(&self.item_key)
    }
}
