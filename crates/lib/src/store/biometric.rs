//! Biometric authentication preference

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{SecureStore, StorageBackend, StoreKey};
use crate::{Result, constants::BIOMETRIC_SETTING_KEY};

/// Persisted shape of the preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricPreference {
    pub enabled: bool,
}

/// The "unlock with biometrics" toggle, kept in a [`SecureStore`].
#[derive(Debug, Clone)]
pub struct BiometricSetting {
    store: SecureStore,
}

impl BiometricSetting {
    /// The device-wide preference.
    pub fn new(storage: Arc<dyn StorageBackend>, key: Arc<StoreKey>) -> Self {
        Self {
            store: SecureStore::new(storage, key, BIOMETRIC_SETTING_KEY),
        }
    }

    /// The preference of one account, for storage shared between accounts.
    pub fn for_account(
        storage: Arc<dyn StorageBackend>,
        key: Arc<StoreKey>,
        account_id: &str,
    ) -> Self {
        Self {
            store: SecureStore::new(storage, key, format!("{BIOMETRIC_SETTING_KEY}:{account_id}")),
        }
    }

    /// The stored preference, if one was ever saved and is still readable.
    pub fn preference(&self) -> Option<BiometricPreference> {
        self.store.get()
    }

    /// Whether biometric unlock is enabled. Unset means disabled.
    pub fn is_enabled(&self) -> bool {
        self.preference().is_some_and(|p| p.enabled)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.store.set(&BiometricPreference { enabled })
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove_item()
    }
}
