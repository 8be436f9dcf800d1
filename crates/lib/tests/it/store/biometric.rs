//! The biometric preference as the settings page uses it

use std::sync::Arc;

use meref_portal::{
    constants::BIOMETRIC_SETTING_KEY,
    store::{BiometricPreference, BiometricSetting, FileStorage, InMemoryStorage, StorageBackend},
};

use crate::helpers::store_key;

#[test]
fn test_enable_then_rotate_secret_reads_as_unset() {
    let storage: Arc<dyn StorageBackend> = Arc::new(InMemoryStorage::new());
    let setting = BiometricSetting::new(storage.clone(), store_key("before"));
    setting.set_enabled(true).unwrap();
    assert!(setting.is_enabled());

    let after_rotation = BiometricSetting::new(storage, store_key("after"));
    assert_eq!(after_rotation.preference(), None);
    assert!(!after_rotation.is_enabled());
}

#[test]
fn test_stored_under_fixed_key() {
    let storage = Arc::new(InMemoryStorage::new());
    BiometricSetting::new(storage.clone(), store_key("secret"))
        .set_enabled(false)
        .unwrap();

    assert!(storage.get(BIOMETRIC_SETTING_KEY).unwrap().is_some());
}

#[test]
fn test_preference_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    BiometricSetting::for_account(Arc::new(FileStorage::new(&path)), store_key("secret"), "acct-9")
        .set_enabled(true)
        .unwrap();

    let setting =
        BiometricSetting::for_account(Arc::new(FileStorage::new(&path)), store_key("secret"), "acct-9");
    assert_eq!(setting.preference(), Some(BiometricPreference { enabled: true }));
}
