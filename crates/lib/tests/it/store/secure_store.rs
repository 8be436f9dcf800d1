//! SecureStore behaviour over real storage backends

use std::sync::Arc;

use meref_portal::store::{FileStorage, InMemoryStorage, SecureStore, StorageBackend};
use serde_json::json;

use crate::helpers::store_key;

#[test]
fn test_round_trip_nested_values() {
    let store = SecureStore::new(Arc::new(InMemoryStorage::new()), store_key("secret"), "prefs");
    let value = json!({
        "enabled": true,
        "devices": ["pixel-7", "iphone-15"],
        "limits": {"daily": 3, "ratio": 0.25},
        "note": null,
    });

    store.set_item(&value).unwrap();
    assert_eq!(store.get_item(), Some(value));
}

#[test]
fn test_overwrite_replaces_previous_value() {
    let storage = Arc::new(InMemoryStorage::new());
    let store = SecureStore::new(storage.clone(), store_key("secret"), "prefs");

    store.set_item(&json!({"enabled": true})).unwrap();
    store.set_item(&json!({"enabled": false})).unwrap();
    assert_eq!(store.get_item(), Some(json!({"enabled": false})));
    assert_eq!(storage.len(), 1);
}

#[test]
fn test_malformed_ciphertext_reads_as_absent() {
    let storage = Arc::new(InMemoryStorage::new());
    let store = SecureStore::new(storage.clone(), store_key("secret"), "prefs");
    store.set_item(&json!({"enabled": true})).unwrap();

    for garbage in [
        "",
        "{}",
        "{\"enabled\":true}",
        "{\"v\":1,\"nonce\":\"AAAAAAAAAAAAAAAA\",\"ct\":\"AAAAAAAAAAAAAAAAAAAAAAAA\"}",
    ] {
        storage.set("prefs", garbage.to_string()).unwrap();
        assert_eq!(store.get_item(), None, "garbage {garbage:?}");
    }
}

#[test]
fn test_tampered_ciphertext_reads_as_absent() {
    let storage = Arc::new(InMemoryStorage::new());
    let store = SecureStore::new(storage.clone(), store_key("secret"), "prefs");
    store.set_item(&json!({"enabled": true})).unwrap();

    let mut envelope: serde_json::Value =
        serde_json::from_str(&storage.get("prefs").unwrap().unwrap()).unwrap();
    let ct = envelope["ct"].as_str().unwrap().to_string();
    let flipped = if ct.starts_with('A') { ct.replacen('A', "B", 1) } else { format!("A{}", &ct[1..]) };
    envelope["ct"] = json!(flipped);
    storage.set("prefs", envelope.to_string()).unwrap();

    assert_eq!(store.get_item(), None);
}

#[test]
fn test_changing_secret_invalidates_values() {
    let storage = Arc::new(InMemoryStorage::new());
    let original = SecureStore::new(storage.clone(), store_key("first-secret"), "prefs");
    original.set_item(&json!({"enabled": true})).unwrap();

    let rotated = SecureStore::new(storage.clone(), store_key("second-secret"), "prefs");
    assert_eq!(rotated.get_item(), None);

    // Restoring the old secret makes the value readable again.
    let restored = SecureStore::new(storage, store_key("first-secret"), "prefs");
    assert_eq!(restored.get_item(), Some(json!({"enabled": true})));
}

#[test]
fn test_keys_are_isolated() {
    let storage: Arc<dyn StorageBackend> = Arc::new(InMemoryStorage::new());
    let key = store_key("secret");
    let a = SecureStore::new(storage.clone(), key.clone(), "a");
    let b = SecureStore::new(storage, key, "b");

    a.set_item(&json!("alpha")).unwrap();
    assert_eq!(b.get_item(), None);
    assert_eq!(a.item_key(), "a");
}

#[test]
fn test_file_storage_round_trip_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let store = SecureStore::new(Arc::new(FileStorage::new(&path)), store_key("secret"), "prefs");
    store.set_item(&json!({"enabled": true})).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("enabled"));

    let reopened = SecureStore::new(Arc::new(FileStorage::new(&path)), store_key("secret"), "prefs");
    assert_eq!(reopened.get_item(), Some(json!({"enabled": true})));
}

#[test]
fn test_unreadable_file_reads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "not a json map").unwrap();

    let store = SecureStore::new(Arc::new(FileStorage::new(&path)), store_key("secret"), "prefs");
    assert_eq!(store.get_item(), None);
}
