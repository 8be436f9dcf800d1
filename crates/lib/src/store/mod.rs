//! Secure local settings
//!
//! Client-side flags are persisted through [`SecureStore`], which encrypts a
//! JSON value with AES-256-GCM before it reaches a [`StorageBackend`] and
//! decrypts it on the way back.
//!
//! # Encryption Architecture
//!
//! ```text
//! Write: value → JSON → encrypt() → {"v":1,"nonce":b64,"ct":b64} → storage[key]
//! Read:  storage[key] → envelope → decrypt() → JSON → value
//! ```
//!
//! The AES key is derived once from a configured secret with Argon2id (see
//! [`StoreKey`]). There is no built-in fallback secret: without one no store
//! can be built, so nothing is persisted. Changing the secret makes every
//! previously written value unreadable, and unreadable values read as absent.

mod backend;
mod biometric;
pub mod crypto;
mod errors;
mod secure_store;

pub use backend::{FileStorage, InMemoryStorage, StorageBackend};
pub use biometric::{BiometricPreference, BiometricSetting};
pub use crypto::StoreKey;
pub use errors::StoreError;
pub use secure_store::SecureStore;
