//! Cryptographic functions for the secure store
//!
//! Provides key derivation and value encryption using:
//! - Argon2id to derive the store key from the configured secret
//! - AES-256-GCM with a fresh random nonce per write

use std::fmt;

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng},
};
use argon2::Argon2;
use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::errors::StoreError;
use crate::{Result, constants::STORE_SECRET_ENV};

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// Derived key length for AES-256 (32 bytes)
pub const KEY_LENGTH: usize = 32;

/// Current envelope format version
pub const ENVELOPE_VERSION: u8 = 1;

/// Fixed salt for deriving the store key.
///
/// The secret is the only input that varies per deployment.
const KEY_SALT: &[u8] = b"meref-portal/secure-store/v1";

/// AES-256 key for the secure store, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct StoreKey {
    bytes: [u8; KEY_LENGTH],
}

impl StoreKey {
    /// Derive the store key from `secret` with Argon2id.
    ///
    /// Derivation is deliberately slow; derive once at startup and share the key.
    pub fn derive(secret: impl AsRef<str>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(StoreError::MissingSecret {
                variable: STORE_SECRET_ENV.to_string(),
            }
            .into());
        }

        let mut bytes = [0u8; KEY_LENGTH];
        Argon2::default()
            .hash_password_into(secret.as_bytes(), KEY_SALT, &mut bytes)
            .map_err(|e| StoreError::KeyDerivationFailed {
                reason: format!("Key derivation failed: {e}"),
            })?;

        Ok(Self { bytes })
    }

    /// Derive the store key from the `MEREF_PORTAL_STORE_SECRET` environment variable.
    ///
    /// Fails closed with [`StoreError::MissingSecret`] when it is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(STORE_SECRET_ENV)
    }

    /// Derive the store key from the environment variable `variable`.
    pub fn from_env_var(variable: &str) -> Result<Self> {
        let secret = Zeroizing::new(std::env::var(variable).unwrap_or_default());
        if secret.is_empty() {
            return Err(StoreError::MissingSecret {
                variable: variable.to_string(),
            }
            .into());
        }
        Self::derive(secret.as_str())
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.bytes).map_err(|e| {
            StoreError::EncryptionFailed {
                reason: format!("Failed to create cipher: {e}"),
            }
            .into()
        })
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreKey([REDACTED])")
    }
}

/// Serialized form of an encrypted value.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    v: u8,
    nonce: String,
    ct: String,
}

/// Encrypt `plaintext` into an envelope string.
pub fn encrypt(key: &StoreKey, plaintext: &[u8]) -> Result<String> {
    let cipher = key.cipher()?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| StoreError::EncryptionFailed {
            reason: format!("Encryption failed: {e}"),
        })?;

    let envelope = Envelope {
        v: ENVELOPE_VERSION,
        nonce: Base64::encode_string(&nonce),
        ct: Base64::encode_string(&ciphertext),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decrypt an envelope string produced by [`encrypt`].
pub fn decrypt(key: &StoreKey, stored: &str) -> Result<Zeroizing<Vec<u8>>> {
    let envelope: Envelope =
        serde_json::from_str(stored).map_err(|e| StoreError::MalformedEnvelope {
            reason: e.to_string(),
        })?;

    if envelope.v != ENVELOPE_VERSION {
        return Err(StoreError::UnsupportedEnvelopeVersion {
            version: envelope.v,
        }
        .into());
    }

    let nonce = Base64::decode_vec(&envelope.nonce).map_err(|_| StoreError::MalformedEnvelope {
        reason: "nonce: invalid base64".to_string(),
    })?;
    if nonce.len() != NONCE_LENGTH {
        return Err(StoreError::InvalidNonceLength {
            expected: NONCE_LENGTH,
            actual: nonce.len(),
        }
        .into());
    }

    let ciphertext = Base64::decode_vec(&envelope.ct).map_err(|_| StoreError::MalformedEnvelope {
        reason: "ct: invalid base64".to_string(),
    })?;

    let plaintext = key
        .cipher()?
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
        .map_err(|e| StoreError::DecryptionFailed {
            reason: format!("Decryption failed: {e}"),
        })?;

    Ok(Zeroizing::new(plaintext))
}
