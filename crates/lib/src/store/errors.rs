//! Error types for the secure settings store.
//!
//! Only writes and configuration surface these errors. Reads swallow them and
//! report the value as absent.

use thiserror::Error;

use crate::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store secret is not configured.
    #[error("Store secret not configured: set {variable}")]
    MissingSecret { variable: String },

    #[error("Key derivation failed: {reason}")]
    KeyDerivationFailed { reason: String },

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    #[error("Decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    /// The stored string is not a valid envelope.
    #[error("Malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("Unsupported envelope version: {version}")]
    UnsupportedEnvelopeVersion { version: u8 },

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    /// The storage backend rejected an operation.
    #[error("Storage backend failed for key '{key}': {reason}")]
    StorageFailed { key: String, reason: String },
}

impl StoreError {
    /// Check if this error comes from missing or invalid configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            StoreError::MissingSecret { .. } | StoreError::KeyDerivationFailed { .. }
        )
    }

    /// Check if this error means stored data could not be read back.
    pub fn is_unreadable_data(&self) -> bool {
        matches!(
            self,
            StoreError::DecryptionFailed { .. }
                | StoreError::MalformedEnvelope { .. }
                | StoreError::UnsupportedEnvelopeVersion { .. }
                | StoreError::InvalidNonceLength { .. }
        )
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}
