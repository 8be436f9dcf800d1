//! Error types for the account directory
use thiserror::Error;

use crate::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Account not found: {account_id}")]
    AccountNotFound { account_id: String },

    #[error("Account already exists: {email}")]
    AccountAlreadyExists { email: String },

    /// Unknown email or wrong password. The two are not distinguished.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account disabled: {email}")]
    AccountDisabled { email: String },

    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password hashing failed: {reason}")]
    HashingFailed { reason: String },

    #[error("Password verification failed")]
    PasswordVerificationFailed,

    #[error("Invalid seed file: {reason}")]
    InvalidSeed { reason: String },
}

impl DirectoryError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::AccountNotFound { .. })
    }

    /// Check if this error is a rejected login.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            DirectoryError::InvalidCredentials
                | DirectoryError::AccountDisabled { .. }
                | DirectoryError::PasswordVerificationFailed
        )
    }
}

impl From<DirectoryError> for Error {
    fn from(err: DirectoryError) -> Self {
        Error::Directory(err)
    }
}
