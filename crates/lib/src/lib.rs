//!
//! MEREF Portal: access control and secure client settings for the MEREF
//! microfinance portal.
//!
//! The portal connects end users, partner microfinance agencies (SFDs) and the
//! central funding authority (MEREF). This library holds the parts of the
//! client that carry a real contract; pages and layouts live in the binary.
//!
//! ## Core Concepts
//!
//! * **Sessions (`session::Session`)**: The current identity, its raw role claim and
//!   a loading flag. Owned by a `session::SessionProvider` that follows an
//!   `session::IdentitySource` and republishes its state changes.
//! * **Roles (`auth::Role`)**: The closed, versioned role vocabulary.
//! * **Permission resolution (`auth::resolve`)**: Derives the `auth::EffectivePermission`
//!   of a session without ever widening the raw claim.
//! * **Route guards (`guard::RouteGuard`)**: Pure decisions between loading, redirecting
//!   and allowing access to a protected page.
//! * **Secure store (`store::SecureStore`)**: AES-256-GCM encrypted settings on top of a
//!   pluggable `store::StorageBackend`, used for the biometric preference.
//! * **Directory (`directory::Directory`)**: An in-process account directory standing in
//!   for the hosted identity service.

pub mod auth;
pub mod config;
pub mod constants;
pub mod directory;
pub mod format;
pub mod guard;
pub mod session;
pub mod store;

pub use config::PortalConfig;
pub use guard::{GuardDecision, RouteGuard};
pub use session::{Session, SessionProvider};

/// Result type used throughout the portal library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the portal library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured authorization errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured session errors from the session module
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured secure store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured account errors from the directory module
    #[error(transparent)]
    Directory(directory::DirectoryError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::Session(_) => "session",
            Error::Store(_) => "store",
            Error::Directory(_) => "directory",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Directory(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Auth(err) => err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Auth(_) => true,
            Error::Directory(err) => err.is_authentication_error(),
            Error::Session(err) => err.is_source_unavailable(),
            _ => false,
        }
    }

    /// Check if this error comes from missing or invalid configuration.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Store(err) => err.is_configuration_error(),
            _ => false,
        }
    }

    /// Check if this error is related to encrypted settings.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
