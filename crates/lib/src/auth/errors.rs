//! Authorization error types for the portal library.
//!
//! Role mismatches seen by a route guard are not errors; these variants cover
//! imperative checks and role parsing, where the caller asked for a `Result`.

use thiserror::Error as ThisError;

use super::Role;
use crate::Error;

/// Errors that can occur during authorization checks.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum AuthError {
    /// A role string is not part of the role vocabulary.
    #[error("Unknown role: {value}")]
    UnknownRole {
        /// The rejected role string
        value: String,
    },

    /// The session has no signed-in user.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The session is still resolving its identity.
    #[error("Session is still loading")]
    SessionLoading,

    /// The signed-in user holds none of the required roles.
    #[error("Permission denied: requires one of {required:?}")]
    PermissionDenied {
        /// The roles that would have granted access
        required: Vec<Role>,
    },
}

impl AuthError {
    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AuthError::PermissionDenied { .. })
    }

    /// Check if this error indicates there is no usable identity.
    pub fn is_not_authenticated(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated | AuthError::SessionLoading
        )
    }

    /// Check if this error indicates an unknown role string.
    pub fn is_unknown_role(&self) -> bool {
        matches!(self, AuthError::UnknownRole { .. })
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
