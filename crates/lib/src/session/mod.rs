//! Session state
//!
//! A [`Session`] is the client's view of who is signed in. It is owned by a
//! [`SessionProvider`], which follows an [`IdentitySource`] and is the only
//! writer; guards and the permission resolver read snapshots.
//!
//! Sessions move through a small state machine:
//!
//! ```text
//! Loading --initial lookup--> SignedIn | SignedOut
//! SignedOut --SignedIn--> SignedIn
//! SignedIn --TokenRefreshed--> SignedIn (updated identity / claim)
//! SignedIn --SignedOut--> SignedOut
//! ```

mod errors;
mod provider;
mod source;

pub use errors::SessionError;
pub use provider::SessionProvider;
pub use source::{AuthEvent, IdentitySource};

use serde::{Deserialize, Serialize};

/// A user identity as reported by the identity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable account identifier
    pub id: String,
    /// Login email address
    pub email: String,
    /// Optional human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Raw role claim from the account metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_claim: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            role_claim: None,
        }
    }

    pub fn with_role_claim(mut self, claim: impl Into<String>) -> Self {
        self.role_claim = Some(claim.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name to show in the interface, falling back to the email address.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// The current authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user, if any
    pub user: Option<Identity>,
    /// True until the provider has completed its initial resolution
    pub is_loading: bool,
    /// Role claim of the signed-in user, copied from the identity
    pub raw_role_claim: Option<String>,
}

impl Session {
    /// The state before the identity source has answered.
    pub fn loading() -> Self {
        Self {
            user: None,
            is_loading: true,
            raw_role_claim: None,
        }
    }

    /// A settled session with nobody signed in.
    pub fn signed_out() -> Self {
        Self {
            user: None,
            is_loading: false,
            raw_role_claim: None,
        }
    }

    /// A settled session for `identity`.
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            raw_role_claim: identity.role_claim.clone(),
            user: Some(identity),
            is_loading: false,
        }
    }

    /// Build a settled session from an optional identity.
    pub fn from_user(user: Option<Identity>) -> Self {
        match user {
            Some(identity) => Self::signed_in(identity),
            None => Self::signed_out(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_loading && self.user.is_some()
    }

    /// The state that follows `event`.
    ///
    /// Every event settles the session; none of them return to loading.
    pub fn apply(&self, event: &AuthEvent) -> Session {
        match event {
            AuthEvent::SignedIn(identity) | AuthEvent::TokenRefreshed(identity) => {
                Session::signed_in(identity.clone())
            }
            AuthEvent::SignedOut => Session::signed_out(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}
