//! Role vocabulary
//!
//! Roles are a closed enumeration. The string forms are the claims issued by
//! the identity service and are matched exactly: no trimming, no case folding,
//! no prefixes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AuthError;

/// Version of the role vocabulary below.
///
/// Bump when a role is added, removed or renamed so persisted claims can be
/// migrated explicitly.
pub const ROLE_VOCABULARY_VERSION: u32 = 1;

/// A portal role.
///
/// No role implies another. `Admin` does not satisfy a check scoped to
/// `SfdAdmin` unless the check lists both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform administrator
    Admin,
    /// Administrator of a partner microfinance agency (SFD)
    SfdAdmin,
    /// End user (borrower)
    User,
    /// Administrator at the central funding authority
    MerefAdmin,
}

impl Role {
    /// Every role in the current vocabulary.
    pub const ALL: [Role; 4] = [Role::Admin, Role::SfdAdmin, Role::User, Role::MerefAdmin];

    /// The claim string for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SfdAdmin => "sfd_admin",
            Role::User => "user",
            Role::MerefAdmin => "meref_admin",
        }
    }

    /// Parse a claim string, returning `None` for anything outside the vocabulary.
    pub fn from_claim(claim: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == claim)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_claim(s).ok_or_else(|| AuthError::UnknownRole {
            value: s.to_string(),
        })
    }
}
