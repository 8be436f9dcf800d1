//! Permission resolution
//!
//! This module turns a [`Session`] into the set of roles it is authorized
//! under. Resolution only narrows or passes the raw claim through: an unknown
//! claim resolves to nothing, and no role implies another.

use std::collections::BTreeSet;

use super::{AuthError, Role};
use crate::Result;
use crate::session::Session;

/// The resolved set of roles a session is authorized under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermission {
    roles: BTreeSet<Role>,
}

impl EffectivePermission {
    /// An empty permission set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a permission set from already-parsed roles.
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    /// The roles in this set, in vocabulary order.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.roles.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check whether any role of this set is in `allowed`.
    pub fn intersects(&self, allowed: &BTreeSet<Role>) -> bool {
        !self.roles.is_disjoint(allowed)
    }
}

/// Resolve the effective permission of a session.
///
/// A session without a user, including one that is still loading, resolves to
/// the empty set. Every call recomputes from the session value.
///
/// # Examples
/// ```
/// use meref_portal::auth::{Role, resolve};
/// use meref_portal::session::{Identity, Session};
///
/// let identity = Identity::new("u-1", "awa@sfd.example").with_role_claim("sfd_admin");
/// let permission = resolve(&Session::signed_in(identity));
/// assert!(permission.contains(Role::SfdAdmin));
/// assert!(!permission.contains(Role::Admin));
/// ```
pub fn resolve(session: &Session) -> EffectivePermission {
    if session.is_loading || session.user.is_none() {
        return EffectivePermission::empty();
    }

    let permission = resolve_claims(session.raw_role_claim.as_deref());
    tracing::trace!(
        claim = ?session.raw_role_claim,
        roles = ?permission.roles,
        "resolved effective permission"
    );
    permission
}

/// Union the roles named by several raw claims.
///
/// Claims outside the vocabulary are dropped.
pub fn resolve_claims<I, S>(claims: I) -> EffectivePermission
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let roles = claims.into_iter().filter_map(|claim| {
        let claim = claim.as_ref();
        let role = Role::from_claim(claim);
        if role.is_none() {
            tracing::debug!("Ignoring role claim outside the vocabulary: {claim:?}");
        }
        role
    });
    EffectivePermission::from_roles(roles)
}

/// Check whether the session holds `role`.
pub fn has_role(session: &Session, role: Role) -> bool {
    resolve(session).contains(role)
}

/// Check whether the session holds at least one of `roles`.
pub fn has_any_role(session: &Session, roles: &[Role]) -> bool {
    let permission = resolve(session);
    roles.iter().any(|role| permission.contains(*role))
}

/// Check whether the session may enter a page restricted to `allowed`.
///
/// `None` means the page only needs a signed-in user. This mirrors the route
/// guard for call sites outside the render path, such as before navigating.
pub fn can_access(session: &Session, allowed: Option<&BTreeSet<Role>>) -> bool {
    if session.is_loading || session.user.is_none() {
        return false;
    }
    match allowed {
        Some(allowed) => resolve(session).intersects(allowed),
        None => true,
    }
}

/// Require one of `roles`, returning the resolved permission on success.
pub fn require_any_role(session: &Session, roles: &[Role]) -> Result<EffectivePermission> {
    if session.is_loading {
        return Err(AuthError::SessionLoading.into());
    }
    if session.user.is_none() {
        return Err(AuthError::NotAuthenticated.into());
    }

    let permission = resolve(session);
    if roles.iter().any(|role| permission.contains(*role)) {
        Ok(permission)
    } else {
        Err(AuthError::PermissionDenied {
            required: roles.to_vec(),
        }
        .into())
    }
}
