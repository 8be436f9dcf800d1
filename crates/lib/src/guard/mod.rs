//! Route guards
//!
//! A [`RouteGuard`] decides, for one request of a protected page, whether to
//! show a loading affordance, redirect, or render the page. Decisions are pure
//! values computed from the current [`Session`]; performing the navigation is
//! left to the routing layer.

mod redirect;

pub use redirect::{GuardRedirect, RedirectAttachment, RedirectReason, is_local_path};

use std::collections::BTreeSet;

use crate::auth::{EffectivePermission, Role, resolve};
use crate::constants::{DEFAULT_AUTH_PATH, DEFAULT_FALLBACK_PATH};
use crate::session::Session;

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session is still resolving; show a loading indicator.
    Loading,
    /// Navigate away, remembering where the user wanted to go.
    Redirect(GuardRedirect),
    /// Render the protected page unchanged.
    Allow,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, GuardDecision::Loading)
    }

    pub fn redirect(&self) -> Option<&GuardRedirect> {
        match self {
            GuardDecision::Redirect(redirect) => Some(redirect),
            _ => None,
        }
    }
}

/// Access rule for a protected page.
///
/// An authentication-only guard (see [`RouteGuard::authenticated`]) admits any
/// signed-in user. A role-based guard additionally requires the effective
/// permission to share at least one role with its allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    allowed_roles: Option<BTreeSet<Role>>,
    fallback_path: String,
    auth_path: String,
}

impl RouteGuard {
    /// A guard that only requires a signed-in user.
    pub fn authenticated() -> Self {
        Self {
            allowed_roles: None,
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
        }
    }

    /// A guard that requires one of `roles`.
    pub fn with_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed_roles: Some(roles.into_iter().collect()),
            ..Self::authenticated()
        }
    }

    /// Where signed-in users without a matching role are sent.
    pub fn fallback_path(mut self, path: impl Into<String>) -> Self {
        self.fallback_path = path.into();
        self
    }

    /// Where unauthenticated users are sent.
    pub fn auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = path.into();
        self
    }

    /// The allow-list, or `None` for an authentication-only guard.
    pub fn allowed_roles(&self) -> Option<&BTreeSet<Role>> {
        self.allowed_roles.as_ref()
    }

    pub fn fallback(&self) -> &str {
        &self.fallback_path
    }

    pub fn auth(&self) -> &str {
        &self.auth_path
    }

    /// Evaluate the guard for a request of `location`.
    ///
    /// The checks run in a fixed order: loading first, then authentication,
    /// then (for role-based guards only) role membership.
    pub fn evaluate(
        &self,
        session: &Session,
        permission: &EffectivePermission,
        location: &str,
    ) -> GuardDecision {
        if session.is_loading {
            return GuardDecision::Loading;
        }

        if session.user.is_none() {
            tracing::debug!(location, "guard redirecting unauthenticated request");
            return GuardDecision::Redirect(GuardRedirect::new(
                &self.auth_path,
                location,
                RedirectReason::NotAuthenticated,
            ));
        }

        if let Some(allowed) = &self.allowed_roles
            && !permission.intersects(allowed)
        {
            tracing::debug!(location, ?allowed, "guard denying access");
            return GuardDecision::Redirect(GuardRedirect::new(
                &self.fallback_path,
                location,
                RedirectReason::AccessDenied,
            ));
        }

        GuardDecision::Allow
    }

    /// Resolve the session's permission and evaluate the guard.
    pub fn check(&self, session: &Session, location: &str) -> GuardDecision {
        self.evaluate(session, &resolve(session), location)
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::authenticated()
    }
}
