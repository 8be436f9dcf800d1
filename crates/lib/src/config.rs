//! Portal configuration
//!
//! Collects the routes guards redirect to and where the secure store secret
//! comes from. The binary fills this from its command line; library users can
//! start from [`PortalConfig::default`].

use std::sync::Arc;

use crate::{
    Result,
    auth::Role,
    constants::{DEFAULT_AUTH_PATH, DEFAULT_FALLBACK_PATH, STORE_SECRET_ENV},
    guard::RouteGuard,
    store::StoreKey,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Login route for unauthenticated users
    pub auth_path: String,
    /// Route for signed-in users who lack a required role
    pub fallback_path: String,
    /// Environment variable holding the secure store secret
    pub store_secret_var: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
            store_secret_var: STORE_SECRET_ENV.to_string(),
        }
    }
}

impl PortalConfig {
    /// A guard that only requires a signed-in user.
    pub fn authenticated_guard(&self) -> RouteGuard {
        RouteGuard::authenticated()
            .auth_path(&self.auth_path)
            .fallback_path(&self.fallback_path)
    }

    /// A guard that requires one of `roles`.
    pub fn role_guard(&self, roles: impl IntoIterator<Item = Role>) -> RouteGuard {
        RouteGuard::with_roles(roles)
            .auth_path(&self.auth_path)
            .fallback_path(&self.fallback_path)
    }

    /// Derive the secure store key from the configured environment variable.
    ///
    /// Fails closed when the variable is missing.
    pub fn store_key(&self) -> Result<Arc<StoreKey>> {
        StoreKey::from_env_var(&self.store_secret_var).map(Arc::new)
    }
}
