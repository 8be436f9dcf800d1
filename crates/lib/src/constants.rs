//! Constants used throughout the portal library.
//!
//! Central definitions for default routes, query parameter names, storage keys
//! and environment variables.

/// Entry route for unauthenticated users.
pub const DEFAULT_AUTH_PATH: &str = "/auth";

/// Route used when a signed-in user lacks the required role.
pub const DEFAULT_FALLBACK_PATH: &str = "/auth";

/// Query parameter carrying the originally requested location.
pub const FROM_PARAM: &str = "from";

/// Query parameter carrying the redirect reason marker.
pub const REASON_PARAM: &str = "reason";

/// Reason marker attached to role-mismatch redirects.
pub const ACCESS_DENIED_MARKER: &str = "access_denied";

/// Environment variable holding the secure store secret.
pub const STORE_SECRET_ENV: &str = "MEREF_PORTAL_STORE_SECRET";

/// Storage key of the biometric authentication preference.
pub const BIOMETRIC_SETTING_KEY: &str = "meref_portal.biometric_enabled";
