//! Authorization module for the portal
//!
//! This module defines the closed role vocabulary and the permission resolver
//! that turns a session's raw role claim into an effective permission set.

pub mod errors;
pub mod permission;
pub mod role;

// Re-export main types for easier access
pub use errors::AuthError;
pub use permission::*;
pub use role::{ROLE_VOCABULARY_VERSION, Role};
