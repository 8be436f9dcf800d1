//! Identity source interface
//!
//! The hosted auth service is reached through [`IdentitySource`]. Production
//! code plugs in an adapter; tests plug in fakes.

use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::Identity;
use crate::Result;

/// A change reported by the identity source.
///
/// Events are delivered in the order the source emits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A user signed in.
    SignedIn(Identity),
    /// The user signed out or their token was invalidated.
    SignedOut,
    /// The token was refreshed; the identity or its role claim may have changed.
    TokenRefreshed(Identity),
}

/// Capability to look up the current user and follow changes.
#[async_trait]
pub trait IdentitySource: Send + Sync + Debug {
    /// The user currently signed in, if any.
    async fn current_user(&self) -> Result<Option<Identity>>;

    /// Subscribe to change notifications.
    ///
    /// Dropping the receiver ends the subscription.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
