//! Session provider
//!
//! Follows an [`IdentitySource`] on a background task and publishes the
//! resulting [`Session`] through a `watch` channel. Readers always see the
//! latest state; intermediate states inside one scheduling tick may be skipped.

use std::sync::Arc;

use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        watch,
    },
    task::JoinHandle,
};

use super::{AuthEvent, IdentitySource, Session};

/// Owner of the session state.
///
/// The provider starts in [`Session::loading`] and settles once the identity
/// source answers its first lookup. A failing source settles as signed out.
/// Dropping the provider cancels the background task, which ends the
/// subscription to the source.
#[derive(Debug)]
pub struct SessionProvider {
    state: watch::Receiver<Session>,
    task: JoinHandle<()>,
}

impl SessionProvider {
    /// Start following `source`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(source: Arc<dyn IdentitySource>) -> Self {
        let (tx, rx) = watch::channel(Session::loading());
        // Subscribe before the initial lookup so no change slips in between.
        let events = source.subscribe();
        let task = tokio::spawn(follow(source, events, tx));
        Self { state: rx, task }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every session change.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.state.clone()
    }

    /// Wait until the initial resolution has completed.
    ///
    /// Returns the latest snapshot if the provider was shut down first.
    pub async fn ready(&self) -> Session {
        let mut rx = self.state.clone();
        let settled = rx.wait_for(|session| !session.is_loading).await.map(|s| s.clone());
        settled.unwrap_or_else(|_| self.session())
    }

    /// Stop following the identity source.
    ///
    /// The last published session stays readable.
    pub fn shutdown(&self) {
        self.task.abort();
    }

    /// Whether the provider is still following its source.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SessionProvider {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn follow(
    source: Arc<dyn IdentitySource>,
    mut events: broadcast::Receiver<AuthEvent>,
    tx: watch::Sender<Session>,
) {
    tx.send_replace(lookup(source.as_ref()).await);

    loop {
        match events.recv().await {
            Ok(event) => {
                tracing::debug!(?event, "applying auth event");
                tx.send_modify(|session| *session = session.apply(&event));
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Session provider missed {skipped} auth events, re-reading current user");
                tx.send_replace(lookup(source.as_ref()).await);
            }
            Err(RecvError::Closed) => {
                tracing::debug!("Identity source closed its event stream");
                break;
            }
        }
    }
}

async fn lookup(source: &dyn IdentitySource) -> Session {
    match source.current_user().await {
        Ok(user) => Session::from_user(user),
        Err(e) => {
            tracing::warn!("Failed to resolve current user, treating session as signed out: {e}");
            Session::signed_out()
        }
    }
}
