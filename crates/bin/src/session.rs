//! Session management for the web interface
//!
//! Maps session cookies to the [`SessionProvider`] following the signed-in
//! account, so role changes and account suspension reach open sessions.
//!
//! Entries are dropped, and their providers shut down, on logout, once their
//! session settles as signed out, or after `idle_timeout` without a request.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use meref_portal::{Session, SessionProvider};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session token (UUID stored in cookie)
pub type SessionToken = String;

/// Default time a session may go unused before it is dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct Entry {
    provider: Arc<SessionProvider>,
    last_seen: Instant,
}

impl Entry {
    /// Whether the entry can never admit a request again.
    fn is_stale(&self, now: Instant, idle_timeout: Duration) -> bool {
        if now.duration_since(self.last_seen) > idle_timeout || !self.provider.is_running() {
            return true;
        }
        let session = self.provider.session();
        !session.is_loading && session.user.is_none()
    }
}

/// In-memory session store
///
/// Sessions are ephemeral and lost on server restart.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, Entry>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Register a provider and return the token to store in a cookie.
    ///
    /// Stale sessions are swept first so abandoned logins do not pile up.
    pub async fn create_session(&self, provider: SessionProvider) -> SessionToken {
        self.reap().await;

        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            token.clone(),
            Entry {
                provider: Arc::new(provider),
                last_seen: Instant::now(),
            },
        );
        token
    }

    /// Current session for a token, refreshing its idle timer.
    ///
    /// Unknown, expired and signed-out tokens are signed out; the latter two
    /// are removed.
    pub async fn session(&self, token: &str) -> Session {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        let Some(entry) = sessions.get_mut(token) else {
            return Session::signed_out();
        };
        if entry.is_stale(now, self.idle_timeout) {
            if let Some(entry) = sessions.remove(token) {
                entry.provider.shutdown();
            }
            tracing::debug!("Dropped stale session");
            return Session::signed_out();
        }

        entry.last_seen = now;
        entry.provider.session()
    }

    /// Destroy a session and stop following its account.
    pub async fn destroy_session(&self, token: &str) {
        let removed = self.sessions.write().await.remove(token);
        if let Some(entry) = removed {
            entry.provider.shutdown();
        }
    }

    /// Drop every stale session. Returns how many were removed.
    pub async fn reap(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let keep = !entry.is_stale(now, self.idle_timeout);
            if !keep {
                entry.provider.shutdown();
            }
            keep
        });
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!("Reaped {removed} stale sessions");
        }
        removed
    }

    /// Stop every session (server shutdown).
    pub async fn clear(&self) {
        let mut sessions = self.sessions.write().await;
        for (_, entry) in sessions.drain() {
            entry.provider.shutdown();
        }
    }

    /// Get the number of active sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
