use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use meref_portal::{
    Result, Session, SessionProvider,
    session::{AuthEvent, Identity, IdentitySource, SessionError},
    store::StoreKey,
};
use tokio::sync::broadcast;

/// Identity source whose state and events are driven by the test.
#[derive(Debug)]
pub struct FakeIdentitySource {
    user: Mutex<Option<Identity>>,
    unreachable: bool,
    events: broadcast::Sender<AuthEvent>,
}

impl FakeIdentitySource {
    pub fn signed_in(identity: Identity) -> Arc<Self> {
        Arc::new(Self::build(Some(identity), false))
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self::build(None, false))
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self::build(None, true))
    }

    fn build(user: Option<Identity>, unreachable: bool) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            user: Mutex::new(user),
            unreachable,
            events,
        }
    }

    /// Update the current user and emit `event`.
    pub fn emit(&self, event: AuthEvent) {
        let user = match &event {
            AuthEvent::SignedIn(identity) | AuthEvent::TokenRefreshed(identity) => {
                Some(identity.clone())
            }
            AuthEvent::SignedOut => None,
        };
        *self.user.lock().unwrap() = user;
        let _ = self.events.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

#[async_trait]
impl IdentitySource for FakeIdentitySource {
    async fn current_user(&self) -> Result<Option<Identity>> {
        if self.unreachable {
            return Err(SessionError::SourceUnavailable {
                reason: "identity service unreachable".to_string(),
            }
            .into());
        }
        Ok(self.user.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

pub fn identity_with_claim(claim: &str) -> Identity {
    Identity::new("account-1", "mariam@sfd.example").with_role_claim(claim)
}

pub fn session_with_claim(claim: &str) -> Session {
    Session::signed_in(identity_with_claim(claim))
}

pub fn store_key(secret: &str) -> Arc<StoreKey> {
    Arc::new(StoreKey::derive(secret).expect("key derivation"))
}

/// Wait for the provider to publish a session matching `pred`.
pub async fn wait_for_session(
    provider: &SessionProvider,
    pred: impl Fn(&Session) -> bool,
) -> Session {
    let mut rx = provider.watch();
    let session = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| pred(s)))
        .await
        .expect("timed out waiting for session")
        .expect("session provider stopped")
        .clone();
    session
}
