//! Account directory
//!
//! An in-process account directory that plays the part of the hosted identity
//! service: it authenticates logins, owns each account's role claim and
//! notifies live sessions when an account changes.
//!
//! Each account has its own event channel. [`AccountIdentitySource`] exposes
//! one account through the [`IdentitySource`] interface so a
//! [`SessionProvider`](crate::session::SessionProvider) can follow it.
//!
//! Disabling an account revokes every source created before it: the account
//! moves to a new generation with a fresh channel, and older sources report
//! no user from then on, even after the account is enabled again.

mod crypto;
mod errors;

pub use crypto::{hash_password, verify_password};
pub use errors::DirectoryError;

use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::{
    Result,
    session::{AuthEvent, Identity, IdentitySource},
};

/// Capacity of each account's event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Everything needed to create an account. Also the entry format of seed files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSpec {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, alias = "role")]
    pub role_claim: Option<String>,
}

impl AccountSpec {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: None,
            role_claim: None,
        }
    }

    pub fn with_role_claim(mut self, claim: impl Into<String>) -> Self {
        self.role_claim = Some(claim.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Public view of an account, for administration pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub identity: Identity,
    pub disabled: bool,
}

#[derive(Debug)]
struct Account {
    identity: Identity,
    password_hash: String,
    disabled: bool,
    /// Bumped on every revocation; sources from older generations see no user.
    generation: u64,
    events: broadcast::Sender<AuthEvent>,
}

impl Account {
    fn notify(&self, event: AuthEvent) {
        // No live session is listening; nothing to deliver.
        let _ = self.events.send(event);
    }

    /// Sign out current sessions and detach them from future events.
    fn revoke(&mut self) {
        self.notify(AuthEvent::SignedOut);
        self.generation += 1;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        self.events = events;
    }
}

/// In-memory account directory.
#[derive(Debug, Default)]
pub struct Directory {
    accounts: RwLock<HashMap<String, Account>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load accounts from a JSON array of [`AccountSpec`]s.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let specs: Vec<AccountSpec> =
            serde_json::from_str(&contents).map_err(|e| DirectoryError::InvalidSeed {
                reason: e.to_string(),
            })?;

        let directory = Self::new();
        for spec in specs {
            directory.create_account(spec).await?;
        }
        tracing::info!(
            "Loaded {} accounts from {}",
            directory.len().await,
            path.as_ref().display()
        );
        Ok(directory)
    }

    /// Create an account and return its identity.
    pub async fn create_account(&self, spec: AccountSpec) -> Result<Identity> {
        let email = normalize_email(&spec.email)?;
        if spec.password.is_empty() {
            return Err(DirectoryError::EmptyPassword.into());
        }
        let password_hash = hash_password(&spec.password)?;

        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.identity.email == email) {
            return Err(DirectoryError::AccountAlreadyExists { email }.into());
        }

        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            email,
            display_name: spec.display_name,
            role_claim: spec.role_claim,
        };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        accounts.insert(
            identity.id.clone(),
            Account {
                identity: identity.clone(),
                password_hash,
                disabled: false,
                generation: 0,
                events,
            },
        );

        tracing::info!(account = %identity.id, email = %identity.email, "created account");
        Ok(identity)
    }

    /// Check a login.
    ///
    /// Existing sessions are not notified; a new session resolves the account
    /// through its own initial lookup. Unknown emails and wrong passwords both fail with
    /// [`DirectoryError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Identity> {
        let email = normalize_email(email).map_err(|_| DirectoryError::InvalidCredentials)?;

        let (account_id, password_hash) = {
            let accounts = self.accounts.read().await;
            let account = accounts
                .values()
                .find(|a| a.identity.email == email)
                .ok_or(DirectoryError::InvalidCredentials)?;
            (account.identity.id.clone(), account.password_hash.clone())
        };

        verify_password(password, &password_hash)?;

        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&account_id)
            .ok_or(DirectoryError::InvalidCredentials)?;
        if account.disabled {
            return Err(DirectoryError::AccountDisabled { email }.into());
        }

        tracing::info!(account = %account_id, "login succeeded");
        Ok(account.identity.clone())
    }

    /// Look up an account by id.
    pub async fn account(&self, account_id: &str) -> Result<AccountSummary> {
        let accounts = self.accounts.read().await;
        accounts
            .get(account_id)
            .map(|a| AccountSummary {
                identity: a.identity.clone(),
                disabled: a.disabled,
            })
            .ok_or_else(|| {
                DirectoryError::AccountNotFound {
                    account_id: account_id.to_string(),
                }
                .into()
            })
    }

    /// The identity of an active account. Disabled or unknown accounts have none.
    pub async fn current_user(&self, account_id: &str) -> Option<Identity> {
        let accounts = self.accounts.read().await;
        accounts
            .get(account_id)
            .filter(|a| !a.disabled)
            .map(|a| a.identity.clone())
    }

    /// Like [`Directory::current_user`], but only for sources of `generation`.
    async fn current_user_in(&self, account_id: &str, generation: u64) -> Option<Identity> {
        let accounts = self.accounts.read().await;
        accounts
            .get(account_id)
            .filter(|a| !a.disabled && a.generation == generation)
            .map(|a| a.identity.clone())
    }

    /// Replace an account's role claim and refresh its sessions.
    pub async fn set_role_claim(&self, account_id: &str, claim: Option<&str>) -> Result<Identity> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| DirectoryError::AccountNotFound {
                account_id: account_id.to_string(),
            })?;

        account.identity.role_claim = claim.map(str::to_string);
        if !account.disabled {
            account.notify(AuthEvent::TokenRefreshed(account.identity.clone()));
        }
        tracing::info!(account = %account_id, claim = ?claim, "role claim updated");
        Ok(account.identity.clone())
    }

    /// Disable an account, signing out its sessions.
    pub async fn disable(&self, account_id: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| DirectoryError::AccountNotFound {
                account_id: account_id.to_string(),
            })?;

        account.disabled = true;
        account.revoke();
        tracing::info!(account = %account_id, "account disabled");
        Ok(())
    }

    /// Re-enable a disabled account. Its users have to sign in again.
    pub async fn enable(&self, account_id: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| DirectoryError::AccountNotFound {
                account_id: account_id.to_string(),
            })?;
        account.disabled = false;
        Ok(())
    }

    /// All accounts, sorted by email.
    pub async fn list_accounts(&self) -> Vec<AccountSummary> {
        let accounts = self.accounts.read().await;
        let mut summaries: Vec<AccountSummary> = accounts
            .values()
            .map(|a| AccountSummary {
                identity: a.identity.clone(),
                disabled: a.disabled,
            })
            .collect();
        summaries.sort_by(|a, b| a.identity.email.cmp(&b.identity.email));
        summaries
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    /// An identity source following one account.
    pub async fn identity_source(self: &Arc<Self>, account_id: &str) -> Result<AccountIdentitySource> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(account_id)
            .ok_or_else(|| DirectoryError::AccountNotFound {
                account_id: account_id.to_string(),
            })?;

        Ok(AccountIdentitySource {
            directory: Arc::clone(self),
            account_id: account_id.to_string(),
            generation: account.generation,
            events: account.events.clone(),
        })
    }
}

/// [`IdentitySource`] for a single directory account.
#[derive(Debug, Clone)]
pub struct AccountIdentitySource {
    directory: Arc<Directory>,
    account_id: String,
    generation: u64,
    events: broadcast::Sender<AuthEvent>,
}

impl AccountIdentitySource {
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

#[async_trait]
impl IdentitySource for AccountIdentitySource {
    async fn current_user(&self) -> Result<Option<Identity>> {
        Ok(self
            .directory
            .current_user_in(&self.account_id, self.generation)
            .await)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(DirectoryError::InvalidEmail { email }.into()),
    }
}
