//! Session credential storage for gitscope.
//!
//! Maps locally generated user ids to GitHub access credentials. The store is
//! process-wide, in-memory only: a restart loses every credential and forces
//! re-authentication. That is an accepted tradeoff for a demo-grade system and
//! a known production gap.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

pub type CredentialResult<T> = Result<T, CredentialError>;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no credential stored for user id")]
    NotFound,
}

/// A provider access credential bound to a local user id.
///
/// Created exactly once per successful OAuth exchange and immutable afterwards
/// (GitHub OAuth app tokens do not expire, so there is no refresh). The token
/// value must never reach the browser; `Debug` redacts it so it cannot leak
/// through a log line either.
#[derive(Clone)]
pub struct SessionCredential {
    pub access_token: String,
    pub token_type: String,
    pub scope: HashSet<String>,
}

impl SessionCredential {
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        scope: HashSet<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            scope,
        }
    }
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Trait for credential storage.
///
/// Injected into handlers as `Arc<dyn CredentialStore>` so tests can
/// substitute doubles.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert or overwrite the credential for a user id. Last write wins.
    async fn put(&self, user_id: &str, credential: SessionCredential) -> CredentialResult<()>;

    /// Look up the credential for a user id.
    async fn get(&self, user_id: &str) -> CredentialResult<SessionCredential>;

    /// Remove the credential for a user id. Idempotent: deleting an absent
    /// key is not an error.
    async fn delete(&self, user_id: &str) -> CredentialResult<()>;
}

/// In-memory implementation of [`CredentialStore`].
///
/// The lock guarantees a concurrent reader can never observe a partially
/// written credential for the same key.
pub struct InMemoryCredentialStore {
    credentials: Arc<RwLock<HashMap<String, SessionCredential>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            credentials: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn put(&self, user_id: &str, credential: SessionCredential) -> CredentialResult<()> {
        let mut credentials = self.credentials.write().await;
        credentials.insert(user_id.to_string(), credential);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> CredentialResult<SessionCredential> {
        let credentials = self.credentials.read().await;
        credentials
            .get(user_id)
            .cloned()
            .ok_or(CredentialError::NotFound)
    }

    async fn delete(&self, user_id: &str) -> CredentialResult<()> {
        let mut credentials = self.credentials.write().await;
        credentials.remove(user_id);
        Ok(())
    }
}
