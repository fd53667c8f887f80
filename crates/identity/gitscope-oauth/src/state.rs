//! CSRF state management for the authorization flow.
//!
//! Every consent-screen redirect carries a single-use `state` nonce; the
//! callback must present it back before the code is exchanged. An unknown,
//! reused or expired state fails the callback outright.

use crate::error::{OAuthError, OAuthResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// State nonce stored at flow initiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthState {
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthState {
    pub fn new(ttl_seconds: u64) -> Self {
        let state = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at + Duration::seconds(ttl_seconds as i64);

        Self {
            state,
            created_at,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Trait for CSRF state storage
#[async_trait]
pub trait AuthStateStore: Send + Sync {
    /// Store a new state
    async fn store(&self, state: AuthState) -> OAuthResult<()>;

    /// Retrieve and remove a state by its state parameter, rejecting expired
    /// entries
    async fn consume(&self, state: &str) -> OAuthResult<AuthState>;

    /// Clean up expired states
    async fn purge_expired(&self) -> OAuthResult<usize>;
}

/// In-memory implementation of [`AuthStateStore`]
pub struct InMemoryAuthStateStore {
    states: Arc<RwLock<HashMap<String, AuthState>>>,
}

impl InMemoryAuthStateStore {
    pub fn new() -> Self {
        Self {
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryAuthStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthStateStore for InMemoryAuthStateStore {
    async fn store(&self, state: AuthState) -> OAuthResult<()> {
        let mut states = self.states.write().await;
        states.insert(state.state.clone(), state);
        Ok(())
    }

    async fn consume(&self, state: &str) -> OAuthResult<AuthState> {
        let mut states = self.states.write().await;

        // Remove and return; a second consume of the same nonce fails
        let auth_state = states.remove(state).ok_or(OAuthError::StateNotFound)?;

        if auth_state.is_expired() {
            return Err(OAuthError::StateNotFound);
        }

        Ok(auth_state)
    }

    async fn purge_expired(&self) -> OAuthResult<usize> {
        let mut states = self.states.write().await;
        let now = Utc::now();

        let expired_keys: Vec<String> = states
            .iter()
            .filter(|(_, state)| now > state.expires_at)
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            states.remove(&key);
        }

        Ok(count)
    }
}
