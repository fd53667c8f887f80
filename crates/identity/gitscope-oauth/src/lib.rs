//! GitHub OAuth authorization-code exchange.
//!
//! This crate builds the consent-screen URL (with a single-use CSRF state
//! nonce) and swaps the one-time authorization code GitHub sends back for an
//! access token. It deliberately stops there: generating a user id and storing
//! the resulting credential belongs to the server layer.

mod client;
mod config;
mod error;
mod state;
mod types;


pub use client::OAuthClient;
pub use config::OAuthConfig;
pub use error::{OAuthError, OAuthResult};
pub use state::{AuthState, AuthStateStore, InMemoryAuthStateStore};
pub use types::TokenExchange;
