//! HTTP surface for gitscope.
//!
//! Wires the credential store, the OAuth exchange and the GitHub client into
//! an axum router. Every `/user/...` handler looks the credential up first,
//! so an unknown user id fails before any provider call is attempted.

use axum::Router;
use axum::routing::{delete, get};
use gitscope_credentials::CredentialStore;
use gitscope_github::GitHubClient;
use gitscope_oauth::OAuthClient;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;

pub use config::AppConfig;
pub use error::ApiError;

/// Application state shared across handlers.
///
/// The credential store is injected as a trait object so tests can substitute
/// doubles; nothing lives in module-level globals.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub oauth: Arc<OAuthClient>,
    pub github: Arc<GitHubClient>,
    pub frontend_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/github", get(handlers::begin_auth))
        .route("/auth/github/callback", get(handlers::auth_callback))
        .route("/user/{user_id}", delete(handlers::logout))
        .route("/user/{user_id}/info", get(handlers::user_info))
        .route("/user/{user_id}/repos", get(handlers::user_repos))
        .route(
            "/user/{user_id}/repo/{owner}/{repo}/contents",
            get(handlers::repo_contents),
        )
        .route(
            "/user/{user_id}/repo/{owner}/{repo}/file",
            get(handlers::repo_file),
        )
        .with_state(state)
}
