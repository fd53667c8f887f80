use anyhow::{Context, Result};
use axum::http::HeaderValue;
use gitscope_credentials::InMemoryCredentialStore;
use gitscope_github::GitHubClient;
use gitscope_oauth::{InMemoryAuthStateStore, OAuthClient, OAuthConfig};
use gitscope_server::{AppConfig, AppState, router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().context("loading configuration")?;

    let oauth_config = OAuthConfig::github(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.redirect_uri.clone(),
    );
    let oauth = OAuthClient::new(oauth_config, Arc::new(InMemoryAuthStateStore::new()))
        .context("building OAuth client")?;
    let github = GitHubClient::new().context("building GitHub client")?;

    let state = AppState {
        credentials: Arc::new(InMemoryCredentialStore::new()),
        oauth: Arc::new(oauth),
        github: Arc::new(github),
        frontend_url: config.frontend_url.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_url
                .parse::<HeaderValue>()
                .context("FRONTEND_URL is not a valid origin")?,
        )
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let addr = config.bind_addr()?;
    info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}
