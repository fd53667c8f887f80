//! Environment configuration.

use anyhow::{Context, Result};
use url::Url;

/// Startup configuration, read once from the environment.
///
/// Every variable is required: a missing value is a fatal configuration error
/// at startup, never a runtime one.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub frontend_url: String,
    pub backend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: std::env::var("CLIENT_ID")
                .context("CLIENT_ID environment variable is required")?,
            client_secret: std::env::var("CLIENT_SECRET")
                .context("CLIENT_SECRET environment variable is required")?,
            redirect_uri: std::env::var("REDIRECT_URI")
                .context("REDIRECT_URI environment variable is required")?,
            frontend_url: std::env::var("FRONTEND_URL")
                .context("FRONTEND_URL environment variable is required")?
                .trim_end_matches('/')
                .to_string(),
            backend_url: std::env::var("BACKEND_URL")
                .context("BACKEND_URL environment variable is required")?,
        })
    }

    /// Bind address derived from `BACKEND_URL`'s host and port.
    pub fn bind_addr(&self) -> Result<String> {
        let url = Url::parse(&self.backend_url).context("BACKEND_URL is not a valid URL")?;
        let host = url
            .host_str()
            .context("BACKEND_URL is missing a host")?
            .to_string();
        let port = url
            .port_or_known_default()
            .context("BACKEND_URL is missing a port")?;
        Ok(format!("{host}:{port}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr_from_backend_url() {
        let config = AppConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:8000/auth/github/callback".into(),
            frontend_url: "http://localhost:8501".into(),
            backend_url: "http://0.0.0.0:8000".into(),
        };

        assert_eq!(config.bind_addr().unwrap(), "0.0.0.0:8000");
    }

    #[test]
    fn test_bind_addr_uses_scheme_default_port() {
        let config = AppConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            redirect_uri: "https://scope.example.com/auth/github/callback".into(),
            frontend_url: "https://app.example.com".into(),
            backend_url: "https://scope.example.com".into(),
        };

        assert_eq!(config.bind_addr().unwrap(), "scope.example.com:443");
    }
}
