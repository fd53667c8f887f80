//! OAuth provider configuration.

use std::collections::HashMap;

const GITHUB_AUTHORIZATION_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";

/// Configuration for the authorization-code flow against one provider.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Additional parameters to include in the authorization request
    pub auth_params: HashMap<String, String>,
    pub state_ttl_seconds: u64,
    pub http_timeout_seconds: u64,
}

impl OAuthConfig {
    /// GitHub configuration with the real endpoints, `repo` + `user` scopes
    /// and `allow_signup=true`.
    pub fn github(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorization_endpoint: GITHUB_AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: GITHUB_TOKEN_ENDPOINT.to_string(),
            redirect_uri: redirect_uri.into(),
            scopes: vec!["repo".to_string(), "user".to_string()],
            auth_params: {
                let mut params = HashMap::new();
                params.insert("allow_signup".to_string(), "true".to_string());
                params
            },
            state_ttl_seconds: 600, // 10 minutes
            http_timeout_seconds: 30,
        }
    }

    /// Override both endpoints, pointing the client at a mock server.
    pub fn with_endpoints(
        mut self,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
    ) -> Self {
        self.authorization_endpoint = authorization_endpoint.into();
        self.token_endpoint = token_endpoint.into();
        self
    }

    pub fn with_state_ttl(mut self, seconds: u64) -> Self {
        self.state_ttl_seconds = seconds;
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }
}
