//! OAuth client for the authorization-code flow.

use crate::config::OAuthConfig;
use crate::error::{OAuthError, OAuthResult};
use crate::state::{AuthState, AuthStateStore};
use crate::types::{TokenEndpointResponse, TokenExchange};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Client for one provider's authorization-code flow.
///
/// Builds the consent URL (storing a fresh CSRF state first) and performs the
/// server-to-server code exchange. Stateless apart from the injected state
/// store; no retries.
#[derive(Clone)]
pub struct OAuthClient {
    http_client: Client,
    config: OAuthConfig,
    state_store: Arc<dyn AuthStateStore>,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig, state_store: Arc<dyn AuthStateStore>) -> OAuthResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            config,
            state_store,
        })
    }

    /// Build the consent-screen URL with a fresh single-use state nonce.
    ///
    /// The nonce is stored before the URL is returned, so a callback can never
    /// race the redirect. Expired states are purged opportunistically here;
    /// there is no background sweeper.
    pub async fn authorization_url(&self) -> OAuthResult<(String, String)> {
        let purged = self.state_store.purge_expired().await?;
        if purged > 0 {
            debug!("purged {} expired auth states", purged);
        }

        let state = AuthState::new(self.config.state_ttl_seconds);
        let state_param = state.state.clone();
        self.state_store.store(state).await?;

        let mut url = Url::parse(&self.config.authorization_endpoint)?;

        {
            let mut params = url.query_pairs_mut();
            params.append_pair("client_id", &self.config.client_id);
            params.append_pair("redirect_uri", &self.config.redirect_uri);
            params.append_pair("state", &state_param);

            if !self.config.scopes.is_empty() {
                params.append_pair("scope", &self.config.scopes.join(" "));
            }

            for (key, value) in &self.config.auth_params {
                params.append_pair(key, value);
            }
        }

        debug!("generated authorization URL");
        Ok((url.to_string(), state_param))
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Consumes the CSRF state first; an unknown, reused or expired state
    /// fails before any provider call. GitHub's token endpoint can answer
    /// `200 OK` with an error body, so both non-success statuses and error
    /// bodies map to [`OAuthError::ExchangeRejected`]. The error carries
    /// GitHub's machine-readable code only, never the raw body.
    pub async fn exchange_code(&self, code: &str, state: &str) -> OAuthResult<TokenExchange> {
        self.state_store.consume(state).await?;

        let mut params = HashMap::new();
        params.insert("client_id", self.config.client_id.as_str());
        params.insert("client_secret", self.config.client_secret.as_str());
        params.insert("code", code);
        params.insert("redirect_uri", self.config.redirect_uri.as_str());

        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::InvalidTokenResponse(e.to_string()))?;

        if let Some(error_code) = body.error {
            warn!(error_code = %error_code, "provider rejected token exchange");
            return Err(OAuthError::ExchangeRejected { code: error_code });
        }

        if !status.is_success() {
            warn!(status = %status, "token endpoint returned non-success status");
            return Err(OAuthError::ExchangeRejected {
                code: format!("http_{}", status.as_u16()),
            });
        }

        let Some(access_token) = body.access_token else {
            warn!("token endpoint answered success without an access token");
            return Err(OAuthError::ExchangeRejected {
                code: "missing_access_token".to_string(),
            });
        };

        // GitHub reports granted scopes comma-separated
        let scope: HashSet<String> = body
            .scope
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.trim().to_string())
            .collect();

        info!("exchanged authorization code for access token");

        Ok(TokenExchange {
            access_token,
            token_type: body.token_type.unwrap_or_else(|| "bearer".to_string()),
            scope,
        })
    }
}
