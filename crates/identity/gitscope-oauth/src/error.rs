//! OAuth error types.

use thiserror::Error;

pub type OAuthResult<T> = Result<T, OAuthError>;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("state not found or expired")]
    StateNotFound,

    /// The provider refused the code-for-token exchange. Carries GitHub's
    /// machine-readable error code only (e.g. `bad_verification_code`), never
    /// the raw response body, which may echo request parameters.
    #[error("token exchange rejected by provider: {code}")]
    ExchangeRejected { code: String },

    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}
