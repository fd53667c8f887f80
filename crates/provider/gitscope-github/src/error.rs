//! GitHub client error types.

use thiserror::Error;

pub type GitHubResult<T> = Result<T, GitHubError>;

#[derive(Debug, Error)]
pub enum GitHubError {
    /// The requested resource does not exist (or the token cannot see it).
    /// Distinct from [`GitHubError::RateLimited`] so callers can decide
    /// whether a retry makes sense.
    #[error("resource not found")]
    NotFound,

    /// GitHub is rate limiting this token. Never retried internally; backoff
    /// is the caller's decision.
    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider returned status {status}")]
    Upstream { status: u16 },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("content decoding failed: {0}")]
    Decode(String),

    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
}
