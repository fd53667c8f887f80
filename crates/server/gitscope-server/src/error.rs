//! Error-to-response mapping for the HTTP boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gitscope_credentials::CredentialError;
use gitscope_github::GitHubError;
use gitscope_oauth::OAuthError;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),
}

impl ApiError {
    /// HTTP status, machine-readable kind and a safe client message.
    ///
    /// Messages never carry a token value or a raw provider body; the OAuth
    /// exchange error exposes GitHub's machine-readable code only.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "bad_request", message.clone())
            }
            ApiError::Credential(CredentialError::NotFound) => (
                StatusCode::NOT_FOUND,
                "not_found",
                "unknown user id".to_string(),
            ),
            ApiError::OAuth(OAuthError::StateNotFound) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "unknown, expired or already used state".to_string(),
            ),
            ApiError::OAuth(OAuthError::ExchangeRejected { code }) => (
                StatusCode::BAD_GATEWAY,
                "exchange_failed",
                format!("provider rejected the token exchange ({code})"),
            ),
            ApiError::OAuth(_) => (
                StatusCode::BAD_GATEWAY,
                "upstream",
                "provider call failed".to_string(),
            ),
            ApiError::GitHub(GitHubError::NotFound) => (
                StatusCode::NOT_FOUND,
                "not_found",
                "resource not found".to_string(),
            ),
            ApiError::GitHub(GitHubError::RateLimited) => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "provider rate limit exceeded".to_string(),
            ),
            ApiError::GitHub(GitHubError::Upstream { status }) => (
                StatusCode::BAD_GATEWAY,
                "upstream",
                format!("provider returned status {status}"),
            ),
            ApiError::GitHub(GitHubError::Request(_)) => (
                StatusCode::BAD_GATEWAY,
                "upstream",
                "provider call failed".to_string(),
            ),
            ApiError::GitHub(GitHubError::Decode(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "decode_failed",
                "failed to decode file content".to_string(),
            ),
            ApiError::GitHub(GitHubError::UnexpectedPayload(message)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "unexpected_payload",
                message.clone(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();

        warn!(status = %status, kind, "request failed: {}", self);

        let body = Json(serde_json::json!({
            "error": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_distinguishable() {
        let error = ApiError::GitHub(GitHubError::RateLimited);
        let (status, kind, _) = error.parts();
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(kind, "rate_limited");
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let error = ApiError::Credential(CredentialError::NotFound);
        let (status, kind, _) = error.parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(kind, "not_found");
    }

    #[test]
    fn test_exchange_rejection_carries_code_only() {
        let error = ApiError::OAuth(OAuthError::ExchangeRejected {
            code: "bad_verification_code".to_string(),
        });
        let (status, _, message) = error.parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message.contains("bad_verification_code"));
    }
}
