//! Request handlers.
//!
//! Each proxy handler is a short linear pipeline: look up the credential,
//! call GitHub, return the reshaped answer. Failures map to responses in
//! [`crate::error`].

use crate::{ApiError, AppState};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use gitscope_credentials::SessionCredential;
use gitscope_github::{DecodedFile, RepoContents, Repository, UserProfile};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Begin the OAuth flow: redirect the browser to GitHub's consent screen.
pub async fn begin_auth(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let (auth_url, _) = state.oauth.authorization_url().await?;
    Ok(Redirect::temporary(&auth_url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Complete the OAuth flow: exchange the code, mint a user id, store the
/// credential and send the browser back to the frontend.
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    if let Some(error) = query.error {
        warn!(error_code = %error, "provider reported a callback error");
        return Err(ApiError::BadRequest(format!(
            "provider denied authorization ({error})"
        )));
    }

    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("missing code parameter".to_string()))?;
    let state_param = query
        .state
        .ok_or_else(|| ApiError::BadRequest("missing state parameter".to_string()))?;

    let exchange = state.oauth.exchange_code(&code, &state_param).await?;

    let user_id = Uuid::new_v4().to_string();
    state
        .credentials
        .put(
            &user_id,
            SessionCredential::new(exchange.access_token, exchange.token_type, exchange.scope),
        )
        .await?;

    info!(user_id = %user_id, "completed OAuth exchange");

    Ok(Redirect::temporary(&format!(
        "{}/?user_id={}",
        state.frontend_url, user_id
    )))
}

/// Explicit logout: drop the stored credential. Idempotent.
pub async fn logout(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.credentials.delete(&user_id).await?;
    info!(user_id = %user_id, "logged out");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_info(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let credential = state.credentials.get(&user_id).await?;
    let profile = state.github.user(&credential.access_token).await?;
    Ok(Json(profile))
}

pub async fn user_repos(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Repository>>, ApiError> {
    let credential = state.credentials.get(&user_id).await?;
    let repositories = state.github.repositories(&credential.access_token).await?;
    Ok(Json(repositories))
}

#[derive(Debug, Deserialize)]
pub struct ContentsQuery {
    path: Option<String>,
}

pub async fn repo_contents(
    State(state): State<AppState>,
    Path((user_id, owner, repo)): Path<(String, String, String)>,
    Query(query): Query<ContentsQuery>,
) -> Result<Json<RepoContents>, ApiError> {
    let credential = state.credentials.get(&user_id).await?;
    let path = query.path.unwrap_or_default();
    let contents = state
        .github
        .contents(&credential.access_token, &owner, &repo, &path)
        .await?;
    Ok(Json(contents))
}

pub async fn repo_file(
    State(state): State<AppState>,
    Path((user_id, owner, repo)): Path<(String, String, String)>,
    Query(query): Query<ContentsQuery>,
) -> Result<Json<DecodedFile>, ApiError> {
    let credential = state.credentials.get(&user_id).await?;
    let path = query
        .path
        .ok_or_else(|| ApiError::BadRequest("missing path parameter".to_string()))?;
    let file = state
        .github
        .file(&credential.access_token, &owner, &repo, &path)
        .await?;
    Ok(Json(file))
}
