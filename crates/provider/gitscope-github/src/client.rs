//! GitHub REST client.

use crate::error::{GitHubError, GitHubResult};
use crate::types::{DecodedFile, RepoContents, Repository, UserProfile};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_PER_PAGE: u32 = 100;

/// Client for GitHub's REST API, authenticated per call with a bearer token.
#[derive(Clone)]
pub struct GitHubClient {
    http_client: Client,
    base_url: String,
    per_page: u32,
}

impl GitHubClient {
    pub fn new() -> GitHubResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn with_timeout(timeout_seconds: u64) -> GitHubResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        // GitHub rejects requests without a User-Agent
        headers.insert(USER_AGENT, HeaderValue::from_static("gitscope"));

        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: DEFAULT_BASE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
        })
    }

    /// Point the client at a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Fetch the authenticated user's profile.
    pub async fn user(&self, access_token: &str) -> GitHubResult<UserProfile> {
        let response = self
            .http_client
            .get(format!("{}/user", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = check_status(response)?;
        let profile: UserProfile = response.json().await?;

        debug!(login = %profile.login, "fetched user profile");
        Ok(profile)
    }

    /// List every repository visible to the token, in provider order.
    ///
    /// Pages are fetched until a short page so the aggregate never truncates
    /// at GitHub's default page size.
    pub async fn repositories(&self, access_token: &str) -> GitHubResult<Vec<Repository>> {
        let mut repositories = Vec::new();
        let per_page = self.per_page.to_string();
        let mut page = 1u32;

        loop {
            let page_param = page.to_string();
            let response = self
                .http_client
                .get(format!("{}/user/repos", self.base_url))
                .bearer_auth(access_token)
                .query(&[
                    ("visibility", "all"),
                    ("sort", "updated"),
                    ("per_page", per_page.as_str()),
                    ("page", page_param.as_str()),
                ])
                .send()
                .await?;

            let response = check_status(response)?;
            let batch: Vec<Repository> = response.json().await?;
            let batch_len = batch.len();
            repositories.extend(batch);

            if batch_len < self.per_page as usize {
                break;
            }
            page += 1;
        }

        debug!(count = repositories.len(), "listed repositories");
        Ok(repositories)
    }

    /// Fetch the contents of a path: a directory listing or file metadata,
    /// whichever GitHub reports the path as.
    pub async fn contents(
        &self,
        access_token: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> GitHubResult<RepoContents> {
        let response = self
            .http_client
            .get(self.contents_url(owner, repo, path))
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = check_status(response)?;
        let contents: RepoContents = response.json().await?;
        Ok(contents)
    }

    /// Fetch a single file and decode its content out of the transport
    /// encoding.
    pub async fn file(
        &self,
        access_token: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> GitHubResult<DecodedFile> {
        let file = match self.contents(access_token, owner, repo, path).await? {
            RepoContents::File(file) => file,
            RepoContents::Directory(_) => {
                return Err(GitHubError::UnexpectedPayload(format!(
                    "path {path} is a directory, not a file"
                )));
            }
        };

        let encoded = file.content.ok_or_else(|| {
            GitHubError::UnexpectedPayload(format!("file payload for {path} carries no content"))
        })?;

        let content = match file.encoding.as_deref() {
            Some("base64") => decode_base64_text(&encoded)?,
            other => {
                warn!(encoding = ?other, path = %file.path, "unsupported content encoding");
                return Err(GitHubError::Decode(format!(
                    "unsupported content encoding {other:?}"
                )));
            }
        };

        Ok(DecodedFile {
            name: file.name,
            path: file.path,
            content,
            size: file.size,
            sha: file.sha,
        })
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> String {
        if path.is_empty() {
            format!("{}/repos/{owner}/{repo}/contents", self.base_url)
        } else {
            format!("{}/repos/{owner}/{repo}/contents/{path}", self.base_url)
        }
    }
}

/// Map GitHub's failure statuses onto the error taxonomy.
///
/// 404 and rate limiting stay distinct so callers can tell "gone" from "back
/// off". GitHub signals classic rate limiting as 403 with an exhausted
/// `x-ratelimit-remaining` header, and secondary limits as 429.
fn check_status(response: Response) -> GitHubResult<Response> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(GitHubError::NotFound);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(GitHubError::RateLimited);
    }

    if status == StatusCode::FORBIDDEN {
        let exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");
        if exhausted {
            return Err(GitHubError::RateLimited);
        }
    }

    if !status.is_success() {
        return Err(GitHubError::Upstream {
            status: status.as_u16(),
        });
    }

    Ok(response)
}

/// Decode newline-wrapped base64 into UTF-8 text.
///
/// GitHub wraps base64 content in newlines; binary files fail here the same
/// way an unknown encoding does.
fn decode_base64_text(encoded: &str) -> GitHubResult<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| GitHubError::Decode(format!("invalid base64: {e}")))?;

    String::from_utf8(bytes).map_err(|_| GitHubError::Decode("content is not UTF-8".to_string()))
}
