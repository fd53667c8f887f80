//! End-to-end tests for the HTTP surface against a mocked GitHub.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use gitscope_credentials::{CredentialStore, InMemoryCredentialStore, SessionCredential};
use gitscope_github::GitHubClient;
use gitscope_oauth::{InMemoryAuthStateStore, OAuthClient, OAuthConfig};
use gitscope_server::{AppState, router};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{any, header as header_match, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FRONTEND_URL: &str = "http://localhost:8501";
const TOKEN: &str = "gho_mocktoken";

struct Harness {
    server: MockServer,
    app: Router,
    credentials: Arc<InMemoryCredentialStore>,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;

    let oauth_config = OAuthConfig::github(
        "mock_client_id",
        "mock_secret",
        "http://localhost:8000/auth/github/callback",
    )
    .with_endpoints(
        format!("{}/login/oauth/authorize", server.uri()),
        format!("{}/login/oauth/access_token", server.uri()),
    );
    let oauth = OAuthClient::new(oauth_config, Arc::new(InMemoryAuthStateStore::new())).unwrap();

    let github = GitHubClient::new()
        .unwrap()
        .with_base_url(server.uri())
        .with_per_page(2);

    let credentials = Arc::new(InMemoryCredentialStore::new());

    let state = AppState {
        credentials: credentials.clone(),
        oauth: Arc::new(oauth),
        github: Arc::new(github),
        frontend_url: FRONTEND_URL.to_string(),
    };

    Harness {
        server,
        app: router(state),
        credentials,
    }
}

impl Harness {
    async fn get(&self, uri: &str) -> axum::response::Response {
        self.app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn delete(&self, uri: &str) -> axum::response::Response {
        self.app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn seed_credential(&self, user_id: &str) {
        self.credentials
            .put(
                user_id,
                SessionCredential::new(TOKEN, "bearer", HashSet::from(["repo".to_string()])),
            )
            .await
            .unwrap();
    }
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn repo_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "full_name": format!("octocat/{name}"),
        "owner": {"login": "octocat"},
        "private": false,
        "language": "Python",
        "stargazers_count": 3,
        "updated_at": "2024-05-01T12:00:00Z"
    })
}

#[tokio::test]
async fn test_health() {
    let h = harness().await;

    let response = h.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_full_oauth_flow_then_profile() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": TOKEN,
            "token_type": "bearer",
            "scope": "repo,user"
        })))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header_match("authorization", format!("Bearer {TOKEN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 583231,
            "login": "octocat",
            "name": "The Octocat",
            "avatar_url": null,
            "html_url": "https://github.com/octocat"
        })))
        .mount(&h.server)
        .await;

    // Begin the flow: the redirect to the consent screen carries the state
    let response = h.get("/auth/github").await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let consent_url = Url::parse(&location(&response)).unwrap();
    let state_param = consent_url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .unwrap();

    // Complete the flow: callback redirects to the frontend with a user id
    let response = h
        .get(&format!(
            "/auth/github/callback?code=mock_code&state={state_param}"
        ))
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let target = Url::parse(&location(&response)).unwrap();
    assert!(location(&response).starts_with(FRONTEND_URL));
    let user_id = target
        .query_pairs()
        .find(|(k, _)| k == "user_id")
        .map(|(_, v)| v.to_string())
        .unwrap();

    // The stored credential now backs the proxy
    let response = h.get(&format!("/user/{user_id}/info")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["login"], "octocat");
    assert_eq!(body["id"], 583231);
}

#[tokio::test]
async fn test_callback_missing_code_is_bad_request() {
    let h = harness().await;

    let response = h.get("/auth/github/callback?state=whatever").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_unknown_state_is_bad_request_without_exchange() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let response = h
        .get("/auth/github/callback?code=mock_code&state=never-issued")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_exchange_error_body_is_bad_gateway() {
    // GitHub quirk: 200 OK carrying an error body
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        })))
        .mount(&h.server)
        .await;

    let response = h.get("/auth/github").await;
    let consent_url = Url::parse(&location(&response)).unwrap();
    let state_param = consent_url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .unwrap();

    let response = h
        .get(&format!(
            "/auth/github/callback?code=stale&state={state_param}"
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // The provider's raw description must not leak through
    let body = body_json(response).await;
    assert_eq!(body["error"], "exchange_failed");
    assert!(
        !body["message"]
            .as_str()
            .unwrap()
            .contains("incorrect or expired")
    );
}

#[tokio::test]
async fn test_unknown_user_id_fails_without_provider_calls() {
    let h = harness().await;

    // No request of any kind may reach the mocked provider
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&h.server)
        .await;

    for uri in [
        "/user/ghost/info",
        "/user/ghost/repos",
        "/user/ghost/repo/octocat/demo/contents?path=src",
        "/user/ghost/repo/octocat/demo/file?path=README.md",
    ] {
        let response = h.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri: {uri}");

        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
    }
}

#[tokio::test]
async fn test_repos_aggregate_pagination() {
    let h = harness().await;
    h.seed_credential("user-1").await;

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([repo_json("one"), repo_json("two")])),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([repo_json("three"), repo_json("four")])),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([repo_json("five"), repo_json("six")])),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&h.server)
        .await;

    let response = h.get("/user/user-1/repos").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["one", "two", "three", "four", "five", "six"]);
}

#[tokio::test]
async fn test_contents_directory_and_file() {
    let h = harness().await;
    h.seed_credential("user-1").await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo/contents/src/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "main.py", "path": "src/main.py", "sha": "a1", "size": 42, "type": "file"}
        ])))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo/contents/src/main.py"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "main.py",
            "path": "src/main.py",
            "sha": "a1",
            "size": 12,
            "type": "file",
            "content": "cHJpbnQoImhpIik=\n",
            "encoding": "base64"
        })))
        .mount(&h.server)
        .await;

    let response = h
        .get("/user/user-1/repo/octocat/demo/contents?path=src/")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.is_array());
    assert_eq!(body[0]["name"], "main.py");

    let response = h
        .get("/user/user-1/repo/octocat/demo/contents?path=src/main.py")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.is_object());
    assert_eq!(body["encoding"], "base64");
}

#[tokio::test]
async fn test_file_returns_decoded_content() {
    let h = harness().await;
    h.seed_credential("user-1").await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo/contents/README.md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "README.md",
            "path": "README.md",
            "sha": "c3",
            "size": 11,
            "type": "file",
            "content": "aGVsbG8g\nd29ybGQ=\n",
            "encoding": "base64"
        })))
        .mount(&h.server)
        .await;

    let response = h
        .get("/user/user-1/repo/octocat/demo/file?path=README.md")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["content"], "hello world");
    assert_eq!(body["size"], 11);
    assert_eq!(body["sha"], "c3");
}

#[tokio::test]
async fn test_file_missing_path_is_bad_request() {
    let h = harness().await;
    h.seed_credential("user-1").await;

    let response = h.get("/user/user-1/repo/octocat/demo/file").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_file_decode_failure_is_internal_error() {
    let h = harness().await;
    h.seed_credential("user-1").await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo/contents/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "logo.png",
            "path": "logo.png",
            "sha": "e5",
            "size": 2,
            "type": "file",
            "content": "//4=",
            "encoding": "base64"
        })))
        .mount(&h.server)
        .await;

    let response = h
        .get("/user/user-1/repo/octocat/demo/file?path=logo.png")
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "decode_failed");
}

#[tokio::test]
async fn test_missing_provider_path_is_not_found() {
    let h = harness().await;
    h.seed_credential("user-1").await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo/contents/gone.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.server)
        .await;

    let response = h
        .get("/user/user-1/repo/octocat/demo/contents?path=gone.txt")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rate_limit_passes_through_as_429() {
    let h = harness().await;
    h.seed_credential("user-1").await;

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&h.server)
        .await;

    let response = h.get("/user/user-1/repos").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = body_json(response).await;
    assert_eq!(body["error"], "rate_limited");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let h = harness().await;
    h.seed_credential("user-1").await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let response = h.get("/user/user-1/info").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let h = harness().await;
    h.seed_credential("user-1").await;

    let response = h.delete("/user/user-1").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Second delete of the same id still succeeds
    let response = h.delete("/user/user-1").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The credential is gone
    let response = h.get("/user/user-1/info").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
