//! Common test utilities: an in-process REST backend and client configs.

use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::extract::{Path, RawQuery, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use toolbridge_mcp_rest::{RestClientConfig, TokenSource};

/// Request counters shared with the handlers.
#[derive(Clone, Default)]
pub struct BackendState {
    counted: Arc<AtomicUsize>,
    secure: Arc<AtomicUsize>,
}

/// A fake issue tracker listening on an ephemeral local port.
pub struct FakeBackend {
    /// `http://127.0.0.1:<port>`
    pub base_url: String,
    state: BackendState,
}

impl FakeBackend {
    /// Bind and serve in the background.
    pub async fn start() -> Self {
        let state = BackendState::default();
        let app = Router::new()
            .route("/headers", get(echo_headers))
            .route("/secure", get(secure))
            .route("/counted", get(counted).post(touch))
            .route("/text", get(|| async { "pong" }))
            .route("/fail", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
            .route(
                "/projects/{project}/issues",
                get(list_issues).post(create_issue),
            )
            .route("/issues/{id}", get(get_issue).delete(delete_issue))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Requests served by `GET /counted`.
    pub fn counted_hits(&self) -> usize {
        self.state.counted.load(Ordering::SeqCst)
    }

    /// Requests served by `GET /secure`.
    pub fn secure_hits(&self) -> usize {
        self.state.secure.load(Ordering::SeqCst)
    }
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "accept": get("accept"),
        "authorization": get("authorization"),
        "user_agent": get("user-agent"),
        "x_api_key": get("x-api-key"),
        "x_team": get("x-team"),
    }))
}

async fn secure(State(state): State<BackendState>, headers: HeaderMap) -> Response {
    state.secure.fetch_add(1, Ordering::SeqCst);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some("Bearer fresh") => Json(json!({"ok": true})).into_response(),
        _ => (StatusCode::UNAUTHORIZED, "token expired").into_response(),
    }
}

async fn counted(State(state): State<BackendState>) -> Json<Value> {
    let hits = state.counted.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({"hits": hits}))
}

async fn touch() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn list_issues(Path(project): Path<String>, RawQuery(query): RawQuery) -> Json<Value> {
    Json(json!({
        "data": {"project": project, "query": query},
        "meta": {"page": 1}
    }))
}

async fn create_issue(
    Path(project): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({"project": project, "created": body})),
    )
}

async fn get_issue(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Issue missing not found"})),
        )
            .into_response(),
        "crash" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!({"data": {"id": id, "title": format!("Issue {id}")}})).into_response(),
    }
}

async fn delete_issue(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// A tracker client configuration pointing at `base_url`.
pub fn tracker_config(base_url: &str) -> RestClientConfig {
    let raw = format!(
        r#"
        prefix = "tracker"
        name = "Tracker"
        base_url = "{base_url}"
        defaults = {{ project = "core" }}

        [[tools]]
        title = "List Issues"
        summary = "List issues in a project."
        path = "/projects/{{project}}/issues"
        select = "/data"
        params = [
            {{ name = "project", description = "Project key" }},
            {{ name = "limit", type = "integer", required = false, default = 20 }},
            {{ name = "label", type = "array", required = false }},
        ]

        [[tools]]
        title = "Create Issue"
        summary = "Open a new issue."
        method = "POST"
        path = "/projects/{{project}}/issues"
        params = [
            {{ name = "project", description = "Project key" }},
            {{ name = "title", description = "Issue title" }},
            {{ name = "priority", enum = ["low", "high"], required = false }},
        ]

        [[tools]]
        title = "Get Issue"
        summary = "Fetch one issue."
        path = "/issues/{{id}}"
        select = "/data"
        params = [{{ name = "id" }}]

        [[tools]]
        title = "Delete Issue"
        summary = "Delete an issue."
        method = "DELETE"
        path = "/issues/{{id}}"
        params = [{{ name = "id" }}]

        [[resources]]
        name = "issue"
        path = "{{id}}"
        endpoint = "/issues/{{id}}"
        title = "Issue"
        mime_type = "application/json"
        select = "/data"
        "#
    );
    toml::from_str(&raw).expect("tracker config parses")
}

/// Hands out `stale` until refreshed, then `fresh`.
pub struct RotatingToken {
    current: Mutex<String>,
    refreshes: AtomicUsize,
    rotates_to: &'static str,
}

impl RotatingToken {
    /// Starts stale; refreshing yields `rotates_to`.
    pub fn new(rotates_to: &'static str) -> Self {
        Self {
            current: Mutex::new("stale".to_string()),
            refreshes: AtomicUsize::new(0),
            rotates_to,
        }
    }

    /// How often `refresh` ran.
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for RotatingToken {
    async fn token(&self) -> toolbridge_mcp_rest::Result<String> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn refresh(&self) -> toolbridge_mcp_rest::Result<bool> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().unwrap() = self.rotates_to.to_string();
        Ok(true)
    }
}
