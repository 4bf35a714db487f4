//! `ApiClient` against the fake backend.

use crate::common::{FakeBackend, RotatingToken};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use toolbridge_mcp_rest::{ApiClient, Auth, HttpMethod, RestError, USER_AGENT};

async fn headers_seen(backend: &FakeBackend, auth: Auth) -> Value {
    ApiClient::new(&backend.base_url, auth)
        .unwrap()
        .get("/headers")
        .await
        .unwrap()
}

#[tokio::test]
async fn test_auth_header_shapes() {
    let backend = FakeBackend::start().await;

    let seen = headers_seen(&backend, Auth::bearer("b1")).await;
    assert_eq!(seen["authorization"], "Bearer b1");

    let seen = headers_seen(&backend, Auth::token("t1")).await;
    assert_eq!(seen["authorization"], "token t1");

    let seen = headers_seen(&backend, Auth::basic("user", "pass")).await;
    assert_eq!(seen["authorization"], "Basic dXNlcjpwYXNz");

    let seen = headers_seen(&backend, Auth::api_key("X-API-Key", "k1")).await;
    assert_eq!(seen["x_api_key"], "k1");
    assert_eq!(seen["authorization"], Value::Null);
}

#[tokio::test]
async fn test_standard_and_extra_headers() {
    let backend = FakeBackend::start().await;
    let api = ApiClient::new(&backend.base_url, Auth::None)
        .unwrap()
        .with_header("X-Team", "platform")
        .unwrap();

    let seen = api.get("/headers").await.unwrap();
    assert_eq!(seen["accept"], "application/json");
    assert_eq!(seen["user_agent"], USER_AGENT);
    assert_eq!(seen["x_team"], "platform");
}

#[tokio::test]
async fn test_unauthorized_refreshes_once_and_retries() {
    let backend = FakeBackend::start().await;
    let token = Arc::new(RotatingToken::new("fresh"));
    let api = ApiClient::new(&backend.base_url, Auth::Bearer(token.clone())).unwrap();

    let value = api.get("/secure").await.unwrap();
    assert_eq!(value, json!({"ok": true}));
    assert_eq!(token.refreshes(), 1);
    assert_eq!(backend.secure_hits(), 2);
}

#[tokio::test]
async fn test_second_unauthorized_is_returned() {
    let backend = FakeBackend::start().await;
    let token = Arc::new(RotatingToken::new("still-stale"));
    let api = ApiClient::new(&backend.base_url, Auth::Bearer(token.clone())).unwrap();

    let err = api.get("/secure").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(token.refreshes(), 1);
    assert_eq!(backend.secure_hits(), 2);
}

#[tokio::test]
async fn test_static_token_is_not_retried() {
    let backend = FakeBackend::start().await;
    let api = ApiClient::new(&backend.base_url, Auth::bearer("stale")).unwrap();

    let err = api.get("/secure").await.unwrap_err();
    assert!(matches!(err, RestError::Status { status: 401, ref body } if body == "token expired"));
    assert_eq!(backend.secure_hits(), 1);
}

#[tokio::test]
async fn test_body_decoding() {
    let backend = FakeBackend::start().await;
    let api = ApiClient::new(&backend.base_url, Auth::None).unwrap();

    assert_eq!(api.get("/text").await.unwrap(), json!("pong"));
    let deleted = api
        .call(HttpMethod::Delete, "/issues/7", &[], None)
        .await
        .unwrap();
    assert_eq!(deleted, Value::Null);
}

#[tokio::test]
async fn test_error_status_keeps_body() {
    let backend = FakeBackend::start().await;
    let api = ApiClient::new(&backend.base_url, Auth::None).unwrap();

    let err = api.get("/fail").await.unwrap_err();
    assert!(matches!(err, RestError::Status { status: 500, ref body } if body == "boom"));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_query_and_json_body() {
    let backend = FakeBackend::start().await;
    let api = ApiClient::new(&backend.base_url, Auth::None).unwrap();

    let listed = api
        .call(
            HttpMethod::Get,
            "/projects/core/issues",
            &[("state".to_string(), "open now".to_string())],
            None,
        )
        .await
        .unwrap();
    assert_eq!(listed["data"]["query"], "state=open+now");

    let created = api
        .call(
            HttpMethod::Post,
            "/projects/core/issues",
            &[],
            Some(&json!({"title": "Broken"})),
        )
        .await
        .unwrap();
    assert_eq!(created["created"], json!({"title": "Broken"}));
}

#[tokio::test]
async fn test_get_cache_and_write_invalidation() {
    let backend = FakeBackend::start().await;
    let api = ApiClient::new(&backend.base_url, Auth::None)
        .unwrap()
        .with_cache_ttl(Duration::from_secs(300));

    assert_eq!(api.get("/counted").await.unwrap()["hits"], 1);
    assert_eq!(api.get("/counted").await.unwrap()["hits"], 1);
    assert_eq!(backend.counted_hits(), 1);

    api.call(HttpMethod::Post, "/counted", &[], Some(&json!({})))
        .await
        .unwrap();
    assert_eq!(api.get("/counted").await.unwrap()["hits"], 2);
    assert_eq!(backend.counted_hits(), 2);
}

#[tokio::test]
async fn test_uncached_client_always_fetches() {
    let backend = FakeBackend::start().await;
    let api = ApiClient::new(&backend.base_url, Auth::None).unwrap();

    api.get("/counted").await.unwrap();
    api.get("/counted").await.unwrap();
    assert_eq!(backend.counted_hits(), 2);
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let api = ApiClient::new("http://127.0.0.1:1", Auth::None).unwrap();
    let err = api.get("/anything").await.unwrap_err();
    assert!(matches!(err, RestError::Http(_)));
    assert_eq!(err.status(), None);
}
