#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sitelink_api::auth::jwt::{generate_access_token, JwtConfig};
use sitelink_api::config::{CompanyCamConfig, ServerConfig, StoreBackend};
use sitelink_api::router::build_app_router;
use sitelink_api::state::AppState;
use sitelink_core::roles::ProfileRole;
use sitelink_core::types::DbId;
use sitelink_db::MemoryStore;
use tower::ServiceExt;

pub const GC_USER: DbId = 100;
pub const TRADE_USER: DbId = 200;
pub const OTHER_TRADE_USER: DbId = 300;

/// Build a test `ServerConfig` backed by an unsaved memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        store: StoreBackend::Memory {
            snapshot_path: None,
        },
        companycam: CompanyCamConfig {
            api_token: None,
            base_url: sitelink_companycam::DEFAULT_BASE_URL.to_string(),
        },
        app_origin: "http://localhost:5173".to_string(),
    }
}

/// Build the full application router over a fresh memory store.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState::new(Arc::new(MemoryStore::new()), config.clone(), None);
    build_app_router(state, &config)
}

/// Mint a bearer token for `user_id` acting as `role`.
pub fn token(user_id: DbId, role: ProfileRole) -> String {
    generate_access_token(user_id, role, None, &test_config().jwt).unwrap()
}

pub fn gc_token() -> String {
    token(GC_USER, ProfileRole::GeneralContractor)
}

pub fn trade_token() -> String {
    token(TRADE_USER, ProfileRole::Trade)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, "GET", uri, token, None).await
}

pub async fn post_json(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, "POST", uri, Some(token), Some(body)).await
}

pub async fn post(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "POST", uri, Some(token), None).await
}

pub async fn put_json(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a profile for the token's user and return its id.
pub async fn onboard(app: &Router, token: &str, company_name: &str) -> DbId {
    let response = post_json(
        app,
        "/api/v1/profiles",
        token,
        serde_json::json!({
            "company_name": company_name,
            "owner_name": format!("{company_name} Owner"),
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a project owned by the GC token and return its id.
pub async fn create_project(app: &Router, token: &str, name: &str) -> DbId {
    let response = post_json(
        app,
        "/api/v1/projects",
        token,
        serde_json::json!({ "name": name }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
