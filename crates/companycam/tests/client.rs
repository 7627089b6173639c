//! Client tests against a local mock of the CompanyCam API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use sitelink_companycam::{CompanyCamApi, CompanyCamError, ProjectFilters, SyncProgress};

const TOKEN: &str = "test-token";

/// Number of projects the mock account holds.
const PROJECT_COUNT: usize = 110;

#[derive(Clone, Default)]
struct MockState {
    project_page_hits: Arc<AtomicUsize>,
    /// `(query, modified_since)` of the last project listing.
    last_project_filters: Arc<Mutex<Option<(Option<String>, Option<i64>)>>>,
}

#[derive(serde::Deserialize)]
struct PageParams {
    page: usize,
    per_page: usize,
}

#[derive(serde::Deserialize)]
struct ProjectParams {
    page: usize,
    per_page: usize,
    query: Option<String>,
    modified_since: Option<i64>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn list_projects(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<ProjectParams>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid token"}))).into_response();
    }
    state.project_page_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_project_filters.lock().unwrap() =
        Some((params.query.clone(), params.modified_since));
    let start = (params.page - 1) * params.per_page;
    let end = (start + params.per_page).min(PROJECT_COUNT);
    let projects: Vec<_> = (start..end)
        .map(|i| json!({"id": format!("p{i}"), "name": format!("Project {i}")}))
        .collect();
    Json(projects).into_response()
}

async fn get_project(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "limited" => StatusCode::TOO_MANY_REQUESTS.into_response(),
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Project not found"})),
        )
            .into_response(),
        _ => Json(json!({"id": id, "name": "Found"})).into_response(),
    }
}

async fn list_photos(Path(id): Path<String>, Query(params): Query<PageParams>) -> Response {
    // Two full pages then an empty one.
    let photos: Vec<_> = if params.page <= 2 {
        (0..params.per_page)
            .map(|i| json!({"id": format!("{id}-{}-{i}", params.page), "project_id": id}))
            .collect()
    } else {
        Vec::new()
    };
    Json(photos).into_response()
}

async fn spawn_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/v2/projects", get(list_projects))
        .route("/v2/projects/{id}", get(get_project))
        .route("/v2/projects/{id}/photos", get(list_photos))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v2"), state)
}

async fn client() -> (CompanyCamApi, MockState) {
    let (base_url, state) = spawn_mock().await;
    let mut api = CompanyCamApi::new(base_url);
    api.set_api_token(TOKEN);
    (api, state)
}

#[tokio::test]
async fn sync_all_projects_drains_every_page() {
    let (api, state) = client().await;
    let mut progress: Vec<SyncProgress> = Vec::new();

    let projects = api.sync_all_projects(|p| progress.push(p)).await.unwrap();

    assert_eq!(projects.len(), 110);
    assert_eq!(projects[0].id, "p0");
    assert_eq!(projects[109].id, "p109");
    assert_eq!(state.project_page_hits.load(Ordering::SeqCst), 3);
    let per_page: Vec<usize> = progress.iter().map(|p| p.page_items).collect();
    assert_eq!(per_page, vec![50, 50, 10]);
    assert_eq!(progress.last().map(|p| p.total_items), Some(110));
}

#[tokio::test]
async fn project_filters_reach_the_server() {
    let (api, state) = client().await;
    let filters = ProjectFilters {
        query: Some("Main St".to_string()),
        modified_since: Some(1_700_000_000),
    };

    let projects = api.list_projects(1, 5, &filters).await.unwrap();

    assert_eq!(projects.len(), 5);
    assert_eq!(
        *state.last_project_filters.lock().unwrap(),
        Some((Some("Main St".to_string()), Some(1_700_000_000)))
    );
}

#[tokio::test]
async fn unfiltered_listing_sends_no_filter_params() {
    let (api, state) = client().await;
    api.list_projects(1, 5, &ProjectFilters::default())
        .await
        .unwrap();
    assert_eq!(*state.last_project_filters.lock().unwrap(), Some((None, None)));
}

#[tokio::test]
async fn photo_sync_stops_on_empty_page() {
    let (api, _) = client().await;
    let mut pages = 0;
    let photos = api
        .sync_project_photos("abc", |_| pages += 1)
        .await
        .unwrap();
    assert_eq!(photos.len(), 100);
    assert_eq!(pages, 3);
    assert_eq!(photos[0].project_id.as_deref(), Some("abc"));
}

#[tokio::test]
async fn rate_limit_maps_to_its_own_variant() {
    let (api, _) = client().await;
    let err = api.get_project("limited").await.unwrap_err();
    assert_matches!(err, CompanyCamError::RateLimited);
}

#[tokio::test]
async fn api_error_carries_server_message() {
    let (api, _) = client().await;
    let err = api.get_project("missing").await.unwrap_err();
    assert_matches!(
        err,
        CompanyCamError::Api { status: 404, ref message } if message == "Project not found"
    );
}

#[tokio::test]
async fn bad_token_is_an_api_error() {
    let (base_url, _) = spawn_mock().await;
    let mut api = CompanyCamApi::new(base_url);
    api.set_api_token("wrong");
    let err = api
        .list_projects(1, 50, &ProjectFilters::default())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        CompanyCamError::Api { status: 401, ref message } if message == "Invalid token"
    );
}

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let (base_url, state) = spawn_mock().await;
    let api = CompanyCamApi::new(base_url);
    let err = api.sync_all_projects(|_| {}).await.unwrap_err();
    assert_matches!(err, CompanyCamError::MissingToken);
    assert_eq!(state.project_page_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_server_is_a_request_error() {
    let mut api = CompanyCamApi::new("http://127.0.0.1:1/v2");
    api.set_api_token(TOKEN);
    let err = api.get_company().await.unwrap_err();
    assert_matches!(err, CompanyCamError::Request(_));
}
