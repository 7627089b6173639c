use axum::routing::post;
use axum::Router;

use crate::handlers::companycam;
use crate::state::AppState;

/// Routes mounted at `/integrations`.
///
/// ```text
/// POST   /companycam/sync                      -> sync_projects
/// POST   /companycam/projects/{id}/photos/sync -> sync_project_photos
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/companycam/sync",
            post(companycam::sync_projects),
        )
        .route(
            "/companycam/projects/{id}/photos/sync",
            post(companycam::sync_project_photos),
        )
}
