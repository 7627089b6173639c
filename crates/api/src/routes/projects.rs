//! Route definitions for the `/projects` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                    -> list_projects
/// POST   /                    -> create_project
/// GET    /{id}                -> get_project
/// PUT    /{id}/attachments    -> update_attachments
/// GET    /{id}/threads        -> list_project_threads
/// GET    /{id}/trades         -> list_project_trades
/// POST   /{id}/trades         -> add_trade
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/{id}", get(projects::get_project))
        .route("/{id}/attachments", put(projects::update_attachments))
        .route("/{id}/threads", get(projects::list_project_threads))
        .route(
            "/{id}/trades",
            get(projects::list_project_trades).post(projects::add_trade),
        )
}
