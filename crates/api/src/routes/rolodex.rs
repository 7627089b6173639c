use axum::routing::get;
use axum::Router;

use crate::handlers::rolodex;
use crate::state::AppState;

/// Routes mounted at `/rolodex`.
///
/// ```text
/// GET    /   -> list_rolodex
/// POST   /   -> add_to_rolodex
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(rolodex::list_rolodex).post(rolodex::add_to_rolodex),
    )
}
