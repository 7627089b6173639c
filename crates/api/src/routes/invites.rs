use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invites;
use crate::state::AppState;

/// Routes mounted at `/invites`.
///
/// ```text
/// GET    /                  -> list_sent
/// POST   /                  -> create_invite
/// GET    /{token}           -> preview (no auth)
/// POST   /{token}/accept    -> accept
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(invites::list_sent).post(invites::create_invite))
        .route("/{token}", get(invites::preview))
        .route("/{token}/accept", post(invites::accept))
}
