//! Route definitions for the `/threads` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::threads;
use crate::state::AppState;

/// Routes mounted at `/threads`.
///
/// ```text
/// GET    /direct              -> list_direct (?include_archived)
/// POST   /direct              -> create_direct
/// GET    /mine                -> list_mine (?include_archived)
/// GET    /{id}/messages       -> list_messages
/// POST   /{id}/messages       -> send_message
/// POST   /{id}/read           -> mark_read
/// POST   /{id}/pin            -> toggle_pin
/// POST   /{id}/archive        -> toggle_archive
/// POST   /{id}/move           -> move_to_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/direct",
            get(threads::list_direct).post(threads::create_direct),
        )
        .route("/mine", get(threads::list_mine))
        .route(
            "/{id}/messages",
            get(threads::list_messages).post(threads::send_message),
        )
        .route("/{id}/read", post(threads::mark_read))
        .route("/{id}/pin", post(threads::toggle_pin))
        .route("/{id}/archive", post(threads::toggle_archive))
        .route("/{id}/move", post(threads::move_to_project))
}
