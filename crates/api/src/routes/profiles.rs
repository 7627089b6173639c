use axum::routing::{get, post};
use axum::Router;

use crate::handlers::profiles;
use crate::state::AppState;

/// Routes mounted at `/profiles`.
///
/// ```text
/// POST   /        -> create_profile
/// GET    /me      -> get_my_profile
/// PUT    /me      -> update_my_profile
/// GET    /trades  -> list_trade_profiles
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(profiles::create_profile))
        .route(
            "/me",
            get(profiles::get_my_profile).put(profiles::update_my_profile),
        )
        .route("/trades", get(profiles::list_trade_profiles))
}
