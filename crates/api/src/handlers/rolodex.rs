//! Rolodex handlers: the trades a GC works with.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sitelink_core::cache::{CacheTag, Lookup};
use sitelink_core::roles::LinkSource;
use sitelink_core::types::DbId;
use sitelink_messaging::links;

use crate::error::AppResult;
use crate::handlers::remember;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MutationResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddToRolodexRequest {
    pub trade_profile_id: DbId,
}

/// GET /api/v1/rolodex
pub async fn list_rolodex(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    auth.require_general_contractor()?;
    let profile = auth.profile(&state).await?;
    let key = format!("rolodex:{}", profile.id);
    let stamp = match state.cached(&key, &[CacheTag::Rolodex(profile.id)]).await {
        Lookup::Hit(data) => return Ok(Json(DataResponse { data })),
        Lookup::Miss(stamp) => stamp,
    };
    let trades = links::get_linked_trades(state.store(), profile.id).await?;
    let data = remember(&state, key, stamp, &trades).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/rolodex
pub async fn add_to_rolodex(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AddToRolodexRequest>,
) -> AppResult<impl IntoResponse> {
    auth.require_general_contractor()?;
    let profile = auth.profile(&state).await?;
    let link = links::ensure_rolodex_link(
        state.store(),
        profile.id,
        input.trade_profile_id,
        LinkSource::Manual,
    )
    .await?;
    state.invalidate(&link.invalidates).await;
    Ok((StatusCode::CREATED, Json(MutationResponse::from(link))))
}
