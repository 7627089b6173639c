//! Handlers for onboarding profiles.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sitelink_core::error::CoreError;
use sitelink_core::roles::ProfileRole;
use sitelink_db::models::profile::{CreateProfile, UpdateProfile};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /profiles`. The role comes from the caller's token.
#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub company_name: String,
    pub owner_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub trade_category: Option<String>,
    #[serde(default)]
    pub trade_tags: Vec<String>,
}

fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// POST /api/v1/profiles
pub async fn create_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    require_non_blank("company_name", &input.company_name)?;
    require_non_blank("owner_name", &input.owner_name)?;
    let is_trade = auth.role == ProfileRole::Trade;

    let created = state
        .store()
        .create_profile(&CreateProfile {
            user_id: auth.user_id,
            role: auth.role,
            company_name: input.company_name.trim().to_string(),
            owner_name: input.owner_name.trim().to_string(),
            email: input.email,
            phone: input.phone,
            trade_category: input.trade_category.filter(|_| is_trade),
            trade_tags: if is_trade { input.trade_tags } else { Vec::new() },
        })
        .await?;

    tracing::info!(id = created.id, user_id = auth.user_id, role = %created.role, "Profile created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/profiles/me
pub async fn get_my_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let profile = auth.profile(&state).await?;
    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/v1/profiles/me
pub async fn update_my_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.company_name {
        require_non_blank("company_name", name)?;
    }
    if let Some(name) = &input.owner_name {
        require_non_blank("owner_name", name)?;
    }
    let profile = auth.profile(&state).await?;
    let updated = state
        .store()
        .update_profile(profile.id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", profile.id))?;
    tracing::info!(id = updated.id, "Profile updated");
    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/profiles/trades
pub async fn list_trade_profiles(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let trades = state.store().list_profiles_by_role(ProfileRole::Trade).await?;
    tracing::debug!(count = trades.len(), "Listed trade profiles");
    Ok(Json(DataResponse { data: trades }))
}
