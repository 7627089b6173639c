//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sitelink_core::error::CoreError;
use sitelink_core::roles::{Party, ProfileRole};
use sitelink_core::types::DbId;
use sitelink_db::models::profile::Profile;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated caller extracted from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: ProfileRole,
    /// From the token; resolved from the store when absent.
    pub profile_id: Option<DbId>,
}

impl AuthUser {
    pub fn party(&self) -> Party {
        self.role.party()
    }

    pub fn is_general_contractor(&self) -> bool {
        self.role == ProfileRole::GeneralContractor
    }

    /// Fail with 403 unless the caller is a general contractor.
    pub fn require_general_contractor(&self) -> AppResult<()> {
        if self.is_general_contractor() {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Only general contractors can do this".into()).into())
        }
    }

    /// Fail with 403 unless the caller is a trade.
    pub fn require_trade(&self) -> AppResult<()> {
        if self.role == ProfileRole::Trade {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Only trades can do this".into()).into())
        }
    }

    /// The caller's profile. 403 if onboarding has not created one yet.
    pub async fn profile(&self, state: &AppState) -> AppResult<Profile> {
        let profile = match self.profile_id {
            Some(id) => state.store().find_profile(id).await?,
            None => state.store().find_profile_by_user(self.user_id).await?,
        };
        match profile {
            Some(profile) if profile.user_id == self.user_id => Ok(profile),
            _ => Err(CoreError::Forbidden("Create a profile first".into()).into()),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            profile_id: claims.profile_id,
        })
    }
}
