//! Invite handlers.
//!
//! Sending and listing need a GC profile. Previewing an invite by token is
//! public so the invite link can render before sign-up; accepting it needs
//! the new member's token and profile.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use sitelink_core::invites::InviteStatus;
use sitelink_core::roles::ProfileRole;
use sitelink_core::types::{DbId, Timestamp};
use sitelink_db::models::invite::Invite;
use sitelink_messaging::invites::{self, CreateInvite, InviteSender};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MutationResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub invited_name: String,
    pub invited_phone: Option<String>,
    /// Defaults to inviting a trade.
    pub invite_role: Option<ProfileRole>,
}

/// Public view of an invite. Leaves out the phone number and token.
#[derive(Debug, Serialize)]
pub struct InvitePreview {
    pub id: DbId,
    pub invited_name: String,
    pub invite_role: ProfileRole,
    pub status: InviteStatus,
    pub sent_by_company: Option<String>,
    pub created_at: Timestamp,
}

/// POST /api/v1/invites
pub async fn create_invite(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInviteRequest>,
) -> AppResult<impl IntoResponse> {
    auth.require_general_contractor()?;
    let profile = auth.profile(&state).await?;
    let sent = invites::create_invite(
        state.store(),
        InviteSender {
            user_id: auth.user_id,
            profile_id: profile.id,
        },
        CreateInvite {
            invited_name: input.invited_name,
            invited_phone: input.invited_phone,
            invite_role: input.invite_role.unwrap_or(ProfileRole::Trade),
        },
        &state.config.app_origin,
    )
    .await?;
    state.invalidate(&sent.invalidates).await;
    Ok((StatusCode::CREATED, Json(MutationResponse::from(sent))))
}

/// GET /api/v1/invites
pub async fn list_sent(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let profile = auth.profile(&state).await?;
    let sent: Vec<Invite> = invites::list_sent_invites(state.store(), profile.id).await?;
    Ok(Json(DataResponse { data: sent }))
}

/// GET /api/v1/invites/{token}
pub async fn preview(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let invite = invites::find_invite(state.store(), &token).await?;
    let sender = state.store().find_profile(invite.sent_by_profile_id).await?;
    Ok(Json(DataResponse {
        data: InvitePreview {
            id: invite.id,
            invited_name: invite.invited_name,
            invite_role: invite.invite_role,
            status: invite.status,
            sent_by_company: sender.map(|p| p.company_name),
            created_at: invite.created_at,
        },
    }))
}

/// POST /api/v1/invites/{token}/accept
pub async fn accept(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let profile = auth.profile(&state).await?;
    let accepted = invites::accept_invite(state.store(), &token, profile.id).await?;
    state.invalidate(&accepted.invalidates).await;
    tracing::info!(invite_id = accepted.value.invite.id, profile_id = profile.id, "Invite accepted");
    Ok(Json(MutationResponse::from(accepted)))
}
