//! Thread and message handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sitelink_core::cache::{CacheTag, Lookup};
use sitelink_core::error::CoreError;
use sitelink_core::roles::Party;
use sitelink_core::types::DbId;
use sitelink_db::models::thread::ProjectThread;
use sitelink_messaging::threads::{self, MoveThread, SendMessage};

use crate::error::{AppError, AppResult};
use crate::handlers::{remember, ListThreadsParams};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MutationResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDirectThreadRequest {
    pub trade_profile_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveThreadRequest {
    pub project_id: DbId,
    /// Defaults to the thread's own trade.
    pub trade_profile_id: Option<DbId>,
}

/// Load a thread and the side the caller speaks for. 403 for outsiders.
async fn thread_party(
    state: &AppState,
    auth: &AuthUser,
    thread_id: DbId,
) -> AppResult<(ProjectThread, Party)> {
    let thread = state
        .store()
        .find_thread(thread_id)
        .await?
        .ok_or_else(|| CoreError::not_found("ProjectThread", thread_id))?;
    let profile_id = if auth.is_general_contractor() {
        None
    } else {
        Some(auth.profile(state).await?.id)
    };
    match threads::participant_party(state.store(), &thread, auth.user_id, profile_id).await? {
        Some(party) => Ok((thread, party)),
        None => Err(CoreError::Forbidden(format!(
            "You are not a participant of thread {thread_id}"
        ))
        .into()),
    }
}

async fn gc_thread(state: &AppState, auth: &AuthUser, thread_id: DbId) -> AppResult<ProjectThread> {
    match thread_party(state, auth, thread_id).await? {
        (thread, Party::Gc) => Ok(thread),
        _ => Err(CoreError::Forbidden("Only the thread's GC can do this".into()).into()),
    }
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// GET /api/v1/threads/direct
pub async fn list_direct(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListThreadsParams>,
) -> AppResult<impl IntoResponse> {
    auth.require_general_contractor()?;
    let key = format!("direct_threads:{}:{}", auth.user_id, params.include_archived);
    let stamp = match state.cached(&key, &[CacheTag::DirectThreads(auth.user_id)]).await {
        Lookup::Hit(data) => return Ok(Json(DataResponse { data })),
        Lookup::Miss(stamp) => stamp,
    };
    let list =
        threads::list_direct_threads(state.store(), auth.user_id, params.include_archived).await?;
    let data = remember(&state, key, stamp, &list).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/threads/mine
///
/// Every project and direct thread of the calling trade.
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListThreadsParams>,
) -> AppResult<impl IntoResponse> {
    auth.require_trade()?;
    let profile = auth.profile(&state).await?;
    let key = format!("trade_threads:{}:{}", profile.id, params.include_archived);
    let stamp = match state.cached(&key, &[CacheTag::TradeThreads(profile.id)]).await {
        Lookup::Hit(data) => return Ok(Json(DataResponse { data })),
        Lookup::Miss(stamp) => stamp,
    };
    let list =
        threads::list_threads_for_trade(state.store(), profile.id, params.include_archived)
            .await?;
    let data = remember(&state, key, stamp, &list).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/threads/direct
pub async fn create_direct(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDirectThreadRequest>,
) -> AppResult<impl IntoResponse> {
    auth.require_general_contractor()?;
    let created =
        threads::find_or_create_direct_thread(state.store(), auth.user_id, input.trade_profile_id)
            .await?;
    state.invalidate(&created.invalidates).await;
    Ok(Json(MutationResponse::from(created)))
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// GET /api/v1/threads/{id}/messages
pub async fn list_messages(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    thread_party(&state, &auth, id).await?;
    let key = format!("messages:{id}");
    let stamp = match state.cached(&key, &[CacheTag::Messages(id)]).await {
        Lookup::Hit(data) => return Ok(Json(DataResponse { data })),
        Lookup::Miss(stamp) => stamp,
    };
    let messages = threads::list_messages(state.store(), id).await?;
    let data = remember(&state, key, stamp, &messages).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/threads/{id}/messages
///
/// The sender's side is derived from the caller, never from the body.
pub async fn send_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SendMessageRequest>,
) -> AppResult<impl IntoResponse> {
    let (_, party) = thread_party(&state, &auth, id).await?;
    let sent = threads::send_message(
        state.store(),
        SendMessage {
            thread_id: id,
            sender_role: party,
            sender_id: auth.user_id,
            body: input.body,
        },
    )
    .await?;
    state.invalidate(&sent.invalidates).await;
    tracing::info!(thread_id = id, message_id = sent.value.id, %party, "Message sent");
    Ok((StatusCode::CREATED, Json(MutationResponse::from(sent))))
}

/// POST /api/v1/threads/{id}/read
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (_, party) = thread_party(&state, &auth, id).await?;
    let read = threads::mark_thread_as_read(state.store(), id, party).await?;
    state.invalidate(&read.invalidates).await;
    Ok(Json(MutationResponse::from(read)))
}

// ---------------------------------------------------------------------------
// Flags and moves
// ---------------------------------------------------------------------------

/// POST /api/v1/threads/{id}/pin
pub async fn toggle_pin(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    gc_thread(&state, &auth, id).await?;
    let toggled = threads::toggle_pinned(state.store(), id).await?;
    state.invalidate(&toggled.invalidates).await;
    Ok(Json(MutationResponse::from(toggled)))
}

/// POST /api/v1/threads/{id}/archive
pub async fn toggle_archive(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    gc_thread(&state, &auth, id).await?;
    let toggled = threads::toggle_archived(state.store(), id).await?;
    state.invalidate(&toggled.invalidates).await;
    Ok(Json(MutationResponse::from(toggled)))
}

/// POST /api/v1/threads/{id}/move
pub async fn move_to_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MoveThreadRequest>,
) -> AppResult<impl IntoResponse> {
    let thread = gc_thread(&state, &auth, id).await?;
    let trade_profile_id = input
        .trade_profile_id
        .or(thread.trade_profile_id)
        .ok_or_else(|| AppError::BadRequest("trade_profile_id is required".into()))?;
    let moved = threads::move_thread_to_project(
        state.store(),
        MoveThread {
            thread_id: id,
            project_id: input.project_id,
            trade_profile_id,
            added_by: auth.user_id,
        },
    )
    .await?;
    state.invalidate(&moved.invalidates).await;
    tracing::info!(thread_id = id, project_id = input.project_id, "Thread moved to project");
    Ok(Json(MutationResponse::from(moved)))
}
