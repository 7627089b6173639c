//! CompanyCam sync handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sitelink_companycam::{CompanyCamApi, CompanyCamError, SyncProgress};
use sitelink_core::cache::{CacheTag, Mutation};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::MutationResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SyncResult<T: Serialize> {
    pub count: usize,
    pub items: Vec<T>,
}

impl<T: Serialize> From<Vec<T>> for SyncResult<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

fn client(state: &AppState) -> Result<&CompanyCamApi, CompanyCamError> {
    state
        .companycam
        .as_deref()
        .ok_or(CompanyCamError::MissingToken)
}

fn log_progress(progress: SyncProgress) {
    tracing::debug!(
        page = progress.page,
        page_items = progress.page_items,
        total = progress.total_items,
        "CompanyCam page fetched"
    );
}

/// POST /api/v1/integrations/companycam/sync
pub async fn sync_projects(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    auth.require_general_contractor()?;
    let projects = client(&state)?.sync_all_projects(log_progress).await?;
    let synced = Mutation::new(
        SyncResult::from(projects),
        vec![CacheTag::CompanyCamProjects],
    );
    state.invalidate(&synced.invalidates).await;
    Ok(Json(MutationResponse::from(synced)))
}

/// POST /api/v1/integrations/companycam/projects/{id}/photos/sync
pub async fn sync_project_photos(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    auth.require_general_contractor()?;
    let photos = client(&state)?
        .sync_project_photos(&project_id, log_progress)
        .await?;
    let synced = Mutation::new(
        SyncResult::from(photos),
        vec![CacheTag::CompanyCamProjects],
    );
    state.invalidate(&synced.invalidates).await;
    Ok(Json(MutationResponse::from(synced)))
}
