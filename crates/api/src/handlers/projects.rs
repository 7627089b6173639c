//! Handlers for projects, their attachments, trades and thread lists.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use sitelink_core::cache::{CacheTag, Lookup};
use sitelink_core::error::CoreError;
use sitelink_core::types::DbId;
use sitelink_db::models::link::ProjectTradeKey;
use sitelink_db::models::project::{CreateProject, Project, UpdateProjectAttachments};
use sitelink_db::models::thread::ProjectThread;
use sitelink_messaging::{links, threads};

use crate::error::{AppError, AppResult};
use crate::handlers::remember;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MutationResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub status: Option<String>,
    pub project_type: Option<String>,
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTradeRequest {
    pub trade_profile_id: DbId,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_project(state: &AppState, id: DbId) -> AppResult<Project> {
    state
        .store()
        .find_project(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Project", id)))
}

/// Load a project the caller owns.
async fn owned_project(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Project> {
    let project = load_project(state, id).await?;
    if !project.is_owned_by(auth.user_id) {
        return Err(CoreError::Forbidden(format!("You do not own project {id}")).into());
    }
    Ok(project)
}

/// Load a project the caller owns or is linked to as a trade. Returns the
/// caller's trade profile id when access is through a link.
async fn visible_project(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<(Project, Option<DbId>)> {
    let project = load_project(state, id).await?;
    if project.is_owned_by(auth.user_id) {
        return Ok((project, None));
    }
    if !auth.is_general_contractor() {
        let profile = auth.profile(state).await?;
        let key = ProjectTradeKey {
            project_id: project.id,
            trade_profile_id: profile.id,
        };
        if state.store().find_project_trade_link(key).await?.is_some() {
            return Ok((project, Some(profile.id)));
        }
    }
    Err(CoreError::Forbidden(format!("You are not part of project {id}")).into())
}

fn validate_attachments(input: &UpdateProjectAttachments) -> Result<(), CoreError> {
    for file in &input.description_files {
        if file.name.trim().is_empty() || file.url.trim().is_empty() {
            return Err(CoreError::Validation(
                "Every file needs a name and a url".to_string(),
            ));
        }
        if file.size < 0 {
            return Err(CoreError::Validation(format!(
                "File '{}' has a negative size",
                file.name
            )));
        }
    }
    if input.description_photos.iter().any(|url| url.trim().is_empty()) {
        return Err(CoreError::Validation("Photo urls must not be empty".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// POST /projects
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
pub async fn create_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<impl IntoResponse> {
    auth.require_general_contractor()?;
    if input.name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".to_string()).into());
    }
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(CoreError::Validation(format!(
                "end_date {end} is before start_date {start}"
            ))
            .into());
        }
    }

    let created = state
        .store()
        .create_project(&CreateProject {
            name: input.name.trim().to_string(),
            created_by: auth.user_id,
            status: input.status,
            project_type: input.project_type,
            budget: input.budget,
            start_date: input.start_date,
            end_date: input.end_date,
            description: input.description,
        })
        .await?;

    tracing::info!(id = created.id, name = %created.name, "Project created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// GET /projects
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
///
/// GCs see the projects they own; trades see the projects they have a
/// project thread in.
pub async fn list_projects(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let projects = if auth.is_general_contractor() {
        state.store().list_projects_by_owner(auth.user_id).await?
    } else {
        let profile = auth.profile(&state).await?;
        let ids: BTreeSet<DbId> = state
            .store()
            .list_threads_for_trade(profile.id)
            .await?
            .into_iter()
            .filter_map(|t| t.project_id)
            .collect();
        let mut projects = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(project) = state.store().find_project(id).await? {
                projects.push(project);
            }
        }
        projects
    };
    tracing::debug!(count = projects.len(), "Listed projects");
    Ok(Json(DataResponse { data: projects }))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}
pub async fn get_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (project, _) = visible_project(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// PUT /projects/{id}/attachments
// ---------------------------------------------------------------------------

/// PUT /api/v1/projects/{id}/attachments
pub async fn update_attachments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectAttachments>,
) -> AppResult<impl IntoResponse> {
    owned_project(&state, &auth, id).await?;
    validate_attachments(&input)?;
    let updated = state
        .store()
        .update_project_attachments(id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;
    tracing::info!(
        id,
        photos = updated.description_photos.len(),
        files = updated.description_files.len(),
        "Project attachments updated"
    );
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/threads
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/threads
///
/// Ensures the announcement thread and one project thread per linked trade,
/// then lists them in canonical order. Trades only see the announcement
/// thread and their own project thread.
pub async fn list_project_threads(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (project, trade_profile_id) = visible_project(&state, &auth, id).await?;
    let key = format!("project_threads:{}", project.id);

    let tags = [
        CacheTag::ProjectThreads(project.id),
        CacheTag::ProjectTrades(project.id),
    ];

    let all = match state.cached(&key, &tags).await {
        Lookup::Hit(hit) => hit,
        Lookup::Miss(stamp) => {
            // Creating missing threads invalidates the stamp, so the first
            // listing after a new link is not cached.
            let ensured = threads::ensure_project_threads_for_links(state.store(), project.id).await?;
            state.invalidate(&ensured.invalidates).await;
            remember(&state, key, stamp, &ensured.value).await?
        }
    };

    let Some(trade_profile_id) = trade_profile_id else {
        return Ok(Json(DataResponse { data: all }));
    };
    let visible: Vec<ProjectThread> = serde_json::from_value::<Vec<ProjectThread>>(all)
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .into_iter()
        .filter(|t| t.is_announcement() || t.trade_profile_id == Some(trade_profile_id))
        .collect();
    let data = serde_json::to_value(visible).map_err(|e| AppError::InternalError(e.to_string()))?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/trades
pub async fn list_project_trades(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    owned_project(&state, &auth, id).await?;
    let links = state.store().list_project_trade_links(id).await?;
    Ok(Json(DataResponse { data: links }))
}

/// POST /api/v1/projects/{id}/trades
pub async fn add_trade(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddTradeRequest>,
) -> AppResult<impl IntoResponse> {
    let added =
        links::add_trade_to_project(state.store(), id, input.trade_profile_id, auth.user_id)
            .await?;
    state.invalidate(&added.invalidates).await;
    Ok((StatusCode::CREATED, Json(MutationResponse::from(added))))
}
