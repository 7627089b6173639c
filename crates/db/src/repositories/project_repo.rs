//! Repository for the `projects` table.

use sitelink_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::{
    CreateProject, Project, UpdateProjectAttachments, DEFAULT_PROJECT_STATUS,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_by, status, project_type, budget, start_date, end_date, \
                       description, description_photos, description_files, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// If `status` is `None` in the input, defaults to [`DEFAULT_PROJECT_STATUS`].
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, created_by, status, project_type, budget, start_date, end_date, description)
             VALUES ($1, $2, COALESCE($3, '{DEFAULT_PROJECT_STATUS}'), $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(input.created_by)
            .bind(&input.status)
            .bind(&input.project_type)
            .bind(input.budget)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's projects ordered by most recently created first.
    pub async fn list_by_owner(pool: &PgPool, user_id: DbId) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE created_by = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Replace the description photo and file lists.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_attachments(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProjectAttachments,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                description_photos = $2,
                description_files = $3,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.description_photos)
            .bind(Json(&input.description_files))
            .fetch_optional(pool)
            .await
    }
}
