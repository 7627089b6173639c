//! Project entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitelink_core::roles::is_gc_for_project;
use sitelink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Default value of `projects.status`.
pub const DEFAULT_PROJECT_STATUS: &str = "planning";

/// A file attached to a project description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    pub url: String,
    /// Size in bytes.
    pub size: i64,
}

/// A row from the `projects` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    /// User id of the general contractor who created the project.
    pub created_by: DbId,
    pub status: String,
    pub project_type: Option<String>,
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub description_photos: Vec<String>,
    #[sqlx(json)]
    pub description_files: Vec<ProjectFile>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Whether `user_id` is this project's general contractor.
    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        is_gc_for_project(self.created_by, user_id)
    }
}

/// DTO for creating a project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub created_by: DbId,
    /// Defaults to [`DEFAULT_PROJECT_STATUS`] if omitted.
    pub status: Option<String>,
    pub project_type: Option<String>,
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Replacement attachment lists for a project description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectAttachments {
    #[serde(default)]
    pub description_photos: Vec<String>,
    #[serde(default)]
    pub description_files: Vec<ProjectFile>,
}
