//! Repositories for `project_trade_links` and `rolodex_links`.
//!
//! Both tables carry a unique constraint on their pair of ids; `ensure`
//! inserts with `ON CONFLICT DO NOTHING` and falls back to reading the row
//! that won, so concurrent callers always converge on one record.

use sitelink_core::types::DbId;
use sqlx::PgPool;

use crate::models::link::{
    NewProjectTradeLink, NewRolodexLink, ProjectTradeKey, ProjectTradeLink, RolodexKey,
    RolodexLink,
};

// ---------------------------------------------------------------------------
// ProjectTradeLinkRepo
// ---------------------------------------------------------------------------

/// Column list for `project_trade_links` queries.
const PROJECT_TRADE_COLUMNS: &str = "id, project_id, trade_profile_id, added_by, created_at";

/// Provides operations for project/trade associations.
pub struct ProjectTradeLinkRepo;

impl ProjectTradeLinkRepo {
    /// Return the link for `input.key`, creating it if absent.
    pub async fn ensure(
        pool: &PgPool,
        input: &NewProjectTradeLink,
    ) -> Result<ProjectTradeLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_trade_links (project_id, trade_profile_id, added_by) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_project_trade_links_pair DO NOTHING \
             RETURNING {PROJECT_TRADE_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, ProjectTradeLink>(&query)
            .bind(input.key.project_id)
            .bind(input.key.trade_profile_id)
            .bind(input.added_by)
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(link) => Ok(link),
            None => Self::find_by_key(pool, input.key)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    pub async fn find_by_key(
        pool: &PgPool,
        key: ProjectTradeKey,
    ) -> Result<Option<ProjectTradeLink>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_TRADE_COLUMNS} FROM project_trade_links \
             WHERE project_id = $1 AND trade_profile_id = $2"
        );
        sqlx::query_as::<_, ProjectTradeLink>(&query)
            .bind(key.project_id)
            .bind(key.trade_profile_id)
            .fetch_optional(pool)
            .await
    }

    /// List every trade link of a project, oldest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectTradeLink>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_TRADE_COLUMNS} FROM project_trade_links \
             WHERE project_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, ProjectTradeLink>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// RolodexLinkRepo
// ---------------------------------------------------------------------------

/// Column list for `rolodex_links` queries.
const ROLODEX_COLUMNS: &str = "id, gc_profile_id, trade_profile_id, source, created_at";

/// Provides operations for GC/trade rolodex associations.
pub struct RolodexLinkRepo;

impl RolodexLinkRepo {
    /// Return the link for `input.key`, creating it if absent. An existing
    /// link keeps its original `source`.
    pub async fn ensure(pool: &PgPool, input: &NewRolodexLink) -> Result<RolodexLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO rolodex_links (gc_profile_id, trade_profile_id, source) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_rolodex_links_pair DO NOTHING \
             RETURNING {ROLODEX_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, RolodexLink>(&query)
            .bind(input.key.gc_profile_id)
            .bind(input.key.trade_profile_id)
            .bind(input.source.as_str())
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(link) => Ok(link),
            None => Self::find_by_key(pool, input.key)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    pub async fn find_by_key(
        pool: &PgPool,
        key: RolodexKey,
    ) -> Result<Option<RolodexLink>, sqlx::Error> {
        let query = format!(
            "SELECT {ROLODEX_COLUMNS} FROM rolodex_links \
             WHERE gc_profile_id = $1 AND trade_profile_id = $2"
        );
        sqlx::query_as::<_, RolodexLink>(&query)
            .bind(key.gc_profile_id)
            .bind(key.trade_profile_id)
            .fetch_optional(pool)
            .await
    }

    /// List a GC's rolodex, oldest first.
    pub async fn list_by_gc(
        pool: &PgPool,
        gc_profile_id: DbId,
    ) -> Result<Vec<RolodexLink>, sqlx::Error> {
        let query = format!(
            "SELECT {ROLODEX_COLUMNS} FROM rolodex_links WHERE gc_profile_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, RolodexLink>(&query)
            .bind(gc_profile_id)
            .fetch_all(pool)
            .await
    }
}
