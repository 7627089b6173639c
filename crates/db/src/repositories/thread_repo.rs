//! Repository for the `project_threads` table.
//!
//! One partial unique index exists per thread kind
//! (`uq_project_threads_announcement`, `uq_project_threads_project`,
//! `uq_project_threads_direct`); [`ThreadRepo::ensure`] targets the index that
//! matches the thread's key.

use sitelink_core::roles::Party;
use sitelink_core::types::{DbId, Timestamp};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use crate::models::thread::{NewThread, ProjectThread, ThreadFlag, ThreadKey};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, gc_user_id, trade_profile_id, thread_type, \
                       last_message_at, last_message_preview, pinned, archived, \
                       unread_count_gc, unread_count_trade, created_at, updated_at";

type ThreadQuery<'q> = QueryAs<'q, Postgres, ProjectThread, PgArguments>;

/// `WHERE` clause selecting the row that occupies `key`.
fn key_filter(key: &ThreadKey) -> &'static str {
    match key {
        ThreadKey::Announcement { .. } => "project_id = $1 AND thread_type = 'announcement'",
        ThreadKey::Project { .. } => {
            "project_id = $1 AND trade_profile_id = $2 AND thread_type = 'project'"
        }
        ThreadKey::Direct { .. } => {
            "gc_user_id = $1 AND trade_profile_id = $2 AND thread_type = 'direct'"
        }
    }
}

/// `ON CONFLICT` target matching the partial unique index for `key`.
fn conflict_target(key: &ThreadKey) -> &'static str {
    match key {
        ThreadKey::Announcement { .. } => "(project_id) WHERE thread_type = 'announcement'",
        ThreadKey::Project { .. } => "(project_id, trade_profile_id) WHERE thread_type = 'project'",
        ThreadKey::Direct { .. } => "(gc_user_id, trade_profile_id) WHERE thread_type = 'direct'",
    }
}

/// Bind the parameters referenced by [`key_filter`].
fn bind_key<'q>(query: ThreadQuery<'q>, key: &ThreadKey) -> ThreadQuery<'q> {
    match *key {
        ThreadKey::Announcement { project_id } => query.bind(project_id),
        ThreadKey::Project {
            project_id,
            trade_profile_id,
        } => query.bind(project_id).bind(trade_profile_id),
        ThreadKey::Direct {
            gc_user_id,
            trade_profile_id,
        } => query.bind(gc_user_id).bind(trade_profile_id),
    }
}

/// Provides operations for project threads.
pub struct ThreadRepo;

impl ThreadRepo {
    /// Return the thread occupying `input.key`, creating it with zeroed
    /// counters if absent.
    pub async fn ensure(pool: &PgPool, input: &NewThread) -> Result<ProjectThread, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_threads (project_id, gc_user_id, trade_profile_id, thread_type) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT {} DO NOTHING \
             RETURNING {COLUMNS}",
            conflict_target(&input.key)
        );
        let inserted = sqlx::query_as::<_, ProjectThread>(&query)
            .bind(input.project_id())
            .bind(input.gc_user_id)
            .bind(input.trade_profile_id())
            .bind(input.thread_type().as_str())
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(thread) => Ok(thread),
            None => Self::find_by_key(pool, &input.key)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectThread>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_threads WHERE id = $1");
        sqlx::query_as::<_, ProjectThread>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_key(
        pool: &PgPool,
        key: &ThreadKey,
    ) -> Result<Option<ProjectThread>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_threads WHERE {}",
            key_filter(key)
        );
        bind_key(sqlx::query_as::<_, ProjectThread>(&query), key)
            .fetch_optional(pool)
            .await
    }

    /// Announcement and project threads of a project.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectThread>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM project_threads WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, ProjectThread>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Direct threads started by a GC user.
    pub async fn list_direct_by_gc(
        pool: &PgPool,
        gc_user_id: DbId,
    ) -> Result<Vec<ProjectThread>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_threads \
             WHERE gc_user_id = $1 AND thread_type = 'direct' ORDER BY id"
        );
        sqlx::query_as::<_, ProjectThread>(&query)
            .bind(gc_user_id)
            .fetch_all(pool)
            .await
    }

    /// Project and direct threads a trade profile is part of.
    pub async fn list_by_trade(
        pool: &PgPool,
        trade_profile_id: DbId,
    ) -> Result<Vec<ProjectThread>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_threads WHERE trade_profile_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, ProjectThread>(&query)
            .bind(trade_profile_id)
            .fetch_all(pool)
            .await
    }

    /// Stamp the latest message and bump the opposite party's unread counter
    /// in one statement.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn record_message(
        pool: &PgPool,
        id: DbId,
        sender: Party,
        preview: &str,
        at: Timestamp,
    ) -> Result<Option<ProjectThread>, sqlx::Error> {
        let (gc_increment, trade_increment): (i32, i32) = match sender {
            Party::Gc => (0, 1),
            Party::Trade => (1, 0),
        };
        let query = format!(
            "UPDATE project_threads SET
                last_message_at = $2,
                last_message_preview = $3,
                unread_count_gc = unread_count_gc + $4,
                unread_count_trade = unread_count_trade + $5,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectThread>(&query)
            .bind(id)
            .bind(at)
            .bind(preview)
            .bind(gc_increment)
            .bind(trade_increment)
            .fetch_optional(pool)
            .await
    }

    /// Zero the unread counter of `party`.
    pub async fn reset_unread(
        pool: &PgPool,
        id: DbId,
        party: Party,
    ) -> Result<Option<ProjectThread>, sqlx::Error> {
        let column = match party {
            Party::Gc => "unread_count_gc",
            Party::Trade => "unread_count_trade",
        };
        let query = format!(
            "UPDATE project_threads SET {column} = 0, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectThread>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Negate a boolean flag.
    pub async fn toggle_flag(
        pool: &PgPool,
        id: DbId,
        flag: ThreadFlag,
    ) -> Result<Option<ProjectThread>, sqlx::Error> {
        let column = flag.column();
        let query = format!(
            "UPDATE project_threads SET {column} = NOT {column}, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectThread>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Re-type a direct thread as a project thread.
    ///
    /// The `thread_type = 'direct'` guard makes the transition one-way; a
    /// second call returns `None`.
    pub async fn promote_direct(
        pool: &PgPool,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<ProjectThread>, sqlx::Error> {
        let query = format!(
            "UPDATE project_threads SET
                project_id = $2,
                thread_type = 'project',
                updated_at = NOW()
             WHERE id = $1 AND thread_type = 'direct'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectThread>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }
}
