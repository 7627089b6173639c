//! Repository for the `project_messages` table.

use sitelink_core::types::DbId;
use sqlx::PgPool;

use crate::models::message::{NewMessage, ProjectMessage};

/// Column list for `project_messages` queries.
const COLUMNS: &str = "id, thread_id, sender_role, sender_id, body, created_at";

/// Provides insert and listing for thread messages. Messages are never
/// updated.
pub struct MessageRepo;

impl MessageRepo {
    pub async fn create(pool: &PgPool, input: &NewMessage) -> Result<ProjectMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_messages (thread_id, sender_role, sender_id, body, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectMessage>(&query)
            .bind(input.thread_id)
            .bind(input.sender_role.as_str())
            .bind(input.sender_id)
            .bind(&input.body)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// List a thread's messages, oldest first.
    pub async fn list_by_thread(
        pool: &PgPool,
        thread_id: DbId,
    ) -> Result<Vec<ProjectMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_messages \
             WHERE thread_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ProjectMessage>(&query)
            .bind(thread_id)
            .fetch_all(pool)
            .await
    }
}
