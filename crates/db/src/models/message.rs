//! Project message entity model.

use serde::{Deserialize, Serialize};
use sitelink_core::roles::Party;
use sitelink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `project_messages` table. Immutable once written.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ProjectMessage {
    pub id: DbId,
    pub thread_id: DbId,
    #[sqlx(try_from = "String")]
    pub sender_role: Party,
    pub sender_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// DTO for writing a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub thread_id: DbId,
    pub sender_role: Party,
    pub sender_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}
