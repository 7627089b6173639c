//! Invite entity model and DTOs.

use serde::{Deserialize, Serialize};
use sitelink_core::invites::InviteStatus;
use sitelink_core::roles::ProfileRole;
use sitelink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `invites` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Invite {
    pub id: DbId,
    pub invited_name: String,
    pub invited_phone: Option<String>,
    #[sqlx(try_from = "String")]
    pub invite_role: ProfileRole,
    pub token: String,
    #[sqlx(try_from = "String")]
    pub status: InviteStatus,
    pub sent_by_user_id: DbId,
    pub sent_by_profile_id: DbId,
    pub accepted_date: Option<Timestamp>,
    pub accepted_by_profile_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl Invite {
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Sent
    }
}

/// DTO for recording a sent invite.
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub invited_name: String,
    pub invited_phone: Option<String>,
    pub invite_role: ProfileRole,
    pub token: String,
    pub sent_by_user_id: DbId,
    pub sent_by_profile_id: DbId,
}
