//! Repository for the `invites` table.

use sitelink_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::invite::{Invite, NewInvite};

/// Column list for `invites` queries.
const COLUMNS: &str = "id, invited_name, invited_phone, invite_role, token, status, \
                       sent_by_user_id, sent_by_profile_id, accepted_date, \
                       accepted_by_profile_id, created_at";

/// Provides operations for invites.
pub struct InviteRepo;

impl InviteRepo {
    /// Insert a new invite in the `sent` state.
    pub async fn create(pool: &PgPool, input: &NewInvite) -> Result<Invite, sqlx::Error> {
        let query = format!(
            "INSERT INTO invites \
                (invited_name, invited_phone, invite_role, token, sent_by_user_id, sent_by_profile_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(&input.invited_name)
            .bind(&input.invited_phone)
            .bind(input.invite_role.as_str())
            .bind(&input.token)
            .bind(input.sent_by_user_id)
            .bind(input.sent_by_profile_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Invite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invites WHERE token = $1");
        sqlx::query_as::<_, Invite>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Invites sent by a GC profile, most recent first.
    pub async fn list_by_sender(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Vec<Invite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invites WHERE sent_by_profile_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(profile_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a pending invite accepted.
    ///
    /// Returns `None` if the invite does not exist or is no longer `sent`.
    pub async fn accept(
        pool: &PgPool,
        id: DbId,
        accepted_by_profile_id: DbId,
        at: Timestamp,
    ) -> Result<Option<Invite>, sqlx::Error> {
        let query = format!(
            "UPDATE invites SET status = 'accepted', accepted_date = $3, accepted_by_profile_id = $2 \
             WHERE id = $1 AND status = 'sent' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(id)
            .bind(accepted_by_profile_id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }
}
