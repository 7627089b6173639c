//! Repository for the `profiles` table.

use sitelink_core::roles::ProfileRole;
use sitelink_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{CreateProfile, Profile, UpdateProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, role, company_name, owner_name, email, phone, \
                       trade_category, trade_tags, created_at, updated_at";

/// Provides CRUD operations for profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a new profile, returning the created row.
    ///
    /// Fails with a unique violation (`uq_profiles_user_id`) if the user
    /// already has a profile.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles
                (user_id, role, company_name, owner_name, email, phone, trade_category, trade_tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.user_id)
            .bind(input.role.as_str())
            .bind(&input.company_name)
            .bind(&input.owner_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.trade_category)
            .bind(&input.trade_tags)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List every profile with the given role, ordered by company name.
    pub async fn list_by_role(
        pool: &PgPool,
        role: ProfileRole,
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM profiles WHERE role = $1 ORDER BY company_name, id");
        sqlx::query_as::<_, Profile>(&query)
            .bind(role.as_str())
            .fetch_all(pool)
            .await
    }

    /// Update a profile. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET
                company_name = COALESCE($2, company_name),
                owner_name = COALESCE($3, owner_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                trade_category = COALESCE($6, trade_category),
                trade_tags = COALESCE($7, trade_tags),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&input.company_name)
            .bind(&input.owner_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.trade_category)
            .bind(&input.trade_tags)
            .fetch_optional(pool)
            .await
    }
}
