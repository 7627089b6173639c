//! Profile entity model and DTOs.

use serde::{Deserialize, Serialize};
use sitelink_core::roles::ProfileRole;
use sitelink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `profiles` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: DbId,
    pub user_id: DbId,
    #[sqlx(try_from = "String")]
    pub role: ProfileRole,
    pub company_name: String,
    pub owner_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Trade profiles only.
    pub trade_category: Option<String>,
    /// Trade profiles only.
    pub trade_tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    pub fn is_trade(&self) -> bool {
        self.role == ProfileRole::Trade
    }

    pub fn is_general_contractor(&self) -> bool {
        self.role == ProfileRole::GeneralContractor
    }
}

/// DTO for creating a profile at onboarding.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfile {
    pub user_id: DbId,
    pub role: ProfileRole,
    pub company_name: String,
    pub owner_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub trade_category: Option<String>,
    #[serde(default)]
    pub trade_tags: Vec<String>,
}

/// DTO for editing a profile. All fields are optional; the role is fixed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub company_name: Option<String>,
    pub owner_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub trade_category: Option<String>,
    pub trade_tags: Option<Vec<String>>,
}
