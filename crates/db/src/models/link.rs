//! Association records between projects, GC profiles and trade profiles.
//!
//! Each association has a compound key type; the store guarantees at most
//! one row per key.

use serde::{Deserialize, Serialize};
use sitelink_core::roles::LinkSource;
use sitelink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Project <-> trade
// ---------------------------------------------------------------------------

/// Logical key of a [`ProjectTradeLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectTradeKey {
    pub project_id: DbId,
    pub trade_profile_id: DbId,
}

/// A row from the `project_trade_links` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ProjectTradeLink {
    pub id: DbId,
    pub project_id: DbId,
    pub trade_profile_id: DbId,
    /// User id of whoever added the trade.
    pub added_by: DbId,
    pub created_at: Timestamp,
}

impl ProjectTradeLink {
    pub fn key(&self) -> ProjectTradeKey {
        ProjectTradeKey {
            project_id: self.project_id,
            trade_profile_id: self.trade_profile_id,
        }
    }
}

/// DTO for ensuring a project/trade link.
#[derive(Debug, Clone)]
pub struct NewProjectTradeLink {
    pub key: ProjectTradeKey,
    pub added_by: DbId,
}

// ---------------------------------------------------------------------------
// GC <-> trade (rolodex)
// ---------------------------------------------------------------------------

/// Logical key of a [`RolodexLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RolodexKey {
    pub gc_profile_id: DbId,
    pub trade_profile_id: DbId,
}

/// A row from the `rolodex_links` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RolodexLink {
    pub id: DbId,
    pub gc_profile_id: DbId,
    pub trade_profile_id: DbId,
    #[sqlx(try_from = "String")]
    pub source: LinkSource,
    pub created_at: Timestamp,
}

impl RolodexLink {
    pub fn key(&self) -> RolodexKey {
        RolodexKey {
            gc_profile_id: self.gc_profile_id,
            trade_profile_id: self.trade_profile_id,
        }
    }
}

/// DTO for ensuring a rolodex link.
#[derive(Debug, Clone)]
pub struct NewRolodexLink {
    pub key: RolodexKey,
    pub source: LinkSource,
}
