//! Project thread entity model.

use serde::{Deserialize, Serialize};
use sitelink_core::roles::Party;
use sitelink_core::threads::{can_post, ThreadSortKey, ThreadType};
use sitelink_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `project_threads` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ProjectThread {
    pub id: DbId,
    /// `None` for direct threads.
    pub project_id: Option<DbId>,
    /// The general contractor side of the conversation.
    pub gc_user_id: DbId,
    /// `None` for announcement threads.
    pub trade_profile_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub thread_type: ThreadType,
    pub last_message_at: Option<Timestamp>,
    pub last_message_preview: Option<String>,
    pub pinned: bool,
    pub archived: bool,
    pub unread_count_gc: i32,
    pub unread_count_trade: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectThread {
    pub fn is_announcement(&self) -> bool {
        self.thread_type.is_announcement()
    }

    pub fn is_project(&self) -> bool {
        self.thread_type.is_project()
    }

    pub fn is_direct(&self) -> bool {
        self.thread_type.is_direct()
    }

    /// Whether `party` may post into this thread.
    pub fn accepts_posts_from(&self, party: Party) -> bool {
        can_post(self.thread_type, party)
    }

    /// Unread counter of `party`.
    pub fn unread_for(&self, party: Party) -> i32 {
        match party {
            Party::Gc => self.unread_count_gc,
            Party::Trade => self.unread_count_trade,
        }
    }

    pub fn sort_key(&self) -> ThreadSortKey {
        ThreadSortKey {
            id: self.id,
            thread_type: self.thread_type,
            pinned: self.pinned,
            last_message_at: self.last_message_at,
        }
    }

    /// The unique logical key this thread occupies.
    pub fn key(&self) -> Option<ThreadKey> {
        match self.thread_type {
            ThreadType::Announcement => Some(ThreadKey::Announcement {
                project_id: self.project_id?,
            }),
            ThreadType::Project => Some(ThreadKey::Project {
                project_id: self.project_id?,
                trade_profile_id: self.trade_profile_id?,
            }),
            ThreadType::Direct => Some(ThreadKey::Direct {
                gc_user_id: self.gc_user_id,
                trade_profile_id: self.trade_profile_id?,
            }),
        }
    }
}

/// Logical uniqueness key of a thread. One thread exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadKey {
    Announcement {
        project_id: DbId,
    },
    Project {
        project_id: DbId,
        trade_profile_id: DbId,
    },
    Direct {
        gc_user_id: DbId,
        trade_profile_id: DbId,
    },
}

/// DTO for ensuring a thread exists. Counters start at zero and timestamps
/// at `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewThread {
    pub key: ThreadKey,
    pub gc_user_id: DbId,
}

impl NewThread {
    pub fn announcement(project_id: DbId, gc_user_id: DbId) -> Self {
        Self {
            key: ThreadKey::Announcement { project_id },
            gc_user_id,
        }
    }

    pub fn project(project_id: DbId, trade_profile_id: DbId, gc_user_id: DbId) -> Self {
        Self {
            key: ThreadKey::Project {
                project_id,
                trade_profile_id,
            },
            gc_user_id,
        }
    }

    pub fn direct(gc_user_id: DbId, trade_profile_id: DbId) -> Self {
        Self {
            key: ThreadKey::Direct {
                gc_user_id,
                trade_profile_id,
            },
            gc_user_id,
        }
    }

    pub fn thread_type(&self) -> ThreadType {
        match self.key {
            ThreadKey::Announcement { .. } => ThreadType::Announcement,
            ThreadKey::Project { .. } => ThreadType::Project,
            ThreadKey::Direct { .. } => ThreadType::Direct,
        }
    }

    pub fn project_id(&self) -> Option<DbId> {
        match self.key {
            ThreadKey::Announcement { project_id } | ThreadKey::Project { project_id, .. } => {
                Some(project_id)
            }
            ThreadKey::Direct { .. } => None,
        }
    }

    pub fn trade_profile_id(&self) -> Option<DbId> {
        match self.key {
            ThreadKey::Announcement { .. } => None,
            ThreadKey::Project {
                trade_profile_id, ..
            }
            | ThreadKey::Direct {
                trade_profile_id, ..
            } => Some(trade_profile_id),
        }
    }
}

/// Boolean thread flags toggled by the thread owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadFlag {
    Pinned,
    Archived,
}

impl ThreadFlag {
    pub fn column(self) -> &'static str {
        match self {
            ThreadFlag::Pinned => "pinned",
            ThreadFlag::Archived => "archived",
        }
    }
}
