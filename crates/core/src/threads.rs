//! Thread rules: classification, posting permissions, listing order and
//! preview truncation.
//!
//! Callers test a thread's kind through the named predicates on
//! [`ThreadType`] instead of comparing raw strings, so adding a new kind only
//! touches this module.

use std::cmp::Ordering;

use crate::roles::Party;
use crate::types::{DbId, Timestamp};

/// Maximum number of characters kept in `last_message_preview`.
pub const THREAD_PREVIEW_MAX_CHARS: usize = 100;

/// Maximum accepted message body length, in characters.
pub const MAX_MESSAGE_BODY_CHARS: usize = 10_000;

define_text_enum! {
    /// Kind of conversation container. Stored in `project_threads.thread_type`.
    ThreadType ("thread type") {
        /// One per project; only the GC may post.
        Announcement = "announcement",
        /// One per project/trade pair.
        Project = "project",
        /// GC-to-trade conversation not bound to a project.
        Direct = "direct",
    }
}

impl ThreadType {
    pub fn is_announcement(self) -> bool {
        self == ThreadType::Announcement
    }

    pub fn is_project(self) -> bool {
        self == ThreadType::Project
    }

    pub fn is_direct(self) -> bool {
        self == ThreadType::Direct
    }

    /// Whether a stored thread of this type may be re-typed to `next`.
    ///
    /// `direct -> project` is the only transition. Announcement threads are
    /// only ever created, never transitioned into or out of.
    pub fn can_transition_to(self, next: ThreadType) -> bool {
        matches!((self, next), (ThreadType::Direct, ThreadType::Project))
    }
}

/// Whether `party` may post into a thread of `thread_type`.
///
/// Announcement threads are GC-only; every other kind accepts both sides.
pub fn can_post(thread_type: ThreadType, party: Party) -> bool {
    match thread_type {
        ThreadType::Announcement => party == Party::Gc,
        ThreadType::Project | ThreadType::Direct => true,
    }
}

/// Truncate a message body to the stored preview length.
///
/// Counts Unicode scalar values so multi-byte text is never split.
pub fn truncate_preview(body: &str) -> String {
    body.chars().take(THREAD_PREVIEW_MAX_CHARS).collect()
}

/// Validate a message body before it is written.
pub fn validate_message_body(body: &str) -> Result<(), String> {
    if body.trim().is_empty() {
        return Err("Message body must not be empty".to_string());
    }
    let len = body.chars().count();
    if len > MAX_MESSAGE_BODY_CHARS {
        return Err(format!(
            "Message body must be at most {MAX_MESSAGE_BODY_CHARS} characters, got {len}"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Listing order
// ---------------------------------------------------------------------------

/// The fields that decide where a thread appears in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadSortKey {
    pub id: DbId,
    pub thread_type: ThreadType,
    pub pinned: bool,
    pub last_message_at: Option<Timestamp>,
}

/// Canonical listing order.
///
/// 1. announcement threads first
/// 2. pinned before unpinned
/// 3. most recent `last_message_at` first, threads without messages last
/// 4. ascending id, so the order is total and stable
pub fn compare_for_listing(a: &ThreadSortKey, b: &ThreadSortKey) -> Ordering {
    b.thread_type
        .is_announcement()
        .cmp(&a.thread_type.is_announcement())
        .then_with(|| b.pinned.cmp(&a.pinned))
        .then_with(|| match (a.last_message_at, b.last_message_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}
