//! The entity store contract consumed by the service layer.
//!
//! Two implementations exist: [`pg::PgStore`] over PostgreSQL and
//! [`memory::MemoryStore`], a process-local store that can be exported to and
//! imported from a JSON snapshot.
//!
//! The `ensure_*` operations are atomic upserts: they return the row that
//! occupies the logical key, creating it only if it is absent. Callers never
//! check-then-create themselves.

use async_trait::async_trait;
use sitelink_core::error::CoreError;
use sitelink_core::roles::{Party, ProfileRole};
use sitelink_core::types::{DbId, Timestamp};

use crate::models::invite::{Invite, NewInvite};
use crate::models::link::{
    NewProjectTradeLink, NewRolodexLink, ProjectTradeKey, ProjectTradeLink, RolodexLink,
};
use crate::models::message::{NewMessage, ProjectMessage};
use crate::models::profile::{CreateProfile, Profile, UpdateProfile};
use crate::models::project::{CreateProject, Project, UpdateProjectAttachments};
use crate::models::thread::{NewThread, ProjectThread, ThreadFlag, ThreadKey};

pub mod memory;
pub mod pg;

/// Errors raised by an [`EntityStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error (constraint violations in the memory store).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Reading or writing a memory-store snapshot failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    /// Unique violations on `uq_` constraints become [`CoreError::Conflict`],
    /// the same error the memory store raises for a taken key.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                    return StoreError::Core(CoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    )));
                }
            }
        }
        StoreError::Database(err)
    }
}

/// Typed entity store. One section per collection.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Confirm the backing store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    // --- profiles ---

    async fn create_profile(&self, input: &CreateProfile) -> StoreResult<Profile>;
    async fn find_profile(&self, id: DbId) -> StoreResult<Option<Profile>>;
    async fn find_profile_by_user(&self, user_id: DbId) -> StoreResult<Option<Profile>>;
    async fn list_profiles_by_role(&self, role: ProfileRole) -> StoreResult<Vec<Profile>>;
    async fn update_profile(&self, id: DbId, input: &UpdateProfile)
        -> StoreResult<Option<Profile>>;

    // --- projects ---

    async fn create_project(&self, input: &CreateProject) -> StoreResult<Project>;
    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>>;
    /// Projects created by `user_id`, most recent first.
    async fn list_projects_by_owner(&self, user_id: DbId) -> StoreResult<Vec<Project>>;
    async fn update_project_attachments(
        &self,
        id: DbId,
        input: &UpdateProjectAttachments,
    ) -> StoreResult<Option<Project>>;

    // --- project/trade links ---

    async fn ensure_project_trade_link(
        &self,
        input: &NewProjectTradeLink,
    ) -> StoreResult<ProjectTradeLink>;
    async fn find_project_trade_link(
        &self,
        key: ProjectTradeKey,
    ) -> StoreResult<Option<ProjectTradeLink>>;
    async fn list_project_trade_links(&self, project_id: DbId)
        -> StoreResult<Vec<ProjectTradeLink>>;

    // --- rolodex links ---

    async fn ensure_rolodex_link(&self, input: &NewRolodexLink) -> StoreResult<RolodexLink>;
    async fn list_rolodex_links(&self, gc_profile_id: DbId) -> StoreResult<Vec<RolodexLink>>;

    // --- threads ---

    async fn find_thread(&self, id: DbId) -> StoreResult<Option<ProjectThread>>;
    async fn find_thread_by_key(&self, key: ThreadKey) -> StoreResult<Option<ProjectThread>>;
    /// Announcement and project threads of a project.
    async fn list_threads_for_project(&self, project_id: DbId) -> StoreResult<Vec<ProjectThread>>;
    async fn list_direct_threads(&self, gc_user_id: DbId) -> StoreResult<Vec<ProjectThread>>;
    /// Every project and direct thread a trade profile participates in.
    async fn list_threads_for_trade(&self, trade_profile_id: DbId)
        -> StoreResult<Vec<ProjectThread>>;
    async fn ensure_thread(&self, input: &NewThread) -> StoreResult<ProjectThread>;
    async fn bulk_ensure_threads(&self, inputs: &[NewThread]) -> StoreResult<Vec<ProjectThread>>;
    /// Stamp the latest message on a thread and bump the unread counter of
    /// the party opposite `sender`, in a single write.
    async fn record_thread_message(
        &self,
        id: DbId,
        sender: Party,
        preview: &str,
        at: Timestamp,
    ) -> StoreResult<Option<ProjectThread>>;
    async fn reset_thread_unread(&self, id: DbId, party: Party)
        -> StoreResult<Option<ProjectThread>>;
    async fn toggle_thread_flag(&self, id: DbId, flag: ThreadFlag)
        -> StoreResult<Option<ProjectThread>>;
    /// Re-type a direct thread as a project thread of `project_id`.
    ///
    /// Returns `None` if no direct thread with that id exists.
    async fn promote_direct_thread(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> StoreResult<Option<ProjectThread>>;

    // --- messages ---

    async fn create_message(&self, input: &NewMessage) -> StoreResult<ProjectMessage>;
    /// Messages of a thread, oldest first.
    async fn list_messages(&self, thread_id: DbId) -> StoreResult<Vec<ProjectMessage>>;

    // --- invites ---

    async fn create_invite(&self, input: &NewInvite) -> StoreResult<Invite>;
    async fn find_invite_by_token(&self, token: &str) -> StoreResult<Option<Invite>>;
    async fn list_invites_by_sender(&self, profile_id: DbId) -> StoreResult<Vec<Invite>>;
    /// Move an invite from `sent` to `accepted`.
    ///
    /// Returns `None` if the invite does not exist or was already accepted.
    async fn accept_invite(
        &self,
        id: DbId,
        accepted_by_profile_id: DbId,
        at: Timestamp,
    ) -> StoreResult<Option<Invite>>;
}
