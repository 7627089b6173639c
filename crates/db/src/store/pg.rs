//! [`EntityStore`] backed by PostgreSQL through the repository layer.

use async_trait::async_trait;
use sitelink_core::roles::{Party, ProfileRole};
use sitelink_core::types::{DbId, Timestamp};

use super::{EntityStore, StoreResult};
use crate::models::invite::{Invite, NewInvite};
use crate::models::link::{
    NewProjectTradeLink, NewRolodexLink, ProjectTradeKey, ProjectTradeLink, RolodexLink,
};
use crate::models::message::{NewMessage, ProjectMessage};
use crate::models::profile::{CreateProfile, Profile, UpdateProfile};
use crate::models::project::{CreateProject, Project, UpdateProjectAttachments};
use crate::models::thread::{NewThread, ProjectThread, ThreadFlag, ThreadKey};
use crate::repositories::{
    InviteRepo, MessageRepo, ProfileRepo, ProjectRepo, ProjectTradeLinkRepo, RolodexLinkRepo,
    ThreadRepo,
};
use crate::DbPool;

/// PostgreSQL entity store. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_profile(&self, input: &CreateProfile) -> StoreResult<Profile> {
        Ok(ProfileRepo::create(&self.pool, input).await?)
    }

    async fn find_profile(&self, id: DbId) -> StoreResult<Option<Profile>> {
        Ok(ProfileRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_profile_by_user(&self, user_id: DbId) -> StoreResult<Option<Profile>> {
        Ok(ProfileRepo::find_by_user_id(&self.pool, user_id).await?)
    }

    async fn list_profiles_by_role(&self, role: ProfileRole) -> StoreResult<Vec<Profile>> {
        Ok(ProfileRepo::list_by_role(&self.pool, role).await?)
    }

    async fn update_profile(
        &self,
        id: DbId,
        input: &UpdateProfile,
    ) -> StoreResult<Option<Profile>> {
        Ok(ProfileRepo::update(&self.pool, id, input).await?)
    }

    async fn create_project(&self, input: &CreateProject) -> StoreResult<Project> {
        Ok(ProjectRepo::create(&self.pool, input).await?)
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(ProjectRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects_by_owner(&self, user_id: DbId) -> StoreResult<Vec<Project>> {
        Ok(ProjectRepo::list_by_owner(&self.pool, user_id).await?)
    }

    async fn update_project_attachments(
        &self,
        id: DbId,
        input: &UpdateProjectAttachments,
    ) -> StoreResult<Option<Project>> {
        Ok(ProjectRepo::update_attachments(&self.pool, id, input).await?)
    }

    async fn ensure_project_trade_link(
        &self,
        input: &NewProjectTradeLink,
    ) -> StoreResult<ProjectTradeLink> {
        Ok(ProjectTradeLinkRepo::ensure(&self.pool, input).await?)
    }

    async fn find_project_trade_link(
        &self,
        key: ProjectTradeKey,
    ) -> StoreResult<Option<ProjectTradeLink>> {
        Ok(ProjectTradeLinkRepo::find_by_key(&self.pool, key).await?)
    }

    async fn list_project_trade_links(
        &self,
        project_id: DbId,
    ) -> StoreResult<Vec<ProjectTradeLink>> {
        Ok(ProjectTradeLinkRepo::list_by_project(&self.pool, project_id).await?)
    }

    async fn ensure_rolodex_link(&self, input: &NewRolodexLink) -> StoreResult<RolodexLink> {
        Ok(RolodexLinkRepo::ensure(&self.pool, input).await?)
    }

    async fn list_rolodex_links(&self, gc_profile_id: DbId) -> StoreResult<Vec<RolodexLink>> {
        Ok(RolodexLinkRepo::list_by_gc(&self.pool, gc_profile_id).await?)
    }

    async fn find_thread(&self, id: DbId) -> StoreResult<Option<ProjectThread>> {
        Ok(ThreadRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_thread_by_key(&self, key: ThreadKey) -> StoreResult<Option<ProjectThread>> {
        Ok(ThreadRepo::find_by_key(&self.pool, &key).await?)
    }

    async fn list_threads_for_project(&self, project_id: DbId) -> StoreResult<Vec<ProjectThread>> {
        Ok(ThreadRepo::list_by_project(&self.pool, project_id).await?)
    }

    async fn list_direct_threads(&self, gc_user_id: DbId) -> StoreResult<Vec<ProjectThread>> {
        Ok(ThreadRepo::list_direct_by_gc(&self.pool, gc_user_id).await?)
    }

    async fn list_threads_for_trade(
        &self,
        trade_profile_id: DbId,
    ) -> StoreResult<Vec<ProjectThread>> {
        Ok(ThreadRepo::list_by_trade(&self.pool, trade_profile_id).await?)
    }

    async fn ensure_thread(&self, input: &NewThread) -> StoreResult<ProjectThread> {
        Ok(ThreadRepo::ensure(&self.pool, input).await?)
    }

    async fn bulk_ensure_threads(&self, inputs: &[NewThread]) -> StoreResult<Vec<ProjectThread>> {
        let mut threads = Vec::with_capacity(inputs.len());
        for input in inputs {
            threads.push(ThreadRepo::ensure(&self.pool, input).await?);
        }
        Ok(threads)
    }

    async fn record_thread_message(
        &self,
        id: DbId,
        sender: Party,
        preview: &str,
        at: Timestamp,
    ) -> StoreResult<Option<ProjectThread>> {
        Ok(ThreadRepo::record_message(&self.pool, id, sender, preview, at).await?)
    }

    async fn reset_thread_unread(
        &self,
        id: DbId,
        party: Party,
    ) -> StoreResult<Option<ProjectThread>> {
        Ok(ThreadRepo::reset_unread(&self.pool, id, party).await?)
    }

    async fn toggle_thread_flag(
        &self,
        id: DbId,
        flag: ThreadFlag,
    ) -> StoreResult<Option<ProjectThread>> {
        Ok(ThreadRepo::toggle_flag(&self.pool, id, flag).await?)
    }

    async fn promote_direct_thread(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> StoreResult<Option<ProjectThread>> {
        Ok(ThreadRepo::promote_direct(&self.pool, id, project_id).await?)
    }

    async fn create_message(&self, input: &NewMessage) -> StoreResult<ProjectMessage> {
        Ok(MessageRepo::create(&self.pool, input).await?)
    }

    async fn list_messages(&self, thread_id: DbId) -> StoreResult<Vec<ProjectMessage>> {
        Ok(MessageRepo::list_by_thread(&self.pool, thread_id).await?)
    }

    async fn create_invite(&self, input: &NewInvite) -> StoreResult<Invite> {
        Ok(InviteRepo::create(&self.pool, input).await?)
    }

    async fn find_invite_by_token(&self, token: &str) -> StoreResult<Option<Invite>> {
        Ok(InviteRepo::find_by_token(&self.pool, token).await?)
    }

    async fn list_invites_by_sender(&self, profile_id: DbId) -> StoreResult<Vec<Invite>> {
        Ok(InviteRepo::list_by_sender(&self.pool, profile_id).await?)
    }

    async fn accept_invite(
        &self,
        id: DbId,
        accepted_by_profile_id: DbId,
        at: Timestamp,
    ) -> StoreResult<Option<Invite>> {
        Ok(InviteRepo::accept(&self.pool, id, accepted_by_profile_id, at).await?)
    }
}
