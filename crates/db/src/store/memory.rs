//! Process-local [`EntityStore`] with JSON snapshot export/import.
//!
//! All collections live behind one `RwLock`, so every operation, including
//! the `ensure_*` upserts, observes and mutates a consistent view. The same
//! uniqueness rules as the PostgreSQL schema are enforced here and reported
//! as [`CoreError::Conflict`].

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitelink_core::error::CoreError;
use sitelink_core::invites::InviteStatus;
use sitelink_core::roles::{Party, ProfileRole};
use sitelink_core::threads::ThreadType;
use sitelink_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use super::{EntityStore, StoreError, StoreResult};
use crate::models::invite::{Invite, NewInvite};
use crate::models::link::{
    NewProjectTradeLink, NewRolodexLink, ProjectTradeKey, ProjectTradeLink, RolodexLink,
};
use crate::models::message::{NewMessage, ProjectMessage};
use crate::models::profile::{CreateProfile, Profile, UpdateProfile};
use crate::models::project::{
    CreateProject, Project, UpdateProjectAttachments, DEFAULT_PROJECT_STATUS,
};
use crate::models::thread::{NewThread, ProjectThread, ThreadFlag, ThreadKey};

/// Snapshot format version written by [`MemoryStore::export_json`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Every collection of the memory store. This is also the snapshot format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySnapshot {
    pub version: u32,
    /// Next id to hand out. Shared by all collections.
    pub next_id: DbId,
    pub profiles: BTreeMap<DbId, Profile>,
    pub projects: BTreeMap<DbId, Project>,
    pub project_trade_links: BTreeMap<DbId, ProjectTradeLink>,
    pub rolodex_links: BTreeMap<DbId, RolodexLink>,
    pub threads: BTreeMap<DbId, ProjectThread>,
    pub messages: BTreeMap<DbId, ProjectMessage>,
    pub invites: BTreeMap<DbId, Invite>,
}

impl MemorySnapshot {
    fn allocate_id(&mut self) -> DbId {
        if self.next_id < 1 {
            self.next_id = 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Largest id present in any collection.
    fn max_id(&self) -> DbId {
        [
            self.profiles.keys().next_back(),
            self.projects.keys().next_back(),
            self.project_trade_links.keys().next_back(),
            self.rolodex_links.keys().next_back(),
            self.threads.keys().next_back(),
            self.messages.keys().next_back(),
            self.invites.keys().next_back(),
        ]
        .into_iter()
        .flatten()
        .copied()
        .max()
        .unwrap_or(0)
    }

    fn thread_by_key(&self, key: &ThreadKey) -> Option<&ProjectThread> {
        self.threads.values().find(|t| t.key().as_ref() == Some(key))
    }
}

fn unique_violation(constraint: &str) -> StoreError {
    StoreError::Core(CoreError::Conflict(format!(
        "Duplicate value violates unique constraint: {constraint}"
    )))
}

/// In-memory entity store.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemorySnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a previously exported snapshot.
    pub fn from_snapshot(mut snapshot: MemorySnapshot) -> Self {
        snapshot.next_id = snapshot.next_id.max(snapshot.max_id() + 1);
        Self {
            data: RwLock::new(snapshot),
        }
    }

    /// Serialize every collection to a JSON document.
    pub async fn export_json(&self) -> StoreResult<String> {
        let mut snapshot = self.data.read().await.clone();
        snapshot.version = SNAPSHOT_VERSION;
        serde_json::to_string_pretty(&snapshot).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    /// Replace the store contents with a JSON document produced by
    /// [`export_json`](Self::export_json).
    pub async fn import_json(&self, json: &str) -> StoreResult<()> {
        let mut snapshot: MemorySnapshot =
            serde_json::from_str(json).map_err(|e| StoreError::Snapshot(e.to_string()))?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StoreError::Snapshot(format!(
                "Unsupported snapshot version {}, expected at most {SNAPSHOT_VERSION}",
                snapshot.version
            )));
        }
        snapshot.next_id = snapshot.next_id.max(snapshot.max_id() + 1);
        *self.data.write().await = snapshot;
        Ok(())
    }

    /// Load a snapshot file. A missing file yields an empty store.
    pub async fn load(path: &Path) -> StoreResult<Self> {
        let store = Self::new();
        match tokio::fs::read_to_string(path).await {
            Ok(json) => {
                store.import_json(&json).await?;
                tracing::info!(path = %path.display(), "Loaded memory store snapshot");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No snapshot found, starting empty");
            }
            Err(e) => return Err(StoreError::Snapshot(e.to_string())),
        }
        Ok(store)
    }

    /// Write the current contents to `path`.
    pub async fn save(&self, path: &Path) -> StoreResult<()> {
        let json = self.export_json().await?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| StoreError::Snapshot(e.to_string()))?;
        tracing::info!(path = %path.display(), "Saved memory store snapshot");
        Ok(())
    }

    fn update_thread<F>(data: &mut MemorySnapshot, id: DbId, f: F) -> Option<ProjectThread>
    where
        F: FnOnce(&mut ProjectThread),
    {
        let thread = data.threads.get_mut(&id)?;
        f(thread);
        thread.updated_at = Utc::now();
        Some(thread.clone())
    }

    fn ensure_thread_locked(data: &mut MemorySnapshot, input: &NewThread) -> ProjectThread {
        if let Some(existing) = data.thread_by_key(&input.key) {
            return existing.clone();
        }
        let now = Utc::now();
        let id = data.allocate_id();
        let thread = ProjectThread {
            id,
            project_id: input.project_id(),
            gc_user_id: input.gc_user_id,
            trade_profile_id: input.trade_profile_id(),
            thread_type: input.thread_type(),
            last_message_at: None,
            last_message_preview: None,
            pinned: false,
            archived: false,
            unread_count_gc: 0,
            unread_count_trade: 0,
            created_at: now,
            updated_at: now,
        };
        data.threads.insert(id, thread.clone());
        thread
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    // --- profiles ---

    async fn create_profile(&self, input: &CreateProfile) -> StoreResult<Profile> {
        let mut data = self.data.write().await;
        if data.profiles.values().any(|p| p.user_id == input.user_id) {
            return Err(unique_violation("uq_profiles_user_id"));
        }
        let now = Utc::now();
        let id = data.allocate_id();
        let profile = Profile {
            id,
            user_id: input.user_id,
            role: input.role,
            company_name: input.company_name.clone(),
            owner_name: input.owner_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            trade_category: input.trade_category.clone(),
            trade_tags: input.trade_tags.clone(),
            created_at: now,
            updated_at: now,
        };
        data.profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn find_profile(&self, id: DbId) -> StoreResult<Option<Profile>> {
        Ok(self.data.read().await.profiles.get(&id).cloned())
    }

    async fn find_profile_by_user(&self, user_id: DbId) -> StoreResult<Option<Profile>> {
        let data = self.data.read().await;
        Ok(data.profiles.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn list_profiles_by_role(&self, role: ProfileRole) -> StoreResult<Vec<Profile>> {
        let data = self.data.read().await;
        let mut profiles: Vec<Profile> = data
            .profiles
            .values()
            .filter(|p| p.role == role)
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.company_name.cmp(&b.company_name).then(a.id.cmp(&b.id)));
        Ok(profiles)
    }

    async fn update_profile(
        &self,
        id: DbId,
        input: &UpdateProfile,
    ) -> StoreResult<Option<Profile>> {
        let mut data = self.data.write().await;
        let Some(profile) = data.profiles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &input.company_name {
            profile.company_name = v.clone();
        }
        if let Some(v) = &input.owner_name {
            profile.owner_name = v.clone();
        }
        if let Some(v) = &input.email {
            profile.email = Some(v.clone());
        }
        if let Some(v) = &input.phone {
            profile.phone = Some(v.clone());
        }
        if let Some(v) = &input.trade_category {
            profile.trade_category = Some(v.clone());
        }
        if let Some(v) = &input.trade_tags {
            profile.trade_tags = v.clone();
        }
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    // --- projects ---

    async fn create_project(&self, input: &CreateProject) -> StoreResult<Project> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let id = data.allocate_id();
        let project = Project {
            id,
            name: input.name.clone(),
            created_by: input.created_by,
            status: input
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_PROJECT_STATUS.to_string()),
            project_type: input.project_type.clone(),
            budget: input.budget,
            start_date: input.start_date,
            end_date: input.end_date,
            description: input.description.clone(),
            description_photos: Vec::new(),
            description_files: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        data.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(self.data.read().await.projects.get(&id).cloned())
    }

    async fn list_projects_by_owner(&self, user_id: DbId) -> StoreResult<Vec<Project>> {
        let data = self.data.read().await;
        let mut projects: Vec<Project> = data
            .projects
            .values()
            .filter(|p| p.created_by == user_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }

    async fn update_project_attachments(
        &self,
        id: DbId,
        input: &UpdateProjectAttachments,
    ) -> StoreResult<Option<Project>> {
        let mut data = self.data.write().await;
        let Some(project) = data.projects.get_mut(&id) else {
            return Ok(None);
        };
        project.description_photos = input.description_photos.clone();
        project.description_files = input.description_files.clone();
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    // --- project/trade links ---

    async fn ensure_project_trade_link(
        &self,
        input: &NewProjectTradeLink,
    ) -> StoreResult<ProjectTradeLink> {
        let mut data = self.data.write().await;
        if let Some(existing) = data
            .project_trade_links
            .values()
            .find(|l| l.key() == input.key)
        {
            return Ok(existing.clone());
        }
        let id = data.allocate_id();
        let link = ProjectTradeLink {
            id,
            project_id: input.key.project_id,
            trade_profile_id: input.key.trade_profile_id,
            added_by: input.added_by,
            created_at: Utc::now(),
        };
        data.project_trade_links.insert(id, link.clone());
        Ok(link)
    }

    async fn find_project_trade_link(
        &self,
        key: ProjectTradeKey,
    ) -> StoreResult<Option<ProjectTradeLink>> {
        let data = self.data.read().await;
        Ok(data
            .project_trade_links
            .values()
            .find(|l| l.key() == key)
            .cloned())
    }

    async fn list_project_trade_links(
        &self,
        project_id: DbId,
    ) -> StoreResult<Vec<ProjectTradeLink>> {
        let data = self.data.read().await;
        Ok(data
            .project_trade_links
            .values()
            .filter(|l| l.project_id == project_id)
            .cloned()
            .collect())
    }

    // --- rolodex links ---

    async fn ensure_rolodex_link(&self, input: &NewRolodexLink) -> StoreResult<RolodexLink> {
        let mut data = self.data.write().await;
        if let Some(existing) = data.rolodex_links.values().find(|l| l.key() == input.key) {
            return Ok(existing.clone());
        }
        let id = data.allocate_id();
        let link = RolodexLink {
            id,
            gc_profile_id: input.key.gc_profile_id,
            trade_profile_id: input.key.trade_profile_id,
            source: input.source,
            created_at: Utc::now(),
        };
        data.rolodex_links.insert(id, link.clone());
        Ok(link)
    }

    async fn list_rolodex_links(&self, gc_profile_id: DbId) -> StoreResult<Vec<RolodexLink>> {
        let data = self.data.read().await;
        Ok(data
            .rolodex_links
            .values()
            .filter(|l| l.gc_profile_id == gc_profile_id)
            .cloned()
            .collect())
    }

    // --- threads ---

    async fn find_thread(&self, id: DbId) -> StoreResult<Option<ProjectThread>> {
        Ok(self.data.read().await.threads.get(&id).cloned())
    }

    async fn find_thread_by_key(&self, key: ThreadKey) -> StoreResult<Option<ProjectThread>> {
        Ok(self.data.read().await.thread_by_key(&key).cloned())
    }

    async fn list_threads_for_project(&self, project_id: DbId) -> StoreResult<Vec<ProjectThread>> {
        let data = self.data.read().await;
        Ok(data
            .threads
            .values()
            .filter(|t| t.project_id == Some(project_id))
            .cloned()
            .collect())
    }

    async fn list_direct_threads(&self, gc_user_id: DbId) -> StoreResult<Vec<ProjectThread>> {
        let data = self.data.read().await;
        Ok(data
            .threads
            .values()
            .filter(|t| t.is_direct() && t.gc_user_id == gc_user_id)
            .cloned()
            .collect())
    }

    async fn list_threads_for_trade(
        &self,
        trade_profile_id: DbId,
    ) -> StoreResult<Vec<ProjectThread>> {
        let data = self.data.read().await;
        Ok(data
            .threads
            .values()
            .filter(|t| t.trade_profile_id == Some(trade_profile_id))
            .cloned()
            .collect())
    }

    async fn ensure_thread(&self, input: &NewThread) -> StoreResult<ProjectThread> {
        let mut data = self.data.write().await;
        Ok(Self::ensure_thread_locked(&mut data, input))
    }

    async fn bulk_ensure_threads(&self, inputs: &[NewThread]) -> StoreResult<Vec<ProjectThread>> {
        let mut data = self.data.write().await;
        Ok(inputs
            .iter()
            .map(|input| Self::ensure_thread_locked(&mut data, input))
            .collect())
    }

    async fn record_thread_message(
        &self,
        id: DbId,
        sender: Party,
        preview: &str,
        at: Timestamp,
    ) -> StoreResult<Option<ProjectThread>> {
        let mut data = self.data.write().await;
        Ok(Self::update_thread(&mut data, id, |thread| {
            thread.last_message_at = Some(at);
            thread.last_message_preview = Some(preview.to_string());
            match sender {
                Party::Gc => thread.unread_count_trade += 1,
                Party::Trade => thread.unread_count_gc += 1,
            }
        }))
    }

    async fn reset_thread_unread(
        &self,
        id: DbId,
        party: Party,
    ) -> StoreResult<Option<ProjectThread>> {
        let mut data = self.data.write().await;
        Ok(Self::update_thread(&mut data, id, |thread| match party {
            Party::Gc => thread.unread_count_gc = 0,
            Party::Trade => thread.unread_count_trade = 0,
        }))
    }

    async fn toggle_thread_flag(
        &self,
        id: DbId,
        flag: ThreadFlag,
    ) -> StoreResult<Option<ProjectThread>> {
        let mut data = self.data.write().await;
        Ok(Self::update_thread(&mut data, id, |thread| match flag {
            ThreadFlag::Pinned => thread.pinned = !thread.pinned,
            ThreadFlag::Archived => thread.archived = !thread.archived,
        }))
    }

    async fn promote_direct_thread(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> StoreResult<Option<ProjectThread>> {
        let mut data = self.data.write().await;
        let Some(thread) = data.threads.get(&id) else {
            return Ok(None);
        };
        if !thread.is_direct() {
            return Ok(None);
        }
        if let Some(trade_profile_id) = thread.trade_profile_id {
            let target = ThreadKey::Project {
                project_id,
                trade_profile_id,
            };
            if data.thread_by_key(&target).is_some() {
                return Err(unique_violation("uq_project_threads_project"));
            }
        }
        Ok(Self::update_thread(&mut data, id, |thread| {
            thread.project_id = Some(project_id);
            thread.thread_type = ThreadType::Project;
        }))
    }

    // --- messages ---

    async fn create_message(&self, input: &NewMessage) -> StoreResult<ProjectMessage> {
        let mut data = self.data.write().await;
        let id = data.allocate_id();
        let message = ProjectMessage {
            id,
            thread_id: input.thread_id,
            sender_role: input.sender_role,
            sender_id: input.sender_id,
            body: input.body.clone(),
            created_at: input.created_at,
        };
        data.messages.insert(id, message.clone());
        Ok(message)
    }

    async fn list_messages(&self, thread_id: DbId) -> StoreResult<Vec<ProjectMessage>> {
        let data = self.data.read().await;
        let mut messages: Vec<ProjectMessage> = data
            .messages
            .values()
            .filter(|m| m.thread_id == thread_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    // --- invites ---

    async fn create_invite(&self, input: &NewInvite) -> StoreResult<Invite> {
        let mut data = self.data.write().await;
        if data.invites.values().any(|i| i.token == input.token) {
            return Err(unique_violation("uq_invites_token"));
        }
        let id = data.allocate_id();
        let invite = Invite {
            id,
            invited_name: input.invited_name.clone(),
            invited_phone: input.invited_phone.clone(),
            invite_role: input.invite_role,
            token: input.token.clone(),
            status: InviteStatus::Sent,
            sent_by_user_id: input.sent_by_user_id,
            sent_by_profile_id: input.sent_by_profile_id,
            accepted_date: None,
            accepted_by_profile_id: None,
            created_at: Utc::now(),
        };
        data.invites.insert(id, invite.clone());
        Ok(invite)
    }

    async fn find_invite_by_token(&self, token: &str) -> StoreResult<Option<Invite>> {
        let data = self.data.read().await;
        Ok(data.invites.values().find(|i| i.token == token).cloned())
    }

    async fn list_invites_by_sender(&self, profile_id: DbId) -> StoreResult<Vec<Invite>> {
        let data = self.data.read().await;
        let mut invites: Vec<Invite> = data
            .invites
            .values()
            .filter(|i| i.sent_by_profile_id == profile_id)
            .cloned()
            .collect();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(invites)
    }

    async fn accept_invite(
        &self,
        id: DbId,
        accepted_by_profile_id: DbId,
        at: Timestamp,
    ) -> StoreResult<Option<Invite>> {
        let mut data = self.data.write().await;
        let Some(invite) = data.invites.get_mut(&id) else {
            return Ok(None);
        };
        if !invite.is_pending() {
            return Ok(None);
        }
        invite.status = InviteStatus::Accepted;
        invite.accepted_date = Some(at);
        invite.accepted_by_profile_id = Some(accepted_by_profile_id);
        Ok(Some(invite.clone()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use sitelink_core::roles::LinkSource;

    use super::*;
    use crate::models::link::RolodexKey;

    fn new_profile(user_id: DbId, role: ProfileRole, company: &str) -> CreateProfile {
        CreateProfile {
            user_id,
            role,
            company_name: company.to_string(),
            owner_name: "Owner".to_string(),
            email: None,
            phone: None,
            trade_category: None,
            trade_tags: Vec::new(),
        }
    }

    fn new_project(created_by: DbId) -> CreateProject {
        CreateProject {
            name: "Maple St remodel".to_string(),
            created_by,
            status: None,
            project_type: Some("residential".to_string()),
            budget: Some(125_000.0),
            start_date: None,
            end_date: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn ids_are_unique_across_collections() {
        let store = MemoryStore::new();
        let profile = store
            .create_profile(&new_profile(1, ProfileRole::GeneralContractor, "Acme"))
            .await
            .unwrap();
        let project = store.create_project(&new_project(1)).await.unwrap();
        assert_ne!(profile.id, project.id);
        assert_eq!(project.status, DEFAULT_PROJECT_STATUS);
    }

    #[tokio::test]
    async fn duplicate_profile_for_user_is_conflict() {
        let store = MemoryStore::new();
        store
            .create_profile(&new_profile(1, ProfileRole::Trade, "Sparks"))
            .await
            .unwrap();
        let err = store
            .create_profile(&new_profile(1, ProfileRole::Trade, "Sparks again"))
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn ensure_thread_is_idempotent_per_key() {
        let store = MemoryStore::new();
        let a = store
            .ensure_thread(&NewThread::announcement(10, 1))
            .await
            .unwrap();
        let b = store
            .ensure_thread(&NewThread::announcement(10, 1))
            .await
            .unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(store.list_threads_for_project(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ensure_rolodex_link_keeps_original_source() {
        let store = MemoryStore::new();
        let key = RolodexKey {
            gc_profile_id: 1,
            trade_profile_id: 2,
        };
        let first = store
            .ensure_rolodex_link(&NewRolodexLink {
                key,
                source: LinkSource::Invite,
            })
            .await
            .unwrap();
        let second = store
            .ensure_rolodex_link(&NewRolodexLink {
                key,
                source: LinkSource::Manual,
            })
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.source, LinkSource::Invite);
    }

    #[tokio::test]
    async fn promote_is_one_way() {
        let store = MemoryStore::new();
        let thread = store.ensure_thread(&NewThread::direct(1, 2)).await.unwrap();
        let promoted = store
            .promote_direct_thread(thread.id, 30)
            .await
            .unwrap()
            .unwrap();
        assert!(promoted.is_project());
        assert_eq!(promoted.project_id, Some(30));
        assert!(store
            .promote_direct_thread(thread.id, 31)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn promote_into_occupied_pair_is_conflict() {
        let store = MemoryStore::new();
        store
            .ensure_thread(&NewThread::project(30, 2, 1))
            .await
            .unwrap();
        let direct = store.ensure_thread(&NewThread::direct(1, 2)).await.unwrap();
        let err = store
            .promote_direct_thread(direct.id, 30)
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn accept_invite_only_once() {
        let store = MemoryStore::new();
        let invite = store
            .create_invite(&NewInvite {
                invited_name: "Dana".to_string(),
                invited_phone: None,
                invite_role: ProfileRole::Trade,
                token: "tok".to_string(),
                sent_by_user_id: 1,
                sent_by_profile_id: 2,
            })
            .await
            .unwrap();
        let now = Utc::now();
        assert!(store.accept_invite(invite.id, 5, now).await.unwrap().is_some());
        assert!(store.accept_invite(invite.id, 5, now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn snapshot_export_import_preserves_data() {
        let store = MemoryStore::new();
        let profile = store
            .create_profile(&new_profile(1, ProfileRole::GeneralContractor, "Acme"))
            .await
            .unwrap();
        let project = store.create_project(&new_project(1)).await.unwrap();
        let thread = store
            .ensure_thread(&NewThread::announcement(project.id, 1))
            .await
            .unwrap();
        store
            .record_thread_message(thread.id, Party::Gc, "Kickoff Monday", Utc::now())
            .await
            .unwrap();

        let json = store.export_json().await.unwrap();
        let restored = MemoryStore::new();
        restored.import_json(&json).await.unwrap();

        assert_eq!(
            restored.find_profile(profile.id).await.unwrap(),
            Some(profile)
        );
        let restored_thread = restored.find_thread(thread.id).await.unwrap().unwrap();
        assert_eq!(restored_thread.unread_count_trade, 1);
        assert_eq!(
            restored_thread.last_message_preview.as_deref(),
            Some("Kickoff Monday")
        );

        // New ids continue after the imported ones.
        let next = restored.create_project(&new_project(1)).await.unwrap();
        assert!(next.id > thread.id);
    }

    #[tokio::test]
    async fn import_rejects_garbage() {
        let store = MemoryStore::new();
        let err = store.import_json("{not json").await.unwrap_err();
        assert_matches!(err, StoreError::Snapshot(_));
    }

    #[tokio::test]
    async fn save_and_load_round_trip_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStore::new();
        store
            .create_profile(&new_profile(4, ProfileRole::Trade, "Pipes Inc"))
            .await
            .unwrap();
        store.save(&path).await.unwrap();

        let loaded = MemoryStore::load(&path).await.unwrap();
        let trades = loaded
            .list_profiles_by_role(ProfileRole::Trade)
            .await
            .unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].company_name, "Pipes Inc");
    }

    #[tokio::test]
    async fn load_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load(&dir.path().join("absent.json"))
            .await
            .unwrap();
        assert!(store.find_profile(1).await.unwrap().is_none());
    }
}
