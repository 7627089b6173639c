//! Thread lifecycle, posting and unread bookkeeping.

use std::collections::HashSet;

use chrono::Utc;
use sitelink_core::cache::{CacheTag, Mutation};
use sitelink_core::error::CoreError;
use sitelink_core::roles::Party;
use sitelink_core::threads::{
    compare_for_listing, truncate_preview, validate_message_body, ThreadType,
};
use sitelink_core::types::DbId;
use sitelink_db::models::link::{NewProjectTradeLink, ProjectTradeKey};
use sitelink_db::models::message::{NewMessage, ProjectMessage};
use sitelink_db::models::project::Project;
use sitelink_db::models::thread::{NewThread, ProjectThread, ThreadFlag, ThreadKey};
use sitelink_db::EntityStore;

use crate::error::ServiceResult;

/// A message to post into a thread.
#[derive(Debug, Clone)]
pub struct SendMessage {
    pub thread_id: DbId,
    pub sender_role: Party,
    pub sender_id: DbId,
    pub body: String,
}

/// Request to turn a direct thread into a project thread.
#[derive(Debug, Clone, Copy)]
pub struct MoveThread {
    pub thread_id: DbId,
    pub project_id: DbId,
    pub trade_profile_id: DbId,
    /// User id of the GC performing the move.
    pub added_by: DbId,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sort threads into canonical listing order.
pub fn sort_for_listing(threads: &mut [ProjectThread]) {
    threads.sort_by(|a, b| compare_for_listing(&a.sort_key(), &b.sort_key()));
}

/// Tags of every list a thread appears in, plus the thread itself.
pub fn thread_tags(thread: &ProjectThread) -> Vec<CacheTag> {
    let mut tags = vec![CacheTag::Thread(thread.id)];
    if let Some(project_id) = thread.project_id {
        tags.push(CacheTag::ProjectThreads(project_id));
    }
    if thread.is_direct() {
        tags.push(CacheTag::DirectThreads(thread.gc_user_id));
    }
    if let Some(trade_profile_id) = thread.trade_profile_id {
        tags.push(CacheTag::TradeThreads(trade_profile_id));
    }
    tags
}

pub(crate) async fn load_project(store: &dyn EntityStore, id: DbId) -> ServiceResult<Project> {
    store
        .find_project(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id).into())
}

pub(crate) async fn load_thread(
    store: &dyn EntityStore,
    id: DbId,
) -> ServiceResult<ProjectThread> {
    store
        .find_thread(id)
        .await?
        .ok_or_else(|| CoreError::not_found("ProjectThread", id).into())
}

fn missing_thread(id: DbId) -> crate::ServiceError {
    CoreError::not_found("ProjectThread", id).into()
}

/// Which side of `thread` the caller speaks for, if any.
///
/// The GC is the thread's `gc_user_id`. The trade side is the thread's trade
/// profile, or for announcement threads any trade linked to the project.
pub async fn participant_party(
    store: &dyn EntityStore,
    thread: &ProjectThread,
    user_id: DbId,
    profile_id: Option<DbId>,
) -> ServiceResult<Option<Party>> {
    if thread.gc_user_id == user_id {
        return Ok(Some(Party::Gc));
    }
    let Some(profile_id) = profile_id else {
        return Ok(None);
    };
    if thread.trade_profile_id == Some(profile_id) {
        return Ok(Some(Party::Trade));
    }
    if let (true, Some(project_id)) = (thread.is_announcement(), thread.project_id) {
        let key = ProjectTradeKey {
            project_id,
            trade_profile_id: profile_id,
        };
        if store.find_project_trade_link(key).await?.is_some() {
            return Ok(Some(Party::Trade));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Ensure / find-or-create
// ---------------------------------------------------------------------------

/// Ensure the project's announcement thread exists. Idempotent.
pub async fn ensure_announcement_thread(
    store: &dyn EntityStore,
    project_id: DbId,
) -> ServiceResult<Mutation<ProjectThread>> {
    let project = load_project(store, project_id).await?;
    let thread = store
        .ensure_thread(&NewThread::announcement(project.id, project.created_by))
        .await?;
    let tags = thread_tags(&thread);
    Ok(Mutation::new(thread, tags))
}

/// Ensure the announcement thread plus one project thread per linked trade,
/// and return all of the project's threads in listing order.
pub async fn ensure_project_threads_for_links(
    store: &dyn EntityStore,
    project_id: DbId,
) -> ServiceResult<Mutation<Vec<ProjectThread>>> {
    let project = load_project(store, project_id).await?;
    let before: HashSet<DbId> = store
        .list_threads_for_project(project_id)
        .await?
        .iter()
        .map(|t| t.id)
        .collect();

    let mut wanted = vec![NewThread::announcement(project.id, project.created_by)];
    wanted.extend(
        store
            .list_project_trade_links(project_id)
            .await?
            .into_iter()
            .map(|link| NewThread::project(project.id, link.trade_profile_id, project.created_by)),
    );
    store.bulk_ensure_threads(&wanted).await?;

    let mut threads = store.list_threads_for_project(project_id).await?;
    sort_for_listing(&mut threads);

    let created: Vec<&ProjectThread> = threads.iter().filter(|t| !before.contains(&t.id)).collect();
    let mut tags = Vec::new();
    if !created.is_empty() {
        tracing::info!(project_id, created = created.len(), "Created missing project threads");
        tags.push(CacheTag::ProjectThreads(project_id));
        tags.extend(created.iter().flat_map(|t| thread_tags(t)));
    }
    Ok(Mutation::new(threads, tags))
}

/// Find or create the project thread for a project/trade pair.
pub async fn find_or_create_thread(
    store: &dyn EntityStore,
    project_id: DbId,
    trade_profile_id: DbId,
) -> ServiceResult<Mutation<ProjectThread>> {
    let project = load_project(store, project_id).await?;
    let thread = store
        .ensure_thread(&NewThread::project(
            project.id,
            trade_profile_id,
            project.created_by,
        ))
        .await?;
    let tags = thread_tags(&thread);
    Ok(Mutation::new(thread, tags))
}

/// Find or create the direct thread between a GC user and a trade profile.
pub async fn find_or_create_direct_thread(
    store: &dyn EntityStore,
    gc_user_id: DbId,
    trade_profile_id: DbId,
) -> ServiceResult<Mutation<ProjectThread>> {
    let trade = store
        .find_profile(trade_profile_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", trade_profile_id))?;
    if !trade.is_trade() {
        return Err(CoreError::Validation(format!(
            "Profile {trade_profile_id} is not a trade profile"
        ))
        .into());
    }
    let thread = store
        .ensure_thread(&NewThread::direct(gc_user_id, trade_profile_id))
        .await?;
    let tags = thread_tags(&thread);
    Ok(Mutation::new(thread, tags))
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Post a message and update the thread's preview and unread counter.
pub async fn send_message(
    store: &dyn EntityStore,
    input: SendMessage,
) -> ServiceResult<Mutation<ProjectMessage>> {
    validate_message_body(&input.body).map_err(CoreError::Validation)?;

    let thread = load_thread(store, input.thread_id).await?;
    if !thread.accepts_posts_from(input.sender_role) {
        return Err(CoreError::Forbidden(format!(
            "{} cannot post in {} threads",
            input.sender_role, thread.thread_type
        ))
        .into());
    }

    let preview = truncate_preview(&input.body);
    let message = store
        .create_message(&NewMessage {
            thread_id: thread.id,
            sender_role: input.sender_role,
            sender_id: input.sender_id,
            body: input.body,
            created_at: Utc::now(),
        })
        .await?;

    let thread = store
        .record_thread_message(thread.id, input.sender_role, &preview, message.created_at)
        .await?
        .ok_or_else(|| missing_thread(input.thread_id))?;

    tracing::debug!(
        thread_id = thread.id,
        message_id = message.id,
        sender = %input.sender_role,
        "Message sent"
    );

    let mut tags = vec![CacheTag::Messages(thread.id)];
    tags.extend(thread_tags(&thread));
    Ok(Mutation::new(message, tags))
}

/// Messages of a thread, oldest first.
pub async fn list_messages(
    store: &dyn EntityStore,
    thread_id: DbId,
) -> ServiceResult<Vec<ProjectMessage>> {
    let thread = load_thread(store, thread_id).await?;
    Ok(store.list_messages(thread.id).await?)
}

// ---------------------------------------------------------------------------
// Per-thread state
// ---------------------------------------------------------------------------

/// Zero `party`'s unread counter.
pub async fn mark_thread_as_read(
    store: &dyn EntityStore,
    thread_id: DbId,
    party: Party,
) -> ServiceResult<Mutation<ProjectThread>> {
    let thread = store
        .reset_thread_unread(thread_id, party)
        .await?
        .ok_or_else(|| missing_thread(thread_id))?;
    let tags = thread_tags(&thread);
    Ok(Mutation::new(thread, tags))
}

pub async fn toggle_pinned(
    store: &dyn EntityStore,
    thread_id: DbId,
) -> ServiceResult<Mutation<ProjectThread>> {
    toggle_flag(store, thread_id, ThreadFlag::Pinned).await
}

pub async fn toggle_archived(
    store: &dyn EntityStore,
    thread_id: DbId,
) -> ServiceResult<Mutation<ProjectThread>> {
    toggle_flag(store, thread_id, ThreadFlag::Archived).await
}

async fn toggle_flag(
    store: &dyn EntityStore,
    thread_id: DbId,
    flag: ThreadFlag,
) -> ServiceResult<Mutation<ProjectThread>> {
    let thread = store
        .toggle_thread_flag(thread_id, flag)
        .await?
        .ok_or_else(|| missing_thread(thread_id))?;
    tracing::debug!(thread_id, flag = flag.column(), "Thread flag toggled");
    let tags = thread_tags(&thread);
    Ok(Mutation::new(thread, tags))
}

/// Turn a direct thread into the project thread of `project_id` and make
/// sure the trade is linked to the project.
pub async fn move_thread_to_project(
    store: &dyn EntityStore,
    input: MoveThread,
) -> ServiceResult<Mutation<ProjectThread>> {
    let thread = load_thread(store, input.thread_id).await?;
    if !thread.thread_type.can_transition_to(ThreadType::Project) {
        return Err(CoreError::Conflict(format!(
            "Thread {} is a {} thread; only direct threads can be moved",
            thread.id, thread.thread_type
        ))
        .into());
    }
    if thread.trade_profile_id != Some(input.trade_profile_id) {
        return Err(CoreError::Validation(format!(
            "Thread {} does not belong to trade profile {}",
            thread.id, input.trade_profile_id
        ))
        .into());
    }

    let project = load_project(store, input.project_id).await?;
    if !project.is_owned_by(input.added_by) || thread.gc_user_id != project.created_by {
        return Err(CoreError::Forbidden(format!(
            "Only the owner of project {} can move threads into it",
            project.id
        ))
        .into());
    }

    let key = ThreadKey::Project {
        project_id: project.id,
        trade_profile_id: input.trade_profile_id,
    };
    if let Some(existing) = store.find_thread_by_key(key).await? {
        return Err(CoreError::Conflict(format!(
            "Project {} already has thread {} for trade profile {}",
            project.id, existing.id, input.trade_profile_id
        ))
        .into());
    }

    let moved = store
        .promote_direct_thread(thread.id, project.id)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(format!("Thread {} is no longer a direct thread", thread.id))
        })?;

    store
        .ensure_project_trade_link(&NewProjectTradeLink {
            key: ProjectTradeKey {
                project_id: project.id,
                trade_profile_id: input.trade_profile_id,
            },
            added_by: input.added_by,
        })
        .await?;

    tracing::info!(
        thread_id = moved.id,
        project_id = project.id,
        trade_profile_id = input.trade_profile_id,
        "Direct thread moved to project"
    );

    let mut tags = thread_tags(&thread);
    tags.extend(thread_tags(&moved));
    tags.push(CacheTag::ProjectTrades(project.id));
    Ok(Mutation::new(moved, tags))
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

fn finish_listing(mut threads: Vec<ProjectThread>, include_archived: bool) -> Vec<ProjectThread> {
    if !include_archived {
        threads.retain(|t| !t.archived);
    }
    sort_for_listing(&mut threads);
    threads
}

/// Direct threads owned by a GC user, in listing order.
pub async fn list_direct_threads(
    store: &dyn EntityStore,
    gc_user_id: DbId,
    include_archived: bool,
) -> ServiceResult<Vec<ProjectThread>> {
    let threads = store.list_direct_threads(gc_user_id).await?;
    Ok(finish_listing(threads, include_archived))
}

/// Every project and direct thread of a trade profile, in listing order.
pub async fn list_threads_for_trade(
    store: &dyn EntityStore,
    trade_profile_id: DbId,
    include_archived: bool,
) -> ServiceResult<Vec<ProjectThread>> {
    let threads = store.list_threads_for_trade(trade_profile_id).await?;
    Ok(finish_listing(threads, include_archived))
}
