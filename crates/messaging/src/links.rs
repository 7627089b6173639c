//! Rolodex and project/trade associations.

use serde::Serialize;
use sitelink_core::cache::{CacheTag, Mutation};
use sitelink_core::error::CoreError;
use sitelink_core::roles::{LinkSource, ProfileRole};
use sitelink_core::types::DbId;
use sitelink_db::models::link::{
    NewProjectTradeLink, NewRolodexLink, ProjectTradeKey, ProjectTradeLink, RolodexKey,
    RolodexLink,
};
use sitelink_db::models::profile::Profile;
use sitelink_db::models::thread::{NewThread, ProjectThread};
use sitelink_db::EntityStore;

use crate::error::ServiceResult;
use crate::threads::{load_project, thread_tags};

/// A rolodex entry together with the trade profile it points at.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedTrade {
    pub link: RolodexLink,
    pub profile: Profile,
}

/// Result of adding a trade to a project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectTradeAdded {
    pub link: ProjectTradeLink,
    pub thread: ProjectThread,
}

async fn load_profile_with_role(
    store: &dyn EntityStore,
    id: DbId,
    role: ProfileRole,
) -> ServiceResult<Profile> {
    let profile = store
        .find_profile(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", id))?;
    if profile.role != role {
        return Err(CoreError::Validation(format!(
            "Profile {id} has role {}, expected {role}",
            profile.role
        ))
        .into());
    }
    Ok(profile)
}

/// Ensure a project/trade link exists. Returns the existing link if any.
pub async fn ensure_project_trade_link(
    store: &dyn EntityStore,
    project_id: DbId,
    trade_profile_id: DbId,
    added_by: DbId,
) -> ServiceResult<Mutation<ProjectTradeLink>> {
    let link = store
        .ensure_project_trade_link(&NewProjectTradeLink {
            key: ProjectTradeKey {
                project_id,
                trade_profile_id,
            },
            added_by,
        })
        .await?;
    Ok(Mutation::new(
        link,
        vec![CacheTag::ProjectTrades(project_id)],
    ))
}

/// Ensure a rolodex link exists between a GC profile and a trade profile.
///
/// An existing link keeps its original `source`.
pub async fn ensure_rolodex_link(
    store: &dyn EntityStore,
    gc_profile_id: DbId,
    trade_profile_id: DbId,
    source: LinkSource,
) -> ServiceResult<Mutation<RolodexLink>> {
    load_profile_with_role(store, gc_profile_id, ProfileRole::GeneralContractor).await?;
    load_profile_with_role(store, trade_profile_id, ProfileRole::Trade).await?;

    let link = store
        .ensure_rolodex_link(&NewRolodexLink {
            key: RolodexKey {
                gc_profile_id,
                trade_profile_id,
            },
            source,
        })
        .await?;
    tracing::debug!(gc_profile_id, trade_profile_id, source = %link.source, "Rolodex link ensured");
    Ok(Mutation::new(link, vec![CacheTag::Rolodex(gc_profile_id)]))
}

/// Trades in a GC's rolodex, ordered by company name.
pub async fn get_linked_trades(
    store: &dyn EntityStore,
    gc_profile_id: DbId,
) -> ServiceResult<Vec<LinkedTrade>> {
    let links = store.list_rolodex_links(gc_profile_id).await?;
    let mut trades = Vec::with_capacity(links.len());
    for link in links {
        match store.find_profile(link.trade_profile_id).await? {
            Some(profile) if profile.is_trade() => trades.push(LinkedTrade { link, profile }),
            _ => {
                tracing::warn!(
                    link_id = link.id,
                    trade_profile_id = link.trade_profile_id,
                    "Rolodex link points at a missing or non-trade profile"
                );
            }
        }
    }
    trades.sort_by(|a, b| {
        a.profile
            .company_name
            .cmp(&b.profile.company_name)
            .then(a.link.id.cmp(&b.link.id))
    });
    Ok(trades)
}

/// Add a trade to a project: link it and open its project thread.
///
/// Only the project owner may do this.
pub async fn add_trade_to_project(
    store: &dyn EntityStore,
    project_id: DbId,
    trade_profile_id: DbId,
    acting_user_id: DbId,
) -> ServiceResult<Mutation<ProjectTradeAdded>> {
    let project = load_project(store, project_id).await?;
    if !project.is_owned_by(acting_user_id) {
        return Err(CoreError::Forbidden(format!(
            "Only the owner of project {project_id} can add trades"
        ))
        .into());
    }
    load_profile_with_role(store, trade_profile_id, ProfileRole::Trade).await?;

    let link = ensure_project_trade_link(store, project.id, trade_profile_id, acting_user_id)
        .await?;
    let thread = store
        .ensure_thread(&NewThread::project(
            project.id,
            trade_profile_id,
            project.created_by,
        ))
        .await?;

    tracing::info!(project_id, trade_profile_id, thread_id = thread.id, "Trade added to project");

    let mut tags = link.invalidates;
    tags.extend(thread_tags(&thread));
    Ok(Mutation::new(
        ProjectTradeAdded {
            link: link.value,
            thread,
        },
        tags,
    ))
}
