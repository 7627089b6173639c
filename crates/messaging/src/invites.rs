//! Sending and accepting onboarding invites.

use chrono::Utc;
use serde::Serialize;
use sitelink_core::cache::{CacheTag, Mutation};
use sitelink_core::error::CoreError;
use sitelink_core::invites::{generate_invite_token, invite_link, validate_invite_input};
use sitelink_core::roles::{LinkSource, ProfileRole};
use sitelink_core::types::DbId;
use sitelink_db::models::invite::{Invite, NewInvite};
use sitelink_db::models::link::RolodexLink;
use sitelink_db::EntityStore;

use crate::error::{ServiceError, ServiceResult};
use crate::links::ensure_rolodex_link;

/// Token collisions are retried this many times before giving up.
const TOKEN_ATTEMPTS: usize = 3;

/// Who is sending an invite.
#[derive(Debug, Clone, Copy)]
pub struct InviteSender {
    pub user_id: DbId,
    pub profile_id: DbId,
}

/// Input for [`create_invite`].
#[derive(Debug, Clone)]
pub struct CreateInvite {
    pub invited_name: String,
    pub invited_phone: Option<String>,
    pub invite_role: ProfileRole,
}

/// A stored invite and the link to send to the invitee.
#[derive(Debug, Clone, Serialize)]
pub struct SentInvite {
    pub invite: Invite,
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptedInvite {
    pub invite: Invite,
    /// Set when a trade accepted a GC's invite.
    pub rolodex_link: Option<RolodexLink>,
}

/// Record an invite and build its onboarding link.
pub async fn create_invite(
    store: &dyn EntityStore,
    sender: InviteSender,
    input: CreateInvite,
    origin: &str,
) -> ServiceResult<Mutation<SentInvite>> {
    validate_invite_input(&input.invited_name, input.invited_phone.as_deref())
        .map_err(CoreError::Validation)?;

    let profile = store
        .find_profile(sender.profile_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", sender.profile_id))?;
    if profile.user_id != sender.user_id {
        return Err(CoreError::Forbidden(format!(
            "Profile {} does not belong to user {}",
            profile.id, sender.user_id
        ))
        .into());
    }

    let mut attempt = 0;
    let invite = loop {
        attempt += 1;
        let new = NewInvite {
            invited_name: input.invited_name.trim().to_string(),
            invited_phone: input.invited_phone.clone(),
            invite_role: input.invite_role,
            token: generate_invite_token(),
            sent_by_user_id: sender.user_id,
            sent_by_profile_id: sender.profile_id,
        };
        match store.create_invite(&new).await.map_err(ServiceError::from) {
            Ok(invite) => break invite,
            Err(ServiceError::Core(CoreError::Conflict(_))) if attempt < TOKEN_ATTEMPTS => {
                tracing::warn!(attempt, "Invite token collision, retrying");
            }
            Err(e) => return Err(e),
        }
    };

    tracing::info!(
        invite_id = invite.id,
        sent_by_profile_id = sender.profile_id,
        role = %invite.invite_role,
        "Invite created"
    );

    let link = invite_link(origin, &invite.token);
    Ok(Mutation::new(
        SentInvite { invite, link },
        vec![CacheTag::Invites(sender.profile_id)],
    ))
}

/// Look up an invite by its token.
pub async fn find_invite(store: &dyn EntityStore, token: &str) -> ServiceResult<Invite> {
    store
        .find_invite_by_token(token)
        .await?
        .ok_or_else(|| {
            CoreError::NotFoundByKey {
                entity: "Invite",
                key: token.to_string(),
            }
            .into()
        })
}

/// Invites sent by a profile, newest first.
pub async fn list_sent_invites(
    store: &dyn EntityStore,
    profile_id: DbId,
) -> ServiceResult<Vec<Invite>> {
    Ok(store.list_invites_by_sender(profile_id).await?)
}

/// Accept an invite on behalf of `accepting_profile_id`.
///
/// The accepting profile must have the invited role. The `sent -> accepted`
/// transition happens once; a second accept is a conflict. When a trade accepts a GC's invite the two are linked in the
/// GC's rolodex.
pub async fn accept_invite(
    store: &dyn EntityStore,
    token: &str,
    accepting_profile_id: DbId,
) -> ServiceResult<Mutation<AcceptedInvite>> {
    let invite = find_invite(store, token).await?;
    if !invite.is_pending() {
        return Err(CoreError::Conflict(format!("Invite {} was already accepted", invite.id)).into());
    }

    let acceptor = store
        .find_profile(accepting_profile_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", accepting_profile_id))?;
    if acceptor.role != invite.invite_role {
        return Err(CoreError::Validation(format!(
            "Invite {} is for a {} profile, not a {}",
            invite.id, invite.invite_role, acceptor.role
        ))
        .into());
    }
    let sender = store
        .find_profile(invite.sent_by_profile_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", invite.sent_by_profile_id))?;

    let invite = store
        .accept_invite(invite.id, acceptor.id, Utc::now())
        .await?
        .ok_or_else(|| CoreError::Conflict(format!("Invite {} was already accepted", invite.id)))?;

    let mut tags = vec![CacheTag::Invites(invite.sent_by_profile_id)];
    let rolodex_link = if sender.is_general_contractor() && acceptor.is_trade() {
        let link = ensure_rolodex_link(store, sender.id, acceptor.id, LinkSource::Invite).await?;
        tags.extend(link.invalidates);
        Some(link.value)
    } else {
        None
    };

    tracing::info!(
        invite_id = invite.id,
        accepted_by_profile_id = acceptor.id,
        linked = rolodex_link.is_some(),
        "Invite accepted"
    );

    Ok(Mutation::new(
        AcceptedInvite {
            invite,
            rolodex_link,
        },
        tags,
    ))
}
