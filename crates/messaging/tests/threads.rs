mod common;

use assert_matches::assert_matches;
use common::{create_profile, create_project, fixture};
use sitelink_core::cache::CacheTag;
use sitelink_core::error::CoreError;
use sitelink_core::roles::{Party, ProfileRole};
use sitelink_core::threads::ThreadType;
use sitelink_db::models::link::ProjectTradeKey;
use sitelink_db::EntityStore;
use sitelink_messaging::links::ensure_project_trade_link;
use sitelink_messaging::threads::{
    ensure_announcement_thread, ensure_project_threads_for_links, find_or_create_direct_thread,
    find_or_create_thread, list_direct_threads, list_messages, list_threads_for_trade,
    mark_thread_as_read, move_thread_to_project, participant_party, send_message, toggle_archived,
    toggle_pinned, MoveThread, SendMessage,
};
use sitelink_messaging::ServiceError;

fn message(thread_id: i64, sender_role: Party, sender_id: i64, body: &str) -> SendMessage {
    SendMessage {
        thread_id,
        sender_role,
        sender_id,
        body: body.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Ensure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn announcement_thread_is_created_once() {
    let f = fixture().await;
    let first = ensure_announcement_thread(&f.store, f.project.id).await.unwrap();
    let second = ensure_announcement_thread(&f.store, f.project.id).await.unwrap();

    assert_eq!(first.value.id, second.value.id);
    assert!(first.value.is_announcement());
    assert_eq!(first.value.gc_user_id, f.gc.user_id);
    assert_eq!(
        f.store.list_threads_for_project(f.project.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn concurrent_ensures_create_one_announcement_thread() {
    let f = fixture().await;
    let (a, b) = tokio::join!(
        ensure_announcement_thread(&f.store, f.project.id),
        ensure_announcement_thread(&f.store, f.project.id),
    );
    assert_eq!(a.unwrap().value.id, b.unwrap().value.id);
}

#[tokio::test]
async fn announcement_for_unknown_project_is_not_found() {
    let f = fixture().await;
    let err = ensure_announcement_thread(&f.store, 9_999).await.unwrap_err();
    assert_matches!(
        err,
        ServiceError::Core(CoreError::NotFound { entity: "Project", id: 9_999 })
    );
}

#[tokio::test]
async fn threads_are_created_for_each_linked_trade() {
    let f = fixture().await;
    let second_trade = create_profile(&f.store, 201, ProfileRole::Trade, "Pipe Pros").await;
    for trade in [&f.trade, &second_trade] {
        ensure_project_trade_link(&f.store, f.project.id, trade.id, f.gc.user_id)
            .await
            .unwrap();
    }

    let listed = ensure_project_threads_for_links(&f.store, f.project.id)
        .await
        .unwrap();
    assert_eq!(listed.value.len(), 3);
    assert!(listed.value[0].is_announcement());
    assert!(listed.invalidates.contains(&CacheTag::ProjectThreads(f.project.id)));

    let again = ensure_project_threads_for_links(&f.store, f.project.id)
        .await
        .unwrap();
    let ids = |threads: &[sitelink_db::models::thread::ProjectThread]| {
        let mut ids: Vec<i64> = threads.iter().map(|t| t.id).collect();
        ids.sort();
        ids
    };
    assert_eq!(ids(&listed.value), ids(&again.value));
    assert!(again.invalidates.is_empty());
}

#[tokio::test]
async fn find_or_create_thread_reuses_the_pair() {
    let f = fixture().await;
    let a = find_or_create_thread(&f.store, f.project.id, f.trade.id).await.unwrap();
    let b = find_or_create_thread(&f.store, f.project.id, f.trade.id).await.unwrap();
    assert_eq!(a.value.id, b.value.id);
    assert!(a.value.is_project());
    assert_eq!(a.value.trade_profile_id, Some(f.trade.id));
}

#[tokio::test]
async fn direct_thread_requires_a_trade_profile() {
    let f = fixture().await;
    let thread = find_or_create_direct_thread(&f.store, f.gc.user_id, f.trade.id)
        .await
        .unwrap();
    assert!(thread.value.is_direct());
    assert_eq!(thread.value.project_id, None);
    assert!(thread
        .invalidates
        .contains(&CacheTag::DirectThreads(f.gc.user_id)));

    let err = find_or_create_direct_thread(&f.store, f.gc.user_id, f.gc.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Messages and unread counters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sending_bumps_the_other_side_and_read_resets_it() {
    let f = fixture().await;
    let thread = find_or_create_thread(&f.store, f.project.id, f.trade.id)
        .await
        .unwrap()
        .value;

    send_message(&f.store, message(thread.id, Party::Gc, f.gc.user_id, "Can you start Monday?"))
        .await
        .unwrap();
    send_message(&f.store, message(thread.id, Party::Gc, f.gc.user_id, "Gate code is 4411"))
        .await
        .unwrap();

    let stored = f.store.find_thread(thread.id).await.unwrap().unwrap();
    assert_eq!(stored.unread_count_trade, 2);
    assert_eq!(stored.unread_count_gc, 0);
    assert_eq!(stored.last_message_preview.as_deref(), Some("Gate code is 4411"));
    assert!(stored.last_message_at.is_some());

    let read = mark_thread_as_read(&f.store, thread.id, Party::Trade).await.unwrap();
    assert_eq!(read.value.unread_count_trade, 0);

    send_message(&f.store, message(thread.id, Party::Trade, f.trade.user_id, "Yes"))
        .await
        .unwrap();
    let stored = f.store.find_thread(thread.id).await.unwrap().unwrap();
    assert_eq!(stored.unread_count_gc, 1);
    assert_eq!(stored.unread_count_trade, 0);
}

#[tokio::test]
async fn concurrent_sends_do_not_lose_increments() {
    let f = fixture().await;
    let thread = find_or_create_thread(&f.store, f.project.id, f.trade.id)
        .await
        .unwrap()
        .value;

    let (a, b, c) = tokio::join!(
        send_message(&f.store, message(thread.id, Party::Trade, f.trade.user_id, "one")),
        send_message(&f.store, message(thread.id, Party::Trade, f.trade.user_id, "two")),
        send_message(&f.store, message(thread.id, Party::Trade, f.trade.user_id, "three")),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let stored = f.store.find_thread(thread.id).await.unwrap().unwrap();
    assert_eq!(stored.unread_count_gc, 3);
}

#[tokio::test]
async fn preview_is_truncated_to_one_hundred_chars() {
    let f = fixture().await;
    let thread = find_or_create_thread(&f.store, f.project.id, f.trade.id)
        .await
        .unwrap()
        .value;
    let body = "b".repeat(150);
    let sent = send_message(&f.store, message(thread.id, Party::Gc, f.gc.user_id, &body))
        .await
        .unwrap();
    assert_eq!(sent.value.body.len(), 150);

    let stored = f.store.find_thread(thread.id).await.unwrap().unwrap();
    assert_eq!(stored.last_message_preview, Some("b".repeat(100)));
}

#[tokio::test]
async fn trade_cannot_post_in_announcement_thread() {
    let f = fixture().await;
    let thread = ensure_announcement_thread(&f.store, f.project.id)
        .await
        .unwrap()
        .value;

    let err = send_message(&f.store, message(thread.id, Party::Trade, f.trade.user_id, "hi"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Forbidden(_)));
    assert!(list_messages(&f.store, thread.id).await.unwrap().is_empty());

    send_message(&f.store, message(thread.id, Party::Gc, f.gc.user_id, "Site closed Friday"))
        .await
        .unwrap();
    assert_eq!(list_messages(&f.store, thread.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let f = fixture().await;
    let thread = find_or_create_thread(&f.store, f.project.id, f.trade.id)
        .await
        .unwrap()
        .value;
    let err = send_message(&f.store, message(thread.id, Party::Gc, f.gc.user_id, "   "))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn messages_are_listed_oldest_first() {
    let f = fixture().await;
    let thread = find_or_create_thread(&f.store, f.project.id, f.trade.id)
        .await
        .unwrap()
        .value;
    for body in ["first", "second", "third"] {
        send_message(&f.store, message(thread.id, Party::Gc, f.gc.user_id, body))
            .await
            .unwrap();
    }
    let bodies: Vec<String> = list_messages(&f.store, thread.id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.body)
        .collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn send_message_reports_affected_tags() {
    let f = fixture().await;
    let thread = find_or_create_thread(&f.store, f.project.id, f.trade.id)
        .await
        .unwrap()
        .value;
    let sent = send_message(&f.store, message(thread.id, Party::Gc, f.gc.user_id, "ok"))
        .await
        .unwrap();
    for tag in [
        CacheTag::Messages(thread.id),
        CacheTag::Thread(thread.id),
        CacheTag::ProjectThreads(f.project.id),
        CacheTag::TradeThreads(f.trade.id),
    ] {
        assert!(sent.invalidates.contains(&tag), "missing {tag}");
    }
}

// ---------------------------------------------------------------------------
// Flags and listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toggles_flip_flags() {
    let f = fixture().await;
    let thread = find_or_create_direct_thread(&f.store, f.gc.user_id, f.trade.id)
        .await
        .unwrap()
        .value;

    assert!(toggle_pinned(&f.store, thread.id).await.unwrap().value.pinned);
    assert!(!toggle_pinned(&f.store, thread.id).await.unwrap().value.pinned);
    assert!(toggle_archived(&f.store, thread.id).await.unwrap().value.archived);

    let err = toggle_pinned(&f.store, 9_999).await.unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn archived_threads_are_hidden_unless_requested() {
    let f = fixture().await;
    let other = create_profile(&f.store, 202, ProfileRole::Trade, "Roof Co").await;
    let kept = find_or_create_direct_thread(&f.store, f.gc.user_id, f.trade.id)
        .await
        .unwrap()
        .value;
    let archived = find_or_create_direct_thread(&f.store, f.gc.user_id, other.id)
        .await
        .unwrap()
        .value;
    toggle_archived(&f.store, archived.id).await.unwrap();

    let visible = list_direct_threads(&f.store, f.gc.user_id, false).await.unwrap();
    assert_eq!(visible.iter().map(|t| t.id).collect::<Vec<_>>(), vec![kept.id]);

    let all = list_direct_threads(&f.store, f.gc.user_id, true).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn trade_listing_puts_pinned_and_recent_first() {
    let f = fixture().await;
    let second_project = create_project(&f.store, f.gc.user_id, "Oak Ave addition").await;

    let quiet = find_or_create_thread(&f.store, f.project.id, f.trade.id)
        .await
        .unwrap()
        .value;
    let busy = find_or_create_thread(&f.store, second_project.id, f.trade.id)
        .await
        .unwrap()
        .value;
    let pinned = find_or_create_direct_thread(&f.store, f.gc.user_id, f.trade.id)
        .await
        .unwrap()
        .value;

    send_message(&f.store, message(busy.id, Party::Gc, f.gc.user_id, "update"))
        .await
        .unwrap();
    toggle_pinned(&f.store, pinned.id).await.unwrap();

    let ids: Vec<i64> = list_threads_for_trade(&f.store, f.trade.id, false)
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![pinned.id, busy.id, quiet.id]);
}

// ---------------------------------------------------------------------------
// Move to project
// ---------------------------------------------------------------------------

#[tokio::test]
async fn moving_a_direct_thread_links_the_trade() {
    let f = fixture().await;
    let direct = find_or_create_direct_thread(&f.store, f.gc.user_id, f.trade.id)
        .await
        .unwrap()
        .value;

    let moved = move_thread_to_project(
        &f.store,
        MoveThread {
            thread_id: direct.id,
            project_id: f.project.id,
            trade_profile_id: f.trade.id,
            added_by: f.gc.user_id,
        },
    )
    .await
    .unwrap();

    assert_eq!(moved.value.id, direct.id);
    assert_eq!(moved.value.thread_type, ThreadType::Project);
    assert_eq!(moved.value.project_id, Some(f.project.id));
    assert!(moved.invalidates.contains(&CacheTag::DirectThreads(f.gc.user_id)));
    assert!(moved.invalidates.contains(&CacheTag::ProjectThreads(f.project.id)));

    let link = f
        .store
        .find_project_trade_link(ProjectTradeKey {
            project_id: f.project.id,
            trade_profile_id: f.trade.id,
        })
        .await
        .unwrap();
    assert!(link.is_some());
    assert!(list_direct_threads(&f.store, f.gc.user_id, true)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn moving_a_project_thread_is_a_conflict() {
    let f = fixture().await;
    let thread = find_or_create_thread(&f.store, f.project.id, f.trade.id)
        .await
        .unwrap()
        .value;
    let err = move_thread_to_project(
        &f.store,
        MoveThread {
            thread_id: thread.id,
            project_id: f.project.id,
            trade_profile_id: f.trade.id,
            added_by: f.gc.user_id,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Conflict(_)));
}

#[tokio::test]
async fn moving_into_an_occupied_pair_is_a_conflict() {
    let f = fixture().await;
    let existing = find_or_create_thread(&f.store, f.project.id, f.trade.id)
        .await
        .unwrap()
        .value;
    let direct = find_or_create_direct_thread(&f.store, f.gc.user_id, f.trade.id)
        .await
        .unwrap()
        .value;

    let err = move_thread_to_project(
        &f.store,
        MoveThread {
            thread_id: direct.id,
            project_id: f.project.id,
            trade_profile_id: f.trade.id,
            added_by: f.gc.user_id,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Conflict(msg)) if msg.contains(&existing.id.to_string()));

    let unchanged = f.store.find_thread(direct.id).await.unwrap().unwrap();
    assert!(unchanged.is_direct());
}

#[tokio::test]
async fn only_the_owner_can_move_into_a_project() {
    let f = fixture().await;
    let outsider = create_profile(&f.store, 300, ProfileRole::GeneralContractor, "Other GC").await;
    let foreign = create_project(&f.store, outsider.user_id, "Not yours").await;
    let direct = find_or_create_direct_thread(&f.store, f.gc.user_id, f.trade.id)
        .await
        .unwrap()
        .value;

    let err = move_thread_to_project(
        &f.store,
        MoveThread {
            thread_id: direct.id,
            project_id: foreign.id,
            trade_profile_id: f.trade.id,
            added_by: f.gc.user_id,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Forbidden(_)));
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn participant_party_resolves_each_side() {
    let f = fixture().await;
    let outsider = create_profile(&f.store, 400, ProfileRole::Trade, "Stranger").await;
    let announcement = ensure_announcement_thread(&f.store, f.project.id)
        .await
        .unwrap()
        .value;
    ensure_project_trade_link(&f.store, f.project.id, f.trade.id, f.gc.user_id)
        .await
        .unwrap();

    let gc_side = participant_party(&f.store, &announcement, f.gc.user_id, Some(f.gc.id))
        .await
        .unwrap();
    assert_eq!(gc_side, Some(Party::Gc));

    let trade_side =
        participant_party(&f.store, &announcement, f.trade.user_id, Some(f.trade.id))
            .await
            .unwrap();
    assert_eq!(trade_side, Some(Party::Trade));

    let stranger = participant_party(&f.store, &announcement, outsider.user_id, Some(outsider.id))
        .await
        .unwrap();
    assert_eq!(stranger, None);
}
