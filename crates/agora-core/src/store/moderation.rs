//! Moderation state resolution.
//!
//! Moderation is encoded as author-scoped list events: removals, pinned
//! posts, approved and banned members. Only events signed by the community
//! author are trusted; a list event from any other pubkey is discarded no
//! matter what its tags claim, which is what stops spoofed moderation.
//!
//! Each state resolves independently: a failed fetch degrades that state to
//! its empty value without blocking the others. The resolved snapshot is
//! immutable; a new resolution cycle produces a whole new snapshot.

use std::collections::HashSet;

use nostr_sdk::prelude::*;

use crate::cancel::CancelToken;
use crate::config::CoreConfig;
use crate::constants::{kinds, APPROVAL_QUERY_LIMIT};
use crate::error::CoreError;
use crate::models::{tag_utils, CommunityId};
use crate::nostr::EventStore;
use crate::store::merge::merged_query;

/// Immutable snapshot of a community's moderation state.
#[derive(Debug, Clone, Default)]
pub struct ModerationState {
    pub removed: HashSet<EventId>,
    pub pinned: HashSet<EventId>,
    pub approved: HashSet<PublicKey>,
    pub banned: HashSet<PublicKey>,
}

impl ModerationState {
    pub fn is_removed(&self, id: &EventId) -> bool {
        self.removed.contains(id)
    }

    pub fn is_pinned(&self, id: &EventId) -> bool {
        self.pinned.contains(id)
    }

    pub fn is_approved(&self, pubkey: &PublicKey) -> bool {
        self.approved.contains(pubkey)
    }

    pub fn is_banned(&self, pubkey: &PublicKey) -> bool {
        self.banned.contains(pubkey)
    }
}

/// Whether a moderation event is trusted for this community.
pub fn is_authoritative(event: &Event, community: &CommunityId) -> bool {
    event.pubkey == community.pubkey
}

/// Union of removed post ids across all authoritative removal events.
pub fn removed_post_ids(events: &[Event], community: &CommunityId) -> HashSet<EventId> {
    let mut removed = HashSet::new();
    for event in events {
        if !is_authoritative(event, community) {
            tracing::debug!(author = %event.pubkey, "ignoring removal event from non-authoritative author");
            continue;
        }
        removed.extend(tag_utils::event_tag_values(event));
    }
    removed
}

/// Pick the current list event of `kind` for this community.
///
/// Queries are shaped server-side with `authors` + `#d` + `limit:1`, but
/// relays are untrusted and may return stale, extra, or forged candidates,
/// so everything is re-checked here and the newest `created_at` wins.
pub fn newest_list<'a>(
    events: &'a [Event],
    kind: u16,
    community: &CommunityId,
) -> Option<&'a Event> {
    let community_id = community.to_string();
    events
        .iter()
        .filter(|event| event.kind.as_u16() == kind)
        .filter(|event| {
            if !is_authoritative(event, community) {
                tracing::debug!(author = %event.pubkey, kind, "ignoring list event from non-authoritative author");
                return false;
            }
            tag_utils::identifier_tag(event) == Some(community_id.as_str())
        })
        .max_by_key(|event| event.created_at)
}

/// Post ids of a pinned-posts list event.
pub fn pinned_post_ids(list: Option<&Event>) -> HashSet<EventId> {
    list.map(|event| tag_utils::event_tag_values(event).into_iter().collect())
        .unwrap_or_default()
}

/// Member pubkeys of an approved/declined/banned list event.
pub fn listed_members(list: Option<&Event>) -> HashSet<PublicKey> {
    list.map(|event| tag_utils::pubkey_tag_values(event).into_iter().collect())
        .unwrap_or_default()
}

/// Filter for the community's removal events.
pub fn removal_filter(community: &CommunityId, limit: usize) -> Filter {
    Filter::new()
        .kind(Kind::from(kinds::POST_REMOVAL))
        .author(community.pubkey)
        .custom_tag(
            SingleLetterTag::lowercase(Alphabet::A),
            community.to_string(),
        )
        .limit(limit)
}

/// Filter for the community's current list event of `kind`.
///
/// `limit:1` is shaping only; correctness comes from [`newest_list`].
pub fn list_filter(kind: u16, community: &CommunityId) -> Filter {
    Filter::new()
        .kind(Kind::from(kind))
        .author(community.pubkey)
        .identifier(community.to_string())
        .limit(1)
}

/// Resolve a fresh moderation snapshot.
///
/// The four states fetch concurrently; each one degrades to empty on its
/// own fetch failure. Only cancellation aborts the whole resolution.
pub async fn resolve<S: EventStore>(
    store: &S,
    community: &CommunityId,
    config: &CoreConfig,
    cancel: &CancelToken,
) -> Result<ModerationState, CoreError> {
    let (removals, pinned, approved, banned) = tokio::join!(
        merged_query(
            store,
            vec![removal_filter(community, config.removal_limit)],
            config.list_timeout,
            cancel,
        ),
        merged_query(
            store,
            vec![list_filter(kinds::PINNED_POSTS, community)],
            config.list_timeout,
            cancel,
        ),
        merged_query(
            store,
            vec![list_filter(kinds::APPROVED_MEMBERS, community)],
            config.list_timeout,
            cancel,
        ),
        merged_query(
            store,
            vec![list_filter(kinds::BANNED_MEMBERS, community)],
            config.list_timeout,
            cancel,
        ),
    );

    let removals = removals?;
    let pinned = pinned?;
    let approved = approved?;
    let banned = banned?;

    Ok(ModerationState {
        removed: removed_post_ids(&removals, community),
        pinned: pinned_post_ids(newest_list(&pinned, kinds::PINNED_POSTS, community)),
        approved: listed_members(newest_list(&approved, kinds::APPROVED_MEMBERS, community)),
        banned: listed_members(newest_list(&banned, kinds::BANNED_MEMBERS, community)),
    })
}

/// Approvals published for this community, newest first. Approvals may come
/// from any moderator, so they are not filtered by author here; callers can
/// check authority per approval if they need to.
pub async fn fetch_post_approvals<S: EventStore>(
    store: &S,
    community: &CommunityId,
    config: &CoreConfig,
    cancel: &CancelToken,
) -> Result<Vec<Event>, CoreError> {
    let filter = Filter::new()
        .kind(Kind::from(kinds::POST_APPROVAL))
        .custom_tag(
            SingleLetterTag::lowercase(Alphabet::A),
            community.to_string(),
        )
        .limit(APPROVAL_QUERY_LIMIT);

    let mut approvals = merged_query(store, vec![filter], config.list_timeout, cancel).await?;
    approvals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(approvals)
}

/// The most recent approval of a single post, if any.
pub async fn fetch_post_approval<S: EventStore>(
    store: &S,
    community: &CommunityId,
    post_id: &EventId,
    config: &CoreConfig,
    cancel: &CancelToken,
) -> Result<Option<Event>, CoreError> {
    let filter = Filter::new()
        .kind(Kind::from(kinds::POST_APPROVAL))
        .custom_tag(
            SingleLetterTag::lowercase(Alphabet::A),
            community.to_string(),
        )
        .event(*post_id)
        .limit(10);

    let approvals = merged_query(store, vec![filter], config.list_timeout, cancel).await?;
    Ok(approvals
        .into_iter()
        .max_by_key(|event| event.created_at))
}
