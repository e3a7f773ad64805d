//! Feed filtering and ordering.

use nostr_sdk::prelude::*;

use crate::models::{CommunityId, Post};
use crate::store::moderation::ModerationState;

/// Build the moderated top-level feed from raw post candidates.
///
/// Pure and deterministic: removed posts drop out (removal beats pinning),
/// reply-shaped events drop out, community membership is exact string
/// equality, and ordering is pinned-first then newest-first. The sort is
/// stable, so events with equal keys keep their input order.
pub fn build_feed(
    events: &[Event],
    moderation: &ModerationState,
    community: &CommunityId,
) -> Vec<Post> {
    let mut posts: Vec<Post> = events
        .iter()
        .filter_map(|event| Post::from_event(event, community))
        .filter(|post| !moderation.is_removed(&post.id))
        .map(|mut post| {
            post.pinned = moderation.is_pinned(&post.id);
            post
        })
        .collect();

    posts.sort_by(|a, b| {
        b.pinned
            .cmp(&a.pinned)
            .then(b.created_at.cmp(&a.created_at))
    });
    posts
}
