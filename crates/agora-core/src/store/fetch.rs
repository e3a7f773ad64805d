//! Query composition for community data.
//!
//! Every community-scoped fetch has to cover both tag-name conventions, so
//! the builders here return filter *sets* for the merger rather than single
//! filters.

use nostr_sdk::prelude::*;

use crate::constants::{kinds, ACTIVITY_QUERY_LIMIT, ACTIVITY_WINDOW_SECS};
use crate::models::CommunityId;

/// The same base filter under the canonical `#a` and legacy `#A` keys.
pub fn community_ref_filters(base: Filter, community: &CommunityId) -> Vec<Filter> {
    let id = community.to_string();
    vec![
        base.clone()
            .custom_tag(SingleLetterTag::lowercase(Alphabet::A), id.clone()),
        base.custom_tag(SingleLetterTag::uppercase(Alphabet::A), id),
    ]
}

/// Filters for top-level feed candidates.
pub fn post_filters(community: &CommunityId, limit: usize) -> Vec<Filter> {
    let base = Filter::new()
        .kinds(vec![
            Kind::from(kinds::GROUP_POST),
            Kind::from(kinds::GROUP_POST_REPLY),
        ])
        .limit(limit);
    community_ref_filters(base, community)
}

/// Filters for reply candidates of a thread.
///
/// Three variants so no reply is missed: direct references to the root, and
/// all community replies under either convention (indirect replies do not
/// necessarily `e`-tag the root).
pub fn thread_filters(community: &CommunityId, root: &EventId, limit: usize) -> Vec<Filter> {
    let by_root = Filter::new()
        .kind(Kind::from(kinds::GROUP_POST_REPLY))
        .event(*root)
        .limit(limit);
    let base = Filter::new()
        .kind(Kind::from(kinds::GROUP_POST_REPLY))
        .limit(limit);

    let mut filters = vec![by_root];
    filters.extend(community_ref_filters(base, community));
    filters
}

/// Filter for reactions to a single event.
pub fn reaction_filters(target: &EventId, limit: usize) -> Vec<Filter> {
    vec![Filter::new()
        .kind(Kind::from(kinds::REACTION))
        .event(*target)
        .limit(limit)]
}

/// Filters for recent community activity (posts and replies).
pub fn activity_filters(community: &CommunityId, now: Timestamp) -> Vec<Filter> {
    let base = Filter::new()
        .kinds(vec![
            Kind::from(kinds::GROUP_POST),
            Kind::from(kinds::GROUP_POST_REPLY),
        ])
        .since(now - ACTIVITY_WINDOW_SECS)
        .limit(ACTIVITY_QUERY_LIMIT);
    community_ref_filters(base, community)
}
