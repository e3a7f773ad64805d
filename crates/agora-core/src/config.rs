use std::time::Duration;

use crate::constants::{
    ANCESTRY_DEPTH_CAP, DEFAULT_FEED_LIMIT, FEED_FETCH_TIMEOUT_SECS, LISTS_STALE_SECS,
    LIST_FETCH_TIMEOUT_SECS, POSTS_STALE_SECS, REACTIONS_STALE_SECS, REACTION_QUERY_LIMIT,
    REMOVAL_QUERY_LIMIT, REPLIES_STALE_SECS, REPLY_QUERY_LIMIT,
};

/// Tuning knobs for the fetch and resolution pipeline.
///
/// Everything here is shaping, not correctness. The one exception is
/// `ancestry_depth_cap`, which bounds the thread-membership walk and must
/// stay finite.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Per-logical-fetch timeout for feed and reply queries.
    pub feed_timeout: Duration,
    /// Per-logical-fetch timeout for moderation lists and reactions.
    pub list_timeout: Duration,
    pub feed_limit: usize,
    pub reply_limit: usize,
    pub reaction_limit: usize,
    pub removal_limit: usize,
    /// Maximum ancestor hops for thread membership resolution.
    pub ancestry_depth_cap: usize,
    pub posts_stale_after: Duration,
    pub replies_stale_after: Duration,
    pub reactions_stale_after: Duration,
    pub lists_stale_after: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            feed_timeout: Duration::from_secs(FEED_FETCH_TIMEOUT_SECS),
            list_timeout: Duration::from_secs(LIST_FETCH_TIMEOUT_SECS),
            feed_limit: DEFAULT_FEED_LIMIT,
            reply_limit: REPLY_QUERY_LIMIT,
            reaction_limit: REACTION_QUERY_LIMIT,
            removal_limit: REMOVAL_QUERY_LIMIT,
            ancestry_depth_cap: ANCESTRY_DEPTH_CAP,
            posts_stale_after: Duration::from_secs(POSTS_STALE_SECS),
            replies_stale_after: Duration::from_secs(REPLIES_STALE_SECS),
            reactions_stale_after: Duration::from_secs(REACTIONS_STALE_SECS),
            lists_stale_after: Duration::from_secs(LISTS_STALE_SECS),
        }
    }
}
