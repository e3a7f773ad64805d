//! Application-wide constants
//!
//! Centralized location for magic numbers and default strings that are
//! used across multiple modules.

/// Default Nostr relay URL
pub const RELAY_URL: &str = "wss://relay.damus.io";

// Fetch defaults
pub const FEED_FETCH_TIMEOUT_SECS: u64 = 5;
pub const LIST_FETCH_TIMEOUT_SECS: u64 = 3;
pub const PUBLISH_TIMEOUT_SECS: u64 = 5;

// Query limits. Relays may return more or fewer; limits are shaping only.
pub const DEFAULT_FEED_LIMIT: usize = 50;
pub const REPLY_QUERY_LIMIT: usize = 200;
pub const REACTION_QUERY_LIMIT: usize = 500;
pub const REMOVAL_QUERY_LIMIT: usize = 500;
pub const APPROVAL_QUERY_LIMIT: usize = 100;
pub const ACTIVITY_QUERY_LIMIT: usize = 1000;

/// Posts sampled when deriving member/activity statistics.
pub const STATS_POST_LIMIT: usize = 500;

/// Recent events retained on an activity summary after counting.
pub const ACTIVITY_RECENT_KEEP: usize = 100;

/// Maximum ancestor hops when deciding whether a reply belongs to a thread.
/// Malformed or cyclic reply graphs terminate at this bound.
pub const ANCESTRY_DEPTH_CAP: usize = 3;

/// Suggested visual nesting cap for reply trees. Presentation concern only;
/// the adjacency structure itself is unbounded.
pub const DISPLAY_NESTING_CAP: usize = 5;

// Staleness windows for the query cache, matching how quickly each class
// of data is expected to move.
pub const POSTS_STALE_SECS: u64 = 10;
pub const REPLIES_STALE_SECS: u64 = 5;
pub const REACTIONS_STALE_SECS: u64 = 30;
pub const LISTS_STALE_SECS: u64 = 2 * 60;

// Activity windows
pub const DAY_SECS: u64 = 24 * 60 * 60;
pub const WEEK_SECS: u64 = 7 * DAY_SECS;
pub const ACTIVITY_WINDOW_SECS: u64 = 30 * DAY_SECS;

// Default content for events published on the user's behalf
pub const DEFAULT_JOIN_MESSAGE: &str = "Requesting to join this community.";
pub const DEFAULT_LEAVE_MESSAGE: &str = "Leaving this community.";
pub const DEFAULT_REMOVAL_REASON: &str = "Post removed by moderator";
pub const REACTION_RETRACTION_NOTE: &str = "Removed reaction";

// Nostr event kinds used by agora
pub mod kinds {
    /// Top-level community post
    pub const GROUP_POST: u16 = 11;
    /// Reply to a community post (NIP-22 comment)
    pub const GROUP_POST_REPLY: u16 = 1111;
    /// Reaction (NIP-25)
    pub const REACTION: u16 = 7;
    /// Deletion request (NIP-09), used to retract reactions
    pub const DELETION: u16 = 5;
    /// Community definition (NIP-72, addressable)
    pub const COMMUNITY_DEFINITION: u16 = 34550;
    /// Moderator approval of a post
    pub const POST_APPROVAL: u16 = 4550;
    /// Moderator removal of a post
    pub const POST_REMOVAL: u16 = 4551;
    /// Request to join a community
    pub const JOIN_REQUEST: u16 = 4552;
    /// Request to leave a community
    pub const LEAVE_REQUEST: u16 = 4553;
    /// Approved members list (addressable, d = community id)
    pub const APPROVED_MEMBERS: u16 = 34551;
    /// Declined members list (addressable, d = community id)
    pub const DECLINED_MEMBERS: u16 = 34552;
    /// Banned members list (addressable, d = community id)
    pub const BANNED_MEMBERS: u16 = 34553;
    /// Pinned posts list (addressable, d = community id)
    pub const PINNED_POSTS: u16 = 34554;
}
