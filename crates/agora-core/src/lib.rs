//! agora-core: feed, thread and moderation engine for Nostr moderated
//! communities.
//!
//! The engine turns an unordered, duplicate-prone, multi-relay stream of
//! signed events into a moderated top-level feed, nested reply threads and
//! current pin/ban/approval state. Relay transport and key custody sit
//! behind the [`nostr::EventStore`] and [`nostr::EventPublisher`] seams;
//! everything inside is deterministic and testable without a network.

pub mod cancel;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod nostr;
pub mod service;
pub mod stats;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::{cancellation, CancelHandle, CancelToken};
pub use config::CoreConfig;
pub use error::CoreError;
pub use models::{CommunityId, Post, ReactionKind, ReactionSummary, Reply, UserReaction};
pub use nostr::{EventPublisher, EventStore, RelayPublisher, RelayStore};
pub use service::CommunityService;
pub use stats::{ActivitySummary, CommunityStats};
pub use store::{build_feed, merged_query, resolve_thread, ModerationState, QueryCache, ThreadView};
