use nostr_sdk::prelude::*;
use serde::Serialize;

use super::community::{CommunityId, RefConvention};
use super::tag_utils;
use crate::constants::kinds;

/// A top-level community post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: EventId,
    pub author: PublicKey,
    pub created_at: Timestamp,
    pub content: String,
    /// Filled in by the feed builder from the current pinned list.
    pub pinned: bool,
}

impl Post {
    /// Classify an event as a top-level post in `community`.
    ///
    /// Post detection: post kind + community reference + NO `e` tags.
    /// Legacy data mixes reply kinds into the top-level range, so both post
    /// kinds are accepted and the `e`-tag check does the disambiguation.
    pub fn from_event(event: &Event, community: &CommunityId) -> Option<Self> {
        let kind = event.kind.as_u16();
        if kind != kinds::GROUP_POST && kind != kinds::GROUP_POST_REPLY {
            return None;
        }

        // Anything carrying an event reference is a reply, not a post.
        if tag_utils::has_event_tag(event) {
            return None;
        }

        match community.reference_convention(event)? {
            RefConvention::Canonical => {}
            RefConvention::Legacy => {
                tracing::debug!(id = %event.id, "post references community via legacy uppercase tag");
            }
        }

        Some(Self {
            id: event.id,
            author: event.pubkey,
            created_at: event.created_at,
            content: event.content.clone(),
            pinned: false,
        })
    }
}
