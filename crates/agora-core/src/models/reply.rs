use nostr_sdk::prelude::*;
use serde::Serialize;

use super::community::CommunityId;
use super::tag_utils;
use crate::constants::kinds;

/// A reply within a community thread.
///
/// The wire convention is that the *last* `e` tag references the direct
/// parent (a post or another reply); earlier `e` tags reference ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub id: EventId,
    pub author: PublicKey,
    pub created_at: Timestamp,
    pub content: String,
    /// Direct parent, taken from the last `e` tag.
    pub parent_id: EventId,
    /// All `e`-tag references in wire order.
    pub referenced: Vec<EventId>,
}

impl Reply {
    /// Classify an event as a reply in `community`.
    ///
    /// Reply detection: reply kind + at least one parseable `e` tag +
    /// community reference (either tag-name convention).
    pub fn from_event(event: &Event, community: &CommunityId) -> Option<Self> {
        if event.kind.as_u16() != kinds::GROUP_POST_REPLY {
            return None;
        }

        let referenced = tag_utils::event_tag_values(event);
        let parent_id = *referenced.last()?;

        community.reference_convention(event)?;

        Some(Self {
            id: event.id,
            author: event.pubkey,
            created_at: event.created_at,
            content: event.content.clone(),
            parent_id,
            referenced,
        })
    }

    pub fn is_direct_reply_to(&self, root: &EventId) -> bool {
        self.parent_id == *root
    }
}
