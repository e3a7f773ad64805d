//! Community identifier codec.
//!
//! A community is addressed by the coordinate of its definition event,
//! serialized as `kind:author-pubkey:identifier`. The same string is used
//! as a filter value, as the `a`/`A` tag value on posts and replies, and as
//! the `d` tag value on moderation lists.
//!
//! Two tag-name conventions exist in the wild for the community reference:
//! the canonical lowercase `a` and a legacy uppercase `A` written by older
//! clients. Both are accepted on read (signed events cannot be rewritten);
//! only the lowercase form is emitted.

use std::fmt;
use std::str::FromStr;

use nostr_sdk::prelude::*;
use serde::Serialize;

use crate::constants::kinds;
use crate::error::CoreError;

/// Which tag-name convention carried the community reference on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefConvention {
    /// Lowercase `a` tag.
    Canonical,
    /// Uppercase `A` tag only (legacy writers).
    Legacy,
}

/// Composite key addressing a community's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CommunityId {
    pub kind: u16,
    /// The community author. Only list events signed by this key are
    /// trusted for moderation state.
    pub pubkey: PublicKey,
    pub identifier: String,
}

impl CommunityId {
    pub fn new(pubkey: PublicKey, identifier: impl Into<String>) -> Self {
        Self {
            kind: kinds::COMMUNITY_DEFINITION,
            pubkey,
            identifier: identifier.into(),
        }
    }

    /// The canonical lowercase community-reference tag.
    pub fn a_tag(&self, relay_hint: Option<&str>) -> Tag {
        let mut values = vec![self.to_string()];
        if let Some(relay) = relay_hint {
            values.push(relay.to_string());
        }
        Tag::custom(
            TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::A)),
            values,
        )
    }

    /// Tags for a new top-level post in this community.
    pub fn post_tags(&self, relay_hint: Option<&str>) -> Vec<Tag> {
        vec![self.a_tag(relay_hint)]
    }

    /// Tags for a reply to `parent_id`.
    ///
    /// The parent `e` tag is emitted last: consumers treat the final
    /// event-reference tag as the direct parent, so ordering is part of the
    /// wire contract.
    pub fn reply_tags(
        &self,
        parent_id: &EventId,
        parent_author: &PublicKey,
        relay_hint: Option<&str>,
    ) -> Vec<Tag> {
        let relay = relay_hint.unwrap_or_default();
        vec![
            self.a_tag(relay_hint),
            Tag::custom(
                TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::P)),
                vec![parent_author.to_hex(), relay.to_string()],
            ),
            Tag::custom(
                TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::E)),
                vec![
                    parent_id.to_hex(),
                    relay.to_string(),
                    parent_author.to_hex(),
                ],
            ),
        ]
    }

    /// Whether the event references this community under either tag-name
    /// convention. Matching is exact string equality on the serialized id.
    pub fn matches_event(&self, event: &Event) -> bool {
        self.reference_convention(event).is_some()
    }

    /// As `matches_event`, reporting which convention matched. A canonical
    /// tag wins over a legacy one when both are present.
    pub fn reference_convention(&self, event: &Event) -> Option<RefConvention> {
        let id = self.to_string();
        let mut legacy = false;
        for tag in event.tags.iter() {
            let t = tag.as_slice();
            if t.len() < 2 || t[1] != id {
                continue;
            }
            match t[0].as_str() {
                "a" => return Some(RefConvention::Canonical),
                "A" => legacy = true,
                _ => {}
            }
        }
        legacy.then_some(RefConvention::Legacy)
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.pubkey.to_hex(), self.identifier)
    }
}

impl FromStr for CommunityId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoreError::MalformedCommunityId(s.to_string());

        let mut parts = s.splitn(3, ':');
        let (Some(kind), Some(pubkey), Some(identifier)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let kind: u16 = kind.parse().map_err(|_| malformed())?;
        let pubkey = PublicKey::from_hex(pubkey).map_err(|_| malformed())?;
        if identifier.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            kind,
            pubkey,
            identifier: identifier.to_string(),
        })
    }
}
