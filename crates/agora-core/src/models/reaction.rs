//! Reaction classification and aggregation (NIP-25).

use nostr_sdk::prelude::*;
use serde::Serialize;

use crate::constants::kinds;

/// Semantic class of a reaction, derived from its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReactionKind {
    Like,
    Dislike,
    Emoji,
}

impl ReactionKind {
    /// `"+"` and the empty string are likes, `"-"` is a dislike, anything
    /// else is treated as a free-form emoji reaction.
    pub fn classify(content: &str) -> Self {
        match content {
            "+" | "" => Self::Like,
            "-" => Self::Dislike,
            _ => Self::Emoji,
        }
    }
}

/// Reactions to a single target, grouped by semantic class.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReactionSummary {
    pub likes: Vec<Event>,
    pub dislikes: Vec<Event>,
    pub emoji: Vec<Event>,
}

impl ReactionSummary {
    /// Group reaction events by class. Non-reaction kinds are ignored.
    pub fn aggregate(reactions: &[Event]) -> Self {
        let mut summary = Self::default();
        for reaction in reactions {
            if reaction.kind.as_u16() != kinds::REACTION {
                continue;
            }
            match ReactionKind::classify(&reaction.content) {
                ReactionKind::Like => summary.likes.push(reaction.clone()),
                ReactionKind::Dislike => summary.dislikes.push(reaction.clone()),
                ReactionKind::Emoji => summary.emoji.push(reaction.clone()),
            }
        }
        summary
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn dislike_count(&self) -> usize {
        self.dislikes.len()
    }
}

/// The current user's own reaction to a target, for toggle rendering.
#[derive(Debug, Clone, Default)]
pub struct UserReaction {
    pub has_liked: bool,
    pub has_disliked: bool,
    /// The user's reaction event, needed to retract it. The protocol allows
    /// several concurrent reactions from one author; the first match in the
    /// collection wins, which makes the tie-break non-deterministic.
    pub reaction: Option<Event>,
}

impl UserReaction {
    pub fn resolve(reactions: &[Event], user: &PublicKey) -> Self {
        let own = reactions
            .iter()
            .find(|r| r.kind.as_u16() == kinds::REACTION && r.pubkey == *user)
            .cloned();

        match &own {
            Some(event) => {
                let kind = ReactionKind::classify(&event.content);
                Self {
                    has_liked: kind == ReactionKind::Like,
                    has_disliked: kind == ReactionKind::Dislike,
                    reaction: own,
                }
            }
            None => Self::default(),
        }
    }
}

/// Tags for a new reaction to `target`, per NIP-25: the reacted-to event,
/// its author, its kind, and (for addressable targets) its coordinate.
pub fn reaction_tags(target: &Event, relay_hint: Option<&str>) -> Vec<Tag> {
    let relay = relay_hint.unwrap_or_default();
    let mut tags = vec![
        Tag::custom(
            TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::E)),
            vec![
                target.id.to_hex(),
                relay.to_string(),
                target.pubkey.to_hex(),
            ],
        ),
        Tag::custom(
            TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::P)),
            vec![target.pubkey.to_hex(), relay.to_string()],
        ),
        Tag::custom(
            TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::K)),
            vec![target.kind.as_u16().to_string()],
        ),
    ];

    if target.kind.is_addressable() {
        if let Some(d) = super::tag_utils::identifier_tag(target) {
            tags.push(Tag::custom(
                TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::A)),
                vec![
                    format!("{}:{}:{}", target.kind.as_u16(), target.pubkey.to_hex(), d),
                    relay.to_string(),
                    target.pubkey.to_hex(),
                ],
            ));
        }
    }

    tags
}
