//! Shared test fixtures: an in-memory relay double, a capturing publisher,
//! and event builders for the community kinds.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use nostr_sdk::prelude::*;
use parking_lot::Mutex;

use crate::cancel::CancelToken;
use crate::constants::kinds;
use crate::error::CoreError;
use crate::models::CommunityId;
use crate::nostr::{EventPublisher, EventStore};

/// Minimal relay semantics: return every stored event matching the filter.
/// No ordering, no dedup, no completeness guarantees, like the real thing.
pub fn filter_matches(filter: &Filter, event: &Event) -> bool {
    if let Some(ids) = &filter.ids {
        if !ids.contains(&event.id) {
            return false;
        }
    }
    if let Some(authors) = &filter.authors {
        if !authors.contains(&event.pubkey) {
            return false;
        }
    }
    if let Some(filter_kinds) = &filter.kinds {
        if !filter_kinds.contains(&event.kind) {
            return false;
        }
    }
    if let Some(since) = filter.since {
        if event.created_at < since {
            return false;
        }
    }
    if let Some(until) = filter.until {
        if event.created_at > until {
            return false;
        }
    }
    for (letter, values) in filter.generic_tags.iter() {
        let name = letter.to_string();
        let found = event.tags.iter().any(|tag| {
            let t = tag.as_slice();
            t.len() >= 2 && t[0] == name && values.contains(&t[1])
        });
        if !found {
            return false;
        }
    }
    true
}

/// In-memory [`EventStore`] with per-kind failure and hang injection.
#[derive(Debug, Default)]
pub struct MockStore {
    events: Vec<Event>,
    fail_kinds: HashSet<u16>,
    hang_kinds: HashSet<u16>,
    pub query_count: AtomicUsize,
}

impl MockStore {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Queries whose kind set includes `kind` fail with an error.
    pub fn failing_for(mut self, kind: u16) -> Self {
        self.fail_kinds.insert(kind);
        self
    }

    /// Queries whose kind set includes `kind` never complete in time.
    pub fn hanging_for(mut self, kind: u16) -> Self {
        self.hang_kinds.insert(kind);
        self
    }

    pub fn queries(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    fn kind_flagged(&self, filter: &Filter, flagged: &HashSet<u16>) -> bool {
        filter
            .kinds
            .as_ref()
            .is_some_and(|ks| ks.iter().any(|k| flagged.contains(&k.as_u16())))
    }
}

impl EventStore for MockStore {
    async fn query(&self, filter: Filter, _cancel: &CancelToken) -> Result<Vec<Event>> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        if self.kind_flagged(&filter, &self.fail_kinds) {
            bail!("simulated relay failure");
        }
        if self.kind_flagged(&filter, &self.hang_kinds) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        Ok(self
            .events
            .iter()
            .filter(|event| filter_matches(&filter, event))
            .cloned()
            .collect())
    }
}

/// [`EventPublisher`] that signs locally and records instead of sending.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    keys: Option<Keys>,
    pub sent: Mutex<Vec<Event>>,
}

impl MemoryPublisher {
    pub fn new(keys: Keys) -> Self {
        Self {
            keys: Some(keys),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn last_sent(&self) -> Option<Event> {
        self.sent.lock().last().cloned()
    }
}

impl EventPublisher for MemoryPublisher {
    fn pubkey(&self) -> Option<PublicKey> {
        self.keys.as_ref().map(|keys| keys.public_key())
    }

    async fn publish(&self, kind: Kind, content: &str, tags: Vec<Tag>) -> Result<Event, CoreError> {
        let keys = self.keys.as_ref().ok_or(CoreError::NotLoggedIn)?;
        let builder = tags
            .into_iter()
            .fold(EventBuilder::new(kind, content), |builder, tag| {
                builder.tag(tag)
            });
        let event = builder
            .sign_with_keys(keys)
            .map_err(|e| CoreError::Publish(e.to_string()))?;
        self.sent.lock().push(event.clone());
        Ok(event)
    }
}

/// A community plus its author keys, for minting authoritative list events.
pub struct TestCommunity {
    pub keys: Keys,
    pub id: CommunityId,
}

pub fn test_community() -> TestCommunity {
    let keys = Keys::generate();
    let id = CommunityId::new(keys.public_key(), "test-room");
    TestCommunity { keys, id }
}

fn community_ref_tag(name: &str, community: &CommunityId) -> Tag {
    Tag::custom(
        TagKind::Custom(std::borrow::Cow::Owned(name.to_string())),
        vec![community.to_string()],
    )
}

fn e_tag(id: &EventId) -> Tag {
    Tag::custom(
        TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::E)),
        vec![id.to_hex()],
    )
}

pub fn post_event(community: &CommunityId, keys: &Keys, content: &str, created_at: u64) -> Event {
    EventBuilder::new(Kind::from(kinds::GROUP_POST), content)
        .tag(community_ref_tag("a", community))
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(keys)
        .expect("sign post")
}

/// A post written under the legacy uppercase community-reference tag.
pub fn legacy_post_event(
    community: &CommunityId,
    keys: &Keys,
    content: &str,
    created_at: u64,
) -> Event {
    EventBuilder::new(Kind::from(kinds::GROUP_POST), content)
        .tag(community_ref_tag("A", community))
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(keys)
        .expect("sign post")
}

/// A reply whose last `e` tag is the direct parent.
pub fn reply_event(
    community: &CommunityId,
    keys: &Keys,
    refs: &[EventId],
    created_at: u64,
) -> Event {
    let mut builder = EventBuilder::new(Kind::from(kinds::GROUP_POST_REPLY), "reply")
        .tag(community_ref_tag("a", community))
        .custom_created_at(Timestamp::from(created_at));
    for r in refs {
        builder = builder.tag(e_tag(r));
    }
    builder.sign_with_keys(keys).expect("sign reply")
}

pub fn removal_event(community: &CommunityId, signer: &Keys, removed: &[EventId]) -> Event {
    let mut builder = EventBuilder::new(Kind::from(kinds::POST_REMOVAL), "removed")
        .tag(community_ref_tag("a", community));
    for id in removed {
        builder = builder.tag(e_tag(id));
    }
    builder.sign_with_keys(signer).expect("sign removal")
}

pub fn pinned_list_event(
    community: &CommunityId,
    signer: &Keys,
    pinned: &[EventId],
    created_at: u64,
) -> Event {
    let mut builder = EventBuilder::new(Kind::from(kinds::PINNED_POSTS), "")
        .tag(Tag::identifier(community.to_string()))
        .custom_created_at(Timestamp::from(created_at));
    for id in pinned {
        builder = builder.tag(e_tag(id));
    }
    builder.sign_with_keys(signer).expect("sign pinned list")
}

pub fn member_list_event(
    kind: u16,
    community: &CommunityId,
    signer: &Keys,
    members: &[PublicKey],
    created_at: u64,
) -> Event {
    let mut builder = EventBuilder::new(Kind::from(kind), "")
        .tag(Tag::identifier(community.to_string()))
        .custom_created_at(Timestamp::from(created_at));
    for member in members {
        builder = builder.tag(Tag::custom(
            TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::P)),
            vec![member.to_hex()],
        ));
    }
    builder.sign_with_keys(signer).expect("sign member list")
}

pub fn reaction_event(target: &Event, keys: &Keys, content: &str) -> Event {
    EventBuilder::new(Kind::from(kinds::REACTION), content)
        .tag(e_tag(&target.id))
        .sign_with_keys(keys)
        .expect("sign reaction")
}
