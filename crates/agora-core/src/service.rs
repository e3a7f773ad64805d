//! High-level community API.
//!
//! `CommunityService` owns the query cache and composes the fetch, merge
//! and resolution layers into the operations a view layer needs: the
//! moderated feed, reply threads, reactions, stats, and the publish
//! operations that mutate community state. Reads degrade to conservative
//! empty values on relay trouble; writes require a logged-in identity and
//! surface publish failures to the caller.

use std::collections::HashSet;
use std::time::Duration;

use nostr_sdk::prelude::*;

use crate::cancel::CancelToken;
use crate::config::CoreConfig;
use crate::constants::{
    kinds, DEFAULT_JOIN_MESSAGE, DEFAULT_LEAVE_MESSAGE, DEFAULT_REMOVAL_REASON,
    REACTION_RETRACTION_NOTE, STATS_POST_LIMIT,
};
use crate::error::CoreError;
use crate::models::{
    reaction_tags, tag_utils, CommunityId, Post, ReactionSummary, Reply, UserReaction,
};
use crate::nostr::{EventPublisher, EventStore};
use crate::stats::{activity_summary, community_stats, ActivitySummary, CommunityStats};
use crate::store::cache::QueryCache;
use crate::store::feed::build_feed;
use crate::store::fetch;
use crate::store::merge::merged_query;
use crate::store::moderation::{self, ModerationState};
use crate::store::thread::{resolve_thread, thread_reply_count, ThreadView};

// Cache namespaces. Publishes invalidate the namespaces they affect.
const NS_POSTS: &str = "posts";
const NS_REPLIES: &str = "replies";
const NS_REACTIONS: &str = "reactions";
const NS_MODERATION: &str = "moderation";
const NS_ACTIVITY: &str = "activity";

/// Moderator-maintained member lists, all sharing the same wire shape.
#[derive(Debug, Clone, Copy)]
enum MemberList {
    Approved,
    Declined,
    Banned,
}

impl MemberList {
    fn kind(self) -> u16 {
        match self {
            Self::Approved => kinds::APPROVED_MEMBERS,
            Self::Declined => kinds::DECLINED_MEMBERS,
            Self::Banned => kinds::BANNED_MEMBERS,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Banned => "banned",
        }
    }
}

pub struct CommunityService<S, P> {
    store: S,
    publisher: P,
    community: CommunityId,
    config: CoreConfig,
    cache: QueryCache,
}

impl<S: EventStore, P: EventPublisher> CommunityService<S, P> {
    pub fn new(store: S, publisher: P, community: CommunityId) -> Self {
        Self::with_config(store, publisher, community, CoreConfig::default())
    }

    pub fn with_config(store: S, publisher: P, community: CommunityId, config: CoreConfig) -> Self {
        Self {
            store,
            publisher,
            community,
            config,
            cache: QueryCache::new(),
        }
    }

    pub fn community(&self) -> &CommunityId {
        &self.community
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    // ---- identity ------------------------------------------------------

    pub fn current_user(&self) -> Option<PublicKey> {
        self.publisher.pubkey()
    }

    /// Whether the logged-in user is the community's authoritative author.
    pub fn is_moderator(&self) -> bool {
        self.current_user() == Some(self.community.pubkey)
    }

    pub fn is_own(&self, author: &PublicKey) -> bool {
        self.current_user() == Some(*author)
    }

    fn require_login(&self) -> Result<PublicKey, CoreError> {
        self.current_user().ok_or(CoreError::NotLoggedIn)
    }

    // ---- reads ---------------------------------------------------------

    async fn cached_query(
        &self,
        namespace: &str,
        filters: Vec<Filter>,
        timeout: Duration,
        stale_after: Duration,
        cancel: &CancelToken,
    ) -> Result<Vec<Event>, CoreError> {
        let key = QueryCache::key(namespace, &filters);
        if let Some(events) = self.cache.get_fresh(&key) {
            return Ok(events);
        }
        let events = merged_query(&self.store, filters, timeout, cancel).await?;
        self.cache.insert(key, events.clone(), stale_after);
        Ok(events)
    }

    /// Resolve the community's current moderation snapshot. The four states
    /// fetch concurrently and fail independently.
    pub async fn moderation(&self, cancel: &CancelToken) -> Result<ModerationState, CoreError> {
        let list = |kind| {
            self.cached_query(
                NS_MODERATION,
                vec![moderation::list_filter(kind, &self.community)],
                self.config.list_timeout,
                self.config.lists_stale_after,
                cancel,
            )
        };
        let (removals, pinned, approved, banned) = tokio::join!(
            self.cached_query(
                NS_MODERATION,
                vec![moderation::removal_filter(
                    &self.community,
                    self.config.removal_limit
                )],
                self.config.list_timeout,
                self.config.lists_stale_after,
                cancel,
            ),
            list(kinds::PINNED_POSTS),
            list(kinds::APPROVED_MEMBERS),
            list(kinds::BANNED_MEMBERS),
        );
        let (removals, pinned, approved, banned) = (removals?, pinned?, approved?, banned?);

        Ok(ModerationState {
            removed: moderation::removed_post_ids(&removals, &self.community),
            pinned: moderation::pinned_post_ids(moderation::newest_list(
                &pinned,
                kinds::PINNED_POSTS,
                &self.community,
            )),
            approved: moderation::listed_members(moderation::newest_list(
                &approved,
                kinds::APPROVED_MEMBERS,
                &self.community,
            )),
            banned: moderation::listed_members(moderation::newest_list(
                &banned,
                kinds::BANNED_MEMBERS,
                &self.community,
            )),
        })
    }

    /// The removed-post id set alone, for consumers that do not need the
    /// full snapshot (thread views only honor removals).
    pub async fn removed_posts(
        &self,
        cancel: &CancelToken,
    ) -> Result<HashSet<EventId>, CoreError> {
        let removals = self
            .cached_query(
                NS_MODERATION,
                vec![moderation::removal_filter(
                    &self.community,
                    self.config.removal_limit,
                )],
                self.config.list_timeout,
                self.config.lists_stale_after,
                cancel,
            )
            .await?;
        Ok(moderation::removed_post_ids(&removals, &self.community))
    }

    /// The moderated top-level feed, pinned posts first.
    pub async fn posts(&self, cancel: &CancelToken) -> Result<Vec<Post>, CoreError> {
        self.posts_with_limit(self.config.feed_limit, cancel).await
    }

    pub async fn posts_with_limit(
        &self,
        limit: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<Post>, CoreError> {
        let moderation = self.moderation(cancel).await?;
        let events = self
            .cached_query(
                NS_POSTS,
                fetch::post_filters(&self.community, limit),
                self.config.feed_timeout,
                self.config.posts_stale_after,
                cancel,
            )
            .await?;
        Ok(build_feed(&events, &moderation, &self.community))
    }

    /// The reply thread under `root`, nested replies resolved.
    pub async fn thread(
        &self,
        root: &EventId,
        cancel: &CancelToken,
    ) -> Result<ThreadView, CoreError> {
        let (removed, replies) = tokio::join!(
            self.removed_posts(cancel),
            self.reply_candidates(root, cancel)
        );
        let (removed, replies) = (removed?, replies?);
        Ok(resolve_thread(
            root,
            &replies,
            &removed,
            self.config.ancestry_depth_cap,
        ))
    }

    /// Member count of the thread under `root`, cheaper than [`Self::thread`].
    pub async fn reply_count(
        &self,
        root: &EventId,
        cancel: &CancelToken,
    ) -> Result<usize, CoreError> {
        let (removed, replies) = tokio::join!(
            self.removed_posts(cancel),
            self.reply_candidates(root, cancel)
        );
        let (removed, replies) = (removed?, replies?);
        Ok(thread_reply_count(
            root,
            &replies,
            &removed,
            self.config.ancestry_depth_cap,
        ))
    }

    async fn reply_candidates(
        &self,
        root: &EventId,
        cancel: &CancelToken,
    ) -> Result<Vec<Reply>, CoreError> {
        let events = self
            .cached_query(
                NS_REPLIES,
                fetch::thread_filters(&self.community, root, self.config.reply_limit),
                self.config.feed_timeout,
                self.config.replies_stale_after,
                cancel,
            )
            .await?;
        Ok(events
            .iter()
            .filter_map(|event| Reply::from_event(event, &self.community))
            .collect())
    }

    /// Reactions to `target`, grouped by semantic class.
    pub async fn reactions(
        &self,
        target: &EventId,
        cancel: &CancelToken,
    ) -> Result<ReactionSummary, CoreError> {
        let events = self
            .cached_query(
                NS_REACTIONS,
                fetch::reaction_filters(target, self.config.reaction_limit),
                self.config.list_timeout,
                self.config.reactions_stale_after,
                cancel,
            )
            .await?;
        Ok(ReactionSummary::aggregate(&events))
    }

    /// The logged-in user's own reaction to `target`, for toggle state.
    /// Logged-out callers get the empty default.
    pub async fn user_reaction(
        &self,
        target: &EventId,
        cancel: &CancelToken,
    ) -> Result<UserReaction, CoreError> {
        let Some(user) = self.current_user() else {
            return Ok(UserReaction::default());
        };
        let events = self
            .cached_query(
                NS_REACTIONS,
                fetch::reaction_filters(target, self.config.reaction_limit),
                self.config.list_timeout,
                self.config.reactions_stale_after,
                cancel,
            )
            .await?;
        Ok(UserReaction::resolve(&events, &user))
    }

    /// Approvals published for this community, newest first.
    pub async fn post_approvals(&self, cancel: &CancelToken) -> Result<Vec<Event>, CoreError> {
        moderation::fetch_post_approvals(&self.store, &self.community, &self.config, cancel).await
    }

    /// The most recent approval of a single post, if any.
    pub async fn post_approval(
        &self,
        post_id: &EventId,
        cancel: &CancelToken,
    ) -> Result<Option<Event>, CoreError> {
        moderation::fetch_post_approval(&self.store, &self.community, post_id, &self.config, cancel)
            .await
    }

    /// Member statistics derived from a larger feed sample.
    pub async fn stats(&self, cancel: &CancelToken) -> Result<CommunityStats, CoreError> {
        let posts = self.posts_with_limit(STATS_POST_LIMIT, cancel).await?;
        Ok(community_stats(&posts, Timestamp::now()))
    }

    /// Recent post/reply activity over the configured window.
    pub async fn activity(&self, cancel: &CancelToken) -> Result<ActivitySummary, CoreError> {
        let now = Timestamp::now();
        // Round the window start down to the hour so the cache key stays
        // stable between calls instead of changing every second.
        let window_anchor = Timestamp::from(now.as_u64() / 3600 * 3600);
        let events = self
            .cached_query(
                NS_ACTIVITY,
                fetch::activity_filters(&self.community, window_anchor),
                self.config.feed_timeout,
                self.config.posts_stale_after,
                cancel,
            )
            .await?;
        Ok(activity_summary(events, now))
    }

    // ---- writes --------------------------------------------------------

    /// Publish a new top-level post.
    pub async fn publish_post(
        &self,
        content: &str,
        relay_hint: Option<&str>,
    ) -> Result<Event, CoreError> {
        self.require_login()?;
        let event = self
            .publisher
            .publish(
                Kind::from(kinds::GROUP_POST),
                content,
                self.community.post_tags(relay_hint),
            )
            .await?;
        self.cache.invalidate_namespace(NS_POSTS);
        self.cache.invalidate_namespace(NS_ACTIVITY);
        Ok(event)
    }

    /// Publish a reply to a post or to another reply.
    pub async fn publish_reply(
        &self,
        content: &str,
        parent_id: &EventId,
        parent_author: &PublicKey,
        relay_hint: Option<&str>,
    ) -> Result<Event, CoreError> {
        self.require_login()?;
        let tags = self.community.reply_tags(parent_id, parent_author, relay_hint);
        let event = self
            .publisher
            .publish(Kind::from(kinds::GROUP_POST_REPLY), content, tags)
            .await?;
        self.cache.invalidate_namespace(NS_REPLIES);
        self.cache.invalidate_namespace(NS_POSTS);
        self.cache.invalidate_namespace(NS_ACTIVITY);
        Ok(event)
    }

    /// React to an event. `content` follows NIP-25 semantics.
    pub async fn react(
        &self,
        target: &Event,
        content: &str,
        relay_hint: Option<&str>,
    ) -> Result<Event, CoreError> {
        self.require_login()?;
        let event = self
            .publisher
            .publish(
                Kind::from(kinds::REACTION),
                content,
                reaction_tags(target, relay_hint),
            )
            .await?;
        self.cache.invalidate_namespace(NS_REACTIONS);
        Ok(event)
    }

    pub async fn like(&self, target: &Event, relay_hint: Option<&str>) -> Result<Event, CoreError> {
        self.react(target, "+", relay_hint).await
    }

    pub async fn dislike(
        &self,
        target: &Event,
        relay_hint: Option<&str>,
    ) -> Result<Event, CoreError> {
        self.react(target, "-", relay_hint).await
    }

    /// Retract a previously published reaction with a deletion tombstone.
    pub async fn retract_reaction(&self, reaction: &Event) -> Result<Event, CoreError> {
        self.require_login()?;
        let tags = vec![Tag::custom(
            TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::E)),
            vec![reaction.id.to_hex()],
        )];
        let event = self
            .publisher
            .publish(Kind::from(kinds::DELETION), REACTION_RETRACTION_NOTE, tags)
            .await?;
        self.cache.invalidate_namespace(NS_REACTIONS);
        Ok(event)
    }

    /// Approve a post. The approval carries the full post JSON so clients
    /// can render approved content without refetching it.
    pub async fn approve_post(
        &self,
        post: &Event,
        relay_hint: Option<&str>,
    ) -> Result<Event, CoreError> {
        self.require_login()?;
        let relay = relay_hint.unwrap_or_default();
        let tags = vec![
            self.community.a_tag(relay_hint),
            e_tag(&post.id, relay),
            p_tag(&post.pubkey, relay),
            k_tag(post.kind),
        ];
        self.publisher
            .publish(Kind::from(kinds::POST_APPROVAL), &post.as_json(), tags)
            .await
    }

    /// Remove a post from the community.
    ///
    /// Readers only honor removals signed by the community author; the
    /// engine still lets any logged-in caller publish one, matching the
    /// trust model where authority is checked on read, not on write.
    pub async fn remove_post(
        &self,
        post_id: &EventId,
        author: &PublicKey,
        post_kind: Kind,
        reason: Option<&str>,
    ) -> Result<Event, CoreError> {
        self.require_login()?;
        let tags = vec![
            self.community.a_tag(None),
            e_tag(post_id, ""),
            p_tag(author, ""),
            k_tag(post_kind),
        ];
        let event = self
            .publisher
            .publish(
                Kind::from(kinds::POST_REMOVAL),
                reason.unwrap_or(DEFAULT_REMOVAL_REASON),
                tags,
            )
            .await?;
        self.cache.invalidate_namespace(NS_MODERATION);
        self.cache.invalidate_namespace(NS_POSTS);
        self.cache.invalidate_namespace(NS_REPLIES);
        Ok(event)
    }

    pub async fn pin_post(
        &self,
        post_id: &EventId,
        cancel: &CancelToken,
    ) -> Result<Event, CoreError> {
        self.set_pinned(post_id, true, cancel).await
    }

    pub async fn unpin_post(
        &self,
        post_id: &EventId,
        cancel: &CancelToken,
    ) -> Result<Event, CoreError> {
        self.set_pinned(post_id, false, cancel).await
    }

    /// Republish the pinned-posts list with `post_id` added or removed.
    /// The current list is re-fetched uncached so the read-modify-write
    /// starts from the freshest generation available.
    async fn set_pinned(
        &self,
        post_id: &EventId,
        pin: bool,
        cancel: &CancelToken,
    ) -> Result<Event, CoreError> {
        self.require_login()?;
        let events = merged_query(
            &self.store,
            vec![moderation::list_filter(kinds::PINNED_POSTS, &self.community)],
            self.config.list_timeout,
            cancel,
        )
        .await?;
        let current = moderation::newest_list(&events, kinds::PINNED_POSTS, &self.community)
            .map(tag_utils::event_tag_values)
            .unwrap_or_default();

        let mut updated = current;
        if pin {
            if !updated.contains(post_id) {
                updated.push(*post_id);
            }
        } else {
            updated.retain(|id| id != post_id);
        }

        let mut tags = vec![Tag::identifier(self.community.to_string())];
        tags.extend(updated.iter().map(|id| e_tag(id, "")));
        let event = self
            .publisher
            .publish(Kind::from(kinds::PINNED_POSTS), "", tags)
            .await?;
        self.cache.invalidate_namespace(NS_MODERATION);
        self.cache.invalidate_namespace(NS_POSTS);
        Ok(event)
    }

    pub async fn approve_member(
        &self,
        member: &PublicKey,
        cancel: &CancelToken,
    ) -> Result<Event, CoreError> {
        self.update_member_list(member, MemberList::Approved, true, cancel)
            .await
    }

    pub async fn remove_approved_member(
        &self,
        member: &PublicKey,
        cancel: &CancelToken,
    ) -> Result<Event, CoreError> {
        self.update_member_list(member, MemberList::Approved, false, cancel)
            .await
    }

    pub async fn decline_member(
        &self,
        member: &PublicKey,
        cancel: &CancelToken,
    ) -> Result<Event, CoreError> {
        self.update_member_list(member, MemberList::Declined, true, cancel)
            .await
    }

    pub async fn ban_member(
        &self,
        member: &PublicKey,
        cancel: &CancelToken,
    ) -> Result<Event, CoreError> {
        self.update_member_list(member, MemberList::Banned, true, cancel)
            .await
    }

    pub async fn unban_member(
        &self,
        member: &PublicKey,
        cancel: &CancelToken,
    ) -> Result<Event, CoreError> {
        self.update_member_list(member, MemberList::Banned, false, cancel)
            .await
    }

    /// Read-modify-write of a member list event.
    async fn update_member_list(
        &self,
        member: &PublicKey,
        list: MemberList,
        add: bool,
        cancel: &CancelToken,
    ) -> Result<Event, CoreError> {
        self.require_login()?;
        let events = merged_query(
            &self.store,
            vec![moderation::list_filter(list.kind(), &self.community)],
            self.config.list_timeout,
            cancel,
        )
        .await?;
        let mut members = moderation::newest_list(&events, list.kind(), &self.community)
            .map(tag_utils::pubkey_tag_values)
            .unwrap_or_default();

        if add {
            if members.contains(member) {
                return Err(CoreError::MemberAlreadyListed(list.name()));
            }
            members.push(*member);
        } else {
            if !members.contains(member) {
                return Err(CoreError::MemberNotListed(list.name()));
            }
            members.retain(|m| m != member);
        }

        let mut tags = vec![Tag::identifier(self.community.to_string())];
        tags.extend(members.iter().map(|m| p_tag(m, "")));
        let event = self
            .publisher
            .publish(Kind::from(list.kind()), "", tags)
            .await?;
        self.cache.invalidate_namespace(NS_MODERATION);
        Ok(event)
    }

    /// Ask to join the community.
    pub async fn join(
        &self,
        message: Option<&str>,
        relay_hint: Option<&str>,
    ) -> Result<Event, CoreError> {
        self.require_login()?;
        self.publisher
            .publish(
                Kind::from(kinds::JOIN_REQUEST),
                message.unwrap_or(DEFAULT_JOIN_MESSAGE),
                vec![self.community.a_tag(relay_hint)],
            )
            .await
    }

    /// Announce leaving the community.
    pub async fn leave(
        &self,
        message: Option<&str>,
        relay_hint: Option<&str>,
    ) -> Result<Event, CoreError> {
        self.require_login()?;
        self.publisher
            .publish(
                Kind::from(kinds::LEAVE_REQUEST),
                message.unwrap_or(DEFAULT_LEAVE_MESSAGE),
                vec![self.community.a_tag(relay_hint)],
            )
            .await
    }
}

fn e_tag(id: &EventId, relay: &str) -> Tag {
    Tag::custom(
        TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::E)),
        vec![id.to_hex(), relay.to_string()],
    )
}

fn p_tag(pubkey: &PublicKey, relay: &str) -> Tag {
    Tag::custom(
        TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::P)),
        vec![pubkey.to_hex(), relay.to_string()],
    )
}

fn k_tag(kind: Kind) -> Tag {
    Tag::custom(
        TagKind::SingleLetter(SingleLetterTag::lowercase(Alphabet::K)),
        vec![kind.as_u16().to_string()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        member_list_event, pinned_list_event, post_event, reaction_event, removal_event,
        reply_event, test_community, MemoryPublisher, MockStore, TestCommunity,
    };

    fn service_for(
        community: &TestCommunity,
        events: Vec<Event>,
        keys: Option<Keys>,
    ) -> CommunityService<MockStore, MemoryPublisher> {
        let publisher = match keys {
            Some(keys) => MemoryPublisher::new(keys),
            None => MemoryPublisher::logged_out(),
        };
        CommunityService::new(MockStore::new(events), publisher, community.id.clone())
    }

    #[tokio::test]
    async fn test_posts_apply_moderation_and_order() {
        let community = test_community();
        let author = Keys::generate();
        let pinned = post_event(&community.id, &author, "pinned", 10);
        let newest = post_event(&community.id, &author, "newest", 30);
        let removed = post_event(&community.id, &author, "removed", 20);

        let events = vec![
            newest.clone(),
            pinned.clone(),
            removed.clone(),
            removal_event(&community.id, &community.keys, &[removed.id]),
            pinned_list_event(&community.id, &community.keys, &[pinned.id], 100),
        ];
        let service = service_for(&community, events, None);

        let posts = service.posts(&CancelToken::never()).await.expect("posts");
        let order: Vec<EventId> = posts.iter().map(|p| p.id).collect();
        assert_eq!(order, vec![pinned.id, newest.id]);
        assert!(posts[0].pinned);
    }

    #[tokio::test]
    async fn test_posts_second_read_hits_cache() {
        let community = test_community();
        let author = Keys::generate();
        let service = service_for(
            &community,
            vec![post_event(&community.id, &author, "cached", 10)],
            None,
        );

        service.posts(&CancelToken::never()).await.expect("posts");
        let after_first = service.store().queries();
        service.posts(&CancelToken::never()).await.expect("posts");
        assert_eq!(
            service.store().queries(),
            after_first,
            "fresh cache entries must serve the second read"
        );
    }

    #[tokio::test]
    async fn test_publish_post_requires_login() {
        let community = test_community();
        let service = service_for(&community, Vec::new(), None);

        let err = service
            .publish_post("hello", None)
            .await
            .expect_err("logged out");
        assert!(matches!(err, CoreError::NotLoggedIn));
    }

    #[tokio::test]
    async fn test_publish_post_invalidates_feed_cache() {
        let community = test_community();
        let author = Keys::generate();
        let service = service_for(
            &community,
            vec![post_event(&community.id, &author, "existing", 10)],
            Some(Keys::generate()),
        );

        service.posts(&CancelToken::never()).await.expect("posts");
        let after_first = service.store().queries();

        service
            .publish_post("fresh", None)
            .await
            .expect("publish");

        service.posts(&CancelToken::never()).await.expect("posts");
        assert!(
            service.store().queries() > after_first,
            "publishing a post must invalidate the feed namespace"
        );
    }

    #[tokio::test]
    async fn test_publish_reply_emits_parent_reference_last() {
        let community = test_community();
        let parent_keys = Keys::generate();
        let parent = post_event(&community.id, &parent_keys, "root", 10);
        let service = service_for(&community, Vec::new(), Some(Keys::generate()));

        let reply = service
            .publish_reply("re", &parent.id, &parent.pubkey, None)
            .await
            .expect("reply");

        let parsed = Reply::from_event(&reply, &community.id).expect("well-formed reply");
        assert_eq!(parsed.parent_id, parent.id);
    }

    #[tokio::test]
    async fn test_thread_resolves_nested_and_removed_replies() {
        let community = test_community();
        let author = Keys::generate();
        let root = post_event(&community.id, &author, "root", 10);
        let r1 = reply_event(&community.id, &author, &[root.id], 20);
        let r2 = reply_event(&community.id, &author, &[root.id], 30);
        let nested = reply_event(&community.id, &author, &[root.id, r1.id], 40);
        let removed = reply_event(&community.id, &author, &[root.id], 50);

        let events = vec![
            root.clone(),
            r1.clone(),
            r2.clone(),
            nested.clone(),
            removed.clone(),
            removal_event(&community.id, &community.keys, &[removed.id]),
        ];
        let service = service_for(&community, events, None);

        let view = service
            .thread(&root.id, &CancelToken::never())
            .await
            .expect("thread");
        assert_eq!(view.direct_replies(), &[r1.id, r2.id]);
        assert_eq!(view.children_of(&r1.id), &[nested.id]);
        assert!(view.get(&removed.id).is_none());

        let count = service
            .reply_count(&root.id, &CancelToken::never())
            .await
            .expect("count");
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_reactions_and_user_reaction() {
        let community = test_community();
        let me = Keys::generate();
        let target = post_event(&community.id, &Keys::generate(), "target", 10);
        let events = vec![
            target.clone(),
            reaction_event(&target, &Keys::generate(), "+"),
            reaction_event(&target, &me, "-"),
        ];
        let service = service_for(&community, events, Some(me));

        let summary = service
            .reactions(&target.id, &CancelToken::never())
            .await
            .expect("reactions");
        assert_eq!(summary.like_count(), 1);
        assert_eq!(summary.dislike_count(), 1);

        let mine = service
            .user_reaction(&target.id, &CancelToken::never())
            .await
            .expect("user reaction");
        assert!(mine.has_disliked);
    }

    #[tokio::test]
    async fn test_user_reaction_defaults_when_logged_out() {
        let community = test_community();
        let target = post_event(&community.id, &Keys::generate(), "target", 10);
        let service = service_for(&community, Vec::new(), None);

        let mine = service
            .user_reaction(&target.id, &CancelToken::never())
            .await
            .expect("default");
        assert!(!mine.has_liked && !mine.has_disliked && mine.reaction.is_none());
    }

    #[tokio::test]
    async fn test_pin_post_extends_current_list() {
        let community = test_community();
        let author = Keys::generate();
        let already = post_event(&community.id, &author, "already pinned", 10);
        let fresh = post_event(&community.id, &author, "new pin", 20);

        let events = vec![pinned_list_event(
            &community.id,
            &community.keys,
            &[already.id],
            100,
        )];
        // The moderator is the community author, so the republished list
        // stays authoritative.
        let service = service_for(&community, events, Some(community.keys.clone()));

        service
            .pin_post(&fresh.id, &CancelToken::never())
            .await
            .expect("pin");

        let sent = service.publisher().last_sent().expect("list published");
        assert_eq!(sent.kind.as_u16(), kinds::PINNED_POSTS);
        let pinned = tag_utils::event_tag_values(&sent);
        assert_eq!(pinned, vec![already.id, fresh.id]);
    }

    #[tokio::test]
    async fn test_member_list_preconditions() {
        let community = test_community();
        let listed = Keys::generate().public_key();
        let stranger = Keys::generate().public_key();

        let events = vec![member_list_event(
            kinds::BANNED_MEMBERS,
            &community.id,
            &community.keys,
            &[listed],
            100,
        )];
        let service = service_for(&community, events, Some(community.keys.clone()));

        let err = service
            .ban_member(&listed, &CancelToken::never())
            .await
            .expect_err("double ban");
        assert!(matches!(err, CoreError::MemberAlreadyListed("banned")));

        let err = service
            .unban_member(&stranger, &CancelToken::never())
            .await
            .expect_err("not listed");
        assert!(matches!(err, CoreError::MemberNotListed("banned")));

        service
            .unban_member(&listed, &CancelToken::never())
            .await
            .expect("unban");
        let sent = service.publisher().last_sent().expect("list published");
        assert_eq!(sent.kind.as_u16(), kinds::BANNED_MEMBERS);
        assert!(tag_utils::pubkey_tag_values(&sent).is_empty());
    }

    #[tokio::test]
    async fn test_is_moderator_tracks_community_author() {
        let community = test_community();
        let moderator = service_for(&community, Vec::new(), Some(community.keys.clone()));
        assert!(moderator.is_moderator());

        let visitor = service_for(&community, Vec::new(), Some(Keys::generate()));
        assert!(!visitor.is_moderator());

        let logged_out = service_for(&community, Vec::new(), None);
        assert!(!logged_out.is_moderator());
    }
}
