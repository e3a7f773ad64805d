//! Thread reconstruction.
//!
//! Replies arrive as an unordered, multi-relay stream referencing the root
//! post directly or transitively through other replies. Membership of a
//! reply in a thread is decided by walking its parent chain against the
//! fetched collection only: a reply whose parent is missing locally is left
//! out rather than speculatively included, and the walk is depth-bounded so
//! malformed or cyclic tag graphs terminate.

use std::collections::{HashMap, HashSet};

use nostr_sdk::prelude::*;
use serde::Serialize;

use crate::models::Reply;

/// A reconstructed reply thread under one root post.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThreadView {
    pub root_id: Option<EventId>,
    /// Thread members in chronological order (oldest first).
    pub replies: Vec<Reply>,
    /// Parent id (root included) to child reply ids, children chronological.
    pub children: HashMap<EventId, Vec<EventId>>,
}

impl ThreadView {
    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    pub fn get(&self, id: &EventId) -> Option<&Reply> {
        self.replies.iter().find(|reply| reply.id == *id)
    }

    /// Children of `parent` in chronological order.
    pub fn children_of(&self, parent: &EventId) -> &[EventId] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replies whose direct parent is the root post.
    pub fn direct_replies(&self) -> &[EventId] {
        match &self.root_id {
            Some(root) => self.children_of(root),
            None => &[],
        }
    }
}

/// Whether `reply` belongs to the thread under `root_id`.
///
/// The full indexed collection is passed at every step and the recursion
/// carries an explicit depth counter: exceeding `depth_cap` (or hitting a
/// parent that is not in the collection) excludes the reply silently.
fn belongs_to_thread(
    reply: &Reply,
    root_id: &EventId,
    index: &HashMap<EventId, &Reply>,
    depth: usize,
    depth_cap: usize,
) -> bool {
    if reply.parent_id == *root_id {
        return true;
    }
    if depth >= depth_cap {
        return false;
    }
    match index.get(&reply.parent_id) {
        Some(parent) => belongs_to_thread(parent, root_id, index, depth + 1, depth_cap),
        None => false,
    }
}

/// Reconstruct the thread under `root_id` from fetched reply candidates.
///
/// Removed replies are dropped before membership resolution, so their
/// descendants fall out of the thread with them. Duplicate candidates
/// (same id) are collapsed. Pure: identical inputs give identical output.
pub fn resolve_thread(
    root_id: &EventId,
    replies: &[Reply],
    removed: &HashSet<EventId>,
    depth_cap: usize,
) -> ThreadView {
    let mut index: HashMap<EventId, &Reply> = HashMap::new();
    for reply in replies {
        if reply.id == *root_id || removed.contains(&reply.id) {
            continue;
        }
        index.entry(reply.id).or_insert(reply);
    }

    // Iterate the input slice, not the index, so equal-timestamp members
    // keep a deterministic order through the stable sort below.
    let mut seen = HashSet::new();
    let mut members: Vec<Reply> = replies
        .iter()
        .filter(|reply| index.contains_key(&reply.id) && seen.insert(reply.id))
        .filter(|reply| belongs_to_thread(reply, root_id, &index, 0, depth_cap))
        .cloned()
        .collect();
    members.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let mut children: HashMap<EventId, Vec<EventId>> = HashMap::new();
    for member in &members {
        children.entry(member.parent_id).or_default().push(member.id);
    }

    ThreadView {
        root_id: Some(*root_id),
        replies: members,
        children,
    }
}

/// Number of thread members, without building the full view.
pub fn thread_reply_count(
    root_id: &EventId,
    replies: &[Reply],
    removed: &HashSet<EventId>,
    depth_cap: usize,
) -> usize {
    let mut index: HashMap<EventId, &Reply> = HashMap::new();
    for reply in replies {
        if reply.id == *root_id || removed.contains(&reply.id) {
            continue;
        }
        index.entry(reply.id).or_insert(reply);
    }

    index
        .values()
        .filter(|reply| belongs_to_thread(reply, root_id, &index, 0, depth_cap))
        .count()
}
