//! Community statistics derived from fetched events.
//!
//! There is no membership registry on the wire; member and activity counts
//! are approximated from who has posted within the relevant windows.

use std::collections::HashSet;

use nostr_sdk::prelude::*;
use serde::Serialize;

use crate::constants::{ACTIVITY_RECENT_KEEP, DAY_SECS, WEEK_SECS};
use crate::models::Post;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CommunityStats {
    /// Distinct authors across the sampled posts.
    pub member_count: usize,
    /// Authors who posted within the last day.
    pub recently_active: usize,
    pub unique_members: HashSet<PublicKey>,
}

/// Derive member statistics from a sample of feed posts.
pub fn community_stats(posts: &[Post], now: Timestamp) -> CommunityStats {
    let one_day_ago = now - DAY_SECS;

    let mut unique_members = HashSet::new();
    let mut recently_active = HashSet::new();
    for post in posts {
        unique_members.insert(post.author);
        if post.created_at > one_day_ago {
            recently_active.insert(post.author);
        }
    }

    CommunityStats {
        member_count: unique_members.len(),
        recently_active: recently_active.len(),
        unique_members,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivitySummary {
    pub total_events: usize,
    pub active_today: usize,
    pub active_this_week: usize,
    pub active_this_month: usize,
    /// Most recent events (newest first), capped for display.
    pub recent: Vec<Event>,
}

/// Summarize recent post/reply activity for a community.
pub fn activity_summary(mut events: Vec<Event>, now: Timestamp) -> ActivitySummary {
    let one_day_ago = now - DAY_SECS;
    let one_week_ago = now - WEEK_SECS;

    let mut active_today = HashSet::new();
    let mut active_this_week = HashSet::new();
    let mut active_this_month = HashSet::new();
    for event in &events {
        active_this_month.insert(event.pubkey);
        if event.created_at > one_week_ago {
            active_this_week.insert(event.pubkey);
        }
        if event.created_at > one_day_ago {
            active_today.insert(event.pubkey);
        }
    }

    let total_events = events.len();
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    events.truncate(ACTIVITY_RECENT_KEEP);

    ActivitySummary {
        total_events,
        active_today: active_today.len(),
        active_this_week: active_this_week.len(),
        active_this_month: active_this_month.len(),
        recent: events,
    }
}
