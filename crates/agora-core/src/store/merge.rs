//! Deduplicating multi-query merger.
//!
//! Community data has to be fetched under several filter variants at once
//! (legacy and canonical tag conventions, direct-parent and community-wide
//! reply queries). The variants fire concurrently and merge unique-by-id:
//! events are immutable, so any duplicate copy is equivalent and the merge
//! is commutative and idempotent as a set.

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;
use nostr_sdk::prelude::*;

use crate::cancel::CancelToken;
use crate::error::CoreError;
use crate::nostr::EventStore;

/// Run every filter concurrently and merge the results unique-by-id,
/// preserving first-seen order.
///
/// Each sub-query is bounded by `timeout` independently of the store's own
/// timeout; a timed-out or failed sub-query contributes an empty result
/// rather than failing the merge. Cancellation is the only error path: a
/// cancelled fetch abandons all partial results.
pub async fn merged_query<S: EventStore>(
    store: &S,
    filters: Vec<Filter>,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<Vec<Event>, CoreError> {
    let fetches = filters.into_iter().map(|filter| async move {
        match tokio::time::timeout(timeout, store.query(filter, cancel)).await {
            Ok(Ok(events)) => events,
            Ok(Err(e)) => {
                tracing::warn!("relay query failed, treating as empty: {e:#}");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "relay query timed out");
                Vec::new()
            }
        }
    });

    let results = tokio::select! {
        results = join_all(fetches) => results,
        _ = cancel.cancelled() => return Err(CoreError::Cancelled),
    };
    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for event in results.into_iter().flatten() {
        if seen.insert(event.id) {
            merged.push(event);
        }
    }
    Ok(merged)
}
