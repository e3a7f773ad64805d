//! Tag extraction utilities for parsing Nostr events
//!
//! All tag decoding funnels through these helpers so the rest of the crate
//! never re-parses raw tag arrays. Malformed tag values (wrong arity,
//! non-hex ids) are skipped, never propagated as errors.

use nostr_sdk::prelude::*;

/// Extract all `e`-tag values in wire order, parsed as event ids.
/// Values that fail to parse are skipped.
pub fn event_tag_values(event: &Event) -> Vec<EventId> {
    event
        .tags
        .iter()
        .filter_map(|tag| {
            let t = tag.as_slice();
            if t.len() >= 2 && t[0] == "e" {
                EventId::from_hex(&t[1]).ok()
            } else {
                None
            }
        })
        .collect()
}

/// The last `e`-tag value, which by convention references the direct parent.
pub fn last_event_tag(event: &Event) -> Option<EventId> {
    event_tag_values(event).pop()
}

/// Check whether an event carries any `e` tag (reply marker).
pub fn has_event_tag(event: &Event) -> bool {
    event
        .tags
        .iter()
        .any(|tag| tag.as_slice().first().map(String::as_str) == Some("e"))
}

/// Extract all `p`-tag values, parsed as pubkeys. Malformed values skipped.
pub fn pubkey_tag_values(event: &Event) -> Vec<PublicKey> {
    event
        .tags
        .iter()
        .filter_map(|tag| {
            let t = tag.as_slice();
            if t.len() >= 2 && t[0] == "p" {
                PublicKey::from_hex(&t[1]).ok()
            } else {
                None
            }
        })
        .collect()
}

/// The `d`-tag value (addressable event identifier), if present.
pub fn identifier_tag(event: &Event) -> Option<&str> {
    event.tags.iter().find_map(|tag| {
        let t = tag.as_slice();
        if t.len() >= 2 && t[0] == "d" {
            Some(t[1].as_str())
        } else {
            None
        }
    })
}
