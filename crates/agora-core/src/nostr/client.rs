//! Relay-backed event store.
//!
//! The engine only ever sees the narrow [`EventStore`] seam: a filtered
//! query returning signed events, with no ordering, dedup, or completeness
//! guarantees. Everything else (connection pooling, retries, transports)
//! stays behind it.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use nostr_sdk::prelude::*;

use crate::cancel::CancelToken;
use crate::constants::{FEED_FETCH_TIMEOUT_SECS, RELAY_URL};

/// Read access to a set of relays.
pub trait EventStore: Send + Sync {
    /// Execute one filtered query. Implementations may apply their own
    /// internal timeout; callers bound the fetch independently.
    fn query(
        &self,
        filter: Filter,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<Vec<Event>>> + Send;
}

/// [`EventStore`] over a `nostr_sdk` relay pool.
#[derive(Debug, Clone)]
pub struct RelayStore {
    client: Client,
    timeout: Duration,
}

impl RelayStore {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Connect a fresh read-only client to the given relays.
    pub async fn connect<I, S>(relays: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Client::default();
        for url in relays {
            client.add_relay(url.into()).await?;
        }
        client.connect().await;
        Ok(Self::new(
            client,
            Duration::from_secs(FEED_FETCH_TIMEOUT_SECS),
        ))
    }

    /// Connect to the default relay.
    pub async fn connect_default() -> Result<Self> {
        Self::connect([RELAY_URL]).await
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl EventStore for RelayStore {
    async fn query(&self, filter: Filter, _cancel: &CancelToken) -> Result<Vec<Event>> {
        let events = self.client.fetch_events(filter, self.timeout).await?;
        Ok(events.into_iter().collect())
    }
}
