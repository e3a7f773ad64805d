//! Signing and publishing collaborator.
//!
//! Key custody lives outside the engine: the engine supplies kind, content
//! and tags, and gets back a fully-formed signed event (or a rejection).
//! The publisher also exposes the current identity, used for authorization
//! checks and reaction self-lookup.

use std::future::Future;
use std::time::Duration;

use nostr_sdk::prelude::*;

use crate::constants::PUBLISH_TIMEOUT_SECS;
use crate::error::CoreError;

pub trait EventPublisher: Send + Sync {
    /// The logged-in user, or `None` when no identity is available.
    fn pubkey(&self) -> Option<PublicKey>;

    /// Sign and broadcast an event. Fails with [`CoreError::NotLoggedIn`]
    /// without an identity and [`CoreError::Publish`] on relay rejection.
    fn publish(
        &self,
        kind: Kind,
        content: &str,
        tags: Vec<Tag>,
    ) -> impl Future<Output = Result<Event, CoreError>> + Send;
}

/// [`EventPublisher`] signing locally and broadcasting through a
/// `nostr_sdk` relay pool.
#[derive(Debug, Clone)]
pub struct RelayPublisher {
    client: Client,
    keys: Option<Keys>,
}

impl RelayPublisher {
    pub fn new(client: Client, keys: Option<Keys>) -> Self {
        Self { client, keys }
    }

    /// A publisher with no identity; every publish fails with
    /// [`CoreError::NotLoggedIn`].
    pub fn logged_out(client: Client) -> Self {
        Self::new(client, None)
    }
}

impl EventPublisher for RelayPublisher {
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

        // Bounded send so a degraded relay pool cannot block the caller.
        match tokio::time::timeout(
            Duration::from_secs(PUBLISH_TIMEOUT_SECS),
            self.client.send_event(&event),
        )
        .await
        {
            Ok(Ok(output)) => {
                tracing::debug!(id = %output.id(), kind = kind.as_u16(), "event published");
                Ok(event)
            }
            Ok(Err(e)) => Err(CoreError::Publish(e.to_string())),
            Err(_) => Err(CoreError::Publish(format!(
                "send timed out after {PUBLISH_TIMEOUT_SECS}s"
            ))),
        }
    }
}
