//! Change-event publication adapters.
//!
//! - [`BroadcastEventPublisher`] — a `tokio::sync::broadcast`-backed
//!   publisher used by every folder's control surface.
//! - [`NullEventPublisher`] — a no-op publisher for tests and for pipeline
//!   code paths that don't need a subscriber (mirrors the teacher's
//!   null-object adapters, e.g. `NullEmbeddingService`).

use crate::domain::error::Result;
use crate::domain::ports::events::{ChangeEvent, EventPublisher};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Default channel capacity for a folder's event broadcast. A lagging
/// subscriber drops the oldest events rather than blocking publication.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fans a folder's [`ChangeEvent`]s out to every attached `subscribe()`
/// caller via a `tokio::sync::broadcast` channel.
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<ChangeEvent>,
}

impl BroadcastEventPublisher {
    /// Build a publisher with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Build a publisher with an explicit channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to this folder's change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: ChangeEvent) -> Result<()> {
        // `send` errors only when there are zero subscribers; that's a
        // normal, non-failure state (no one is listening yet).
        let _ = self.sender.send(event);
        Ok(())
    }

    fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

/// Discards every event. Used where a collaborator requires an
/// [`EventPublisher`] but the caller has no subscribers to serve (e.g. a
/// one-shot CLI reindex with no control surface attached).
#[derive(Debug, Default)]
pub struct NullEventPublisher;

#[async_trait]
impl EventPublisher for NullEventPublisher {
    async fn publish(&self, _event: ChangeEvent) -> Result<()> {
        Ok(())
    }

    fn has_subscribers(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let publisher = BroadcastEventPublisher::new();
        let mut rx = publisher.subscribe();
        assert!(publisher.has_subscribers());

        let event = ChangeEvent::ReindexCompleted {
            folder: "/tmp/docs".into(),
        };
        publisher.publish(event.clone()).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn publishing_with_no_subscribers_is_not_an_error() {
        let publisher = BroadcastEventPublisher::new();
        assert!(!publisher.has_subscribers());
        publisher
            .publish(ChangeEvent::ReindexCompleted { folder: "/tmp".into() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn null_publisher_never_reports_subscribers() {
        let publisher = NullEventPublisher;
        assert!(!publisher.has_subscribers());
        publisher
            .publish(ChangeEvent::ReindexCompleted { folder: "/tmp".into() })
            .await
            .unwrap();
    }
}
