//! # Event Publisher
//!
//! Publishing side of the bus, backed by `tokio::sync::broadcast`.

use crate::events::{EventFilter, SubsidyEvent};
use crate::subscriber::Subscription;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

/// Hands committed events to observers.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event`, returning how many subscribers will see it.
    async fn publish(&self, event: SubsidyEvent) -> usize;
}

/// In-process bus.
///
/// Each subscriber buffers up to `capacity` events; one that falls further
/// behind skips the oldest rather than blocking the ledger. Dropping the
/// bus closes every subscription once its backlog is consumed.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<SubsidyEvent>,
}

impl InMemoryEventBus {
    /// Create a bus buffering `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events matching `filter`.
    ///
    /// Only events published after this call are delivered.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, items = ?filter.item_ids, "Subscription opened");
        Subscription::new(self.sender.subscribe(), filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: SubsidyEvent) -> usize {
        let topic = event.topic();
        let operation = event.operation();

        // A send error only means nobody is listening
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(?topic, %operation, receivers, "Event published");
        receivers
    }
}
