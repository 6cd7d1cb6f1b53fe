use super::event::{BookEvent, EventKind};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Default per-kind channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("no subscriber for {0} events")]
    NoSubscribers(EventKind),

    #[error("event transport failed: {0}")]
    Transport(String),
}

/// Fire-and-forget emission of mutation events.
///
/// Returning `Ok` means the transport accepted the event; consumers are not
/// awaited.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: BookEvent) -> Result<(), PublishError>;
}

/// In-process transport with one broadcast channel per event kind.
///
/// Delivery on a channel preserves send order. Across channels,
/// [`EventSubscription::recv`] drains in lifecycle order, so the events of one
/// book reach a consumer as created, then updated, then deleted.
pub struct ChannelPublisher {
    created: broadcast::Sender<BookEvent>,
    updated: broadcast::Sender<BookEvent>,
    deleted: broadcast::Sender<BookEvent>,
}

impl ChannelPublisher {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            created: broadcast::channel(capacity).0,
            updated: broadcast::channel(capacity).0,
            deleted: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, kind: EventKind) -> &broadcast::Sender<BookEvent> {
        match kind {
            EventKind::Created => &self.created,
            EventKind::Updated => &self.updated,
            EventKind::Deleted => &self.deleted,
        }
    }

    pub fn subscribe(&self, kind: EventKind) -> broadcast::Receiver<BookEvent> {
        self.sender(kind).subscribe()
    }

    /// One receiver per kind, drained together.
    pub fn subscribe_all(&self) -> EventSubscription {
        EventSubscription {
            created: self.created.subscribe(),
            updated: self.updated.subscribe(),
            deleted: self.deleted.subscribe(),
        }
    }
}

impl Default for ChannelPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for ChannelPublisher {
    async fn publish(&self, event: BookEvent) -> Result<(), PublishError> {
        let kind = event.kind;
        self.sender(kind)
            .send(event)
            .map(|_| ())
            .map_err(|_| PublishError::NoSubscribers(kind))
    }
}

/// Receivers for all three event channels.
pub struct EventSubscription {
    created: broadcast::Receiver<BookEvent>,
    updated: broadcast::Receiver<BookEvent>,
    deleted: broadcast::Receiver<BookEvent>,
}

impl EventSubscription {
    /// Next event, preferring created over updated over deleted when several
    /// channels have one buffered. Ids are never reused, so this keeps each
    /// book's events in lifecycle order.
    pub async fn recv(&mut self) -> Result<BookEvent, RecvError> {
        tokio::select! {
            biased;
            received = self.created.recv() => received,
            received = self.updated.recv() => received,
            received = self.deleted.recv() => received,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Book, BookId};

    #[tokio::test]
    async fn kinds_use_separate_channels() {
        let publisher = ChannelPublisher::new(8);
        let mut deleted = publisher.subscribe(EventKind::Deleted);
        let mut created = publisher.subscribe(EventKind::Created);

        publisher
            .publish(BookEvent::deleted(BookId::new(1).unwrap()))
            .await
            .unwrap();

        assert_eq!(deleted.recv().await.unwrap().kind, EventKind::Deleted);
        assert!(created.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_without_subscribers_fails() {
        let publisher = ChannelPublisher::default();
        let err = publisher
            .publish(BookEvent::deleted(BookId::new(1).unwrap()))
            .await
            .unwrap_err();
        assert_eq!(err, PublishError::NoSubscribers(EventKind::Deleted));
    }

    #[tokio::test]
    async fn subscription_drains_every_kind() {
        let publisher = ChannelPublisher::new(8);
        let mut subscription = publisher.subscribe_all();
        let id = BookId::new(5).unwrap();

        publisher.publish(BookEvent::deleted(id)).await.unwrap();

        let event = subscription.recv().await.unwrap();
        assert_eq!(event.subject_id, id);
    }

    #[tokio::test]
    async fn buffered_events_drain_in_lifecycle_order() {
        let now = chrono::Utc::now();
        let book = Book {
            id: BookId::new(9).unwrap(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            year: 1965,
            created_at: now,
            updated_at: now,
        };

        for _ in 0..50 {
            let publisher = ChannelPublisher::new(8);
            let mut subscription = publisher.subscribe_all();

            publisher.publish(BookEvent::created(&book)).await.unwrap();
            publisher.publish(BookEvent::updated(&book)).await.unwrap();
            publisher.publish(BookEvent::deleted(book.id)).await.unwrap();

            let mut kinds = Vec::new();
            for _ in 0..3 {
                let event = subscription.recv().await.unwrap();
                assert_eq!(event.partition_key(), "9");
                kinds.push(event.kind);
            }
            assert_eq!(kinds, EventKind::ALL.to_vec());
        }
    }
}
