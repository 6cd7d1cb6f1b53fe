//! Mutation events: envelope, transport and the background consumer.

pub mod consumer;
pub mod event;
pub mod publisher;

pub use consumer::EventConsumer;
pub use event::{BookEvent, EventKind};
pub use publisher::{
    ChannelPublisher, DEFAULT_CHANNEL_CAPACITY, EventPublisher, EventSubscription, PublishError,
};
