// ============================================================================
// Bookshelf Library
// ============================================================================

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod events;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use crate::cache::{BookCache, CacheError, LruBookCache};
pub use crate::config::AppConfig;
pub use crate::coordinator::{BookCoordinator, SideEffectStatsSnapshot};
pub use crate::core::{
    Book, BookDraft, BookError, BookId, CancelHandle, Page, PageRequest, RequestContext, Result,
};
pub use crate::events::{
    BookEvent, ChannelPublisher, EventConsumer, EventKind, EventPublisher, PublishError,
};
pub use crate::storage::{BookStore, InMemoryBookStore};

use std::num::NonZeroUsize;
use std::sync::Arc;

// ============================================================================
// In-process wiring
// ============================================================================

/// Fully wired catalogue backed by the in-process store, cache and event
/// channels.
///
/// # Examples
///
/// ```
/// use bookshelf::{AppConfig, BookDraft, Bookshelf, RequestContext};
///
/// # #[tokio::main]
/// # async fn main() -> bookshelf::Result<()> {
/// let shelf = Bookshelf::from_config(&AppConfig::default())?;
/// let ctx = RequestContext::background();
///
/// let book = shelf
///     .coordinator()
///     .create_book(&ctx, BookDraft::new("Dune", "Herbert", 1965))
///     .await?;
/// assert_eq!(book.id.get(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Bookshelf {
    config: AppConfig,
    coordinator: BookCoordinator,
    publisher: Arc<ChannelPublisher>,
}

impl Bookshelf {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.cache_capacity)
            .ok_or_else(|| BookError::validation("cache_capacity must be > 0"))?;

        let store = Arc::new(InMemoryBookStore::new());
        let cache = Arc::new(LruBookCache::new(capacity, config.cache_ttl));
        let publisher = Arc::new(ChannelPublisher::new(config.event_channel_capacity));
        let coordinator = BookCoordinator::new(store, cache, publisher.clone());

        Ok(Self {
            config: config.clone(),
            coordinator,
            publisher,
        })
    }

    pub fn coordinator(&self) -> &BookCoordinator {
        &self.coordinator
    }

    pub fn publisher(&self) -> &Arc<ChannelPublisher> {
        &self.publisher
    }

    /// Starts the background consumer over every event channel.
    pub fn spawn_consumer(&self) -> EventConsumer {
        EventConsumer::spawn(self.publisher.subscribe_all())
    }

    /// HTTP router over this catalogue.
    pub fn router(&self) -> axum::Router {
        web::router(web::AppState::new(
            self.coordinator.clone(),
            self.config.request_timeout,
        ))
    }
}
