//! Write/read coordination over the store, the cache and the event publisher.
//!
//! Mutations run store -> cache invalidation -> event publish. Reads run
//! cache lookup -> store read on miss -> cache populate. Only the store decides
//! the outcome: cache and publisher failures are logged and counted, and a
//! cache failure on the read path is treated as a miss.

pub mod stats;

pub use stats::{SideEffectStats, SideEffectStatsSnapshot};

use crate::cache::{BookCache, CacheResult};
use crate::core::{Book, BookDraft, BookError, BookId, Page, PageRequest, RequestContext, Result};
use crate::events::{BookEvent, EventPublisher};
use crate::storage::BookStore;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info_span, warn};

/// Stateless facade over the three collaborators.
///
/// Holds no lock and no per-entity state, so clones can serve any number of
/// concurrent requests. Two racing updates to one book race at the store.
#[derive(Clone)]
pub struct BookCoordinator {
    store: Arc<dyn BookStore>,
    cache: Arc<dyn BookCache>,
    publisher: Arc<dyn EventPublisher>,
    stats: Arc<SideEffectStats>,
}

impl BookCoordinator {
    pub fn new(
        store: Arc<dyn BookStore>,
        cache: Arc<dyn BookCache>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            cache,
            publisher,
            stats: Arc::new(SideEffectStats::default()),
        }
    }

    pub fn stats(&self) -> SideEffectStatsSnapshot {
        self.stats.snapshot()
    }

    /// Validates the draft, inserts it, evicts listing pages and emits
    /// `BOOK_CREATED`.
    ///
    /// The duplicate check belongs to the store. Two identical creates racing
    /// each other are only kept apart by the store's own unique constraint.
    pub async fn create_book(&self, ctx: &RequestContext, draft: BookDraft) -> Result<Book> {
        let span = info_span!("books.create", title = %draft.title, author = %draft.author);
        async move {
            draft.validate()?;

            let book = self.store_call(ctx, "create", self.store.create(&draft)).await?;

            let evict = self.cache.invalidate_all_listings();
            self.cache_step(ctx, "invalidate_listings", evict).await;
            self.publish(ctx, BookEvent::created(&book)).await;

            debug!(book_id = %book.id, "book created");
            Ok(book)
        }
        .instrument(span)
        .await
    }

    /// Serves from the cache when possible, otherwise reads the store and
    /// repopulates the cache.
    pub async fn get_book(&self, ctx: &RequestContext, id: u64) -> Result<Book> {
        let span = info_span!("books.get", book_id = id);
        async move {
            let id = BookId::new(id)?;

            match ctx.run(self.cache.get_book(id)).await {
                Ok(Ok(Some(book))) => {
                    self.stats.record_cache_hit();
                    debug!("cache hit");
                    return Ok(book);
                }
                Ok(Ok(None)) => {
                    self.stats.record_cache_miss();
                    debug!("cache miss");
                }
                Ok(Err(err)) => self.cache_failed("get_book", &err),
                Err(err) => self.cache_failed("get_book", &err),
            }

            let book = self.store_call(ctx, "get_by_id", self.store.get_by_id(id)).await?;
            self.cache_step(ctx, "set_book", self.cache.set_book(&book)).await;
            Ok(book)
        }
        .instrument(span)
        .await
    }

    /// Lists one page, newest first. `page` and `size` are coerced, never
    /// rejected (see [`PageRequest::normalize`]).
    ///
    /// A cached page with no books is ignored and re-read from the store.
    pub async fn list_books(&self, ctx: &RequestContext, page: i64, size: i64) -> Result<Page> {
        let request = PageRequest::normalize(page, size);
        let span = info_span!("books.list", page = request.page(), size = request.size());
        async move {
            match ctx.run(self.cache.get_listing(request)).await {
                Ok(Ok(Some(cached))) if !cached.books.is_empty() => {
                    self.stats.record_cache_hit();
                    debug!("listing cache hit");
                    return Ok(cached);
                }
                Ok(Ok(_)) => {
                    self.stats.record_cache_miss();
                    debug!("listing cache miss");
                }
                Ok(Err(err)) => self.cache_failed("get_listing", &err),
                Err(err) => self.cache_failed("get_listing", &err),
            }

            let listed = self
                .store_call(
                    ctx,
                    "list",
                    self.store.list(request.limit(), request.offset()),
                )
                .await?;
            let populate = self.cache.set_listing(&listed, request);
            self.cache_step(ctx, "set_listing", populate).await;
            Ok(listed)
        }
        .instrument(span)
        .await
    }

    /// Overwrites an existing book, evicts its entry and every listing page,
    /// then emits `BOOK_UPDATED`. Uniqueness is not re-checked.
    pub async fn update_book(
        &self,
        ctx: &RequestContext,
        id: u64,
        draft: BookDraft,
    ) -> Result<Book> {
        let span = info_span!("books.update", book_id = id);
        async move {
            let id = BookId::new(id)?;
            draft.validate()?;

            let book = self
                .store_call(ctx, "update", self.store.update(id, &draft))
                .await?;

            self.invalidate_book(ctx, id).await;
            self.publish(ctx, BookEvent::updated(&book)).await;
            Ok(book)
        }
        .instrument(span)
        .await
    }

    /// Hard-deletes a book, evicts its entry and every listing page, then
    /// emits `BOOK_DELETED` with the id only. A missing id has no side effect.
    pub async fn delete_book(&self, ctx: &RequestContext, id: u64) -> Result<()> {
        let span = info_span!("books.delete", book_id = id);
        async move {
            let id = BookId::new(id)?;

            self.store_call(ctx, "delete", self.store.delete(id)).await?;

            self.invalidate_book(ctx, id).await;
            self.publish(ctx, BookEvent::deleted(id)).await;
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Store reachability, for health checks.
    pub async fn ping(&self, ctx: &RequestContext) -> Result<()> {
        self.store_call(ctx, "ping", self.store.ping()).await
    }

    async fn invalidate_book(&self, ctx: &RequestContext, id: BookId) {
        let evict = self.cache.delete_book(id);
        self.cache_step(ctx, "delete_book", evict).await;
        let evict = self.cache.invalidate_all_listings();
        self.cache_step(ctx, "invalidate_listings", evict).await;
    }

    async fn store_call<T, F>(&self, ctx: &RequestContext, op: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = ctx.run(call).await.and_then(|inner| inner);
        match &result {
            Ok(_) => {}
            Err(
                err @ (BookError::NotFound(_)
                | BookError::AlreadyExists(_)
                | BookError::Validation(_)),
            ) => {
                debug!(op, error = %err, "store rejected request");
            }
            Err(err) => {
                error!(op, error = %err, "store call failed");
            }
        }
        result
    }

    async fn cache_step<F>(&self, ctx: &RequestContext, step: &'static str, call: F)
    where
        F: Future<Output = CacheResult<()>>,
    {
        match ctx.run(call).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.cache_failed(step, &err),
            Err(err) => self.cache_failed(step, &err),
        }
    }

    fn cache_failed(&self, step: &'static str, err: &dyn Display) {
        self.stats.record_cache_failure();
        warn!(step, error = %err, "cache step failed, continuing");
    }

    async fn publish(&self, ctx: &RequestContext, event: BookEvent) {
        let kind = event.kind;
        let event_id = event.id;
        let failure = match ctx.run(self.publisher.publish(event)).await {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(err) => Some(err.to_string()),
        };

        match failure {
            None => debug!(%kind, %event_id, "event published"),
            Some(err) => {
                self.stats.record_publish_failure();
                warn!(%kind, %event_id, error = %err, "failed to publish event");
            }
        }
    }
}
