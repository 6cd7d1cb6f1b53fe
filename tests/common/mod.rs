//! Collaborator fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bookshelf::cache::CacheResult;
use bookshelf::{
    Book, BookCache, BookCoordinator, BookDraft, BookError, BookEvent, BookId, BookStore,
    CacheError, EventPublisher, InMemoryBookStore, LruBookCache, Page, PageRequest, PublishError,
    Result,
};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Real LRU cache behind an on/off switch that simulates a backend outage.
pub struct SwitchableCache {
    inner: LruBookCache,
    down: AtomicBool,
    pub calls: AtomicUsize,
}

impl SwitchableCache {
    pub fn new() -> Self {
        Self {
            inner: LruBookCache::new(NonZeroUsize::new(128).unwrap(), Duration::from_secs(3600)),
            down: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &LruBookCache {
        &self.inner
    }

    fn gate(&self) -> CacheResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BookCache for SwitchableCache {
    async fn get_book(&self, id: BookId) -> CacheResult<Option<Book>> {
        self.gate()?;
        self.inner.get_book(id).await
    }

    async fn set_book(&self, book: &Book) -> CacheResult<()> {
        self.gate()?;
        self.inner.set_book(book).await
    }

    async fn delete_book(&self, id: BookId) -> CacheResult<()> {
        self.gate()?;
        self.inner.delete_book(id).await
    }

    async fn get_listing(&self, request: PageRequest) -> CacheResult<Option<Page>> {
        self.gate()?;
        self.inner.get_listing(request).await
    }

    async fn set_listing(&self, page: &Page, request: PageRequest) -> CacheResult<()> {
        self.gate()?;
        self.inner.set_listing(page, request).await
    }

    async fn invalidate_all_listings(&self) -> CacheResult<()> {
        self.gate()?;
        self.inner.invalidate_all_listings().await
    }

    async fn clear(&self) -> CacheResult<()> {
        self.gate()?;
        self.inner.clear().await
    }
}

/// Publisher that records events and can be told to fail every call.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<BookEvent>>,
    failing: AtomicBool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        let publisher = Self::default();
        publisher.failing.store(true, Ordering::SeqCst);
        publisher
    }

    pub async fn events(&self) -> Vec<BookEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: BookEvent) -> std::result::Result<(), PublishError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Transport("broker unreachable".to_string()));
        }
        self.events.lock().await.push(event);
        Ok(())
    }
}

/// Store whose calls can fail with a database error or hang forever.
pub struct FaultyStore {
    inner: InMemoryBookStore,
    failing: AtomicBool,
    hanging: AtomicBool,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryBookStore::new(),
            failing: AtomicBool::new(false),
            hanging: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_hanging(&self, hanging: bool) {
        self.hanging.store(hanging, Ordering::SeqCst);
    }

    async fn gate(&self) -> Result<()> {
        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(BookError::Database("connection reset by peer".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BookStore for FaultyStore {
    async fn create(&self, draft: &BookDraft) -> Result<Book> {
        self.gate().await?;
        self.inner.create(draft).await
    }

    async fn get_by_id(&self, id: BookId) -> Result<Book> {
        self.gate().await?;
        self.inner.get_by_id(id).await
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Page> {
        self.gate().await?;
        self.inner.list(limit, offset).await
    }

    async fn update(&self, id: BookId, draft: &BookDraft) -> Result<Book> {
        self.gate().await?;
        self.inner.update(id, draft).await
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        self.gate().await?;
        self.inner.delete(id).await
    }

    async fn ping(&self) -> Result<()> {
        self.gate().await
    }
}

pub struct Harness {
    pub coordinator: BookCoordinator,
    pub store: Arc<FaultyStore>,
    pub cache: Arc<SwitchableCache>,
    pub publisher: Arc<RecordingPublisher>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_publisher(RecordingPublisher::default())
    }

    pub fn with_publisher(publisher: RecordingPublisher) -> Self {
        let store = Arc::new(FaultyStore::new());
        let cache = Arc::new(SwitchableCache::new());
        let publisher = Arc::new(publisher);
        let coordinator = BookCoordinator::new(store.clone(), cache.clone(), publisher.clone());
        Self {
            coordinator,
            store,
            cache,
            publisher,
        }
    }
}

pub fn dune() -> BookDraft {
    BookDraft::new("Dune", "Herbert", 1965)
}
