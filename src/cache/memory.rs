use super::keys::{book_key, is_listing_key, listing_key};
use super::{BookCache, CacheResult};
use crate::core::{Book, BookId, Page, PageRequest};
use async_trait::async_trait;
use lru::LruCache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Default time-to-live applied to every entry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Serialized value plus its expiry, the same shape a remote key-value
/// backend would hold.
struct CacheSlot {
    payload: String,
    expires_at: Instant,
}

/// Bounded in-process cache with a uniform TTL.
///
/// Values are stored as JSON so that a cached snapshot is decoupled from the
/// caller's copy, exactly like a networked cache.
pub struct LruBookCache {
    entries: Mutex<LruCache<String, CacheSlot>>,
    ttl: Duration,
}

impl LruBookCache {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of resident entries, expired ones included until touched.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            None => return Ok(None),
            Some(slot) if slot.expires_at <= Instant::now() => true,
            Some(slot) => return Ok(Some(serde_json::from_str(&slot.payload)?)),
        };
        if expired {
            entries.pop(key);
            debug!(key, "cache entry expired");
        }
        Ok(None)
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: String, value: &T) -> CacheResult<()> {
        let payload = serde_json::to_string(value)?;
        let slot = CacheSlot {
            payload,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.lock().await.put(key, slot);
        Ok(())
    }
}

#[async_trait]
impl BookCache for LruBookCache {
    async fn get_book(&self, id: BookId) -> CacheResult<Option<Book>> {
        self.get_json(&book_key(id)).await
    }

    async fn set_book(&self, book: &Book) -> CacheResult<()> {
        self.set_json(book_key(book.id), book).await
    }

    async fn delete_book(&self, id: BookId) -> CacheResult<()> {
        self.entries.lock().await.pop(&book_key(id));
        Ok(())
    }

    async fn get_listing(&self, request: PageRequest) -> CacheResult<Option<Page>> {
        self.get_json(&listing_key(request)).await
    }

    async fn set_listing(&self, page: &Page, request: PageRequest) -> CacheResult<()> {
        self.set_json(listing_key(request), page).await
    }

    async fn invalidate_all_listings(&self) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        let stale = entries
            .iter()
            .map(|(key, _)| key)
            .filter(|key| is_listing_key(key))
            .cloned()
            .collect::<Vec<_>>();
        for key in &stale {
            entries.pop(key);
        }
        debug!(evicted = stale.len(), "listing pages invalidated");
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cache() -> LruBookCache {
        LruBookCache::new(NonZeroUsize::new(16).unwrap(), Duration::from_secs(60))
    }

    fn book(id: u64) -> Book {
        let now = Utc::now();
        Book {
            id: BookId::new(id).unwrap(),
            title: format!("Title {id}"),
            author: "Author".to_string(),
            year: 1999,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn book_round_trip_and_delete() {
        let cache = cache();
        let stored = book(1);
        cache.set_book(&stored).await.unwrap();

        assert_eq!(cache.get_book(stored.id).await.unwrap(), Some(stored.clone()));

        cache.delete_book(stored.id).await.unwrap();
        assert_eq!(cache.get_book(stored.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn listing_sweep_leaves_books_alone() {
        let cache = cache();
        let stored = book(1);
        let page = Page {
            books: vec![stored.clone()],
            total: 1,
        };
        cache.set_book(&stored).await.unwrap();
        for size in [5, 10, 20] {
            cache
                .set_listing(&page, PageRequest::normalize(1, size))
                .await
                .unwrap();
        }
        assert_eq!(cache.len().await, 4);

        cache.invalidate_all_listings().await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.get_book(stored.id).await.unwrap().is_some());
        assert!(
            cache
                .get_listing(PageRequest::normalize(1, 10))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_read_as_misses() {
        let cache = LruBookCache::new(NonZeroUsize::new(4).unwrap(), Duration::from_secs(5));
        let stored = book(3);
        cache.set_book(&stored).await.unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(cache.get_book(stored.id).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get_book(stored.id).await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let cache = LruBookCache::new(NonZeroUsize::new(2).unwrap(), DEFAULT_CACHE_TTL);
        for id in 1..=3 {
            cache.set_book(&book(id)).await.unwrap();
        }
        assert!(cache.get_book(BookId::new(1).unwrap()).await.unwrap().is_none());
        assert!(cache.get_book(BookId::new(3).unwrap()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_drops_books_and_listings() {
        let cache = cache();
        let stored = book(2);
        cache.set_book(&stored).await.unwrap();
        cache
            .set_listing(
                &Page {
                    books: vec![stored.clone()],
                    total: 1,
                },
                PageRequest::normalize(1, 10),
            )
            .await
            .unwrap();

        cache.clear().await.unwrap();

        assert!(cache.is_empty().await);
        assert!(cache.get_book(stored.id).await.unwrap().is_none());
    }
}
