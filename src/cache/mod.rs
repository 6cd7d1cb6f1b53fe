//! Best-effort read-through cache for books and listing pages.
//!
//! The cache is never authoritative. Every error it returns is absorbed by the
//! coordinator, so implementations report failures honestly instead of
//! masking them as misses.

pub mod keys;
pub mod memory;

pub use memory::LruBookCache;

use crate::core::{Book, BookId, Page, PageRequest};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Keyed get/set/delete over single books and listing pages.
///
/// `Ok(None)` is a miss; `Err` is a backend failure.
#[async_trait]
pub trait BookCache: Send + Sync {
    async fn get_book(&self, id: BookId) -> CacheResult<Option<Book>>;

    async fn set_book(&self, book: &Book) -> CacheResult<()>;

    async fn delete_book(&self, id: BookId) -> CacheResult<()>;

    async fn get_listing(&self, request: PageRequest) -> CacheResult<Option<Page>>;

    async fn set_listing(&self, page: &Page, request: PageRequest) -> CacheResult<()>;

    /// Evicts every listing page regardless of its pagination parameters.
    async fn invalidate_all_listings(&self) -> CacheResult<()>;

    /// Drops every entry in both namespaces.
    async fn clear(&self) -> CacheResult<()>;
}
