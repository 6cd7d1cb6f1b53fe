pub mod memory;

pub use memory::InMemoryBookStore;

use crate::core::{Book, BookDraft, BookId, Page, Result};
use async_trait::async_trait;

/// Durable, authoritative book records.
///
/// Implementations map their own failures into the catalogue taxonomy:
/// `AlreadyExists` on a duplicate `(title, author)` at create time,
/// `NotFound` for a missing id, `Database` for I/O failures.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Inserts a new record, assigning its id and both timestamps.
    async fn create(&self, draft: &BookDraft) -> Result<Book>;

    async fn get_by_id(&self, id: BookId) -> Result<Book>;

    /// Returns up to `limit` books after skipping `offset`, newest first,
    /// together with the count of all live books.
    async fn list(&self, limit: usize, offset: usize) -> Result<Page>;

    /// Overwrites the fields of an existing record and refreshes `updated_at`.
    async fn update(&self, id: BookId, draft: &BookDraft) -> Result<Book>;

    async fn delete(&self, id: BookId) -> Result<()>;

    /// Check if the store is reachable
    async fn ping(&self) -> Result<()>;
}
