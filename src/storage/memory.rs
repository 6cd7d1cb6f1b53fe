use super::BookStore;
use crate::core::{Book, BookDraft, BookError, BookId, Page, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

type TitleAuthor = (String, String);

#[derive(Default)]
struct BookTable {
    /// Live rows keyed by id
    rows: BTreeMap<u64, Book>,
    /// Unique index over (title, author)
    by_title_author: HashMap<TitleAuthor, u64>,
    /// Last id handed out; ids are never reused
    last_id: u64,
}

/// In-process book store.
///
/// The duplicate check and the insert happen under one write lock, so this
/// store is itself the unique constraint for `(title, author)`.
#[derive(Default)]
pub struct InMemoryBookStore {
    table: RwLock<BookTable>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rows
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn index_key(title: &str, author: &str) -> TitleAuthor {
    (title.to_string(), author.to_string())
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn create(&self, draft: &BookDraft) -> Result<Book> {
        let mut table = self.table.write().await;

        let key = index_key(&draft.title, &draft.author);
        if table.by_title_author.contains_key(&key) {
            return Err(BookError::AlreadyExists(
                "book with same title and author already exists".to_string(),
            ));
        }

        let raw_id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| BookError::Database("book id space exhausted".to_string()))?;
        let id = BookId::new(raw_id)?;
        let now = Utc::now();
        let book = Book {
            id,
            title: draft.title.clone(),
            author: draft.author.clone(),
            year: draft.year,
            created_at: now,
            updated_at: now,
        };

        table.last_id = raw_id;
        table.by_title_author.insert(key, raw_id);
        table.rows.insert(raw_id, book.clone());
        Ok(book)
    }

    async fn get_by_id(&self, id: BookId) -> Result<Book> {
        let table = self.table.read().await;
        table
            .rows
            .get(&id.get())
            .cloned()
            .ok_or_else(|| BookError::not_found(id))
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Page> {
        let table = self.table.read().await;
        let mut books = table.rows.values().collect::<Vec<_>>();
        // Newest first; ids break ties between equal creation timestamps.
        books.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.cmp(&a.id))
        });

        Ok(Page {
            books: books.into_iter().skip(offset).take(limit).cloned().collect(),
            total: table.rows.len() as u64,
        })
    }

    async fn update(&self, id: BookId, draft: &BookDraft) -> Result<Book> {
        let mut table = self.table.write().await;
        let table = &mut *table;

        let Some(book) = table.rows.get_mut(&id.get()) else {
            return Err(BookError::not_found(id));
        };

        let old_key = index_key(&book.title, &book.author);
        if table.by_title_author.get(&old_key) == Some(&id.get()) {
            table.by_title_author.remove(&old_key);
        }

        book.title = draft.title.clone();
        book.author = draft.author.clone();
        book.year = draft.year;
        book.updated_at = Utc::now().max(book.created_at);

        // Uniqueness is only enforced on create; the index follows the latest writer.
        table
            .by_title_author
            .insert(index_key(&book.title, &book.author), id.get());
        Ok(book.clone())
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        let mut table = self.table.write().await;
        let Some(book) = table.rows.remove(&id.get()) else {
            return Err(BookError::not_found(id));
        };

        let key = index_key(&book.title, &book.author);
        if table.by_title_author.get(&key) == Some(&id.get()) {
            table.by_title_author.remove(&key);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let _table = self.table.read().await;
        Ok(())
    }
}
