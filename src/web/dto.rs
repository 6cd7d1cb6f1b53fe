use crate::core::{Book, BookDraft, Page, PageRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /books` and `PUT /books/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl From<BookRequest> for BookDraft {
    fn from(request: BookRequest) -> Self {
        BookDraft::new(request.title, request.author, request.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.get(),
            title: book.title,
            author: book.author,
            year: book.year,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// Raw listing query. Unparsable values fall back to zero and are then
/// coerced like any other out-of-range input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub size: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> i64 {
        lenient_number(self.page.as_deref(), 1)
    }

    pub fn size(&self) -> i64 {
        lenient_number(self.size.as_deref(), i64::from(crate::core::DEFAULT_PAGE_SIZE))
    }
}

fn lenient_number(raw: Option<&str>, default: i64) -> i64 {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or(0),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBooksResponse {
    pub books: Vec<BookResponse>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl ListBooksResponse {
    pub fn new(listed: Page, request: PageRequest) -> Self {
        let total_pages = listed.total_pages(request);
        Self {
            books: listed.books.into_iter().map(BookResponse::from).collect(),
            page: request.page(),
            page_size: request.size(),
            total_items: listed.total,
            total_pages,
        }
    }
}
