use super::error::{BookError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Earliest accepted publication year.
pub const MIN_PUBLICATION_YEAR: i32 = 1500;
/// Page size used when the caller supplies none or an out-of-range one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size a listing may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Store-assigned book identifier. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct BookId(u64);

impl BookId {
    pub fn new(raw: u64) -> Result<Self> {
        if raw == 0 {
            return Err(BookError::validation("invalid book ID"));
        }
        Ok(Self(raw))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for BookId {
    type Error = BookError;

    fn try_from(raw: u64) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<BookId> for u64 {
    fn from(id: BookId) -> Self {
        id.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored book as returned by the store and cached snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Checks required fields and the publication year window
    /// `[MIN_PUBLICATION_YEAR, current year]`.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(BookError::validation("book title is required"));
        }
        if self.author.trim().is_empty() {
            return Err(BookError::validation("book author is required"));
        }

        let current_year = Utc::now().year();
        if self.year < MIN_PUBLICATION_YEAR || self.year > current_year {
            return Err(BookError::Validation(format!(
                "book year must be between {MIN_PUBLICATION_YEAR} and {current_year}"
            )));
        }
        Ok(())
    }
}

/// Pagination window after coercion. `page >= 1`, `size` in `[1, MAX_PAGE_SIZE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Coerces raw pagination input instead of rejecting it: a page below one
    /// becomes one, a size outside `[1, MAX_PAGE_SIZE]` becomes the default.
    pub fn normalize(page: i64, size: i64) -> Self {
        let page = if page < 1 {
            1
        } else {
            u32::try_from(page).unwrap_or(u32::MAX)
        };
        let size = if (1..=i64::from(MAX_PAGE_SIZE)).contains(&size) {
            size as u32
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self { page, size }
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn size(&self) -> u32 {
        self.size
    }

    pub const fn limit(&self) -> usize {
        self.size as usize
    }

    pub const fn offset(&self) -> usize {
        (self.page as usize - 1) * self.size as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One listing window plus the count of all live books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub books: Vec<Book>,
    pub total: u64,
}

impl Page {
    pub fn total_pages(&self, request: PageRequest) -> u64 {
        self.total.div_ceil(u64::from(request.size()))
    }
}
