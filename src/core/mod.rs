pub mod context;
pub mod error;
pub mod types;

pub use context::{CancelHandle, RequestContext};
pub use error::{BookError, Result};
pub use types::{
    Book, BookDraft, BookId, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PUBLICATION_YEAR, Page,
    PageRequest,
};
