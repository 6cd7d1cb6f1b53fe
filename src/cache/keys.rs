//! Cache key scheme.
//!
//! Single books and listing pages live in disjoint namespaces so a listing
//! sweep can never evict an entity entry and vice versa.

use crate::core::{BookId, PageRequest};

pub const BOOK_KEY_PREFIX: &str = "book:";
pub const LISTING_KEY_PREFIX: &str = "books:page:";

pub fn book_key(id: BookId) -> String {
    format!("{BOOK_KEY_PREFIX}{id}")
}

pub fn listing_key(request: PageRequest) -> String {
    format!(
        "{LISTING_KEY_PREFIX}{}:{}",
        request.page(),
        request.size()
    )
}

pub fn is_listing_key(key: &str) -> bool {
    key.starts_with(LISTING_KEY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_do_not_overlap() {
        let book = book_key(BookId::new(1).unwrap());
        let listing = listing_key(PageRequest::normalize(1, 10));

        assert_eq!(book, "book:1");
        assert_eq!(listing, "books:page:1:10");
        assert!(!is_listing_key(&book));
        assert!(is_listing_key(&listing));
        assert!(!listing.starts_with(BOOK_KEY_PREFIX));
    }
}
