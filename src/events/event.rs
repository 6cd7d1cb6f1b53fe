use crate::core::{Book, BookId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use uuid::Uuid;

/// Closed set of mutation kinds. Each kind has its own delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "BOOK_CREATED")]
    Created,
    #[serde(rename = "BOOK_UPDATED")]
    Updated,
    #[serde(rename = "BOOK_DELETED")]
    Deleted,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Created, EventKind::Updated, EventKind::Deleted];

    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Created => "BOOK_CREATED",
            EventKind::Updated => "BOOK_UPDATED",
            EventKind::Deleted => "BOOK_DELETED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification about a committed mutation.
///
/// Built only after the store commit succeeded. The timestamp is taken when
/// the event is built, not at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEvent {
    /// Unique ID of the event (random v4).
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Book the event is about.
    pub subject_id: BookId,
    /// Full snapshot for created/updated, id only for deleted.
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl BookEvent {
    pub fn created(book: &Book) -> Self {
        Self::with_snapshot(EventKind::Created, book)
    }

    pub fn updated(book: &Book) -> Self {
        Self::with_snapshot(EventKind::Updated, book)
    }

    pub fn deleted(id: BookId) -> Self {
        Self::new(EventKind::Deleted, id, json!({ "id": id }))
    }

    fn with_snapshot(kind: EventKind, book: &Book) -> Self {
        let data = json!({
            "id": book.id,
            "title": book.title,
            "author": book.author,
            "year": book.year,
        });
        Self::new(kind, book.id, data)
    }

    fn new(kind: EventKind, subject_id: BookId, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            subject_id,
            data,
            timestamp: Utc::now(),
        }
    }

    /// Transport key. Events for one book share it, which is what lets an
    /// ordered-per-key transport keep created, updated, deleted in order.
    pub fn partition_key(&self) -> String {
        self.subject_id.to_string()
    }
}
