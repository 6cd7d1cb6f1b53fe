use thiserror::Error;

/// Caller-visible failure taxonomy of the book catalogue.
///
/// The boundary layers (HTTP, CLI) switch on the variant to pick a status;
/// nothing downstream inspects error text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Operation cancelled")]
    Cancelled,
}

impl BookError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("book {id} not found"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code used in error bodies.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

pub type Result<T> = std::result::Result<T, BookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(BookError::not_found(7).code(), "NOT_FOUND");
        assert_eq!(BookError::validation("x").code(), "VALIDATION_ERROR");
        assert_eq!(BookError::DeadlineExceeded.code(), "DEADLINE_EXCEEDED");
    }

    #[test]
    fn not_found_message_names_the_id() {
        assert_eq!(
            BookError::not_found(42).to_string(),
            "Not found: book 42 not found"
        );
    }
}
