//! Error types for inventory, index and persistence operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for inventory operations.
pub type Result<T, E = InventoryError> = std::result::Result<T, E>;

/// Errors reported by the inventory engine.
///
/// Every variant is recoverable: a failed operation leaves the engine
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// An input field was missing or out of range
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Name of the offending field
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },
    /// No catalog entry matched the lookup
    #[error("book not found: {0}")]
    NotFound(String),
    /// Checkout requested while every copy is out
    #[error("no copies of the book with ISBN {isbn} are available for checkout")]
    Unavailable {
        /// ISBN of the requested title
        isbn: String,
    },
    /// Return requested while no copy is checked out
    #[error("no checked-out copies of the book with ISBN {isbn} to return")]
    InvalidState {
        /// ISBN of the returned title
        isbn: String,
    },
}

impl InventoryError {
    /// Shorthand for an [`InventoryError::InvalidArgument`].
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument { field, reason: reason.into() }
    }
}

/// Errors reported by the ordered index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The key is not in the tree
    #[error("{0} not in tree")]
    NotFound(String),
    /// The adjustment would leave available copies outside `0..=total`
    #[error("adjusting {isbn} by {delta} leaves available copies outside 0..={total}")]
    OutOfRange {
        /// Key of the node
        isbn: String,
        /// Requested change
        delta: i64,
        /// Total copies held by the node
        total: u32,
    },
}

/// Errors reported while saving or loading a catalog file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file could not be opened, read or written
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// A JSON snapshot could not be encoded or decoded
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// A line does not follow the `title,author,isbn,year,copies` layout
    #[error("line {line}: {reason}")]
    Format {
        /// 1-based line (or entry) number
        line: usize,
        /// What was wrong with it
        reason: String,
    },
    /// A well-formed line was refused by the engine
    #[error("line {line}: {source}")]
    Rejected {
        /// 1-based line (or entry) number
        line: usize,
        /// Engine error
        #[source]
        source: InventoryError,
    },
}
