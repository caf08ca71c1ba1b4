//! In-memory book inventory index.
//!
//! Titles are kept in two structures: an ISBN-ordered binary search tree
//! that owns the total and available copy counts, and an insertion-ordered
//! registry used for title/author lookups. [`Inventory`] coordinates them;
//! [`persistence`] and [`shell`] are thin wrappers around it.

pub mod book;
pub mod config;
pub mod counts;
pub mod error;
pub mod events;
pub mod index;
pub mod inventory;
pub mod observers;
pub mod persistence;
pub mod registry;
pub mod shell;

pub use book::{Book, CatalogEntry};
pub use config::{Config, LogFormat};
pub use counts::CopyCounts;
pub use error::{IndexError, InventoryError, PersistenceError};
pub use events::InventoryEvent;
pub use index::OrderedIndex;
pub use inventory::Inventory;
pub use registry::InsertionRegistry;
pub use shell::Shell;
