use std::{fmt, rc::Rc};

use chrono::{Datelike, Utc};
use tracing::{debug, info};

use crate::{
    book::{Book, CatalogEntry},
    counts::CopyCounts,
    error::{IndexError, InventoryError, Result},
    events::InventoryEvent,
    index::{Insertion, OrderedIndex},
    observers::InventoryObserver,
    registry::InsertionRegistry,
};

/// Book inventory: an ISBN-ordered index plus an insertion registry
///
/// The index owns the copy counts. The registry records each distinct ISBN
/// once, newest first, and serves title/author lookups. Every mutation goes
/// through this type so the two structures never disagree.
pub struct Inventory {
    /// Canonical copy counts, keyed by ISBN
    index: OrderedIndex,
    /// One entry per distinct ISBN, newest first
    registry: InsertionRegistry,
    /// Latest publication year accepted by `add`
    current_year: i32,
    /// Registered change observers
    observers: Vec<Box<dyn InventoryObserver>>,
}

// Manual implementation of Debug for Inventory
impl fmt::Debug for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inventory")
            .field("index", &self.index)
            .field("registry", &self.registry)
            .field("current_year", &self.current_year)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// Create an empty inventory that accepts books published up to this year
    #[must_use]
    pub fn new() -> Self {
        Self::with_current_year(Utc::now().year())
    }

    /// Create an empty inventory with an explicit upper bound on publication years
    #[must_use]
    pub fn with_current_year(current_year: i32) -> Self {
        Self {
            index: OrderedIndex::new(),
            registry: InsertionRegistry::new(),
            current_year,
            observers: Vec::new(),
        }
    }

    /// Latest accepted publication year
    #[must_use]
    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Register an observer to be notified of mutations
    pub fn register_observer(&mut self, observer: Box<dyn InventoryObserver>) {
        self.observers.push(observer);
    }

    /// Catalogue `copies` copies of a book
    ///
    /// A known ISBN gets the copies added to both its total and available
    /// counts; the record stored on first add is kept. An unknown ISBN is
    /// inserted into the index and recorded once in the registry.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::InvalidArgument` naming the field if a text
    /// field is empty, the year is outside `0..=current_year`, or `copies`
    /// is below 1 or would overflow the counts.
    pub fn add(
        &mut self,
        title: &str,
        author: &str,
        isbn: &str,
        publication_year: i32,
        copies: i64,
    ) -> Result<CopyCounts> {
        let (book, copies) = self.validate(title, author, isbn, publication_year, copies)?;
        let insertion = self.insert(book, copies)?;
        self.notify(&catalog_event(isbn, copies, insertion));
        Ok(insertion.counts())
    }

    /// Check out one copy of `isbn`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty ISBN, `NotFound` if it is not
    /// catalogued, and `Unavailable` if every copy is already out.
    pub fn checkout(&mut self, isbn: &str) -> Result<CopyCounts> {
        let counts = self.list(isbn)?;
        if counts.available() == 0 {
            return Err(InventoryError::Unavailable { isbn: isbn.to_string() });
        }
        let counts = self.index.adjust_available(isbn, -1).map_err(|error| match error {
            IndexError::NotFound(isbn) => InventoryError::NotFound(isbn),
            IndexError::OutOfRange { isbn, .. } => InventoryError::Unavailable { isbn },
        })?;
        debug!(isbn, %counts, "checked out");
        self.notify(&InventoryEvent::CheckedOut { isbn: isbn.to_string(), counts });
        Ok(counts)
    }

    /// Return one checked-out copy of `isbn`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty ISBN, `NotFound` if it is not
    /// catalogued, and `InvalidState` if no copy is checked out.
    pub fn return_copy(&mut self, isbn: &str) -> Result<CopyCounts> {
        let counts = self.list(isbn)?;
        if counts.checked_out() == 0 {
            return Err(InventoryError::InvalidState { isbn: isbn.to_string() });
        }
        let counts = self.index.adjust_available(isbn, 1).map_err(|error| match error {
            IndexError::NotFound(isbn) => InventoryError::NotFound(isbn),
            IndexError::OutOfRange { isbn, .. } => InventoryError::InvalidState { isbn },
        })?;
        debug!(isbn, %counts, "returned");
        self.notify(&InventoryEvent::Returned { isbn: isbn.to_string(), counts });
        Ok(counts)
    }

    /// Look up a title by ISBN
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty ISBN and `NotFound` if it is
    /// not catalogued.
    pub fn find_by_isbn(&self, isbn: &str) -> Result<CatalogEntry<'_>> {
        require("isbn", isbn)?;
        self.index.find(isbn).ok_or_else(|| InventoryError::NotFound(format!("ISBN {isbn}")))
    }

    /// Look up the most recently catalogued title matching both fields,
    /// ignoring case
    ///
    /// This is a linear walk of the registry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either field is empty and `NotFound` if
    /// nothing matches.
    pub fn find_by_title_and_author(&self, title: &str, author: &str) -> Result<CatalogEntry<'_>> {
        require("title", title)?;
        require("author", author)?;
        self.registry
            .scan(|book| book.matches_title_and_author(title, author))
            .next()
            .and_then(|book| self.index.find(book.isbn()))
            .ok_or_else(|| InventoryError::NotFound(format!("title = {title}, author = {author}")))
    }

    /// Total and available copies of `isbn`
    ///
    /// # Errors
    ///
    /// Same as [`Inventory::find_by_isbn`].
    pub fn list(&self, isbn: &str) -> Result<CopyCounts> {
        self.find_by_isbn(isbn).map(|entry| entry.counts)
    }

    /// Whether `isbn` is catalogued
    #[must_use]
    pub fn contains(&self, isbn: &str) -> bool {
        self.index.contains(isbn)
    }

    /// Number of distinct titles
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether nothing is catalogued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Catalogued titles, newest first, with counts read from the index
    pub fn entries(&self) -> impl Iterator<Item = CatalogEntry<'_>> {
        self.registry.iter().filter_map(|book| self.index.find(book.isbn()))
    }

    /// The ordered index, read-only
    #[must_use]
    pub fn index(&self) -> &OrderedIndex {
        &self.index
    }

    /// The insertion registry, read-only
    #[must_use]
    pub fn registry(&self) -> &InsertionRegistry {
        &self.registry
    }

    /// Empty both structures
    pub fn reset(&mut self) {
        self.index.clear();
        self.registry.clear();
        info!("inventory reset");
        self.notify(&InventoryEvent::Reset);
    }

    /// Catalogue a title with some copies already checked out
    ///
    /// Used when restoring a snapshot. Behaves like [`Inventory::add`]
    /// followed by `total - available` checkouts, applied atomically.
    /// Observers see a single event carrying the final counts.
    ///
    /// # Errors
    ///
    /// Same as [`Inventory::add`], plus `InvalidArgument` on `available` if
    /// it is negative or exceeds `total`.
    pub fn restore(
        &mut self,
        title: &str,
        author: &str,
        isbn: &str,
        publication_year: i32,
        total: i64,
        available: i64,
    ) -> Result<CopyCounts> {
        if !(0..=total).contains(&available) {
            return Err(InventoryError::invalid(
                "available",
                format!("{available} is not between 0 and {total}"),
            ));
        }
        let (book, copies) = self.validate(title, author, isbn, publication_year, total)?;
        let mut insertion = self.insert(book, copies)?;
        let checked_out = total.saturating_sub(available);
        if checked_out > 0 {
            let counts = self
                .index
                .adjust_available(isbn, checked_out.saturating_neg())
                .map_err(|error| InventoryError::invalid("available", error.to_string()))?;
            insertion = match insertion {
                Insertion::Created(_) => Insertion::Created(counts),
                Insertion::Updated(_) => Insertion::Updated(counts),
            };
        }
        self.notify(&catalog_event(isbn, copies, insertion));
        Ok(insertion.counts())
    }

    /// Put a validated record into the index, recording new ISBNs in the
    /// registry. Observers are not notified.
    fn insert(&mut self, book: Book, copies: u32) -> Result<Insertion> {
        let book = Rc::new(book);
        let insertion =
            self.index.insert_or_update(Rc::clone(&book), copies).map_err(|error| match error {
                IndexError::OutOfRange { total, .. } => InventoryError::invalid(
                    "copies",
                    format!("adding {copies} to {total} copies overflows the count"),
                ),
                IndexError::NotFound(isbn) => InventoryError::NotFound(isbn),
            })?;
        if matches!(insertion, Insertion::Created(_)) {
            self.registry.append(book);
        }
        Ok(insertion)
    }

    /// Check every field of an add request
    fn validate(
        &self,
        title: &str,
        author: &str,
        isbn: &str,
        publication_year: i32,
        copies: i64,
    ) -> Result<(Book, u32)> {
        require_trimmed("title", title)?;
        require_trimmed("author", author)?;
        require_trimmed("isbn", isbn)?;
        if !(0..=self.current_year).contains(&publication_year) {
            return Err(InventoryError::invalid(
                "publication_year",
                format!("{publication_year} is not between 0 and {}", self.current_year),
            ));
        }
        if copies < 1 {
            return Err(InventoryError::invalid("copies", "number of copies must be 1 or more"));
        }
        let copies = u32::try_from(copies).map_err(|_| {
            InventoryError::invalid("copies", format!("{copies} copies is more than can be tracked"))
        })?;
        Ok((Book::new(title, author, isbn, publication_year), copies))
    }

    /// Notify every observer of `event`
    fn notify(&self, event: &InventoryEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Reject empty or blank text fields
fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(InventoryError::invalid(field, "must not be empty"));
    }
    Ok(())
}

/// Reject blank fields and fields with leading or trailing whitespace,
/// which the flat-text format cannot carry
fn require_trimmed(field: &'static str, value: &str) -> Result<()> {
    require(field, value)?;
    if value.trim() != value {
        return Err(InventoryError::invalid(field, "must not start or end with whitespace"));
    }
    Ok(())
}

/// Event describing the outcome of an insert
fn catalog_event(isbn: &str, added: u32, insertion: Insertion) -> InventoryEvent {
    match insertion {
        Insertion::Created(counts) => InventoryEvent::Catalogued { isbn: isbn.to_string(), counts },
        Insertion::Updated(counts) => {
            InventoryEvent::CopiesAdded { isbn: isbn.to_string(), added, counts }
        }
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} titles", self.len())
    }
}
