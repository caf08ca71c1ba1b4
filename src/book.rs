use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::counts::CopyCounts;

/// Catalog fields of a title
///
/// Copy counts are not part of the record: they live in the ordered index
/// next to the node that owns the book, and are read through a
/// [`CatalogEntry`].
#[derive(Debug, Clone)]
pub struct Book {
    /// Title of the book
    title: String,
    /// Author of the book
    author: String,
    /// Unique catalog key
    isbn: String,
    /// Year of publication
    publication_year: i32,
}

impl Book {
    /// Create a new catalog record
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        publication_year: i32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            publication_year,
        }
    }

    /// The title of the book
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The author of the book
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// The ISBN of the book
    #[must_use]
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    /// The publication year of the book
    #[must_use]
    pub fn publication_year(&self) -> i32 {
        self.publication_year
    }

    /// Case-insensitive match on both title and author
    #[must_use]
    pub fn matches_title_and_author(&self, title: &str, author: &str) -> bool {
        eq_ignore_case(&self.title, title) && eq_ignore_case(&self.author, author)
    }
}

/// Unicode-aware case-insensitive equality
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().flat_map(char::to_lowercase).eq(b.chars().flat_map(char::to_lowercase))
}

// Two records are the same book when title, author and ISBN all match.
impl PartialEq for Book {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.author == other.author && self.isbn == other.isbn
    }
}

impl Eq for Book {}

impl Hash for Book {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.author.hash(state);
        self.isbn.hash(state);
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} ({}, ISBN {})", self.title, self.author, self.publication_year, self.isbn)
    }
}

/// Read-only view of a catalogued title together with its copy counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry<'a> {
    /// The catalog record
    pub book: &'a Book,
    /// Counts held by the index for this ISBN
    pub counts: CopyCounts,
}

impl CatalogEntry<'_> {
    /// Total copies ever added for this ISBN
    #[must_use]
    pub fn total_copies(&self) -> u32 {
        self.counts.total()
    }

    /// Copies not currently checked out
    #[must_use]
    pub fn available_copies(&self) -> u32 {
        self.counts.available()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::Book;

    #[test]
    fn test_identity_ignores_publication_year() {
        let a = Book::new("Dune", "Frank Herbert", "ISBN-001", 1965);
        let b = Book::new("Dune", "Frank Herbert", "ISBN-001", 1966);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_identity_requires_all_three_fields() {
        let a = Book::new("Dune", "Frank Herbert", "ISBN-001", 1965);
        assert_ne!(a, Book::new("Dune", "Frank Herbert", "ISBN-002", 1965));
        assert_ne!(a, Book::new("Dune Messiah", "Frank Herbert", "ISBN-001", 1965));
        assert_ne!(a, Book::new("Dune", "Brian Herbert", "ISBN-001", 1965));
    }

    #[test]
    fn test_title_and_author_match_is_case_insensitive() {
        let book = Book::new("Dune", "Frank Herbert", "ISBN-001", 1965);
        assert!(book.matches_title_and_author("dune", "FRANK HERBERT"));
        assert!(!book.matches_title_and_author("dune", "frank"));
        assert!(!book.matches_title_and_author("dun", "frank herbert"));
    }
}
