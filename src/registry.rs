//! Insertion-ordered chain of catalogued titles.
//!
//! Each distinct ISBN is recorded once, at the head, so a walk visits the
//! most recently catalogued title first. The registry only hands out shared
//! references to books; copy counts are never read or written through it.

use std::{fmt, iter::FusedIterator, rc::Rc};

use crate::book::Book;

/// A link in the chain
struct RegistryNode {
    /// Record shared with the ordered index
    book: Rc<Book>,
    /// Next older entry
    next: Option<Box<RegistryNode>>,
}

/// Singly linked list of catalogued books, newest first
#[derive(Default)]
pub struct InsertionRegistry {
    /// Most recently appended node
    head: Option<Box<RegistryNode>>,
    /// Number of nodes in the chain
    len: usize,
}

impl fmt::Debug for InsertionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(Book::isbn)).finish()
    }
}

impl InsertionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `book` at the head of the chain
    pub fn append(&mut self, book: Rc<Book>) {
        let next = self.head.take();
        self.head = Some(Box::new(RegistryNode { book, next }));
        self.len = self.len.saturating_add(1);
    }

    /// Number of recorded books
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Drop every node
    pub fn clear(&mut self) {
        // Unlink iteratively; dropping a long chain recursively can overflow the stack.
        let mut current = self.head.take();
        while let Some(mut node) = current {
            current = node.next.take();
        }
        self.len = 0;
    }

    /// Walk the chain head to tail
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter { next: self.head.as_deref() }
    }

    /// Lazily yield the books accepted by `predicate`, newest first
    ///
    /// Each call starts a fresh walk from the head.
    pub fn scan<P>(&self, predicate: P) -> impl Iterator<Item = &Book>
    where
        P: FnMut(&&Book) -> bool,
    {
        self.iter().filter(predicate)
    }
}

impl Drop for InsertionRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Head-to-tail iterator over an [`InsertionRegistry`]
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    /// Node to yield next
    next: Option<&'a RegistryNode>,
}

impl fmt::Debug for RegistryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryNode").field("isbn", &self.book.isbn()).finish_non_exhaustive()
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Book;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(node.book.as_ref())
    }
}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a InsertionRegistry {
    type Item = &'a Book;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
