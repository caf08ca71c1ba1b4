//! ISBN-ordered binary search tree holding the canonical copy counts.
//!
//! Nodes live in an arena and refer to each other by slot number. Each node
//! is owned by the arena and reachable from exactly one parent link; the
//! `parent` field is a plain back-reference used for successor walks and for
//! splicing during removal. The tree is not rebalanced.

use std::{cmp::Ordering, fmt, rc::Rc};

use tracing::debug;

use crate::{
    book::{Book, CatalogEntry},
    counts::CopyCounts,
    error::IndexError,
};

/// Arena slot number of a tree node
type NodeId = usize;

/// Data carried by a node, moved as a unit when a node is removed
#[derive(Debug, Clone)]
struct Payload {
    /// Shared catalog record; its ISBN is the node's key
    book: Rc<Book>,
    /// Canonical copy counts for the key
    counts: CopyCounts,
}

/// A node of the tree
#[derive(Debug)]
struct TreeNode {
    /// Key and value of the node
    payload: Payload,
    /// Subtree of smaller keys
    left: Option<NodeId>,
    /// Subtree of greater keys
    right: Option<NodeId>,
    /// Back-reference to the owning node, `None` at the root
    parent: Option<NodeId>,
}

impl TreeNode {
    /// The key of this node
    fn key(&self) -> &str {
        self.payload.book.isbn()
    }
}

/// Which child link of a parent a new node hangs from
#[derive(Debug, Clone, Copy)]
enum Side {
    /// The left link
    Left,
    /// The right link
    Right,
}

/// Result of descending the tree for a key
#[derive(Debug)]
enum Probe {
    /// The key is stored at this node
    Occupied(NodeId),
    /// The key is absent and would be attached here (`None` for an empty tree)
    Vacant(Option<(NodeId, Side)>),
}

/// Outcome of [`OrderedIndex::insert_or_update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new node was created with the given counts
    Created(CopyCounts),
    /// An existing node absorbed the copies and now holds these counts
    Updated(CopyCounts),
}

impl Insertion {
    /// The counts held by the node after the call
    #[must_use]
    pub fn counts(&self) -> CopyCounts {
        match self {
            Self::Created(counts) | Self::Updated(counts) => *counts,
        }
    }
}

/// Binary search tree keyed by ISBN
#[derive(Default)]
pub struct OrderedIndex {
    /// Node arena; `None` marks a freed slot
    nodes: Vec<Option<TreeNode>>,
    /// Freed slots available for reuse
    free: Vec<NodeId>,
    /// Root of the tree
    root: Option<NodeId>,
    /// Number of live nodes
    len: usize,
}

impl fmt::Debug for OrderedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedIndex")
            .field("len", &self.len)
            .field("height", &self.height())
            .field("root", &self.root.and_then(|id| self.node(id)).map(TreeNode::key))
            .finish_non_exhaustive()
    }
}

impl OrderedIndex {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in the tree
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Insert `book` with `copies` copies, or fold the copies into the
    /// existing node for its ISBN.
    ///
    /// A new node starts with every copy available. An existing node grows
    /// both its total and its available count by `copies`; the stored book
    /// record is kept.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::OutOfRange` if the counts would overflow. The
    /// tree is unchanged in that case.
    pub fn insert_or_update(
        &mut self,
        book: Rc<Book>,
        copies: u32,
    ) -> Result<Insertion, IndexError> {
        match self.probe(book.isbn()) {
            Probe::Occupied(id) => {
                let node = self
                    .node_mut(id)
                    .ok_or_else(|| IndexError::NotFound(book.isbn().to_string()))?;
                let counts = node.payload.counts.add_copies(copies).ok_or_else(|| {
                    IndexError::OutOfRange {
                        isbn: book.isbn().to_string(),
                        delta: i64::from(copies),
                        total: node.payload.counts.total(),
                    }
                })?;
                node.payload.counts = counts;
                debug!(isbn = book.isbn(), %counts, "updated index node");
                Ok(Insertion::Updated(counts))
            }
            Probe::Vacant(parent) => {
                let counts = CopyCounts::new(copies);
                let isbn = book.isbn().to_string();
                let id = self.alloc(TreeNode {
                    payload: Payload { book, counts },
                    left: None,
                    right: None,
                    parent: parent.map(|(id, _)| id),
                });
                match parent {
                    None => self.root = Some(id),
                    Some((parent_id, side)) => {
                        if let Some(parent) = self.node_mut(parent_id) {
                            match side {
                                Side::Left => parent.left = Some(id),
                                Side::Right => parent.right = Some(id),
                            }
                        }
                    }
                }
                self.len = self.len.saturating_add(1);
                debug!(isbn = %isbn, %counts, "inserted index node");
                Ok(Insertion::Created(counts))
            }
        }
    }

    /// Look up the entry for `isbn`
    #[must_use]
    pub fn find(&self, isbn: &str) -> Option<CatalogEntry<'_>> {
        self.find_id(isbn).and_then(|id| self.entry(id))
    }

    /// Whether `isbn` is in the tree
    #[must_use]
    pub fn contains(&self, isbn: &str) -> bool {
        self.find_id(isbn).is_some()
    }

    /// Add `delta` to the available count of `isbn`
    ///
    /// # Errors
    ///
    /// Returns `IndexError::NotFound` for an absent key, and
    /// `IndexError::OutOfRange` if the result would fall below zero or above
    /// the node's total. Nothing changes on error.
    pub fn adjust_available(&mut self, isbn: &str, delta: i64) -> Result<CopyCounts, IndexError> {
        let node = self
            .find_id(isbn)
            .and_then(|id| self.node_mut(id))
            .ok_or_else(|| IndexError::NotFound(isbn.to_string()))?;
        let counts = node.payload.counts.adjust_available(delta).ok_or_else(|| {
            IndexError::OutOfRange {
                isbn: isbn.to_string(),
                delta,
                total: node.payload.counts.total(),
            }
        })?;
        node.payload.counts = counts;
        Ok(counts)
    }

    /// Remove `isbn` from the tree, returning its book and counts
    ///
    /// A node with two children takes over the payload of its in-order
    /// successor, which is then unlinked in its place.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::NotFound` if the key is absent; the tree is
    /// unchanged in that case.
    pub fn remove(&mut self, isbn: &str) -> Result<(Rc<Book>, CopyCounts), IndexError> {
        let payload = self
            .find_id(isbn)
            .and_then(|id| self.unlink(id))
            .ok_or_else(|| IndexError::NotFound(isbn.to_string()))?;
        self.len = self.len.saturating_sub(1);
        debug!(isbn, "removed index node");
        Ok((payload.book, payload.counts))
    }

    /// Smallest key in the tree
    #[must_use]
    pub fn min(&self) -> Option<&str> {
        self.root.map(|id| self.min_from(id)).and_then(|id| self.node(id)).map(TreeNode::key)
    }

    /// Next key after `isbn` in key order
    #[must_use]
    pub fn successor(&self, isbn: &str) -> Option<&str> {
        self.find_id(isbn)
            .and_then(|id| self.successor_id(id))
            .and_then(|id| self.node(id))
            .map(TreeNode::key)
    }

    /// Number of nodes on the longest root-to-leaf path
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|id| (id, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            if let Some(node) = self.node(id) {
                let below = depth.saturating_add(1);
                stack.extend(node.left.map(|l| (l, below)));
                stack.extend(node.right.map(|r| (r, below)));
            }
        }
        height
    }

    /// Entries in ascending key order
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter { index: self, next: self.root.map(|id| self.min_from(id)) }
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|entry| entry.book.isbn())
    }

    /// Shared node access
    fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    /// Exclusive node access
    fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    /// Read-only view of a node
    fn entry(&self, id: NodeId) -> Option<CatalogEntry<'_>> {
        self.node(id).map(|node| CatalogEntry { book: &node.payload.book, counts: node.payload.counts })
    }

    /// Store a node in a free slot or at the end of the arena
    fn alloc(&mut self, node: TreeNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            if let Some(slot) = self.nodes.get_mut(id) {
                *slot = Some(node);
                return id;
            }
        }
        let id = self.nodes.len();
        self.nodes.push(Some(node));
        id
    }

    /// Descend from the root comparing keys
    fn probe(&self, isbn: &str) -> Probe {
        let mut parent = None;
        let mut current = self.root;
        while let Some((id, node)) = current.and_then(|id| self.node(id).map(|node| (id, node))) {
            match isbn.cmp(node.key()) {
                Ordering::Equal => return Probe::Occupied(id),
                Ordering::Less => {
                    parent = Some((id, Side::Left));
                    current = node.left;
                }
                Ordering::Greater => {
                    parent = Some((id, Side::Right));
                    current = node.right;
                }
            }
        }
        Probe::Vacant(parent)
    }

    /// Slot holding `isbn`, if any
    fn find_id(&self, isbn: &str) -> Option<NodeId> {
        match self.probe(isbn) {
            Probe::Occupied(id) => Some(id),
            Probe::Vacant(_) => None,
        }
    }

    /// Leftmost node of the subtree rooted at `id`
    fn min_from(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).and_then(|node| node.left) {
            id = left;
        }
        id
    }

    /// In-order successor of `id`
    fn successor_id(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        if let Some(right) = node.right {
            return Some(self.min_from(right));
        }
        let mut child = id;
        let mut parent = node.parent;
        while let Some(parent_id) = parent {
            let parent_node = self.node(parent_id)?;
            if parent_node.right != Some(child) {
                break;
            }
            child = parent_id;
            parent = parent_node.parent;
        }
        parent
    }

    /// Detach node `id` from the tree and return the payload it held
    fn unlink(&mut self, id: NodeId) -> Option<Payload> {
        let node = self.node(id)?;
        match (node.left, node.right) {
            (Some(_), Some(right)) => {
                // The successor has no left child, so this recursion is one level deep.
                let successor = self.min_from(right);
                let moved = self.unlink(successor)?;
                let node = self.node_mut(id)?;
                Some(std::mem::replace(&mut node.payload, moved))
            }
            (child, None) | (None, child) => {
                self.replace_in_parent(id, child);
                let node = self.nodes.get_mut(id).and_then(Option::take)?;
                self.free.push(id);
                Some(node.payload)
            }
        }
    }

    /// Point the link that owns `id` at `child` instead, and fix the
    /// child's back-reference
    fn replace_in_parent(&mut self, id: NodeId, child: Option<NodeId>) {
        let parent = self.node(id).and_then(|node| node.parent);
        match parent {
            None => self.root = child,
            Some(parent_id) => {
                if let Some(parent_node) = self.node_mut(parent_id) {
                    if parent_node.left == Some(id) {
                        parent_node.left = child;
                    } else {
                        parent_node.right = child;
                    }
                }
            }
        }
        if let Some(child_node) = child.and_then(|child_id| self.node_mut(child_id)) {
            child_node.parent = parent;
        }
    }
}

/// In-order iterator over an [`OrderedIndex`]
#[derive(Debug)]
pub struct Iter<'a> {
    /// Tree being walked
    index: &'a OrderedIndex,
    /// Next node to yield
    next: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = CatalogEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.index.successor_id(id);
        self.index.entry(id)
    }
}
