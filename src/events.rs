use crate::counts::CopyCounts;

/// Mutations applied by the inventory engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    /// A title was catalogued for the first time
    Catalogued {
        /// ISBN of the new title
        isbn: String,
        /// Counts after the add
        counts: CopyCounts,
    },
    /// More copies of a known title were added
    CopiesAdded {
        /// ISBN of the title
        isbn: String,
        /// Copies added by this call
        added: u32,
        /// Counts after the add
        counts: CopyCounts,
    },
    /// A copy was checked out
    CheckedOut {
        /// ISBN of the title
        isbn: String,
        /// Counts after the checkout
        counts: CopyCounts,
    },
    /// A copy was returned
    Returned {
        /// ISBN of the title
        isbn: String,
        /// Counts after the return
        counts: CopyCounts,
    },
    /// Both structures were emptied
    Reset,
}

impl InventoryEvent {
    /// ISBN the event refers to, if any
    #[must_use]
    pub fn isbn(&self) -> Option<&str> {
        match self {
            Self::Catalogued { isbn, .. }
            | Self::CopiesAdded { isbn, .. }
            | Self::CheckedOut { isbn, .. }
            | Self::Returned { isbn, .. } => Some(isbn.as_str()),
            Self::Reset => None,
        }
    }
}
