use std::fmt;

/// Total and available copy counts of one catalogued title
///
/// The pair always satisfies `available <= total`; every transition is
/// checked and returns `None` instead of breaking that bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyCounts {
    /// Copies ever added
    total: u32,
    /// Copies on the shelf
    available: u32,
}

impl CopyCounts {
    /// Counts for a freshly catalogued title: everything is on the shelf
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self { total, available: total }
    }

    /// Counts with some copies already checked out
    ///
    /// Returns `None` when `available > total`.
    #[must_use]
    pub fn with_available(total: u32, available: u32) -> Option<Self> {
        (available <= total).then_some(Self { total, available })
    }

    /// Copies ever added
    #[must_use]
    pub fn total(self) -> u32 {
        self.total
    }

    /// Copies not checked out
    #[must_use]
    pub fn available(self) -> u32 {
        self.available
    }

    /// Copies currently checked out
    #[must_use]
    pub fn checked_out(self) -> u32 {
        self.total.saturating_sub(self.available)
    }

    /// Fold `copies` more copies into both counters
    #[must_use]
    pub fn add_copies(self, copies: u32) -> Option<Self> {
        Some(Self {
            total: self.total.checked_add(copies)?,
            available: self.available.checked_add(copies)?,
        })
    }

    /// Move `delta` copies onto (positive) or off (negative) the shelf
    #[must_use]
    pub fn adjust_available(self, delta: i64) -> Option<Self> {
        let available = i64::from(self.available).checked_add(delta)?;
        let available = u32::try_from(available).ok()?;
        Self::with_available(self.total, available)
    }

    /// Get a human-readable description of the counts
    #[must_use]
    pub fn get_description(self) -> String {
        match (self.available, self.checked_out()) {
            (0, _) => format!("All {} copies are checked out", self.total),
            (_, 0) => format!("All {} copies are available", self.total),
            (available, out) => format!("{available} available, {out} checked out"),
        }
    }
}

impl fmt::Display for CopyCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} available", self.available, self.total)
    }
}
