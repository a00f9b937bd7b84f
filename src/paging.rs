//! Page position model for paginated API responses.

use std::fmt;

use serde::Serialize;

/// Position of one page within a page set.
///
/// A `PagingModel` is immutable; every transition ([`increment`],
/// [`decrement`], [`with_per`]) returns a fresh value. Constructed models
/// always satisfy `current >= 1` and `last >= current`, with `previous`
/// absent exactly on the first page and `next` absent exactly on the last.
///
/// The [`sentinel`] model has every field at zero. It means "no pagination":
/// requests built from it carry no page parameters, and since
/// `current == last` it increments to `None`, so a fan-out over the
/// sentinel issues exactly one request.
///
/// [`increment`]: PagingModel::increment
/// [`decrement`]: PagingModel::decrement
/// [`with_per`]: PagingModel::with_per
/// [`sentinel`]: PagingModel::sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PagingModel {
    current: u32,
    previous: Option<u32>,
    next: Option<u32>,
    last: u32,
    per: u32,
}

impl PagingModel {
    /// Create a model for page `current` of `last`, with `per` items per page.
    ///
    /// `current` is clamped up to 1 and `last` up to `current`.
    #[must_use]
    pub fn new(current: u32, last: u32, per: u32) -> Self {
        let current = current.max(1);
        let last = last.max(current);
        Self {
            current,
            previous: (current != 1).then(|| current - 1),
            next: (current != last).then(|| current + 1),
            last,
            per,
        }
    }

    /// The all-zero model used when a request is not paginated.
    #[must_use]
    pub const fn sentinel() -> Self {
        Self {
            current: 0,
            previous: Some(0),
            next: Some(0),
            last: 0,
            per: 0,
        }
    }

    /// Returns true for the all-zero sentinel.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel()
    }

    /// Current page number (1-indexed, 0 only for the sentinel).
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Previous page number, if there is one.
    #[must_use]
    pub const fn previous(&self) -> Option<u32> {
        self.previous
    }

    /// Next page number, if there is one.
    #[must_use]
    pub const fn next(&self) -> Option<u32> {
        self.next
    }

    /// Last page number.
    #[must_use]
    pub const fn last(&self) -> u32 {
        self.last
    }

    /// Items per page (0 when unknown).
    #[must_use]
    pub const fn per(&self) -> u32 {
        self.per
    }

    /// Index of the first item on this page, assuming every earlier page
    /// was fully loaded.
    #[must_use]
    pub fn starting_item_index(&self) -> u64 {
        u64::from(self.current.saturating_sub(1)) * u64::from(self.per)
    }

    /// One single-page model per index from `last` down to `current`.
    ///
    /// The order is descending so the result can be used as a stack:
    /// popping from the end yields the nearest page first. The sentinel
    /// has no pages.
    #[must_use]
    pub fn indexed_pages(&self) -> Vec<Self> {
        if self.is_sentinel() {
            return Vec::new();
        }
        (self.current..=self.last)
            .rev()
            .map(|page| Self::new(page, page, self.per))
            .collect()
    }

    /// Estimated number of items still to download, this page included.
    #[must_use]
    pub fn items_left_to_download(&self) -> u64 {
        let pages = u64::from(self.last) + 1 - u64::from(self.current);
        pages * u64::from(self.per)
    }

    /// The model for the following page, or `None` on the last page.
    #[must_use]
    pub fn increment(&self) -> Option<Self> {
        if self.current == self.last {
            return None;
        }
        Some(Self::new(self.current + 1, self.last, self.per))
    }

    /// The model for the preceding page, or `None` on the first page.
    #[must_use]
    pub fn decrement(&self) -> Option<Self> {
        if self.current == 1 {
            return None;
        }
        Some(Self::new(self.current.saturating_sub(1), self.last, self.per))
    }

    /// Copy of this model with a different items-per-page count.
    #[must_use]
    pub fn with_per(&self, per: u32) -> Self {
        Self::new(self.current, self.last, per)
    }
}

impl fmt::Display for PagingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            return f.write_str("unpaged");
        }
        write!(f, "page {}/{}", self.current, self.last)?;
        if self.per > 0 {
            write!(f, " ({} per page)", self.per)?;
        }
        Ok(())
    }
}
