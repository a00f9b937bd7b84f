//! Result values carried through the fetch pipeline.
//!
//! A plain [`Result<T>`] is either a value or a [`FetchError`]. Stages are
//! chained with [`Result::and_then`], which applies the next stage to the
//! value and passes an existing error through untouched. A
//! [`PagedResult<T>`] additionally pairs the value with the paging
//! information resolved for the page it came from, and tags a failure with
//! the page whose request failed.

use serde::Serialize;

use crate::error::FetchError;
use crate::paging::PagingModel;

pub use crate::error::Result;

/// A value together with the paging information of the page it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Paged<T> {
    /// The decoded value.
    pub value: T,
    /// Paging resolved from the response, if any signal was found.
    pub paging: Option<PagingModel>,
    /// The paging model the request for this page was built from
    /// ([`PagingModel::sentinel`] when the request was not paginated).
    pub requested: PagingModel,
}

impl<T> Paged<T> {
    /// Pair a value with resolved and requested paging.
    #[must_use]
    pub fn new(value: T, paging: Option<PagingModel>, requested: PagingModel) -> Self {
        Self {
            value,
            paging,
            requested,
        }
    }

    /// The resolved paging, only if it carries a usable items-per-page count.
    ///
    /// `None` means the page should be treated as a single page.
    #[must_use]
    pub fn pagination(&self) -> Option<PagingModel> {
        self.paging.filter(|p| p.per() > 0)
    }

    /// Pages still to fetch after this one, nearest first.
    ///
    /// The pages are produced lazily, so a huge advertised last page costs
    /// nothing until it is consumed.
    pub fn remaining_pages(&self) -> impl Iterator<Item = PagingModel> {
        let next = self.pagination().and_then(|p| p.increment());
        next.into_iter().flat_map(|p| {
            (p.current()..=p.last()).map(move |page| PagingModel::new(page, page, p.per()))
        })
    }

    /// Number of pages still to fetch after this one.
    #[must_use]
    pub fn remaining_page_count(&self) -> u32 {
        self.pagination()
            .map_or(0, |p| p.last().saturating_sub(p.current()))
    }

    /// Map the value, keeping the paging information.
    #[must_use]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Paged<U> {
        Paged {
            value: f(self.value),
            paging: self.paging,
            requested: self.requested,
        }
    }
}

/// A failed page, tagged with the paging model its request was built from.
#[derive(Debug, thiserror::Error)]
#[error("{requested}: {error}")]
pub struct PageError {
    /// The paging model the failed request was built from
    /// ([`PagingModel::sentinel`] when the request was not paginated).
    pub requested: PagingModel,
    /// What went wrong.
    #[source]
    pub error: FetchError,
}

impl PageError {
    pub fn new(requested: PagingModel, error: FetchError) -> Self {
        Self { requested, error }
    }

    /// Numeric code of the underlying error.
    pub fn code(&self) -> u16 {
        self.error.code()
    }
}

impl From<PageError> for FetchError {
    fn from(err: PageError) -> Self {
        err.error
    }
}

/// A paged value or a page-tagged error.
pub type PagedResult<T> = core::result::Result<Paged<T>, PageError>;

/// Wrap a result with resolved paging; an error is tagged with `requested`.
pub fn paged<T>(
    result: Result<T>,
    paging: Option<PagingModel>,
    requested: PagingModel,
) -> PagedResult<T> {
    match result {
        Ok(value) => Ok(Paged::new(value, paging, requested)),
        Err(error) => Err(PageError::new(requested, error)),
    }
}

/// Extension methods for [`PagedResult`].
pub trait PagedResultExt<T> {
    /// Re-pair the value with different paging; errors pass through unchanged.
    #[must_use]
    fn with_paging(self, paging: Option<PagingModel>) -> Self;

    /// The resolved paging of a successful page.
    fn paging(&self) -> Option<PagingModel>;

    /// The paging model the request was built from, for success or failure.
    fn requested(&self) -> PagingModel;
}

impl<T> PagedResultExt<T> for PagedResult<T> {
    fn with_paging(self, paging: Option<PagingModel>) -> Self {
        self.map(|p| Paged { paging, ..p })
    }

    fn paging(&self) -> Option<PagingModel> {
        self.as_ref().ok().and_then(|p| p.paging)
    }

    fn requested(&self) -> PagingModel {
        match self {
            Ok(page) => page.requested,
            Err(err) => err.requested,
        }
    }
}
