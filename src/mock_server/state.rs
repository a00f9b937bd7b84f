//! Mock server state management.
//!
//! Provides the in-memory data store for the mock paginated API server.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

/// Default page size when a request does not send `per_page`.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Largest page size the server honours.
pub const MAX_PER_PAGE: u32 = 100;

/// Shared state for the mock server.
///
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Items served from `/items`, in order.
    pub items: Vec<Value>,

    /// Photos served in the Flickr envelope at `/services/rest/`.
    pub photos: Vec<Value>,

    /// API key the Flickr endpoint requires, if any.
    pub api_key: Option<String>,

    /// Path and query of every paginated request received, in arrival order.
    pub request_log: Vec<String>,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Serve these items from `/items`.
    pub fn with_items(mut self, items: Vec<Value>) -> Self {
        self.items = items;
        self
    }

    /// Serve these photos from `/services/rest/`.
    pub fn with_photos(mut self, photos: Vec<Value>) -> Self {
        self.photos = photos;
        self
    }

    /// Require this API key on Flickr requests.
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Record a received request.
    pub fn log_request(&mut self, path_and_query: impl Into<String>) {
        self.request_log.push(path_and_query.into());
    }
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<'a, T> {
    pub items: &'a [T],
    pub page: u32,
    pub per_page: u32,
    /// Total number of pages; at least 1, even for an empty collection.
    pub pages: u32,
}

/// Cut page `page` (1-indexed) of `per_page` items out of `all`.
///
/// Pages past the end are empty. Page 0 is treated as page 1 and `per_page`
/// is clamped to `1..=MAX_PER_PAGE`.
pub fn paginate<T>(all: &[T], page: Option<u32>, per_page: Option<u32>) -> PageSlice<'_, T> {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);

    let total = all.len();
    let per = per_page as usize;
    let pages = total.div_ceil(per).max(1);

    let start = (page as usize - 1).saturating_mul(per).min(total);
    let end = start.saturating_add(per).min(total);

    PageSlice {
        items: &all[start..end],
        page,
        per_page,
        pages: u32::try_from(pages).unwrap_or(u32::MAX),
    }
}
