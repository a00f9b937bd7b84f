//! Mock paginated API server for E2E testing.
//!
//! This module provides an in-memory mock server that serves paginated
//! collections the way real APIs do: a bare array at `/items` with
//! GitHub-style `Link` headers, and a Flickr-style `photos` envelope at
//! `/services/rest/`. Unlike wiremock which mocks at the HTTP level per-test,
//! this server slices real data per request and records every request it
//! receives, enabling realistic fan-out testing.
//!
//! # Example
//!
//! ```ignore
//! use pagefetch::mock_server::MockServer;
//! use pagefetch::{Fetcher, FetcherConfig, PagingModel, RequestDescriptor};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let fetcher = Fetcher::with_reqwest(FetcherConfig::default()).unwrap();
//!
//!     // Server comes with 45 items by default
//!     let descriptor = RequestDescriptor::new(server.items_url())
//!         .with_paging(Some(PagingModel::new(1, 5, 10)));
//!     let pages = fetcher.collect_all_pages::<serde_json::Value>(&descriptor).await;
//!     assert_eq!(pages.len(), 5);
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures, TEST_API_KEY};
pub use server::MockServer;
pub use state::{paginate, MockState, PageSlice, DEFAULT_PER_PAGE, MAX_PER_PAGE};
