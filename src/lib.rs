//! Declarative paginated JSON fetching.
//!
//! Describe a request once with a [`RequestDescriptor`], attach a
//! [`PagingModel`], and a [`Fetcher`] issues one request per page without
//! waiting on earlier pages. Each page is validated, parsed and decoded on
//! its own and delivered to a completion together with the paging resolved
//! from the response.
//!
//! # Quick Start
//!
//! ```no_run
//! use pagefetch::{Fetcher, FetcherConfig, PagingModel, RequestDescriptor};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> pagefetch::Result<()> {
//!     let fetcher = Fetcher::with_reqwest(FetcherConfig::default())?;
//!
//!     // Pages 1 through 3, 50 items each
//!     let descriptor = RequestDescriptor::new("https://api.github.com/orgs/rust-lang/repos")
//!         .header("Accept", "application/vnd.github+json")
//!         .with_paging(Some(PagingModel::new(1, 3, 50)));
//!
//!     for page in fetcher.collect_all_pages::<Value>(&descriptor).await {
//!         let page = page?;
//!         println!("{}: {} repos", page.requested, page.value.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`RequestDescriptor`] - immutable description of one logical request
//! - [`PagingModel`] - position of one page within a page set
//! - [`Transport`] - the HTTP seam, with [`ReqwestTransport`] as default
//! - [`Decodable`] - lenient JSON decoding that reports instead of failing
//! - [`Fetcher`] - the fan-out orchestrator
//! - [`Dispatch`] - where completions run
//!
//! Paging is resolved per response from a `Link` header, then from a body
//! envelope such as Flickr's `{"photos": {"page": 1, "pages": 3}}`, with the
//! page size backfilled from the request URL or the item count.
//!
//! # Configuration
//!
//! [`FetcherConfig`] carries headers sent with every request, the completion
//! dispatch policy and the user agent. The bundled [`FlickrClient`] reads:
//!
//! - `FLICKR_API_KEY` (required) - Your Flickr API key
//! - `FLICKR_API_URL` (optional) - Endpoint (defaults to `https://api.flickr.com/services/rest/`)

pub mod cli;
mod config;
mod decode;
mod dispatch;
mod error;
mod fetcher;
mod flickr;
pub mod inference;
mod models;
pub mod output;
mod paging;
mod request;
mod result;
mod transport;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use config::{FetcherConfig, FetcherConfigBuilder, DEFAULT_MAX_DISCOVERED_PAGES};
pub use error::{BoxError, FetchError, Result};
pub use fetcher::{FetchHandle, Fetcher};
pub use paging::PagingModel;
pub use request::{HttpMethod, RequestDescriptor, DEFAULT_TIMEOUT};
pub use result::{paged, PageError, Paged, PagedResult, PagedResultExt};
pub use transport::{default_user_agent, RawResponse, ReqwestTransport, Transport};

// Re-export completion dispatch
pub use dispatch::{CompletionQueue, Dispatch, Job};

// Re-export decoding
pub use decode::{encode_all, DecodeDiagnostic, Decodable, Decoded, DiagnosticKind, Fields};

// Re-export bindings and models
pub use flickr::FlickrClient;
pub use models::Photo;
