//! Flickr REST API binding.
//!
//! Only the interestingness list is bound. Flickr reports paging inside the
//! response body (`photos.page`, `photos.pages`, `photos.perpage`), so pages
//! fetched here resolve their paging from the envelope.

use std::env;
use std::time::Duration;

use chrono::NaiveDate;

use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use crate::fetcher::{FetchHandle, Fetcher};
use crate::models::Photo;
use crate::paging::PagingModel;
use crate::request::RequestDescriptor;
use crate::result::PagedResult;
use crate::transport::{ReqwestTransport, Transport};

const DEFAULT_API_URL: &str = "https://api.flickr.com/services/rest/";
const INTERESTINGNESS_METHOD: &str = "flickr.interestingness.getList";
const PHOTO_EXTRAS: &str = "owner_name,date_taken,description";
const DEFAULT_PER_PAGE: &str = "100";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Flickr API client.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use pagefetch::{FlickrClient, PagingModel};
///
/// # async fn example() -> pagefetch::Result<()> {
/// let flickr = FlickrClient::from_env()?;
/// let date = NaiveDate::from_ymd_opt(2018, 5, 1).unwrap();
///
/// for page in flickr
///     .collect_interesting_photos(date, Some(PagingModel::new(1, 3, 50)))
///     .await
/// {
///     let page = page?;
///     println!("{}: {} photos", page.requested, page.value.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FlickrClient<T: Transport = ReqwestTransport> {
    fetcher: Fetcher<T>,
    api_key: String,
    base_url: String,
}

impl<T: Transport> std::fmt::Debug for FlickrClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlickrClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FlickrClient<ReqwestTransport> {
    /// Create a client from environment variables.
    ///
    /// Uses `FLICKR_API_KEY` for authentication and optionally
    /// `FLICKR_API_URL` for the endpoint (defaults to
    /// `https://api.flickr.com/services/rest/`).
    ///
    /// # Errors
    ///
    /// Returns an error if `FLICKR_API_KEY` is not set or the HTTP client
    /// cannot be built.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("FLICKR_API_KEY").map_err(|_| {
            FetchError::ConfigMissing("FLICKR_API_KEY environment variable not set".to_string())
        })?;

        let base_url = env::var("FLICKR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let fetcher = Fetcher::with_reqwest(FetcherConfig::default())?;
        Ok(Self::new(fetcher, api_key, base_url))
    }
}

impl<T: Transport> FlickrClient<T> {
    pub fn new(fetcher: Fetcher<T>, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Descriptor for the interestingness list of `date`.
    ///
    /// Without a paging model, `per_page=100` is sent as a plain parameter
    /// and a single request is made.
    pub fn interesting_descriptor(
        &self,
        date: NaiveDate,
        paging: Option<PagingModel>,
    ) -> RequestDescriptor {
        let descriptor = RequestDescriptor::new(&self.base_url)
            .method(None)
            .timeout(REQUEST_TIMEOUT)
            .parameter("method", INTERESTINGNESS_METHOD)
            .parameter("api_key", &self.api_key)
            .parameter("format", "json")
            .parameter("extras", PHOTO_EXTRAS)
            .parameter("nojsoncallback", "1")
            .parameter("date", date.format("%Y-%m-%d").to_string());

        match paging {
            Some(paging) => descriptor.with_paging(Some(paging)),
            None => descriptor.parameter("per_page", DEFAULT_PER_PAGE),
        }
    }

    /// Fetch the interesting photos of `date`, one completion per page.
    #[tracing::instrument(skip(self, completion))]
    pub fn interesting_photos<F>(
        &self,
        date: NaiveDate,
        paging: Option<PagingModel>,
        completion: F,
    ) -> FetchHandle
    where
        F: Fn(PagedResult<Vec<Photo>>) + Send + Sync + 'static,
    {
        self.fetcher
            .fetch_all_pages(&self.interesting_descriptor(date, paging), completion)
    }

    /// Fetch the interesting photos of `date` and collect every page.
    pub async fn collect_interesting_photos(
        &self,
        date: NaiveDate,
        paging: Option<PagingModel>,
    ) -> Vec<PagedResult<Vec<Photo>>> {
        self.fetcher
            .collect_all_pages(&self.interesting_descriptor(date, paging))
            .await
    }
}
