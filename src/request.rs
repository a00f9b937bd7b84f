//! Declarative request descriptions.
//!
//! A [`RequestDescriptor`] is an immutable template for one HTTP request.
//! Paging is attached by deriving a copy, and [`RequestDescriptor::to_request`]
//! turns the template into a wire-level [`reqwest::Request`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Request};
use url::Url;

use crate::error::{FetchError, Result};
use crate::paging::PagingModel;

/// Timeout applied when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP methods supported by request descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// The method name as sent on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Template for one HTTP request, optionally positioned on a page.
///
/// # Example
///
/// ```
/// use pagefetch::{PagingModel, RequestDescriptor};
///
/// let descriptor = RequestDescriptor::new("https://api.example.com/x")
///     .parameter("a", "1")
///     .with_paging(Some(PagingModel::new(2, 3, 50)));
///
/// assert_eq!(
///     descriptor.url_string(),
///     "https://api.example.com/x?a=1&per_page=50&page=2"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    base_url: String,
    method: Option<HttpMethod>,
    timeout: Duration,
    paging: Option<PagingModel>,
    headers: BTreeMap<String, String>,
    parameters: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// A GET request for `base_url` with the default timeout and no paging.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            method: Some(HttpMethod::Get),
            timeout: DEFAULT_TIMEOUT,
            paging: None,
            headers: BTreeMap::new(),
            parameters: BTreeMap::new(),
        }
    }

    /// A GET request asking for `per_page` items, starting on page 1.
    ///
    /// The last page is unknown at this point, so only one request is made
    /// unless the caller discovers more pages from the response.
    pub fn per_page(base_url: impl Into<String>, per_page: u32) -> Self {
        Self::new(base_url).with_paging(Some(PagingModel::new(1, 1, per_page)))
    }

    /// Set or clear the HTTP method. Without one the transport default
    /// (GET) is used.
    #[must_use]
    pub fn method(mut self, method: Option<HttpMethod>) -> Self {
        self.method = method;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header, replacing any existing value for the same key.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter, replacing any existing value for the same key.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Add every parameter from an iterator of key/value pairs.
    #[must_use]
    pub fn parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters
            .extend(parameters.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Copy of this descriptor positioned on `paging`.
    #[must_use]
    pub fn with_paging(&self, paging: Option<PagingModel>) -> Self {
        Self {
            paging,
            ..self.clone()
        }
    }

    /// Copy of this descriptor advanced to the next page.
    ///
    /// Paging becomes `None` when there is no next page.
    #[must_use]
    pub fn increment_page(&self) -> Self {
        self.with_paging(self.paging.and_then(|p| p.increment()))
    }

    /// Copy of this descriptor with `defaults` added under its own headers.
    ///
    /// Headers already present on the descriptor win.
    #[must_use]
    pub fn with_default_headers(&self, defaults: &BTreeMap<String, String>) -> Self {
        let mut headers = defaults.clone();
        headers.extend(self.headers.clone());
        Self {
            headers,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http_method(&self) -> Option<HttpMethod> {
        self.method
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn paging(&self) -> Option<PagingModel> {
        self.paging
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query_parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// The request URL as a string, before parsing.
    ///
    /// Parameters come first, then `per_page` when the paging model has a
    /// positive `per`, then `page` when it has a positive `current`.
    pub fn url_string(&self) -> String {
        let mut url = self.base_url.clone();

        for (key, value) in &self.parameters {
            push_query_pair(&mut url, key, value);
        }

        if let Some(paging) = self.paging {
            if paging.per() > 0 {
                push_query_pair(&mut url, "per_page", &paging.per().to_string());
            }
            if paging.current() > 0 {
                push_query_pair(&mut url, "page", &paging.current().to_string());
            }
        }

        url
    }

    /// Parse the request URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] carrying the attempted string.
    pub fn url(&self) -> Result<Url> {
        let attempted = self.url_string();
        Url::parse(&attempted).map_err(|source| FetchError::InvalidUrl { attempted, source })
    }

    /// Build the wire-level request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the URL does not parse and
    /// [`FetchError::InvalidHeader`] if a header cannot be represented.
    pub fn to_request(&self) -> Result<Request> {
        let url = self.url()?;
        let method = self.method.map_or(Method::GET, Method::from);
        let mut request = Request::new(method, url);

        for (key, value) in &self.headers {
            let invalid = || FetchError::InvalidHeader { name: key.clone() };
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| invalid())?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            request.headers_mut().insert(name, value);
        }

        *request.timeout_mut() = Some(self.timeout);
        Ok(request)
    }
}

fn push_query_pair(url: &mut String, key: &str, value: &str) {
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(key);
    url.push('=');
    url.push_str(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_order_with_paging() {
        let descriptor = RequestDescriptor::new("https://api.example.com/x")
            .parameter("a", "1")
            .with_paging(Some(PagingModel::new(2, 3, 50)));

        let url = descriptor.url_string();
        assert_eq!(url.matches('?').count(), 1);
        assert_eq!(url, "https://api.example.com/x?a=1&per_page=50&page=2");
    }

    #[test]
    fn test_sentinel_adds_no_page_parameters() {
        let descriptor = RequestDescriptor::new("https://api.example.com/x")
            .with_paging(Some(PagingModel::sentinel()));
        assert_eq!(descriptor.url_string(), "https://api.example.com/x");
    }

    #[test]
    fn test_zero_per_omits_per_page() {
        let descriptor = RequestDescriptor::new("https://api.example.com/x")
            .with_paging(Some(PagingModel::new(3, 5, 0)));
        assert_eq!(descriptor.url_string(), "https://api.example.com/x?page=3");
    }

    #[test]
    fn test_base_url_with_existing_query() {
        let descriptor =
            RequestDescriptor::new("https://api.example.com/x?sort=asc").parameter("q", "rust");
        assert_eq!(
            descriptor.url_string(),
            "https://api.example.com/x?sort=asc&q=rust"
        );
    }

    #[test]
    fn test_invalid_url_short_circuits() {
        let descriptor = RequestDescriptor::new("not a url").parameter("a", "1");
        match descriptor.to_request() {
            Err(FetchError::InvalidUrl { attempted, .. }) => assert_eq!(attempted, "not a url?a=1"),
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_header_name() {
        let descriptor = RequestDescriptor::new("https://api.example.com").header("bad header", "v");
        assert!(matches!(
            descriptor.to_request(),
            Err(FetchError::InvalidHeader { name }) if name == "bad header"
        ));
    }

    #[test]
    fn test_request_carries_headers_method_timeout() {
        let descriptor = RequestDescriptor::new("https://api.example.com/items")
            .method(Some(HttpMethod::Post))
            .timeout(Duration::from_secs(9))
            .header("Accept", "application/json");

        let request = descriptor.to_request().unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.timeout(), Some(&Duration::from_secs(9)));
        assert_eq!(request.headers()["accept"], "application/json");
    }

    #[test]
    fn test_missing_method_defaults_to_get() {
        let request = RequestDescriptor::new("https://api.example.com")
            .method(None)
            .to_request()
            .unwrap();
        assert_eq!(request.method(), Method::GET);
    }

    #[test]
    fn test_increment_page() {
        let descriptor = RequestDescriptor::new("https://api.example.com")
            .with_paging(Some(PagingModel::new(1, 2, 10)));
        let second = descriptor.increment_page();
        assert_eq!(second.paging(), Some(PagingModel::new(2, 2, 10)));
        assert_eq!(second.increment_page().paging(), None);
        assert_eq!(second.base_url(), descriptor.base_url());
    }

    #[test]
    fn test_default_headers_do_not_override() {
        let mut defaults = BTreeMap::new();
        defaults.insert("Accept".to_string(), "text/plain".to_string());
        defaults.insert("X-Client".to_string(), "pagefetch".to_string());

        let merged = RequestDescriptor::new("https://api.example.com")
            .header("Accept", "application/json")
            .with_default_headers(&defaults);

        assert_eq!(merged.headers()["Accept"], "application/json");
        assert_eq!(merged.headers()["X-Client"], "pagefetch");
    }

    #[test]
    fn test_per_page_constructor() {
        let descriptor = RequestDescriptor::per_page("https://api.example.com/items", 30);
        assert_eq!(
            descriptor.url_string(),
            "https://api.example.com/items?per_page=30&page=1"
        );
    }
}
