//! Fetch orchestration.
//!
//! A [`Fetcher`] turns a [`RequestDescriptor`] into one request per page,
//! sends them all without waiting for earlier pages, and delivers one
//! completion per page. Each page is validated, parsed and decoded on its
//! own; a failure on one page never affects the others.

use std::iter;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Request;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::FetcherConfig;
use crate::decode::Decodable;
use crate::dispatch::Dispatch;
use crate::error::{BoxError, FetchError, Result};
use crate::inference;
use crate::paging::PagingModel;
use crate::request::RequestDescriptor;
use crate::result::{paged, PageError, PagedResult};
use crate::transport::{RawResponse, ReqwestTransport, Transport};

/// The outcome of sending one page's request.
struct Exchange {
    requested: PagingModel,
    url: String,
    outcome: core::result::Result<RawResponse, BoxError>,
}

/// Error types a fan-out can report a failed page with.
trait PageFailure {
    fn page_failed(requested: PagingModel, error: FetchError) -> Self;
}

impl PageFailure for FetchError {
    fn page_failed(_requested: PagingModel, error: FetchError) -> Self {
        error
    }
}

impl PageFailure for PageError {
    fn page_failed(requested: PagingModel, error: FetchError) -> Self {
        PageError::new(requested, error)
    }
}

/// A response that passed validation.
#[derive(Debug)]
struct Validated {
    headers: HeaderMap,
    body: Bytes,
}

/// Handle to the page requests started by one fetch call.
///
/// Dropping the handle does not cancel anything; in-flight requests always
/// run to completion.
#[derive(Debug, Default)]
#[must_use = "the handle reports how many pages were started and can join them"]
pub struct FetchHandle {
    tasks: Vec<JoinHandle<()>>,
    sent: usize,
    construction_failures: usize,
}

impl FetchHandle {
    /// Number of page requests handed to the transport.
    pub fn dispatched(&self) -> usize {
        self.sent
    }

    /// Number of pages whose request could not be built.
    pub fn construction_failures(&self) -> usize {
        self.construction_failures
    }

    /// Number of completions this call delivers.
    pub fn pages(&self) -> usize {
        self.sent + self.construction_failures
    }

    /// Wait until every page exchange has finished.
    ///
    /// With inline dispatch every completion has run when this returns. With
    /// queue dispatch the completions have been queued.
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "page task did not finish");
            }
        }
    }
}

/// Issues requests described by [`RequestDescriptor`]s and decodes the
/// responses.
///
/// This struct is cheaply cloneable; clones share the transport.
///
/// # Example
///
/// ```no_run
/// use pagefetch::{Fetcher, FetcherConfig, PagingModel, RequestDescriptor};
/// use serde_json::Value;
///
/// # async fn example() -> pagefetch::Result<()> {
/// let fetcher = Fetcher::with_reqwest(FetcherConfig::default())?;
/// let descriptor = RequestDescriptor::new("https://api.github.com/orgs/rust-lang/repos")
///     .with_paging(Some(PagingModel::new(1, 3, 30)));
///
/// let handle = fetcher.fetch_all_pages::<Value, _>(&descriptor, |page| match page {
///     Ok(page) => println!("{}: {} repos", page.requested, page.value.len()),
///     Err(err) => eprintln!("page failed: {err}"),
/// });
/// assert_eq!(handle.pages(), 3);
/// handle.join().await;
/// # Ok(())
/// # }
/// ```
pub struct Fetcher<T: Transport = ReqwestTransport> {
    transport: Arc<T>,
    config: Arc<FetcherConfig>,
}

impl<T: Transport> Clone for Fetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T: Transport> std::fmt::Debug for Fetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Fetcher<ReqwestTransport> {
    /// Create a fetcher backed by `reqwest`, using the config's user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_reqwest(config: FetcherConfig) -> Result<Self> {
        let transport = ReqwestTransport::with_user_agent(&config.user_agent)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> Fetcher<T> {
    /// Create a fetcher sending through `transport`.
    pub fn new(transport: T, config: FetcherConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch and decode a single instance per page.
    ///
    /// Without paging on the descriptor exactly one request is made. With
    /// paging, one request is made for every page from `current` to `last`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since every page request is
    /// spawned as a task.
    #[tracing::instrument(skip_all, fields(url = descriptor.base_url()))]
    pub fn fetch_single<A, F>(&self, descriptor: &RequestDescriptor, completion: F) -> FetchHandle
    where
        A: Decodable + Send + 'static,
        F: Fn(Result<A>) + Send + Sync + 'static,
    {
        self.fan_out(
            descriptor,
            pages_from(descriptor),
            process_single::<A>,
            completion,
            self.config.dispatch.clone(),
        )
    }

    /// Fetch and decode a list of instances per page.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since every page request is
    /// spawned as a task.
    #[tracing::instrument(skip_all, fields(url = descriptor.base_url()))]
    pub fn fetch_page<A, F>(&self, descriptor: &RequestDescriptor, completion: F) -> FetchHandle
    where
        A: Decodable + Send + 'static,
        F: Fn(Result<Vec<A>>) + Send + Sync + 'static,
    {
        self.fan_out(
            descriptor,
            pages_from(descriptor),
            process_many::<A>,
            completion,
            self.config.dispatch.clone(),
        )
    }

    /// Fetch every page from the descriptor's `current` to `last`, resolving
    /// paging for each response.
    ///
    /// All requests are sent back to back. The completion runs once per
    /// page, in whatever order the responses arrive; each result carries the
    /// paging model its request was built from, and a failed page is a
    /// [`PageError`] naming it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since every page request is
    /// spawned as a task.
    #[tracing::instrument(skip_all, fields(url = descriptor.base_url()))]
    pub fn fetch_all_pages<A, F>(
        &self,
        descriptor: &RequestDescriptor,
        completion: F,
    ) -> FetchHandle
    where
        A: Decodable + Send + 'static,
        F: Fn(PagedResult<Vec<A>>) + Send + Sync + 'static,
    {
        self.fan_out(
            descriptor,
            pages_from(descriptor),
            process_paged::<A>,
            completion,
            self.config.dispatch.clone(),
        )
    }

    /// Fetch the first page, then every remaining page it advertises.
    ///
    /// Unlike [`fetch_all_pages`](Self::fetch_all_pages), the page count
    /// does not need to be known up front: it is taken from the paging
    /// resolved for the first response. The first page's completion is
    /// delivered before the remaining requests are sent; those are sent
    /// nearest page first and never wait for each other. At most
    /// [`FetcherConfig::max_discovered_pages`] pages follow the first one.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since every page request is
    /// spawned as a task.
    #[tracing::instrument(skip_all, fields(url = descriptor.base_url()))]
    pub async fn fetch_discovered_pages<A, F>(
        &self,
        descriptor: &RequestDescriptor,
        completion: F,
    ) -> FetchHandle
    where
        A: Decodable + Send + 'static,
        F: Fn(PagedResult<Vec<A>>) + Send + Sync + 'static,
    {
        let completion = Arc::new(completion);
        let dispatch = self.config.dispatch.clone();
        let merged = descriptor.with_default_headers(&self.config.base_headers);
        let requested = merged.paging().unwrap_or_else(PagingModel::sentinel);

        let first = match merged.with_paging(Some(requested)).to_request() {
            Ok(request) => {
                let exchange = exchange(Arc::clone(&self.transport), requested, request).await;
                process_paged::<A>(exchange)
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not build first page request");
                let callback = Arc::clone(&completion);
                dispatch.deliver(move || callback(Err(PageError::new(requested, err))));
                return FetchHandle {
                    construction_failures: 1,
                    ..FetchHandle::default()
                };
            }
        };

        let limit = self.config.max_discovered_pages;
        let (advertised, remaining) = match &first {
            Ok(page) => (page.remaining_page_count(), Some(page.remaining_pages())),
            Err(_) => (0, None),
        };
        if advertised > limit {
            tracing::warn!(
                advertised,
                limit,
                "response advertises more pages than allowed, truncating"
            );
        }
        tracing::debug!(remaining = advertised.min(limit), "first page resolved");
        let per = requested.per();
        let remaining = remaining
            .into_iter()
            .flatten()
            .take(limit as usize)
            .map(move |p| p.with_per(per));

        let callback = Arc::clone(&completion);
        dispatch.deliver(move || callback(first));

        let mut handle = self.fan_out(
            &merged,
            remaining,
            process_paged::<A>,
            move |result| completion(result),
            dispatch,
        );
        handle.sent += 1;
        handle
    }

    /// Fetch every page like [`fetch_all_pages`](Self::fetch_all_pages) and
    /// collect the results.
    ///
    /// Results are in arrival order. The configured dispatch is bypassed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since every page request is
    /// spawned as a task.
    pub async fn collect_all_pages<A>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Vec<PagedResult<Vec<A>>>
    where
        A: Decodable + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = self.fan_out(
            descriptor,
            pages_from(descriptor),
            process_paged::<A>,
            move |result| {
                let _ = tx.send(result);
            },
            Dispatch::Inline,
        );

        let expected = handle.pages();
        let mut results = Vec::with_capacity(expected);
        while results.len() < expected {
            match rx.recv().await {
                Some(result) => results.push(result),
                None => break,
            }
        }
        results
    }

    /// Send one request per page and deliver each processed outcome.
    fn fan_out<R, E, I, P, F>(
        &self,
        descriptor: &RequestDescriptor,
        pages: I,
        process: P,
        completion: F,
        dispatch: Dispatch,
    ) -> FetchHandle
    where
        R: Send + 'static,
        E: PageFailure + Send + 'static,
        I: IntoIterator<Item = PagingModel>,
        P: Fn(Exchange) -> core::result::Result<R, E> + Send + Sync + 'static,
        F: Fn(core::result::Result<R, E>) + Send + Sync + 'static,
    {
        let descriptor = descriptor.with_default_headers(&self.config.base_headers);
        let process = Arc::new(process);
        let completion = Arc::new(completion);
        let mut handle = FetchHandle::default();

        for requested in pages {
            let request = match descriptor.with_paging(Some(requested)).to_request() {
                Ok(request) => request,
                Err(err) => {
                    tracing::warn!(page = %requested, error = %err, "could not build request");
                    let completion = Arc::clone(&completion);
                    dispatch.deliver(move || completion(Err(E::page_failed(requested, err))));
                    handle.construction_failures += 1;
                    continue;
                }
            };

            tracing::debug!(page = %requested, url = %request.url(), "dispatching page");

            let transport = Arc::clone(&self.transport);
            let process = Arc::clone(&process);
            let completion = Arc::clone(&completion);
            let dispatch = dispatch.clone();
            let span = tracing::debug_span!("page", page = %requested);

            let task = tokio::spawn(
                async move {
                    let result = process(exchange(transport, requested, request).await);
                    dispatch.deliver(move || completion(result));
                }
                .instrument(span),
            );

            handle.tasks.push(task);
            handle.sent += 1;
        }

        handle
    }
}

/// Pages to request for a descriptor: its paging model and every page after
/// it, or the sentinel alone when it has none.
fn pages_from(descriptor: &RequestDescriptor) -> impl Iterator<Item = PagingModel> {
    let start = descriptor.paging().unwrap_or_else(PagingModel::sentinel);
    iter::successors(Some(start), PagingModel::increment)
}

async fn exchange<T: Transport>(
    transport: Arc<T>,
    requested: PagingModel,
    request: Request,
) -> Exchange {
    let url = request.url().to_string();
    let outcome = transport.send(request).await;
    Exchange {
        requested,
        url,
        outcome,
    }
}

/// Check the transport outcome, status and body of a raw response.
fn validate(outcome: core::result::Result<RawResponse, BoxError>) -> Result<Validated> {
    let response = outcome.map_err(FetchError::Transport)?;

    if !response.status.is_success() {
        return Err(FetchError::http_status(response.status.as_u16()));
    }

    match response.body {
        Some(body) if !body.is_empty() => Ok(Validated {
            headers: response.headers,
            body,
        }),
        _ => Err(FetchError::NoData),
    }
}

fn parse_json(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(FetchError::MalformedJson)
}

fn process_single<A: Decodable>(exchange: Exchange) -> Result<A> {
    validate(exchange.outcome)
        .and_then(|response| parse_json(&response.body))
        .map(|json| A::decode(&json).reported())
}

fn process_many<A: Decodable>(exchange: Exchange) -> Result<Vec<A>> {
    validate(exchange.outcome)
        .and_then(|response| parse_json(&response.body))
        .map(|json| A::decode_many(&json).reported())
}

fn process_paged<A: Decodable>(exchange: Exchange) -> PagedResult<Vec<A>> {
    let Exchange {
        requested,
        url,
        outcome,
    } = exchange;

    let mut signalled = None;
    let items = validate(outcome).and_then(|response| {
        let json = parse_json(&response.body)?;
        let items = A::decode_many(&json).reported();
        signalled = inference::resolve(&response.headers, Some(&json), &url, items.len());
        Ok(items)
    });
    paged(items, signalled, requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::header::{HeaderValue, LINK};
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Transport answering from a closure and recording every URL sent.
    struct FakeTransport<H> {
        handler: H,
        sent: Mutex<Vec<String>>,
    }

    impl<H> FakeTransport<H>
    where
        H: Fn(&Request) -> core::result::Result<RawResponse, BoxError> + Send + Sync + 'static,
    {
        fn new(handler: H) -> Self {
            Self {
                handler,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl<H> Transport for FakeTransport<H>
    where
        H: Fn(&Request) -> core::result::Result<RawResponse, BoxError> + Send + Sync + 'static,
    {
        async fn send(&self, request: Request) -> core::result::Result<RawResponse, BoxError> {
            self.sent.lock().unwrap().push(request.url().to_string());
            (self.handler)(&request)
        }
    }

    fn ok_json(body: &'static str) -> core::result::Result<RawResponse, BoxError> {
        Ok(RawResponse::new(StatusCode::OK).with_body(body))
    }

    fn page_of(request: &Request) -> u32 {
        request
            .url()
            .query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0)
    }

    #[test]
    fn test_validate_transport_error_first() {
        let err: BoxError = "connection reset".into();
        assert!(matches!(validate(Err(err)), Err(FetchError::Transport(_))));
    }

    #[test]
    fn test_validate_status_before_body() {
        let response = RawResponse::new(StatusCode::NOT_FOUND).with_body("{}");
        match validate(Ok(response)) {
            Err(FetchError::HttpStatus { code, reason }) => {
                assert_eq!(code, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_empty_body_is_no_data() {
        assert!(matches!(
            validate(Ok(RawResponse::new(StatusCode::OK))),
            Err(FetchError::NoData)
        ));
        assert!(matches!(
            validate(Ok(RawResponse::new(StatusCode::OK).with_body(""))),
            Err(FetchError::NoData)
        ));
    }

    #[test]
    fn test_process_paged_backfills_from_count() {
        let links = "<u?page=3>; rel=\"next\", <u?page=4>; rel=\"last\", <u?page=1>; rel=\"previous\"";
        let response = RawResponse::new(StatusCode::OK)
            .with_header(LINK, HeaderValue::from_static(links))
            .with_body(r#"[{"n":1},{"n":2}]"#);
        let exchange = Exchange {
            requested: PagingModel::new(2, 4, 0),
            url: "https://x/items?page=2".to_string(),
            outcome: Ok(response),
        };

        let page = process_paged::<Value>(exchange).unwrap();
        assert_eq!(page.value.len(), 2);
        assert_eq!(page.paging, Some(PagingModel::new(2, 4, 2)));
        assert_eq!(page.requested, PagingModel::new(2, 4, 0));
    }

    #[test]
    fn test_process_paged_malformed_json() {
        let exchange = Exchange {
            requested: PagingModel::sentinel(),
            url: "https://x/items".to_string(),
            outcome: ok_json("not json"),
        };
        match process_paged::<Value>(exchange) {
            Err(PageError {
                requested,
                error: FetchError::MalformedJson(_),
            }) => assert!(requested.is_sentinel()),
            other => panic!("expected MalformedJson, got {other:?}"),
        }
    }

    #[test]
    #[should_panic]
    fn test_fetch_outside_runtime_panics() {
        let fetcher = Fetcher::new(
            FakeTransport::new(|_| ok_json("{}")),
            FetcherConfig::default(),
        );
        let _ = fetcher.fetch_single::<Value, _>(&RequestDescriptor::new("https://x/thing"), |_| {});
    }

    #[tokio::test]
    async fn test_unpaged_descriptor_sends_once() {
        let fetcher = Fetcher::new(
            FakeTransport::new(|_| ok_json(r#"{"name":"only"}"#)),
            FetcherConfig::default(),
        );
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);

        let handle = fetcher.fetch_single::<Value, _>(
            &RequestDescriptor::new("https://api.example.com/thing"),
            move |result| sink.lock().unwrap().push(result.unwrap()),
        );
        assert_eq!(handle.dispatched(), 1);
        handle.join().await;

        assert_eq!(results.lock().unwrap().len(), 1);
        assert_eq!(
            *fetcher.transport().sent.lock().unwrap(),
            vec!["https://api.example.com/thing".to_string()]
        );
    }

    #[tokio::test]
    async fn test_fan_out_sends_every_page_and_isolates_failures() {
        let transport = FakeTransport::new(|request| match page_of(request) {
            2 => Ok(RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR)),
            _ => ok_json(r#"[{"id":1}]"#),
        });
        let fetcher = Fetcher::new(transport, FetcherConfig::default());
        let descriptor = RequestDescriptor::new("https://api.example.com/items")
            .with_paging(Some(PagingModel::new(1, 3, 1)));

        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        let handle = fetcher.fetch_all_pages::<Value, _>(&descriptor, move |result| {
            sink.lock().unwrap().push(result);
        });
        assert_eq!(handle.dispatched(), 3);
        handle.join().await;

        let results = results.lock().unwrap();
        assert_eq!(results.len(), 3);
        let failed: Vec<&PageError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].requested, PagingModel::new(2, 3, 1));
        assert!(matches!(failed[0].error, FetchError::HttpStatus { code: 500, .. }));

        let mut pages: Vec<u32> = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|p| p.requested.current())
            .collect();
        pages.sort_unstable();
        assert_eq!(pages, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_construction_failure_reported_per_page() {
        let fetcher = Fetcher::new(
            FakeTransport::new(|_| ok_json("[]")),
            FetcherConfig::default(),
        );
        let descriptor =
            RequestDescriptor::new("no scheme here").with_paging(Some(PagingModel::new(1, 2, 5)));

        let errors = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&errors);
        let handle = fetcher.fetch_page::<Value, _>(&descriptor, move |result| {
            assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
            *sink.lock().unwrap() += 1;
        });

        assert_eq!(handle.dispatched(), 0);
        assert_eq!(handle.construction_failures(), 2);
        assert_eq!(*errors.lock().unwrap(), 2);
        assert!(fetcher.transport().sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_base_headers_applied() {
        let transport = FakeTransport::new(|request| {
            assert_eq!(request.headers()["x-api-key"], "secret");
            assert_eq!(request.headers()["accept"], "application/json");
            ok_json("{}")
        });
        let config = FetcherConfig::builder()
            .header("X-Api-Key", "secret")
            .header("Accept", "text/plain")
            .build();
        let fetcher = Fetcher::new(transport, config);
        let descriptor =
            RequestDescriptor::new("https://api.example.com").header("Accept", "application/json");

        let results = fetcher.collect_all_pages::<Value>(&descriptor).await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_discovered_pages_follow_first_response() {
        let transport = FakeTransport::new(|request| {
            let response = RawResponse::new(StatusCode::OK).with_body(r#"[{"id":1},{"id":2}]"#);
            if page_of(request) == 0 {
                let links = "<https://x/items?page=2>; rel=\"next\", <https://x/items?page=4>; rel=\"last\"";
                Ok(response.with_header(LINK, HeaderValue::from_static(links)))
            } else {
                Ok(response)
            }
        });
        let fetcher = Fetcher::new(transport, FetcherConfig::default());

        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        let handle = fetcher
            .fetch_discovered_pages::<Value, _>(
                &RequestDescriptor::new("https://x/items"),
                move |result| sink.lock().unwrap().push(result),
            )
            .await;
        assert_eq!(handle.dispatched(), 4);
        handle.join().await;

        let results = results.lock().unwrap();
        assert_eq!(results.len(), 4);
        let first = results[0].as_ref().unwrap();
        assert!(first.requested.is_sentinel());
        assert_eq!(first.paging, Some(PagingModel::new(1, 4, 2)));

        let sent = fetcher.transport().sent.lock().unwrap();
        assert_eq!(sent[0], "https://x/items");
        assert_eq!(sent.len(), 4);
        assert!(sent.contains(&"https://x/items?page=2".to_string()));
        assert!(sent.contains(&"https://x/items?page=4".to_string()));
    }

    #[tokio::test]
    async fn test_discovery_capped_for_huge_last_page() {
        let transport = FakeTransport::new(|request| {
            let response = RawResponse::new(StatusCode::OK).with_body(r#"[{"id":1}]"#);
            if page_of(request) == 0 {
                let links = "<u?page=2>; rel=\"next\", <u?page=4294967295>; rel=\"last\"";
                Ok(response.with_header(LINK, HeaderValue::from_static(links)))
            } else {
                Ok(response)
            }
        });
        let config = FetcherConfig::builder().max_discovered_pages(3).build();
        let fetcher = Fetcher::new(transport, config);

        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        let handle = fetcher
            .fetch_discovered_pages::<Value, _>(
                &RequestDescriptor::new("https://x/items"),
                move |result| sink.lock().unwrap().push(result),
            )
            .await;
        assert_eq!(handle.dispatched(), 4);
        handle.join().await;

        let first = results.lock().unwrap()[0].as_ref().unwrap().remaining_page_count();
        assert_eq!(first, u32::MAX - 1);
        let mut sent = fetcher.transport().sent.lock().unwrap().clone();
        sent.sort();
        assert_eq!(
            sent,
            vec![
                "https://x/items".to_string(),
                "https://x/items?page=2".to_string(),
                "https://x/items?page=3".to_string(),
                "https://x/items?page=4".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_queue_dispatch_serializes_completions() {
        let (dispatch, mut queue) = Dispatch::queue();
        let fetcher = Fetcher::new(
            FakeTransport::new(|_| ok_json("[]")),
            FetcherConfig::builder().dispatch(dispatch).build(),
        );
        let hits = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&hits);
        let descriptor =
            RequestDescriptor::new("https://x/items").with_paging(Some(PagingModel::new(1, 2, 10)));

        let handle = fetcher.fetch_page::<Value, _>(&descriptor, move |_| {
            *sink.lock().unwrap() += 1;
        });
        handle.join().await;

        assert_eq!(*hits.lock().unwrap(), 0);
        assert_eq!(queue.drain(), 2);
        assert_eq!(*hits.lock().unwrap(), 2);
    }
}
