//! HTTP client implementation.

use once_cell::sync::OnceCell;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{HttpClientError, Result, TransportError};
use crate::mapper::{BodyDecoder, map_response};
use crate::method::HttpMethod;
use crate::metrics::MetricContext;
use crate::raw_response::RawResponse;
use crate::request::{HttpRequest, HttpRequestSummary};
use crate::response::HttpResponse;
use crate::transport::{AsyncTransport, ReqwestAsyncTransport, ReqwestTransport, Transport};

/// HTTP client: a frozen [`Config`] plus the transports that send requests.
///
/// Cloning is cheap and clones share transports and the closed state.
/// Transports are created on first use.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: Arc<Config>,
    transport: OnceCell<Arc<dyn Transport>>,
    async_transport: OnceCell<Arc<dyn AsyncTransport>>,
    closed: AtomicBool,
}

impl Client {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: Config) -> Self {
        Self::from_parts(config, OnceCell::new(), OnceCell::new())
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Self {
        Self::new(Config::default())
    }

    /// Create a client whose blocking terminals use `transport`.
    pub fn with_transport(config: Config, transport: impl Transport + 'static) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        Self::from_parts(config, OnceCell::with_value(transport), OnceCell::new())
    }

    /// Create a client whose async terminals use `transport`.
    pub fn with_async_transport(config: Config, transport: impl AsyncTransport + 'static) -> Self {
        let transport: Arc<dyn AsyncTransport> = Arc::new(transport);
        Self::from_parts(config, OnceCell::new(), OnceCell::with_value(transport))
    }

    fn from_parts(
        config: Config,
        transport: OnceCell<Arc<dyn Transport>>,
        async_transport: OnceCell<Arc<dyn AsyncTransport>>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config: Arc::new(config),
                transport,
                async_transport,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.inner.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> HttpRequest {
        self.request(HttpMethod::Get, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> HttpRequest {
        self.request(HttpMethod::Post, url)
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> HttpRequest {
        self.request(HttpMethod::Put, url)
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: impl Into<String>) -> HttpRequest {
        self.request(HttpMethod::Patch, url)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> HttpRequest {
        self.request(HttpMethod::Delete, url)
    }

    /// Create a HEAD request builder.
    pub fn head(&self, url: impl Into<String>) -> HttpRequest {
        self.request(HttpMethod::Head, url)
    }

    /// Create an OPTIONS request builder.
    pub fn options(&self, url: impl Into<String>) -> HttpRequest {
        self.request(HttpMethod::Options, url)
    }

    /// Create a TRACE request builder.
    pub fn trace(&self, url: impl Into<String>) -> HttpRequest {
        self.request(HttpMethod::Trace, url)
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: HttpMethod, url: impl Into<String>) -> HttpRequest {
        HttpRequest::new(self.clone(), method, url)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Close the client and shut down its transports.
    ///
    /// Every error met while closing is returned. Requests already in flight
    /// keep the resources they hold; new terminal calls fail with
    /// [`HttpClientError::Closed`]. Closing twice is a no-op.
    pub fn close(&self) -> Vec<HttpClientError> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Vec::new();
        }

        let mut errors: Vec<HttpClientError> = Vec::new();
        if let Some(transport) = self.inner.transport.get() {
            errors.extend(transport.close().into_iter().map(HttpClientError::from));
        }
        if let Some(transport) = self.inner.async_transport.get() {
            errors.extend(transport.close().into_iter().map(HttpClientError::from));
        }

        debug!(errors = errors.len(), "HTTP client closed");
        errors
    }

    /// Close the client when the returned guard is dropped.
    ///
    /// Errors met while closing are logged.
    pub fn register_shutdown_hook(&self) -> ShutdownHook {
        ShutdownHook {
            client: self.clone(),
        }
    }

    fn transport(&self) -> std::result::Result<Arc<dyn Transport>, TransportError> {
        self.inner
            .transport
            .get_or_try_init(|| {
                let transport = ReqwestTransport::new(&self.inner.config)?;
                Ok::<_, TransportError>(Arc::new(transport) as Arc<dyn Transport>)
            })
            .cloned()
    }

    fn async_transport(&self) -> std::result::Result<Arc<dyn AsyncTransport>, TransportError> {
        self.inner
            .async_transport
            .get_or_try_init(|| {
                let transport = ReqwestAsyncTransport::new(&self.inner.config)?;
                Ok::<_, TransportError>(Arc::new(transport) as Arc<dyn AsyncTransport>)
            })
            .cloned()
    }

    /// Checks that run before anything is sent, then `on_request`.
    fn prepare(&self, request: &mut HttpRequest) -> Result<Arc<Config>> {
        if self.is_closed() {
            return Err(HttpClientError::Closed);
        }
        if let Some(error) = request.config_error() {
            return Err(HttpClientError::Configuration(error.to_string()));
        }

        let config = self.inner.config.clone();
        config.interceptors.on_request(request, &config);
        request
            .headers()
            .validate()
            .map_err(HttpClientError::Configuration)?;

        let url = request.url();
        url::Url::parse(&url).map_err(|e| HttpClientError::InvalidUrl(format!("{url}: {e}")))?;

        Ok(config)
    }

    /// Run the full pipeline on the calling thread.
    pub(crate) fn execute<D: BodyDecoder>(
        &self,
        mut request: HttpRequest,
        decoder: D,
    ) -> Result<HttpResponse<D::Output>> {
        let config = self.prepare(&mut request)?;
        let summary = request.to_summary();
        let metric = config.metrics.begin(&summary);

        debug!(method = %summary.method(), url = %summary.url(), "Executing HTTP request");

        let sent = self.send_with_retry(&request, &config);
        finish(&config, &request, &summary, sent, decoder, metric)
    }

    fn send_with_retry(
        &self,
        request: &HttpRequest,
        config: &Arc<Config>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let transport = self.transport()?;
        let mut attempt = 0;

        loop {
            match transport.send(request, config) {
                Ok(raw) => return Ok(raw),
                Err(e) => {
                    let Some(delay) = config.retry.as_ref().and_then(|r| r.next_delay(attempt, &e))
                    else {
                        return Err(e);
                    };
                    debug!(
                        attempt = attempt + 1,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request due to error"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Run the full pipeline on the tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub(crate) fn execute_async<D>(
        &self,
        request: HttpRequest,
        decoder: D,
    ) -> PendingResponse<D::Output>
    where
        D: BodyDecoder + Send + 'static,
        D::Output: Send + 'static,
    {
        let (cancel, cancelled) = oneshot::channel();
        let client = self.clone();
        let task = tokio::spawn(async move { client.run_async(request, decoder, cancelled).await });

        PendingResponse {
            cancel: Some(cancel),
            task,
        }
    }

    async fn run_async<D: BodyDecoder>(
        &self,
        mut request: HttpRequest,
        decoder: D,
        mut cancelled: oneshot::Receiver<()>,
    ) -> Result<HttpResponse<D::Output>> {
        let config = self.prepare(&mut request)?;
        let summary = request.to_summary();
        let metric = config.metrics.begin(&summary);

        debug!(method = %summary.method(), url = %summary.url(), "Executing HTTP request");

        // A dropped handle closes the channel without a value and the
        // request keeps running.
        let sent = tokio::select! {
            biased;
            Ok(()) = &mut cancelled => Err(TransportError::Cancelled),
            sent = self.send_with_retry_async(&request, &config) => sent,
        };

        finish(&config, &request, &summary, sent, decoder, metric)
    }

    async fn send_with_retry_async(
        &self,
        request: &HttpRequest,
        config: &Arc<Config>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let transport = self.async_transport()?;
        let mut attempt = 0;

        loop {
            match transport.send(request, config).await {
                Ok(raw) => return Ok(raw),
                Err(e) => {
                    let Some(delay) = config.retry.as_ref().and_then(|r| r.next_delay(attempt, &e))
                    else {
                        return Err(e);
                    };
                    debug!(
                        attempt = attempt + 1,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request due to error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::default_client()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Map the transport outcome and run the remaining interceptor call sites.
fn finish<D: BodyDecoder>(
    config: &Config,
    request: &HttpRequest,
    summary: &HttpRequestSummary,
    sent: std::result::Result<RawResponse, TransportError>,
    decoder: D,
    metric: Box<dyn MetricContext>,
) -> Result<HttpResponse<D::Output>> {
    match sent {
        Ok(raw) => {
            let response = map_response(raw, decoder, &request.decode_context());
            metric.complete(Some(&response.to_summary()), None);

            debug!(
                url = %summary.url(),
                status = response.status(),
                success = response.is_success(),
                "HTTP request completed"
            );

            config.interceptors.on_response(&response, summary, config);
            Ok(response)
        }
        Err(error) => {
            metric.complete(None, Some(&error));
            debug!(url = %summary.url(), error = %error, "HTTP request produced no response");

            match config.interceptors.on_fail(&error, summary, config) {
                Some(substitute) => {
                    debug!(status = substitute.status(), "Interceptor substituted a response");
                    Ok(substitute.without_body())
                }
                None => Err(HttpClientError::Transport(error)),
            }
        }
    }
}

/// Handle to a request running on the tokio runtime.
///
/// Awaiting it yields the pipeline result. [`cancel`](Self::cancel) aborts
/// the transport call; interceptors then see
/// [`TransportError::Cancelled`] in `on_fail`. Dropping the handle leaves
/// the request running to completion.
pub struct PendingResponse<T> {
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<HttpResponse<T>>>,
}

impl<T> PendingResponse<T> {
    /// Cancel the request if it is still in flight.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Whether the pipeline has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Future for PendingResponse<T> {
    type Output = Result<HttpResponse<T>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(TransportError::Cancelled.into()),
            Err(e) => Err(TransportError::Request(format!("request task failed: {e}")).into()),
        })
    }
}

impl<T> std::fmt::Debug for PendingResponse<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResponse")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

/// Closes its client when dropped.
#[must_use = "dropping the hook closes the client immediately"]
pub struct ShutdownHook {
    client: Client,
}

impl ShutdownHook {
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Drop for ShutdownHook {
    fn drop(&mut self) {
        for error in self.client.close() {
            warn!(error = %error, "Error while closing HTTP client");
        }
    }
}
