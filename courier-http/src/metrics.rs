//! Request timing hooks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::TransportError;
use crate::request::HttpRequestSummary;
use crate::response::HttpResponseSummary;

/// Type alias for HTTP metrics callback function.
pub type HttpMetricsCallbackFn = Arc<dyn Fn(&str, &str, u16, Duration) + Send + Sync>;

/// Starts a measurement for every executed request.
pub trait Metrics: Send + Sync {
    fn begin(&self, request: &HttpRequestSummary) -> Box<dyn MetricContext>;
}

/// A measurement in progress.
pub trait MetricContext: Send {
    /// Finish the measurement. Exactly one of `response`/`error` is set.
    fn complete(
        self: Box<Self>,
        response: Option<&HttpResponseSummary>,
        error: Option<&TransportError>,
    );
}

/// Metrics that record nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

struct NoopContext;

impl MetricContext for NoopContext {
    fn complete(self: Box<Self>, _: Option<&HttpResponseSummary>, _: Option<&TransportError>) {}
}

impl Metrics for NoopMetrics {
    fn begin(&self, _request: &HttpRequestSummary) -> Box<dyn MetricContext> {
        Box::new(NoopContext)
    }
}

/// Calls back with `(method, url, status, duration)` after each request.
/// The status is 0 when no response was received.
#[derive(Clone)]
pub struct CallbackMetrics {
    on_complete: HttpMetricsCallbackFn,
}

impl CallbackMetrics {
    /// Create metrics with a completion callback.
    pub fn new<F>(on_complete: F) -> Self
    where
        F: Fn(&str, &str, u16, Duration) + Send + Sync + 'static,
    {
        Self {
            on_complete: Arc::new(on_complete),
        }
    }
}

struct CallbackContext {
    on_complete: HttpMetricsCallbackFn,
    method: String,
    url: String,
    start: Instant,
}

impl MetricContext for CallbackContext {
    fn complete(
        self: Box<Self>,
        response: Option<&HttpResponseSummary>,
        _error: Option<&TransportError>,
    ) {
        let status = response.map(HttpResponseSummary::status).unwrap_or(0);
        (self.on_complete)(&self.method, &self.url, status, self.start.elapsed());
    }
}

impl Metrics for CallbackMetrics {
    fn begin(&self, request: &HttpRequestSummary) -> Box<dyn MetricContext> {
        Box::new(CallbackContext {
            on_complete: self.on_complete.clone(),
            method: request.method().to_string(),
            url: request.url().to_string(),
            start: Instant::now(),
        })
    }
}
