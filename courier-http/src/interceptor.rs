//! Request lifecycle interceptors.
//!
//! Every execution attempt calls, in registration order:
//!
//! 1. [`Interceptor::on_request`] before the transport sends anything;
//! 2. [`Interceptor::on_fail`] only when the transport produced no response;
//! 3. [`Interceptor::on_response`] after the response body was mapped.
//!
//! `on_request` cannot veto a request. `on_fail` may return a substitute
//! response; the first substitute wins and becomes the pipeline result.

use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::error::TransportError;
use crate::header_names::{AUTHORIZATION, RETRY_AFTER};
use crate::request::{HttpRequest, HttpRequestSummary};
use crate::response::{EmptyResponse, ResponseView};

/// Hooks invoked around every request. All methods default to no-ops.
pub trait Interceptor: Send + Sync {
    /// Observe or modify the request before it is sent.
    fn on_request(&self, _request: &mut HttpRequest, _config: &Config) {}

    /// Observe the mapped response.
    fn on_response(
        &self,
        _response: &dyn ResponseView,
        _request: &HttpRequestSummary,
        _config: &Config,
    ) {
    }

    /// Handle a transport failure. Returning a response replaces the error.
    fn on_fail(
        &self,
        _error: &TransportError,
        _request: &HttpRequestSummary,
        _config: &Config,
    ) -> Option<EmptyResponse> {
        None
    }
}

/// Ordered list of interceptors.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor.
    pub fn add(&mut self, interceptor: impl Interceptor + 'static) {
        self.interceptors.push(Arc::new(interceptor));
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub(crate) fn on_request(&self, request: &mut HttpRequest, config: &Config) {
        for interceptor in &self.interceptors {
            interceptor.on_request(request, config);
        }
    }

    pub(crate) fn on_response(
        &self,
        response: &dyn ResponseView,
        request: &HttpRequestSummary,
        config: &Config,
    ) {
        for interceptor in &self.interceptors {
            interceptor.on_response(response, request, config);
        }
    }

    pub(crate) fn on_fail(
        &self,
        error: &TransportError,
        request: &HttpRequestSummary,
        config: &Config,
    ) -> Option<EmptyResponse> {
        self.interceptors
            .iter()
            .find_map(|interceptor| interceptor.on_fail(error, request, config))
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

/// Logging interceptor that logs requests, responses and failures.
pub struct LoggingInterceptor {
    log_headers: bool,
}

impl LoggingInterceptor {
    /// Create a new logging interceptor.
    pub fn new() -> Self {
        Self { log_headers: false }
    }

    /// Enable logging of headers.
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Interceptor for LoggingInterceptor {
    fn on_request(&self, request: &mut HttpRequest, _config: &Config) {
        tracing::debug!(
            method = %request.http_method(),
            url = %request.url(),
            "Sending HTTP request"
        );

        if self.log_headers {
            for (name, value) in request.headers().iter() {
                tracing::trace!(header = %name, value = %value, "Request header");
            }
        }
    }

    fn on_response(
        &self,
        response: &dyn ResponseView,
        request: &HttpRequestSummary,
        _config: &Config,
    ) {
        tracing::debug!(
            url = %request.url(),
            status = response.status(),
            success = response.is_success(),
            "Received HTTP response"
        );

        if self.log_headers {
            for (name, value) in response.headers().iter() {
                tracing::trace!(header = %name, value = %value, "Response header");
            }
        }
    }

    fn on_fail(
        &self,
        error: &TransportError,
        request: &HttpRequestSummary,
        _config: &Config,
    ) -> Option<EmptyResponse> {
        tracing::warn!(url = %request.url(), error = %error, "HTTP request failed");
        None
    }
}

/// Sets a credential header on every request, replacing any value the
/// request already carries.
#[derive(Clone)]
pub struct AuthInterceptor {
    header: String,
    value: String,
}

impl AuthInterceptor {
    /// `Authorization: Bearer <token>`.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::raw(AUTHORIZATION, format!("Bearer {}", token.into()))
    }

    /// `Authorization: Basic <base64(username:password)>`.
    pub fn basic(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        Self::raw(
            AUTHORIZATION,
            basic_credentials(username.as_ref(), password.as_ref()),
        )
    }

    /// An API key sent in a header of the caller's choice.
    pub fn api_key(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self::raw(header, key)
    }

    fn raw(header: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            value: value.into(),
        }
    }
}

impl fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInterceptor")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl Interceptor for AuthInterceptor {
    fn on_request(&self, request: &mut HttpRequest, _config: &Config) {
        request
            .headers_mut()
            .replace(self.header.as_str(), self.value.as_str());
    }
}

/// Warns when a server answers `429 Too Many Requests`, with the
/// `Retry-After` delay when one was sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitInterceptor;

impl RateLimitInterceptor {
    /// Seconds to wait according to a delta-seconds `Retry-After` header.
    pub fn retry_after(response: &dyn ResponseView) -> Option<u64> {
        if response.status() != 429 {
            return None;
        }
        response
            .headers()
            .get_first(RETRY_AFTER)
            .trim()
            .parse()
            .ok()
    }
}

impl Interceptor for RateLimitInterceptor {
    fn on_response(
        &self,
        response: &dyn ResponseView,
        request: &HttpRequestSummary,
        _config: &Config,
    ) {
        if response.status() != 429 {
            return;
        }
        match Self::retry_after(response) {
            Some(seconds) => tracing::warn!(
                url = %request.url(),
                retry_after_seconds = seconds,
                "Rate limited, should retry after {} seconds",
                seconds
            ),
            None => tracing::warn!(url = %request.url(), "Rate limited"),
        }
    }
}

/// `Basic <base64(user:password)>`.
pub(crate) fn basic_credentials(username: &str, password: &str) -> String {
    use base64::Engine;
    let credentials =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {credentials}")
}
