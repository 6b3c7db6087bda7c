//! # Courier HTTP
//!
//! A fluent HTTP client: build a request declaratively, execute it, and get
//! a typed response that reports success or failure instead of raising on
//! non-2xx statuses.
//!
//! ## Features
//!
//! - **Fluent Requests**: Route params, multi-value query strings, headers, cookies, bodies
//! - **Typed Responses**: Text, bytes, JSON, serde objects, files; mapping errors are captured
//! - **Interceptors**: Ordered request/response/failure hooks with response substitution
//! - **Pagination**: Lazy link-following page iteration
//! - **Async & Cancellation**: Tokio-based async terminals with cancellable handles
//! - **Retries**: Optional backoff for connect and timeout failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier_http::{Client, Config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(
//!         Config::builder()
//!             .default_base_url("https://api.example.com")
//!             .build(),
//!     );
//!
//!     client
//!         .get("/users/{id}")
//!         .route_param("id", "42")
//!         .query_string_values("expand", ["teams", "roles"])
//!         .as_json()?
//!         .if_success(|r| println!("user: {:?}", r.body()))
//!         .if_failure(|r| eprintln!("status {}", r.status()));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Async with Cancellation
//!
//! ```rust,no_run
//! use courier_http::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::default_client();
//!
//!     let mut pending = client.get("https://api.example.com/slow").as_string_async();
//!     if pending.is_finished() {
//!         println!("{:?}", pending.await?.body());
//!     } else {
//!         pending.cancel();
//!     }
//!
//!     Ok(())
//! }
//! ```

mod body;
mod client;
mod config;
mod content_type;
mod cookie;
mod error;
pub mod header_names;
mod headers;
mod interceptor;
pub mod mapper;
mod method;
mod metrics;
mod object_mapper;
mod paged;
mod progress;
mod raw_response;
mod request;
mod response;
mod retry;
mod transport;

pub use body::Body;
pub use client::{Client, PendingResponse, ShutdownHook};
pub use config::{Config, ConfigBuilder, Proxy};
pub use content_type::{ContentType, charset_of};
pub use cookie::{Cookie, CookieParseError, Cookies, SameSite};
pub use error::{HttpClientError, MapperError, ParsingError, Result, TransportError};
pub use headers::{Header, Headers};
pub use interceptor::{
    AuthInterceptor, Interceptor, InterceptorChain, LoggingInterceptor, RateLimitInterceptor,
};
pub use mapper::{BodyDecoder, CopyOptions, DecodeContext};
pub use method::HttpMethod;
pub use metrics::{CallbackMetrics, HttpMetricsCallbackFn, MetricContext, Metrics, NoopMetrics};
pub use object_mapper::{JsonObjectMapper, ObjectMapper, read_as, write_as};
pub use paged::{PagedIterator, PagedList, next_link_from_header};
pub use progress::ProgressMonitor;
pub use raw_response::RawResponse;
pub use request::{HttpRequest, HttpRequestSummary};
pub use response::{
    BytesResponse, EmptyResponse, FileResponse, HttpResponse, HttpResponseSummary, JsonResponse,
    ResponseView, StringResponse, is_success_status,
};
pub use retry::{Backoff, RetryConfig};
pub use transport::{AsyncTransport, ReqwestAsyncTransport, ReqwestTransport, Transport};

// Re-export common types
pub use bytes::Bytes;
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use courier_http::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::{Client, PendingResponse};
    pub use crate::config::{Config, ConfigBuilder, Proxy};
    pub use crate::cookie::{Cookie, Cookies};
    pub use crate::error::{HttpClientError, Result, TransportError};
    pub use crate::headers::Headers;
    pub use crate::interceptor::{Interceptor, InterceptorChain};
    pub use crate::mapper::CopyOptions;
    pub use crate::method::HttpMethod;
    pub use crate::paged::next_link_from_header;
    pub use crate::request::{HttpRequest, HttpRequestSummary};
    pub use crate::response::{
        BytesResponse, EmptyResponse, HttpResponse, JsonResponse, ResponseView, StringResponse,
    };
    pub use crate::retry::RetryConfig;
}
