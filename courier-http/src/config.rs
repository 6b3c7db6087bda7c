//! HTTP client configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::headers::Headers;
use crate::interceptor::{Interceptor, InterceptorChain};
use crate::metrics::{Metrics, NoopMetrics};
use crate::object_mapper::{JsonObjectMapper, ObjectMapper};
use crate::retry::RetryConfig;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default socket (read) timeout.
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(60);
/// Default number of pooled connections kept per host.
pub const DEFAULT_MAX_PER_ROUTE: usize = 20;

/// A forward proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
}

impl Proxy {
    /// Create an unauthenticated proxy.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    /// Add basic credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// `http://host:port`, the form transports connect to.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Reject proxies that cannot possibly be dialed.
    pub fn validate(&self) -> Result<(), String> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err("proxy host is empty".to_string());
        }
        if host.contains("://") || host.contains('/') || host.contains(' ') {
            return Err(format!("proxy host is not a bare host name: {host:?}"));
        }
        if self.port == 0 {
            return Err("proxy port must be non-zero".to_string());
        }
        Ok(())
    }
}

/// Client-wide defaults, read by every request.
///
/// A `Config` is frozen once handed to a [`Client`](crate::Client): the
/// client keeps it behind an `Arc` and exposes no way to mutate it, so
/// requests running concurrently always observe the same values.
/// Per-request overrides live on the request.
#[derive(Clone)]
pub struct Config {
    /// Base URL prefixed to relative request URLs.
    pub default_base_url: Option<String>,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Socket (whole request) timeout.
    pub socket_timeout: Duration,
    /// Maximum idle connections kept per host.
    pub max_per_route: usize,
    /// Idle connection time-to-live. `None` keeps connections indefinitely.
    pub ttl: Option<Duration>,
    /// Follow redirects.
    pub follow_redirects: bool,
    /// Maximum redirects to follow.
    pub max_redirects: usize,
    /// Keep a cookie store between requests.
    pub cookie_management: bool,
    /// Verify TLS certificates.
    pub verify_ssl: bool,
    /// Advertise and decode gzip/brotli.
    pub request_compression: bool,
    /// Automatic retries of transport failures.
    pub retry: Option<RetryConfig>,
    /// Charset used when a response does not declare one.
    pub default_response_encoding: String,
    /// Headers added to every request.
    pub default_headers: Headers,
    /// Proxy used when a request sets none.
    pub proxy: Option<Proxy>,
    /// User agent string.
    pub user_agent: String,
    /// Body mapper used when a request sets none.
    pub object_mapper: Arc<dyn ObjectMapper>,
    /// Interceptors, in registration order.
    pub interceptors: InterceptorChain,
    /// Metrics hook.
    pub metrics: Arc<dyn Metrics>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_base_url: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            socket_timeout: DEFAULT_SOCKET_TIMEOUT,
            max_per_route: DEFAULT_MAX_PER_ROUTE,
            ttl: None,
            follow_redirects: true,
            max_redirects: 10,
            cookie_management: true,
            verify_ssl: true,
            request_compression: true,
            retry: None,
            default_response_encoding: "UTF-8".to_string(),
            default_headers: Headers::new(),
            proxy: None,
            user_agent: format!("courier-http/{}", env!("CARGO_PKG_VERSION")),
            object_mapper: Arc::new(JsonObjectMapper),
            interceptors: InterceptorChain::new(),
            metrics: Arc::new(NoopMetrics),
        }
    }
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("default_base_url", &self.default_base_url)
            .field("connect_timeout", &self.connect_timeout)
            .field("socket_timeout", &self.socket_timeout)
            .field("max_per_route", &self.max_per_route)
            .field("ttl", &self.ttl)
            .field("follow_redirects", &self.follow_redirects)
            .field("cookie_management", &self.cookie_management)
            .field("verify_ssl", &self.verify_ssl)
            .field("retry", &self.retry)
            .field("default_response_encoding", &self.default_response_encoding)
            .field("proxy", &self.proxy)
            .field("object_mapper", &self.object_mapper)
            .field("interceptors", &self.interceptors)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the base URL for relative request URLs.
    pub fn default_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.default_base_url = Some(url.into());
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the socket timeout.
    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.config.socket_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    pub fn max_per_route(mut self, max: usize) -> Self {
        self.config.max_per_route = max;
        self
    }

    /// Set the idle connection time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }

    /// Enable or disable following redirects.
    pub fn follow_redirects(mut self, enable: bool) -> Self {
        self.config.follow_redirects = enable;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Enable or disable the cookie store.
    pub fn cookie_management(mut self, enable: bool) -> Self {
        self.config.cookie_management = enable;
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn verify_ssl(mut self, enable: bool) -> Self {
        self.config.verify_ssl = enable;
        self
    }

    /// Enable or disable gzip/brotli.
    pub fn request_compression(mut self, enable: bool) -> Self {
        self.config.request_compression = enable;
        self
    }

    /// Turn automatic retries on with default settings, or off.
    pub fn automatic_retries(mut self, enable: bool) -> Self {
        self.config.retry = enable.then(RetryConfig::default);
        self
    }

    /// Set retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.config.retry = Some(config);
        self
    }

    /// Set the fallback charset for responses.
    pub fn default_response_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.config.default_response_encoding = encoding.into();
        self
    }

    /// Add a default header for all requests.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.add(name, value);
        self
    }

    /// Set a default proxy.
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the default object mapper.
    pub fn object_mapper(mut self, mapper: impl ObjectMapper + 'static) -> Self {
        self.config.object_mapper = Arc::new(mapper);
        self
    }

    /// Register an interceptor. Interceptors run in registration order.
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.config.interceptors.add(interceptor);
        self
    }

    /// Set the metrics hook.
    pub fn metrics(mut self, metrics: impl Metrics + 'static) -> Self {
        self.config.metrics = Arc::new(metrics);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        self.config
    }
}
