//! Transports put a prepared request on the wire.
//!
//! The pipeline only sees the [`Transport`] and [`AsyncTransport`] traits.
//! The default implementations are backed by reqwest: the blocking client
//! for blocking terminals and the async client for `*_async` terminals.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, Proxy};
use crate::error::TransportError;
use crate::headers::Headers;
use crate::raw_response::RawResponse;
use crate::request::HttpRequest;

/// Sends a request and returns the untransformed response.
///
/// Failures that produce no HTTP response (DNS, connect, TLS, timeout) are
/// returned as errors; a transport never synthesizes a response for them.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &HttpRequest,
        config: &Arc<Config>,
    ) -> Result<RawResponse, TransportError>;

    /// Release pooled resources. Every failure is reported.
    fn close(&self) -> Vec<TransportError> {
        Vec::new()
    }
}

/// Async counterpart of [`Transport`].
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn send(
        &self,
        request: &HttpRequest,
        config: &Arc<Config>,
    ) -> Result<RawResponse, TransportError>;

    /// Release pooled resources. Every failure is reported.
    fn close(&self) -> Vec<TransportError> {
        Vec::new()
    }
}

/// Apply the client config to a reqwest client builder (blocking or async,
/// they share method names).
macro_rules! configure_builder {
    ($builder:expr, $config:expr, $connect_timeout:expr, $proxy:expr) => {{
        let config: &Config = $config;
        let mut builder = $builder
            .timeout(config.socket_timeout)
            .connect_timeout($connect_timeout)
            .pool_idle_timeout(config.ttl)
            .pool_max_idle_per_host(config.max_per_route)
            .cookie_store(config.cookie_management)
            .gzip(config.request_compression)
            .brotli(config.request_compression)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(config.user_agent.as_str());

        builder = if config.follow_redirects {
            builder.redirect(Policy::limited(config.max_redirects))
        } else {
            builder.redirect(Policy::none())
        };

        let proxy: Option<&Proxy> = $proxy;
        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest_proxy(proxy)?);
        }

        builder
    }};
}

fn reqwest_proxy(proxy: &Proxy) -> Result<reqwest::Proxy, TransportError> {
    let mut reqwest_proxy = reqwest::Proxy::all(proxy.url())?;
    if let (Some(username), Some(password)) = (proxy.username(), proxy.password()) {
        reqwest_proxy = reqwest_proxy.basic_auth(username, password);
    }
    Ok(reqwest_proxy)
}

fn blocking_client(
    config: &Config,
    connect_timeout: Duration,
    proxy: Option<&Proxy>,
) -> Result<reqwest::blocking::Client, TransportError> {
    let builder = configure_builder!(
        reqwest::blocking::Client::builder(),
        config,
        connect_timeout,
        proxy
    );
    Ok(builder.build()?)
}

fn async_client(
    config: &Config,
    connect_timeout: Duration,
    proxy: Option<&Proxy>,
) -> Result<reqwest::Client, TransportError> {
    let builder = configure_builder!(reqwest::Client::builder(), config, connect_timeout, proxy);
    Ok(builder.build()?)
}

fn status_text(status: reqwest::StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

/// Blocking transport backed by `reqwest::blocking`.
///
/// The response body is streamed: it is read only when a decoder asks for it.
pub struct ReqwestTransport {
    client: Mutex<Option<reqwest::blocking::Client>>,
}

impl ReqwestTransport {
    /// Build the connection pool from the client config.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let client = blocking_client(config, config.connect_timeout, config.proxy.as_ref())?;
        Ok(Self {
            client: Mutex::new(Some(client)),
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: &HttpRequest,
        config: &Arc<Config>,
    ) -> Result<RawResponse, TransportError> {
        let client = if request.overrides_connection() {
            blocking_client(
                config,
                request.effective_connect_timeout(),
                request.effective_proxy(),
            )?
        } else {
            let pooled = self.client.lock().clone();
            pooled.ok_or(TransportError::Closed)?
        };

        let mut builder = client
            .request(request.http_method().into(), request.url())
            .timeout(request.effective_socket_timeout());

        let headers = request.headers();
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.request_body() {
            builder = builder.body(body.to_bytes().to_vec());
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = Headers::from(response.headers());

        Ok(RawResponse::from_stream(
            status.as_u16(),
            status_text(status),
            headers,
            Box::new(response),
            config.clone(),
        ))
    }

    fn close(&self) -> Vec<TransportError> {
        let Some(client) = self.client.lock().take() else {
            return Vec::new();
        };

        // The blocking client owns a runtime that must not be dropped from
        // inside another runtime.
        match std::thread::spawn(move || drop(client)).join() {
            Ok(()) => Vec::new(),
            Err(_) => vec![TransportError::Io(
                "blocking connection pool failed to shut down".to_string(),
            )],
        }
    }
}

impl Drop for ReqwestTransport {
    fn drop(&mut self) {
        for error in Transport::close(self) {
            tracing::warn!(error = %error, "Error while dropping transport");
        }
    }
}

/// Async transport backed by `reqwest::Client`.
pub struct ReqwestAsyncTransport {
    client: Mutex<Option<reqwest::Client>>,
}

impl ReqwestAsyncTransport {
    /// Build the connection pool from the client config.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let client = async_client(config, config.connect_timeout, config.proxy.as_ref())?;
        Ok(Self {
            client: Mutex::new(Some(client)),
        })
    }
}

#[async_trait]
impl AsyncTransport for ReqwestAsyncTransport {
    async fn send(
        &self,
        request: &HttpRequest,
        config: &Arc<Config>,
    ) -> Result<RawResponse, TransportError> {
        let client = if request.overrides_connection() {
            async_client(
                config,
                request.effective_connect_timeout(),
                request.effective_proxy(),
            )?
        } else {
            let pooled = self.client.lock().clone();
            pooled.ok_or(TransportError::Closed)?
        };

        let mut builder = client
            .request(request.http_method().into(), request.url())
            .timeout(request.effective_socket_timeout());

        let headers = request.headers();
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.request_body() {
            builder = builder.body(body.to_bytes());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = Headers::from(response.headers());
        let body = response.bytes().await?;

        Ok(RawResponse::from_bytes(
            status.as_u16(),
            status_text(status),
            headers,
            body,
            config.clone(),
        ))
    }

    fn close(&self) -> Vec<TransportError> {
        self.client.lock().take();
        Vec::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for pipeline tests.

    use super::*;
    use crate::request::HttpRequestSummary;
    use bytes::Bytes;
    use std::collections::VecDeque;

    enum Reply {
        Response {
            status: u16,
            headers: Headers,
            body: Bytes,
        },
        Failure(TransportError),
    }

    #[derive(Default)]
    struct State {
        replies: VecDeque<Reply>,
        sent: Vec<HttpRequestSummary>,
        close_errors: Vec<TransportError>,
        closed: bool,
    }

    /// Answers requests from a queue, recording what was sent. An empty
    /// queue answers `200` with no body.
    #[derive(Clone, Default)]
    pub(crate) struct StubTransport {
        state: Arc<Mutex<State>>,
    }

    impl StubTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn reply(self, status: u16, body: &'static str) -> Self {
            self.reply_with_headers(status, Headers::new(), body)
        }

        pub(crate) fn reply_with_headers(
            self,
            status: u16,
            headers: Headers,
            body: &'static str,
        ) -> Self {
            self.state.lock().replies.push_back(Reply::Response {
                status,
                headers,
                body: Bytes::from_static(body.as_bytes()),
            });
            self
        }

        pub(crate) fn fail(self, error: TransportError) -> Self {
            self.state.lock().replies.push_back(Reply::Failure(error));
            self
        }

        pub(crate) fn fail_on_close(self, error: TransportError) -> Self {
            self.state.lock().close_errors.push(error);
            self
        }

        pub(crate) fn sent(&self) -> Vec<HttpRequestSummary> {
            self.state.lock().sent.clone()
        }

        pub(crate) fn is_closed(&self) -> bool {
            self.state.lock().closed
        }

        fn answer(
            &self,
            request: &HttpRequest,
            config: &Arc<Config>,
        ) -> Result<RawResponse, TransportError> {
            let mut state = self.state.lock();
            state.sent.push(request.to_summary());
            match state.replies.pop_front() {
                Some(Reply::Response {
                    status,
                    headers,
                    body,
                }) => Ok(RawResponse::from_bytes(
                    status,
                    "Stub",
                    headers,
                    body,
                    config.clone(),
                )),
                Some(Reply::Failure(error)) => Err(error),
                None => Ok(RawResponse::from_bytes(
                    200,
                    "OK",
                    Headers::new(),
                    Bytes::new(),
                    config.clone(),
                )),
            }
        }

        fn shut_down(&self) -> Vec<TransportError> {
            let mut state = self.state.lock();
            state.closed = true;
            std::mem::take(&mut state.close_errors)
        }
    }

    impl Transport for StubTransport {
        fn send(
            &self,
            request: &HttpRequest,
            config: &Arc<Config>,
        ) -> Result<RawResponse, TransportError> {
            self.answer(request, config)
        }

        fn close(&self) -> Vec<TransportError> {
            self.shut_down()
        }
    }

    #[async_trait]
    impl AsyncTransport for StubTransport {
        async fn send(
            &self,
            request: &HttpRequest,
            config: &Arc<Config>,
        ) -> Result<RawResponse, TransportError> {
            self.answer(request, config)
        }

        fn close(&self) -> Vec<TransportError> {
            self.shut_down()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_proxy_accepts_credentials() {
        let proxy = Proxy::new("proxy.local", 3128).with_credentials("user", "secret");
        assert!(reqwest_proxy(&proxy).is_ok());
    }

    #[test]
    fn test_blocking_transport_builds_and_closes() {
        let config = Config::builder()
            .follow_redirects(false)
            .verify_ssl(false)
            .ttl(Duration::from_secs(30))
            .build();

        let transport = ReqwestTransport::new(&config).unwrap();
        assert!(Transport::close(&transport).is_empty());
        assert!(Transport::close(&transport).is_empty());
    }
}
