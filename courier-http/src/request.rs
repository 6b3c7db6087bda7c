//! Request builder.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::body::Body;
use crate::client::{Client, PendingResponse};
use crate::config::Proxy;
use crate::content_type::ContentType;
use crate::cookie::{Cookie, Cookies};
use crate::error::Result;
use crate::header_names::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use crate::headers::{Headers, check_header};
use crate::interceptor::basic_credentials;
use crate::mapper::{
    BodyDecoder, BytesBody, CopyOptions, DecodeContext, EmptyBody, FileBody, FnBody, JsonBody,
    ObjectBody, StringBody,
};
use crate::method::HttpMethod;
use crate::object_mapper::{ObjectMapper, write_as};
use crate::paged::PagedIterator;
use crate::progress::ProgressMonitor;
use crate::raw_response::RawResponse;
use crate::response::{
    BytesResponse, EmptyResponse, FileResponse, HttpResponse, JsonResponse, StringResponse,
};

/// HTTP request builder.
///
/// Configuration methods take and return `self`. Headers, query values,
/// cookies, route params and form fields accumulate; everything else is
/// overwritten by the last call.
///
/// Terminal methods borrow the request, so the same builder can be executed
/// more than once. Interceptors operate on a copy.
#[derive(Clone)]
pub struct HttpRequest {
    client: Client,
    method: HttpMethod,
    url: String,
    route_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: Headers,
    cookies: Cookies,
    body: Option<Body>,
    socket_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    proxy: Option<Proxy>,
    download_monitor: Option<Arc<dyn ProgressMonitor>>,
    object_mapper: Option<Arc<dyn ObjectMapper>>,
    response_encoding: Option<String>,
    creation_time: DateTime<Utc>,
    config_error: Option<String>,
}

impl HttpRequest {
    pub(crate) fn new(client: Client, method: HttpMethod, url: impl Into<String>) -> Self {
        let headers = client.config().default_headers.clone();
        Self {
            client,
            method,
            url: url.into(),
            route_params: Vec::new(),
            query: Vec::new(),
            headers,
            cookies: Cookies::new(),
            body: None,
            socket_timeout: None,
            connect_timeout: None,
            proxy: None,
            download_monitor: None,
            object_mapper: None,
            response_encoding: None,
            creation_time: Utc::now(),
            config_error: None,
        }
    }

    /// Add a header to the request.
    ///
    /// A name or value that cannot be sent is reported as a configuration
    /// error by the terminal call.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.validate_header(&name, &value);
        self.headers.add(name, value);
        self
    }

    /// Replace every value of a header with a single one.
    pub fn header_replace(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.validate_header(&name, &value);
        self.headers.replace(name, value);
        self
    }

    /// Add multiple headers to the request.
    pub fn with_headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |request, (name, value)| request.header(name, value))
    }

    /// Set the `Accept` header.
    pub fn accept(self, value: impl Into<String>) -> Self {
        self.header_replace(ACCEPT, value)
    }

    /// Set basic authentication.
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let credentials = basic_credentials(username, password);
        self.header_replace(AUTHORIZATION, credentials)
    }

    /// Decode text responses with this charset, whatever the server declares.
    pub fn response_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.response_encoding = Some(encoding.into());
        self
    }

    /// Add a cookie. All cookies are sent in one `Cookie` header.
    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.add(cookie);
        self
    }

    /// Add a cookie by name and value.
    pub fn cookie_value(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookie(Cookie::new(name, value))
    }

    /// Add multiple cookies.
    pub fn with_cookies(mut self, cookies: impl IntoIterator<Item = Cookie>) -> Self {
        for cookie in cookies {
            self.cookies.add(cookie);
        }
        self
    }

    /// Add a query parameter. Repeated names produce repeated pairs.
    pub fn query_string(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Add several values for one query parameter, in order.
    pub fn query_string_values<I>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let name = name.into();
        for value in values {
            self.query.push((name.clone(), value.to_string()));
        }
        self
    }

    /// Add query parameters from a map or list of pairs.
    pub fn query_string_map<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        for (name, value) in params {
            self.query.push((name.into(), value.to_string()));
        }
        self
    }

    /// Substitute `{name}` in the URL template. The value is used as is.
    pub fn route_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.route_params.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.route_params.push((name, value)),
        }
        self
    }

    /// Substitute several route params.
    pub fn route_params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        params
            .into_iter()
            .fold(self, |request, (name, value)| request.route_param(name, value))
    }

    /// Use this mapper for the request body and the response instead of the
    /// client default.
    pub fn with_object_mapper(mut self, mapper: impl ObjectMapper + 'static) -> Self {
        self.object_mapper = Some(Arc::new(mapper));
        self
    }

    /// Set the socket timeout for this request.
    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout for this request.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Route this request through a proxy.
    pub fn proxy(self, host: impl Into<String>, port: u16) -> Self {
        self.set_proxy(Proxy::new(host, port))
    }

    /// Route this request through a proxy that requires basic credentials.
    pub fn proxy_with_auth(
        self,
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.set_proxy(Proxy::new(host, port).with_credentials(username, password))
    }

    fn set_proxy(mut self, proxy: Proxy) -> Self {
        if let Err(e) = proxy.validate() {
            self.record_error(format!("invalid proxy: {e}"));
        }
        self.proxy = Some(proxy);
        self
    }

    /// Report download progress to a monitor.
    pub fn download_monitor(mut self, monitor: impl ProgressMonitor + 'static) -> Self {
        self.download_monitor = Some(Arc::new(monitor));
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(Body::Bytes(body.into()));
        self
    }

    /// Set the request body as text.
    pub fn body_text(mut self, text: impl Into<String>) -> Self {
        self.default_content_type(ContentType::TextPlain.with_charset("UTF-8"));
        self.body = Some(Body::Text(text.into()));
        self
    }

    /// Serialize the body with the effective object mapper.
    ///
    /// Call [`with_object_mapper`](Self::with_object_mapper) first to encode
    /// with a different mapper.
    pub fn body_object<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match write_as(self.object_mapper().as_ref(), value) {
            Ok(bytes) => {
                self.default_content_type(ContentType::ApplicationJson.as_str());
                self.body = Some(Body::Bytes(Bytes::from(bytes)));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize request body");
                self.record_error(format!("failed to serialize body: {e}"));
            }
        }
        self
    }

    /// Set the request body as form data.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        match serde_urlencoded::to_string(form) {
            Ok(encoded) => {
                let fields = url::form_urlencoded::parse(encoded.as_bytes())
                    .into_owned()
                    .collect();
                self.default_content_type(ContentType::ApplicationFormUrlencoded.as_str());
                self.body = Some(Body::Form(fields));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode form data");
                self.record_error(format!("failed to encode form: {e}"));
            }
        }
        self
    }

    /// Append a url-encoded form field.
    pub fn field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let pair = (name.into(), value.to_string());
        match &mut self.body {
            Some(Body::Form(fields)) => fields.push(pair),
            _ => self.body = Some(Body::Form(vec![pair])),
        }
        self.default_content_type(ContentType::ApplicationFormUrlencoded.as_str());
        self
    }

    fn default_content_type(&mut self, content_type: impl Into<String>) {
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers.add(CONTENT_TYPE, content_type);
        }
    }

    fn validate_header(&mut self, name: &str, value: &str) {
        if let Err(message) = check_header(name, value) {
            self.record_error(message);
        }
    }

    fn record_error(&mut self, message: String) {
        if self.config_error.is_none() {
            self.config_error = Some(message);
        }
    }

    pub fn http_method(&self) -> HttpMethod {
        self.method
    }

    /// The URL template as given, before substitution.
    pub fn raw_url(&self) -> &str {
        &self.url
    }

    /// The final URL: route params substituted, base URL applied and the
    /// query string appended.
    pub fn url(&self) -> String {
        let mut url = self.url.clone();
        for (name, value) in &self.route_params {
            url = url.replace(&format!("{{{name}}}"), value);
        }

        if !is_absolute(&url)
            && let Some(base) = &self.client.config().default_base_url
        {
            url = join_base(base, &url);
        }

        if !self.query.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        url
    }

    /// Headers as they will be sent, cookies merged into one `Cookie` entry.
    pub fn headers(&self) -> Headers {
        let mut headers = self.headers.clone();
        if let Some(cookies) = self.cookies.to_header_value() {
            let existing = headers.get(COOKIE);
            if existing.is_empty() {
                headers.add(COOKIE, cookies);
            } else {
                headers.replace(COOKIE, format!("{}; {cookies}", existing.join("; ")));
            }
        }
        headers
    }

    /// Mutable access to the explicit headers, for interceptors.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn cookie_jar(&self) -> &Cookies {
        &self.cookies
    }

    pub fn request_body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Per-request socket timeout, falling back to the client config.
    pub fn effective_socket_timeout(&self) -> Duration {
        self.socket_timeout
            .unwrap_or(self.client.config().socket_timeout)
    }

    /// Per-request connect timeout, falling back to the client config.
    pub fn effective_connect_timeout(&self) -> Duration {
        self.connect_timeout
            .unwrap_or(self.client.config().connect_timeout)
    }

    /// Per-request proxy, falling back to the client config.
    pub fn effective_proxy(&self) -> Option<&Proxy> {
        self.proxy
            .as_ref()
            .or(self.client.config().proxy.as_ref())
    }

    /// Whether this request needs a connection setup different from the
    /// client's (its own connect timeout or proxy).
    pub fn overrides_connection(&self) -> bool {
        self.connect_timeout.is_some() || self.proxy.is_some()
    }

    /// Per-request mapper, falling back to the client config.
    pub fn object_mapper(&self) -> Arc<dyn ObjectMapper> {
        self.object_mapper
            .clone()
            .unwrap_or_else(|| self.client.config().object_mapper.clone())
    }

    /// When the request was built. Unchanged by clones and executions.
    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn to_summary(&self) -> HttpRequestSummary {
        HttpRequestSummary {
            method: self.method,
            url: self.url(),
            raw_url: self.url.clone(),
            headers: self.headers(),
        }
    }

    pub(crate) fn config_error(&self) -> Option<&str> {
        self.config_error.as_deref()
    }

    pub(crate) fn decode_context(&self) -> DecodeContext {
        let mut ctx = DecodeContext::new(self.object_mapper());
        if let Some(encoding) = &self.response_encoding {
            ctx = ctx.with_response_encoding(encoding.clone());
        }
        if let Some(monitor) = &self.download_monitor {
            ctx = ctx.with_monitor(monitor.clone());
        }
        ctx
    }

    /// Point this request at a link taken from a previous response.
    pub(crate) fn follow(&self, link: &str) -> Self {
        let mut next = self.clone();
        next.url = link.to_string();
        next.route_params.clear();
        next.query.clear();
        next
    }

    /// Execute and decode the body with `decoder`.
    pub fn execute<D: BodyDecoder>(&self, decoder: D) -> Result<HttpResponse<D::Output>> {
        self.client.execute(self.clone(), decoder)
    }

    /// Execute and decode the body as text.
    pub fn as_string(&self) -> Result<StringResponse> {
        self.execute(StringBody)
    }

    /// Execute and keep the body as bytes.
    pub fn as_bytes(&self) -> Result<BytesResponse> {
        self.execute(BytesBody)
    }

    /// Execute and parse the body as JSON.
    pub fn as_json(&self) -> Result<JsonResponse> {
        self.execute(JsonBody)
    }

    /// Execute and deserialize the body into `T`.
    pub fn as_object<T: DeserializeOwned>(&self) -> Result<HttpResponse<T>> {
        self.execute(ObjectBody::<T>::new())
    }

    /// Execute and build the body from the raw response.
    pub fn as_object_with<T, F>(&self, f: F) -> Result<HttpResponse<T>>
    where
        F: FnOnce(&mut RawResponse) -> T,
    {
        self.execute(FnBody::new(f))
    }

    /// Execute and stream the body into a file.
    pub fn as_file(&self, path: impl Into<PathBuf>, options: CopyOptions) -> Result<FileResponse> {
        self.execute(FileBody::new(path, options))
    }

    /// Execute without reading the body.
    pub fn as_empty(&self) -> Result<EmptyResponse> {
        self.execute(EmptyBody)
    }

    /// Execute and hand the raw response to `consumer`.
    pub fn then_consume<F>(&self, consumer: F) -> Result<EmptyResponse>
    where
        F: FnOnce(&mut RawResponse),
    {
        self.execute(FnBody::new(consumer))
    }

    /// Follow "next" links lazily.
    ///
    /// `mapping` executes each page; `link` extracts the next URL from a
    /// page. Iteration stops when `link` returns `None` or an empty string.
    pub fn as_paged<T, M, L>(&self, mapping: M, link: L) -> PagedIterator<T, M, L>
    where
        M: FnMut(HttpRequest) -> Result<HttpResponse<T>>,
        L: FnMut(&HttpResponse<T>) -> Option<String>,
    {
        PagedIterator::new(self.clone(), mapping, link)
    }

    /// Execute on the tokio runtime and decode the body with `decoder`.
    pub fn execute_async<D>(&self, decoder: D) -> PendingResponse<D::Output>
    where
        D: BodyDecoder + Send + 'static,
        D::Output: Send + 'static,
    {
        self.client.execute_async(self.clone(), decoder)
    }

    pub fn as_string_async(&self) -> PendingResponse<String> {
        self.execute_async(StringBody)
    }

    pub fn as_bytes_async(&self) -> PendingResponse<Bytes> {
        self.execute_async(BytesBody)
    }

    pub fn as_json_async(&self) -> PendingResponse<serde_json::Value> {
        self.execute_async(JsonBody)
    }

    pub fn as_object_async<T>(&self) -> PendingResponse<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute_async(ObjectBody::<T>::new())
    }

    pub fn as_empty_async(&self) -> PendingResponse<()> {
        self.execute_async(EmptyBody)
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url())
            .field("headers", &self.headers())
            .field("body", &self.body)
            .field("creation_time", &self.creation_time)
            .finish_non_exhaustive()
    }
}

fn is_absolute(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn join_base(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) if !path.is_empty() => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Immutable projection of a request, handed to interceptors and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestSummary {
    method: HttpMethod,
    url: String,
    raw_url: String,
    headers: Headers,
}

impl HttpRequestSummary {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The final URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL template before substitution.
    pub fn raw_path(&self) -> &str {
        &self.raw_url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::HttpClientError;
    use crate::transport::testing::StubTransport;
    use std::collections::BTreeMap;

    fn client() -> Client {
        Client::default_client()
    }

    #[test]
    fn test_route_params() {
        let request = client()
            .get("http://localhost/users/{id}/posts/{missing}")
            .route_param("id", "42");
        assert_eq!(request.url(), "http://localhost/users/42/posts/{missing}");
        assert_eq!(request.raw_url(), "http://localhost/users/{id}/posts/{missing}");
    }

    #[test]
    fn test_route_param_is_not_encoded_and_last_value_wins() {
        let request = client()
            .get("http://localhost/files/{name}")
            .route_param("name", "a%20b")
            .route_param("name", "c%20d");
        assert_eq!(request.url(), "http://localhost/files/c%20d");
    }

    #[test]
    fn test_query_string_values_are_repeated_in_order() {
        let request = client()
            .get("http://localhost/search")
            .query_string_values("tag", ["a", "b"])
            .query_string("q", "rust lang");
        assert_eq!(request.url(), "http://localhost/search?tag=a&tag=b&q=rust+lang");
    }

    #[test]
    fn test_query_appends_to_existing_query() {
        let mut params = BTreeMap::new();
        params.insert("page", 2);
        params.insert("size", 50);

        let request = client()
            .get("http://localhost/items?sort=asc")
            .query_string_map(params);
        assert_eq!(request.url(), "http://localhost/items?sort=asc&page=2&size=50");
    }

    #[test]
    fn test_base_url_applies_to_relative_urls_only() {
        let client = Client::new(
            Config::builder()
                .default_base_url("https://api.example.com/")
                .build(),
        );
        assert_eq!(client.get("/users").url(), "https://api.example.com/users");
        assert_eq!(client.get("users").url(), "https://api.example.com/users");
        assert_eq!(client.get("http://other.host/x").url(), "http://other.host/x");
    }

    #[test]
    fn test_creation_time_survives_clones() {
        let request = client().get("http://localhost/");
        let created = request.creation_time();
        std::thread::sleep(Duration::from_millis(5));

        let copy = request.clone().header("X-Later", "1");
        assert_eq!(copy.creation_time(), created);
        assert_eq!(request.follow("http://localhost/next").creation_time(), created);
    }

    #[test]
    fn test_cookies_are_merged_into_one_header() {
        let request = client()
            .get("http://localhost/")
            .cookie_value("session", "abc")
            .cookie(Cookie::new("theme", "dark"));

        let headers = request.headers();
        assert_eq!(headers.get("cookie"), vec!["session=abc; theme=dark"]);
    }

    #[test]
    fn test_default_headers_are_copied() {
        let client = Client::new(Config::builder().default_header("X-Client", "courier").build());
        let request = client.get("http://localhost/").header("x-client", "override");
        assert_eq!(request.headers().get("X-Client"), vec!["courier", "override"]);
    }

    #[test]
    fn test_basic_auth_and_accept_overwrite() {
        let request = client()
            .get("http://localhost/")
            .basic_auth("user", "first")
            .basic_auth("user", "pass")
            .accept("text/plain")
            .accept("application/json");

        let headers = request.headers();
        assert_eq!(headers.get("Authorization"), vec!["Basic dXNlcjpwYXNz"]);
        assert_eq!(headers.get("Accept"), vec!["application/json"]);
    }

    #[test]
    fn test_body_object_sets_content_type_when_absent() {
        let request = client()
            .post("http://localhost/")
            .body_object(&serde_json::json!({"name": "ada"}));
        assert_eq!(request.headers().get_first("content-type"), "application/json");
        assert_eq!(
            request.request_body().map(Body::to_bytes),
            Some(Bytes::from_static(br#"{"name":"ada"}"#))
        );

        let custom = client()
            .post("http://localhost/")
            .header("Content-Type", "application/vnd.api+json")
            .body_object(&serde_json::json!({}));
        assert_eq!(custom.headers().get("content-type"), vec!["application/vnd.api+json"]);
    }

    #[test]
    fn test_form_and_fields_accumulate() {
        #[derive(Serialize)]
        struct Login<'a> {
            user: &'a str,
        }

        let request = client()
            .post("http://localhost/login")
            .form(&Login { user: "ada" })
            .field("remember", true);

        assert_eq!(
            request.request_body().map(Body::to_bytes),
            Some(Bytes::from_static(b"user=ada&remember=true"))
        );
        assert_eq!(
            request.headers().get_first("Content-Type"),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn test_per_request_overrides_do_not_touch_config() {
        let client = client();
        let request = client
            .get("http://localhost/")
            .socket_timeout(Duration::from_secs(1))
            .proxy("proxy.local", 3128);

        assert_eq!(request.effective_socket_timeout(), Duration::from_secs(1));
        assert_eq!(request.effective_connect_timeout(), Duration::from_secs(10));
        assert_eq!(request.effective_proxy().map(Proxy::port), Some(3128));
        assert!(request.overrides_connection());
        assert_eq!(client.config().socket_timeout, Duration::from_secs(60));
        assert!(client.config().proxy.is_none());
    }

    #[test]
    fn test_bad_proxy_fails_before_sending() {
        let stub = StubTransport::new();
        let client = Client::with_transport(Config::default(), stub.clone());

        let result = client.get("http://localhost/").proxy("", 8080).as_string();

        assert!(matches!(result, Err(HttpClientError::Configuration(_))));
        assert_eq!(stub.sent().len(), 0);
    }

    #[test]
    fn test_unparseable_url_is_invalid_url() {
        let stub = StubTransport::new();
        let client = Client::with_transport(Config::default(), stub.clone());

        let result = client.get("not a url/{id}").as_empty();

        assert!(matches!(result, Err(HttpClientError::InvalidUrl(_))));
        assert!(stub.sent().is_empty());
    }

    #[test]
    fn test_summary() {
        let summary = client()
            .delete("http://localhost/users/{id}")
            .route_param("id", "7")
            .to_summary();

        assert_eq!(summary.method(), HttpMethod::Delete);
        assert_eq!(summary.url(), "http://localhost/users/7");
        assert_eq!(summary.raw_path(), "http://localhost/users/{id}");
    }
}
