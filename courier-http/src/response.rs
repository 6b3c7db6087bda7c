//! Typed HTTP responses.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cookie::Cookies;
use crate::error::{HttpClientError, ParsingError, Result};
use crate::headers::Headers;
use crate::object_mapper::{JsonObjectMapper, ObjectMapper, read_as};

/// Response with a `String` body.
pub type StringResponse = HttpResponse<String>;
/// Response with a raw byte body.
pub type BytesResponse = HttpResponse<Bytes>;
/// Response with a JSON document body.
pub type JsonResponse = HttpResponse<serde_json::Value>;
/// Response whose body was written to a file.
pub type FileResponse = HttpResponse<PathBuf>;
/// Response whose body was not read.
pub type EmptyResponse = HttpResponse<()>;

/// Whether a status is in the 2xx range.
#[inline]
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// A response with its body mapped into `T`.
///
/// Mapping failures do not raise: the error is kept in
/// [`parsing_error`](Self::parsing_error), the body is `None`, and the
/// response is classified as a failure.
#[derive(Clone)]
pub struct HttpResponse<T> {
    status: u16,
    status_text: String,
    headers: Headers,
    body: Option<T>,
    parsing_error: Option<ParsingError>,
    raw: Option<Bytes>,
    mapper: Arc<dyn ObjectMapper>,
}

impl<T> HttpResponse<T> {
    /// Build a response by hand, e.g. as an `on_fail` substitute.
    pub fn new(status: u16, status_text: impl Into<String>, headers: Headers, body: Option<T>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            body,
            parsing_error: None,
            raw: None,
            mapper: Arc::new(JsonObjectMapper),
        }
    }

    pub(crate) fn mapped(
        summary: HttpResponseSummary,
        body: std::result::Result<T, ParsingError>,
        raw: Option<Bytes>,
        mapper: Arc<dyn ObjectMapper>,
    ) -> Self {
        let (body, parsing_error) = match body {
            Ok(body) => (Some(body), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            status: summary.status,
            status_text: summary.status_text,
            headers: summary.headers,
            body,
            parsing_error,
            raw,
            mapper,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Response headers, with the case the server sent.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<T> {
        self.body
    }

    /// The error captured while mapping the body, if any.
    pub fn parsing_error(&self) -> Option<&ParsingError> {
        self.parsing_error.as_ref()
    }

    /// 2xx status and no mapping error.
    pub fn is_success(&self) -> bool {
        is_success_status(self.status) && self.parsing_error.is_none()
    }

    /// Apply a function to the body.
    pub fn map_body<V>(&self, f: impl FnOnce(&T) -> V) -> Option<V> {
        self.body.as_ref().map(f)
    }

    /// Turn this into a response with a different body type.
    pub fn map<V>(self, f: impl FnOnce(T) -> V) -> HttpResponse<V> {
        HttpResponse {
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
            body: self.body.map(f),
            parsing_error: self.parsing_error,
            raw: self.raw,
            mapper: self.mapper,
        }
    }

    /// Same status, headers and error, with no body.
    pub fn without_body<V>(self) -> HttpResponse<V> {
        HttpResponse {
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
            body: None,
            parsing_error: self.parsing_error,
            raw: self.raw,
            mapper: self.mapper,
        }
    }

    /// Run `consumer` if the response is a success.
    pub fn if_success(self, consumer: impl FnOnce(&HttpResponse<T>)) -> Self {
        if self.is_success() {
            consumer(&self);
        }
        self
    }

    /// Run `consumer` if the response is a failure.
    pub fn if_failure(self, consumer: impl FnOnce(&HttpResponse<T>)) -> Self {
        if !self.is_success() {
            consumer(&self);
        }
        self
    }

    /// On failure, map the error body into `E` and run `consumer`.
    pub fn if_failure_as<E: DeserializeOwned>(
        self,
        consumer: impl FnOnce(HttpResponse<E>),
    ) -> Self {
        if !self.is_success() {
            let body = self.error_bytes().and_then(|bytes| {
                read_as::<E>(self.mapper.as_ref(), &bytes).map_err(|e| {
                    ParsingError::new(e.to_string(), String::from_utf8_lossy(&bytes))
                })
            });
            consumer(HttpResponse::mapped(
                self.to_summary(),
                body,
                self.raw.clone(),
                self.mapper.clone(),
            ));
        }
        self
    }

    /// Map the body of a failed response into an error type.
    ///
    /// Calling this on a successful response is an error.
    pub fn map_error<E: DeserializeOwned>(&self) -> Result<E> {
        if self.is_success() {
            return Err(HttpClientError::InvalidState(
                "map_error called on a successful response".to_string(),
            ));
        }
        let bytes = self.error_bytes()?;
        read_as::<E>(self.mapper.as_ref(), &bytes).map_err(|e| {
            HttpClientError::Mapping(ParsingError::new(
                e.to_string(),
                String::from_utf8_lossy(&bytes),
            ))
        })
    }

    /// Cookies from every `Set-Cookie` header; malformed ones are skipped.
    pub fn cookies(&self) -> Cookies {
        Cookies::from_set_cookie_headers(&self.headers)
    }

    pub fn to_summary(&self) -> HttpResponseSummary {
        HttpResponseSummary::new(self.status, self.status_text.clone(), self.headers.clone())
    }

    fn error_bytes(&self) -> std::result::Result<Bytes, ParsingError> {
        if let Some(raw) = &self.raw {
            return Ok(raw.clone());
        }
        if let Some(error) = &self.parsing_error {
            return Ok(Bytes::from(error.original_body().to_string()));
        }
        Err(ParsingError::new("response has no retained body to map", ""))
    }
}

impl<T: fmt::Debug> fmt::Debug for HttpResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("parsing_error", &self.parsing_error)
            .finish()
    }
}

/// Body-agnostic view of a response, handed to interceptors.
pub trait ResponseView {
    fn status(&self) -> u16;
    fn status_text(&self) -> &str;
    fn headers(&self) -> &Headers;
    fn parsing_error(&self) -> Option<&ParsingError>;
    fn is_success(&self) -> bool;
}

impl<T> ResponseView for HttpResponse<T> {
    fn status(&self) -> u16 {
        self.status
    }

    fn status_text(&self) -> &str {
        &self.status_text
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn parsing_error(&self) -> Option<&ParsingError> {
        self.parsing_error.as_ref()
    }

    fn is_success(&self) -> bool {
        HttpResponse::is_success(self)
    }
}

/// Immutable projection of a response, used for metrics and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseSummary {
    status: u16,
    status_text: String,
    headers: Headers,
}

impl HttpResponseSummary {
    pub fn new(status: u16, status_text: String, headers: Headers) -> Self {
        Self {
            status,
            status_text,
            headers,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::cell::Cell;

    #[derive(Debug, Deserialize, PartialEq)]
    struct ApiError {
        code: String,
    }

    fn response(status: u16, body: std::result::Result<&str, ParsingError>) -> HttpResponse<String> {
        let raw = match &body {
            Ok(b) => Some(Bytes::from(b.to_string())),
            Err(e) => Some(Bytes::from(e.original_body().to_string())),
        };
        HttpResponse::mapped(
            HttpResponseSummary::new(status, "status".into(), Headers::new()),
            body.map(str::to_string),
            raw,
            Arc::new(JsonObjectMapper),
        )
    }

    #[test]
    fn test_classification_boundaries() {
        assert!(!response(199, Ok("")).is_success());
        assert!(response(200, Ok("")).is_success());
        assert!(response(299, Ok("")).is_success());
        assert!(!response(300, Ok("")).is_success());
    }

    #[test]
    fn test_parsing_error_forces_failure() {
        let resp = response(200, Err(ParsingError::new("bad json", "{oops")));
        assert!(!resp.is_success());
        assert!(resp.body().is_none());
        assert_eq!(resp.parsing_error().map(ParsingError::original_body), Some("{oops"));
    }

    #[test]
    fn test_exactly_one_consumer_fires() {
        let success = Cell::new(0);
        let failure = Cell::new(0);

        response(404, Ok("missing"))
            .if_success(|_| success.set(success.get() + 1))
            .if_failure(|_| failure.set(failure.get() + 1));

        assert_eq!((success.get(), failure.get()), (0, 1));

        response(201, Ok("created"))
            .if_success(|_| success.set(success.get() + 1))
            .if_failure(|_| failure.set(failure.get() + 1));

        assert_eq!((success.get(), failure.get()), (1, 1));
    }

    #[test]
    fn test_map_and_map_body() {
        let resp = response(200, Ok("hello"));
        assert_eq!(resp.map_body(|b| b.len()), Some(5));

        let upper = resp.map(|b| b.to_uppercase());
        assert_eq!(upper.body().map(String::as_str), Some("HELLO"));
        assert_eq!(upper.status(), 200);
    }

    #[test]
    fn test_map_error_on_success_is_invalid_state() {
        let resp = response(200, Ok(r#"{"code":"none"}"#));
        assert!(matches!(
            resp.map_error::<ApiError>(),
            Err(HttpClientError::InvalidState(_))
        ));
    }

    #[test]
    fn test_map_error_on_failure() {
        let resp = response(422, Ok(r#"{"code":"invalid_email"}"#));
        let err: ApiError = resp.map_error().unwrap();
        assert_eq!(err.code, "invalid_email");
    }

    #[test]
    fn test_map_error_uses_parsing_error_body() {
        let resp = response(200, Err(ParsingError::new("bad", r#"{"code":"partial"}"#)));
        let err: ApiError = resp.map_error().unwrap();
        assert_eq!(err.code, "partial");
    }

    #[test]
    fn test_if_failure_as_decodes_error_body() {
        let seen = Cell::new(false);
        response(400, Ok(r#"{"code":"bad_request"}"#)).if_failure_as::<ApiError>(|e| {
            assert_eq!(e.body().map(|b| b.code.as_str()), Some("bad_request"));
            seen.set(true);
        });
        assert!(seen.get());
    }

    #[test]
    fn test_cookies_from_set_cookie() {
        let mut headers = Headers::new();
        headers.add("Set-Cookie", "a=1; Path=/");
        headers.add("Set-Cookie", "; broken");
        let resp: HttpResponse<()> = HttpResponse::new(200, "OK", headers, None);

        let cookies = resp.cookies();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get_named("a").map(|c| c.value()), Some("1"));
    }
}
