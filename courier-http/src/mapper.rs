//! Body decoding strategies.
//!
//! Every terminal method on [`HttpRequest`](crate::HttpRequest) runs the same
//! pipeline and differs only in the [`BodyDecoder`] it hands to
//! [`map_response`]. Decoders never raise: a failure is captured on the
//! response as a [`ParsingError`] and flips its classification to failure.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ParsingError;
use crate::object_mapper::{ObjectMapper, read_as};
use crate::progress::{MonitoredReader, ProgressMonitor};
use crate::raw_response::{RawResponse, decode_text};
use crate::response::HttpResponse;

/// Request-local settings a decoder may consult.
#[derive(Clone)]
pub struct DecodeContext {
    object_mapper: Arc<dyn ObjectMapper>,
    response_encoding: Option<String>,
    monitor: Option<Arc<dyn ProgressMonitor>>,
}

impl DecodeContext {
    pub fn new(object_mapper: Arc<dyn ObjectMapper>) -> Self {
        Self {
            object_mapper,
            response_encoding: None,
            monitor: None,
        }
    }

    /// Force a charset, ignoring the one the server declared.
    pub fn with_response_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.response_encoding = Some(encoding.into());
        self
    }

    /// Report body reads to a monitor.
    pub fn with_monitor(mut self, monitor: Arc<dyn ProgressMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn object_mapper(&self) -> &Arc<dyn ObjectMapper> {
        &self.object_mapper
    }

    pub fn response_encoding(&self) -> Option<&str> {
        self.response_encoding.as_deref()
    }

    pub fn monitor(&self) -> Option<&Arc<dyn ProgressMonitor>> {
        self.monitor.as_ref()
    }
}

/// Converts a raw response body into a typed value.
pub trait BodyDecoder {
    type Output;

    fn decode(
        self,
        raw: &mut RawResponse,
        ctx: &DecodeContext,
    ) -> Result<Self::Output, ParsingError>;
}

/// Map a raw response into a typed, classified response.
///
/// The raw response is consumed and its content released on return,
/// whether or not decoding succeeded.
pub fn map_response<D: BodyDecoder>(
    mut raw: RawResponse,
    decoder: D,
    ctx: &DecodeContext,
) -> HttpResponse<D::Output> {
    let summary = raw.to_summary();
    let body = decoder.decode(&mut raw, ctx);

    if let Err(e) = &body {
        tracing::debug!(status = summary.status(), error = %e, "Failed to map response body");
    }

    HttpResponse::mapped(summary, body, raw.materialized(), ctx.object_mapper.clone())
}

/// Decode the body as text.
///
/// The charset is taken from the request override, then the response's
/// `Content-Type`, then the config default.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringBody;

impl BodyDecoder for StringBody {
    type Output = String;

    fn decode(self, raw: &mut RawResponse, ctx: &DecodeContext) -> Result<String, ParsingError> {
        let charset = match ctx.response_encoding() {
            Some(charset) if !charset.is_empty() => charset.to_string(),
            _ => {
                let declared = raw.encoding();
                if declared.is_empty() {
                    raw.config().default_response_encoding.clone()
                } else {
                    declared
                }
            }
        };
        let bytes = body_bytes(raw, ctx)?;
        Ok(decode_text(&bytes, &charset))
    }
}

/// Keep the body as raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesBody;

impl BodyDecoder for BytesBody {
    type Output = Bytes;

    fn decode(self, raw: &mut RawResponse, ctx: &DecodeContext) -> Result<Bytes, ParsingError> {
        body_bytes(raw, ctx)
    }
}

/// Parse the body as a JSON document. An empty body is `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody;

impl BodyDecoder for JsonBody {
    type Output = serde_json::Value;

    fn decode(
        self,
        raw: &mut RawResponse,
        ctx: &DecodeContext,
    ) -> Result<serde_json::Value, ParsingError> {
        let bytes = body_bytes(raw, ctx)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ParsingError::new(e.to_string(), String::from_utf8_lossy(&bytes)))
    }
}

/// Deserialize the body into `T` with the effective object mapper.
pub struct ObjectBody<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> ObjectBody<T> {
    pub fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }
}

impl<T> Default for ObjectBody<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> BodyDecoder for ObjectBody<T> {
    type Output = T;

    fn decode(self, raw: &mut RawResponse, ctx: &DecodeContext) -> Result<T, ParsingError> {
        let bytes = body_bytes(raw, ctx)?;
        read_as::<T>(ctx.object_mapper.as_ref(), &bytes)
            .map_err(|e| ParsingError::new(e.to_string(), String::from_utf8_lossy(&bytes)))
    }
}

/// How [`FileBody`] treats the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Overwrite a file that already exists.
    pub replace_existing: bool,
    /// Create missing parent directories.
    pub create_dirs: bool,
}

impl CopyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_existing(mut self) -> Self {
        self.replace_existing = true;
        self
    }

    pub fn create_dirs(mut self) -> Self {
        self.create_dirs = true;
        self
    }
}

/// Stream the body into a file and return its path.
#[derive(Debug, Clone)]
pub struct FileBody {
    path: PathBuf,
    options: CopyOptions,
}

impl FileBody {
    pub fn new(path: impl Into<PathBuf>, options: CopyOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }
}

impl BodyDecoder for FileBody {
    type Output = PathBuf;

    fn decode(self, raw: &mut RawResponse, ctx: &DecodeContext) -> Result<PathBuf, ParsingError> {
        let path = self.path;

        if self.options.create_dirs
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| write_failure(&path, e))?;
        }

        let total = raw.content_length();
        let reader = raw.take_reader();
        let mut reader: Box<dyn Read + Send> = match ctx.monitor() {
            Some(monitor) => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Box::new(MonitoredReader::new(reader, monitor.clone(), file_name, total))
            }
            None => reader,
        };

        let replace = self.options.replace_existing;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(replace)
            .truncate(replace)
            .create_new(!replace)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    ParsingError::new(format!("{} already exists", path.display()), "")
                }
                _ => write_failure(&path, e),
            })?;

        if let Err(e) = io::copy(&mut reader, &mut file) {
            drop(file);
            if let Err(remove) = fs::remove_file(&path) {
                tracing::debug!(path = %path.display(), error = %remove, "Failed to remove partial download");
            }
            return Err(write_failure(&path, e));
        }

        Ok(path)
    }
}

/// Leave the body unread.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBody;

impl BodyDecoder for EmptyBody {
    type Output = ();

    fn decode(self, _raw: &mut RawResponse, _ctx: &DecodeContext) -> Result<(), ParsingError> {
        Ok(())
    }
}

/// Hand the raw response to a caller function.
pub struct FnBody<F> {
    f: F,
}

impl<F> FnBody<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, T> BodyDecoder for FnBody<F>
where
    F: FnOnce(&mut RawResponse) -> T,
{
    type Output = T;

    fn decode(self, raw: &mut RawResponse, _ctx: &DecodeContext) -> Result<T, ParsingError> {
        Ok((self.f)(raw))
    }
}

/// Read the whole body, through the monitor when one is set.
fn body_bytes(raw: &mut RawResponse, ctx: &DecodeContext) -> Result<Bytes, ParsingError> {
    let Some(monitor) = ctx.monitor() else {
        return raw.content_as_bytes().map_err(read_failure);
    };

    let total = raw.content_length();
    let mut reader = MonitoredReader::new(raw.take_reader(), monitor.clone(), "", total);
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(read_failure)?;

    let bytes = Bytes::from(buf);
    raw.retain(bytes.clone());
    Ok(bytes)
}

fn read_failure(e: io::Error) -> ParsingError {
    ParsingError::new(format!("failed to read response body: {e}"), "")
}

fn write_failure(path: &std::path::Path, e: io::Error) -> ParsingError {
    ParsingError::new(format!("failed to write {}: {e}", path.display()), "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::headers::Headers;
    use crate::object_mapper::JsonObjectMapper;
    use parking_lot::Mutex;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    fn ctx() -> DecodeContext {
        DecodeContext::new(Arc::new(JsonObjectMapper))
    }

    fn raw(status: u16, content_type: &str, body: &'static [u8]) -> RawResponse {
        let mut headers = Headers::new();
        if !content_type.is_empty() {
            headers.add("Content-Type", content_type);
        }
        headers.add("Content-Length", body.len().to_string());
        RawResponse::from_stream(status, "OK", headers, Box::new(body), Arc::new(Config::default()))
    }

    #[test]
    fn test_malformed_json_on_200_is_failure() {
        let response = map_response(raw(200, "application/json", b"{not json"), JsonBody, &ctx());

        assert_eq!(response.status(), 200);
        assert!(!response.is_success());
        assert!(response.body().is_none());
        assert_eq!(
            response.parsing_error().map(ParsingError::original_body),
            Some("{not json")
        );
    }

    #[test]
    fn test_empty_json_body_is_null() {
        let response = map_response(raw(204, "", b""), JsonBody, &ctx());
        assert!(response.is_success());
        assert_eq!(response.body(), Some(&serde_json::Value::Null));
    }

    #[test]
    fn test_object_body() {
        let response = map_response(
            raw(200, "application/json", br#"{"id":1,"name":"ada"}"#),
            ObjectBody::<User>::new(),
            &ctx(),
        );
        assert_eq!(
            response.into_body(),
            Some(User { id: 1, name: "ada".into() })
        );
    }

    #[test]
    fn test_object_body_type_mismatch_keeps_error_body() {
        let response = map_response(
            raw(200, "application/json", br#"{"id":"one"}"#),
            ObjectBody::<User>::new(),
            &ctx(),
        );
        assert!(!response.is_success());
        assert_eq!(
            response.parsing_error().map(ParsingError::original_body),
            Some(r#"{"id":"one"}"#)
        );
    }

    #[test]
    fn test_string_body_charset_precedence() {
        let declared = map_response(raw(200, "text/plain; charset=latin1", b"caf\xe9"), StringBody, &ctx());
        assert_eq!(declared.body().map(String::as_str), Some("café"));

        let overridden = map_response(
            raw(200, "text/plain; charset=UTF-8", b"caf\xe9"),
            StringBody,
            &ctx().with_response_encoding("ISO-8859-1"),
        );
        assert_eq!(overridden.body().map(String::as_str), Some("café"));
    }

    #[test]
    fn test_string_body_decodes_legacy_and_utf16_charsets() {
        let cp1252 = map_response(
            raw(200, "text/plain; charset=windows-1252", b"\x80 caf\xe9"),
            StringBody,
            &ctx(),
        );
        assert_eq!(cp1252.body().map(String::as_str), Some("€ café"));

        let utf16 = map_response(raw(200, "text/plain; charset=UTF-16LE", b"h\0i\0"), StringBody, &ctx());
        assert_eq!(utf16.body().map(String::as_str), Some("hi"));
    }

    #[test]
    fn test_error_body_retained_for_map_error() {
        #[derive(Debug, Deserialize)]
        struct ApiError {
            code: String,
        }

        let response = map_response(raw(404, "application/json", br#"{"code":"missing"}"#), StringBody, &ctx());
        let error: ApiError = response.map_error().unwrap();
        assert_eq!(error.code, "missing");
    }

    #[test]
    fn test_monitor_sees_bytes_and_body_is_retained() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let ctx = ctx().with_monitor(Arc::new(move |_: &str, _: &str, written: u64, total: u64| {
            sink.lock().push((written, total));
        }));

        let response = map_response(raw(500, "text/plain", b"boom"), BytesBody, &ctx);

        assert_eq!(response.body().map(|b| &b[..]), Some(&b"boom"[..]));
        assert_eq!(seen.lock().last(), Some(&(4, 4)));
        assert!(response.map_error::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_empty_body_does_not_read() {
        let response = map_response(raw(200, "text/plain", b"ignored"), EmptyBody, &ctx());
        assert!(response.is_success());
        assert_eq!(response.body(), Some(&()));
    }

    #[test]
    fn test_fn_body_gets_raw_response() {
        let response = map_response(
            raw(201, "text/plain", b"abc"),
            FnBody::new(|raw: &mut RawResponse| raw.content_as_string(None).map(|s| s.len()).unwrap_or(0)),
            &ctx(),
        );
        assert_eq!(response.into_body(), Some(3));
    }

    #[test]
    fn test_file_body_writes_and_respects_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.bin");

        let response = map_response(
            raw(200, "application/octet-stream", b"file contents"),
            FileBody::new(&path, CopyOptions::new().create_dirs()),
            &ctx(),
        );
        assert!(response.is_success());
        assert_eq!(fs::read(&path).unwrap(), b"file contents");

        let refused = map_response(
            raw(200, "application/octet-stream", b"second"),
            FileBody::new(&path, CopyOptions::new()),
            &ctx(),
        );
        assert!(!refused.is_success());
        assert_eq!(fs::read(&path).unwrap(), b"file contents");

        let replaced = map_response(
            raw(200, "application/octet-stream", b"second"),
            FileBody::new(&path, CopyOptions::new().replace_existing()),
            &ctx(),
        );
        assert_eq!(replaced.body(), Some(&path));
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    struct BrokenPipe {
        sent: bool,
    }

    impl Read for BrokenPipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
            }
            self.sent = true;
            let n = buf.len().min(4);
            buf[..n].copy_from_slice(&b"part"[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_file_body_removes_partial_download() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.bin");
        let raw = RawResponse::from_stream(
            200,
            "OK",
            Headers::new(),
            Box::new(BrokenPipe { sent: false }),
            Arc::new(Config::default()),
        );

        let response = map_response(raw, FileBody::new(&path, CopyOptions::new()), &ctx());

        assert!(!response.is_success());
        assert!(response.parsing_error().is_some());
        assert!(!path.exists());
    }
}
