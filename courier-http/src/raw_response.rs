//! The untransformed response produced by a transport.

use bytes::Bytes;
use encoding_rs::Encoding;
use std::fmt;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use crate::config::Config;
use crate::content_type::charset_of;
use crate::header_names::{CONTENT_LENGTH, CONTENT_TYPE};
use crate::headers::Headers;
use crate::response::HttpResponseSummary;

enum Content {
    Bytes(Bytes),
    Stream(Box<dyn Read + Send>),
    Consumed,
}

/// Wire-level response before body decoding.
///
/// A streamed body can be read once. Reading it through
/// [`content_as_bytes`](Self::content_as_bytes) materializes it so later
/// calls return the same bytes; [`take_reader`](Self::take_reader) hands the
/// stream out and leaves nothing behind.
pub struct RawResponse {
    status: u16,
    status_text: String,
    headers: Headers,
    content: Content,
    config: Arc<Config>,
}

impl RawResponse {
    /// A response whose body is already in memory.
    pub fn from_bytes(
        status: u16,
        status_text: impl Into<String>,
        headers: Headers,
        body: impl Into<Bytes>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            content: Content::Bytes(body.into()),
            config,
        }
    }

    /// A response whose body is read lazily from a stream.
    pub fn from_stream(
        status: u16,
        status_text: impl Into<String>,
        headers: Headers,
        stream: Box<dyn Read + Send>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            content: Content::Stream(stream),
            config,
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

    /// The config in effect for the request that produced this response.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Whether a body is still available to read.
    pub fn has_content(&self) -> bool {
        match &self.content {
            Content::Bytes(bytes) => !bytes.is_empty(),
            Content::Stream(_) => true,
            Content::Consumed => false,
        }
    }

    /// The `Content-Type` header, or an empty string.
    pub fn content_type(&self) -> String {
        self.headers.get_first(CONTENT_TYPE)
    }

    /// The charset declared in `Content-Type`, or an empty string.
    pub fn encoding(&self) -> String {
        charset_of(&self.content_type()).unwrap_or_default()
    }

    /// The declared `Content-Length`, or 0.
    pub fn content_length(&self) -> u64 {
        self.headers
            .get_first(CONTENT_LENGTH)
            .trim()
            .parse()
            .unwrap_or(0)
    }

    /// Read the whole body into memory.
    pub fn content_as_bytes(&mut self) -> io::Result<Bytes> {
        match std::mem::replace(&mut self.content, Content::Consumed) {
            Content::Bytes(bytes) => {
                self.content = Content::Bytes(bytes.clone());
                Ok(bytes)
            }
            Content::Stream(mut stream) => {
                let mut buf = Vec::new();
                stream.read_to_end(&mut buf)?;
                let bytes = Bytes::from(buf);
                self.content = Content::Bytes(bytes.clone());
                Ok(bytes)
            }
            Content::Consumed => Ok(Bytes::new()),
        }
    }

    /// Decode the body as text.
    ///
    /// `charset` overrides the declared encoding; without either, the
    /// config's default response encoding is used.
    pub fn content_as_string(&mut self, charset: Option<&str>) -> io::Result<String> {
        let charset = match charset {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                let declared = self.encoding();
                if declared.is_empty() {
                    self.config.default_response_encoding.clone()
                } else {
                    declared
                }
            }
        };
        let bytes = self.content_as_bytes()?;
        Ok(decode_text(&bytes, &charset))
    }

    /// Take the body as a reader. The content is consumed.
    pub fn take_reader(&mut self) -> Box<dyn Read + Send> {
        match std::mem::replace(&mut self.content, Content::Consumed) {
            Content::Bytes(bytes) => Box::new(Cursor::new(bytes)),
            Content::Stream(stream) => stream,
            Content::Consumed => Box::new(io::empty()),
        }
    }

    /// Store bytes a decoder read out of the stream itself.
    pub(crate) fn retain(&mut self, bytes: Bytes) {
        self.content = Content::Bytes(bytes);
    }

    /// The body bytes, if they were materialized by a decoder.
    pub(crate) fn materialized(&self) -> Option<Bytes> {
        match &self.content {
            Content::Bytes(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn to_summary(&self) -> HttpResponseSummary {
        HttpResponseSummary::new(self.status, self.status_text.clone(), self.headers.clone())
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = match &self.content {
            Content::Bytes(b) => format!("{} bytes", b.len()),
            Content::Stream(_) => "stream".to_string(),
            Content::Consumed => "consumed".to_string(),
        };
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .field("content", &content)
            .finish()
    }
}

/// Decode bytes in the named charset.
///
/// Labels follow the WHATWG encoding standard; an unknown label decodes as
/// UTF-8. Malformed sequences become U+FFFD.
pub(crate) fn decode_text(bytes: &[u8], charset: &str) -> String {
    let label = charset.trim();
    let encoding = if label.is_empty() {
        encoding_rs::UTF_8
    } else {
        Encoding::for_label(label.as_bytes()).unwrap_or_else(|| {
            tracing::debug!(charset = label, "Unknown charset, decoding as UTF-8");
            encoding_rs::UTF_8
        })
    };
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: Headers, body: &'static [u8]) -> RawResponse {
        RawResponse::from_stream(
            200,
            "OK",
            headers,
            Box::new(body),
            Arc::new(Config::default()),
        )
    }

    #[test]
    fn test_stream_is_materialized_once() {
        let mut response = raw(Headers::new(), b"payload");
        assert!(response.has_content());
        assert_eq!(response.content_as_bytes().unwrap(), "payload");
        assert_eq!(response.content_as_bytes().unwrap(), "payload");
        assert_eq!(response.materialized().as_deref(), Some(&b"payload"[..]));
    }

    #[test]
    fn test_take_reader_consumes() {
        let mut response = raw(Headers::new(), b"payload");
        let mut text = String::new();
        response.take_reader().read_to_string(&mut text).unwrap();
        assert_eq!(text, "payload");
        assert!(!response.has_content());
        assert!(response.content_as_bytes().unwrap().is_empty());
    }

    #[test]
    fn test_declared_charset_is_used() {
        let headers: Headers = [("Content-Type", "text/plain; charset=ISO-8859-1")]
            .into_iter()
            .collect();
        let mut response = raw(headers, b"caf\xe9");
        assert_eq!(response.encoding(), "ISO-8859-1");
        assert_eq!(response.content_as_string(None).unwrap(), "café");
    }

    #[test]
    fn test_override_charset_wins() {
        let headers: Headers = [("Content-Type", "text/plain; charset=UTF-8")]
            .into_iter()
            .collect();
        let mut response = raw(headers, b"caf\xe9");
        assert_eq!(response.content_as_string(Some("latin1")).unwrap(), "café");
    }

    #[test]
    fn test_windows_1252_and_utf16_charsets() {
        let headers: Headers = [("Content-Type", "text/plain; charset=windows-1252")]
            .into_iter()
            .collect();
        let mut response = raw(headers, b"\x80 caf\xe9");
        assert_eq!(response.content_as_string(None).unwrap(), "€ café");

        assert_eq!(decode_text(b"h\0i\0", "UTF-16LE"), "hi");
        assert_eq!(decode_text(b"\xff", "no-such-charset"), "\u{FFFD}");
    }
}
