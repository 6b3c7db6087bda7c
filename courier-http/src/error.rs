//! HTTP client error types.

use std::time::Duration;
use thiserror::Error;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// Errors raised by the request pipeline.
///
/// A non-2xx status is never an error: it is reported through the
/// response's classification instead.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The transport could not produce a response at all.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The request builder was used incorrectly.
    #[error("Invalid request configuration: {0}")]
    Configuration(String),

    /// The final request URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An operation was called on a response in the wrong state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An explicit mapping request (such as `map_error`) failed.
    #[error("Mapping error: {0}")]
    Mapping(#[from] ParsingError),

    /// The client was closed before the request was executed.
    #[error("Client is closed")]
    Closed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpClientError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_retryable())
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Timeout(_)))
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Connect(_)))
    }

    /// Get the underlying transport error, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure to obtain any HTTP response: DNS, connect, TLS, timeout.
///
/// Transports report these instead of synthesizing a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// DNS resolution or TCP connection failure.
    #[error("Connection error: {0}")]
    Connect(String),

    /// Connect or socket timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Option<Duration>),

    /// TLS handshake or certificate failure.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The in-flight request was cancelled by the caller.
    #[error("Request was cancelled")]
    Cancelled,

    /// I/O failure while talking to the server.
    #[error("I/O error: {0}")]
    Io(String),

    /// Any other failure raised while sending the request.
    #[error("Request failed: {0}")]
    Request(String),

    /// The transport has been shut down.
    #[error("Transport is closed")]
    Closed,
}

impl TransportError {
    /// Connect failures and timeouts may succeed on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(None)
        } else if e.is_connect() {
            let message = e.to_string();
            if message.to_ascii_lowercase().contains("certificate")
                || message.to_ascii_lowercase().contains("tls")
            {
                Self::Tls(message)
            } else {
                Self::Connect(message)
            }
        } else {
            Self::Request(e.to_string())
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut => Self::Timeout(None),
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted => Self::Connect(e.to_string()),
            _ => Self::Io(e.to_string()),
        }
    }
}

/// A body that could not be converted into the requested type.
///
/// Captured on the response rather than raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ParsingError {
    message: String,
    original_body: String,
}

impl ParsingError {
    /// Create a parsing error carrying the body that failed to decode.
    pub fn new(message: impl Into<String>, original_body: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            original_body: original_body.into(),
        }
    }

    /// The decoder's error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The raw body text that failed to decode.
    pub fn original_body(&self) -> &str {
        &self.original_body
    }
}

/// Serialization failure inside an `ObjectMapper`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Object mapper error: {0}")]
pub struct MapperError(pub String);

impl From<serde_json::Error> for MapperError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(HttpClientError::from(TransportError::Connect("refused".into())).is_retryable());
        assert!(HttpClientError::from(TransportError::Timeout(None)).is_retryable());
        assert!(!HttpClientError::from(TransportError::Cancelled).is_retryable());
        assert!(!HttpClientError::Configuration("bad proxy".into()).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert_eq!(TransportError::from(timeout), TransportError::Timeout(None));

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "nope");
        assert!(matches!(TransportError::from(refused), TransportError::Connect(_)));
    }

    #[test]
    fn test_parsing_error_keeps_original_body() {
        let err = ParsingError::new("expected value", "not json");
        assert_eq!(err.to_string(), "expected value");
        assert_eq!(err.original_body(), "not json");
    }
}
