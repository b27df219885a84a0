//! HTTP transport layer for the Aegis client.
//!
//! Provides the transport abstraction the request pipeline calls through and
//! a reqwest-backed implementation. Transport failures are reported as
//! [`TransportError`] and are classified by the pipeline before they reach
//! retry or circuit breaker logic.

mod http;

pub use self::http::ReqwestTransport;

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl HttpMethod {
    /// Returns the method name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP request representation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request path, relative to the transport's base URL.
    pub path: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
    /// Request timeout override.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a new GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Creates a new POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON request body.
    pub fn with_json<T: serde::Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .with_header(::http::header::CONTENT_TYPE.as_str(), mime::APPLICATION_JSON.as_ref())
            .with_body(body))
    }

    /// Sets a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, lowercase names.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Returns true if the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// HTTP transport trait.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends an HTTP request and returns whatever response arrived,
    /// including non-2xx responses.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport-level error identifiers a retry policy may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportErrorCode {
    /// The peer reset the connection.
    ConnectionReset,
    /// The host name could not be resolved.
    NameNotFound,
    /// The peer refused the connection.
    ConnectionRefused,
    /// A socket-level operation timed out.
    TimedOut,
}

impl TransportErrorCode {
    /// Every known code.
    pub const ALL: [TransportErrorCode; 4] = [
        TransportErrorCode::ConnectionReset,
        TransportErrorCode::NameNotFound,
        TransportErrorCode::ConnectionRefused,
        TransportErrorCode::TimedOut,
    ];

    /// Conventional errno-style name.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportErrorCode::ConnectionReset => "ECONNRESET",
            TransportErrorCode::NameNotFound => "ENOTFOUND",
            TransportErrorCode::ConnectionRefused => "ECONNREFUSED",
            TransportErrorCode::TimedOut => "ETIMEDOUT",
        }
    }

    /// Maps an I/O error kind to a code.
    pub fn from_io_kind(kind: std::io::ErrorKind) -> Option<Self> {
        match kind {
            std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted => {
                Some(TransportErrorCode::ConnectionReset)
            }
            std::io::ErrorKind::ConnectionRefused => Some(TransportErrorCode::ConnectionRefused),
            std::io::ErrorKind::TimedOut => Some(TransportErrorCode::TimedOut),
            _ => None,
        }
    }
}

impl fmt::Display for TransportErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport error types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// No connection could be established or it was lost before a response.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
        /// Identified error code.
        code: Option<TransportErrorCode>,
    },

    /// The deadline passed before a response arrived.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// The response could not be read completely.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}
