//! Error types for the Aegis client.
//!
//! Every failure produced by a remote call is normalized into one of three
//! classified kinds ([`ErrorKind::Service`], [`ErrorKind::Connectivity`],
//! [`ErrorKind::Timeout`]) or the circuit breaker fast-fail
//! ([`ErrorKind::CircuitOpen`]). Raw transport failures never leave the crate.

mod mapper;

pub use mapper::{
    classify_response, classify_transport_error, ApiErrorBody, CONNECTIVITY_MESSAGE,
    GENERIC_SERVICE_MESSAGE, TIMEOUT_MESSAGE,
};

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::resilience::RetryConfig;
use crate::transport::{TransportError, TransportErrorCode};

/// Result type alias for Aegis operations.
pub type AegisResult<T> = Result<T, AegisError>;

/// Error type for Aegis client operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AegisError {
    /// The remote service responded, but with a failure status.
    #[error("Service error (HTTP {status}): {message}")]
    Service {
        /// HTTP status code, verbatim.
        status: u16,
        /// Message extracted from the response body.
        message: String,
        /// Machine-readable error code, if the body carried one.
        error_code: Option<String>,
        /// Additional details from the response body.
        details: Option<serde_json::Value>,
    },

    /// No response reached the client.
    #[error("Connectivity error: {message}")]
    Connectivity {
        /// Caller-facing message.
        message: String,
        /// Transport-level error code, when one could be identified.
        code: Option<TransportErrorCode>,
        /// Text of the underlying transport failure.
        cause: Option<String>,
    },

    /// The response did not arrive before the deadline.
    #[error("Request timeout: {message}")]
    Timeout {
        /// Caller-facing message.
        message: String,
        /// The deadline that was exceeded, if known.
        timeout: Option<Duration>,
    },

    /// The circuit breaker rejected the call without reaching the service.
    #[error("Circuit breaker open: service temporarily unavailable - too many recent failures")]
    CircuitOpen {
        /// Time remaining until the breaker admits a probe.
        retry_after: Option<Duration>,
    },

    /// Input rejected before any request was made.
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
        /// The offending parameter.
        param: Option<String>,
    },

    /// Invalid client configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },
}

/// Discriminant of [`AegisError`], used for metrics and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// See [`AegisError::Service`].
    Service,
    /// See [`AegisError::Connectivity`].
    Connectivity,
    /// See [`AegisError::Timeout`].
    Timeout,
    /// See [`AegisError::CircuitOpen`].
    CircuitOpen,
    /// See [`AegisError::Validation`].
    Validation,
    /// See [`AegisError::Configuration`].
    Configuration,
}

impl ErrorKind {
    /// Stable lowercase name, suitable for log fields and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Service => "service",
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::Timeout => "timeout",
            ErrorKind::CircuitOpen => "circuit_open",
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AegisError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AegisError::Service { .. } => ErrorKind::Service,
            AegisError::Connectivity { .. } => ErrorKind::Connectivity,
            AegisError::Timeout { .. } => ErrorKind::Timeout,
            AegisError::CircuitOpen { .. } => ErrorKind::CircuitOpen,
            AegisError::Validation { .. } => ErrorKind::Validation,
            AegisError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Returns true for the three kinds produced by classifying a remote failure.
    pub fn is_classified(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Service | ErrorKind::Connectivity | ErrorKind::Timeout
        )
    }

    /// Returns the HTTP status for service errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            AegisError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the machine error code for service errors.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            AegisError::Service { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }

    /// Returns the time until the breaker admits a probe, for breaker rejections.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AegisError::CircuitOpen { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Returns true if the circuit breaker rejected the call.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, AegisError::CircuitOpen { .. })
    }

    /// Returns true if `config` would retry this error.
    pub fn is_transient(&self, config: &RetryConfig) -> bool {
        config.should_retry(self)
    }

    /// Kind-specific guidance suitable for showing to an end user.
    ///
    /// A service error whose status `config` treats as transient means the
    /// service stayed busy through every attempt; any other service error
    /// surfaces the message the service supplied.
    pub fn user_message(&self, config: &RetryConfig) -> String {
        match self {
            AegisError::Connectivity { .. } => {
                "Unable to reach the service. Please check your connection.".to_string()
            }
            AegisError::Timeout { .. } => {
                "The service took too long to respond. Please try again.".to_string()
            }
            AegisError::Service { status, .. }
                if config.retryable_status_codes.contains(status) =>
            {
                "The service is busy. Please try again shortly.".to_string()
            }
            AegisError::Service { message, .. } => message.clone(),
            AegisError::CircuitOpen { .. } => {
                "Service temporarily unavailable - too many recent failures. Please wait before retrying."
                    .to_string()
            }
            AegisError::Validation { message, .. } => message.clone(),
            AegisError::Configuration { .. } => {
                "The client is misconfigured. Please contact support.".to_string()
            }
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AegisError::Validation {
            message: message.into(),
            param: None,
        }
    }

    /// Creates a validation error naming the offending parameter.
    pub fn validation_param(message: impl Into<String>, param: impl Into<String>) -> Self {
        AegisError::Validation {
            message: message.into(),
            param: Some(param.into()),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        AegisError::Configuration {
            message: message.into(),
        }
    }

    /// Creates a service error without code or details.
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        AegisError::Service {
            status,
            message: message.into(),
            error_code: None,
            details: None,
        }
    }

    /// Creates a connectivity error carrying a transport code.
    pub fn connectivity(code: Option<TransportErrorCode>, cause: impl Into<String>) -> Self {
        AegisError::Connectivity {
            message: CONNECTIVITY_MESSAGE.to_string(),
            code,
            cause: Some(cause.into()),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout: Option<Duration>) -> Self {
        AegisError::Timeout {
            message: TIMEOUT_MESSAGE.to_string(),
            timeout,
        }
    }
}

impl From<TransportError> for AegisError {
    fn from(err: TransportError) -> Self {
        classify_transport_error(err)
    }
}

impl From<serde_json::Error> for AegisError {
    fn from(err: serde_json::Error) -> Self {
        AegisError::Validation {
            message: format!("Failed to encode request body: {}", err),
            param: None,
        }
    }
}

impl From<url::ParseError> for AegisError {
    fn from(err: url::ParseError) -> Self {
        AegisError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
