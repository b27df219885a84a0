//! Classification of raw transport outcomes into [`AegisError`].

use serde::Deserialize;
use serde_json::Value;

use super::AegisError;
use crate::transport::{HttpResponse, TransportError};

/// Message attached to every timeout error.
pub const TIMEOUT_MESSAGE: &str = "The request took too long to complete. Please try again.";

/// Message attached to every connectivity error.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the service. Please check your network connection.";

/// Fallback message when a failed response carries no usable message.
pub const GENERIC_SERVICE_MESSAGE: &str = "An unexpected error occurred";

/// Error body returned by the service.
///
/// The service answers failures either with a flat body
/// (`{"message", "error_code", "details"}`) or with the payload nested under
/// `detail`; validation failures put a list of problems in `detail`.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    /// Primary message field.
    #[serde(default)]
    pub message: Option<String>,
    /// Alternate message field: a string, a nested error body, or a list.
    #[serde(default)]
    pub detail: Option<Value>,
    /// Machine error code.
    #[serde(default)]
    pub error_code: Option<String>,
    /// Alternate machine error code; may be a string or a number.
    #[serde(default)]
    pub code: Option<Value>,
    /// Free-form details.
    #[serde(default)]
    pub details: Option<Value>,
}

impl ApiErrorBody {
    fn message(&self) -> Option<String> {
        if let Some(message) = non_empty(self.message.as_deref()) {
            return Some(message);
        }
        match &self.detail {
            Some(Value::String(detail)) => non_empty(Some(detail.as_str())),
            Some(Value::Object(nested)) => {
                non_empty(nested.get("message").and_then(Value::as_str))
            }
            _ => None,
        }
    }

    fn error_code(&self) -> Option<String> {
        if let Some(code) = non_empty(self.error_code.as_deref()) {
            return Some(code);
        }
        if let Some(code) = self.code.as_ref().and_then(code_to_string) {
            return Some(code);
        }
        match &self.detail {
            Some(Value::Object(nested)) => nested
                .get("error_code")
                .or_else(|| nested.get("code"))
                .and_then(code_to_string),
            _ => None,
        }
    }

    fn details(&self) -> Option<Value> {
        if let Some(details) = self.details.as_ref().filter(|d| !d.is_null()) {
            return Some(details.clone());
        }
        match &self.detail {
            Some(Value::Object(nested)) => nested.get("details").filter(|d| !d.is_null()).cloned(),
            Some(list @ Value::Array(_)) => Some(list.clone()),
            _ => None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn code_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(Some(s.as_str())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Classifies a failure raised by the transport before any response arrived.
pub fn classify_transport_error(err: TransportError) -> AegisError {
    match err {
        TransportError::Timeout { timeout } => AegisError::timeout(Some(timeout)),
        TransportError::Connection { message, code } => AegisError::connectivity(code, message),
        TransportError::InvalidResponse { message } => AegisError::connectivity(None, message),
    }
}

/// Classifies a response whose status indicates failure.
pub fn classify_response(response: &HttpResponse) -> AegisError {
    let body: ApiErrorBody = serde_json::from_slice(&response.body).unwrap_or_default();

    AegisError::Service {
        status: response.status,
        message: body
            .message()
            .unwrap_or_else(|| GENERIC_SERVICE_MESSAGE.to_string()),
        error_code: body.error_code(),
        details: body.details(),
    }
}
