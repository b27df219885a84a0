//! Request pipeline.
//!
//! Performs exactly one transport call per invocation: applies default
//! headers, notifies observers, and turns every failure into a classified
//! [`AegisError`]. Retry and circuit breaking happen above this layer.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AegisConfig, Endpoint};
use crate::errors::{classify_response, classify_transport_error, AegisError, AegisResult};
use crate::observability::{RequestInfo, RequestObserver, TracingObserver, REQUEST_ID_HEADER};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Error code attached when a 2xx body cannot be decoded.
pub const INVALID_RESPONSE_CODE: &str = "INVALID_RESPONSE";

/// Sends requests through the transport with headers and observers applied.
#[derive(Clone)]
pub struct RequestPipeline {
    transport: Arc<dyn HttpTransport>,
    default_headers: Vec<(String, String)>,
    observers: Vec<Arc<dyn RequestObserver>>,
}

impl RequestPipeline {
    /// Creates a pipeline with only the `Accept` header and a tracing observer.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            default_headers: vec![(
                ::http::header::ACCEPT.as_str().to_string(),
                mime::APPLICATION_JSON.to_string(),
            )],
            observers: vec![Arc::new(TracingObserver)],
        }
    }

    /// Creates a pipeline with the headers configured in `config`.
    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &AegisConfig) -> Self {
        let mut pipeline = Self::new(transport).with_header(
            ::http::header::USER_AGENT.as_str(),
            config.user_agent.clone(),
        );
        for (name, value) in &config.custom_headers {
            pipeline = pipeline.with_header(name.clone(), value.clone());
        }
        pipeline
    }

    /// Adds a header sent with every request. Later values for the same
    /// name replace earlier ones.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        self.default_headers.retain(|(existing, _)| *existing != name);
        self.default_headers.push((name, value.into()));
        self
    }

    /// Registers an additional observer.
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Replaces every registered observer.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn RequestObserver>>) -> Self {
        self.observers = observers;
        self
    }

    /// Headers applied to every request.
    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    /// Sends one request.
    ///
    /// Returns the response only for 2xx statuses; any other status and any
    /// transport failure comes back classified.
    pub async fn send(&self, endpoint: Endpoint, request: HttpRequest) -> AegisResult<HttpResponse> {
        let info = RequestInfo::new(endpoint, request.method, request.path.clone());
        let request = self.prepare(request, &info);

        for observer in &self.observers {
            observer.on_request(&info);
        }

        let start = Instant::now();
        let outcome = match self.transport.send(request).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(classify_response(&response)),
            Err(err) => Err(classify_transport_error(err)),
        };
        let elapsed = start.elapsed();

        match &outcome {
            Ok(response) => {
                for observer in &self.observers {
                    observer.on_response(&info, response.status, elapsed);
                }
            }
            Err(err) => {
                for observer in &self.observers {
                    observer.on_error(&info, err, elapsed);
                }
            }
        }

        outcome
    }

    /// Sends one request and decodes the 2xx body as JSON.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: HttpRequest,
    ) -> AegisResult<T> {
        let response = self.send(endpoint, request).await?;
        decode(&response)
    }

    fn prepare(&self, mut request: HttpRequest, info: &RequestInfo) -> HttpRequest {
        for (name, value) in &self.default_headers {
            if !has_header(&request, name) {
                request.headers.insert(name.clone(), value.clone());
            }
        }

        let content_type = ::http::header::CONTENT_TYPE.as_str();
        if request.body.is_some() && !has_header(&request, content_type) {
            request.headers.insert(
                content_type.to_string(),
                mime::APPLICATION_JSON.to_string(),
            );
        }

        request
            .headers
            .insert(REQUEST_ID_HEADER.to_string(), info.request_id.clone());
        request
    }
}

fn has_header(request: &HttpRequest, name: &str) -> bool {
    request.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
}

/// Decodes a successful response body.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> AegisResult<T> {
    response.json().map_err(|e| AegisError::Service {
        status: response.status,
        message: format!("Invalid response from service: {e}"),
        error_code: Some(INVALID_RESPONSE_CODE.to_string()),
        details: None,
    })
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("default_headers", &self.default_headers)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
