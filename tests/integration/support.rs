//! Shared helpers for the integration tests.

use aegis_client::mocks::{ManualClock, RecordingSleeper, SequenceJitter};
use aegis_client::observability::MetricsObserver;
use aegis_client::{AegisClient, AegisClientBuilder};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{MockServer, ResponseTemplate};

/// A client wired to test doubles, plus handles to inspect them.
pub struct TestClient {
    pub client: AegisClient,
    pub sleeper: Arc<RecordingSleeper>,
    pub clock: Arc<ManualClock>,
    pub metrics: Arc<MetricsObserver>,
}

/// Builds a client against `base_url` with recorded sleeps, no jitter and a
/// manual breaker clock.
pub fn build_client(base_url: &str, builder: AegisClientBuilder) -> TestClient {
    build_client_with_jitter(base_url, builder, 0.0)
}

/// Like [`build_client`], with every jitter sample fixed to `sample`.
pub fn build_client_with_jitter(
    base_url: &str,
    builder: AegisClientBuilder,
    sample: f64,
) -> TestClient {
    let sleeper = Arc::new(RecordingSleeper::new());
    let clock = Arc::new(ManualClock::new());
    let metrics = Arc::new(MetricsObserver::new());
    let client = builder
        .base_url(base_url)
        .sleeper(sleeper.clone())
        .jitter(Arc::new(SequenceJitter::constant(sample)))
        .clock(clock.clone())
        .observer(metrics.clone())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    TestClient {
        client,
        sleeper,
        clock,
        metrics,
    }
}

/// Starts a mock server and a client pointing at it.
pub async fn setup(builder: AegisClientBuilder) -> (MockServer, TestClient) {
    let server = MockServer::start().await;
    let client = build_client(&server.uri(), builder);
    (server, client)
}

/// Error response in the service's structured shape.
pub fn service_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": true,
        "status_code": status,
        "message": message,
    }))
}
