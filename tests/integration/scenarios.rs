//! End-to-end retry and circuit breaker behavior.

use crate::support::{build_client, build_client_with_jitter, service_error, setup};
use aegis_client::mocks::fixtures;
use aegis_client::{
    AegisClient, AegisError, CircuitBreakerConfig, CircuitState, ErrorKind, ImpactRequest,
    RetryConfig,
};
use pretty_assertions::assert_eq;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

// Nothing listens on the discard port.
const UNREACHABLE: &str = "http://127.0.0.1:9";

#[test_case(0.0, [1000, 2000] ; "no jitter")]
#[test_case(1.0, [1250, 2500] ; "maximum jitter")]
#[test_case(-1.0, [750, 1500] ; "minimum jitter")]
#[tokio::test]
async fn test_connectivity_failures_exhaust_retries(sample: f64, expected_ms: [u64; 2]) {
    let t = build_client_with_jitter(UNREACHABLE, AegisClient::builder(), sample);

    let err = t.client.get_trajectory("Apophis").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert_eq!(t.metrics.snapshot().total_requests, 3);
    assert_eq!(
        t.sleeper.sleeps(),
        expected_ms.map(Duration::from_millis).to_vec()
    );
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("GET"))
        .and(path("/api/asteroid/%3F%3F"))
        .respond_with(service_error(400, "Invalid asteroid name"))
        .expect(1)
        .mount(&server)
        .await;

    let err = t.client.get_asteroid("??").await.unwrap_err();

    assert_eq!(err, AegisError::service(400, "Invalid asteroid name"));
    assert!(t.sleeper.sleeps().is_empty());
    assert_eq!(t.client.circuit_breaker_state().failure_count, 1);
}

#[tokio::test]
async fn test_transient_failure_then_success() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("GET"))
        .and(path("/api/trajectory/Apophis"))
        .respond_with(service_error(503, "Service temporarily unavailable"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trajectory/Apophis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::trajectory(1)))
        .expect(1)
        .mount(&server)
        .await;

    let data = t.client.get_trajectory("Apophis").await.unwrap();

    assert_eq!(data.len(), 1);
    assert_eq!(t.sleeper.sleeps().len(), 2);
    assert_eq!(t.client.circuit_breaker_state().failure_count, 0);
}

#[tokio::test]
async fn test_breaker_opens_and_rejects_without_request() {
    let (server, t) = setup(AegisClient::builder().retry(RetryConfig::no_retries())).await;

    Mock::given(method("GET"))
        .and(path("/api/trajectory/Apophis"))
        .respond_with(service_error(500, "Internal server error"))
        .expect(3)
        .mount(&server)
        .await;

    for _ in 0..3 {
        let err = t.client.get_trajectory("Apophis").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
    let state = t.client.circuit_breaker_state();
    assert_eq!(state.state, CircuitState::Open);
    assert_eq!(state.failure_count, 3);

    let err = t.client.get_trajectory("Apophis").await.unwrap_err();

    assert_eq!(
        err,
        AegisError::CircuitOpen {
            retry_after: Some(Duration::from_secs(30)),
        }
    );
    assert_eq!(t.metrics.snapshot().total_requests, 3);
}

#[tokio::test]
async fn test_breaker_recovers_after_reset_timeout() {
    let (server, t) = setup(AegisClient::builder().retry(RetryConfig::no_retries())).await;

    Mock::given(method("GET"))
        .and(path("/api/trajectory/Apophis"))
        .respond_with(service_error(500, "Internal server error"))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trajectory/Apophis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::trajectory(1)))
        .expect(1)
        .mount(&server)
        .await;

    for _ in 0..3 {
        let _ = t.client.get_trajectory("Apophis").await;
    }
    assert_eq!(t.client.circuit_breaker_state().state, CircuitState::Open);

    t.clock.advance(Duration::from_secs(30));
    t.client.get_trajectory("Apophis").await.unwrap();

    let state = t.client.circuit_breaker_state();
    assert_eq!(state.state, CircuitState::Closed);
    assert_eq!(state.failure_count, 0);
    assert_eq!(state.next_attempt_time, None);
}

#[tokio::test]
async fn test_failed_probe_reopens() {
    let (server, t) = setup(
        AegisClient::builder()
            .retry(RetryConfig::no_retries())
            .circuit_breaker_config(
                CircuitBreakerConfig::new()
                    .failure_threshold(1)
                    .reset_timeout(Duration::from_secs(10)),
            ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/asteroids"))
        .respond_with(service_error(502, "Bad gateway"))
        .expect(2)
        .mount(&server)
        .await;

    let _ = t.client.get_asteroids_list().await;
    t.clock.advance(Duration::from_secs(10));
    let probe = t.client.get_asteroids_list().await.unwrap_err();

    assert_eq!(probe.status(), Some(502));
    let state = t.client.circuit_breaker_state();
    assert_eq!(state.state, CircuitState::Open);
    assert_eq!(state.retry_after, Some(Duration::from_secs(10)));
}

#[tokio::test]
async fn test_impact_and_health_bypass_breaker() {
    let (server, t) = setup(AegisClient::builder().retry(RetryConfig::no_retries())).await;

    Mock::given(method("POST"))
        .and(path("/api/impact/calculate"))
        .respond_with(service_error(500, "Impact calculation failed"))
        .expect(5)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(service_error(503, "Starting up"))
        .expect(5)
        .mount(&server)
        .await;

    for _ in 0..5 {
        let impact = t
            .client
            .calculate_impact(&ImpactRequest::new(0.34, 7.42))
            .await
            .unwrap_err();
        let health = t.client.health_check().await.unwrap_err();
        assert_eq!(impact.kind(), ErrorKind::Service);
        assert_eq!(health.kind(), ErrorKind::Service);
    }

    let state = t.client.circuit_breaker_state();
    assert_eq!(state.state, CircuitState::Closed);
    assert_eq!(state.failure_count, 0);
}

#[tokio::test]
async fn test_one_breaker_failure_per_exhausted_call() {
    let t = build_client(UNREACHABLE, AegisClient::builder());

    let _ = t.client.get_top10_nearest().await;
    let _ = t.client.get_top10_nearest().await;

    assert_eq!(t.metrics.snapshot().total_requests, 6);
    let state = t.client.circuit_breaker_state();
    assert_eq!(state.state, CircuitState::Closed);
    assert_eq!(state.failure_count, 2);
}
