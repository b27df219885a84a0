//! Status and body classification as seen through the client.

use crate::support::setup;
use aegis_client::{AegisClient, AegisError, ImpactRequest, RetryConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[test_case(408, 3 ; "request timeout")]
#[test_case(429, 3 ; "rate limited")]
#[test_case(500, 3 ; "internal error")]
#[test_case(502, 3 ; "bad gateway")]
#[test_case(503, 3 ; "unavailable")]
#[test_case(504, 3 ; "gateway timeout")]
#[test_case(400, 1 ; "bad request")]
#[test_case(404, 1 ; "not found")]
#[test_case(422, 1 ; "unprocessable")]
#[tokio::test]
async fn test_attempts_per_status(status: u16, attempts: u64) {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("POST"))
        .and(path("/api/impact/calculate"))
        .respond_with(ResponseTemplate::new(status))
        .expect(attempts)
        .mount(&server)
        .await;

    let err = t
        .client
        .calculate_impact(&ImpactRequest::new(0.34, 7.42))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(status));
}

#[test_case(
    json!({"error": true, "status_code": 500, "message": "NASA API error"}),
    "NASA API error" ;
    "structured body"
)]
#[test_case(
    json!({"detail": "Error fetching asteroid data"}),
    "Error fetching asteroid data" ;
    "detail string"
)]
#[test_case(
    json!({"detail": {"message": "Upstream timeout", "error_code": "NASA_API_ERROR"}}),
    "Upstream timeout" ;
    "nested detail"
)]
#[test_case(
    json!({"detail": [{"loc": ["body", "diameter_km"], "msg": "field required"}]}),
    "An unexpected error occurred" ;
    "validation list"
)]
#[test_case(json!("plain string"), "An unexpected error occurred" ; "unexpected shape")]
#[tokio::test]
async fn test_error_body_message(body: Value, expected: &str) {
    let (server, t) = setup(AegisClient::builder().retry(RetryConfig::no_retries())).await;

    Mock::given(method("GET"))
        .and(path("/api/asteroid/Apophis"))
        .respond_with(ResponseTemplate::new(500).set_body_json(body))
        .mount(&server)
        .await;

    let err = t.client.get_asteroid("Apophis").await.unwrap_err();

    match err {
        AegisError::Service { status, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(message, expected);
        }
        other => panic!("Expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_input_never_reaches_server() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = t
        .client
        .calculate_impact(&ImpactRequest::new(-1.0, 7.42))
        .await
        .unwrap_err();

    assert!(matches!(err, AegisError::Validation { .. }));
    assert!(t.client.get_trajectory("   ").await.is_err());
    assert_eq!(t.metrics.snapshot().total_requests, 0);
}
