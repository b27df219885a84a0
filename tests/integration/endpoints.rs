//! Facade methods against a mock service.

use crate::support::setup;
use aegis_client::mocks::fixtures;
use aegis_client::{
    AegisClient, AegisError, DeflectionRequest, ErrorKind, ImpactRequest, RetryConfig,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_trajectory() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("GET"))
        .and(path("/api/trajectory/2004%20MN4"))
        .and(header("accept", "application/json"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "asteroid_path": [[0.9, 0.1, 0.0], [0.8, 0.4, 0.01]],
            "earth_path": [[1.0, 0.0, 0.0], [0.95, 0.3, 0.0]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data = t.client.get_trajectory("2004 MN4").await.unwrap();

    assert_eq!(data.asteroid_path[1], [0.8, 0.4, 0.01]);
    assert_eq!(data.earth_path.len(), 2);
}

#[tokio::test]
async fn test_get_asteroid() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("GET"))
        .and(path("/api/asteroid/Bennu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": {"fullname": "101955 Bennu (1999 RQ36)", "pha": true},
            "orbit": {"elements": [{"name": "a", "value": "1.126"}]},
            "phys_par": [{"name": "diameter", "value": "0.492"}]
        })))
        .mount(&server)
        .await;

    let asteroid = t.client.get_asteroid("Bennu").await.unwrap();

    assert_eq!(asteroid.object.fullname, "101955 Bennu (1999 RQ36)");
    assert_eq!(asteroid.element("a"), Some(1.126));
    assert_eq!(asteroid.diameter_km(), Some(0.492));
}

#[tokio::test]
async fn test_calculate_impact() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("POST"))
        .and(path("/api/impact/calculate"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "diameter_km": 0.34,
            "velocity_kps": 7.42,
            "asteroid_density_kg_m3": 3200.0,
            "target_density_kg_m3": 2500.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::impact_result()))
        .expect(1)
        .mount(&server)
        .await;

    let result = t
        .client
        .calculate_impact(&ImpactRequest::new(0.34, 7.42).asteroid_density(3200.0))
        .await
        .unwrap();

    assert_eq!(result.crater_diameter_meters, 5142.87);
    assert_eq!(result.mass_kg, 2.7e10);
}

#[tokio::test]
async fn test_calculate_deflection() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("POST"))
        .and(path("/api/deflection/calculate"))
        .and(body_json(json!({
            "asteroid_name": "Apophis",
            "delta_v_mps": 0.05,
            "days_from_epoch": 30.0,
            "num_points": 100
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(fixtures::deflection_result("Apophis")),
        )
        .mount(&server)
        .await;

    let result = t
        .client
        .calculate_deflection(&DeflectionRequest::new("Apophis", 0.05, 30.0).num_points(100))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.deflected_path.len(), 1);
    assert_eq!(result.deflected_elements.raan, 204.0);
}

#[tokio::test]
async fn test_catalog_listings() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("GET"))
        .and(path("/api/asteroids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Apophis", "diameter_km": 0.34},
            {"name": "Bennu", "diameter_km": 0.492},
            {"name": "Eros", "diameter_km": 16.84}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/asteroids/top10-nearest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::top10_nearest()))
        .mount(&server)
        .await;

    let list = t.client.get_asteroids_list().await.unwrap();
    let nearest = t.client.get_top10_nearest().await.unwrap();

    assert_eq!(
        list.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
        vec!["Apophis", "Bennu", "Eros"]
    );
    assert_eq!(nearest[0].miss_distance_km, Some(38017.0));
}

#[tokio::test]
async fn test_health_check() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::health()))
        .mount(&server)
        .await;

    let health = t.client.health_check().await.unwrap();

    assert!(health.is_healthy());
    assert!(health.nasa_api_configured);
}

#[tokio::test]
async fn test_custom_headers_sent() {
    let (server, t) = setup(
        AegisClient::builder()
            .header("X-Client-Session", "abc123")
            .user_agent("aegis-tests/1.0"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .and(header("x-client-session", "abc123"))
        .and(header("user-agent", "aegis-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .expect(1)
        .mount(&server)
        .await;

    t.client.health_check().await.unwrap();
}

#[tokio::test]
async fn test_not_found_is_service_error() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("GET"))
        .and(path("/api/asteroid/Nibiru"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "Asteroid 'Nibiru' not found in NASA database"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = t.client.get_asteroid("Nibiru").await.unwrap_err();

    assert_eq!(
        err,
        AegisError::Service {
            status: 404,
            message: "Asteroid 'Nibiru' not found in NASA database".to_string(),
            error_code: None,
            details: None,
        }
    );
}

#[tokio::test]
async fn test_non_json_error_body_uses_generic_message() {
    let (server, t) = setup(AegisClient::builder().retry(RetryConfig::no_retries())).await;

    Mock::given(method("GET"))
        .and(path("/api/asteroids"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = t.client.get_asteroids_list().await.unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(
        err.to_string(),
        "Service error (HTTP 502): An unexpected error occurred"
    );
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("GET"))
        .and(path("/api/trajectory/Eros"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .expect(1)
        .mount(&server)
        .await;

    let err = t.client.get_trajectory("Eros").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(err.error_code(), Some("INVALID_RESPONSE"));
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;
    let client = AegisClient::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(200))
        .retry(RetryConfig::no_retries())
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.health_check().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.is_transient(&RetryConfig::default()));
}

#[tokio::test]
async fn test_structured_error_fields() {
    let (server, t) = setup(AegisClient::builder()).await;

    Mock::given(method("POST"))
        .and(path("/api/impact/calculate"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": true,
            "status_code": 422,
            "message": "Impact calculation failed: Velocity too high",
            "error_code": "CALCULATION_ERROR",
            "details": {"field": "velocity_kps"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = t
        .client
        .calculate_impact(&ImpactRequest::new(1.0, 99.0))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), Some("CALCULATION_ERROR"));
    match err {
        AegisError::Service { details, .. } => {
            assert_eq!(details, Some(json!({"field": "velocity_kps"})));
        }
        other => panic!("Expected service error, got {other:?}"),
    }
}
