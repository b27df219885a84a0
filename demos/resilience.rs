//! Calls every endpoint of a running Aegis service and reports the breaker
//! state after each call.
//!
//! ```sh
//! AEGIS_API_URL=http://localhost:8000 cargo run --example resilience
//! ```

use aegis_client::observability::{init_tracing, LogFormat};
use aegis_client::{AegisClient, AegisError, DeflectionRequest, ImpactRequest, RetryConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(LogFormat::Pretty)?;

    let client = AegisClient::from_env()?;
    let retry = RetryConfig::default();

    match client.health_check().await {
        Ok(health) => println!(
            "health: {} (catalog credentials: {})",
            health.status, health.nasa_api_configured
        ),
        Err(err) => println!("health: {}", err.user_message(&retry)),
    }

    report(
        "trajectory",
        client.get_trajectory("Apophis").await.map(|t| {
            format!(
                "{} samples, closest approach {:?} au",
                t.len(),
                t.closest_approach_au()
            )
        }),
        &client,
        &retry,
    );

    report(
        "asteroid",
        client
            .get_asteroid("Apophis")
            .await
            .map(|a| format!("{}, diameter {:?} km", a.object.fullname, a.diameter_km())),
        &client,
        &retry,
    );

    report(
        "impact",
        client
            .calculate_impact(&ImpactRequest::new(0.34, 7.42))
            .await
            .map(|r| {
                format!(
                    "crater {:.2} km, {:.1} Mt",
                    r.crater_diameter_km, r.impact_energy_megatons
                )
            }),
        &client,
        &retry,
    );

    report(
        "deflection",
        client
            .calculate_deflection(&DeflectionRequest::new("Apophis", 0.05, 30.0))
            .await
            .map(|r| format!("semi-major axis shift {:+.6} au", r.semi_major_axis_shift())),
        &client,
        &retry,
    );

    report(
        "asteroids",
        client
            .get_asteroids_list()
            .await
            .map(|list| format!("{} entries", list.len())),
        &client,
        &retry,
    );

    report(
        "top10-nearest",
        client
            .get_top10_nearest()
            .await
            .map(|list| format!("{} approaches", list.len())),
        &client,
        &retry,
    );

    Ok(())
}

fn report(
    label: &str,
    outcome: Result<String, AegisError>,
    client: &AegisClient,
    retry: &RetryConfig,
) {
    match outcome {
        Ok(summary) => println!("{label}: {summary}"),
        Err(err) => println!("{label}: [{}] {}", err.kind(), err.user_message(retry)),
    }

    let breaker = client.circuit_breaker_state();
    println!(
        "  breaker: {} ({}/{} failures, retry after {:?})",
        breaker.state.as_str(),
        breaker.failure_count,
        breaker.failure_threshold,
        breaker.retry_after
    );
}
