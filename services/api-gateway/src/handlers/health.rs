use axum::{extract::State, response::Json};
use serde_json::{json, Map, Value};
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::warn;

use crate::{AppState, ServiceEndpoint, SERVICE_NAME};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Polls every downstream `/health`. Overall status is `degraded` when any
/// service is unreachable or reports a non-success status.
pub async fn detailed_health_check(State(state): State<AppState>) -> Json<Value> {
    let mut pending = JoinSet::new();
    for service in state.services.iter().cloned() {
        let client = state.client.clone();
        pending.spawn(async move {
            let check = check_service(&client, &service).await;
            (service.name, check)
        });
    }

    let mut checks = Map::new();
    while let Some(joined) = pending.join_next().await {
        match joined {
            Ok((name, check)) => {
                checks.insert(name.to_string(), check);
            }
            Err(e) => warn!(error = %e, "Health check task failed"),
        }
    }

    let all_healthy = checks.len() == state.services.len()
        && checks.values().all(|check| check["status"] == "healthy");

    Json(json!({
        "status": if all_healthy { "healthy" } else { "degraded" },
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": checks
    }))
}

async fn check_service(client: &reqwest::Client, service: &ServiceEndpoint) -> Value {
    let url = format!("{}/health", service.url.trim_end_matches('/'));
    let started = Instant::now();

    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => json!({
            "status": "healthy",
            "url": service.url,
            "latency_ms": started.elapsed().as_millis() as u64,
        }),
        Ok(response) => {
            warn!(service = service.name, status = response.status().as_u16(), "Service unhealthy");
            json!({
                "status": "unhealthy",
                "url": service.url,
                "message": format!("HTTP {}", response.status().as_u16()),
            })
        }
        Err(e) => {
            warn!(service = service.name, error = %e, "Service unreachable");
            json!({
                "status": "unhealthy",
                "url": service.url,
                "message": e.to_string(),
            })
        }
    }
}
