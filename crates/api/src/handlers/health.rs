use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the entity store is reachable.
    pub store_healthy: bool,
    /// Whether CompanyCam sync is configured.
    pub companycam_configured: bool,
}

/// GET /health -- service and store health.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if store_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        store_healthy,
        companycam_configured: state.companycam.is_some(),
    })
}
