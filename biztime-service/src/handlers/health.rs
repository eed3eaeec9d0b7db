use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::observability::render_http_metrics;

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.health.health_check().await {
        Ok(_) => {
            tracing::debug!("Health check passed");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ok",
                    "service": &*state.service_name,
                    "version": env!("CARGO_PKG_VERSION")
                })),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed - database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": &*state.service_name,
                    "error": e.to_string()
                })),
            )
        }
    }
}

/// Readiness check endpoint for K8s readiness probes.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.health.health_check().await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "not_ready" })),
            )
        }
    }
}

/// Metrics endpoint for Prometheus scraping: service metrics followed by the
/// HTTP request metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    let mut body = get_metrics();
    body.push_str(&render_http_metrics());
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        body,
    )
}
