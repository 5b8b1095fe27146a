use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use std::time::Instant;
use utoipa::ToSchema;

use crate::api::middleware::error_handling::SafeResponsePayload;
use crate::api::router::AppState;
use crate::domain::CaughtError;

/// Basic health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

/// Database readiness response
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub database: String,
    pub response_time_ms: u128,
}

/// GET /health
/// Basic health check endpoint (no database check)
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

/// GET /health/ready
/// Readiness probe. Database failures are raised and answered by the error
/// handling layer.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Database unreachable", body = SafeResponsePayload),
        (status = 504, description = "Database timed out", body = SafeResponsePayload)
    )
)]
pub async fn readiness_handler(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, CaughtError> {
    let start_time = Instant::now();

    sqlx::query("SELECT 1 as health_check")
        .execute(&state.pool)
        .await?;

    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        database: "connected".to_string(),
        response_time_ms: start_time.elapsed().as_millis(),
    }))
}
