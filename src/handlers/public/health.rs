// handlers/public/health.rs - GET /api/health handler

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: &'static str,
}

/// Liveness probe; always 200 so load balancers keep routing while the database recovers
pub async fn health_get(State(state): State<AppState>) -> ApiResult<HealthPayload> {
    let database = match state.store.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Health check: database unavailable: {}", e);
            "unavailable"
        }
    };

    Ok(ApiResponse::success(HealthPayload {
        status: "OK",
        timestamp: Utc::now(),
        database,
    }))
}
