//! Health check handler

use axum::{extract::State, Json};
use mindcheck_core::{ModelMetadata, PipelineStats};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model: ModelMetadata,
    stats: PipelineStats,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model: state.assessor.model_metadata().clone(),
        stats: state.assessor.stats(),
    })
}
