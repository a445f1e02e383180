//! JSON assessment API

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use mindcheck_core::{RawAnswers, RiskAssessment, RiskTier};
use serde::Serialize;

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct AssessResponse {
    pub probability: f64,
    pub percent: String,
    pub tier: RiskTier,
    pub message: &'static str,
}

impl From<RiskAssessment> for AssessResponse {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            probability: assessment.probability,
            percent: assessment.percent(),
            tier: assessment.tier,
            message: assessment.message(),
        }
    }
}

/// Stateless: no session, the answers are assessed directly
pub async fn assess(
    State(state): State<AppState>,
    payload: Result<Json<RawAnswers>, JsonRejection>,
) -> AppResult<Json<AssessResponse>> {
    let Json(raw) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let assessor = state.assessor.clone();
    let assessment = tokio::task::spawn_blocking(move || assessor.assess(&raw)).await??;

    tracing::info!(
        tier = %assessment.tier,
        probability = assessment.probability,
        "API assessment completed"
    );

    Ok(Json(assessment.into()))
}
