//! Inference Engine - RiskModel seam and artifact loading
//!
//! The classifier itself is a black box: anything that turns a
//! `FeatureRecord` into the probability of the positive (depression-risk)
//! class. Artifacts are loaded once at startup and shared read-only.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::layout::{LayoutInfo, LayoutMismatchError};
use crate::logic::features::record::FeatureRecord;

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Artifact missing or unusable. Fatal at startup.
#[derive(Debug, Error)]
#[error("Failed to load model from {path}: {reason}")]
pub struct ModelLoadError {
    pub path: String,
    pub reason: String,
}

impl ModelLoadError {
    pub fn new(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }
}

/// Per-request prediction failure. None of these are user-correctable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// Record layout differs from what the artifact was trained on
    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] LayoutMismatchError),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model returned an invalid probability: {0}")]
    InvalidProbability(f64),
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String, // "scorecard" or "onnx"
    pub feature_count: usize,
    pub layout_hash: u32,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl ModelMetadata {
    pub fn new(model_path: impl AsRef<Path>, model_type: &str, layout: &LayoutInfo) -> Self {
        Self {
            model_path: model_path.as_ref().display().to_string(),
            model_type: model_type.to_string(),
            feature_count: layout.feature_count,
            layout_hash: layout.hash,
            loaded_at: chrono::Utc::now(),
        }
    }
}

// ============================================================================
// RISK MODEL TRAIT
// ============================================================================

/// Binary classifier over feature records.
///
/// `predict` is synchronous and may take hundreds of milliseconds; async
/// callers should run it on a blocking thread.
pub trait RiskModel: Send + Sync {
    /// Probability of the positive class, in [0, 1]
    fn predict(&self, record: &FeatureRecord) -> Result<f64, PredictError>;

    fn metadata(&self) -> &ModelMetadata;
}

/// Reject anything a well-formed classifier cannot return
pub fn checked_probability(value: f64) -> Result<f64, PredictError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(PredictError::InvalidProbability(value))
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Load a model artifact, picking the backend from the file extension.
///
/// - `.json`: logistic scorecard
/// - `.onnx`: ONNX Runtime session (requires the `onnx` feature)
pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn RiskModel>, ModelLoadError> {
    let path = path.as_ref();
    log::info!("Loading risk model from: {}", path.display());

    if !path.exists() {
        return Err(ModelLoadError::new(path, "model not found"));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let model: Arc<dyn RiskModel> = match extension.as_deref() {
        Some("json") => Arc::new(super::scorecard::ScorecardModel::load(path)?),
        #[cfg(feature = "onnx")]
        Some("onnx") => Arc::new(super::onnx::OnnxRiskModel::load(path)?),
        #[cfg(not(feature = "onnx"))]
        Some("onnx") => {
            return Err(ModelLoadError::new(
                path,
                "ONNX support not compiled in (enable the `onnx` feature)",
            ))
        }
        other => {
            return Err(ModelLoadError::new(
                path,
                format!("unsupported model format: {:?}", other.unwrap_or("")),
            ))
        }
    };

    let meta = model.metadata();
    if meta.layout_hash != crate::logic::features::layout::layout_hash() {
        // Not fatal here: every request against this model will fail with SchemaMismatch
        log::error!(
            "Model {} expects layout {:08x}, records use {:08x}",
            meta.model_path,
            meta.layout_hash,
            crate::logic::features::layout::layout_hash()
        );
    }

    log::info!("Risk model loaded successfully ({})", meta.model_type);
    Ok(model)
}
