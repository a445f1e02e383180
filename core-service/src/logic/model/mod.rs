//! Model Module - Risk inference
//!
//! Tách model ra khỏi feature pipeline: bất kỳ artifact nào implement
//! `RiskModel` đều dùng được, chọn backend theo extension khi load.

pub mod inference;
pub mod scorecard;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod threshold;

// Re-export common types
pub use inference::{load_model, ModelLoadError, ModelMetadata, PredictError, RiskModel};
pub use scorecard::ScorecardModel;
#[cfg(feature = "onnx")]
pub use onnx::OnnxRiskModel;
pub use threshold::{classify, RiskAssessment, RiskTier};
