//! MindCheck Core - depression risk questionnaire pipeline
//!
//! Answers → validated `FeatureRecord` (audited) → `RiskModel` → `RiskTier`.

pub mod constants;
pub mod logic;

pub use logic::audit::{AuditSink, CsvAuditLog, MemoryAuditSink, NullAuditSink};
pub use logic::features::{FeatureRecord, RawAnswers, RecordBuilder, ValidationError};
pub use logic::flow::{AssessError, Assessor, PipelineStats, Screen, Session};
pub use logic::model::{load_model, ModelLoadError, ModelMetadata, PredictError, RiskAssessment, RiskModel, RiskTier};
