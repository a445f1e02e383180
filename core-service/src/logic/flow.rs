//! Interaction Flow - two-screen session and the assessment pipeline
//!
//! Luồng: Landing → (get_started) → Form → submit → RiskAssessment
//!
//! A `Session` is a plain value owned by whoever drives the interaction
//! (the web layer keeps one per cookie). The `Assessor` is shared: it holds
//! the record builder with its audit sink and the loaded model.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::audit::AuditSink;
use crate::logic::features::builder::{RawAnswers, RecordBuilder, ValidationError};
use crate::logic::model::inference::{ModelMetadata, PredictError, RiskModel};
use crate::logic::model::threshold::RiskAssessment;

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Landing,
    Form,
}

/// Per-user page state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    screen: Screen,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Landing → Form. No-op when already on the form.
    pub fn get_started(&mut self) -> Screen {
        self.screen = Screen::Form;
        self.screen
    }

    /// Form → Landing. No-op when already on the landing screen.
    pub fn back_to_landing(&mut self) -> Screen {
        self.screen = Screen::Landing;
        self.screen
    }

    /// Run the pipeline for answers submitted from the form
    pub fn submit(&self, assessor: &Assessor, raw: &RawAnswers) -> Result<RiskAssessment, AssessError> {
        if self.screen != Screen::Form {
            return Err(AssessError::WrongScreen(self.screen));
        }
        assessor.assess(raw)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("answers can only be submitted from the form screen (current: {0:?})")]
    WrongScreen(Screen),
}

impl AssessError {
    /// True when the respondent can fix the problem by changing an answer
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, AssessError::Validation(_))
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Pipeline counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub total_assessments: u64,
    pub validation_failures: u64,
    pub prediction_failures: u64,
    pub avg_inference_us: u64,
}

#[derive(Debug, Default)]
struct Counters {
    assessments: AtomicU64,
    validation_failures: AtomicU64,
    prediction_failures: AtomicU64,
    predictions: AtomicU64,
    inference_us: AtomicU64,
}

/// Build → predict → classify
pub struct Assessor {
    builder: RecordBuilder,
    model: Arc<dyn RiskModel>,
    counters: Counters,
}

impl Assessor {
    pub fn new(model: Arc<dyn RiskModel>, audit: Arc<dyn AuditSink>) -> Self {
        Self::with_builder(model, RecordBuilder::new(audit))
    }

    pub fn with_builder(model: Arc<dyn RiskModel>, builder: RecordBuilder) -> Self {
        Self {
            builder,
            model,
            counters: Counters::default(),
        }
    }

    pub fn model_metadata(&self) -> &ModelMetadata {
        self.model.metadata()
    }

    /// Validation errors return before the model is called
    pub fn assess(&self, raw: &RawAnswers) -> Result<RiskAssessment, AssessError> {
        self.counters.assessments.fetch_add(1, Ordering::Relaxed);

        let record = self.builder.build(raw).map_err(|e| {
            self.counters.validation_failures.fetch_add(1, Ordering::Relaxed);
            log::debug!("Rejected answers: {}", e);
            e
        })?;

        let start_time = Instant::now();
        let probability = self.model.predict(&record).map_err(|e| {
            self.counters.prediction_failures.fetch_add(1, Ordering::Relaxed);
            match &e {
                PredictError::SchemaMismatch(_) => log::error!("Schema mismatch: {}", e),
                _ => log::error!("Prediction failed: {}", e),
            }
            e
        })?;
        let elapsed = start_time.elapsed().as_micros() as u64;

        self.counters.predictions.fetch_add(1, Ordering::Relaxed);
        self.counters.inference_us.fetch_add(elapsed, Ordering::Relaxed);

        let assessment = RiskAssessment::from_probability(probability);
        log::debug!(
            "Assessment: p={:.4} tier={} ({}us)",
            assessment.probability,
            assessment.tier,
            elapsed
        );
        Ok(assessment)
    }

    pub fn stats(&self) -> PipelineStats {
        let predictions = self.counters.predictions.load(Ordering::Relaxed);
        let inference_us = self.counters.inference_us.load(Ordering::Relaxed);

        PipelineStats {
            total_assessments: self.counters.assessments.load(Ordering::Relaxed),
            validation_failures: self.counters.validation_failures.load(Ordering::Relaxed),
            prediction_failures: self.counters.prediction_failures.load(Ordering::Relaxed),
            avg_inference_us: if predictions > 0 { inference_us / predictions } else { 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::audit::NullAuditSink;
    use crate::logic::features::layout::{layout_hash, LayoutInfo};
    use crate::logic::features::record::FeatureRecord;
    use crate::logic::features::schema::{DietaryHabits, Profession, Status, SuicidalThoughts};
    use crate::logic::model::threshold::RiskTier;

    struct FixedModel {
        probability: f64,
        metadata: ModelMetadata,
    }

    impl FixedModel {
        fn new(probability: f64) -> Arc<Self> {
            Arc::new(Self {
                probability,
                metadata: ModelMetadata::new("fixed", "stub", &LayoutInfo::current()),
            })
        }
    }

    impl RiskModel for FixedModel {
        fn predict(&self, record: &FeatureRecord) -> Result<f64, PredictError> {
            record.validate_against(layout_hash())?;
            Ok(self.probability)
        }

        fn metadata(&self) -> &ModelMetadata {
            &self.metadata
        }
    }

    fn answers() -> RawAnswers {
        RawAnswers {
            age: 30,
            suicidal_thoughts: SuicidalThoughts::No,
            academic_work_pressure: 2,
            financial_stress: 2,
            academic_work_satisfaction: 4,
            status: Status::WorkingProfessional,
            cgpa_not_applicable: true,
            cgpa: 0.0,
            work_study_hours: 9,
            dietary_habits: DietaryHabits::Healthy,
            no_job: false,
            profession: Some(Profession::Architect),
            sleep_duration: 8,
        }
    }

    #[test]
    fn test_session_transitions() {
        let mut session = Session::new();
        assert_eq!(session.screen(), Screen::Landing);
        assert_eq!(session.get_started(), Screen::Form);
        assert_eq!(session.get_started(), Screen::Form);
        assert_eq!(session.back_to_landing(), Screen::Landing);
    }

    #[test]
    fn test_submit_requires_form() {
        let assessor = Assessor::new(FixedModel::new(0.5), Arc::new(NullAuditSink));
        let mut session = Session::new();

        let err = session.submit(&assessor, &answers()).unwrap_err();
        assert_eq!(err, AssessError::WrongScreen(Screen::Landing));
        assert!(!err.is_user_correctable());

        session.get_started();
        let assessment = session.submit(&assessor, &answers()).unwrap();
        assert_eq!(assessment.tier, RiskTier::Moderate);
    }

    #[test]
    fn test_stats() {
        let assessor = Assessor::new(FixedModel::new(0.9), Arc::new(NullAuditSink));
        assessor.assess(&answers()).unwrap();
        assessor.assess(&RawAnswers { age: 101, ..answers() }).unwrap_err();

        let stats = assessor.stats();
        assert_eq!(stats.total_assessments, 2);
        assert_eq!(stats.validation_failures, 1);
        assert_eq!(stats.prediction_failures, 0);
    }

    #[test]
    fn test_validation_is_user_correctable() {
        let assessor = Assessor::new(FixedModel::new(0.1), Arc::new(NullAuditSink));
        let err = assessor.assess(&RawAnswers { sleep_duration: 20, ..answers() }).unwrap_err();
        assert!(err.is_user_correctable());
        assert_eq!(err.to_string(), "Please enter a valid sleep duration between 0 and 12.");
    }
}
