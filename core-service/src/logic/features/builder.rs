//! Record Builder - raw answers to a validated FeatureRecord
//!
//! Check order matters for the reported error: age first, then CGPA, then
//! the remaining ranges in layout order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::record::{FeatureRecord, RecordParts};
use super::schema::{
    self, Cgpa, DietaryHabits, IntRange, Profession, Status, SuicidalThoughts, CGPA_MAX, CGPA_MIN,
};
use crate::logic::audit::{AuditSink, NullAuditSink};

// ============================================================================
// RAW ANSWERS
// ============================================================================

/// Answers as entered by the respondent.
///
/// Enum answers come from constrained selectors, so their domain is
/// enforced by the type. The sentinel flags win over the values they
/// disable: `cgpa` is ignored when `cgpa_not_applicable` is set and
/// `profession` is ignored when `no_job` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RawAnswers {
    #[validate(custom(function = "age_in_range"))]
    pub age: i64,
    pub suicidal_thoughts: SuicidalThoughts,
    #[validate(custom(function = "pressure_in_range"))]
    pub academic_work_pressure: i64,
    #[validate(custom(function = "stress_in_range"))]
    pub financial_stress: i64,
    #[validate(custom(function = "satisfaction_in_range"))]
    pub academic_work_satisfaction: i64,
    pub status: Status,
    #[serde(default)]
    pub cgpa_not_applicable: bool,
    #[serde(default)]
    pub cgpa: f64,
    #[validate(custom(function = "hours_in_range"))]
    pub work_study_hours: i64,
    pub dietary_habits: DietaryHabits,
    #[serde(default)]
    pub no_job: bool,
    #[serde(default)]
    pub profession: Option<Profession>,
    #[validate(custom(function = "sleep_in_range"))]
    pub sleep_duration: i64,
}

// Bounds live in `schema::INT_RANGES`; these hooks only point validator at them.

fn within(range: &IntRange, value: i64) -> Result<(), validator::ValidationError> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("range"))
    }
}

fn age_in_range(value: i64) -> Result<(), validator::ValidationError> {
    within(&schema::AGE, value)
}

fn pressure_in_range(value: i64) -> Result<(), validator::ValidationError> {
    within(&schema::ACADEMIC_WORK_PRESSURE, value)
}

fn stress_in_range(value: i64) -> Result<(), validator::ValidationError> {
    within(&schema::FINANCIAL_STRESS, value)
}

fn satisfaction_in_range(value: i64) -> Result<(), validator::ValidationError> {
    within(&schema::ACADEMIC_WORK_SATISFACTION, value)
}

fn hours_in_range(value: i64) -> Result<(), validator::ValidationError> {
    within(&schema::WORK_STUDY_HOURS, value)
}

fn sleep_in_range(value: i64) -> Result<(), validator::ValidationError> {
    within(&schema::SLEEP_DURATION, value)
}

// ============================================================================
// ERRORS
// ============================================================================

/// User-correctable problem with the answers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid {label} between {min} and {max}.")]
    Range {
        field: &'static str,
        label: &'static str,
        min: String,
        max: String,
    },

    #[error("Please select your {label}.")]
    Missing {
        field: &'static str,
        label: &'static str,
    },
}

impl ValidationError {
    /// Range error for one of the integer answers
    pub fn out_of(range: &IntRange) -> Self {
        ValidationError::Range {
            field: range.field,
            label: range.label,
            min: range.min.to_string(),
            max: range.max.to_string(),
        }
    }

    pub fn cgpa() -> Self {
        ValidationError::Range {
            field: "cgpa",
            label: "CGPA",
            min: format!("{:.2}", CGPA_MIN),
            max: format!("{:.2}", CGPA_MAX),
        }
    }

    /// Name of the offending answer (`"age"`, `"cgpa"`, ...)
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Range { field, .. } | ValidationError::Missing { field, .. } => *field,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, ValidationError::Range { .. })
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Validates answers and emits every built record to the audit sink
pub struct RecordBuilder {
    audit: Arc<dyn AuditSink>,
}

impl RecordBuilder {
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self { audit }
    }

    pub fn without_audit() -> Self {
        Self::new(Arc::new(NullAuditSink))
    }

    /// Validate and encode. An audit failure is logged and never fails the build.
    pub fn build(&self, raw: &RawAnswers) -> Result<FeatureRecord, ValidationError> {
        let record = encode(raw)?;

        if let Err(e) = self.audit.append(&record) {
            log::warn!("Audit write failed, continuing: {}", e);
        }

        log::debug!("Built feature record: {}", record.to_log_entry());
        Ok(record)
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::without_audit()
    }
}

/// Pure validation + encoding, no side effects
pub fn encode(raw: &RawAnswers) -> Result<FeatureRecord, ValidationError> {
    let failed: Vec<String> = match raw.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors.field_errors().keys().map(|field| field.to_string()).collect(),
    };
    let out_of_range = |range: &IntRange| failed.iter().any(|field| field == range.field);

    if out_of_range(&schema::AGE) {
        return Err(ValidationError::out_of(&schema::AGE));
    }

    // Parsed value is checked before the sentinel/string form is produced
    let cgpa = match schema::resolve_cgpa(raw.cgpa_not_applicable, raw.cgpa) {
        None => None,
        Some(value) => Some(Cgpa::new(value).ok_or_else(ValidationError::cgpa)?),
    };

    if let Some(range) = schema::INT_RANGES.iter().find(|r| out_of_range(*r)) {
        return Err(ValidationError::out_of(range));
    }

    let profession = match schema::resolve_profession(raw.no_job, raw.profession) {
        Some(profession) => Some(profession),
        None if raw.no_job => None,
        None => {
            return Err(ValidationError::Missing {
                field: "profession",
                label: "profession",
            })
        }
    };

    Ok(FeatureRecord::assemble(RecordParts {
        age: narrow(&schema::AGE, raw.age)?,
        suicidal_thoughts: raw.suicidal_thoughts,
        academic_work_pressure: narrow(&schema::ACADEMIC_WORK_PRESSURE, raw.academic_work_pressure)?,
        financial_stress: narrow(&schema::FINANCIAL_STRESS, raw.financial_stress)?,
        academic_work_satisfaction: narrow(
            &schema::ACADEMIC_WORK_SATISFACTION,
            raw.academic_work_satisfaction,
        )?,
        status: raw.status,
        cgpa,
        work_study_hours: narrow(&schema::WORK_STUDY_HOURS, raw.work_study_hours)?,
        dietary_habits: raw.dietary_habits,
        profession,
        sleep_duration: narrow(&schema::SLEEP_DURATION, raw.sleep_duration)?,
    }))
}

/// Storage width only; bounds were already enforced by `validate`
fn narrow(range: &IntRange, value: i64) -> Result<u8, ValidationError> {
    u8::try_from(value).map_err(|_| ValidationError::out_of(range))
}
