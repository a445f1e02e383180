//! HTML form body for the questionnaire
//!
//! Values arrive as strings. Checkboxes are only present when ticked.

use mindcheck_core::logic::features::schema::{self, Profession, UnknownCategory};
use mindcheck_core::{RawAnswers, ValidationError};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Please choose a valid option: {0}")]
    UnknownOption(#[from] UnknownCategory),
}

/// Submitted (or default) form values, echoed back into the page
#[derive(Debug, Clone, Deserialize)]
pub struct AssessForm {
    pub age: String,
    pub suicidal_thoughts: String,
    pub status: String,
    pub academic_work_pressure: String,
    pub financial_stress: String,
    pub academic_work_satisfaction: String,
    pub work_study_hours: String,
    pub no_cgpa: Option<String>,
    #[serde(default)]
    pub cgpa: String,
    pub no_job: Option<String>,
    #[serde(default)]
    pub profession: String,
    pub dietary_habits: String,
    pub sleep_duration: String,
}

impl Default for AssessForm {
    /// Widget minimums and first options
    fn default() -> Self {
        Self {
            age: schema::AGE.min.to_string(),
            suicidal_thoughts: "No".to_string(),
            status: "Student".to_string(),
            academic_work_pressure: schema::ACADEMIC_WORK_PRESSURE.min.to_string(),
            financial_stress: schema::FINANCIAL_STRESS.min.to_string(),
            academic_work_satisfaction: schema::ACADEMIC_WORK_SATISFACTION.min.to_string(),
            work_study_hours: schema::WORK_STUDY_HOURS.min.to_string(),
            no_cgpa: None,
            cgpa: "0.00".to_string(),
            no_job: None,
            profession: "Chef".to_string(),
            dietary_habits: "Healthy".to_string(),
            sleep_duration: schema::SLEEP_DURATION.min.to_string(),
        }
    }
}

fn checked(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("on") | Some("true") | Some("1"))
}

fn int_field(text: &str, range: &schema::IntRange) -> Result<i64, ValidationError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::out_of(range))
}

impl AssessForm {
    pub fn cgpa_not_applicable(&self) -> bool {
        checked(&self.no_cgpa)
    }

    pub fn no_job(&self) -> bool {
        checked(&self.no_job)
    }

    /// Parse into typed answers. Range checks are left to the record builder,
    /// except for text that is not a number at all.
    pub fn to_answers(&self) -> Result<RawAnswers, FormError> {
        let age = int_field(&self.age, &schema::AGE)?;

        let cgpa_not_applicable = self.cgpa_not_applicable();
        let cgpa = if cgpa_not_applicable {
            0.0
        } else {
            self.cgpa
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::cgpa())?
        };

        let no_job = self.no_job();
        let profession = if no_job || self.profession.trim().is_empty() {
            None
        } else {
            Some(self.profession.trim().parse::<Profession>()?)
        };

        Ok(RawAnswers {
            age,
            suicidal_thoughts: self.suicidal_thoughts.parse()?,
            academic_work_pressure: int_field(&self.academic_work_pressure, &schema::ACADEMIC_WORK_PRESSURE)?,
            financial_stress: int_field(&self.financial_stress, &schema::FINANCIAL_STRESS)?,
            academic_work_satisfaction: int_field(
                &self.academic_work_satisfaction,
                &schema::ACADEMIC_WORK_SATISFACTION,
            )?,
            status: self.status.parse()?,
            cgpa_not_applicable,
            cgpa,
            work_study_hours: int_field(&self.work_study_hours, &schema::WORK_STUDY_HOURS)?,
            dietary_habits: self.dietary_habits.parse()?,
            no_job,
            profession,
            sleep_duration: int_field(&self.sleep_duration, &schema::SLEEP_DURATION)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcheck_core::logic::features::schema::Status;

    #[test]
    fn test_default_form_parses() {
        let answers = AssessForm::default().to_answers().unwrap();
        assert_eq!(answers.age, 10);
        assert_eq!(answers.status, Status::Student);
        assert_eq!(answers.profession, Some(Profession::Chef));
        assert!(!answers.cgpa_not_applicable);
    }

    #[test]
    fn test_checkboxes() {
        let form = AssessForm {
            no_cgpa: Some("on".to_string()),
            cgpa: String::new(),
            no_job: Some("on".to_string()),
            ..AssessForm::default()
        };
        let answers = form.to_answers().unwrap();
        assert!(answers.cgpa_not_applicable);
        assert!(answers.no_job);
        assert_eq!(answers.profession, None);
    }

    #[test]
    fn test_non_numeric_age_reports_age_range() {
        let form = AssessForm {
            age: "twenty".to_string(),
            ..AssessForm::default()
        };
        match form.to_answers() {
            Err(FormError::Validation(e)) => assert_eq!(e.field(), "age"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_option() {
        let form = AssessForm {
            dietary_habits: "Keto".to_string(),
            ..AssessForm::default()
        };
        assert!(matches!(form.to_answers(), Err(FormError::UnknownOption(_))));
    }
}
