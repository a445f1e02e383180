//! Feature Record - the fixed-schema input of the classifier
//!
//! **Versioned record with layout validation**
//!
//! A record is only produced by [`RecordBuilder`](super::builder::RecordBuilder)
//! or by re-parsing an encoded row, so every instance satisfies the schema.
//! Fields are private: a record never changes after it is built.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::layout::{
    layout_hash, validate_hash, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT,
    FEATURE_VERSION, IDX_ACADEMIC_WORK_PRESSURE, IDX_ACADEMIC_WORK_SATISFACTION, IDX_AGE, IDX_CGPA,
    IDX_DIETARY_HABITS, IDX_FINANCIAL_STRESS, IDX_PROFESSION, IDX_SLEEP_DURATION, IDX_STATUS,
    IDX_SUICIDAL_THOUGHTS, IDX_WORK_STUDY_HOURS,
};
use super::schema::{
    self, Cgpa, DietaryHabits, IntRange, Profession, Status, SuicidalThoughts, CGPA_NOT_APPLICABLE,
    PROFESSION_COUNT, PROFESSION_MISSING,
};

// ============================================================================
// VALUES
// ============================================================================

/// One encoded column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Text(String),
}

impl FeatureValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FeatureValue::Int(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Int(_) => None,
            FeatureValue::Text(s) => Some(s),
        }
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{}", v),
            FeatureValue::Text(s) => f.write_str(s),
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRecord {
    /// Feature layout version
    version: u8,
    /// CRC32 hash of the column names (for mismatch detection)
    layout_hash: u32,

    age: u8,
    suicidal_thoughts: SuicidalThoughts,
    academic_work_pressure: u8,
    financial_stress: u8,
    academic_work_satisfaction: u8,
    status: Status,
    cgpa: Option<Cgpa>,
    work_study_hours: u8,
    dietary_habits: DietaryHabits,
    profession: Option<Profession>,
    sleep_duration: u8,
}

/// Validated answers, in layout order, handed to [`FeatureRecord::assemble`]
pub(crate) struct RecordParts {
    pub age: u8,
    pub suicidal_thoughts: SuicidalThoughts,
    pub academic_work_pressure: u8,
    pub financial_stress: u8,
    pub academic_work_satisfaction: u8,
    pub status: Status,
    pub cgpa: Option<Cgpa>,
    pub work_study_hours: u8,
    pub dietary_habits: DietaryHabits,
    pub profession: Option<Profession>,
    pub sleep_duration: u8,
}

impl FeatureRecord {
    pub(crate) fn assemble(parts: RecordParts) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            age: parts.age,
            suicidal_thoughts: parts.suicidal_thoughts,
            academic_work_pressure: parts.academic_work_pressure,
            financial_stress: parts.financial_stress,
            academic_work_satisfaction: parts.academic_work_satisfaction,
            status: parts.status,
            cgpa: parts.cgpa,
            work_study_hours: parts.work_study_hours,
            dietary_habits: parts.dietary_habits,
            profession: parts.profession,
            sleep_duration: parts.sleep_duration,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn suicidal_thoughts(&self) -> SuicidalThoughts {
        self.suicidal_thoughts
    }

    pub fn academic_work_pressure(&self) -> u8 {
        self.academic_work_pressure
    }

    pub fn financial_stress(&self) -> u8 {
        self.financial_stress
    }

    pub fn academic_work_satisfaction(&self) -> u8 {
        self.academic_work_satisfaction
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// `None` means not applicable (encoded as `NaN`)
    pub fn cgpa(&self) -> Option<Cgpa> {
        self.cgpa
    }

    pub fn work_study_hours(&self) -> u8 {
        self.work_study_hours
    }

    pub fn dietary_habits(&self) -> DietaryHabits {
        self.dietary_habits
    }

    /// `None` means no current job (encoded as `missing`)
    pub fn profession(&self) -> Option<Profession> {
        self.profession
    }

    pub fn sleep_duration(&self) -> u8 {
        self.sleep_duration
    }

    /// Column names for this record
    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// Check the record against the layout hash a model was trained on
    pub fn validate_against(&self, expected_hash: u32) -> Result<(), LayoutMismatchError> {
        validate_hash(expected_hash, self.layout_hash)
    }

    /// Typed values in layout order
    pub fn values(&self) -> [FeatureValue; FEATURE_COUNT] {
        [
            FeatureValue::Int(i64::from(self.age)),
            FeatureValue::Text(self.suicidal_thoughts.as_str().to_string()),
            FeatureValue::Int(i64::from(self.academic_work_pressure)),
            FeatureValue::Int(i64::from(self.financial_stress)),
            FeatureValue::Int(i64::from(self.academic_work_satisfaction)),
            FeatureValue::Text(self.status.as_str().to_string()),
            FeatureValue::Text(schema::encode_cgpa(self.cgpa)),
            FeatureValue::Int(i64::from(self.work_study_hours)),
            FeatureValue::Text(self.dietary_habits.as_str().to_string()),
            FeatureValue::Text(schema::encode_profession(self.profession).to_string()),
            FeatureValue::Int(i64::from(self.sleep_duration)),
        ]
    }

    /// Encoded values in layout order, one string per column
    pub fn to_row(&self) -> [String; FEATURE_COUNT] {
        self.values().map(|v| v.to_string())
    }

    /// `(column, value)` pairs, mostly for logging
    pub fn named_values(&self) -> Vec<(&'static str, FeatureValue)> {
        FEATURE_LAYOUT.iter().copied().zip(self.values()).collect()
    }

    /// Ordinal encoding for numeric-tensor models.
    ///
    /// Categories become their position in the training category list, the
    /// CGPA sentinel becomes `NaN` and the Profession sentinel takes the
    /// ordinal after the last known profession.
    pub fn to_model_input(&self) -> [f32; FEATURE_COUNT] {
        let mut input = [0.0f32; FEATURE_COUNT];
        input[IDX_AGE] = f32::from(self.age);
        input[IDX_SUICIDAL_THOUGHTS] = self.suicidal_thoughts.index() as f32;
        input[IDX_ACADEMIC_WORK_PRESSURE] = f32::from(self.academic_work_pressure);
        input[IDX_FINANCIAL_STRESS] = f32::from(self.financial_stress);
        input[IDX_ACADEMIC_WORK_SATISFACTION] = f32::from(self.academic_work_satisfaction);
        input[IDX_STATUS] = self.status.index() as f32;
        input[IDX_CGPA] = self.cgpa.map(|c| c.value() as f32).unwrap_or(f32::NAN);
        input[IDX_WORK_STUDY_HOURS] = f32::from(self.work_study_hours);
        input[IDX_DIETARY_HABITS] = self.dietary_habits.index() as f32;
        input[IDX_PROFESSION] = self
            .profession
            .map(|p| p.index())
            .unwrap_or(PROFESSION_COUNT) as f32;
        input[IDX_SLEEP_DURATION] = f32::from(self.sleep_duration);
        input
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": self.named_values()
                .into_iter()
                .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }

    /// Re-parse an encoded row (audit replay). Applies the schema checks.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, RowError> {
        if row.len() != FEATURE_COUNT {
            return Err(RowError::ColumnCount {
                expected: FEATURE_COUNT,
                actual: row.len(),
            });
        }
        let cell = move |idx: usize| row[idx].as_ref().trim();

        let cgpa = match cell(IDX_CGPA) {
            CGPA_NOT_APPLICABLE => None,
            text => Some(Cgpa::parse(text).ok_or_else(|| RowError::invalid(IDX_CGPA, text))?),
        };
        let profession = match cell(IDX_PROFESSION) {
            PROFESSION_MISSING => None,
            text => Some(
                text.parse::<Profession>()
                    .map_err(|_| RowError::invalid(IDX_PROFESSION, text))?,
            ),
        };

        Ok(Self::assemble(RecordParts {
            age: parse_int(cell(IDX_AGE), IDX_AGE, &schema::AGE)?,
            suicidal_thoughts: parse_category(cell(IDX_SUICIDAL_THOUGHTS), IDX_SUICIDAL_THOUGHTS)?,
            academic_work_pressure: parse_int(
                cell(IDX_ACADEMIC_WORK_PRESSURE),
                IDX_ACADEMIC_WORK_PRESSURE,
                &schema::ACADEMIC_WORK_PRESSURE,
            )?,
            financial_stress: parse_int(
                cell(IDX_FINANCIAL_STRESS),
                IDX_FINANCIAL_STRESS,
                &schema::FINANCIAL_STRESS,
            )?,
            academic_work_satisfaction: parse_int(
                cell(IDX_ACADEMIC_WORK_SATISFACTION),
                IDX_ACADEMIC_WORK_SATISFACTION,
                &schema::ACADEMIC_WORK_SATISFACTION,
            )?,
            status: parse_category(cell(IDX_STATUS), IDX_STATUS)?,
            cgpa,
            work_study_hours: parse_int(
                cell(IDX_WORK_STUDY_HOURS),
                IDX_WORK_STUDY_HOURS,
                &schema::WORK_STUDY_HOURS,
            )?,
            dietary_habits: parse_category(cell(IDX_DIETARY_HABITS), IDX_DIETARY_HABITS)?,
            profession,
            sleep_duration: parse_int(
                cell(IDX_SLEEP_DURATION),
                IDX_SLEEP_DURATION,
                &schema::SLEEP_DURATION,
            )?,
        }))
    }
}

// ============================================================================
// ROW PARSING
// ============================================================================

/// An encoded row that does not satisfy the schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected {expected} columns, got {actual}")]
    ColumnCount { expected: usize, actual: usize },

    #[error("invalid value {value:?} in column {column:?}")]
    InvalidValue { column: &'static str, value: String },
}

impl RowError {
    fn invalid(index: usize, value: &str) -> Self {
        RowError::InvalidValue {
            column: FEATURE_LAYOUT[index],
            value: value.to_string(),
        }
    }
}

fn parse_int(text: &str, index: usize, range: &IntRange) -> Result<u8, RowError> {
    text.parse::<i64>()
        .ok()
        .filter(|v| range.contains(*v))
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| RowError::invalid(index, text))
}

fn parse_category<T: std::str::FromStr>(text: &str, index: usize) -> Result<T, RowError> {
    text.parse::<T>().map_err(|_| RowError::invalid(index, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(cgpa: Option<Cgpa>, profession: Option<Profession>) -> FeatureRecord {
        FeatureRecord::assemble(RecordParts {
            age: 25,
            suicidal_thoughts: SuicidalThoughts::No,
            academic_work_pressure: 3,
            financial_stress: 3,
            academic_work_satisfaction: 3,
            status: Status::Student,
            cgpa,
            work_study_hours: 6,
            dietary_habits: DietaryHabits::Healthy,
            profession,
            sleep_duration: 7,
        })
    }

    #[test]
    fn test_row_order_and_encoding() {
        let record = sample(Cgpa::new(6.8), Some(Profession::Teacher));
        let row = record.to_row();

        assert_eq!(row.len(), FEATURE_COUNT);
        assert_eq!(
            row,
            ["25", "No", "3", "3", "3", "Student", "6.80", "6", "Healthy", "Teacher", "7"]
                .map(String::from)
        );
    }

    #[test]
    fn test_sentinels_in_row() {
        let record = sample(None, None);
        let row = record.to_row();
        assert_eq!(row[IDX_CGPA], "NaN");
        assert_eq!(row[IDX_PROFESSION], "missing");
    }

    #[test]
    fn test_from_row_round_trip() {
        let record = sample(Cgpa::new(9.99), Some(Profession::UxUiDesigner));
        let parsed = FeatureRecord::from_row(&record.to_row()).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.cgpa().map(|c| c.hundredths()), Some(999));

        let sentinel = sample(None, None);
        assert_eq!(FeatureRecord::from_row(&sentinel.to_row()).unwrap(), sentinel);
    }

    #[test]
    fn test_from_row_rejects_bad_rows() {
        let mut row = sample(None, None).to_row().to_vec();
        row[IDX_AGE] = "5".to_string();
        assert!(matches!(
            FeatureRecord::from_row(&row),
            Err(RowError::InvalidValue { column: "Age", .. })
        ));

        assert!(matches!(
            FeatureRecord::from_row(&row[..3]),
            Err(RowError::ColumnCount { expected: 11, actual: 3 })
        ));

        let mut row = sample(None, None).to_row().to_vec();
        row[IDX_PROFESSION] = "Astronaut".to_string();
        assert!(FeatureRecord::from_row(&row).is_err());
    }

    #[test]
    fn test_model_input_encoding() {
        let input = sample(None, None).to_model_input();
        assert_eq!(input[IDX_AGE], 25.0);
        assert_eq!(input[IDX_STATUS], 0.0);
        assert!(input[IDX_CGPA].is_nan());
        assert_eq!(input[IDX_PROFESSION], PROFESSION_COUNT as f32);

        let input = sample(Cgpa::new(7.5), Some(Profession::Teacher)).to_model_input();
        assert_eq!(input[IDX_CGPA], 7.5);
        assert_eq!(input[IDX_PROFESSION], 1.0);
    }

    #[test]
    fn test_layout_validation() {
        let record = sample(None, None);
        assert_eq!(record.version(), FEATURE_VERSION);
        assert!(record.validate_against(layout_hash()).is_ok());
        assert!(record.validate_against(layout_hash() ^ 1).is_err());
    }

    #[test]
    fn test_log_entry_names() {
        let entry = sample(Cgpa::new(6.8), None).to_log_entry();
        assert_eq!(entry["named_values"]["CGPA"], "6.80");
        assert_eq!(entry["named_values"]["Profession"], "missing");
        assert_eq!(entry["named_values"]["Age"], 25);
    }
}
