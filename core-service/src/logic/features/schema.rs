//! Feature Schema - Legal values, sentinels and encoders
//!
//! Pure definitions: no I/O, no state. The category lists mirror the
//! training data of the classifier and must not be reordered (ordinal
//! encoding uses the position).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// SENTINELS
// ============================================================================

/// Encoded CGPA when the respondent declares it not applicable
pub const CGPA_NOT_APPLICABLE: &str = "NaN";

/// Encoded Profession when the respondent is not currently employed
pub const PROFESSION_MISSING: &str = "missing";

// ============================================================================
// CATEGORIES
// ============================================================================

/// Unknown category value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownCategory {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! category {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// All values in training order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Exact string the model was trained on
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Ordinal position in `ALL`
            pub fn index(&self) -> usize {
                *self as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCategory;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownCategory {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

category! {
    /// "Have you ever had suicidal thoughts ?"
    SuicidalThoughts, "suicidal thoughts" {
        No => "No",
        Yes => "Yes",
    }
}

category! {
    /// "Working Professional or Student"
    Status, "status" {
        Student => "Student",
        WorkingProfessional => "Working Professional",
    }
}

category! {
    DietaryHabits, "dietary habits" {
        Healthy => "Healthy",
        Moderate => "Moderate",
        Unhealthy => "Unhealthy",
    }
}

category! {
    /// Known professions. The `missing` sentinel is not a variant; an absent
    /// profession is `None` at the record level.
    Profession, "profession" {
        Chef => "Chef",
        Teacher => "Teacher",
        BusinessAnalyst => "Business Analyst",
        FinancialAnalyst => "Financial Analyst",
        Chemist => "Chemist",
        Electrician => "Electrician",
        SoftwareEngineer => "Software Engineer",
        DataScientist => "Data Scientist",
        Plumber => "Plumber",
        MarketingManager => "Marketing Manager",
        Accountant => "Accountant",
        Entrepreneur => "Entrepreneur",
        HrManager => "HR Manager",
        UxUiDesigner => "UX/UI Designer",
        ContentWriter => "Content Writer",
        EducationalConsultant => "Educational Consultant",
        CivilEngineer => "Civil Engineer",
        Manager => "Manager",
        Pharmacist => "Pharmacist",
        Architect => "Architect",
        MechanicalEngineer => "Mechanical Engineer",
        CustomerSupport => "Customer Support",
        Consultant => "Consultant",
        Judge => "Judge",
        Researcher => "Researcher",
        Pilot => "Pilot",
        GraphicDesigner => "Graphic Designer",
        TravelConsultant => "Travel Consultant",
        DigitalMarketer => "Digital Marketer",
        Lawyer => "Lawyer",
        ResearchAnalyst => "Research Analyst",
        SalesExecutive => "Sales Executive",
        Doctor => "Doctor",
        InvestmentBanker => "Investment Banker",
    }
}

/// Number of known professions (the sentinel takes the next ordinal)
pub const PROFESSION_COUNT: usize = 34;

/// Category lists per text column, built once
static CATEGORY_LEVELS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut levels = HashMap::new();
    levels.insert(
        "Have you ever had suicidal thoughts ?",
        SuicidalThoughts::ALL.iter().map(|v| v.as_str()).collect(),
    );
    levels.insert(
        "Working Professional or Student",
        Status::ALL.iter().map(|v| v.as_str()).collect(),
    );
    levels.insert(
        "Dietary Habits",
        DietaryHabits::ALL.iter().map(|v| v.as_str()).collect(),
    );

    let mut professions: Vec<&'static str> = Profession::ALL.iter().map(|v| v.as_str()).collect();
    professions.push(PROFESSION_MISSING);
    levels.insert("Profession", professions);
    levels
});

/// Legal text values for a categorical column (Profession includes the sentinel)
pub fn category_levels(column: &str) -> Option<&'static [&'static str]> {
    CATEGORY_LEVELS.get(column).map(|v| v.as_slice())
}

/// Ordinal of `value` within a categorical column
pub fn category_index(column: &str, value: &str) -> Option<usize> {
    category_levels(column).and_then(|levels| levels.iter().position(|&l| l == value))
}

// ============================================================================
// INTEGER RANGES
// ============================================================================

/// Inclusive integer domain of one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    /// Field name reported in validation errors
    pub field: &'static str,
    /// Human label used in messages
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub const AGE: IntRange = IntRange { field: "age", label: "age", min: 10, max: 100 };
pub const ACADEMIC_WORK_PRESSURE: IntRange = IntRange {
    field: "academic_work_pressure",
    label: "academic/work pressure rating",
    min: 1,
    max: 5,
};
pub const FINANCIAL_STRESS: IntRange = IntRange {
    field: "financial_stress",
    label: "financial stress rating",
    min: 1,
    max: 5,
};
pub const ACADEMIC_WORK_SATISFACTION: IntRange = IntRange {
    field: "academic_work_satisfaction",
    label: "academic/work satisfaction rating",
    min: 1,
    max: 5,
};
pub const WORK_STUDY_HOURS: IntRange = IntRange {
    field: "work_study_hours",
    label: "number of work/study hours",
    min: 0,
    max: 18,
};
pub const SLEEP_DURATION: IntRange = IntRange {
    field: "sleep_duration",
    label: "sleep duration",
    min: 0,
    max: 12,
};

/// Integer answers in layout order
pub static INT_RANGES: [IntRange; 6] = [
    AGE,
    ACADEMIC_WORK_PRESSURE,
    FINANCIAL_STRESS,
    ACADEMIC_WORK_SATISFACTION,
    WORK_STUDY_HOURS,
    SLEEP_DURATION,
];

pub fn int_range(field: &str) -> Option<&'static IntRange> {
    INT_RANGES.iter().find(|r| r.field == field)
}

// ============================================================================
// CGPA
// ============================================================================

pub const CGPA_MIN: f64 = 0.0;
pub const CGPA_MAX: f64 = 10.0;

/// Validation predicate on the parsed numeric value. Non-finite values fail.
pub fn is_valid_cgpa(value: f64) -> bool {
    (CGPA_MIN..=CGPA_MAX).contains(&value)
}

/// A validated CGPA stored as hundredths, so the two-decimal form is exact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cgpa(u16);

impl Cgpa {
    /// `None` when the value is outside [0.00, 10.00] or not finite.
    ///
    /// Hundredths come from the `{:.2}` rendering of the exact binary
    /// value, so 2.675 (stored just below) encodes as "2.67".
    pub fn new(value: f64) -> Option<Self> {
        if !is_valid_cgpa(value) {
            return None;
        }
        // `+ 0.0` turns -0.0 into 0.0, which would otherwise render "-0.00"
        Self::parse(&format!("{:.2}", value + 0.0))
    }

    pub fn hundredths(&self) -> u16 {
        self.0
    }

    pub fn value(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Parse the encoded `d.dd` form
    pub fn parse(text: &str) -> Option<Self> {
        let (whole, frac) = text.split_once('.')?;
        if frac.len() != 2 || whole.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let whole: u16 = whole.parse().ok()?;
        let frac: u16 = frac.parse().ok()?;
        let hundredths = whole.checked_mul(100)?.checked_add(frac)?;
        (hundredths <= 1000).then_some(Self(hundredths))
    }
}

impl fmt::Display for Cgpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// ENCODERS
// ============================================================================

/// `None` (not applicable) encodes as the `NaN` sentinel
pub fn encode_cgpa(cgpa: Option<Cgpa>) -> String {
    match cgpa {
        Some(value) => value.to_string(),
        None => CGPA_NOT_APPLICABLE.to_string(),
    }
}

/// `None` (no current job) encodes as the `missing` sentinel
pub fn encode_profession(profession: Option<Profession>) -> &'static str {
    match profession {
        Some(p) => p.as_str(),
        None => PROFESSION_MISSING,
    }
}

/// Apply the CGPA sentinel rule to raw answers
pub fn resolve_cgpa(not_applicable: bool, value: f64) -> Option<f64> {
    (!not_applicable).then_some(value)
}

/// Apply the Profession sentinel rule to raw answers
pub fn resolve_profession(no_job: bool, selection: Option<Profession>) -> Option<Profession> {
    if no_job {
        None
    } else {
        selection
    }
}
