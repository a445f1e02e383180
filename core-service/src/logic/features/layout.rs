//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The column names below are the exact strings the trained classifier was
//! fitted on, punctuation and spacing included.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Rename a column → increment FEATURE_VERSION and retrain / re-export the model

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Column names in exact order they appear in a record
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    "Age",                                   // 0: integer 10..=100
    "Have you ever had suicidal thoughts ?", // 1: No | Yes
    "Aca/Work Pressure",                     // 2: rating 1..=5
    "Financial Stress",                      // 3: rating 1..=5
    "Aca/Work Satisfaction",                 // 4: rating 1..=5
    "Working Professional or Student",       // 5: Student | Working Professional
    "CGPA",                                  // 6: "d.dd" or "NaN"
    "Work/Study Hours",                      // 7: hours 0..=18
    "Dietary Habits",                        // 8: Healthy | Moderate | Unhealthy
    "Profession",                            // 9: one of 34 or "missing"
    "Sleep Duration",                        // 10: hours 0..=12
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 11;

// Column indices used by the record encoder
pub const IDX_AGE: usize = 0;
pub const IDX_SUICIDAL_THOUGHTS: usize = 1;
pub const IDX_ACADEMIC_WORK_PRESSURE: usize = 2;
pub const IDX_FINANCIAL_STRESS: usize = 3;
pub const IDX_ACADEMIC_WORK_SATISFACTION: usize = 4;
pub const IDX_STATUS: usize = 5;
pub const IDX_CGPA: usize = 6;
pub const IDX_WORK_STUDY_HOURS: usize = 7;
pub const IDX_DIETARY_HABITS: usize = 8;
pub const IDX_PROFESSION: usize = 9;
pub const IDX_SLEEP_DURATION: usize = 10;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over an ordered list of column names.
///
/// Model artifacts only know their column names, so the version is not
/// part of the hash.
pub fn compute_names_hash<I, S>(names: I) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Hasher::new();

    for name in names {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Hash of the built-in layout
pub fn layout_hash() -> u32 {
    compute_names_hash(FEATURE_LAYOUT.iter())
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Layout declared by a model artifact
    pub fn from_names(names: &[String]) -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: compute_names_hash(names),
            feature_count: names.len(),
            feature_names: names.to_vec(),
        }
    }

    pub fn is_current(&self) -> bool {
        self.hash == layout_hash() && self.feature_count == FEATURE_COUNT
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Feature layout mismatch: expected hash {expected_hash:08x}, got {actual_hash:08x} \
     (first difference at column {first_difference:?})"
)]
pub struct LayoutMismatchError {
    pub expected_hash: u32,
    pub actual_hash: u32,
    pub first_difference: Option<usize>,
}

/// Check that `actual` names the same columns as `expected`, in the same order
pub fn compare_names<E, A>(expected: &[E], actual: &[A]) -> Result<(), LayoutMismatchError>
where
    E: AsRef<str>,
    A: AsRef<str>,
{
    let first_difference = expected
        .iter()
        .zip(actual.iter())
        .position(|(e, a)| e.as_ref() != a.as_ref())
        .or_else(|| {
            (expected.len() != actual.len()).then(|| expected.len().min(actual.len()))
        });

    match first_difference {
        None => Ok(()),
        Some(index) => Err(LayoutMismatchError {
            expected_hash: compute_names_hash(expected.iter()),
            actual_hash: compute_names_hash(actual.iter()),
            first_difference: Some(index),
        }),
    }
}

/// Validate that a declared column list matches the built-in layout
pub fn validate_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    compare_names(FEATURE_LAYOUT, names)
}

/// Validate a record hash against the hash a model expects
pub fn validate_hash(expected_hash: u32, actual_hash: u32) -> Result<(), LayoutMismatchError> {
    if expected_hash != actual_hash {
        return Err(LayoutMismatchError {
            expected_hash,
            actual_hash,
            first_difference: None,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by column name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get column name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 11);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(layout_hash(), compute_names_hash(FEATURE_LAYOUT));
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_hash_sensitive_to_order() {
        let mut swapped: Vec<&str> = FEATURE_LAYOUT.to_vec();
        swapped.swap(0, 1);
        assert_ne!(compute_names_hash(&swapped), layout_hash());
    }

    #[test]
    fn test_validate_names_success() {
        let names: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
        assert!(validate_names(&names).is_ok());
        assert!(LayoutInfo::from_names(&names).is_current());
    }

    #[test]
    fn test_validate_names_punctuation_mismatch() {
        let mut names: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
        names[1] = "Have you ever had suicidal thoughts?".to_string();

        let err = validate_names(&names).unwrap_err();
        assert_eq!(err.first_difference, Some(1));
        assert_ne!(err.expected_hash, err.actual_hash);
    }

    #[test]
    fn test_validate_names_missing_column() {
        let names: Vec<&str> = FEATURE_LAYOUT[..10].to_vec();
        let err = validate_names(&names).unwrap_err();
        assert_eq!(err.first_difference, Some(10));
    }

    #[test]
    fn test_validate_hash() {
        assert!(validate_hash(layout_hash(), layout_hash()).is_ok());
        assert!(validate_hash(layout_hash(), layout_hash().wrapping_add(1)).is_err());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("Age"), Some(IDX_AGE));
        assert_eq!(feature_index("CGPA"), Some(IDX_CGPA));
        assert_eq!(feature_index("Sleep Duration"), Some(IDX_SLEEP_DURATION));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(IDX_PROFESSION), Some("Profession"));
        assert_eq!(feature_name(100), None);
    }
}
