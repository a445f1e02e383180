//! Features Module - Questionnaire answers to model input
//!
//! Layout (tên cột, hash) → schema (domain, sentinel) → record → builder.

pub mod layout;
pub mod schema;
pub mod record;
pub mod builder;

#[cfg(test)]
mod tests;

// Re-export common types
pub use builder::{RawAnswers, RecordBuilder, ValidationError};
pub use layout::{LayoutInfo, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use record::{FeatureRecord, FeatureValue, RowError};
pub use schema::{Cgpa, DietaryHabits, Profession, Status, SuicidalThoughts};
