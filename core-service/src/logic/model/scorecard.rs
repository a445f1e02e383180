//! Scorecard model - logistic regression over the encoded columns
//!
//! Artifact format (JSON):
//!
//! ```json
//! {
//!   "name": "depression-scorecard",
//!   "feature_names": ["Age", "...", "Sleep Duration"],
//!   "intercept": -1.2,
//!   "terms": {
//!     "Age": { "kind": "numeric", "weight": -0.03, "missing": 0.0 },
//!     "Profession": { "kind": "categorical", "levels": { "Teacher": 0.1 }, "default": 0.0 }
//!   }
//! }
//! ```
//!
//! Columns without a term contribute nothing. A numeric column holding a
//! sentinel (`NaN` CGPA) contributes its `missing` value.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::inference::{checked_probability, ModelLoadError, ModelMetadata, PredictError, RiskModel};
use crate::logic::features::layout::{compare_names, LayoutInfo, FEATURE_LAYOUT};
use crate::logic::features::record::{FeatureRecord, FeatureValue};

pub const MODEL_TYPE: &str = "scorecard";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Term {
    Numeric {
        weight: f64,
        #[serde(default)]
        missing: f64,
    },
    Categorical {
        levels: HashMap<String, f64>,
        #[serde(default)]
        default: f64,
    },
}

impl Term {
    fn contribution(&self, value: &FeatureValue) -> f64 {
        match self {
            Term::Numeric { weight, missing } => match numeric(value) {
                Some(x) => weight * x,
                None => *missing,
            },
            Term::Categorical { levels, default } => {
                let key = value.to_string();
                levels.get(&key).copied().unwrap_or(*default)
            }
        }
    }
}

fn numeric(value: &FeatureValue) -> Option<f64> {
    match value {
        FeatureValue::Int(v) => Some(*v as f64),
        FeatureValue::Text(s) => s.parse::<f64>().ok().filter(|x| x.is_finite()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardArtifact {
    #[serde(default)]
    pub name: String,
    pub feature_names: Vec<String>,
    pub intercept: f64,
    #[serde(default)]
    pub terms: HashMap<String, Term>,
}

/// Logistic scorecard loaded from a JSON artifact
#[derive(Debug)]
pub struct ScorecardModel {
    artifact: ScorecardArtifact,
    layout: LayoutInfo,
    metadata: ModelMetadata,
}

impl ScorecardModel {
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ModelLoadError::new(path, e.to_string()))?;
        let artifact: ScorecardArtifact = serde_json::from_str(&content)
            .map_err(|e| ModelLoadError::new(path, format!("invalid scorecard: {}", e)))?;
        Self::from_artifact(path, artifact)
    }

    pub fn from_artifact(path: &Path, artifact: ScorecardArtifact) -> Result<Self, ModelLoadError> {
        if let Some(unknown) = artifact
            .terms
            .keys()
            .find(|column| !artifact.feature_names.contains(column))
        {
            return Err(ModelLoadError::new(
                path,
                format!("term for unknown column '{}'", unknown),
            ));
        }
        if !artifact.intercept.is_finite() {
            return Err(ModelLoadError::new(path, "intercept is not finite"));
        }

        let layout = LayoutInfo::from_names(&artifact.feature_names);
        let metadata = ModelMetadata::new(path, MODEL_TYPE, &layout);

        log::info!(
            "Scorecard '{}' loaded: {} columns, {} terms",
            artifact.name,
            layout.feature_count,
            artifact.terms.len()
        );

        Ok(Self {
            artifact,
            layout,
            metadata,
        })
    }

    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    fn logit(&self, record: &FeatureRecord) -> f64 {
        record
            .named_values()
            .iter()
            .filter_map(|(name, value)| {
                self.artifact.terms.get(*name).map(|term| term.contribution(value))
            })
            .fold(self.artifact.intercept, |acc, x| acc + x)
    }
}

impl RiskModel for ScorecardModel {
    fn predict(&self, record: &FeatureRecord) -> Result<f64, PredictError> {
        if let Err(e) = record.validate_against(self.layout.hash) {
            // Report where the columns diverge, not just the hashes
            return Err(compare_names(&self.artifact.feature_names, FEATURE_LAYOUT)
                .err()
                .unwrap_or(e)
                .into());
        }

        let z = self.logit(record);
        checked_probability(sigmoid(z))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
