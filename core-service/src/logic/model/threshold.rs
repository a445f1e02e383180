//! Risk Thresholds - probability to risk tier
//!
//! Thresholds are fixed, not configurable. Upper bounds are exclusive:
//! exactly 0.7 is Moderate, exactly 0.3 is Low.

use serde::{Deserialize, Serialize};

/// Above this the tier is High
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Above this (and up to HIGH_RISK_THRESHOLD) the tier is Moderate
pub const MODERATE_RISK_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Message shown to the respondent
    pub fn message(&self) -> &'static str {
        match self {
            RiskTier::High => {
                "This indicates a higher risk. Consider consulting a mental health professional."
            }
            RiskTier::Moderate => "Moderate risk. Monitoring your mental health is recommended.",
            RiskTier::Low => "Low risk. Keep maintaining a healthy lifestyle!",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a probability to its tier. Total: anything not above 0.3 (NaN included) is Low.
pub fn classify(probability: f64) -> RiskTier {
    if probability > HIGH_RISK_THRESHOLD {
        RiskTier::High
    } else if probability > MODERATE_RISK_THRESHOLD {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    }
}

/// Result of one successful prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub probability: f64,
    pub tier: RiskTier,
}

impl RiskAssessment {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            probability,
            tier: classify(probability),
        }
    }

    /// Probability as a percentage with two decimals, e.g. `75.00%`
    pub fn percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }

    pub fn message(&self) -> &'static str {
        self.tier.message()
    }
}
