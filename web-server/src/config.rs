//! Configuration module

use std::env;
use std::path::PathBuf;

use mindcheck_core::constants::{DEFAULT_AUDIT_LOG, DEFAULT_MODEL_PATH, DEFAULT_PORT};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Model artifact (.json scorecard or .onnx)
    pub model_path: PathBuf,

    /// CSV audit log of built records
    pub audit_log: PathBuf,

    /// Write the audit log at all
    pub audit_enabled: bool,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_path: env::var("MINDCHECK_MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
                .into(),

            audit_log: env::var("MINDCHECK_AUDIT_LOG")
                .unwrap_or_else(|_| DEFAULT_AUDIT_LOG.to_string())
                .into(),

            audit_enabled: env::var("MINDCHECK_AUDIT_ENABLED")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
