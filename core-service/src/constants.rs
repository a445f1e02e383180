//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "MindCheck";

/// Default model artifact, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "catboost_tuned_model.json";

/// Default audit log file
pub const DEFAULT_AUDIT_LOG: &str = crate::logic::audit::AUDIT_FILE_NAME;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8501;
