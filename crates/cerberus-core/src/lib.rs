pub mod app_config;
pub mod config;
pub mod records;

use thiserror::Error;

pub use app_config::{AlertThresholds, AppConfig, Environment, DEFAULT_META_CONVERSION_ACTIONS};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{AdRecord, LeadRecord, Platform};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
