use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::{AlertThresholds, AppConfig, Environment, DEFAULT_META_CONVERSION_ACTIONS};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; defaults match the thresholds the alert layer
/// was tuned against.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_decimal = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        let raw = or_default(var, default);
        let value = Decimal::from_str(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if value.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be non-negative, got {value}"),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("CERBERUS_ENV", "development"))?;
    let log_level = or_default("CERBERUS_LOG_LEVEL", "info");

    let thresholds = AlertThresholds {
        zero_performance_min_spend: parse_decimal("CERBERUS_ZERO_PERFORMANCE_MIN_SPEND", "50")?,
        funnel_min_ctr: parse_decimal("CERBERUS_FUNNEL_MIN_CTR", "2.0")?,
        funnel_max_conversion_rate: parse_decimal("CERBERUS_FUNNEL_MAX_CONVERSION_RATE", "1.0")?,
        top_performer_min_conversions: parse_decimal(
            "CERBERUS_TOP_PERFORMER_MIN_CONVERSIONS",
            "5",
        )?,
        top_performer_max_cost_per_lead: parse_decimal("CERBERUS_TOP_PERFORMER_MAX_CPL", "10")?,
    };

    let meta_conversion_actions = match lookup("CERBERUS_META_CONVERSION_ACTIONS") {
        Ok(raw) => parse_action_list(&raw)?,
        Err(_) => DEFAULT_META_CONVERSION_ACTIONS
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
    };

    Ok(AppConfig {
        env,
        log_level,
        thresholds,
        meta_conversion_actions,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CERBERUS_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

/// Split a comma-separated action list, dropping blanks and duplicates while
/// keeping first-seen order.
fn parse_action_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut actions: Vec<String> = Vec::new();
    for action in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !actions.iter().any(|a| a == action) {
            actions.push(action.to_string());
        }
    }
    if actions.is_empty() {
        return Err(ConfigError::Validation(
            "CERBERUS_META_CONVERSION_ACTIONS must name at least one action type".to_string(),
        ));
    }
    Ok(actions)
}
