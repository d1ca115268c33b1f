use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_TWELVE_LABS_BASE_URL: &str = "https://api.twelvelabs.io/v1.3";
const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("ADONOMICS_ENV", "development"));
    let bind_addr = parse_var(
        &or_default("ADONOMICS_BIND_ADDR", "0.0.0.0:3000"),
        "ADONOMICS_BIND_ADDR",
    )?;
    let log_level = or_default("ADONOMICS_LOG_LEVEL", "info");

    let twelve_labs_api_key = optional("TWELVE_LABS_API_KEY");
    let twelve_labs_index_id = optional("TWELVE_LABS_INDEX_ID");
    let twelve_labs_base_url = or_default("TWELVE_LABS_BASE_URL", DEFAULT_TWELVE_LABS_BASE_URL);

    let groq_api_key = optional("GROQ_API_KEY");
    let groq_model = or_default("GROQ_MODEL", DEFAULT_GROQ_MODEL);
    let groq_base_url = or_default("GROQ_BASE_URL", DEFAULT_GROQ_BASE_URL);

    let numeric = |var: &str, default: &str| or_default(var, default);

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        twelve_labs_api_key,
        twelve_labs_index_id,
        twelve_labs_base_url,
        groq_api_key,
        groq_model,
        groq_base_url,
        provider_timeout_secs: parse_var(
            &numeric("ADONOMICS_PROVIDER_TIMEOUT_SECS", "120"),
            "ADONOMICS_PROVIDER_TIMEOUT_SECS",
        )?,
        synthesis_timeout_secs: parse_var(
            &numeric("ADONOMICS_SYNTHESIS_TIMEOUT_SECS", "60"),
            "ADONOMICS_SYNTHESIS_TIMEOUT_SECS",
        )?,
        poll_interval_secs: parse_var(
            &numeric("ADONOMICS_POLL_INTERVAL_SECS", "5"),
            "ADONOMICS_POLL_INTERVAL_SECS",
        )?,
        indexing_max_wait_secs: parse_var(
            &numeric("ADONOMICS_INDEXING_MAX_WAIT_SECS", "300"),
            "ADONOMICS_INDEXING_MAX_WAIT_SECS",
        )?,
        retry_after_secs: parse_var(
            &numeric("ADONOMICS_RETRY_AFTER_SECS", "900"),
            "ADONOMICS_RETRY_AFTER_SECS",
        )?,
        analysis_lease_secs: parse_var(
            &numeric("ADONOMICS_ANALYSIS_LEASE_SECS", "1800"),
            "ADONOMICS_ANALYSIS_LEASE_SECS",
        )?,
        max_upload_bytes: parse_var(
            &numeric("ADONOMICS_MAX_UPLOAD_BYTES", "524288000"),
            "ADONOMICS_MAX_UPLOAD_BYTES",
        )?,
        db_max_connections: parse_var(
            &numeric("ADONOMICS_DB_MAX_CONNECTIONS", "10"),
            "ADONOMICS_DB_MAX_CONNECTIONS",
        )?,
        db_min_connections: parse_var(
            &numeric("ADONOMICS_DB_MIN_CONNECTIONS", "1"),
            "ADONOMICS_DB_MIN_CONNECTIONS",
        )?,
        db_acquire_timeout_secs: parse_var(
            &numeric("ADONOMICS_DB_ACQUIRE_TIMEOUT_SECS", "10"),
            "ADONOMICS_DB_ACQUIRE_TIMEOUT_SECS",
        )?,
        rate_limit_requests: parse_var(
            &numeric("ADONOMICS_RATE_LIMIT_REQUESTS", "120"),
            "ADONOMICS_RATE_LIMIT_REQUESTS",
        )?,
        rate_limit_window_secs: parse_var(
            &numeric("ADONOMICS_RATE_LIMIT_WINDOW_SECS", "60"),
            "ADONOMICS_RATE_LIMIT_WINDOW_SECS",
        )?,
    })
}

fn parse_var<T>(raw: &str, var: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
