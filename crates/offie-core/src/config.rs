use crate::app_config::{AppConfig, Environment};
use crate::types::{DistanceUnit, SortKey};
use crate::ConfigError;

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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let google_maps_api_key = require("GOOGLE_MAPS_API_KEY")?;
    if google_maps_api_key.trim().is_empty() {
        return Err(invalid("GOOGLE_MAPS_API_KEY", "must not be empty".to_string()));
    }

    let env = parse_environment(&or_default("OFFIE_ENV", "development"))?;
    let log_level = or_default("OFFIE_LOG_LEVEL", "info");
    let categories_path = PathBuf::from(or_default(
        "OFFIE_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));

    let search_radius_meters = parse_u32("OFFIE_SEARCH_RADIUS_METERS", "1000")?;
    if search_radius_meters == 0 {
        return Err(invalid(
            "OFFIE_SEARCH_RADIUS_METERS",
            "radius must be greater than zero".to_string(),
        ));
    }
    let open_now = parse_bool("OFFIE_OPEN_NOW", "true")?;

    let units = or_default("OFFIE_UNITS", "miles")
        .parse::<DistanceUnit>()
        .map_err(|reason| invalid("OFFIE_UNITS", reason))?;
    let sort = or_default("OFFIE_SORT", "distance")
        .parse::<SortKey>()
        .map_err(|reason| invalid("OFFIE_SORT", reason))?;

    let request_timeout_secs = parse_u64("OFFIE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("OFFIE_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("OFFIE_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        google_maps_api_key,
        env,
        log_level,
        categories_path,
        search_radius_meters,
        open_now,
        units,
        sort,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "OFFIE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
