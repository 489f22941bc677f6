use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if an env var value fails to parse. All configuration
/// has defaults; API keys are optional and the corresponding features degrade
/// when they are absent.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if an env var value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("HOTSPOT_ENV", "development"));

    // Port 5001 matches the original deployment default.
    let bind_addr = parse_addr("HOTSPOT_BIND_ADDR", "0.0.0.0:5001")?;
    let log_level = or_default("HOTSPOT_LOG_LEVEL", "info");

    let latlong_api_key = lookup("LATLONG_API_KEY").ok().filter(|v| !v.is_empty());
    let latlong_base_url = or_default("LATLONG_BASE_URL", "https://apihub.latlong.ai");
    let openai_api_key = lookup("OPENAI_API_KEY").ok().filter(|v| !v.is_empty());
    let openai_model = or_default("OPENAI_MODEL", "gpt-4o-mini");

    let weights_path = lookup("HOTSPOT_WEIGHTS_PATH").ok().map(PathBuf::from);

    let http_timeout_secs = parse_u64("HOTSPOT_HTTP_TIMEOUT_SECS", "30")?;
    let road_check_timeout_secs = parse_u64("HOTSPOT_ROAD_CHECK_TIMEOUT_SECS", "5")?;
    let max_retries = parse_u32("HOTSPOT_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("HOTSPOT_RETRY_BACKOFF_BASE_SECS", "1")?;

    // Bangalore city center.
    let default_lat = parse_f64("HOTSPOT_DEFAULT_LAT", "12.9716")?;
    let default_lng = parse_f64("HOTSPOT_DEFAULT_LNG", "77.5946")?;
    let default_radius_m = parse_f64("HOTSPOT_DEFAULT_RADIUS_M", "1000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        latlong_api_key,
        latlong_base_url,
        openai_api_key,
        openai_model,
        weights_path,
        http_timeout_secs,
        road_check_timeout_secs,
        max_retries,
        retry_backoff_base_secs,
        default_lat,
        default_lng,
        default_radius_m,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
