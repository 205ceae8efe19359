use crate::app_config::{AppConfig, Environment, ResolverSettings};
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
/// Every variable has a default, so an empty environment yields a usable
/// development config. Tests drive this with a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PRODIMG_ENV", "development"))?;

    let bind_addr = or_default("PRODIMG_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("PRODIMG_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("PRODIMG_LOG_LEVEL", "info");

    let default_site = or_default("PRODIMG_DEFAULT_SITE", "bringo.ma")
        .trim()
        .to_ascii_lowercase();
    if default_site.is_empty() {
        return Err(invalid("PRODIMG_DEFAULT_SITE", "must not be empty".into()));
    }

    let cache_max_age_secs = parse_u64("PRODIMG_CACHE_MAX_AGE_SECS", "604800")?;

    let defaults = ResolverSettings::default();

    let search_url = or_default("PRODIMG_SEARCH_URL", &defaults.search_url);
    if !(search_url.starts_with("http://") || search_url.starts_with("https://")) {
        return Err(invalid(
            "PRODIMG_SEARCH_URL",
            format!("\"{search_url}\" is not an http(s) URL"),
        ));
    }

    let user_agent = or_default("PRODIMG_USER_AGENT", &defaults.user_agent);
    let request_timeout_secs = parse_u64("PRODIMG_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "PRODIMG_REQUEST_TIMEOUT_SECS",
            "must be at least 1".into(),
        ));
    }

    let max_candidates = or_default("PRODIMG_MAX_CANDIDATES", "8")
        .parse::<usize>()
        .map_err(|e| invalid("PRODIMG_MAX_CANDIDATES", e.to_string()))?;
    if max_candidates == 0 {
        return Err(invalid("PRODIMG_MAX_CANDIDATES", "must be at least 1".into()));
    }

    let name_threshold = or_default("PRODIMG_NAME_THRESHOLD", "0.6")
        .parse::<f64>()
        .map_err(|e| invalid("PRODIMG_NAME_THRESHOLD", e.to_string()))?;
    if !(0.0..=1.0).contains(&name_threshold) {
        return Err(invalid(
            "PRODIMG_NAME_THRESHOLD",
            format!("{name_threshold} is outside [0, 1]"),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        default_site,
        cache_max_age_secs,
        resolver: ResolverSettings {
            search_url,
            user_agent,
            request_timeout_secs,
            max_candidates,
            name_threshold,
        },
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRODIMG_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
