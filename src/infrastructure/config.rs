//! Application configuration management.
//!
//! Configuration is read once at startup from environment variables (after
//! loading an optional `.env` file). Parsing itself goes through
//! [`AppConfig::from_lookup`], which takes any key lookup function, so tests
//! never have to mutate the process environment.
//!
//! # Example
//!
//! ```rust,ignore
//! use family_groups::infrastructure::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! println!("Listening on {}:{}", config.app_host, config.app_port);
//! ```

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

use super::factory::StorageMode;

/// Placeholder used when `SECRET_KEY` is unset. Fine for local runs only.
pub const DEVELOPMENT_SECRET_KEY: &str = "dev-secret-change-me";

/// Upper bound for `SESSION_TTL_HOURS` (one year).
pub const MAX_SESSION_TTL_HOURS: u32 = 24 * 366;
/// Upper bound for `REMEMBER_ME_TTL_DAYS` (ten years).
pub const MAX_REMEMBER_ME_TTL_DAYS: u32 = 3660;

/// Configuration error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The name of the environment variable.
        key: String,
        /// Description of why the value is invalid.
        message: String,
    },
}

/// Application configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Key mixed into session token digests.
    pub secret_key: String,
    /// Which repository backend to use.
    pub storage_mode: StorageMode,
    /// `SQLite` connection URL, used when `storage_mode` is `Sqlite`.
    pub database_url: String,
    /// HTTP server host address.
    pub app_host: String,
    /// HTTP server port.
    pub app_port: u16,
    /// Lifetime of a normal session, in hours.
    pub session_ttl_hours: u32,
    /// Lifetime of a "remember me" session, in days.
    pub remember_me_ttl_days: u32,
    /// SHA-256 rounds applied when hashing new passwords.
    pub password_hash_iterations: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            secret_key: DEVELOPMENT_SECRET_KEY.to_string(),
            storage_mode: StorageMode::Sqlite,
            database_url: "sqlite://site.db".to_string(),
            app_host: "0.0.0.0".to_string(),
            app_port: 8080,
            session_ttl_hours: 24,
            remember_me_ttl_days: 30,
            password_hash_iterations: 100_000,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SECRET_KEY`: session digest key (optional, development placeholder)
    /// - `STORAGE_MODE`: `in_memory` | `sqlite` (optional, default: `sqlite`)
    /// - `DATABASE_URL`: `SQLite` URL (optional, default: `sqlite://site.db`)
    /// - `APP_HOST`: Server host (optional, default: "0.0.0.0")
    /// - `APP_PORT`: Server port (optional, default: 8080)
    /// - `SESSION_TTL_HOURS`: (optional, default: 24, at most 8784)
    /// - `REMEMBER_ME_TTL_DAYS`: (optional, default: 30, at most 3660)
    /// - `PASSWORD_HASH_ITERATIONS`: (optional, default: 100000)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors if file doesn't exist)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a value cannot be parsed or is
    /// out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secret_key = get_optional(&lookup, "SECRET_KEY", defaults.secret_key);
        if secret_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "SECRET_KEY".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let config = Self {
            secret_key,
            storage_mode: get_optional_parsed(&lookup, "STORAGE_MODE", defaults.storage_mode)?,
            database_url: get_optional(&lookup, "DATABASE_URL", defaults.database_url),
            app_host: get_optional(&lookup, "APP_HOST", defaults.app_host),
            app_port: get_optional_parsed(&lookup, "APP_PORT", defaults.app_port)?,
            session_ttl_hours: get_bounded(
                &lookup,
                "SESSION_TTL_HOURS",
                defaults.session_ttl_hours,
                MAX_SESSION_TTL_HOURS,
            )?,
            remember_me_ttl_days: get_bounded(
                &lookup,
                "REMEMBER_ME_TTL_DAYS",
                defaults.remember_me_ttl_days,
                MAX_REMEMBER_ME_TTL_DAYS,
            )?,
            password_hash_iterations: get_bounded(
                &lookup,
                "PASSWORD_HASH_ITERATIONS",
                defaults.password_hash_iterations,
                u32::MAX,
            )?,
        };
        Ok(config)
    }

    /// Whether the secret key is still the development placeholder.
    #[must_use]
    pub fn uses_development_secret(&self) -> bool {
        self.secret_key == DEVELOPMENT_SECRET_KEY
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

fn get_optional<F>(lookup: &F, key: &str, default: String) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or(default)
}

/// Gets an optional variable and parses it, with a default value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the variable is set but cannot be parsed.
fn get_optional_parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key).map_or_else(
        || Ok(default),
        |value| {
            value
                .trim()
                .parse()
                .map_err(|error: T::Err| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: error.to_string(),
                })
        },
    )
}

/// Gets an optional count in `1..=max`, with a default value.
fn get_bounded<F>(lookup: &F, key: &str, default: u32, max: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };
    match get_optional_parsed(lookup, key, default)? {
        0 => Err(invalid("must be greater than zero".to_string())),
        value if value > max => Err(invalid(format!("must be at most {max}"))),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    // =========================================================================
    // ConfigError Tests
    // =========================================================================

    #[rstest]
    fn config_error_invalid_value_display() {
        let error = ConfigError::InvalidValue {
            key: "TEST_VAR".to_string(),
            message: "must be a number".to_string(),
        };
        assert_eq!(
            format!("{error}"),
            "Invalid value for TEST_VAR: must be a number"
        );
    }

    // =========================================================================
    // Lookup Tests
    // =========================================================================

    #[rstest]
    fn empty_environment_yields_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(config.uses_development_secret());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[rstest]
    fn values_override_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("STORAGE_MODE", "in_memory"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "3000"),
            ("SESSION_TTL_HOURS", "2"),
            ("REMEMBER_ME_TTL_DAYS", "7"),
            ("PASSWORD_HASH_ITERATIONS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.secret_key, "s3cret");
        assert_eq!(config.storage_mode, StorageMode::InMemory);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.session_ttl_hours, 2);
        assert_eq!(config.remember_me_ttl_days, 7);
        assert_eq!(config.password_hash_iterations, 10);
        assert!(!config.uses_development_secret());
    }

    #[rstest]
    #[case("APP_PORT", "eighty")]
    #[case("APP_PORT", "70000")]
    #[case("STORAGE_MODE", "postgres")]
    #[case("SESSION_TTL_HOURS", "0")]
    #[case("SESSION_TTL_HOURS", "4000000000")]
    #[case("SESSION_TTL_HOURS", "8785")]
    #[case("REMEMBER_ME_TTL_DAYS", "3661")]
    #[case("PASSWORD_HASH_ITERATIONS", "-5")]
    #[case("SECRET_KEY", "   ")]
    fn invalid_values_are_rejected(#[case] key: &str, #[case] value: &str) {
        let error = AppConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();

        assert!(
            matches!(&error, ConfigError::InvalidValue { key: reported, .. } if reported == key),
            "unexpected error: {error:?}"
        );
    }

    #[rstest]
    #[case("SESSION_TTL_HOURS", "8784")]
    #[case("REMEMBER_ME_TTL_DAYS", "3660")]
    fn lifetimes_accept_their_upper_bound(#[case] key: &str, #[case] value: &str) {
        assert!(AppConfig::from_lookup(lookup_from(&[(key, value)])).is_ok());
    }

    #[rstest]
    fn out_of_range_lifetime_names_the_bound() {
        let error =
            AppConfig::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", "9000")])).unwrap_err();

        assert_eq!(
            error.to_string(),
            "Invalid value for SESSION_TTL_HOURS: must be at most 8784"
        );
    }
}
