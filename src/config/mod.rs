//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ATTRIBUTION` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use touchpoint_attribution::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default model: {}", config.attribution.default_model);
//! ```

mod attribution;
mod error;
mod logging;

pub use attribution::AttributionConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads successfully.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Model defaults and Markov guard
    #[serde(default)]
    pub attribution: AttributionConfig,

    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ATTRIBUTION` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ATTRIBUTION__ATTRIBUTION__HALF_LIFE_DAYS=3` -> `attribution.half_life_days = 3`
    /// - `ATTRIBUTION__LOGGING__JSON=true` -> `logging.json = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ATTRIBUTION")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.attribution.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribution::AttributionModel;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("ATTRIBUTION__ATTRIBUTION__DEFAULT_MODEL");
        env::remove_var("ATTRIBUTION__ATTRIBUTION__HALF_LIFE_DAYS");
        env::remove_var("ATTRIBUTION__ATTRIBUTION__CAMPAIGN_LEVEL");
        env::remove_var("ATTRIBUTION__ATTRIBUTION__MAX_MARKOV_CHANNELS");
        env::remove_var("ATTRIBUTION__LOGGING__JSON");
    }

    #[test]
    fn test_load_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.attribution.default_model, "linear");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ATTRIBUTION__ATTRIBUTION__DEFAULT_MODEL", "markov");
        env::set_var("ATTRIBUTION__ATTRIBUTION__HALF_LIFE_DAYS", "3.5");
        env::set_var("ATTRIBUTION__ATTRIBUTION__CAMPAIGN_LEVEL", "true");
        env::set_var("ATTRIBUTION__ATTRIBUTION__MAX_MARKOV_CHANNELS", "50");
        env::set_var("ATTRIBUTION__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.attribution.default_model().unwrap(),
            AttributionModel::Markov
        );
        assert_eq!(config.attribution.half_life_days, 3.5);
        assert!(config.attribution.campaign_level);
        assert_eq!(config.attribution.max_markov_channels, 50);
        assert!(config.logging.json);
    }

    #[test]
    fn test_validate_rejects_unknown_model() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ATTRIBUTION__ATTRIBUTION__DEFAULT_MODEL", "shapley");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnknownDefaultModel(_))
        ));
    }
}
