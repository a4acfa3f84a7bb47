//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `APONTAMENTO` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use apontamento::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Backend at {}", config.backend.base_url);
//! ```

mod backend;
mod clock;
mod error;
mod logging;
mod operator;

pub use backend::BackendConfig;
pub use clock::ClockConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use operator::OperatorConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration pointing at a local backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Session service connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Stopwatch behaviour
    #[serde(default)]
    pub clock: ClockConfig,

    /// Tracing output
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Terminal operator defaults
    #[serde(default)]
    pub operator: OperatorConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `APONTAMENTO` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `APONTAMENTO__BACKEND__BASE_URL=http://mes:5000` -> `backend.base_url`
    /// - `APONTAMENTO__CLOCK__TICK_INTERVAL_MS=500` -> `clock.tick_interval_ms`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("APONTAMENTO")
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
        self.backend.validate()?;
        self.clock.validate()?;
        self.logging.validate()?;
        self.operator.validate()?;
        Ok(())
    }
}
