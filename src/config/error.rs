//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid backend base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid clock tick interval")]
    InvalidTickInterval,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),

    #[error("Default operator code is blank")]
    BlankOperatorCode,
}
