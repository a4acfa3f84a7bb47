//! Operator configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Operator configuration for dedicated terminals
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperatorConfig {
    /// Operator code to log in with at startup
    pub default_code: Option<String>,
}

impl OperatorConfig {
    /// Validate operator configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.default_code {
            Some(code) if code.trim().is_empty() => Err(ValidationError::BlankOperatorCode),
            _ => Ok(()),
        }
    }
}
