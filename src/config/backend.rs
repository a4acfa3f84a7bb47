//! Backend (session service) configuration

use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the session service, optionally with a path prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate backend configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("backend.base_url"));
        }
        let url = Url::parse(&self.base_url)
            .map_err(|e| ValidationError::InvalidBaseUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidBaseUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout() -> u64 {
    15
}
