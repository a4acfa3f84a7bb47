//! Stopwatch configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Stopwatch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Milliseconds represented by one counter step
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Resume the counter from the server start time when a running
    /// session is adopted on open
    #[serde(default = "default_anchor_resumed_sessions")]
    pub anchor_resumed_sessions: bool,
}

impl ClockConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate clock configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tick_interval_ms == 0 || self.tick_interval_ms > 60_000 {
            return Err(ValidationError::InvalidTickInterval);
        }
        Ok(())
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            anchor_resumed_sessions: default_anchor_resumed_sessions(),
        }
    }
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_anchor_resumed_sessions() -> bool {
    true
}
