//! Outcome notices reported to the presentation layer.

use std::fmt;
use std::time::Duration;

/// How long a notice stays visible unless stated otherwise.
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(5);

/// Extended visibility for open-session conflicts.
pub const CONFLICT_NOTICE_DURATION: Duration = Duration::from_secs(8);

/// Visibility of the "session still running" reminder shown on exit.
pub const EXIT_REMINDER_DURATION: Duration = Duration::from_secs(10);

/// Severity of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub visible_for: Duration,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            visible_for: DEFAULT_NOTICE_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn visible_for(mut self, duration: Duration) -> Self {
        self.visible_for = duration;
        self
    }
}
