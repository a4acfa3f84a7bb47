//! Strongly-typed identifier value objects.
//!
//! Work order, company and operator identifiers arrive from the backend as
//! either strings or numbers, so they are all normalized to trimmed strings.
//! Session identifiers are only ever assigned by the server.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Server-assigned identifier of a tracked work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(i64);

impl SessionId {
    /// Wraps an identifier returned by the server.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Identifier of a manufacturing work order (OF).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkOrderId(String);

impl WorkOrderId {
    /// Creates a new WorkOrderId, returning error if blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(ValidationError::empty_field("work_order_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the company/plant owning a work order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    /// Creates a new CompanyId, returning error if blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(ValidationError::empty_field("company_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Code typed in by the floor operator at the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorCode(String);

impl OperatorCode {
    /// Creates a new OperatorCode, returning error if blank.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(ValidationError::empty_field("operator_code"));
        }
        Ok(Self(code))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
