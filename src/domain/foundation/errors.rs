//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be at least {min}, got {actual}")]
    OutOfRange { field: String, min: f64, actual: f64 },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,

    // Precondition errors
    WorkOrderNotSelected,
    OperatorMissing,
    InvalidStateTransition,
    OperationInFlight,

    // Business rejections
    SessionAlreadyOpen,
    BackendRejected,

    // Infrastructure errors
    BackendUnavailable,
    ProtocolViolation,
    ContextSuperseded,
}

impl ErrorCode {
    /// Wire value the server uses for "an open session already exists".
    pub const OPEN_SESSION_WIRE_CODE: &'static str = "APONTAMENTO_ABERTO";

    /// Maps a machine-readable code sent by the server, if it is one we know.
    pub fn from_wire(code: &str) -> Option<ErrorCode> {
        match code {
            Self::OPEN_SESSION_WIRE_CODE => Some(ErrorCode::SessionAlreadyOpen),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::WorkOrderNotSelected => "WORK_ORDER_NOT_SELECTED",
            ErrorCode::OperatorMissing => "OPERATOR_MISSING",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::OperationInFlight => "OPERATION_IN_FLIGHT",
            ErrorCode::SessionAlreadyOpen => Self::OPEN_SESSION_WIRE_CODE,
            ErrorCode::BackendRejected => "BACKEND_REJECTED",
            ErrorCode::BackendUnavailable => "BACKEND_UNAVAILABLE",
            ErrorCode::ProtocolViolation => "PROTOCOL_VIOLATION",
            ErrorCode::ContextSuperseded => "CONTEXT_SUPERSEDED",
        };
        write!(f, "{}", s)
    }
}

impl From<&ValidationError> for ErrorCode {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::OutOfRange { .. } => ErrorCode::OutOfRange,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        }
    }
}
