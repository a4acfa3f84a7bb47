//! Session-specific error types.
//!
//! Every failure the controller can report falls into one of four groups:
//! local validation (no request was sent), an open-session conflict, any
//! other business rejection, or a transport/decode failure. Conflicts are
//! warnings; everything else is an error.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::ports::BackendError;

use super::{SessionOperation, Severity};

/// Message shown for transport and decode failures.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Could not reach the server. Check the connection and try again.";

/// Session-specific errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Operator input failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No work order is open.
    #[error("No work order selected.")]
    NoWorkOrder,

    /// No operator code has been provided.
    #[error("Operator not identified.")]
    OperatorMissing,

    /// The lifecycle state does not allow the operation.
    #[error("{0}")]
    InvalidState(String),

    /// The same operation is still waiting for its response.
    #[error("{0} request already in progress.")]
    InFlight(SessionOperation),

    /// The server already holds an open session for this work order.
    #[error("{message}")]
    Conflict { message: String },

    /// Any other business rejection.
    #[error("{message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },

    /// Network failure or undecodable response.
    #[error("Backend unavailable: {0}")]
    Transport(String),

    /// The server answered success but broke the response contract.
    #[error("Unexpected server response: {0}")]
    Protocol(String),

    /// The response arrived after the work order context was replaced.
    #[error("Response discarded: work order context was replaced.")]
    Superseded,
}

impl SessionError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SessionError::InvalidState(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        SessionError::Protocol(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::Validation(err) => ErrorCode::from(err),
            SessionError::NoWorkOrder => ErrorCode::WorkOrderNotSelected,
            SessionError::OperatorMissing => ErrorCode::OperatorMissing,
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::InFlight(_) => ErrorCode::OperationInFlight,
            SessionError::Conflict { .. } => ErrorCode::SessionAlreadyOpen,
            SessionError::Rejected { .. } => ErrorCode::BackendRejected,
            SessionError::Transport(_) => ErrorCode::BackendUnavailable,
            SessionError::Protocol(_) => ErrorCode::ProtocolViolation,
            SessionError::Superseded => ErrorCode::ContextSuperseded,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SessionError::Conflict { .. } => Severity::Warning,
            SessionError::Superseded => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// True when the error was raised before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SessionError::Validation(_)
                | SessionError::NoWorkOrder
                | SessionError::OperatorMissing
                | SessionError::InvalidState(_)
                | SessionError::InFlight(_)
        )
    }

    /// Text for the operator. Transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Transport(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Replaces an empty server message with an operation-specific one.
    pub fn with_fallback_message(self, fallback: &str) -> Self {
        match self {
            SessionError::Conflict { message } if message.trim().is_empty() => {
                SessionError::Conflict {
                    message: fallback.to_string(),
                }
            }
            SessionError::Rejected { message, code } if message.trim().is_empty() => {
                SessionError::Rejected {
                    message: fallback.to_string(),
                    code,
                }
            }
            other => other,
        }
    }
}

impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Transport(msg) => SessionError::Transport(msg),
            BackendError::Decode(msg) => SessionError::Transport(format!("malformed response: {}", msg)),
            BackendError::Rejected { message, code } => {
                match code.as_deref().and_then(ErrorCode::from_wire) {
                    Some(ErrorCode::SessionAlreadyOpen) => SessionError::Conflict { message },
                    _ => SessionError::Rejected { message, code },
                }
            }
        }
    }
}
