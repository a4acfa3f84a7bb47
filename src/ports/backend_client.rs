//! Backend Client Port - Interface to the shop-floor session service.
//!
//! Every call resolves to one of three outcomes:
//!
//! - the business payload (`Ok`)
//! - a business rejection carrying the server's message and optional code
//!   (`BackendError::Rejected`)
//! - a transport or decode failure (`BackendError::Transport` /
//!   `BackendError::Decode`)
//!
//! HTTP status codes never short-circuit decoding. A 409 whose JSON body
//! says `success: false, code: "APONTAMENTO_ABERTO"` is a rejection, not a
//! transport failure.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::foundation::{CompanyId, OperatorCode, SessionId, WorkOrderId};
use crate::domain::session::{GoodQuantity, SessionHistory};
use crate::domain::work_order::{DrawingPath, WorkOrder, WorkOrderDetail};

/// Port for the session backend.
///
/// Implementations translate between the wire format and domain types.
/// They must not interpret business codes; that is the controller's job.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Jobs queued for the operator, in queue order.
    async fn fetch_sequencing(&self, operator: &OperatorCode) -> Result<Vec<WorkOrder>, BackendError>;

    /// Routing, materials and documents for one work order operation.
    async fn fetch_work_order_detail(
        &self,
        order: &WorkOrderId,
        company: &CompanyId,
        operation_sequence: i64,
    ) -> Result<WorkOrderDetail, BackendError>;

    /// Opens a session.
    ///
    /// Returns `Ok(None)` when the server reports success but omits the
    /// session id; callers treat that as a protocol failure.
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<Option<SessionId>, BackendError>;

    /// Closes the current interval of a session without a quantity.
    async fn pause_session(&self, id: SessionId) -> Result<(), BackendError>;

    /// Closes a session and records the good quantity produced.
    async fn finish_session(&self, id: SessionId, quantity: GoodQuantity)
        -> Result<(), BackendError>;

    /// All sessions recorded against a work order.
    async fn list_sessions(&self, order: &WorkOrderId) -> Result<SessionHistory, BackendError>;

    /// Streams an engineering drawing to `destination`.
    ///
    /// Returns the number of bytes written.
    async fn download_drawing(
        &self,
        drawing: &DrawingPath,
        destination: &Path,
    ) -> Result<u64, BackendError>;
}

/// Payload for opening a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartSessionRequest {
    #[serde(rename = "of_id")]
    pub work_order_id: WorkOrderId,
    #[serde(rename = "empresa_id")]
    pub company_id: CompanyId,
    pub operator_code: OperatorCode,
    #[serde(rename = "operac")]
    pub operation_sequence: i64,
}

impl StartSessionRequest {
    /// Builds the request for `order`, defaulting the operation sequence.
    pub fn for_work_order(order: &WorkOrder, operator: &OperatorCode) -> Self {
        Self {
            work_order_id: order.id().clone(),
            company_id: order.company().clone(),
            operator_code: operator.clone(),
            operation_sequence: order.effective_operation_sequence(),
        }
    }
}

/// Backend call failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Network failure, timeout or local I/O failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded into the expected envelope.
    #[error("decode error: {0}")]
    Decode(String),

    /// The server answered `success: false`.
    #[error("rejected: {message}")]
    Rejected {
        /// Server message (`error` or `message` field).
        message: String,
        /// Optional machine-readable code.
        code: Option<String>,
    },
}

impl BackendError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a business rejection.
    pub fn rejected(message: impl Into<String>, code: Option<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            code,
        }
    }

    /// Returns the business code, if the server sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the server refused because a session is already open.
    pub fn is_conflict(&self) -> bool {
        self.code() == Some(crate::domain::foundation::ErrorCode::OPEN_SESSION_WIRE_CODE)
    }
}
