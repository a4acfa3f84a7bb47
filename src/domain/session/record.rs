//! Session record - one tracked work interval against a work order.
//!
//! Records are owned by the server. The client only ever sees them through
//! history listings and never creates one locally.
//!
//! # Invariants
//!
//! - `id` is assigned by the server
//! - a record is open iff `ended_at` is absent
//! - at most one open record per work order (enforced server-side)

use std::fmt;

use crate::domain::foundation::{FloorTimestamp, OperatorCode, SessionId, WorkOrderId};

use super::GoodQuantity;

/// Display status of a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionProgress {
    InProgress,
    Finished,
}

impl fmt::Display for SessionProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionProgress::InProgress => "In progress",
            SessionProgress::Finished => "Finished",
        };
        write!(f, "{}", s)
    }
}

/// A work session ("apontamento") as recorded by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    work_order_id: Option<WorkOrderId>,
    operator_code: Option<OperatorCode>,
    started_at: Option<FloorTimestamp>,
    ended_at: Option<FloorTimestamp>,
    good_quantity: Option<GoodQuantity>,
    integration_error: Option<String>,
}

impl Session {
    /// Creates an open record with only its identity.
    pub fn open(id: SessionId) -> Self {
        Self {
            id,
            work_order_id: None,
            operator_code: None,
            started_at: None,
            ended_at: None,
            good_quantity: None,
            integration_error: None,
        }
    }

    /// Reconstitute a record from a backend listing (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        work_order_id: Option<WorkOrderId>,
        operator_code: Option<OperatorCode>,
        started_at: Option<FloorTimestamp>,
        ended_at: Option<FloorTimestamp>,
        good_quantity: Option<GoodQuantity>,
        integration_error: Option<String>,
    ) -> Self {
        Self {
            id,
            work_order_id,
            operator_code,
            started_at,
            ended_at,
            good_quantity,
            integration_error,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn work_order_id(&self) -> Option<&WorkOrderId> {
        self.work_order_id.as_ref()
    }

    pub fn operator_code(&self) -> Option<&OperatorCode> {
        self.operator_code.as_ref()
    }

    pub fn started_at(&self) -> Option<&FloorTimestamp> {
        self.started_at.as_ref()
    }

    pub fn ended_at(&self) -> Option<&FloorTimestamp> {
        self.ended_at.as_ref()
    }

    pub fn good_quantity(&self) -> Option<GoodQuantity> {
        self.good_quantity
    }

    /// Integration failure reported by the ERP sync, if any.
    pub fn integration_error(&self) -> Option<&str> {
        self.integration_error.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// Returns true while the server has not stamped an end time.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    pub fn progress(&self) -> SessionProgress {
        if self.is_open() {
            SessionProgress::InProgress
        } else {
            SessionProgress::Finished
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(id: i64) -> Session {
        Session::reconstitute(
            SessionId::new(id),
            Some(WorkOrderId::new("OF-1").unwrap()),
            Some(OperatorCode::new("77").unwrap()),
            Some(FloorTimestamp::parse("01/02/2024 08:00:00")),
            Some(FloorTimestamp::parse("01/02/2024 09:00:00")),
            Some(GoodQuantity::new(3.0).unwrap()),
            None,
        )
    }

    #[test]
    fn record_without_end_is_open() {
        let session = Session::open(SessionId::new(7));
        assert!(session.is_open());
        assert_eq!(session.progress(), SessionProgress::InProgress);
    }

    #[test]
    fn record_with_end_is_finished() {
        let session = closed(8);
        assert!(!session.is_open());
        assert_eq!(session.progress(), SessionProgress::Finished);
        assert_eq!(session.good_quantity().unwrap().value(), 3.0);
    }

    #[test]
    fn blank_integration_error_is_ignored() {
        let session = Session::reconstitute(
            SessionId::new(1),
            None,
            None,
            None,
            None,
            None,
            Some("  ".to_string()),
        );
        assert_eq!(session.integration_error(), None);
    }

    #[test]
    fn progress_displays_label() {
        assert_eq!(SessionProgress::Finished.to_string(), "Finished");
        assert_eq!(SessionProgress::InProgress.to_string(), "In progress");
    }
}
