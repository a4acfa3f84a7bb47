//! Session history projection for a single work order.

use super::{Session, SessionProgress};

/// Placeholder for empty cells.
const EMPTY_CELL: &str = "-";

/// Shown in the integration column when the ERP sync reported nothing.
const NO_INTEGRATION_ERROR: &str = "OK";

/// All sessions of a work order, in the order the server returned them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionHistory {
    sessions: Vec<Session>,
}

/// One row of the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: String,
    pub operator: String,
    pub started_at: String,
    pub ended_at: String,
    pub quantity: String,
    pub progress: SessionProgress,
    pub integration: String,
}

impl SessionHistory {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// First session without an end stamp, if any.
    pub fn open_session(&self) -> Option<&Session> {
        self.sessions.iter().find(|s| s.is_open())
    }

    /// Projects the sessions into table rows, preserving order.
    pub fn rows(&self) -> Vec<HistoryRow> {
        self.sessions.iter().map(HistoryRow::from).collect()
    }
}

impl From<&Session> for HistoryRow {
    fn from(session: &Session) -> Self {
        let text = |value: Option<String>| value.unwrap_or_else(|| EMPTY_CELL.to_string());
        Self {
            id: session.id().to_string(),
            operator: text(session.operator_code().map(|c| c.to_string())),
            started_at: text(session.started_at().map(|t| t.to_string())),
            ended_at: text(session.ended_at().map(|t| t.to_string())),
            quantity: session
                .good_quantity()
                .map(|q| q.to_string())
                .unwrap_or_else(|| "0".to_string()),
            progress: session.progress(),
            integration: session
                .integration_error()
                .unwrap_or(NO_INTEGRATION_ERROR)
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{FloorTimestamp, OperatorCode, SessionId};
    use crate::domain::session::GoodQuantity;

    fn finished(id: i64, qty: f64) -> Session {
        Session::reconstitute(
            SessionId::new(id),
            None,
            Some(OperatorCode::new("77").unwrap()),
            Some(FloorTimestamp::parse("01/02/2024 08:00:00")),
            Some(FloorTimestamp::parse("01/02/2024 09:00:00")),
            Some(GoodQuantity::new(qty).unwrap()),
            None,
        )
    }

    #[test]
    fn open_session_finds_unfinished_record() {
        let history = SessionHistory::new(vec![
            finished(1, 5.0),
            Session::open(SessionId::new(7)),
        ]);
        assert_eq!(history.open_session().map(|s| s.id()), Some(SessionId::new(7)));
    }

    #[test]
    fn all_finished_has_no_open_session() {
        let history = SessionHistory::new(vec![finished(1, 5.0), finished(2, 1.0)]);
        assert!(history.open_session().is_none());
    }

    #[test]
    fn rows_keep_server_order_and_labels() {
        let history = SessionHistory::new(vec![
            Session::open(SessionId::new(9)),
            finished(3, 15.0),
        ]);
        let rows = history.rows();
        assert_eq!(rows[0].id, "9");
        assert_eq!(rows[0].progress, SessionProgress::InProgress);
        assert_eq!(rows[0].quantity, "0");
        assert_eq!(rows[0].ended_at, "-");
        assert_eq!(rows[1].id, "3");
        assert_eq!(rows[1].progress, SessionProgress::Finished);
        assert_eq!(rows[1].quantity, "15");
        assert_eq!(rows[1].integration, "OK");
    }

    #[test]
    fn empty_history_projects_no_rows() {
        let history = SessionHistory::default();
        assert!(history.is_empty());
        assert!(history.rows().is_empty());
    }
}
