//! In-memory session backend.
//!
//! Behaves like the shop-floor service closely enough to drive the
//! controller offline and in tests:
//!
//! - at most one open session per work order (`APONTAMENTO_ABERTO`)
//! - pause stamps an end time with no quantity
//! - finish stamps an end time and the good quantity
//! - listing returns the newest session first
//!
//! Every call is recorded, and failures or latency can be injected per
//! operation.
//!
//! # Example
//!
//! ```ignore
//! let backend = InMemoryBackend::new()
//!     .with_job(order.clone())
//!     .with_failure(BackendCall::Start, BackendError::transport("down"));
//!
//! assert!(backend.start_session(request).await.is_err());
//! assert_eq!(backend.calls_of(BackendCall::Start), 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::domain::foundation::{
    CompanyId, ErrorCode, FloorTimestamp, OperatorCode, SessionId, WorkOrderId,
};
use crate::domain::session::{GoodQuantity, Session, SessionHistory};
use crate::domain::work_order::{DrawingPath, WorkOrder, WorkOrderDetail};
use crate::ports::{BackendClient, BackendError, StartSessionRequest};

/// Message used for the open-session conflict.
pub const OPEN_SESSION_MESSAGE: &str = "There is already an open session for this work order.";

/// Backend operations, used to target injected failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCall {
    Sequencing,
    Detail,
    Start,
    Pause,
    Finish,
    List,
    Download,
}

/// A recorded call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Sequencing(OperatorCode),
    Detail {
        order: WorkOrderId,
        company: CompanyId,
        operation_sequence: i64,
    },
    Start(StartSessionRequest),
    Pause(SessionId),
    Finish(SessionId, GoodQuantity),
    List(WorkOrderId),
    Download(DrawingPath),
}

impl RecordedCall {
    pub fn kind(&self) -> BackendCall {
        match self {
            RecordedCall::Sequencing(_) => BackendCall::Sequencing,
            RecordedCall::Detail { .. } => BackendCall::Detail,
            RecordedCall::Start(_) => BackendCall::Start,
            RecordedCall::Pause(_) => BackendCall::Pause,
            RecordedCall::Finish(..) => BackendCall::Finish,
            RecordedCall::List(_) => BackendCall::List,
            RecordedCall::Download(_) => BackendCall::Download,
        }
    }
}

#[derive(Debug, Default)]
struct BackendState {
    jobs: Vec<WorkOrder>,
    details: HashMap<WorkOrderId, WorkOrderDetail>,
    sessions: Vec<Session>,
    drawings: HashMap<String, Vec<u8>>,
    next_id: i64,
    omit_next_start_id: bool,
    failures: HashMap<BackendCall, VecDeque<BackendError>>,
    latency: HashMap<BackendCall, Duration>,
    calls: Vec<RecordedCall>,
}

/// In-process implementation of `BackendClient`.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Creates an empty backend. Session ids start at 1.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                next_id: 1,
                ..BackendState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Seeding
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a job to the sequencing list.
    pub fn with_job(self, order: WorkOrder) -> Self {
        self.lock().jobs.push(order);
        self
    }

    /// Registers the detail returned for `order`.
    pub fn with_detail(self, order: WorkOrderId, detail: WorkOrderDetail) -> Self {
        self.lock().details.insert(order, detail);
        self
    }

    /// Seeds a recorded session. The id counter moves past it.
    pub fn with_session(self, session: Session) -> Self {
        {
            let mut state = self.lock();
            state.next_id = state.next_id.max(session.id().value() + 1);
            state.sessions.push(session);
        }
        self
    }

    /// Registers drawing contents served for `path`.
    pub fn with_drawing(self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.lock().drawings.insert(path.into(), bytes.into());
        self
    }

    /// Queues an error returned by the next call of `call`.
    pub fn with_failure(self, call: BackendCall, error: BackendError) -> Self {
        self.fail_next(call, error);
        self
    }

    /// Delays every call of `call` by `latency`.
    pub fn with_latency(self, call: BackendCall, latency: Duration) -> Self {
        self.lock().latency.insert(call, latency);
        self
    }

    /// Queues an error at runtime (see `with_failure`).
    pub fn fail_next(&self, call: BackendCall, error: BackendError) {
        self.lock().failures.entry(call).or_default().push_back(error);
    }

    /// Makes the next successful start answer without a session id.
    pub fn omit_next_start_id(&self) {
        self.lock().omit_next_start_id = true;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls of one kind.
    pub fn calls_of(&self, call: BackendCall) -> usize {
        self.lock().calls.iter().filter(|c| c.kind() == call).count()
    }

    /// Recorded sessions for `order`, in insertion order.
    pub fn sessions_for(&self, order: &WorkOrderId) -> Vec<Session> {
        self.lock()
            .sessions
            .iter()
            .filter(|s| s.work_order_id() == Some(order))
            .cloned()
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Records the call, waits out any latency, then pops an injected failure.
    async fn enter(&self, call: RecordedCall) -> Result<(), BackendError> {
        let kind = call.kind();
        let latency = {
            let mut state = self.lock();
            state.calls.push(call);
            state.latency.get(&kind).copied()
        };
        if let Some(latency) = latency {
            sleep(latency).await;
        }
        match self.lock().failures.get_mut(&kind).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn close_session(
        state: &mut BackendState,
        id: SessionId,
        quantity: Option<GoodQuantity>,
    ) -> Result<(), BackendError> {
        let slot = state
            .sessions
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| BackendError::rejected(format!("Session {} not found.", id), None))?;
        if !slot.is_open() {
            return Err(BackendError::rejected(
                format!("Session {} is already closed.", id),
                None,
            ));
        }
        *slot = Session::reconstitute(
            slot.id(),
            slot.work_order_id().cloned(),
            slot.operator_code().cloned(),
            slot.started_at().cloned(),
            Some(FloorTimestamp::now()),
            quantity,
            None,
        );
        Ok(())
    }
}

#[async_trait]
impl BackendClient for InMemoryBackend {
    async fn fetch_sequencing(&self, operator: &OperatorCode) -> Result<Vec<WorkOrder>, BackendError> {
        self.enter(RecordedCall::Sequencing(operator.clone())).await?;
        Ok(self.lock().jobs.clone())
    }

    async fn fetch_work_order_detail(
        &self,
        order: &WorkOrderId,
        company: &CompanyId,
        operation_sequence: i64,
    ) -> Result<WorkOrderDetail, BackendError> {
        self.enter(RecordedCall::Detail {
            order: order.clone(),
            company: company.clone(),
            operation_sequence,
        })
        .await?;
        Ok(self.lock().details.get(order).cloned().unwrap_or_default())
    }

    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<Option<SessionId>, BackendError> {
        self.enter(RecordedCall::Start(request.clone())).await?;

        let mut state = self.lock();
        let already_open = state
            .sessions
            .iter()
            .any(|s| s.is_open() && s.work_order_id() == Some(&request.work_order_id));
        if already_open {
            return Err(BackendError::rejected(
                OPEN_SESSION_MESSAGE,
                Some(ErrorCode::OPEN_SESSION_WIRE_CODE.to_string()),
            ));
        }

        let id = SessionId::new(state.next_id);
        state.next_id += 1;
        state.sessions.push(Session::reconstitute(
            id,
            Some(request.work_order_id),
            Some(request.operator_code),
            Some(FloorTimestamp::now()),
            None,
            None,
            None,
        ));

        if std::mem::take(&mut state.omit_next_start_id) {
            return Ok(None);
        }
        Ok(Some(id))
    }

    async fn pause_session(&self, id: SessionId) -> Result<(), BackendError> {
        self.enter(RecordedCall::Pause(id)).await?;
        Self::close_session(&mut self.lock(), id, None)
    }

    async fn finish_session(
        &self,
        id: SessionId,
        quantity: GoodQuantity,
    ) -> Result<(), BackendError> {
        self.enter(RecordedCall::Finish(id, quantity)).await?;
        Self::close_session(&mut self.lock(), id, Some(quantity))
    }

    async fn list_sessions(&self, order: &WorkOrderId) -> Result<SessionHistory, BackendError> {
        self.enter(RecordedCall::List(order.clone())).await?;
        let mut sessions = self.sessions_for(order);
        sessions.reverse();
        Ok(SessionHistory::new(sessions))
    }

    async fn download_drawing(
        &self,
        drawing: &DrawingPath,
        destination: &Path,
    ) -> Result<u64, BackendError> {
        self.enter(RecordedCall::Download(drawing.clone())).await?;
        let bytes = self
            .lock()
            .drawings
            .get(drawing.as_str())
            .cloned()
            .ok_or_else(|| BackendError::rejected("File not found.", None))?;
        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|e| BackendError::transport(format!("write {}: {}", destination.display(), e)))?;
        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_id() -> WorkOrderId {
        WorkOrderId::new("OF-1").unwrap()
    }

    fn order() -> WorkOrder {
        WorkOrder::new(order_id(), CompanyId::new("1").unwrap())
    }

    fn start_request() -> StartSessionRequest {
        StartSessionRequest::for_work_order(&order(), &OperatorCode::new("77").unwrap())
    }

    #[tokio::test]
    async fn start_assigns_increasing_ids() {
        let backend = InMemoryBackend::new();
        let first = backend.start_session(start_request()).await.unwrap().unwrap();
        backend.pause_session(first).await.unwrap();
        let second = backend.start_session(start_request()).await.unwrap().unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn second_start_conflicts_while_open() {
        let backend = InMemoryBackend::new();
        backend.start_session(start_request()).await.unwrap();
        let err = backend.start_session(start_request()).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn pause_closes_without_quantity() {
        let backend = InMemoryBackend::new();
        let id = backend.start_session(start_request()).await.unwrap().unwrap();
        backend.pause_session(id).await.unwrap();

        let sessions = backend.sessions_for(&order_id());
        assert!(!sessions[0].is_open());
        assert_eq!(sessions[0].good_quantity(), None);
    }

    #[tokio::test]
    async fn finish_records_quantity() {
        let backend = InMemoryBackend::new();
        let id = backend.start_session(start_request()).await.unwrap().unwrap();
        let qty = GoodQuantity::new(15.0).unwrap();
        backend.finish_session(id, qty).await.unwrap();

        let history = backend.list_sessions(&order_id()).await.unwrap();
        assert_eq!(history.sessions()[0].good_quantity(), Some(qty));
    }

    #[tokio::test]
    async fn closing_twice_is_rejected() {
        let backend = InMemoryBackend::new();
        let id = backend.start_session(start_request()).await.unwrap().unwrap();
        backend.pause_session(id).await.unwrap();
        let err = backend.pause_session(id).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { .. }));
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let backend = InMemoryBackend::new();
        let first = backend.start_session(start_request()).await.unwrap().unwrap();
        backend.pause_session(first).await.unwrap();
        let second = backend.start_session(start_request()).await.unwrap().unwrap();

        let history = backend.list_sessions(&order_id()).await.unwrap();
        assert_eq!(history.sessions()[0].id(), second);
        assert_eq!(history.sessions()[1].id(), first);
    }

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let backend = InMemoryBackend::new()
            .with_failure(BackendCall::List, BackendError::transport("down"));
        assert!(backend.list_sessions(&order_id()).await.is_err());
        assert!(backend.list_sessions(&order_id()).await.is_ok());
        assert_eq!(backend.calls_of(BackendCall::List), 2);
    }

    #[tokio::test]
    async fn omitted_start_id_still_opens_session() {
        let backend = InMemoryBackend::new();
        backend.omit_next_start_id();
        assert_eq!(backend.start_session(start_request()).await.unwrap(), None);
        assert!(backend.sessions_for(&order_id())[0].is_open());
    }

    #[tokio::test]
    async fn seeded_session_moves_id_counter() {
        let backend = InMemoryBackend::new().with_session(Session::reconstitute(
            SessionId::new(7),
            Some(order_id()),
            None,
            None,
            Some(FloorTimestamp::now()),
            None,
            None,
        ));
        let id = backend.start_session(start_request()).await.unwrap().unwrap();
        assert_eq!(id, SessionId::new(8));
    }

    #[tokio::test]
    async fn download_writes_registered_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("part.step");
        let backend = InMemoryBackend::new().with_drawing("eng/part.step", b"STEP".to_vec());

        let written = backend
            .download_drawing(&DrawingPath::new("eng/part.step").unwrap(), &dest)
            .await
            .unwrap();
        assert_eq!(written, 4);
        assert_eq!(std::fs::read(dest).unwrap(), b"STEP");
    }

    #[tokio::test]
    async fn download_of_unknown_drawing_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let backend = InMemoryBackend::new();
        let err = backend
            .download_drawing(
                &DrawingPath::new("missing.step").unwrap(),
                &dir.path().join("x"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Rejected { .. }));
    }
}
