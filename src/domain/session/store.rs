//! SessionStore - the controller's private view of the current session.
//!
//! The store pairs the opened work order with the mirrored lifecycle state
//! and stamps every context with a generation. Responses carry the
//! generation they were issued under; once the context is replaced or
//! cleared, older generations are rejected as `Superseded`.

use std::collections::HashSet;
use std::fmt;

use crate::domain::foundation::{
    OperatorCode, SessionId, SessionLifecycleState, StateMachine,
};
use crate::domain::work_order::{WorkOrder, WorkOrderDetail};

use super::{HistoryRow, SessionError, SessionHistory};

/// Operations that go to the network and can be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionOperation {
    Open,
    Start,
    Pause,
    Finish,
    Refresh,
}

impl fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionOperation::Open => "Open",
            SessionOperation::Start => "Start",
            SessionOperation::Pause => "Pause",
            SessionOperation::Finish => "Finish",
            SessionOperation::Refresh => "Refresh",
        };
        write!(f, "{}", s)
    }
}

/// Monotonic token identifying one controller context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContextGeneration(u64);

impl ContextGeneration {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which session controls may be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub start_enabled: bool,
    pub pause_enabled: bool,
    pub finish_enabled: bool,
}

/// Everything the presentation layer needs to draw the session view.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub work_order: Option<WorkOrder>,
    pub detail: Option<WorkOrderDetail>,
    pub state: SessionLifecycleState,
    pub session_id: Option<SessionId>,
    pub controls: ControlState,
    pub elapsed_secs: u64,
    pub history: Vec<HistoryRow>,
}

/// State tied to the currently opened work order.
#[derive(Debug, Clone)]
pub struct ControllerContext {
    work_order: WorkOrder,
    detail: Option<WorkOrderDetail>,
    session_id: Option<SessionId>,
    state: SessionLifecycleState,
    history: SessionHistory,
}

impl ControllerContext {
    fn new(work_order: WorkOrder) -> Self {
        Self {
            work_order,
            detail: None,
            session_id: None,
            state: SessionLifecycleState::Idle,
            history: SessionHistory::default(),
        }
    }

    pub fn work_order(&self) -> &WorkOrder {
        &self.work_order
    }

    pub fn detail(&self) -> Option<&WorkOrderDetail> {
        self.detail.as_ref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn state(&self) -> SessionLifecycleState {
        self.state
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Started with a known id: the only state pause/finish accept.
    pub fn is_active(&self) -> bool {
        self.state.is_started() && self.session_id.is_some()
    }
}

/// Owner of the operator code and the current controller context.
#[derive(Debug, Default)]
pub struct SessionStore {
    operator: Option<OperatorCode>,
    context: Option<ControllerContext>,
    generation: ContextGeneration,
    in_flight: HashSet<SessionOperation>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn operator(&self) -> Option<&OperatorCode> {
        self.operator.as_ref()
    }

    pub fn context(&self) -> Option<&ControllerContext> {
        self.context.as_ref()
    }

    pub fn generation(&self) -> ContextGeneration {
        self.generation
    }

    pub fn is_current(&self, generation: ContextGeneration) -> bool {
        self.context.is_some() && self.generation == generation
    }

    pub fn state(&self) -> SessionLifecycleState {
        self.context
            .as_ref()
            .map(ControllerContext::state)
            .unwrap_or_default()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.context.as_ref().and_then(ControllerContext::session_id)
    }

    pub fn is_in_flight(&self, op: SessionOperation) -> bool {
        self.in_flight.contains(&op)
    }

    pub fn controls(&self) -> ControlState {
        let Some(ctx) = self.context.as_ref() else {
            return ControlState::default();
        };
        if self.is_in_flight(SessionOperation::Open) {
            return ControlState::default();
        }
        let active = ctx.is_active();
        let stopping =
            self.is_in_flight(SessionOperation::Pause) || self.is_in_flight(SessionOperation::Finish);
        ControlState {
            start_enabled: !active && !self.is_in_flight(SessionOperation::Start),
            pause_enabled: active && !stopping,
            finish_enabled: active && !stopping,
        }
    }

    pub fn view(&self, elapsed_secs: u64) -> SessionView {
        let ctx = self.context.as_ref();
        SessionView {
            work_order: ctx.map(|c| c.work_order.clone()),
            detail: ctx.and_then(|c| c.detail.clone()),
            state: self.state(),
            session_id: self.session_id(),
            controls: self.controls(),
            elapsed_secs,
            history: ctx.map(|c| c.history.rows()).unwrap_or_default(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Context lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_operator(&mut self, operator: OperatorCode) {
        self.operator = Some(operator);
    }

    /// Replaces the context with a fresh `Idle` one for `work_order`.
    pub fn replace(&mut self, work_order: WorkOrder) -> ContextGeneration {
        self.generation = self.generation.next();
        self.in_flight.clear();
        self.context = Some(ControllerContext::new(work_order));
        self.generation
    }

    /// Replaces the context and marks it as loading until `end(Open, ..)`.
    pub fn open(&mut self, work_order: WorkOrder) -> ContextGeneration {
        let generation = self.replace(work_order);
        self.in_flight.insert(SessionOperation::Open);
        generation
    }

    /// Drops the context; responses still in flight become stale.
    pub fn clear(&mut self) {
        self.generation = self.generation.next();
        self.in_flight.clear();
        self.context = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // In-flight tracking
    // ─────────────────────────────────────────────────────────────────────────

    /// Marks `op` as in flight and returns the generation it belongs to.
    ///
    /// # Errors
    ///
    /// - `NoWorkOrder` if no context is open
    /// - `InFlight` naming the pending operation that excludes `op`
    pub fn begin(&mut self, op: SessionOperation) -> Result<ContextGeneration, SessionError> {
        if self.context.is_none() {
            return Err(SessionError::NoWorkOrder);
        }
        if let Some(pending) = Self::excluded_by(op)
            .iter()
            .copied()
            .find(|other| self.in_flight.contains(other))
        {
            return Err(SessionError::InFlight(pending));
        }
        self.in_flight.insert(op);
        Ok(self.generation)
    }

    /// Operations whose pending request keeps `op` from starting.
    ///
    /// Pause and finish both stop the session, so only one of them may be out.
    fn excluded_by(op: SessionOperation) -> &'static [SessionOperation] {
        use SessionOperation as Op;
        match op {
            Op::Open => &[Op::Open],
            Op::Start => &[Op::Open, Op::Start],
            Op::Pause | Op::Finish => &[Op::Open, Op::Pause, Op::Finish],
            Op::Refresh => &[Op::Open, Op::Refresh],
        }
    }

    /// Releases `op` if it still belongs to the current context.
    pub fn end(&mut self, op: SessionOperation, generation: ContextGeneration) {
        if self.generation == generation {
            self.in_flight.remove(&op);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations (all generation-checked)
    // ─────────────────────────────────────────────────────────────────────────

    fn current_mut(
        &mut self,
        generation: ContextGeneration,
    ) -> Result<&mut ControllerContext, SessionError> {
        if self.generation != generation {
            return Err(SessionError::Superseded);
        }
        self.context.as_mut().ok_or(SessionError::Superseded)
    }

    pub fn set_detail(
        &mut self,
        generation: ContextGeneration,
        detail: Option<WorkOrderDetail>,
    ) -> Result<(), SessionError> {
        self.current_mut(generation)?.detail = detail;
        Ok(())
    }

    pub fn set_history(
        &mut self,
        generation: ContextGeneration,
        history: SessionHistory,
    ) -> Result<(), SessionError> {
        self.current_mut(generation)?.history = history;
        Ok(())
    }

    /// Records that a session is running under `id`.
    ///
    /// Used both for a successful start and for adopting an open session
    /// found in the server history.
    pub fn record_started(
        &mut self,
        generation: ContextGeneration,
        id: SessionId,
    ) -> Result<(), SessionError> {
        let ctx = self.current_mut(generation)?;
        ctx.state = ctx
            .state
            .transition_to(SessionLifecycleState::Started)
            .map_err(|_| SessionError::invalid_state("A session is already in progress."))?;
        ctx.session_id = Some(id);
        Ok(())
    }

    /// Records that the running session was paused or finished.
    pub fn record_stopped(&mut self, generation: ContextGeneration) -> Result<(), SessionError> {
        let ctx = self.current_mut(generation)?;
        ctx.state = ctx
            .state
            .transition_to(SessionLifecycleState::Idle)
            .map_err(|_| SessionError::invalid_state("No session in progress."))?;
        ctx.session_id = None;
        Ok(())
    }
}
