//! SessionController - Drives the session lifecycle of one opened work order.
//!
//! The controller mirrors the server's view of a single work order:
//!
//! ```text
//! Idle --start(ok)--> Started --pause(ok)/finish(ok)--> Idle
//! Started --abandon--> (context cleared, local only)
//! ```
//!
//! Failures never move the state. Every request records the context
//! generation it was issued under; a response that comes back after the
//! work order was switched or abandoned is discarded without touching
//! state or showing anything to the operator.
//!
//! The store lock is a plain mutex and is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;

use crate::config::ClockConfig;
use crate::domain::foundation::{OperatorCode, SessionId, SessionLifecycleState};
use crate::domain::session::{
    ContextGeneration, GoodQuantity, Notice, Session, SessionError, SessionOperation,
    SessionStore, SessionView, CONFLICT_NOTICE_DURATION, EXIT_REMINDER_DURATION,
};
use crate::domain::work_order::WorkOrder;
use crate::ports::{
    BackendClient, BackendError, ExitConfirmation, SessionPresenter, StartSessionRequest,
    Stopwatch,
};

const START_FAILED: &str = "Failed to start.";
const PAUSE_FAILED: &str = "Failed to pause.";
const FINISH_FAILED: &str = "Failed to finish.";
const EXIT_PROMPT: &str = "A session is in progress. Leave anyway?";

/// Behaviour switches for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Seed the stopwatch from the server start time when adopting a
    /// running session on open. Otherwise it counts from zero.
    pub anchor_resumed_sessions: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            anchor_resumed_sessions: true,
        }
    }
}

impl From<&ClockConfig> for ControllerOptions {
    fn from(config: &ClockConfig) -> Self {
        Self {
            anchor_resumed_sessions: config.anchor_resumed_sessions,
        }
    }
}

/// Controller for the session view.
pub struct SessionController {
    backend: Arc<dyn BackendClient>,
    stopwatch: Arc<dyn Stopwatch>,
    presenter: Arc<dyn SessionPresenter>,
    confirmation: Arc<dyn ExitConfirmation>,
    options: ControllerOptions,
    store: Mutex<SessionStore>,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        stopwatch: Arc<dyn Stopwatch>,
        presenter: Arc<dyn SessionPresenter>,
        confirmation: Arc<dyn ExitConfirmation>,
    ) -> Self {
        Self {
            backend,
            stopwatch,
            presenter,
            confirmation,
            options: ControllerOptions::default(),
            store: Mutex::new(SessionStore::new()),
        }
    }

    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    fn store(&self) -> MutexGuard<'_, SessionStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Current view of the session screen.
    pub fn snapshot(&self) -> SessionView {
        let elapsed = self.stopwatch.elapsed_secs();
        self.store().view(elapsed)
    }

    pub fn state(&self) -> SessionLifecycleState {
        self.store().state()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.store().session_id()
    }

    pub fn operator(&self) -> Option<OperatorCode> {
        self.store().operator().cloned()
    }

    pub fn generation(&self) -> ContextGeneration {
        self.store().generation()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Records the operator code sent with start requests.
    pub fn set_operator(&self, code: &str) -> Result<OperatorCode, SessionError> {
        let operator = OperatorCode::new(code).map_err(SessionError::from)?;
        self.store().set_operator(operator.clone());
        tracing::info!(operator = %operator, "operator identified");
        Ok(operator)
    }

    /// Opens `order`, replacing any previous context.
    ///
    /// Detail and history failures are reported and leave a degraded view;
    /// they do not fail the open. A session without an end time in the
    /// history is adopted as running. Session actions are refused until
    /// loading completes.
    pub async fn open(&self, order: WorkOrder) -> Result<SessionLifecycleState, SessionError> {
        self.stopwatch.reset();
        let generation = self.store().open(order.clone());
        tracing::info!(work_order = %order.id(), %generation, "work order opened");

        let result = self.load_context(&order, generation).await;
        self.store().end(SessionOperation::Open, generation);

        match result {
            Ok(()) => {
                self.render();
                Ok(self.state())
            }
            Err(SessionError::Superseded) => {
                Err(self.fail(SessionOperation::Open, SessionError::Superseded))
            }
            Err(err) => {
                self.render();
                Err(self.fail(SessionOperation::Open, err))
            }
        }
    }

    /// Starts a session for the open work order.
    pub async fn start(&self) -> Result<SessionId, SessionError> {
        let (generation, request) = self
            .prepare_start()
            .map_err(|e| self.fail(SessionOperation::Start, e))?;
        tracing::debug!(
            work_order = %request.work_order_id,
            operator = %request.operator_code,
            operation_sequence = request.operation_sequence,
            %generation,
            "starting session"
        );

        let outcome = self.backend.start_session(request).await;
        let result = self.complete_start(generation, outcome);
        self.store().end(SessionOperation::Start, generation);

        match result {
            Ok(id) => {
                tracing::info!(session_id = %id, %generation, "session started");
                self.presenter
                    .notify(Notice::success(format!("Session {} started.", id)));
                self.refresh_after(SessionOperation::Start).await;
                Ok(id)
            }
            Err(err) => {
                if !matches!(err, SessionError::Superseded) {
                    self.render();
                }
                Err(self.fail(SessionOperation::Start, err))
            }
        }
    }

    /// Pauses the running session. The server closes the interval; a
    /// later start opens a new session.
    pub async fn pause(&self) -> Result<(), SessionError> {
        let (generation, id) = self
            .prepare_stop(SessionOperation::Pause)
            .map_err(|e| self.fail(SessionOperation::Pause, e))?;

        let outcome = self.backend.pause_session(id).await;
        let result = self.complete_stop(generation, outcome, PAUSE_FAILED);
        self.store().end(SessionOperation::Pause, generation);

        match result {
            Ok(()) => {
                self.stopwatch.pause();
                tracing::info!(session_id = %id, %generation, "session paused");
                self.presenter.notify(Notice::success("Session paused."));
                self.refresh_after(SessionOperation::Pause).await;
                Ok(())
            }
            Err(err) => {
                if !matches!(err, SessionError::Superseded) {
                    self.render();
                }
                Err(self.fail(SessionOperation::Pause, err))
            }
        }
    }

    /// Finishes the running session with the good quantity produced.
    pub async fn finish(&self, quantity: GoodQuantity) -> Result<(), SessionError> {
        let (generation, id) = self
            .prepare_stop(SessionOperation::Finish)
            .map_err(|e| self.fail(SessionOperation::Finish, e))?;

        let outcome = self.backend.finish_session(id, quantity).await;
        let result = self.complete_stop(generation, outcome, FINISH_FAILED);
        self.store().end(SessionOperation::Finish, generation);

        match result {
            Ok(()) => {
                self.stopwatch.reset();
                tracing::info!(session_id = %id, quantity = %quantity, %generation, "session finished");
                self.presenter.notify(Notice::success(format!(
                    "Session {} finished with quantity {}.",
                    id, quantity
                )));
                self.refresh_after(SessionOperation::Finish).await;
                Ok(())
            }
            Err(err) => {
                if !matches!(err, SessionError::Superseded) {
                    self.render();
                }
                Err(self.fail(SessionOperation::Finish, err))
            }
        }
    }

    /// Parses operator input and finishes with it.
    pub async fn finish_with_input(&self, input: &str) -> Result<(), SessionError> {
        let quantity = GoodQuantity::parse(input)
            .map_err(|e| self.fail(SessionOperation::Finish, SessionError::from(e)))?;
        self.finish(quantity).await
    }

    /// Drops the context without telling the server.
    ///
    /// A running session stays open on the server and is adopted again the
    /// next time its work order is opened.
    pub fn abandon(&self) {
        self.stopwatch.reset();
        let left = {
            let mut store = self.store();
            let left = store.context().map(|c| c.work_order().id().clone());
            store.clear();
            left
        };
        if let Some(order) = left {
            tracing::info!(work_order = %order, "work order closed");
        }
        self.render();
    }

    /// Leaves the session view, asking first if a session is running.
    ///
    /// Returns false if the operator chose to stay.
    pub async fn leave(&self) -> bool {
        let running = {
            let store = self.store();
            store
                .context()
                .filter(|c| c.state().is_started())
                .map(|c| c.work_order().id().clone())
        };
        if let Some(order) = running {
            self.presenter.notify(
                Notice::info(format!(
                    "There is a session in progress for work order {}.",
                    order
                ))
                .visible_for(EXIT_REMINDER_DURATION),
            );
            if !self.confirmation.confirm(EXIT_PROMPT).await {
                tracing::debug!(work_order = %order, "leave cancelled");
                return false;
            }
        }
        self.abandon();
        true
    }

    /// Re-fetches the history and redraws. Lifecycle state is untouched.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let (generation, order) = {
            let mut store = self.store();
            let order = store
                .context()
                .map(|c| c.work_order().id().clone())
                .ok_or(SessionError::NoWorkOrder);
            match order {
                Ok(order) => store.begin(SessionOperation::Refresh).map(|g| (g, order)),
                Err(err) => Err(err),
            }
        }
        .map_err(|e| self.fail(SessionOperation::Refresh, e))?;

        let outcome = self.backend.list_sessions(&order).await;
        let result = {
            let mut store = self.store();
            store.end(SessionOperation::Refresh, generation);
            match outcome {
                Ok(history) => store.set_history(generation, history),
                Err(_) if !store.is_current(generation) => Err(SessionError::Superseded),
                Err(err) => Err(SessionError::from(err)),
            }
        };

        if !matches!(result, Err(SessionError::Superseded)) {
            self.render();
        }
        result.map_err(|e| self.fail(SessionOperation::Refresh, e))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Loads detail and history into the context opened as `generation`.
    async fn load_context(
        &self,
        order: &WorkOrder,
        generation: ContextGeneration,
    ) -> Result<(), SessionError> {
        let detail = self
            .backend
            .fetch_work_order_detail(
                order.id(),
                order.company(),
                order.effective_operation_sequence(),
            )
            .await;
        let detail = match detail {
            Ok(detail) => Some(detail),
            Err(_) if !self.store().is_current(generation) => {
                return Err(SessionError::Superseded)
            }
            Err(err) => {
                let err = SessionError::from(err);
                tracing::warn!(work_order = %order.id(), error = %err, "work order detail unavailable");
                self.presenter.notify(Notice::error(format!(
                    "Could not load work order details: {}",
                    err.user_message()
                )));
                None
            }
        };
        self.store().set_detail(generation, detail)?;

        let history = match self.backend.list_sessions(order.id()).await {
            Ok(history) => history,
            Err(_) if !self.store().is_current(generation) => {
                return Err(SessionError::Superseded)
            }
            Err(err) => {
                let err = SessionError::from(err);
                tracing::warn!(work_order = %order.id(), error = %err, "session history unavailable");
                self.presenter.notify(Notice::error(format!(
                    "Could not load session history: {}",
                    err.user_message()
                )));
                return Ok(());
            }
        };

        let running = history.open_session().cloned();
        {
            let mut store = self.store();
            store.set_history(generation, history)?;
            if let Some(session) = running.as_ref() {
                store.record_started(generation, session.id())?;
            }
        }
        if let Some(session) = running.as_ref() {
            self.resume_stopwatch(session);
            tracing::info!(
                work_order = %order.id(),
                session_id = %session.id(),
                "adopted running session"
            );
        }
        Ok(())
    }

    fn prepare_start(&self) -> Result<(ContextGeneration, StartSessionRequest), SessionError> {
        let mut store = self.store();
        let ctx = store.context().ok_or(SessionError::NoWorkOrder)?;
        if store.is_in_flight(SessionOperation::Open) {
            return Err(SessionError::InFlight(SessionOperation::Open));
        }
        if ctx.state().is_started() {
            return Err(SessionError::invalid_state(
                "A session is already in progress for this work order.",
            ));
        }
        let order = ctx.work_order().clone();
        let operator = store.operator().cloned().ok_or(SessionError::OperatorMissing)?;
        let request = StartSessionRequest::for_work_order(&order, &operator);
        let generation = store.begin(SessionOperation::Start)?;
        Ok((generation, request))
    }

    fn complete_start(
        &self,
        generation: ContextGeneration,
        outcome: Result<Option<SessionId>, BackendError>,
    ) -> Result<SessionId, SessionError> {
        let mut store = self.store();
        if !store.is_current(generation) {
            return Err(SessionError::Superseded);
        }
        let id = outcome
            .map_err(|e| SessionError::from(e).with_fallback_message(START_FAILED))?
            .ok_or_else(|| SessionError::protocol("session id missing from start response"))?;
        store.record_started(generation, id)?;
        drop(store);

        self.stopwatch.reset();
        self.stopwatch.start();
        Ok(id)
    }

    fn prepare_stop(
        &self,
        op: SessionOperation,
    ) -> Result<(ContextGeneration, SessionId), SessionError> {
        let mut store = self.store();
        let ctx = store.context().ok_or(SessionError::NoWorkOrder)?;
        if store.is_in_flight(SessionOperation::Open) {
            return Err(SessionError::InFlight(SessionOperation::Open));
        }
        let id = match (ctx.is_active(), ctx.session_id()) {
            (true, Some(id)) => id,
            _ => {
                return Err(SessionError::invalid_state(
                    "No session in progress for this work order.",
                ))
            }
        };
        let generation = store.begin(op)?;
        Ok((generation, id))
    }

    fn complete_stop(
        &self,
        generation: ContextGeneration,
        outcome: Result<(), BackendError>,
        fallback: &str,
    ) -> Result<(), SessionError> {
        let mut store = self.store();
        if !store.is_current(generation) {
            return Err(SessionError::Superseded);
        }
        outcome.map_err(|e| SessionError::from(e).with_fallback_message(fallback))?;
        store.record_stopped(generation)
    }

    /// Seeds the stopwatch for an adopted session.
    fn resume_stopwatch(&self, session: &Session) {
        let offset = if self.options.anchor_resumed_sessions {
            session
                .started_at()
                .and_then(|started| started.seconds_until(&Local::now().naive_local()))
        } else {
            None
        };
        match offset {
            Some(secs) => self.stopwatch.start_at(secs),
            None => self.stopwatch.start(),
        }
    }

    /// Refresh that follows a successful mutation; its failure is reported
    /// but does not undo the mutation.
    async fn refresh_after(&self, op: SessionOperation) {
        if let Err(err) = self.refresh().await {
            tracing::debug!(after = %op, error = %err, "refresh after mutation failed");
        }
    }

    fn render(&self) {
        let view = self.snapshot();
        self.presenter.render(&view);
    }

    /// Logs a failure and shows it to the operator, except for discarded
    /// responses which are only logged.
    fn fail(&self, op: SessionOperation, err: SessionError) -> SessionError {
        match &err {
            SessionError::Superseded => {
                tracing::warn!(operation = %op, "response discarded: work order context was replaced");
                return err;
            }
            SessionError::Transport(detail) => {
                tracing::error!(operation = %op, error = %detail, "backend unavailable");
            }
            SessionError::Conflict { message } => {
                tracing::warn!(operation = %op, %message, "session already open on server");
            }
            other if other.is_local() => {
                tracing::debug!(operation = %op, error = %other, "operation refused");
            }
            other => {
                tracing::warn!(operation = %op, code = %other.code(), error = %other, "operation failed");
            }
        }

        let mut notice = Notice::new(err.severity(), err.user_message());
        if matches!(err, SessionError::Conflict { .. }) {
            notice = notice.visible_for(CONFLICT_NOTICE_DURATION);
        }
        self.presenter.notify(notice);
        err
    }
}
