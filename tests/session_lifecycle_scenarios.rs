//! End-to-end session scenarios against the in-memory backend.
//!
//! These tests drive the controller the way an operator would:
//! 1. Start, time and finish a session
//! 2. Resume a session left open on the server, then pause it
//! 3. Recover from an open-session conflict
//! 4. Keep the local state a mirror of the server across random sequences

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Local};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use apontamento::adapters::memory::{BackendCall, InMemoryBackend};
use apontamento::adapters::{ManualStopwatch, RecordingPresenter, ScriptedConfirmation};
use apontamento::application::SessionController;
use apontamento::domain::foundation::{
    CompanyId, FloorTimestamp, OperatorCode, SessionId, SessionLifecycleState, WorkOrderId,
};
use apontamento::domain::session::{GoodQuantity, Session, SessionProgress, Severity};
use apontamento::domain::work_order::WorkOrder;
use apontamento::ports::{BackendError, Stopwatch};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Floor {
    controller: SessionController,
    backend: InMemoryBackend,
    clock: Arc<ManualStopwatch>,
    presenter: RecordingPresenter,
}

fn order(id: &str) -> WorkOrder {
    WorkOrder::new(WorkOrderId::new(id).unwrap(), CompanyId::new("1").unwrap())
        .with_quantities(100.0, 0.0)
}

fn floor(backend: InMemoryBackend) -> Floor {
    let clock = Arc::new(ManualStopwatch::new());
    let presenter = RecordingPresenter::new();
    let controller = SessionController::new(
        Arc::new(backend.clone()),
        clock.clone(),
        Arc::new(presenter.clone()),
        Arc::new(ScriptedConfirmation::always(true)),
    );
    controller.set_operator("77").unwrap();
    Floor {
        controller,
        backend,
        clock,
        presenter,
    }
}

fn open_on_server(order: &str, id: i64, started_secs_ago: i64) -> Session {
    let started = Local::now().naive_local() - ChronoDuration::seconds(started_secs_ago);
    Session::reconstitute(
        SessionId::new(id),
        Some(WorkOrderId::new(order).unwrap()),
        Some(OperatorCode::new("77").unwrap()),
        Some(FloorTimestamp::from_naive(started)),
        None,
        None,
        None,
    )
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn operator_times_and_finishes_a_session() {
    let floor = floor(InMemoryBackend::new());

    floor.controller.open(order("OF-1")).await.unwrap();
    assert!(floor.controller.snapshot().controls.start_enabled);

    let id = floor.controller.start().await.unwrap();
    floor.clock.advance(42);
    let view = floor.controller.snapshot();
    assert_eq!(view.state, SessionLifecycleState::Started);
    assert_eq!(view.elapsed_secs, 42);
    assert!(view.controls.pause_enabled && view.controls.finish_enabled);
    assert!(!view.controls.start_enabled);

    floor.controller.finish_with_input("15").await.unwrap();

    let view = floor.controller.snapshot();
    assert_eq!(view.state, SessionLifecycleState::Idle);
    assert_eq!(view.elapsed_secs, 0);
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].id, id.to_string());
    assert_eq!(view.history[0].quantity, "15");
    assert_eq!(view.history[0].progress, SessionProgress::Finished);
    assert_eq!(
        floor.presenter.last_notice().unwrap().message,
        format!("Session {} finished with quantity 15.", id)
    );
}

#[tokio::test]
async fn session_left_open_is_resumed_then_paused() {
    let backend = InMemoryBackend::new().with_session(open_on_server("OF-2", 7, 90));
    let floor = floor(backend);

    let state = floor.controller.open(order("OF-2")).await.unwrap();

    assert_eq!(state, SessionLifecycleState::Started);
    assert_eq!(floor.controller.session_id(), Some(SessionId::new(7)));
    assert!(floor.clock.is_running());
    let elapsed = floor.clock.elapsed_secs();
    assert!((90..120).contains(&elapsed), "elapsed {}", elapsed);

    floor.controller.pause().await.unwrap();

    assert_eq!(floor.controller.state(), SessionLifecycleState::Idle);
    assert!(!floor.clock.is_running());
    let sessions = floor.backend.sessions_for(&WorkOrderId::new("OF-2").unwrap());
    assert!(sessions[0].ended_at().is_some());
    assert!(sessions[0].good_quantity().is_none());
    assert_eq!(floor.backend.calls_of(BackendCall::Start), 0);
}

#[tokio::test]
async fn conflict_is_a_warning_and_start_stays_available() {
    let backend = InMemoryBackend::new().with_failure(
        BackendCall::Start,
        BackendError::rejected(
            "There is already an open session for this work order.",
            Some("APONTAMENTO_ABERTO".to_string()),
        ),
    );
    let floor = floor(backend);
    floor.controller.open(order("OF-3")).await.unwrap();

    assert!(floor.controller.start().await.is_err());

    let view = floor.controller.snapshot();
    assert_eq!(view.state, SessionLifecycleState::Idle);
    assert!(view.controls.start_enabled);
    let notice = floor.presenter.last_notice().unwrap();
    assert_eq!(notice.severity, Severity::Warning);
    assert_eq!(
        notice.message,
        "There is already an open session for this work order."
    );
    assert!(!floor.clock.is_running());

    floor.controller.start().await.unwrap();
    assert_eq!(floor.controller.state(), SessionLifecycleState::Started);
}

#[tokio::test]
async fn leaving_keeps_server_session_for_next_open() {
    let floor = floor(InMemoryBackend::new());
    floor.controller.open(order("OF-4")).await.unwrap();
    let id = floor.controller.start().await.unwrap();

    assert!(floor.controller.leave().await);
    assert!(floor.controller.snapshot().work_order.is_none());
    assert!(!floor.clock.is_running());

    floor.controller.open(order("OF-4")).await.unwrap();
    assert_eq!(floor.controller.session_id(), Some(id));
    assert_eq!(floor.backend.calls_of(BackendCall::Start), 1);
}

// =============================================================================
// Mirror property
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Open,
    Start,
    Pause,
    Finish(u16),
    Leave,
    Refresh,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Open),
        3 => Just(Op::Start),
        2 => Just(Op::Pause),
        2 => (0u16..500).prop_map(Op::Finish),
        1 => Just(Op::Leave),
        1 => Just(Op::Refresh),
    ]
}

async fn run(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let floor = floor(InMemoryBackend::new());
    let order_id = WorkOrderId::new("OF-P").unwrap();

    for op in ops {
        let had_context = floor.controller.snapshot().work_order.is_some();
        let was_started = floor.controller.state().is_started();
        let starts_before = floor.backend.calls_of(BackendCall::Start);

        let _ = match op.clone() {
            Op::Open => floor.controller.open(order("OF-P")).await.map(|_| ()),
            Op::Start => floor.controller.start().await.map(|_| ()),
            Op::Pause => floor.controller.pause().await,
            Op::Finish(q) => {
                floor
                    .controller
                    .finish(GoodQuantity::new(f64::from(q)).unwrap())
                    .await
            }
            Op::Leave => {
                floor.controller.leave().await;
                Ok(())
            }
            Op::Refresh => floor.controller.refresh().await,
        };

        let starts_after = floor.backend.calls_of(BackendCall::Start);
        if !had_context || was_started || !matches!(op, Op::Start) {
            prop_assert_eq!(starts_after, starts_before, "unexpected start on {:?}", op);
        }

        let open: Vec<Session> = floor
            .backend
            .sessions_for(&order_id)
            .into_iter()
            .filter(Session::is_open)
            .collect();
        prop_assert!(open.len() <= 1);

        let view = floor.controller.snapshot();
        let started = view.state.is_started();
        prop_assert_eq!(floor.clock.is_running(), started);
        if view.work_order.is_some() {
            prop_assert_eq!(started, !open.is_empty(), "after {:?}", op);
            prop_assert_eq!(view.session_id, open.first().map(Session::id));
            prop_assert_eq!(view.controls.start_enabled, !started);
            prop_assert_eq!(view.controls.pause_enabled, started);
            prop_assert_eq!(view.controls.finish_enabled, started);
        } else {
            prop_assert!(!started);
            prop_assert!(!view.controls.start_enabled);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn local_state_mirrors_server(ops in prop::collection::vec(op(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run(ops))?;
    }
}
