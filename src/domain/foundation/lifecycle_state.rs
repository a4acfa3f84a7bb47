//! SessionLifecycleState enum for the locally mirrored session state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle of the session tracked for the currently opened work order.
///
/// There is no `Paused` variant: pausing closes the current
/// interval on the server and returns the controller to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionLifecycleState {
    #[default]
    Idle,
    Started,
}

impl SessionLifecycleState {
    /// Returns true while a session is being timed.
    pub fn is_started(&self) -> bool {
        matches!(self, SessionLifecycleState::Started)
    }

    /// Status line shown next to the session controls.
    pub fn status_label(&self) -> &'static str {
        match self {
            SessionLifecycleState::Idle => "Ready to start",
            SessionLifecycleState::Started => "In progress",
        }
    }
}

impl StateMachine for SessionLifecycleState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionLifecycleState::*;
        matches!((self, target), (Idle, Started) | (Started, Idle))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            SessionLifecycleState::Idle => vec![SessionLifecycleState::Started],
            SessionLifecycleState::Started => vec![SessionLifecycleState::Idle],
        }
    }
}

impl fmt::Display for SessionLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionLifecycleState::Idle => "Idle",
            SessionLifecycleState::Started => "Started",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(SessionLifecycleState::default(), SessionLifecycleState::Idle);
    }

    #[test]
    fn idle_can_start() {
        assert!(SessionLifecycleState::Idle.can_transition_to(&SessionLifecycleState::Started));
    }

    #[test]
    fn started_cannot_start_again() {
        let result = SessionLifecycleState::Started.transition_to(SessionLifecycleState::Started);
        assert!(result.is_err());
    }

    #[test]
    fn idle_cannot_go_idle() {
        assert!(!SessionLifecycleState::Idle.can_transition_to(&SessionLifecycleState::Idle));
    }

    #[test]
    fn no_state_is_terminal() {
        assert!(!SessionLifecycleState::Idle.is_terminal());
        assert!(!SessionLifecycleState::Started.is_terminal());
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&SessionLifecycleState::Started).unwrap(),
            "\"started\""
        );
    }

    #[test]
    fn status_labels_match_controls() {
        assert_eq!(SessionLifecycleState::Idle.status_label(), "Ready to start");
        assert_eq!(SessionLifecycleState::Started.status_label(), "In progress");
    }
}
