//! State machine trait for lifecycle enums.
//!
//! Lifecycle transitions are validated in one place so the controller can
//! never record a state change the lifecycle does not allow.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their valid transitions and get a validated
/// `transition_to` for free.
///
/// ```ignore
/// let next = SessionLifecycleState::Idle.transition_to(SessionLifecycleState::Started)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lamp {
        Off,
        On,
        Burnt,
    }

    impl StateMachine for Lamp {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Lamp::Off => vec![Lamp::On],
                Lamp::On => vec![Lamp::Off, Lamp::Burnt],
                Lamp::Burnt => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(Lamp::Off.transition_to(Lamp::On), Ok(Lamp::On));
    }

    #[test]
    fn transition_to_reports_both_states_on_failure() {
        let err = Lamp::Off.transition_to(Lamp::Burnt).unwrap_err();
        assert!(err.to_string().contains("Cannot transition from Off to Burnt"));
    }

    #[test]
    fn terminal_state_has_no_transitions() {
        assert!(Lamp::Burnt.is_terminal());
        assert!(!Lamp::On.is_terminal());
    }
}
