//! Presenter Ports - Outbound notifications and operator prompts.
//!
//! The controller never draws anything itself. It hands snapshots and
//! notices to a `SessionPresenter` and asks an `ExitConfirmation` before
//! leaving a running session.

use async_trait::async_trait;

use crate::domain::session::{Notice, SessionView};

/// Receives everything the operator should see.
pub trait SessionPresenter: Send + Sync {
    /// Shows a transient outcome message.
    fn notify(&self, notice: Notice);

    /// Redraws the session view.
    fn render(&self, view: &SessionView);
}

/// Asks the operator whether to leave while a session is running.
#[async_trait]
pub trait ExitConfirmation: Send + Sync {
    /// Returns true if the operator confirmed.
    async fn confirm(&self, prompt: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_presenter_is_object_safe() {
        fn _accepts_dyn(_presenter: &dyn SessionPresenter) {}
    }

    #[test]
    fn exit_confirmation_is_object_safe() {
        fn _accepts_dyn(_confirm: &dyn ExitConfirmation) {}
    }
}
