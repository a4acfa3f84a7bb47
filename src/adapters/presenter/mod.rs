//! Presenter adapters.
//!
//! - `ConsolePresenter` / `ConsoleConfirmation` - stdout and stdin
//! - `RecordingPresenter` / `ScriptedConfirmation` - in-memory doubles

mod console;
mod recording;

pub use console::{ConsoleConfirmation, ConsolePresenter};
pub use recording::{RecordingPresenter, ScriptedConfirmation};
