//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the session controller to external systems:
//! - `http` - The session service over HTTP
//! - `memory` - In-process backend for offline use and tests
//! - `clock` - Stopwatch implementations
//! - `presenter` - Console and recording presenters

pub mod clock;
pub mod http;
pub mod memory;
pub mod presenter;

pub use clock::{ManualStopwatch, TickingStopwatch};
pub use http::HttpBackendClient;
pub use memory::InMemoryBackend;
pub use presenter::{ConsoleConfirmation, ConsolePresenter, RecordingPresenter, ScriptedConfirmation};
