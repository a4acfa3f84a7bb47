//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the session controller and the outside world. Adapters implement these ports.
//!
//! - `BackendClient` - The shop-floor session service
//! - `Stopwatch` - Elapsed-time counter for the running session
//! - `SessionPresenter` - Notices and view snapshots for the operator
//! - `ExitConfirmation` - Prompt shown before leaving a running session

mod backend_client;
mod presenter;
mod stopwatch;

pub use backend_client::{BackendClient, BackendError, StartSessionRequest};
pub use presenter::{ExitConfirmation, SessionPresenter};
pub use stopwatch::{format_elapsed, Stopwatch};
