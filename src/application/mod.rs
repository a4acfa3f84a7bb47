//! Application layer - Use cases over the domain and ports.
//!
//! - `SessionController` - Lifecycle of the session on the opened work order
//! - `OperatorBoard` - Operator login, job queue and drawing downloads

mod operator_board;
mod session_controller;

pub use operator_board::OperatorBoard;
pub use session_controller::{ControllerOptions, SessionController};
