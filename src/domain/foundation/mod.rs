//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the shop-floor session domain.

mod errors;
mod ids;
mod lifecycle_state;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{CompanyId, OperatorCode, SessionId, WorkOrderId};
pub use lifecycle_state::SessionLifecycleState;
pub use state_machine::StateMachine;
pub use timestamp::{FloorTimestamp, FLOOR_TIME_FORMAT};
