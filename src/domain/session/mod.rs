//! Session domain module.
//!
//! Covers the work-session ("apontamento") records returned by the server,
//! their history projection, the quantity reported on finish, and the
//! store that mirrors the lifecycle of the currently opened work order.

mod errors;
mod history;
mod notice;
mod quantity;
mod record;
mod store;

pub use errors::{SessionError, GENERIC_FAILURE_MESSAGE};
pub use history::{HistoryRow, SessionHistory};
pub use notice::{
    Notice, Severity, CONFLICT_NOTICE_DURATION, DEFAULT_NOTICE_DURATION, EXIT_REMINDER_DURATION,
};
pub use quantity::GoodQuantity;
pub use record::{Session, SessionProgress};
pub use store::{
    ContextGeneration, ControlState, ControllerContext, SessionOperation, SessionStore,
    SessionView,
};
