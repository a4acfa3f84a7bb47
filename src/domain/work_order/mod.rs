//! Work order domain module.
//!
//! Work orders are owned by the sequencing backend; this crate only reads
//! them to decide what a session is tracked against.

mod detail;
mod order;

pub use detail::{Material, WorkOrderDetail, NO_POP_LABEL};
pub use order::{DrawingPath, Progress, WorkOrder, DEFAULT_OPERATION_SEQUENCE};
