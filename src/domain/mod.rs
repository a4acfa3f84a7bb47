//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, lifecycle state, errors)
//! - `work_order` - Work order snapshots and their detail panel
//! - `session` - Session records, history projection and the lifecycle store

pub mod foundation;
pub mod session;
pub mod work_order;
