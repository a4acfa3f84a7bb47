//! Apontamento - Shop-floor work session client
//!
//! Tracks the work sessions ("apontamentos") an operator runs against a
//! manufacturing work order: start, pause and finish with the good quantity
//! produced, with the lifecycle mirrored from the session service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
