//! Stopwatch adapters.
//!
//! - `TickingStopwatch` - Counts on the tokio runtime
//! - `ManualStopwatch` - Advanced explicitly (tests, demos)

mod manual;
mod ticking;

pub use manual::ManualStopwatch;
pub use ticking::{TickingStopwatch, DEFAULT_TICK_INTERVAL};
