//! Stopwatch Port - Elapsed-time counter for the running session.
//!
//! The counter only ever moves forward while running. `pause` keeps the
//! value, `reset` stops and zeroes it. Display code reads the value through
//! a `watch` channel so it never has to poll.

use tokio::sync::watch;

/// Port for the session elapsed-time counter.
pub trait Stopwatch: Send + Sync {
    /// Starts ticking from the current value. No-op if already running.
    fn start(&self);

    /// Seeds the counter with `offset_secs` and starts ticking.
    fn start_at(&self, offset_secs: u64);

    /// Stops ticking and keeps the value.
    fn pause(&self);

    /// Stops ticking and zeroes the value.
    fn reset(&self);

    /// Seconds counted so far.
    fn elapsed_secs(&self) -> u64;

    /// True while the counter is ticking.
    fn is_running(&self) -> bool;

    /// Receiver that observes every change of the elapsed seconds.
    fn subscribe(&self) -> watch::Receiver<u64>;
}

/// Renders seconds as `HH:MM:SS`. Hours keep growing past 99.
pub fn format_elapsed(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
