//! Manually driven stopwatch for tests and deterministic demos.
//!
//! Time only moves when `advance` is called, and only while running.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::watch;

use crate::ports::Stopwatch;

#[derive(Debug)]
pub struct ManualStopwatch {
    elapsed: watch::Sender<u64>,
    running: AtomicBool,
    starts: AtomicUsize,
}

impl Default for ManualStopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualStopwatch {
    pub fn new() -> Self {
        let (elapsed, _) = watch::channel(0);
        Self {
            elapsed,
            running: AtomicBool::new(false),
            starts: AtomicUsize::new(0),
        }
    }

    /// Moves the counter forward by `secs` if running.
    pub fn advance(&self, secs: u64) {
        if self.is_running() {
            self.elapsed.send_modify(|value| *value += secs);
        }
    }

    /// How many times the stopwatch went from stopped to running.
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl Stopwatch for ManualStopwatch {
    fn start(&self) {
        if !self.running.swap(true, Ordering::SeqCst) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn start_at(&self, offset_secs: u64) {
        self.elapsed.send_replace(offset_secs);
        self.start();
    }

    fn pause(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn reset(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.elapsed.send_replace(0);
    }

    fn elapsed_secs(&self) -> u64 {
        *self.elapsed.borrow()
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }
}
