//! TickingStopwatch - Tokio-driven implementation of the `Stopwatch` port.
//!
//! A background task bumps the counter once per tick interval while the
//! stopwatch runs. Pausing or resetting aborts the task; the value lives in
//! a `watch` channel so subscribers see every tick.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `tick_interval` | 1s | Time represented by one counter step |

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::ports::Stopwatch;

/// Default time between counter steps.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Stopwatch that ticks on the tokio runtime.
#[derive(Debug)]
pub struct TickingStopwatch {
    tick_interval: Duration,
    elapsed: Arc<watch::Sender<u64>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Default for TickingStopwatch {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl TickingStopwatch {
    /// Creates a stopped stopwatch at zero.
    pub fn new(tick_interval: Duration) -> Self {
        let (elapsed, _) = watch::channel(0);
        Self {
            tick_interval,
            elapsed: Arc::new(elapsed),
            ticker: Mutex::new(None),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    fn ticker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stop(&self) {
        if let Some(handle) = self.ticker().take() {
            handle.abort();
        }
    }

    fn spawn_ticker(&self, runtime: &Handle) -> JoinHandle<()> {
        let elapsed = Arc::clone(&self.elapsed);
        let period = self.tick_interval;
        runtime.spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                elapsed.send_modify(|secs| *secs += 1);
            }
        })
    }
}

impl Stopwatch for TickingStopwatch {
    fn start(&self) {
        let mut ticker = self.ticker();
        if ticker.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        match Handle::try_current() {
            Ok(runtime) => *ticker = Some(self.spawn_ticker(&runtime)),
            Err(_) => tracing::warn!("stopwatch started outside a tokio runtime; not ticking"),
        }
    }

    fn start_at(&self, offset_secs: u64) {
        self.stop();
        self.elapsed.send_replace(offset_secs);
        self.start();
    }

    fn pause(&self) {
        self.stop();
    }

    fn reset(&self) {
        self.stop();
        self.elapsed.send_replace(0);
    }

    fn elapsed_secs(&self) -> u64 {
        *self.elapsed.borrow()
    }

    fn is_running(&self) -> bool {
        self.ticker().as_ref().is_some_and(|h| !h.is_finished())
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }
}

impl Drop for TickingStopwatch {
    fn drop(&mut self) {
        self.stop();
    }
}
