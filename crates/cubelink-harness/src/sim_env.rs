//! Simulated environment.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use cubelink_core::Environment;

/// Environment on the tokio clock that records how often it slept.
///
/// Under a paused runtime, time only moves when every task is idle, so
/// timeouts and reconnect delays elapse instantly and deterministically.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    sleeps: Arc<AtomicU64>,
}

impl SimEnv {
    /// Fresh environment with a zeroed sleep counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps started so far, across all clones.
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::Relaxed)
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.sleeps.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(duration)
    }
}
