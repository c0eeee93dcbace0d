//! Production `Environment` backed by the tokio clock.

use std::time::{Duration, Instant};

use cubelink_core::Environment;

/// Environment using tokio time.
///
/// `now()` reads tokio's clock, so paused-time tests see the same clock the
/// sleeps run on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
