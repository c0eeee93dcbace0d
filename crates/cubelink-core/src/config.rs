//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Immutable settings fixed when a session is created.
///
/// Nothing mutates a config after construction; changing behavior means
/// building a new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long request/response calls wait for the cached value to update.
    pub command_timeout: Duration,
    /// How long `connect` waits for the link to come up.
    pub scan_timeout: Duration,
    /// Orientation smoothing factor in `[0, 1]`. 0 follows each sample
    /// exactly; values near 1 barely move.
    pub smoothing_factor: f64,
    /// Reconnect after an unexpected link loss.
    pub auto_reconnect: bool,
    /// Reconnection attempts before giving up. 0 means unlimited.
    pub max_reconnect_attempts: u32,
    /// Fixed delay before each reconnection attempt.
    pub reconnect_delay: Duration,
    /// Sampling interval of the response cache while awaiting a reply.
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(5),
            scan_timeout: Duration::from_secs(10),
            smoothing_factor: 0.5,
            auto_reconnect: true,
            max_reconnect_attempts: 3,
            reconnect_delay: Duration::from_secs(2),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl SessionConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            return Err(ConfigError::SmoothingFactor(self.smoothing_factor));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.command_timeout.is_zero() {
            return Err(ConfigError::ZeroCommandTimeout);
        }
        Ok(())
    }
}
