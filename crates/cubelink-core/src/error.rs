//! Core error types.

use thiserror::Error;

use crate::session::ConnectionState;

/// Radio-level failures reported by the host's wireless stack.
///
/// All of them end the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RadioError {
    /// No usable radio on this host.
    #[error("bluetooth unavailable")]
    Unavailable,
    /// The application may not use the radio.
    #[error("bluetooth unauthorized")]
    Unauthorized,
    /// The radio is switched off.
    #[error("bluetooth powered off")]
    PoweredOff,
}

/// Errors from the session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The operation is not valid in the current connection state.
    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        /// State the session was in.
        state: ConnectionState,
        /// Operation that was refused.
        operation: &'static str,
    },

    /// A reconnect was requested but no device has ever been connected.
    #[error("no known device to reconnect to")]
    NoKnownDevice,
}

impl SessionError {
    /// Invalid-state errors come from caller races and are never fatal.
    pub fn is_fatal(&self) -> bool {
        false
    }
}

/// Invalid session configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Smoothing factor outside `[0, 1]` or not finite.
    #[error("smoothing factor must be within [0, 1], got {0}")]
    SmoothingFactor(f64),

    /// Poll interval of zero would spin.
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,

    /// Command timeout of zero would fail every request.
    #[error("command timeout must be non-zero")]
    ZeroCommandTimeout,
}
