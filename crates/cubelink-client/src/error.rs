//! Device error types.

use cubelink_core::{ConfigError, SessionError};
use cubelink_proto::Command;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by [`CubeDevice`](crate::CubeDevice) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    /// The operation needs a connected cube.
    #[error("not connected")]
    NotConnected,

    /// No response arrived within the command timeout.
    #[error("timed out waiting for response to {command}")]
    Timeout {
        /// Command whose response never came.
        command: Command,
    },

    /// The link went down while the operation was in flight.
    #[error("disconnected during operation")]
    Disconnected,

    /// The link did not come up.
    #[error("connection failed: {reason}")]
    ConnectionFailed {
        /// Reason reported by the transport.
        reason: String,
    },

    /// The link did not come up within the scan timeout.
    #[error("connection timed out")]
    ConnectTimeout,

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Operation not valid in the current session state.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DeviceError {
    /// Returns true if retrying on this device cannot succeed.
    ///
    /// Radio errors and invalid configuration are fatal. Timeouts and link
    /// drops are transient.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_fatal(),
            Self::Session(e) => e.is_fatal(),
            Self::Config(_) => true,
            Self::NotConnected
            | Self::Timeout { .. }
            | Self::Disconnected
            | Self::ConnectionFailed { .. }
            | Self::ConnectTimeout => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use cubelink_core::RadioError;

    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(DeviceError::Transport(TransportError::Radio(RadioError::Unauthorized)).is_fatal());
        assert!(!DeviceError::Transport(TransportError::WriteFailed("busy".into())).is_fatal());
        assert!(!DeviceError::Timeout { command: Command::GetBattery }.is_fatal());
        assert!(DeviceError::Config(ConfigError::ZeroPollInterval).is_fatal());
    }

    #[test]
    fn timeout_names_command() {
        let err = DeviceError::Timeout { command: Command::GetState };
        assert_eq!(err.to_string(), "timed out waiting for response to get-state");
    }
}
