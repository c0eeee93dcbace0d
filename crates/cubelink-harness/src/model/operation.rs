//! Operations for model-based testing.
//!
//! Operations represent every input the session can see: caller requests,
//! transport lifecycle signals and timer expiry. They are generated randomly
//! and applied to both the model and the real implementation.

use arbitrary::Arbitrary;

/// Inputs that can be applied to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Caller connects to the (single) test device.
    Connect,
    /// Caller disconnects.
    Disconnect,
    /// Transport reports the link up.
    LinkEstablished,
    /// Transport reports a failed connect.
    LinkFailed,
    /// Transport confirms a close.
    LinkClosed,
    /// Transport reports an unexpected drop.
    LinkLost,
    /// Radio powered off.
    RadioLost,
    /// A reconnect timer fires.
    FireTimer {
        /// Fire a timer from an earlier, superseded schedule.
        stale: bool,
    },
    /// Caller asks for a reconnection sequence.
    Retry,
}

/// Result of applying an operation.
///
/// Used to compare model and real system behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation accepted (possibly as a no-op).
    Ok,
    /// Operation refused in the current state.
    Rejected,
}

impl OperationResult {
    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Check if operation failed.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}
