//! Events published to subscribers.

use cubelink_core::{DecodeStats, DeviceId, SessionNotice};
use cubelink_proto::{CubeState, CubeType, Move, Quaternion};

/// Everything a subscriber can observe.
#[derive(Debug, Clone, PartialEq)]
pub enum CubeEvent {
    /// Link is up.
    Connected {
        /// Connected cube.
        device: DeviceId,
    },
    /// A connection attempt failed.
    ConnectionFailed {
        /// Transport-supplied reason.
        reason: String,
    },
    /// Link is down. `reason` is `None` after a requested disconnect.
    Disconnected {
        /// Why, if unrequested.
        reason: Option<String>,
    },
    /// A face was turned.
    Move(Move),
    /// Full state arrived.
    StateUpdated(CubeState),
    /// Smoothed, home-relative orientation.
    OrientationUpdated(Quaternion),
    /// Battery percentage, 0 to 100.
    BatteryUpdated(u8),
    /// Hardware variant.
    CubeTypeReceived(CubeType),
    /// Offline statistics text.
    OfflineStats(String),
}

impl From<SessionNotice> for CubeEvent {
    fn from(notice: SessionNotice) -> Self {
        match notice {
            SessionNotice::Connected { device } => Self::Connected { device },
            SessionNotice::ConnectionFailed { reason } => Self::ConnectionFailed { reason },
            SessionNotice::Disconnected { reason } => Self::Disconnected { reason },
        }
    }
}

/// Decode counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames that decoded into a payload.
    pub frames_decoded: u64,
    /// Frames rejected by the codec.
    pub framing_errors: u64,
    /// Frames whose payload failed to decode.
    pub payload_errors: u64,
    /// Bytes skipped while hunting for a frame start.
    pub garbage_bytes: u64,
    /// Spurious prefixes dropped.
    pub resyncs: u64,
}

impl From<DecodeStats> for FrameStats {
    fn from(stats: DecodeStats) -> Self {
        Self {
            frames_decoded: stats.frames_decoded,
            framing_errors: stats.framing_errors,
            payload_errors: stats.payload_errors,
            garbage_bytes: stats.discarded_bytes,
            resyncs: stats.resyncs,
        }
    }
}
