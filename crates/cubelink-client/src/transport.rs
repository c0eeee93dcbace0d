//! Transport seam.
//!
//! The radio stack (scanning, connecting, service discovery) lives outside
//! this crate. A [`Transport`] exposes just enough of it: open a link, close
//! it, and write command bytes. Everything the cube sends back arrives as
//! [`TransportEvent`]s fed to
//! [`CubeDevice::handle_transport_event`](crate::CubeDevice::handle_transport_event).

use async_trait::async_trait;
use bytes::Bytes;
use cubelink_core::{DeviceId, RadioError};
use thiserror::Error;

/// Result of [`Transport::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// The link is up and notifications are subscribed.
    Established,
    /// The request was accepted; the outcome will arrive as
    /// [`TransportEvent::Established`] or [`TransportEvent::Failed`].
    Pending,
}

/// Events pushed by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Raw notification bytes, arbitrarily chunked.
    Data(Bytes),
    /// A pending connection came up.
    Established,
    /// A pending connection could not be made.
    Failed(String),
    /// The link dropped without being asked to.
    Lost(String),
    /// The radio became unusable.
    RadioUnavailable(RadioError),
}

/// Transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No cube with this identifier was found.
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    /// The cube does not expose the expected service.
    #[error("service not found")]
    ServiceNotFound,

    /// The service lacks the command or notification characteristic.
    #[error("characteristic not found: {0}")]
    CharacteristicNotFound(&'static str),

    /// Writing to the command characteristic failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Connecting failed for a transport-specific reason.
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// The radio is not usable.
    #[error(transparent)]
    Radio(#[from] RadioError),
}

impl TransportError {
    /// Radio errors end the session; everything else is per-operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Radio(_))
    }
}

/// Link to one cube.
///
/// Implementations are internally synchronized; the device serializes
/// lifecycle calls but may write commands concurrently with them.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Connect to `device` and subscribe to its notifications.
    async fn connect(&self, device: &DeviceId) -> Result<LinkStatus, TransportError>;

    /// Close the current link. Returns once it is closed.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Write raw bytes to the command characteristic.
    async fn write(&self, data: &[u8]) -> Result<(), TransportError>;
}
