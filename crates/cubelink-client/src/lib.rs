//! Async client for a BLE smart cube.
//!
//! [`CubeDevice`] drives the Sans-IO session from `cubelink-core` over any
//! [`Transport`], decodes the notification stream, keeps the move log and
//! last-known values, and publishes [`CubeEvent`]s on a broadcast channel.
//!
//! ## Architecture
//!
//! ```text
//! Transport --TransportEvent--> CubeDevice::handle_transport_event
//!                                 ├─ StreamReassembler -> Frame -> Payload
//!                                 ├─ Session (lifecycle, reconnect policy)
//!                                 ├─ OrientationPipeline
//!                                 └─ broadcast::Sender<CubeEvent>
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod device;
mod error;
mod event;
mod system_env;
mod transport;

pub use device::{CubeDevice, EVENT_CHANNEL_CAPACITY};
pub use error::DeviceError;
pub use event::{CubeEvent, FrameStats};
pub use system_env::SystemEnv;
pub use transport::{LinkStatus, Transport, TransportError, TransportEvent};
