//! Sans-IO core of the cube driver.
//!
//! Everything in this crate is synchronous and deterministic:
//!
//! - [`reassembler`] cuts frames out of a fragmented notification stream.
//! - [`decoder`] turns that stream into typed payloads and counts rejects.
//! - [`orientation`] smooths orientation samples and applies a home pose.
//! - [`session`] runs the connection lifecycle and reconnection policy as an
//!   event-in, actions-out state machine.
//! - [`responses`] caches the last observed value of every request/response
//!   pair for polling correlation.
//!
//! I/O, timers and tasks live in `cubelink-client`; time is reached only
//! through [`env::Environment`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod decoder;
pub mod env;
pub mod error;
pub mod orientation;
pub mod reassembler;
pub mod responses;
pub mod session;

pub use config::SessionConfig;
pub use decoder::{DecodeStats, PayloadDecoder};
pub use env::Environment;
pub use error::{ConfigError, RadioError, SessionError};
pub use orientation::{HomeReference, OrientationPipeline, SmoothingFilter};
pub use reassembler::{ReassemblerStats, StreamReassembler};
pub use responses::{Observed, ResponseCache};
pub use session::{
    ConnectionState, DeviceId, INITIAL_REQUESTS, LogLevel, Session, SessionAction, SessionEvent,
    SessionNotice,
};
