//! Offline inspection of captured cube traffic.
//!
//! Reads a notification stream written as hex (see [`capture`]) and runs it
//! through the same reassembly, framing, payload decoding and orientation
//! smoothing a live device uses, reporting what came out and what was
//! rejected.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod capture;
pub mod replay;

pub use capture::{CaptureError, parse_capture};
pub use replay::{Replay, ReplaySummary, replay};
