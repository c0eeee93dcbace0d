//! Cubelink Math
//!
//! Rotation math for the orientation stream reported by the cube.
//!
//! # Design
//!
//! All functions in this crate are pure. A [`Quaternion`] is a plain value:
//! it is not normalized on construction, and every operation returns a new
//! value instead of mutating in place. Normalization is an explicit call.
//!
//! Degenerate inputs (zero magnitude) never produce NaN from this crate's own
//! arithmetic; they fall back to the identity rotation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod quaternion;

pub use quaternion::{LERP_THRESHOLD, Quaternion};
