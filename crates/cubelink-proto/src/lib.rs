//! Cubelink wire protocol
//!
//! Everything needed to speak the cube's notification protocol, without any
//! I/O:
//!
//! - [`Frame`]: one checksum-framed message, with [`Frame::decode`] and
//!   [`Frame::encode`]
//! - [`Command`]: the single-byte outbound commands
//! - Domain types: [`Move`], [`MoveSequence`], [`CubeState`], [`CubeFace`],
//!   [`CubeColor`], [`CubeType`]
//! - [`Payload`]: typed view of a frame's payload, one variant per message
//!   type, backed by the decoders in [`payloads`]
//!
//! # Wire format
//!
//! ```text
//! +--------+-----+------+-------------+----------+-----------+
//! | PREFIX | LEN | TYPE | PAYLOAD     | CHECKSUM | SUFFIX    |
//! | 0x2A   | 1B  | 1B   | LEN-1 bytes | 1B       | 0x0D 0x0A |
//! +--------+-----+------+-------------+----------+-----------+
//! ```
//!
//! `LEN` counts `TYPE` and `PAYLOAD`. The checksum is the sum of every byte
//! before it, modulo 256.
//!
//! Commands travel the other way as a bare byte with no framing.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod cube;
pub mod errors;
pub mod frame;
pub mod payloads;

pub use command::{Command, build_command};
pub use cube::{
    CubeColor, CubeFace, CubeShapeError, CubeState, CubeType, Direction, Move, MoveSequence,
    ParseMoveError,
};
pub use cubelink_math::Quaternion;
pub use errors::{PayloadError, ProtocolError};
pub use frame::{Frame, MIN_FRAME_SIZE, MessageType, PREFIX, SUFFIX, checksum};
pub use payloads::Payload;
