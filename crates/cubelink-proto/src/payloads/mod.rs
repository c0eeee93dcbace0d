//! Typed payloads, one per notification message type.
//!
//! Each submodule pairs a decoder with the encoder for the inverse direction.
//! Decoders are pure and never look at the frame envelope; [`Payload`]
//! dispatches on the frame's declared type.

pub mod device;
pub mod orientation;
pub mod rotation;
pub mod state;

use cubelink_math::Quaternion;

use crate::{
    cube::{CubeState, CubeType, Move},
    errors::{PayloadError, ProtocolError},
    frame::{Frame, MessageType},
};

/// Decoded contents of a notification frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// One or more moves, in the order they were made.
    Rotation(Vec<Move>),
    /// Full sticker state.
    State(CubeState),
    /// Raw orientation sample.
    Orientation(Quaternion),
    /// Battery percentage, already clamped to 100.
    Battery(u8),
    /// Offline statistics text.
    OfflineStats(String),
    /// Hardware variant.
    CubeType(CubeType),
}

impl Payload {
    /// Decode the payload of a validated frame.
    pub fn decode(frame: &Frame) -> Result<Self, PayloadError> {
        let bytes = frame.payload.as_ref();
        match frame.message_type {
            MessageType::Rotation => rotation::decode_moves(bytes).map(Self::Rotation),
            MessageType::State => state::decode_state(bytes).map(Self::State),
            MessageType::Orientation => {
                orientation::decode_quaternion(bytes).map(Self::Orientation)
            },
            MessageType::Battery => device::decode_battery(bytes).map(Self::Battery),
            MessageType::OfflineStats => Ok(Self::OfflineStats(device::decode_offline_stats(bytes))),
            MessageType::CubeType => device::decode_cube_type(bytes).map(Self::CubeType),
        }
    }

    /// Message type this payload travels under.
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Rotation(_) => MessageType::Rotation,
            Self::State(_) => MessageType::State,
            Self::Orientation(_) => MessageType::Orientation,
            Self::Battery(_) => MessageType::Battery,
            Self::OfflineStats(_) => MessageType::OfflineStats,
            Self::CubeType(_) => MessageType::CubeType,
        }
    }

    /// Encode payload bytes (without the frame envelope).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Rotation(moves) => rotation::encode_moves(moves),
            Self::State(state) => state::encode_state(state),
            Self::Orientation(q) => orientation::encode_quaternion(q),
            Self::Battery(percent) => vec![*percent],
            Self::OfflineStats(text) => text.as_bytes().to_vec(),
            Self::CubeType(kind) => vec![kind.to_u8()],
        }
    }

    /// Wrap the payload in a frame.
    pub fn into_frame(self) -> Result<Frame, ProtocolError> {
        Frame::new(self.message_type(), &self.encode())
    }
}
