//! Protocol error types.
//!
//! Two layers fail independently:
//!
//! - [`ProtocolError`]: the frame envelope is malformed. The stream layer
//!   resynchronizes past these.
//! - [`PayloadError`]: the envelope is fine but its contents are not. These
//!   are reported per message and never tear down the connection.

use thiserror::Error;

/// Frame envelope errors.
///
/// [`Frame::decode`](crate::Frame::decode) runs its checks in the order the
/// variants are listed; the first failing check is the one reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Fewer bytes than the smallest possible frame.
    #[error("message too short: {length} bytes (minimum {minimum})")]
    MessageTooShort {
        /// Bytes received.
        length: usize,
        /// Minimum frame size.
        minimum: usize,
    },

    /// First byte is not the frame prefix.
    #[error("invalid prefix: expected 0x2a, found {found:#04x}")]
    InvalidPrefix {
        /// Byte found where the prefix should be.
        found: u8,
    },

    /// Last two bytes are not the frame suffix.
    #[error("invalid suffix: expected 0d0a, found {:02x}{:02x}", .found[0], .found[1])]
    InvalidSuffix {
        /// Bytes found where the suffix should be.
        found: [u8; 2],
    },

    /// Buffer length disagrees with the length byte.
    #[error("payload length mismatch: length byte implies {expected} bytes, got {actual}")]
    PayloadLengthMismatch {
        /// Total frame size implied by the length byte.
        expected: usize,
        /// Bytes actually supplied.
        actual: usize,
    },

    /// Additive checksum does not match.
    #[error("checksum mismatch: expected {expected:#04x}, received {received:#04x}")]
    ChecksumMismatch {
        /// Checksum computed over the frame.
        expected: u8,
        /// Checksum byte carried in the frame.
        received: u8,
    },

    /// Type byte is not a known message type.
    #[error("unknown message type: {0:#04x}")]
    UnknownMessageType(u8),

    /// Payload does not fit the one-byte length field.
    #[error("payload too large: {size} bytes (maximum {max})")]
    PayloadTooLarge {
        /// Payload size requested.
        size: usize,
        /// Largest encodable payload.
        max: usize,
    },
}

impl ProtocolError {
    /// Framing errors only ever affect a single frame.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::PayloadTooLarge { .. })
    }
}

/// Payload content errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Rotation payload carried no moves.
    #[error("empty move payload")]
    EmptyMovePayload,

    /// Rotation payload is not made of `(code, center)` pairs.
    #[error("move payload length must be even, got {length}")]
    OddMovePayloadLength {
        /// Payload length in bytes.
        length: usize,
    },

    /// Move code outside `0x00..=0x0B`.
    #[error("invalid move code {code:#04x} at offset {offset}")]
    InvalidMoveCode {
        /// Offending code.
        code: u8,
        /// Byte offset within the payload.
        offset: usize,
    },

    /// Payload has the wrong fixed size.
    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    PayloadLengthMismatch {
        /// Required length.
        expected: usize,
        /// Length received.
        actual: usize,
    },

    /// Sticker byte outside the six legal colors.
    #[error("invalid color value {value} at position {position}")]
    InvalidColorValue {
        /// Offending byte.
        value: u8,
        /// Absolute sticker position within the payload.
        position: usize,
    },

    /// Orientation payload is empty or not text.
    #[error("invalid quaternion format: {reason}")]
    InvalidQuaternionFormat {
        /// Description of the problem.
        reason: String,
    },

    /// Orientation text does not have four `#`-separated parts.
    #[error("quaternion must have 4 components, got {count}")]
    InvalidQuaternionComponentCount {
        /// Number of components found.
        count: usize,
    },

    /// One orientation component is not a finite number.
    #[error("invalid quaternion component {index}: {text:?}")]
    InvalidQuaternionComponent {
        /// Zero-based component index (x, y, z, w).
        index: usize,
        /// Raw component text.
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_errors_are_recoverable() {
        assert!(ProtocolError::InvalidPrefix { found: 0xff }.is_recoverable());
        assert!(ProtocolError::UnknownMessageType(0x04).is_recoverable());
        assert!(!ProtocolError::PayloadTooLarge { size: 300, max: 254 }.is_recoverable());
    }

    #[test]
    fn error_display() {
        insta::assert_snapshot!(
            ProtocolError::ChecksumMismatch { expected: 0x86, received: 0xff }.to_string(),
            @"checksum mismatch: expected 0x86, received 0xff"
        );
        insta::assert_snapshot!(
            ProtocolError::InvalidSuffix { found: [0x0d, 0x00] }.to_string(),
            @"invalid suffix: expected 0d0a, found 0d00"
        );
        insta::assert_snapshot!(
            PayloadError::InvalidColorValue { value: 6, position: 10 }.to_string(),
            @"invalid color value 6 at position 10"
        );
    }
}
