//! Frame envelope: prefix, length, type, payload, checksum, suffix.

use bytes::{BufMut, Bytes, BytesMut};

use crate::errors::ProtocolError;

/// First byte of every frame (`*`).
pub const PREFIX: u8 = 0x2A;

/// Last two bytes of every frame (`\r\n`).
pub const SUFFIX: [u8; 2] = [0x0D, 0x0A];

/// Prefix, length, type, checksum and suffix with an empty payload.
pub const MIN_FRAME_SIZE: usize = 5;

/// Bytes in a frame that `LEN` does not count.
pub const ENVELOPE_OVERHEAD: usize = 5;

/// Largest payload the one-byte `LEN` field can describe (`LEN` includes the
/// type byte).
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize - 1;

/// Notification message types sent by the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// One or more face rotations.
    Rotation = 0x01,
    /// Full 54-sticker state.
    State = 0x02,
    /// Orientation quaternion as ASCII text.
    Orientation = 0x03,
    /// Battery percentage.
    Battery = 0x05,
    /// Offline statistics as ASCII text.
    OfflineStats = 0x07,
    /// Hardware variant.
    CubeType = 0x08,
}

impl MessageType {
    /// Map a type byte to a known message type.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Rotation),
            0x02 => Some(Self::State),
            0x03 => Some(Self::Orientation),
            0x05 => Some(Self::Battery),
            0x07 => Some(Self::OfflineStats),
            0x08 => Some(Self::CubeType),
            _ => None,
        }
    }

    /// The type byte on the wire.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Additive checksum: sum of all bytes modulo 256.
///
/// Accumulates in `u32` so the truncation is explicit.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)));
    (sum & 0xFF) as u8
}

/// One validated protocol message.
///
/// `raw` always holds the exact bytes the frame was decoded from (or encoded
/// to), so `Frame::decode(&frame.raw)` yields the same type and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Declared message type.
    pub message_type: MessageType,
    /// Payload bytes (a slice of `raw`).
    pub payload: Bytes,
    /// Complete frame bytes, prefix to suffix.
    pub raw: Bytes,
}

impl Frame {
    /// Build a frame from a type and payload.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` if the payload exceeds [`MAX_PAYLOAD_SIZE`].
    pub fn new(message_type: MessageType, payload: &[u8]) -> Result<Self, ProtocolError> {
        let raw = Self::encode(message_type, payload)?;
        let payload = raw.slice(3..3 + payload.len());
        Ok(Self { message_type, payload, raw })
    }

    /// Encode a frame.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` if the payload exceeds [`MAX_PAYLOAD_SIZE`]. Every
    /// other input produces a well-formed frame.
    pub fn encode(message_type: MessageType, payload: &[u8]) -> Result<Bytes, ProtocolError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let len = payload.len() + 1;
        let mut buf = BytesMut::with_capacity(len + ENVELOPE_OVERHEAD);
        buf.put_u8(PREFIX);
        buf.put_u8(len as u8);
        buf.put_u8(message_type.to_u8());
        buf.put_slice(payload);
        buf.put_u8(checksum(&buf));
        buf.put_slice(&SUFFIX);

        Ok(buf.freeze())
    }

    /// Decode and validate a complete frame.
    ///
    /// Checks run in a fixed order: size, prefix, suffix, length, checksum,
    /// type. The first failure is returned.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Self::from_raw(Bytes::copy_from_slice(bytes))
    }

    /// Like [`Frame::decode`], but keeps `raw` without copying.
    pub fn from_raw(raw: Bytes) -> Result<Self, ProtocolError> {
        let length = raw.len();
        if length < MIN_FRAME_SIZE {
            return Err(ProtocolError::MessageTooShort { length, minimum: MIN_FRAME_SIZE });
        }

        if raw[0] != PREFIX {
            return Err(ProtocolError::InvalidPrefix { found: raw[0] });
        }

        let tail = [raw[length - 2], raw[length - 1]];
        if tail != SUFFIX {
            return Err(ProtocolError::InvalidSuffix { found: tail });
        }

        let expected = usize::from(raw[1]) + ENVELOPE_OVERHEAD;
        if length != expected {
            return Err(ProtocolError::PayloadLengthMismatch { expected, actual: length });
        }

        let checksum_at = length - 3;
        let computed = checksum(&raw[..checksum_at]);
        let received = raw[checksum_at];
        if computed != received {
            return Err(ProtocolError::ChecksumMismatch { expected: computed, received });
        }

        let message_type =
            MessageType::from_u8(raw[2]).ok_or(ProtocolError::UnknownMessageType(raw[2]))?;

        // LEN == 0 passes the length check but leaves no room for a type byte;
        // the checksum then sits at index 2 and the slice below is empty.
        let payload = if checksum_at > 3 { raw.slice(3..checksum_at) } else { Bytes::new() };

        Ok(Self { message_type, payload, raw })
    }

    /// Total size on the wire.
    pub fn wire_len(&self) -> usize {
        self.raw.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hex_literal::hex;
    use proptest::prelude::*;

    use super::*;

    const ROTATION_R: [u8; 8] = hex!("2a 03 01 08 00 36 0d 0a");
    const BATTERY_85: [u8; 7] = hex!("2a 02 05 55 86 0d 0a");

    #[test]
    fn decode_rotation_frame() {
        let frame = Frame::decode(&ROTATION_R).unwrap();
        assert_eq!(frame.message_type, MessageType::Rotation);
        assert_eq!(frame.payload.as_ref(), &[0x08, 0x00]);
        assert_eq!(frame.raw.as_ref(), &ROTATION_R);
    }

    #[test]
    fn encode_matches_wire_bytes() {
        let encoded = Frame::encode(MessageType::Rotation, &[0x08, 0x00]).unwrap();
        insta::assert_snapshot!(hex::encode(&encoded), @"2a03010800360d0a");

        let encoded = Frame::encode(MessageType::Battery, &[85]).unwrap();
        assert_eq!(encoded.as_ref(), &BATTERY_85);
    }

    #[test]
    fn checksum_wraps_modulo_256() {
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
        assert_eq!(checksum(&[0xFF; 300]), ((0xFFu32 * 300) % 256) as u8);
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn checksum_mismatch_reports_both_values() {
        let mut bad = BATTERY_85;
        bad[4] = 0xFF;
        assert_eq!(
            Frame::decode(&bad),
            Err(ProtocolError::ChecksumMismatch { expected: 0x86, received: 0xFF })
        );
    }

    #[test]
    fn too_short_is_checked_first() {
        assert_eq!(
            Frame::decode(&[0x00, 0x01]),
            Err(ProtocolError::MessageTooShort { length: 2, minimum: 5 })
        );
    }

    #[test]
    fn prefix_checked_before_suffix() {
        let mut bad = BATTERY_85;
        bad[0] = 0x00;
        bad[6] = 0x00;
        assert_eq!(Frame::decode(&bad), Err(ProtocolError::InvalidPrefix { found: 0x00 }));
    }

    #[test]
    fn suffix_checked_before_length() {
        let mut bad = BATTERY_85.to_vec();
        bad.pop();
        assert_eq!(Frame::decode(&bad), Err(ProtocolError::InvalidSuffix { found: [0x86, 0x0d] }));
    }

    #[test]
    fn length_mismatch_detected() {
        let mut bad = BATTERY_85;
        bad[1] = 0x03;
        assert_eq!(
            Frame::decode(&bad),
            Err(ProtocolError::PayloadLengthMismatch { expected: 8, actual: 7 })
        );
    }

    #[test]
    fn length_checked_before_checksum() {
        // Wrong length byte also breaks the checksum; length wins.
        let bad = hex!("2a 09 05 55 86 0d 0a");
        assert!(matches!(Frame::decode(&bad), Err(ProtocolError::PayloadLengthMismatch { .. })));
    }

    #[test]
    fn unknown_type_checked_last() {
        let bad = hex!("2a 02 04 00 30 0d 0a");
        assert_eq!(Frame::decode(&bad), Err(ProtocolError::UnknownMessageType(0x04)));
    }

    #[test]
    fn zero_length_byte_is_rejected_as_unknown_type() {
        // 2a 00 | cs=2a | 0d 0a: five bytes, LEN=0, the "type" is the checksum.
        let odd = hex!("2a 00 2a 0d 0a");
        assert_eq!(Frame::decode(&odd), Err(ProtocolError::UnknownMessageType(0x2a)));
    }

    #[test]
    fn empty_payload_roundtrips() {
        let raw = Frame::encode(MessageType::Battery, &[]).unwrap();
        let frame = Frame::decode(&raw).unwrap();
        assert!(frame.payload.is_empty());
        assert_eq!(frame.wire_len(), MIN_FRAME_SIZE + 1);
    }

    #[test]
    fn oversized_payload_rejected() {
        let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(
            Frame::encode(MessageType::OfflineStats, &payload),
            Err(ProtocolError::PayloadTooLarge { size: 255, max: 254 })
        );
        assert!(Frame::encode(MessageType::OfflineStats, &payload[..MAX_PAYLOAD_SIZE]).is_ok());
    }

    fn message_type() -> impl Strategy<Value = MessageType> {
        prop_oneof![
            Just(MessageType::Rotation),
            Just(MessageType::State),
            Just(MessageType::Orientation),
            Just(MessageType::Battery),
            Just(MessageType::OfflineStats),
            Just(MessageType::CubeType),
        ]
    }

    proptest! {
        #[test]
        fn prop_encode_decode_roundtrip(
            message_type in message_type(),
            payload in prop::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
        ) {
            let raw = Frame::encode(message_type, &payload).unwrap();
            let frame = Frame::decode(&raw).unwrap();
            prop_assert_eq!(frame.message_type, message_type);
            prop_assert_eq!(frame.payload.as_ref(), payload.as_slice());
            prop_assert_eq!(frame.raw, raw);
        }

        #[test]
        fn prop_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let _ = Frame::decode(&bytes);
        }
    }
}
