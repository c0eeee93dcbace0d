//! State payloads: 54 sticker bytes followed by 6 center-orientation bytes.

use crate::{
    cube::{CubeColor, CubeState, FACE_COUNT, STICKER_COUNT, STICKERS_PER_FACE},
    errors::PayloadError,
};

/// Exact size of a state payload.
pub const STATE_PAYLOAD_LEN: usize = STICKER_COUNT + FACE_COUNT;

/// Decode a state payload.
///
/// Sticker bytes are grouped nine per face in protocol face order and must
/// be valid colors. Center-orientation bytes are taken as-is: firmware is
/// expected to send 0/3/6/9, but other values are passed through.
pub fn decode_state(payload: &[u8]) -> Result<CubeState, PayloadError> {
    if payload.len() != STATE_PAYLOAD_LEN {
        return Err(PayloadError::PayloadLengthMismatch {
            expected: STATE_PAYLOAD_LEN,
            actual: payload.len(),
        });
    }

    let mut faces = [[CubeColor::Blue; STICKERS_PER_FACE]; FACE_COUNT];
    for (position, &value) in payload[..STICKER_COUNT].iter().enumerate() {
        let color =
            CubeColor::from_u8(value).ok_or(PayloadError::InvalidColorValue { value, position })?;
        faces[position / STICKERS_PER_FACE][position % STICKERS_PER_FACE] = color;
    }

    let mut centers = [0u8; FACE_COUNT];
    centers.copy_from_slice(&payload[STICKER_COUNT..]);

    Ok(CubeState::new(faces, centers))
}

/// Encode a state payload.
pub fn encode_state(state: &CubeState) -> Vec<u8> {
    let mut out = Vec::with_capacity(STATE_PAYLOAD_LEN);
    out.extend(state.faces().iter().flatten().map(|c| c.to_u8()));
    out.extend_from_slice(state.center_orientations());
    out
}
