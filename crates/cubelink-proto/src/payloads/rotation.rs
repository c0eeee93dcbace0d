//! Rotation payloads: `(code, center_orientation)` byte pairs.
//!
//! `code = face_index << 1 | ccw`, so twelve codes (`0x00..=0x0B`) cover
//! every face in both directions.

use crate::{
    cube::{CubeFace, Direction, Move},
    errors::PayloadError,
};

/// Highest valid move code.
pub const MAX_MOVE_CODE: u8 = 0x0B;

/// Encode the code byte for a face turn.
pub fn move_code(face: CubeFace, direction: Direction) -> u8 {
    let ccw = u8::from(direction == Direction::CounterClockwise);
    (face.protocol_index() << 1) | ccw
}

/// Decode a rotation payload into moves, in wire order.
pub fn decode_moves(payload: &[u8]) -> Result<Vec<Move>, PayloadError> {
    if payload.is_empty() {
        return Err(PayloadError::EmptyMovePayload);
    }
    if payload.len() % 2 != 0 {
        return Err(PayloadError::OddMovePayloadLength { length: payload.len() });
    }

    payload
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| decode_move(pair[0], pair[1], i * 2))
        .collect()
}

fn decode_move(code: u8, center: u8, offset: usize) -> Result<Move, PayloadError> {
    if code > MAX_MOVE_CODE {
        return Err(PayloadError::InvalidMoveCode { code, offset });
    }

    let face = CubeFace::from_protocol_index(code >> 1)
        .ok_or(PayloadError::InvalidMoveCode { code, offset })?;
    let direction =
        if code & 1 == 1 { Direction::CounterClockwise } else { Direction::Clockwise };

    Ok(Move::with_center_orientation(face, direction, center))
}

/// Encode one move. A missing center orientation is sent as `0`.
pub fn encode_move(mv: &Move) -> [u8; 2] {
    [move_code(mv.face(), mv.direction()), mv.center_orientation().unwrap_or(0)]
}

/// Encode a rotation payload.
pub fn encode_moves(moves: &[Move]) -> Vec<u8> {
    moves.iter().flat_map(encode_move).collect()
}
