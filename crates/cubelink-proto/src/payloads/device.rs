//! Small device payloads: battery, cube type, offline statistics.

use crate::{cube::CubeType, errors::PayloadError};

/// Highest battery percentage; larger readings are clamped to it.
pub const MAX_BATTERY_PERCENT: u8 = 100;

fn single_byte(payload: &[u8]) -> Result<u8, PayloadError> {
    match payload {
        [value] => Ok(*value),
        _ => Err(PayloadError::PayloadLengthMismatch { expected: 1, actual: payload.len() }),
    }
}

/// Decode a battery payload, clamping to 100%.
pub fn decode_battery(payload: &[u8]) -> Result<u8, PayloadError> {
    single_byte(payload).map(|value| value.min(MAX_BATTERY_PERCENT))
}

/// Decode a cube-type payload.
pub fn decode_cube_type(payload: &[u8]) -> Result<CubeType, PayloadError> {
    single_byte(payload).map(CubeType::from_u8)
}

/// Offline statistics are passed through as text without interpretation.
pub fn decode_offline_stats(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).trim().to_string()
}
