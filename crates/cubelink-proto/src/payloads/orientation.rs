//! Orientation payloads: ASCII text `x#y#z#w`.

use cubelink_math::Quaternion;

use crate::errors::PayloadError;

/// Component separator in orientation text.
pub const SEPARATOR: char = '#';

/// Decode an orientation payload.
pub fn decode_quaternion(payload: &[u8]) -> Result<Quaternion, PayloadError> {
    let text = std::str::from_utf8(payload).map_err(|e| {
        PayloadError::InvalidQuaternionFormat { reason: format!("payload is not UTF-8: {e}") }
    })?;
    parse_quaternion(text)
}

/// Parse orientation text.
///
/// Empty parts are kept when splitting, so `"1##2#3"` is reported as a bad
/// component rather than silently read as three numbers. Each component may
/// use standard or scientific notation; NaN and infinities are rejected.
pub fn parse_quaternion(text: &str) -> Result<Quaternion, PayloadError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PayloadError::InvalidQuaternionFormat { reason: "empty payload".to_string() });
    }

    let parts: Vec<&str> = text.split(SEPARATOR).collect();
    if parts.len() != 4 {
        return Err(PayloadError::InvalidQuaternionComponentCount { count: parts.len() });
    }

    let mut components = [0.0f64; 4];
    for (index, (slot, raw)) in components.iter_mut().zip(&parts).enumerate() {
        *slot = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| PayloadError::InvalidQuaternionComponent {
                index,
                text: (*raw).to_string(),
            })?;
    }

    let [x, y, z, w] = components;
    Ok(Quaternion::new(x, y, z, w))
}

/// Format orientation text with six decimals per component.
pub fn format_quaternion(q: &Quaternion) -> String {
    format!("{:.6}#{:.6}#{:.6}#{:.6}", q.x, q.y, q.z, q.w)
}

/// Encode an orientation payload.
pub fn encode_quaternion(q: &Quaternion) -> Vec<u8> {
    format_quaternion(q).into_bytes()
}
