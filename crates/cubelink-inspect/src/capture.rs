//! Hex capture files.
//!
//! A capture is the notification byte stream written as hex, one chunk per
//! line or all on one line. Whitespace and `:` separators are ignored and `#`
//! starts a comment running to the end of the line.

use thiserror::Error;

/// Errors from [`parse_capture`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    /// A line held something other than hex digit pairs.
    #[error("line {line}: {source}")]
    InvalidHex {
        /// 1-based line number.
        line: usize,
        /// Underlying decode error.
        #[source]
        source: hex::FromHexError,
    },

    /// No bytes at all after stripping comments.
    #[error("capture contains no bytes")]
    Empty,
}

/// Parse a capture into one byte chunk per non-empty line.
pub fn parse_capture(text: &str) -> Result<Vec<Vec<u8>>, CaptureError> {
    let mut chunks = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let data = line.split('#').next().unwrap_or_default();
        let digits: String =
            data.chars().filter(|c| !c.is_whitespace() && *c != ':').collect();
        if digits.is_empty() {
            continue;
        }
        let bytes = hex::decode(&digits)
            .map_err(|source| CaptureError::InvalidHex { line: index + 1, source })?;
        chunks.push(bytes);
    }

    if chunks.is_empty() {
        return Err(CaptureError::Empty);
    }
    Ok(chunks)
}
