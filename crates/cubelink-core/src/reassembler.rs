//! Stream reassembly.
//!
//! The notification characteristic delivers bytes in whatever chunks the
//! radio stack chooses. [`StreamReassembler`] buffers them and cuts complete
//! frames out of the stream using only the prefix, length byte and suffix.
//! Checksum and type validation are left to [`cubelink_proto::Frame`].
//!
//! # Resynchronization
//!
//! A prefix whose suffix does not sit where the length byte says it should is
//! treated as spurious: exactly that one byte is dropped and the scan
//! restarts. Corruption therefore costs at most the bytes of the damaged
//! frame, never the frames after it.

use bytes::{Bytes, BytesMut};
use cubelink_proto::{MIN_FRAME_SIZE, PREFIX, SUFFIX};

/// Counters describing what the reassembler has thrown away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReassemblerStats {
    /// Complete frames extracted.
    pub frames: u64,
    /// Bytes discarded because no frame could start there.
    pub discarded_bytes: u64,
    /// Prefixes dropped because the suffix was missing.
    pub resyncs: u64,
}

/// Accumulates a fragmented byte stream and yields complete raw frames.
///
/// Not synchronized. One instance per connection, driven from one task.
#[derive(Debug, Default)]
pub struct StreamReassembler {
    buffer: BytesMut,
    stats: ReassemblerStats,
}

impl StreamReassembler {
    /// Create an empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` and extract every complete frame now in the buffer.
    ///
    /// Returns frames in stream order. Partial trailing data stays buffered
    /// for the next call.
    pub fn push(&mut self, data: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(data);
        let mut frames = Vec::new();

        loop {
            let Some(start) = self.buffer.iter().position(|&b| b == PREFIX) else {
                if !self.buffer.is_empty() {
                    self.discard(self.buffer.len());
                }
                break;
            };
            if start > 0 {
                self.discard(start);
            }

            if self.buffer.len() < MIN_FRAME_SIZE {
                break;
            }

            let total = usize::from(self.buffer[1]) + MIN_FRAME_SIZE;
            if self.buffer.len() < total {
                break;
            }

            if self.buffer[total - 2..total] != SUFFIX {
                let _ = self.buffer.split_to(1);
                self.stats.resyncs += 1;
                tracing::debug!(total, "suffix missing, dropping prefix byte");
                continue;
            }

            frames.push(self.buffer.split_to(total).freeze());
            self.stats.frames += 1;
        }

        frames
    }

    /// Drop all buffered bytes. Counters are kept.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Bytes waiting for the rest of a frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> ReassemblerStats {
        self.stats
    }

    fn discard(&mut self, count: usize) {
        let _ = self.buffer.split_to(count);
        self.stats.discarded_bytes += count as u64;
        tracing::debug!(count, "discarded bytes before prefix");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cubelink_proto::{Frame, MessageType};
    use hex_literal::hex;

    use super::*;

    const BATTERY_85: [u8; 7] = hex!("2a 02 05 55 86 0d 0a");
    const ROTATION_R: [u8; 8] = hex!("2a 03 01 08 00 36 0d 0a");

    #[test]
    fn single_frame_in_one_push() {
        let mut r = StreamReassembler::new();
        let frames = r.push(&BATTERY_85);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &BATTERY_85);
        assert_eq!(r.buffered_len(), 0);
    }

    #[test]
    fn garbage_then_frame_across_two_pushes() {
        let mut r = StreamReassembler::new();
        assert!(r.push(&[0xFF, 0xFE]).is_empty());
        let frames = r.push(&BATTERY_85);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &BATTERY_85);
        assert_eq!(r.stats().discarded_bytes, 2);
    }

    #[test]
    fn concatenated_frames_all_extracted() {
        let mut r = StreamReassembler::new();
        let mut stream = ROTATION_R.to_vec();
        stream.extend_from_slice(&BATTERY_85);
        stream.extend_from_slice(&ROTATION_R);

        let frames = r.push(&stream);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].as_ref(), &BATTERY_85);
        assert_eq!(r.stats().frames, 3);
    }

    #[test]
    fn waits_for_length_byte_and_body() {
        let mut r = StreamReassembler::new();
        assert!(r.push(&BATTERY_85[..3]).is_empty());
        assert_eq!(r.buffered_len(), 3);
        assert!(r.push(&BATTERY_85[3..6]).is_empty());
        assert_eq!(r.push(&BATTERY_85[6..]).len(), 1);
    }

    #[test]
    fn spurious_prefix_resyncs_to_next_frame() {
        // A stray 0x2A whose "length" points at non-suffix bytes.
        let mut stream = vec![PREFIX, 0x01, 0x00, 0x00, 0x00, 0x00];
        stream.extend_from_slice(&BATTERY_85);

        let mut r = StreamReassembler::new();
        let frames = r.push(&stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &BATTERY_85);
        assert_eq!(r.stats().resyncs, 1);
    }

    #[test]
    fn corrupt_checksum_is_extracted_but_rejected_by_codec() {
        let mut bad = BATTERY_85;
        bad[4] = 0xFF;
        let mut r = StreamReassembler::new();
        let frames = r.push(&bad);
        assert_eq!(frames.len(), 1);
        assert!(Frame::from_raw(frames[0].clone()).is_err());
    }

    #[test]
    fn buffer_without_prefix_is_discarded() {
        let mut r = StreamReassembler::new();
        assert!(r.push(&[0x00, 0x01, 0x02]).is_empty());
        assert_eq!(r.buffered_len(), 0);
        assert_eq!(r.stats().discarded_bytes, 3);
    }

    #[test]
    fn clear_drops_partial_frame() {
        let mut r = StreamReassembler::new();
        r.push(&ROTATION_R[..4]);
        r.clear();
        assert_eq!(r.buffered_len(), 0);

        let frames = r.push(&ROTATION_R);
        let frame = Frame::from_raw(frames[0].clone()).unwrap();
        assert_eq!(frame.message_type, MessageType::Rotation);
    }
}
