//! Chunks in, payloads out.
//!
//! [`PayloadDecoder`] is the one place the notification stream is turned
//! into typed payloads: reassembly, envelope validation and payload decoding,
//! with a counter for every way a frame can be rejected. Rejected frames are
//! logged and skipped; they never stop the frames after them.

use cubelink_proto::{Frame, Payload};

use crate::reassembler::StreamReassembler;

/// Running totals for a decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Frames that decoded into a payload.
    pub frames_decoded: u64,
    /// Frames rejected by envelope validation.
    pub framing_errors: u64,
    /// Frames with a valid envelope but an undecodable payload.
    pub payload_errors: u64,
    /// Bytes skipped while searching for a prefix.
    pub discarded_bytes: u64,
    /// Prefixes dropped for a missing suffix.
    pub resyncs: u64,
}

/// Reassembler plus frame and payload decoding.
#[derive(Debug, Default)]
pub struct PayloadDecoder {
    reassembler: StreamReassembler,
    frames_decoded: u64,
    framing_errors: u64,
    payload_errors: u64,
}

impl PayloadDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every payload it completes, in stream order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Payload> {
        let mut payloads = Vec::new();
        for raw in self.reassembler.push(chunk) {
            let frame = match Frame::from_raw(raw) {
                Ok(frame) => frame,
                Err(e) => {
                    self.framing_errors += 1;
                    tracing::warn!("dropping frame: {}", e);
                    continue;
                },
            };

            match Payload::decode(&frame) {
                Ok(payload) => {
                    self.frames_decoded += 1;
                    tracing::debug!(message_type = ?frame.message_type, "frame decoded");
                    payloads.push(payload);
                },
                Err(e) => {
                    self.payload_errors += 1;
                    tracing::warn!(message_type = ?frame.message_type, "dropping payload: {}", e);
                },
            }
        }
        payloads
    }

    /// Drop any partial frame. Counters are kept.
    pub fn clear(&mut self) {
        self.reassembler.clear();
    }

    /// Bytes of an unfinished frame waiting for more data.
    pub fn buffered_len(&self) -> usize {
        self.reassembler.buffered_len()
    }

    /// Counters since creation.
    pub fn stats(&self) -> DecodeStats {
        let reassembly = self.reassembler.stats();
        DecodeStats {
            frames_decoded: self.frames_decoded,
            framing_errors: self.framing_errors,
            payload_errors: self.payload_errors,
            discarded_bytes: reassembly.discarded_bytes,
            resyncs: reassembly.resyncs,
        }
    }
}
