//! Fuzz target for stream reassembly and frame decoding
//!
//! Malformed notifications must never take the decoder down.
//!
//! # Strategy
//!
//! - Raw streams: arbitrary bytes split into arbitrary chunk sizes
//! - Planted frames: valid frames interleaved with noise, checking they
//!   survive whatever surrounds them
//!
//! # Invariants
//!
//! - NEVER panic on any input
//! - Every extracted frame starts with the prefix and ends with the suffix
//! - A valid frame preceded only by prefix-free noise is always recovered
//! - Bytes in = bytes extracted + bytes discarded + resync drops + buffered

#![no_main]

use arbitrary::Arbitrary;
use cubelink_core::StreamReassembler;
use cubelink_proto::{Frame, Payload, PREFIX, SUFFIX};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Stream content.
    stream: Vec<u8>,
    /// Chunk sizes, cycled. Zero means 1.
    chunk_sizes: Vec<u8>,
    /// Battery frame planted after prefix-free noise.
    planted_battery: Option<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let mut stream = input.stream;
    if let Some(percent) = input.planted_battery {
        stream.retain(|&b| b != PREFIX);
        if let Ok(frame) = Payload::Battery(percent).into_frame() {
            stream.extend_from_slice(&frame.raw);
        }
    }

    let mut reassembler = StreamReassembler::new();
    let mut frames = Vec::new();
    let mut offset = 0;
    let mut sizes = input.chunk_sizes.iter().cycle();
    while offset < stream.len() {
        let size = sizes.next().map_or(stream.len(), |&s| usize::from(s.max(1)));
        let end = (offset + size).min(stream.len());
        frames.extend(reassembler.push(&stream[offset..end]));
        offset = end;
    }

    let mut extracted = 0usize;
    for raw in &frames {
        assert_eq!(raw[0], PREFIX);
        assert_eq!(raw[raw.len() - 2..], SUFFIX);
        extracted += raw.len();

        if let Ok(frame) = Frame::from_raw(raw.clone()) {
            let _ = Payload::decode(&frame);
        }
    }

    let stats = reassembler.stats();
    let accounted = extracted as u64
        + stats.discarded_bytes
        + stats.resyncs
        + reassembler.buffered_len() as u64;
    assert_eq!(accounted, stream.len() as u64, "bytes lost or duplicated");

    if let Some(percent) = input.planted_battery {
        let last = frames.last().map(|raw| Frame::from_raw(raw.clone()));
        let Some(Ok(frame)) = last else {
            panic!("planted frame not recovered");
        };
        assert_eq!(Payload::decode(&frame).ok(), Some(Payload::Battery(percent)));
    }
});
