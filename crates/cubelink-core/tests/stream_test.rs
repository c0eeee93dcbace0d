//! End-to-end stream decoding: reassembler, codec and payload decoders
//! together, under fragmentation and interleaved garbage.

#![allow(clippy::unwrap_used, clippy::panic)]

use bytes::Bytes;
use cubelink_core::StreamReassembler;
use cubelink_proto::{
    CubeFace, CubeState, Direction, Frame, MessageType, Move, Payload, ProtocolError, Quaternion,
    PREFIX,
};
use hex_literal::hex;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ROTATION_R: [u8; 8] = hex!("2a 03 01 08 00 36 0d 0a");
const BATTERY_85: [u8; 7] = hex!("2a 02 05 55 86 0d 0a");

/// Split `bytes` into random chunk sizes drawn from a seeded RNG.
fn chunked(bytes: &[u8], seed: u64) -> Vec<Vec<u8>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut chunks = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let take = rng.gen_range(1..=rest.len().min(20));
        let (head, tail) = rest.split_at(take);
        chunks.push(head.to_vec());
        rest = tail;
    }
    chunks
}

fn feed_all(chunks: &[Vec<u8>]) -> Vec<Bytes> {
    let mut reassembler = StreamReassembler::new();
    chunks.iter().flat_map(|chunk| reassembler.push(chunk)).collect()
}

#[test]
fn rotation_frame_decodes_to_r() {
    let frame = Frame::decode(&ROTATION_R).unwrap();
    assert_eq!(frame.message_type, MessageType::Rotation);
    assert_eq!(frame.payload.as_ref(), &[0x08, 0x00]);

    let Payload::Rotation(moves) = Payload::decode(&frame).unwrap() else {
        panic!("expected rotation payload");
    };
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].face(), CubeFace::Right);
    assert_eq!(moves[0].direction(), Direction::Clockwise);
    assert_eq!(moves[0].notation(), "R");
}

#[test]
fn garbage_then_battery_in_two_calls() {
    let mut reassembler = StreamReassembler::new();
    assert!(reassembler.push(&[0xFF, 0xFE]).is_empty());

    let frames = reassembler.push(&BATTERY_85);
    assert_eq!(frames.len(), 1);
    let frame = Frame::from_raw(frames[0].clone()).unwrap();
    assert_eq!(Payload::decode(&frame).unwrap(), Payload::Battery(85));
}

#[test]
fn quaternion_text_decodes() {
    let frame = Frame::new(MessageType::Orientation, b"0.1#0.2#0.3#0.4").unwrap();
    let Payload::Orientation(q) = Payload::decode(&frame).unwrap() else {
        panic!("expected orientation payload");
    };
    assert!(q.approx_eq(&Quaternion::new(0.1, 0.2, 0.3, 0.4), 1e-4));
}

#[test]
fn bad_checksum_reports_expected_and_received() {
    let mut bad = BATTERY_85;
    bad[4] = 0xFF;
    assert_eq!(
        Frame::decode(&bad),
        Err(ProtocolError::ChecksumMismatch { expected: 0x86, received: 0xFF })
    );
}

#[test]
fn corrupt_frame_does_not_poison_the_next() {
    let mut bad = BATTERY_85;
    bad[3] = 0x10; // checksum now wrong
    let mut stream = bad.to_vec();
    stream.extend_from_slice(&ROTATION_R);

    let frames = StreamReassembler::new().push(&stream);
    assert_eq!(frames.len(), 2);
    assert!(Frame::from_raw(frames[0].clone()).is_err());
    assert!(Frame::from_raw(frames[1].clone()).is_ok());
}

#[test]
fn full_state_survives_byte_by_byte_delivery() {
    let state = CubeState::solved();
    let frame = Payload::State(state).into_frame().unwrap();
    let single_bytes: Vec<Vec<u8>> = frame.raw.iter().map(|&b| vec![b]).collect();

    let frames = feed_all(&single_bytes);
    assert_eq!(frames.len(), 1);
    let decoded = Frame::from_raw(frames[0].clone()).unwrap();
    assert_eq!(Payload::decode(&decoded).unwrap(), Payload::State(state));
}

#[test]
fn move_log_notation_from_stream() {
    let moves = vec![
        Move::new(CubeFace::Up, Direction::Clockwise),
        Move::new(CubeFace::Front, Direction::CounterClockwise),
    ];
    let frame = Payload::Rotation(moves).into_frame().unwrap();
    let frames = feed_all(&chunked(&frame.raw, 7));
    let Payload::Rotation(decoded) =
        Payload::decode(&Frame::from_raw(frames[0].clone()).unwrap()).unwrap()
    else {
        panic!("expected rotation payload");
    };
    let notation: Vec<String> = decoded.iter().map(Move::notation).collect();
    assert_eq!(notation, ["U", "F'"]);
}

fn payload_frame() -> impl Strategy<Value = Bytes> {
    prop_oneof![
        (0u8..=100).prop_map(|p| Frame::encode(MessageType::Battery, &[p]).unwrap()),
        prop::collection::vec((0u8..=0x0B, any::<u8>()), 1..8).prop_map(|pairs| {
            let payload: Vec<u8> = pairs.into_iter().flat_map(|(c, o)| [c, o]).collect();
            Frame::encode(MessageType::Rotation, &payload).unwrap()
        }),
        prop::collection::vec(any::<u8>(), 0..64)
            .prop_map(|payload| Frame::encode(MessageType::OfflineStats, &payload).unwrap()),
    ]
}

proptest! {
    #[test]
    fn prop_fragmentation_yields_one_identical_frame(frame in payload_frame(), seed in any::<u64>()) {
        let whole = StreamReassembler::new().push(&frame);
        let pieces = feed_all(&chunked(&frame, seed));
        prop_assert_eq!(whole.len(), 1);
        prop_assert_eq!(&pieces, &whole);
    }

    #[test]
    fn prop_garbage_between_frames_is_skipped(
        first in payload_frame(),
        second in payload_frame(),
        leading in prop::collection::vec(any::<u8>().prop_filter("not prefix", |b| *b != PREFIX), 0..16),
        between in prop::collection::vec(any::<u8>().prop_filter("not prefix", |b| *b != PREFIX), 0..16),
        seed in any::<u64>(),
    ) {
        let mut stream = leading;
        stream.extend_from_slice(&first);
        stream.extend_from_slice(&between);
        stream.extend_from_slice(&second);

        let frames = feed_all(&chunked(&stream, seed));
        prop_assert_eq!(frames, vec![first, second]);
    }

    #[test]
    fn prop_arbitrary_input_never_panics(data in prop::collection::vec(any::<u8>(), 0..256), seed in any::<u64>()) {
        let mut reassembler = StreamReassembler::new();
        for chunk in chunked(&data, seed) {
            for raw in reassembler.push(&chunk) {
                if let Ok(frame) = Frame::from_raw(raw) {
                    let _ = Payload::decode(&frame);
                }
            }
        }
    }
}
