//! Captures read back from disk.

#![allow(clippy::unwrap_used)]

use std::io::Write;

use cubelink_inspect::{parse_capture, replay};
use cubelink_proto::{CubeState, Payload};

#[test]
fn capture_file_replays_like_a_live_stream() {
    let state = Payload::State(CubeState::solved()).into_frame().unwrap();
    let battery = Payload::Battery(40).into_frame().unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# solved cube, then battery").unwrap();
    // Split the state frame across lines the way notifications arrive.
    let (head, tail) = state.raw.split_at(11);
    writeln!(file, "{}", hex::encode(head)).unwrap();
    writeln!(file, "{}", hex::encode(tail)).unwrap();
    writeln!(file, "{}", hex::encode(&battery.raw)).unwrap();
    file.flush().unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    let chunks = parse_capture(&text).unwrap();
    assert_eq!(chunks.len(), 3);

    let summary = replay(&chunks, 0, 0.5);
    assert_eq!(summary.decoded, 2);
    assert_eq!(summary.state, Some(CubeState::solved()));
    assert_eq!(summary.battery, Some(40));
    assert_eq!(summary.buffered, 0);
}
