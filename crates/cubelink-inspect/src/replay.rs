//! Offline replay of a captured stream through the decode pipeline.

use std::fmt;

use cubelink_core::{OrientationPipeline, PayloadDecoder};
use cubelink_proto::{CubeState, CubeType, MoveSequence, Payload, Quaternion};

/// Everything learned from one replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    /// Bytes fed.
    pub bytes: usize,
    /// Chunks fed.
    pub chunks: usize,
    /// Frames that decoded into a payload.
    pub decoded: u64,
    /// Frames rejected by envelope validation.
    pub framing_errors: u64,
    /// Frames with a valid envelope but an undecodable payload.
    pub payload_errors: u64,
    /// Bytes skipped while searching for a prefix.
    pub discarded_bytes: u64,
    /// Prefixes dropped for a missing suffix.
    pub resyncs: u64,
    /// Bytes of an unfinished frame at the end of the capture.
    pub buffered: usize,
    /// Every decoded turn, in order.
    pub moves: MoveSequence,
    /// Last battery reading.
    pub battery: Option<u8>,
    /// Last hardware variant.
    pub cube_type: Option<CubeType>,
    /// Last full state.
    pub state: Option<CubeState>,
    /// Last smoothed orientation.
    pub orientation: Option<Quaternion>,
    /// Last offline statistics text.
    pub offline_stats: Option<String>,
}

/// Stateful replay: feed chunks, then [`finish`](Self::finish).
#[derive(Debug)]
pub struct Replay {
    decoder: PayloadDecoder,
    orientation: OrientationPipeline,
    summary: ReplaySummary,
}

impl Replay {
    /// Start a replay. `smoothing` is the orientation smoothing factor.
    pub fn new(smoothing: f64) -> Self {
        Self {
            decoder: PayloadDecoder::new(),
            orientation: OrientationPipeline::new(smoothing),
            summary: ReplaySummary::default(),
        }
    }

    /// Feed one chunk as the radio would deliver it.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.summary.bytes += chunk.len();
        self.summary.chunks += 1;
        for payload in self.decoder.push(chunk) {
            self.apply(payload);
        }
    }

    fn apply(&mut self, payload: Payload) {
        tracing::debug!(?payload, "decoded");
        match payload {
            Payload::Rotation(moves) => self.summary.moves.extend(moves),
            Payload::State(state) => self.summary.state = Some(state),
            Payload::Orientation(raw) => {
                self.summary.orientation = Some(self.orientation.process(raw));
            },
            Payload::Battery(percent) => self.summary.battery = Some(percent),
            Payload::OfflineStats(text) => self.summary.offline_stats = Some(text),
            Payload::CubeType(cube_type) => self.summary.cube_type = Some(cube_type),
        }
    }

    /// Stop and report.
    pub fn finish(mut self) -> ReplaySummary {
        let stats = self.decoder.stats();
        self.summary.decoded = stats.frames_decoded;
        self.summary.framing_errors = stats.framing_errors;
        self.summary.payload_errors = stats.payload_errors;
        self.summary.discarded_bytes = stats.discarded_bytes;
        self.summary.resyncs = stats.resyncs;
        self.summary.buffered = self.decoder.buffered_len();
        self.summary
    }
}

/// Replay `chunks` as captured, or re-split into `chunk_size` pieces when it
/// is non-zero.
pub fn replay(chunks: &[Vec<u8>], chunk_size: usize, smoothing: f64) -> ReplaySummary {
    let mut replay = Replay::new(smoothing);
    if chunk_size == 0 {
        for chunk in chunks {
            replay.feed(chunk);
        }
    } else {
        let stream = chunks.concat();
        for chunk in stream.chunks(chunk_size) {
            replay.feed(chunk);
        }
    }
    replay.finish()
}

fn or_none<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_owned(), |v| v.to_string())
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bytes: {} in {} chunks", self.bytes, self.chunks)?;
        writeln!(
            f,
            "frames: {} decoded, {} framing errors, {} payload errors",
            self.decoded, self.framing_errors, self.payload_errors
        )?;
        writeln!(
            f,
            "stream: {} discarded bytes, {} resyncs, {} buffered",
            self.discarded_bytes, self.resyncs, self.buffered
        )?;
        writeln!(f, "moves ({}): {}", self.moves.len(), self.moves.notation())?;
        writeln!(f, "battery: {}", or_none(self.battery.map(|b| format!("{b}%"))))?;
        writeln!(f, "cube type: {}", or_none(self.cube_type.map(|t| format!("{t:?}"))))?;
        writeln!(
            f,
            "state: {}",
            or_none(self.state.map(|s| format!("{:.1}% solved", s.solved_percentage())))
        )?;
        writeln!(
            f,
            "orientation: {}",
            or_none(
                self.orientation
                    .map(|q| format!("x={:.3} y={:.3} z={:.3} w={:.3}", q.x, q.y, q.z, q.w))
            )
        )?;
        write!(f, "offline stats: {}", or_none(self.offline_stats.as_deref()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::capture::parse_capture;

    const CAPTURE: &str = "\
# battery 85%
2a 02 05 55 86 0d 0a
ff ff                          # noise
2a 05 01 08 00 05 00 3d 0d 0a  # R U'
2a 02 08 01 35 0d 0a           # edge
2a 02 05 55 00 0d 0a           # bad checksum
2a 03 01
";

    #[test]
    fn summary_report() {
        let chunks = parse_capture(CAPTURE).unwrap();
        let summary = replay(&chunks, 0, 0.5);
        insta::assert_snapshot!(summary.to_string(), @r"
        bytes: 36 in 6 chunks
        frames: 3 decoded, 1 framing errors, 0 payload errors
        stream: 2 discarded bytes, 0 resyncs, 3 buffered
        moves (2): R U'
        battery: 85%
        cube type: Edge
        state: none
        orientation: none
        offline stats: none
        ");
    }

    #[test]
    fn chunk_size_does_not_change_the_result() {
        let chunks = parse_capture(CAPTURE).unwrap();
        let whole = replay(&chunks, 0, 0.5);
        for size in [1, 2, 3, 7, 64] {
            let split = replay(&chunks, size, 0.5);
            assert_eq!(split.decoded, whole.decoded, "chunk size {size}");
            assert_eq!(split.framing_errors, whole.framing_errors);
            assert_eq!(split.discarded_bytes, whole.discarded_bytes);
            assert_eq!(split.moves.notation(), whole.moves.notation());
            assert_eq!(split.battery, whole.battery);
        }
    }

    #[test]
    fn orientation_is_smoothed() {
        let first = Payload::Orientation(Quaternion::IDENTITY).into_frame().unwrap();
        let turned = Quaternion::from_axis_angle([0.0, 0.0, 1.0], 1.0);
        let second = Payload::Orientation(turned).into_frame().unwrap();

        let mut replay = Replay::new(0.5);
        replay.feed(&first.raw);
        replay.feed(&second.raw);
        let q = replay.finish().orientation.unwrap();

        let expected = Quaternion::from_axis_angle([0.0, 0.0, 1.0], 0.5);
        assert!(q.approx_eq(&expected, 1e-5));
    }
}
