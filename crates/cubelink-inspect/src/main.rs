//! Cubelink capture inspector.
//!
//! # Usage
//!
//! ```bash
//! # Replay a capture chunk by chunk as recorded
//! cubelink-inspect --input session.hex
//!
//! # Re-split into 3-byte chunks and show every decoded payload
//! cubelink-inspect --input session.hex --chunk-size 3 --log-level debug
//! ```

use std::path::PathBuf;

use clap::Parser;
use cubelink_core::SmoothingFilter;
use cubelink_inspect::{parse_capture, replay};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Cubelink capture inspector
#[derive(Parser, Debug)]
#[command(name = "cubelink-inspect")]
#[command(about = "Decode a captured cube notification stream")]
#[command(version)]
struct Args {
    /// Hex capture file
    #[arg(short, long)]
    input: PathBuf,

    /// Re-split the stream into chunks of this many bytes (0 keeps the
    /// capture's own lines as chunks)
    #[arg(short, long, default_value = "0")]
    chunk_size: usize,

    /// Orientation smoothing factor in [0, 1]
    #[arg(long, default_value = "0.5")]
    smoothing: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let smoothing = SmoothingFilter::new(args.smoothing).factor();
    if args.smoothing.is_nan() || (smoothing - args.smoothing).abs() > f64::EPSILON {
        tracing::warn!(requested = args.smoothing, used = smoothing, "smoothing factor clamped");
    }

    tracing::info!("Reading {}", args.input.display());
    let text = std::fs::read_to_string(&args.input)?;
    let chunks = parse_capture(&text)?;

    let summary = replay(&chunks, args.chunk_size, smoothing);
    for line in summary.to_string().lines() {
        tracing::info!("{}", line);
    }

    if summary.framing_errors + summary.payload_errors > 0 {
        tracing::warn!(
            framing = summary.framing_errors,
            payload = summary.payload_errors,
            "capture contains rejected frames"
        );
    }

    Ok(())
}
