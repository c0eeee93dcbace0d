//! Device data path driven directly through `handle_transport_event`.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use cubelink_client::{
    CubeDevice, DeviceError, LinkStatus, SystemEnv, Transport, TransportError, TransportEvent,
};
use cubelink_core::{ConnectionState, DeviceId, SessionConfig};
use cubelink_proto::{CubeFace, Direction, Move, Payload};
use proptest::prelude::*;

/// Transport that records writes and never answers.
#[derive(Debug, Clone, Default)]
struct RecordingTransport {
    writes: Arc<Mutex<Vec<u8>>>,
    pending: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn connect(&self, _device: &DeviceId) -> Result<LinkStatus, TransportError> {
        if self.pending.load(Ordering::SeqCst) {
            Ok(LinkStatus::Pending)
        } else {
            Ok(LinkStatus::Established)
        }
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        self.writes.lock().unwrap().extend_from_slice(data);
        Ok(())
    }
}

fn device() -> (CubeDevice<RecordingTransport, SystemEnv>, RecordingTransport) {
    let transport = RecordingTransport::default();
    let device =
        CubeDevice::new(transport.clone(), SystemEnv::new(), SessionConfig::default()).unwrap();
    (device, transport)
}

async fn feed(device: &CubeDevice<RecordingTransport, SystemEnv>, bytes: &[u8]) {
    device.handle_transport_event(TransportEvent::Data(Bytes::copy_from_slice(bytes))).await;
}

#[tokio::test(start_paused = true)]
async fn connect_writes_initial_requests() {
    let (device, transport) = device();
    device.connect(DeviceId::new("cube")).await.unwrap();

    assert_eq!(device.connection_state(), ConnectionState::Connected);
    assert_eq!(*transport.writes.lock().unwrap(), vec![0x33, 0x32, 0x56]);
}

#[tokio::test(start_paused = true)]
async fn battery_frame_updates_cache_and_stats() {
    let (device, _) = device();
    let mut events = device.subscribe();

    feed(&device, &[0x2a, 0x02, 0x05]).await;
    assert_eq!(device.last_battery().await, None);
    feed(&device, &[0x55, 0x86, 0x0d, 0x0a]).await;

    assert_eq!(device.last_battery().await, Some(85));
    assert_eq!(events.recv().await.unwrap(), cubelink_client::CubeEvent::BatteryUpdated(85));

    let stats = device.frame_stats().await;
    assert_eq!(stats.frames_decoded, 1);
    assert_eq!(stats.framing_errors, 0);
}

#[tokio::test(start_paused = true)]
async fn pending_link_times_out_after_scan_timeout() {
    let (device, transport) = device();
    transport.pending.store(true, Ordering::SeqCst);

    let start = tokio::time::Instant::now();
    let err = device.connect(DeviceId::new("cube")).await.unwrap_err();

    assert_eq!(err, DeviceError::ConnectTimeout);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(device.connection_state(), ConnectionState::Disconnected);

    // A late establish for the abandoned attempt is ignored.
    device.handle_transport_event(TransportEvent::Established).await;
    assert_eq!(device.connection_state(), ConnectionState::Disconnected);
}

fn any_move() -> impl Strategy<Value = Move> {
    (0u8..6, any::<bool>()).prop_map(|(face, ccw)| {
        let direction = if ccw { Direction::CounterClockwise } else { Direction::Clockwise };
        Move::new(CubeFace::from_protocol_index(face).unwrap(), direction)
    })
}

proptest! {
    #[test]
    fn move_log_ignores_chunking(
        batches in prop::collection::vec(prop::collection::vec(any_move(), 1..4), 1..6),
        cuts in prop::collection::vec(1usize..9, 1..40),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        runtime.block_on(async {
            let (device, _) = device();

            let mut stream = Vec::new();
            let mut expected = Vec::new();
            for batch in &batches {
                expected.extend(batch.iter().map(Move::notation));
                let frame = Payload::Rotation(batch.clone()).into_frame().unwrap();
                stream.extend_from_slice(&frame.raw);
            }

            let mut rest = stream.as_slice();
            for cut in cuts.iter().cycle() {
                if rest.is_empty() {
                    break;
                }
                let (head, tail) = rest.split_at((*cut).min(rest.len()));
                feed(&device, head).await;
                rest = tail;
            }

            let log: Vec<String> = device.moves().await.iter().map(Move::notation).collect();
            assert_eq!(log, expected);
        });
    }
}
