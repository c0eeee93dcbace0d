//! Simulated cube transport.
//!
//! [`SimCube`] plays the device side of the protocol: it answers request
//! commands with encoded frames, streams rotations and orientation on demand,
//! and splits everything it sends into randomly sized chunks drawn from a
//! seeded RNG, the way a real radio stack would.
//!
//! Clones share state, so a test keeps one handle to drive the cube while the
//! device owns another as its transport.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use cubelink_client::{LinkStatus, Transport, TransportError, TransportEvent};
use cubelink_core::{DeviceId, RadioError};
use cubelink_proto::{Command, CubeState, CubeType, Move, Payload, Quaternion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;

/// Capacity of the event channel returned by [`SimCube::new`].
pub const TRANSPORT_CHANNEL_CAPACITY: usize = 4096;

/// Identifier the simulated cube answers to.
pub const SIM_DEVICE_ID: &str = "sim-cube";

#[derive(Debug)]
struct SimState {
    cube: CubeState,
    battery: u8,
    cube_type: CubeType,
    offline_stats: String,
    orientation_enabled: bool,
    connected: bool,
    async_connect: bool,
    connect_delay: Duration,
    fail_connects: u32,
    radio: Option<RadioError>,
    silenced: HashSet<Command>,
    writes: Vec<Command>,
    connects: u32,
    dropped_events: u64,
    max_chunk: usize,
    rng: ChaCha8Rng,
}

/// In-memory cube.
#[derive(Debug, Clone)]
pub struct SimCube {
    state: Arc<Mutex<SimState>>,
    events: mpsc::Sender<TransportEvent>,
}

impl SimCube {
    /// Create a solved cube at 100% battery. `seed` drives chunking.
    ///
    /// Feed the returned receiver to
    /// [`CubeDevice::spawn_event_pump`](cubelink_client::CubeDevice::spawn_event_pump).
    pub fn new(seed: u64) -> (Self, mpsc::Receiver<TransportEvent>) {
        Self::with_capacity(seed, TRANSPORT_CHANNEL_CAPACITY)
    }

    /// Like [`new`](Self::new) with an event channel of `capacity` slots.
    pub fn with_capacity(seed: u64, capacity: usize) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (events, rx) = mpsc::channel(capacity.max(1));
        let state = SimState {
            cube: CubeState::solved(),
            battery: 100,
            cube_type: CubeType::Standard,
            offline_stats: "solves=0".to_owned(),
            orientation_enabled: false,
            connected: false,
            async_connect: false,
            connect_delay: Duration::ZERO,
            fail_connects: 0,
            radio: None,
            silenced: HashSet::new(),
            writes: Vec::new(),
            connects: 0,
            dropped_events: 0,
            max_chunk: 20,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        (Self { state: Arc::new(Mutex::new(state)), events }, rx)
    }

    /// The identifier [`Transport::connect`] accepts.
    pub fn device_id() -> DeviceId {
        DeviceId::new(SIM_DEVICE_ID)
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        // A panicking test thread poisons the lock; keep going with the data.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Set the battery percentage reported from now on.
    pub fn set_battery(&self, percent: u8) {
        self.lock().battery = percent;
    }

    /// Set the sticker state reported from now on.
    pub fn set_state(&self, cube: CubeState) {
        self.lock().cube = cube;
    }

    /// Set the hardware variant.
    pub fn set_cube_type(&self, cube_type: CubeType) {
        self.lock().cube_type = cube_type;
    }

    /// Set the offline statistics text.
    pub fn set_offline_stats(&self, text: &str) {
        self.lock().offline_stats = text.to_owned();
    }

    /// Largest chunk the cube emits. Clamped to at least 1.
    pub fn set_max_chunk(&self, max_chunk: usize) {
        self.lock().max_chunk = max_chunk.max(1);
    }

    /// Stop answering `command`.
    pub fn silence(&self, command: Command) {
        self.lock().silenced.insert(command);
    }

    /// Answer `command` again.
    pub fn unsilence(&self, command: Command) {
        self.lock().silenced.remove(&command);
    }

    /// Make the next `count` connection attempts fail.
    pub fn fail_next_connects(&self, count: u32) {
        self.lock().fail_connects = count;
    }

    /// Report connects as pending and establish them through the event
    /// channel instead.
    pub fn set_async_connect(&self, enabled: bool) {
        self.lock().async_connect = enabled;
    }

    /// Make every connect take `delay` before it resolves, like a slow scan.
    pub fn set_connect_delay(&self, delay: Duration) {
        self.lock().connect_delay = delay;
    }

    /// Make the radio unusable (or usable again with `None`).
    pub fn set_radio(&self, radio: Option<RadioError>) {
        self.lock().radio = radio;
    }

    /// Commands received, in order.
    pub fn writes(&self) -> Vec<Command> {
        self.lock().writes.clone()
    }

    /// Successful connections so far.
    pub fn connect_count(&self) -> u32 {
        self.lock().connects
    }

    /// Events lost because the channel was full.
    pub fn dropped_events(&self) -> u64 {
        self.lock().dropped_events
    }

    /// True while a link is up.
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// True after `EnableOrientation` and before `DisableOrientation`.
    pub fn orientation_enabled(&self) -> bool {
        self.lock().orientation_enabled
    }

    /// Report face turns.
    pub fn turn(&self, moves: &[Move]) {
        self.emit_payload(Payload::Rotation(moves.to_vec()));
    }

    /// Report an orientation sample if streaming is enabled.
    pub fn orient(&self, q: Quaternion) {
        if self.orientation_enabled() {
            self.emit_payload(Payload::Orientation(q));
        }
    }

    /// Push raw bytes, bypassing framing.
    pub fn inject(&self, bytes: &[u8]) {
        self.emit_bytes(bytes);
    }

    /// Drop the link from the cube side.
    pub fn drop_link(&self, reason: &str) {
        self.lock().connected = false;
        self.send(TransportEvent::Lost(reason.to_owned()));
    }

    /// Report the radio gone.
    pub fn lose_radio(&self, error: RadioError) {
        {
            let mut state = self.lock();
            state.connected = false;
            state.radio = Some(error);
        }
        self.send(TransportEvent::RadioUnavailable(error));
    }

    fn emit_payload(&self, payload: Payload) {
        match payload.into_frame() {
            Ok(frame) => self.emit_bytes(&frame.raw),
            Err(e) => tracing::error!("sim cube cannot encode payload: {}", e),
        }
    }

    fn emit_bytes(&self, bytes: &[u8]) {
        let chunks = {
            let mut state = self.lock();
            let max_chunk = state.max_chunk;
            let mut chunks = Vec::new();
            let mut rest = bytes;
            while !rest.is_empty() {
                let take = state.rng.gen_range(1..=rest.len().min(max_chunk));
                let (head, tail) = rest.split_at(take);
                chunks.push(Bytes::copy_from_slice(head));
                rest = tail;
            }
            chunks
        };
        for chunk in chunks {
            self.send(TransportEvent::Data(chunk));
        }
    }

    fn send(&self, event: TransportEvent) {
        // The device may hold its lock while writing to us, so never block.
        // Drops are counted; `Scenario::wait_for` refuses to match after one.
        if let Err(e) = self.events.try_send(event) {
            self.lock().dropped_events += 1;
            tracing::error!("sim cube dropped event: {}", e);
        }
    }

    fn respond(&self, command: Command) {
        let payload = {
            let mut state = self.lock();
            state.writes.push(command);
            if state.silenced.contains(&command) {
                return;
            }
            match command {
                Command::GetBattery => Some(Payload::Battery(state.battery)),
                Command::GetState => Some(Payload::State(state.cube)),
                Command::GetCubeType => Some(Payload::CubeType(state.cube_type)),
                Command::GetOfflineStats => Some(Payload::OfflineStats(state.offline_stats.clone())),
                Command::ResetToSolved => {
                    state.cube = CubeState::solved();
                    None
                },
                Command::EnableOrientation => {
                    state.orientation_enabled = true;
                    None
                },
                Command::DisableOrientation => {
                    state.orientation_enabled = false;
                    None
                },
                Command::Reboot => {
                    state.connected = false;
                    drop(state);
                    self.send(TransportEvent::Lost("rebooting".to_owned()));
                    return;
                },
                Command::CalibrateOrientation
                | Command::FlashLed
                | Command::FlashLedSlow
                | Command::ToggleBacklight
                | Command::ToggleAnimatedBacklight => None,
            }
        };
        if let Some(payload) = payload {
            self.emit_payload(payload);
        }
    }
}

#[async_trait]
impl Transport for SimCube {
    async fn connect(&self, device: &DeviceId) -> Result<LinkStatus, TransportError> {
        let delay = self.lock().connect_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let pending = {
            let mut state = self.lock();
            if let Some(radio) = state.radio {
                return Err(TransportError::Radio(radio));
            }
            if device.as_str() != SIM_DEVICE_ID {
                return Err(TransportError::DeviceNotFound(device.clone()));
            }
            if state.fail_connects > 0 {
                state.fail_connects -= 1;
                if state.async_connect {
                    drop(state);
                    self.send(TransportEvent::Failed("simulated connect failure".to_owned()));
                    return Ok(LinkStatus::Pending);
                }
                return Err(TransportError::ConnectFailed("simulated connect failure".to_owned()));
            }
            state.connected = true;
            state.connects += 1;
            state.async_connect
        };

        if pending {
            self.send(TransportEvent::Established);
            return Ok(LinkStatus::Pending);
        }
        Ok(LinkStatus::Established)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.connected = false;
        state.orientation_enabled = false;
        Ok(())
    }

    async fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::WriteFailed("not connected".to_owned()));
        }
        for &byte in data {
            match Command::from_u8(byte) {
                Some(command) => self.respond(command),
                None => tracing::warn!(byte, "sim cube ignoring unknown command"),
            }
        }
        Ok(())
    }
}
