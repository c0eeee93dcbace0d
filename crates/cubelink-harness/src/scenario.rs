//! Scenario helpers shared by the integration tests.

use std::time::Duration;

use cubelink_client::{CubeDevice, CubeEvent, DeviceError};
use cubelink_core::SessionConfig;
use tokio::sync::broadcast;

use crate::{SimCube, SimEnv};

/// Device wired to a simulated cube.
pub type SimDevice = CubeDevice<SimCube, SimEnv>;

/// How long [`wait_for`] waits for a matching event.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(60);

/// A device plus the handles a test needs to drive it.
pub struct Scenario {
    /// Device under test.
    pub device: SimDevice,
    /// Test-side handle on the simulated cube.
    pub cube: SimCube,
    /// Environment shared with the device.
    pub env: SimEnv,
    /// Subscribed before connecting, so it sees every event.
    pub events: broadcast::Receiver<CubeEvent>,
}

impl Scenario {
    /// Build a disconnected device with its event pump running.
    pub fn new(seed: u64, config: SessionConfig) -> Result<Self, DeviceError> {
        let (cube, rx) = SimCube::new(seed);
        let env = SimEnv::new();
        let device = CubeDevice::new(cube.clone(), env.clone(), config)?;
        device.spawn_event_pump(rx);
        let events = device.subscribe();
        Ok(Self { device, cube, env, events })
    }

    /// Build, connect, and wait until the three initial responses have been
    /// processed.
    pub async fn connected(seed: u64, config: SessionConfig) -> Result<Self, DeviceError> {
        let mut scenario = Self::new(seed, config)?;
        scenario.device.connect(SimCube::device_id()).await?;
        for _ in 0..3 {
            let event = scenario
                .wait_for(|e| {
                    matches!(
                        e,
                        CubeEvent::StateUpdated(_)
                            | CubeEvent::BatteryUpdated(_)
                            | CubeEvent::CubeTypeReceived(_)
                    )
                })
                .await;
            if event.is_none() {
                return Err(DeviceError::Disconnected);
            }
        }
        Ok(scenario)
    }

    /// Next event matching `predicate`, skipping others.
    ///
    /// `None` if nothing matches within [`EVENT_TIMEOUT`], the channel
    /// closes, or the cube has dropped a transport event.
    pub async fn wait_for(&mut self, predicate: impl Fn(&CubeEvent) -> bool) -> Option<CubeEvent> {
        let event = wait_for(&mut self.events, predicate).await;
        let dropped = self.cube.dropped_events();
        if dropped > 0 {
            tracing::error!(dropped, "simulated cube lost transport events");
            return None;
        }
        event
    }

    /// Every event already queued, without waiting.
    pub fn drain(&mut self) -> Vec<CubeEvent> {
        let mut out = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => out.push(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {},
                Err(_) => return out,
            }
        }
    }
}

/// Next event from `events` matching `predicate`.
pub async fn wait_for(
    events: &mut broadcast::Receiver<CubeEvent>,
    predicate: impl Fn(&CubeEvent) -> bool,
) -> Option<CubeEvent> {
    let search = async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return Some(event),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {},
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    };
    tokio::time::timeout(EVENT_TIMEOUT, search).await.ok().flatten()
}
