//! Device facade.
//!
//! [`CubeDevice`] owns the session, the payload decoder, the orientation
//! pipeline, the move log and the response cache behind one
//! `tokio::sync::Mutex`. Transport callbacks, caller commands and timer
//! tasks all funnel through it, so every state change is serialized.
//!
//! Session actions are executed while the lock is held. Executing an action
//! can produce a follow-up session event (a closed link becomes
//! `LinkClosed`); those are queued and handled before the lock is released.
//!
//! Opening a link is the exception: the transport's `connect` may take as
//! long as a scan does, so it runs in its own task outside the lock, bounded
//! by `scan_timeout`, and feeds its outcome back as a session event. Tasks
//! hold the device weakly; dropping the last handle closes every subscriber.

use std::{
    collections::VecDeque,
    sync::{Arc, Weak},
};

use cubelink_core::{
    ConnectionState, DeviceId, Environment, LogLevel, Observed, OrientationPipeline,
    PayloadDecoder, ResponseCache, Session, SessionAction, SessionConfig, SessionEvent,
    SessionNotice,
};
use cubelink_proto::{Command, CubeState, CubeType, MoveSequence, Payload};
use tokio::{
    sync::{Mutex, broadcast, mpsc, watch},
    task::JoinHandle,
};

use crate::{
    error::DeviceError,
    event::{CubeEvent, FrameStats},
    transport::{LinkStatus, Transport, TransportError, TransportEvent},
};

/// Capacity of the subscriber channel. Slow subscribers lag and skip.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Client for one smart cube.
///
/// Cheap to clone; clones share the same connection.
pub struct CubeDevice<T: Transport, E: Environment> {
    inner: Arc<Inner<T, E>>,
}

impl<T: Transport, E: Environment> Clone for CubeDevice<T, E> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

struct Inner<T, E> {
    transport: T,
    env: E,
    config: SessionConfig,
    state: Mutex<DeviceState>,
    events: broadcast::Sender<CubeEvent>,
    connection: watch::Sender<ConnectionState>,
}

struct DeviceState {
    session: Session,
    decoder: PayloadDecoder,
    orientation: OrientationPipeline,
    moves: MoveSequence,
    responses: ResponseCache,
    last_failure: Option<String>,
    link_timed_out: bool,
    link_attempts: u64,
    link_task: Option<(u64, JoinHandle<()>)>,
    reconnect_task: Option<(u64, JoinHandle<()>)>,
}

impl DeviceState {
    fn abort_reconnect(&mut self) {
        if let Some((generation, task)) = self.reconnect_task.take() {
            tracing::debug!(generation, "aborting reconnect timer");
            task.abort();
        }
    }

    fn abort_link(&mut self) {
        if let Some((attempt, task)) = self.link_task.take() {
            tracing::debug!(attempt, "abandoning link attempt");
            task.abort();
        }
    }
}

impl<T: Transport, E: Environment> CubeDevice<T, E> {
    /// Create a disconnected device.
    ///
    /// # Errors
    ///
    /// `Config` if `config` fails validation.
    pub fn new(transport: T, env: E, config: SessionConfig) -> Result<Self, DeviceError> {
        config.validate()?;

        let state = DeviceState {
            session: Session::new(&config),
            decoder: PayloadDecoder::new(),
            orientation: OrientationPipeline::new(config.smoothing_factor),
            moves: MoveSequence::new(),
            responses: ResponseCache::default(),
            last_failure: None,
            link_timed_out: false,
            link_attempts: 0,
            link_task: None,
            reconnect_task: None,
        };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (connection, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                env,
                config,
                state: Mutex::new(state),
                events,
                connection,
            }),
        })
    }

    /// Configuration fixed at construction.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The transport this device drives.
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.connection.borrow()
    }

    /// Receiver that observes every connection state change.
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.subscribe()
    }

    /// Subscribe to device events.
    ///
    /// Every receiver sees every event published after it subscribed. The
    /// stream ends when the last device handle is dropped; background tasks
    /// never keep the device alive.
    pub fn subscribe(&self) -> broadcast::Receiver<CubeEvent> {
        self.inner.events.subscribe()
    }

    /// Connect to `device` and wait until the link is up.
    ///
    /// # Errors
    ///
    /// - `Session` if not currently disconnected
    /// - `ConnectionFailed` if the transport reports failure
    /// - `ConnectTimeout` if the link is not up within the scan timeout,
    ///   whether the transport is still scanning or reported a pending link;
    ///   the attempt is abandoned
    ///
    /// The state lock is not held while the transport connects, so
    /// [`disconnect`](Self::disconnect) abandons an attempt in progress.
    pub async fn connect(&self, device: DeviceId) -> Result<(), DeviceError> {
        let mut watch = self.inner.connection.subscribe();
        let deadline = self.inner.env.now() + self.inner.config.scan_timeout;
        {
            let mut state = self.inner.state.lock().await;
            state.last_failure = None;
            self.dispatch(&mut state, SessionEvent::Connect { device }).await?;
        }

        loop {
            let current = *watch.borrow_and_update();
            match current {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Connecting => {},
                ConnectionState::Disconnected | ConnectionState::Disconnecting => {
                    let mut state = self.inner.state.lock().await;
                    if std::mem::take(&mut state.link_timed_out) {
                        return Err(DeviceError::ConnectTimeout);
                    }
                    let reason = state.last_failure.take();
                    return Err(DeviceError::ConnectionFailed {
                        reason: reason.unwrap_or_else(|| "connection abandoned".to_owned()),
                    });
                },
            }

            let remaining = deadline.saturating_duration_since(self.inner.env.now());
            if remaining.is_zero() {
                tracing::warn!("connect timed out");
                let mut state = self.inner.state.lock().await;
                self.dispatch(&mut state, SessionEvent::Disconnect).await?;
                return Err(DeviceError::ConnectTimeout);
            }

            tokio::select! {
                () = self.inner.env.sleep(remaining) => {},
                changed = watch.changed() => {
                    if changed.is_err() {
                        return Err(DeviceError::Disconnected);
                    }
                },
            }
        }
    }

    /// Disconnect and stop any reconnection.
    ///
    /// Returns once the transport has closed the link.
    pub async fn disconnect(&self) -> Result<(), DeviceError> {
        let mut state = self.inner.state.lock().await;
        self.dispatch(&mut state, SessionEvent::Disconnect).await
    }

    /// Start a reconnection sequence to the last device, re-enabling
    /// automatic reconnection after an explicit disconnect.
    pub async fn reconnect(&self) -> Result<(), DeviceError> {
        let mut state = self.inner.state.lock().await;
        self.dispatch(&mut state, SessionEvent::RetryReconnect).await
    }

    /// Feed one transport event.
    pub async fn handle_transport_event(&self, event: TransportEvent) {
        let mut state = self.inner.state.lock().await;
        let session_event = match event {
            TransportEvent::Data(bytes) => {
                self.handle_data(&mut state, &bytes);
                return;
            },
            TransportEvent::Established => SessionEvent::LinkEstablished,
            TransportEvent::Failed(reason) => SessionEvent::LinkFailed { reason },
            TransportEvent::Lost(reason) => SessionEvent::LinkLost { reason },
            TransportEvent::RadioUnavailable(error) => SessionEvent::RadioUnavailable { error },
        };

        // Transport events never fail in the session.
        if let Err(e) = self.dispatch(&mut state, session_event).await {
            tracing::error!("transport event rejected: {}", e);
        }
    }

    /// Spawn a task forwarding every event from `events` into the device.
    ///
    /// The task holds the device weakly. It ends when the sender side is
    /// dropped or the last device handle goes away.
    pub fn spawn_event_pump(&self, mut events: mpsc::Receiver<TransportEvent>) -> JoinHandle<()> {
        let weak: Weak<Inner<T, E>> = Arc::downgrade(&self.inner);
        // Closes when `Inner` drops.
        let mut alive = self.inner.connection.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => {
                        let Some(event) = event else {
                            tracing::debug!("transport event stream closed");
                            return;
                        };
                        let Some(inner) = weak.upgrade() else {
                            break;
                        };
                        CubeDevice { inner }.handle_transport_event(event).await;
                    },
                    changed = alive.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    },
                }
            }
            tracing::debug!("device dropped, stopping event pump");
        })
    }

    /// Ask for a battery reading without waiting.
    pub async fn request_battery(&self) -> Result<(), DeviceError> {
        self.send_command(Command::GetBattery).await
    }

    /// Ask for the full state without waiting.
    pub async fn request_state(&self) -> Result<(), DeviceError> {
        self.send_command(Command::GetState).await
    }

    /// Ask for the hardware variant without waiting.
    pub async fn request_cube_type(&self) -> Result<(), DeviceError> {
        self.send_command(Command::GetCubeType).await
    }

    /// Ask for offline statistics without waiting.
    pub async fn request_offline_stats(&self) -> Result<(), DeviceError> {
        self.send_command(Command::GetOfflineStats).await
    }

    /// Request the battery level and wait for the next reading.
    ///
    /// Any battery notification arriving after the request satisfies it,
    /// including one another caller asked for.
    pub async fn battery(&self) -> Result<u8, DeviceError> {
        self.await_response(Command::GetBattery, |r| &r.battery).await
    }

    /// Request the full state and wait for the next snapshot.
    pub async fn state(&self) -> Result<CubeState, DeviceError> {
        self.await_response(Command::GetState, |r| &r.state).await
    }

    /// Request the hardware variant and wait for it.
    pub async fn cube_type(&self) -> Result<CubeType, DeviceError> {
        self.await_response(Command::GetCubeType, |r| &r.cube_type).await
    }

    /// Request offline statistics and wait for them.
    pub async fn offline_stats(&self) -> Result<String, DeviceError> {
        self.await_response(Command::GetOfflineStats, |r| &r.offline_stats).await
    }

    /// Reset the cube's internal state to solved.
    pub async fn reset_to_solved(&self) -> Result<(), DeviceError> {
        self.send_command(Command::ResetToSolved).await
    }

    /// Reboot the cube. The link will drop.
    pub async fn reboot(&self) -> Result<(), DeviceError> {
        self.send_command(Command::Reboot).await
    }

    /// Start orientation streaming.
    pub async fn enable_orientation(&self) -> Result<(), DeviceError> {
        self.send_command(Command::EnableOrientation).await
    }

    /// Stop orientation streaming.
    pub async fn disable_orientation(&self) -> Result<(), DeviceError> {
        self.send_command(Command::DisableOrientation).await
    }

    /// Recalibrate the orientation sensor.
    pub async fn calibrate_orientation(&self) -> Result<(), DeviceError> {
        self.send_command(Command::CalibrateOrientation).await
    }

    /// Flash the LEDs.
    pub async fn flash_led(&self) -> Result<(), DeviceError> {
        self.send_command(Command::FlashLed).await
    }

    /// Flash the LEDs slowly.
    pub async fn flash_led_slow(&self) -> Result<(), DeviceError> {
        self.send_command(Command::FlashLedSlow).await
    }

    /// Toggle the backlight.
    pub async fn toggle_backlight(&self) -> Result<(), DeviceError> {
        self.send_command(Command::ToggleBacklight).await
    }

    /// Toggle the animated backlight.
    pub async fn toggle_animated_backlight(&self) -> Result<(), DeviceError> {
        self.send_command(Command::ToggleAnimatedBacklight).await
    }

    /// Moves seen since creation or the last [`clear_moves`](Self::clear_moves).
    ///
    /// The log survives reconnects.
    pub async fn moves(&self) -> MoveSequence {
        self.inner.state.lock().await.moves.clone()
    }

    /// Empty the move log.
    pub async fn clear_moves(&self) {
        self.inner.state.lock().await.moves.clear();
    }

    /// Use the current orientation as the zero pose.
    ///
    /// Returns false if no orientation sample has arrived yet.
    pub async fn set_home_orientation(&self) -> bool {
        self.inner.state.lock().await.orientation.set_home_to_current()
    }

    /// Report absolute orientation again.
    pub async fn clear_home_orientation(&self) {
        self.inner.state.lock().await.orientation.clear_home();
    }

    /// Last battery reading, without asking the cube.
    pub async fn last_battery(&self) -> Option<u8> {
        self.inner.state.lock().await.responses.battery.value()
    }

    /// Last state snapshot, without asking the cube.
    pub async fn last_state(&self) -> Option<CubeState> {
        self.inner.state.lock().await.responses.state.value()
    }

    /// Decode counters.
    pub async fn frame_stats(&self) -> FrameStats {
        FrameStats::from(self.inner.state.lock().await.decoder.stats())
    }

    /// Write one command if connected.
    pub async fn send_command(&self, command: Command) -> Result<(), DeviceError> {
        if self.connection_state() != ConnectionState::Connected {
            return Err(DeviceError::NotConnected);
        }
        tracing::debug!(%command, "sending command");
        self.inner.transport.write(&command.to_bytes()).await?;
        Ok(())
    }

    async fn await_response<V: Clone>(
        &self,
        command: Command,
        slot: fn(&ResponseCache) -> &Observed<V>,
    ) -> Result<V, DeviceError> {
        let mut watch = self.inner.connection.subscribe();
        let since = slot(&self.inner.state.lock().await.responses).version();

        self.send_command(command).await?;

        let deadline = self.inner.env.now() + self.inner.config.command_timeout;
        loop {
            if let Some(value) = slot(&self.inner.state.lock().await.responses).newer_than(since) {
                return Ok(value);
            }
            if *watch.borrow_and_update() != ConnectionState::Connected {
                return Err(DeviceError::Disconnected);
            }
            if self.inner.env.now() >= deadline {
                tracing::warn!(%command, "response timed out");
                return Err(DeviceError::Timeout { command });
            }

            tokio::select! {
                () = self.inner.env.sleep(self.inner.config.poll_interval) => {},
                changed = watch.changed() => {
                    if changed.is_err() {
                        return Err(DeviceError::Disconnected);
                    }
                },
            }
        }
    }

    fn handle_data(&self, state: &mut DeviceState, bytes: &[u8]) {
        for payload in state.decoder.push(bytes) {
            self.apply_payload(state, payload);
        }
    }

    fn apply_payload(&self, state: &mut DeviceState, payload: Payload) {
        match payload {
            Payload::Rotation(moves) => {
                for mv in moves {
                    state.moves.push(mv);
                    self.publish(CubeEvent::Move(mv));
                }
            },
            Payload::State(cube) => {
                state.responses.state.record(cube);
                self.publish(CubeEvent::StateUpdated(cube));
            },
            Payload::Orientation(raw) => {
                let orientation = state.orientation.process(raw);
                self.publish(CubeEvent::OrientationUpdated(orientation));
            },
            Payload::Battery(percent) => {
                state.responses.battery.record(percent);
                self.publish(CubeEvent::BatteryUpdated(percent));
            },
            Payload::OfflineStats(text) => {
                tracing::info!(stats = %text, "offline stats");
                state.responses.offline_stats.record(text.clone());
                self.publish(CubeEvent::OfflineStats(text));
            },
            Payload::CubeType(cube_type) => {
                state.responses.cube_type.record(cube_type);
                self.publish(CubeEvent::CubeTypeReceived(cube_type));
            },
        }
    }

    fn publish(&self, event: CubeEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Run one session event plus every follow-up it causes.
    async fn dispatch(
        &self,
        state: &mut DeviceState,
        event: SessionEvent,
    ) -> Result<(), DeviceError> {
        let mut pending = VecDeque::from([event]);
        let mut first = true;

        while let Some(event) = pending.pop_front() {
            let actions = match state.session.handle(event) {
                Ok(actions) => actions,
                Err(e) if first => return Err(e.into()),
                Err(e) => {
                    tracing::error!("follow-up event rejected: {}", e);
                    continue;
                },
            };
            first = false;

            for action in actions {
                if let Some(follow_up) = self.execute(state, action).await {
                    pending.push_back(follow_up);
                }
            }
            self.inner.connection.send_replace(state.session.state());
        }
        Ok(())
    }

    async fn execute(&self, state: &mut DeviceState, action: SessionAction) -> Option<SessionEvent> {
        match action {
            SessionAction::OpenLink { device } => {
                self.inner.connection.send_replace(state.session.state());
                state.decoder.clear();
                state.abort_link();
                state.link_timed_out = false;
                state.link_attempts += 1;
                let attempt = state.link_attempts;
                let task = self.spawn_link_task(device, attempt);
                state.link_task = Some((attempt, task));
                None
            },

            SessionAction::CloseLink => {
                state.abort_link();
                if let Err(e) = self.inner.transport.disconnect().await {
                    tracing::warn!("transport disconnect failed: {}", e);
                }
                Some(SessionEvent::LinkClosed)
            },

            SessionAction::SendCommand(command) => {
                tracing::debug!(%command, "sending initial request");
                if let Err(e) = self.inner.transport.write(&command.to_bytes()).await {
                    tracing::warn!(%command, "initial request failed: {}", e);
                }
                None
            },

            SessionAction::ScheduleReconnect { delay, attempt, generation } => {
                tracing::info!(attempt, ?delay, "scheduling reconnect");
                state.abort_reconnect();
                let task = self.spawn_reconnect_timer(delay, generation);
                state.reconnect_task = Some((generation, task));
                None
            },

            SessionAction::CancelReconnect => {
                state.abort_reconnect();
                None
            },

            SessionAction::Notify(notice) => {
                match &notice {
                    SessionNotice::ConnectionFailed { reason } => {
                        state.last_failure = Some(reason.clone());
                        state.abort_link();
                        state.decoder.clear();
                        state.orientation.reset();
                    },
                    SessionNotice::Disconnected { .. } => {
                        state.abort_link();
                        state.decoder.clear();
                        state.orientation.reset();
                    },
                    SessionNotice::Connected { .. } => {},
                }
                self.publish(CubeEvent::from(notice));
                None
            },

            SessionAction::Log { level, message } => {
                match level {
                    LogLevel::Debug => tracing::debug!("{}", message),
                    LogLevel::Info => tracing::info!("{}", message),
                    LogLevel::Warn => tracing::warn!("{}", message),
                    LogLevel::Error => tracing::error!("{}", message),
                }
                None
            },
        }
    }

    /// Run `transport.connect` for one attempt and report the outcome.
    ///
    /// Outcomes of an attempt that has since been replaced or abandoned are
    /// dropped.
    fn spawn_link_task(&self, device: DeviceId, attempt: u64) -> JoinHandle<()> {
        let weak: Weak<Inner<T, E>> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let scan_timeout = inner.config.scan_timeout;
            let outcome = tokio::select! {
                result = inner.transport.connect(&device) => Some(result),
                () = inner.env.sleep(scan_timeout) => None,
            };

            let device = CubeDevice { inner };
            let mut state = device.inner.state.lock().await;
            if !state.link_task.as_ref().is_some_and(|(a, _)| *a == attempt) {
                tracing::debug!(attempt, "ignoring outcome of abandoned link attempt");
                return;
            }
            // Detach our own handle so the follow-up cannot abort us.
            state.link_task = None;

            let event = match outcome {
                Some(Ok(LinkStatus::Established)) => SessionEvent::LinkEstablished,
                Some(Ok(LinkStatus::Pending)) => return,
                Some(Err(TransportError::Radio(error))) => SessionEvent::RadioUnavailable { error },
                Some(Err(e)) => SessionEvent::LinkFailed { reason: e.to_string() },
                None => {
                    tracing::warn!(attempt, ?scan_timeout, "transport connect timed out");
                    state.link_timed_out = true;
                    SessionEvent::LinkFailed {
                        reason: format!("no link within {scan_timeout:?}"),
                    }
                },
            };
            if let Err(e) = device.dispatch(&mut state, event).await {
                tracing::error!("link outcome rejected: {}", e);
            }
        })
    }

    fn spawn_reconnect_timer(&self, delay: std::time::Duration, generation: u64) -> JoinHandle<()> {
        let weak: Weak<Inner<T, E>> = Arc::downgrade(&self.inner);
        let env = self.inner.env.clone();
        tokio::spawn(async move {
            env.sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let device = CubeDevice { inner };
            let mut state = device.inner.state.lock().await;

            // Detach our own handle so a follow-up schedule cannot abort us.
            if state.reconnect_task.as_ref().is_some_and(|(g, _)| *g == generation) {
                state.reconnect_task = None;
            }
            if let Err(e) =
                device.dispatch(&mut state, SessionEvent::ReconnectTimerFired { generation }).await
            {
                tracing::error!("reconnect timer rejected: {}", e);
            }
        })
    }
}
