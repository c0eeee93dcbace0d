//! Connection session state machine.
//!
//! Sans-IO: [`Session::handle`] consumes a [`SessionEvent`] and returns the
//! [`SessionAction`]s the driver must perform. The machine never touches the
//! transport, never sleeps and never spawns. Timers are requested through
//! [`SessionAction::ScheduleReconnect`] and come back as
//! [`SessionEvent::ReconnectTimerFired`] carrying the generation they were
//! scheduled with, so a timer that outlived a manual connect or disconnect is
//! recognized as stale and ignored.
//!
//! # States
//!
//! ```text
//! Disconnected --Connect--> Connecting --LinkEstablished--> Connected
//!      ^                        |                              |
//!      +------LinkFailed--------+                          Disconnect
//!      |                                                       v
//!      +-------------LinkClosed---------------------------- Disconnecting
//!      +-------------LinkLost (from Connected, may reconnect)
//! ```
//!
//! # Reconnection
//!
//! An unexpected loss, or an explicit [`SessionEvent::RetryReconnect`],
//! triggers one attempt after the configured delay. A failed attempt leaves
//! the counter where it is and schedules nothing, so attempts happen at most
//! once per trigger. When the counter reaches a non-zero limit the trigger is
//! dropped and the counter starts over.

use std::{fmt, time::Duration};

use cubelink_proto::Command;
use serde::{Deserialize, Serialize};

use crate::{
    config::SessionConfig,
    error::{RadioError, SessionError},
};

/// Commands sent as soon as a link comes up.
pub const INITIAL_REQUESTS: [Command; 3] =
    [Command::GetState, Command::GetBattery, Command::GetCubeType];

/// Opaque identifier the transport uses to find a cube.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap a transport-specific identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Link lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No link.
    #[default]
    Disconnected,
    /// Link requested, not yet established.
    Connecting,
    /// Link up.
    Connected,
    /// Close requested, waiting for the transport to confirm.
    Disconnecting,
}

/// Severity for [`SessionAction::Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Lifecycle milestones.
    Info,
    /// Something was ignored or given up on.
    Warn,
    /// Unexpected failure.
    Error,
}

/// Inputs to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Caller asked to connect.
    Connect {
        /// Target cube.
        device: DeviceId,
    },
    /// Caller asked to disconnect.
    Disconnect,
    /// Transport reports the link is up.
    LinkEstablished,
    /// Transport could not bring the link up.
    LinkFailed {
        /// Transport-supplied reason.
        reason: String,
    },
    /// Transport confirms a requested close.
    LinkClosed,
    /// Link dropped without being asked to.
    LinkLost {
        /// Transport-supplied reason.
        reason: String,
    },
    /// The radio went away.
    RadioUnavailable {
        /// What happened to it.
        error: RadioError,
    },
    /// A timer from [`SessionAction::ScheduleReconnect`] elapsed.
    ReconnectTimerFired {
        /// Generation the timer was scheduled with.
        generation: u64,
    },
    /// Caller explicitly asks for a reconnection sequence, clearing any
    /// earlier user disconnect.
    RetryReconnect,
}

/// Outcomes the driver reports to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// Link is up.
    Connected {
        /// Connected cube.
        device: DeviceId,
    },
    /// A connection attempt failed.
    ConnectionFailed {
        /// Why.
        reason: String,
    },
    /// Link is down. `None` for a requested disconnect.
    Disconnected {
        /// Why, if it was not requested.
        reason: Option<String>,
    },
}

/// Effects the driver must carry out, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Ask the transport to connect.
    OpenLink {
        /// Target cube.
        device: DeviceId,
    },
    /// Ask the transport to close the link.
    CloseLink,
    /// Write a command.
    SendCommand(Command),
    /// Arm a reconnection timer.
    ScheduleReconnect {
        /// How long to wait.
        delay: Duration,
        /// 1-based attempt number.
        attempt: u32,
        /// Echo back in [`SessionEvent::ReconnectTimerFired`].
        generation: u64,
    },
    /// Disarm any reconnection timer.
    CancelReconnect,
    /// Tell subscribers.
    Notify(SessionNotice),
    /// Log a message.
    Log {
        /// Severity.
        level: LogLevel,
        /// Text.
        message: String,
    },
}

/// Connection lifecycle and reconnection policy.
#[derive(Debug, Clone)]
pub struct Session {
    state: ConnectionState,
    device: Option<DeviceId>,
    auto_reconnect: bool,
    max_reconnect_attempts: u32,
    reconnect_delay: Duration,
    attempts: u32,
    reconnecting: bool,
    attempt_in_flight: bool,
    user_disconnected: bool,
    generation: u64,
}

impl Session {
    /// New session in [`ConnectionState::Disconnected`].
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            device: None,
            auto_reconnect: config.auto_reconnect,
            max_reconnect_attempts: config.max_reconnect_attempts,
            reconnect_delay: config.reconnect_delay,
            attempts: 0,
            reconnecting: false,
            attempt_in_flight: false,
            user_disconnected: false,
            generation: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Last device a connection was requested for.
    pub fn device(&self) -> Option<&DeviceId> {
        self.device.as_ref()
    }

    /// Reconnection attempts made since the last success or give-up.
    pub fn reconnect_attempts(&self) -> u32 {
        self.attempts
    }

    /// True while a reconnection timer is armed.
    pub fn is_reconnecting(&self) -> bool {
        self.reconnecting
    }

    /// Current timer generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Process one event.
    ///
    /// # Errors
    ///
    /// - `InvalidState` for `Connect` outside `Disconnected`, or
    ///   `RetryReconnect` outside `Disconnected`.
    /// - `NoKnownDevice` for `RetryReconnect` before any connect.
    ///
    /// Transport events never fail; ones that make no sense in the current
    /// state are ignored with a log action.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<SessionAction>, SessionError> {
        match event {
            SessionEvent::Connect { device } => self.handle_connect(device),
            SessionEvent::Disconnect => Ok(self.handle_disconnect()),
            SessionEvent::LinkEstablished => Ok(self.handle_established()),
            SessionEvent::LinkFailed { reason } => Ok(self.handle_failed(reason)),
            SessionEvent::LinkClosed => Ok(self.handle_closed()),
            SessionEvent::LinkLost { reason } => Ok(self.handle_lost(reason)),
            SessionEvent::RadioUnavailable { error } => Ok(self.handle_radio(error)),
            SessionEvent::ReconnectTimerFired { generation } => Ok(self.handle_timer(generation)),
            SessionEvent::RetryReconnect => self.handle_retry(),
        }
    }

    fn handle_connect(&mut self, device: DeviceId) -> Result<Vec<SessionAction>, SessionError> {
        if self.state != ConnectionState::Disconnected {
            return Err(SessionError::InvalidState { state: self.state, operation: "connect" });
        }

        let mut actions = self.cancel_reconnect();
        self.user_disconnected = false;
        self.attempt_in_flight = false;
        self.state = ConnectionState::Connecting;
        self.device = Some(device.clone());

        actions.push(log(LogLevel::Info, format!("connecting to {device}")));
        actions.push(SessionAction::OpenLink { device });
        Ok(actions)
    }

    fn handle_disconnect(&mut self) -> Vec<SessionAction> {
        self.user_disconnected = true;
        let mut actions = self.cancel_reconnect();

        match self.state {
            ConnectionState::Connected | ConnectionState::Connecting => {
                self.state = ConnectionState::Disconnecting;
                self.attempt_in_flight = false;
                actions.push(SessionAction::CloseLink);
            },
            ConnectionState::Disconnecting => {
                actions.push(log(LogLevel::Debug, "disconnect already in progress"));
            },
            ConnectionState::Disconnected => {},
        }
        actions
    }

    fn handle_established(&mut self) -> Vec<SessionAction> {
        if self.state != ConnectionState::Connecting {
            return vec![self.ignored("link established")];
        }
        let Some(device) = self.device.clone() else {
            return vec![self.ignored("link established")];
        };

        self.state = ConnectionState::Connected;
        self.attempts = 0;
        self.attempt_in_flight = false;

        let mut actions = vec![
            log(LogLevel::Info, format!("connected to {device}")),
            SessionAction::Notify(SessionNotice::Connected { device }),
        ];
        actions.extend(INITIAL_REQUESTS.into_iter().map(SessionAction::SendCommand));
        actions
    }

    fn handle_failed(&mut self, reason: String) -> Vec<SessionAction> {
        match self.state {
            ConnectionState::Connecting => {},
            ConnectionState::Disconnecting => return self.handle_closed(),
            _ => return vec![self.ignored("link failure")],
        }

        self.state = ConnectionState::Disconnected;
        let mut actions = vec![log(LogLevel::Warn, format!("connection failed: {reason}"))];

        // The counter stays where it is; the next loss or retry continues it.
        if std::mem::take(&mut self.attempt_in_flight) {
            actions.push(log(
                LogLevel::Info,
                format!("reconnect attempt {} failed, waiting for next trigger", self.attempts),
            ));
        }
        actions.push(SessionAction::Notify(SessionNotice::ConnectionFailed { reason }));
        actions
    }

    fn handle_closed(&mut self) -> Vec<SessionAction> {
        match self.state {
            ConnectionState::Disconnecting => {
                self.state = ConnectionState::Disconnected;
                vec![
                    log(LogLevel::Info, "disconnected"),
                    SessionAction::Notify(SessionNotice::Disconnected { reason: None }),
                ]
            },
            ConnectionState::Connected => self.handle_lost("closed by peer".to_owned()),
            ConnectionState::Connecting => self.handle_failed("closed by peer".to_owned()),
            ConnectionState::Disconnected => vec![self.ignored("link closed")],
        }
    }

    fn handle_lost(&mut self, reason: String) -> Vec<SessionAction> {
        match self.state {
            ConnectionState::Connected => {},
            ConnectionState::Connecting => return self.handle_failed(reason),
            ConnectionState::Disconnecting => return self.handle_closed(),
            ConnectionState::Disconnected => return vec![self.ignored("link loss")],
        }

        self.state = ConnectionState::Disconnected;
        let mut actions = vec![
            log(LogLevel::Warn, format!("link lost: {reason}")),
            SessionAction::Notify(SessionNotice::Disconnected { reason: Some(reason) }),
        ];
        if self.wants_reconnect() {
            actions.extend(self.trigger_reconnect());
        }
        actions
    }

    fn handle_radio(&mut self, error: RadioError) -> Vec<SessionAction> {
        let previous = self.state;
        let mut actions = self.cancel_reconnect();
        self.state = ConnectionState::Disconnected;
        self.attempts = 0;
        self.attempt_in_flight = false;

        actions.push(log(LogLevel::Error, format!("radio error: {error}")));
        match previous {
            ConnectionState::Connecting => actions.push(SessionAction::Notify(
                SessionNotice::ConnectionFailed { reason: error.to_string() },
            )),
            ConnectionState::Connected | ConnectionState::Disconnecting => {
                actions.push(SessionAction::Notify(SessionNotice::Disconnected {
                    reason: Some(error.to_string()),
                }));
            },
            ConnectionState::Disconnected => {},
        }
        actions
    }

    fn handle_timer(&mut self, generation: u64) -> Vec<SessionAction> {
        if generation != self.generation || !self.reconnecting {
            return vec![log(LogLevel::Debug, format!("stale reconnect timer {generation}"))];
        }
        self.reconnecting = false;

        if self.state != ConnectionState::Disconnected || self.user_disconnected {
            return vec![log(LogLevel::Debug, "reconnection no longer wanted")];
        }
        let Some(device) = self.device.clone() else {
            return vec![log(LogLevel::Warn, "reconnect timer fired without a known device")];
        };

        self.state = ConnectionState::Connecting;
        self.attempt_in_flight = true;
        vec![
            log(LogLevel::Info, format!("reconnect attempt {} to {device}", self.attempts)),
            SessionAction::OpenLink { device },
        ]
    }

    fn handle_retry(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        if self.state != ConnectionState::Disconnected {
            return Err(SessionError::InvalidState {
                state: self.state,
                operation: "reconnect",
            });
        }
        if self.device.is_none() {
            return Err(SessionError::NoKnownDevice);
        }
        self.user_disconnected = false;
        Ok(self.trigger_reconnect())
    }

    fn wants_reconnect(&self) -> bool {
        self.auto_reconnect && !self.user_disconnected
    }

    fn trigger_reconnect(&mut self) -> Vec<SessionAction> {
        if self.reconnecting {
            return vec![log(LogLevel::Debug, "reconnection already scheduled")];
        }

        if self.max_reconnect_attempts > 0 && self.attempts >= self.max_reconnect_attempts {
            let given_up = self.attempts;
            self.attempts = 0;
            return vec![log(LogLevel::Warn, format!("giving up after {given_up} reconnect attempts"))];
        }

        self.attempts += 1;
        self.generation = self.generation.wrapping_add(1);
        self.reconnecting = true;
        vec![SessionAction::ScheduleReconnect {
            delay: self.reconnect_delay,
            attempt: self.attempts,
            generation: self.generation,
        }]
    }

    fn cancel_reconnect(&mut self) -> Vec<SessionAction> {
        if !self.reconnecting {
            return Vec::new();
        }
        self.reconnecting = false;
        self.generation = self.generation.wrapping_add(1);
        vec![SessionAction::CancelReconnect]
    }

    fn ignored(&self, what: &str) -> SessionAction {
        log(LogLevel::Debug, format!("ignoring {what} while {:?}", self.state))
    }
}

fn log(level: LogLevel, message: impl Into<String>) -> SessionAction {
    SessionAction::Log { level, message: message.into() }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(auto_reconnect: bool, max: u32) -> Session {
        let config = SessionConfig {
            auto_reconnect,
            max_reconnect_attempts: max,
            reconnect_delay: Duration::from_secs(2),
            ..Default::default()
        };
        Session::new(&config)
    }

    fn without_logs(actions: Vec<SessionAction>) -> Vec<SessionAction> {
        actions.into_iter().filter(|a| !matches!(a, SessionAction::Log { .. })).collect()
    }

    fn device() -> DeviceId {
        DeviceId::new("cube-1")
    }

    fn connected(s: &mut Session) {
        s.handle(SessionEvent::Connect { device: device() }).unwrap();
        s.handle(SessionEvent::LinkEstablished).unwrap();
        assert_eq!(s.state(), ConnectionState::Connected);
    }

    fn lose(s: &mut Session) -> Vec<SessionAction> {
        without_logs(s.handle(SessionEvent::LinkLost { reason: "gone".into() }).unwrap())
    }

    fn fire(s: &mut Session) -> Vec<SessionAction> {
        let generation = s.generation();
        without_logs(s.handle(SessionEvent::ReconnectTimerFired { generation }).unwrap())
    }

    #[test]
    fn connect_opens_link() {
        let mut s = session(true, 3);
        let actions = without_logs(s.handle(SessionEvent::Connect { device: device() }).unwrap());
        assert_eq!(actions, vec![SessionAction::OpenLink { device: device() }]);
        assert_eq!(s.state(), ConnectionState::Connecting);
    }

    #[test]
    fn established_sends_initial_requests() {
        let mut s = session(true, 3);
        s.handle(SessionEvent::Connect { device: device() }).unwrap();
        let actions = without_logs(s.handle(SessionEvent::LinkEstablished).unwrap());
        assert_eq!(actions, vec![
            SessionAction::Notify(SessionNotice::Connected { device: device() }),
            SessionAction::SendCommand(Command::GetState),
            SessionAction::SendCommand(Command::GetBattery),
            SessionAction::SendCommand(Command::GetCubeType),
        ]);
    }

    #[test]
    fn connect_twice_is_invalid() {
        let mut s = session(true, 3);
        connected(&mut s);
        let err = s.handle(SessionEvent::Connect { device: device() }).unwrap_err();
        assert_eq!(err, SessionError::InvalidState {
            state: ConnectionState::Connected,
            operation: "connect",
        });
    }

    #[test]
    fn failed_connect_reports_reason() {
        let mut s = session(true, 3);
        s.handle(SessionEvent::Connect { device: device() }).unwrap();
        let actions = without_logs(s.handle(SessionEvent::LinkFailed { reason: "nope".into() }).unwrap());
        assert_eq!(actions, vec![SessionAction::Notify(SessionNotice::ConnectionFailed {
            reason: "nope".into()
        })]);
        assert_eq!(s.state(), ConnectionState::Disconnected);
        assert!(!s.is_reconnecting());
    }

    #[test]
    fn user_disconnect_goes_through_disconnecting() {
        let mut s = session(true, 3);
        connected(&mut s);
        let actions = without_logs(s.handle(SessionEvent::Disconnect).unwrap());
        assert_eq!(actions, vec![SessionAction::CloseLink]);
        assert_eq!(s.state(), ConnectionState::Disconnecting);

        let actions = without_logs(s.handle(SessionEvent::LinkClosed).unwrap());
        assert_eq!(actions, vec![SessionAction::Notify(SessionNotice::Disconnected {
            reason: None
        })]);
        assert_eq!(s.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn loss_while_disconnecting_completes_close_without_reconnect() {
        let mut s = session(true, 3);
        connected(&mut s);
        s.handle(SessionEvent::Disconnect).unwrap();
        let actions = lose(&mut s);
        assert_eq!(actions, vec![SessionAction::Notify(SessionNotice::Disconnected {
            reason: None
        })]);
        assert!(!s.is_reconnecting());
    }

    #[test]
    fn unexpected_loss_schedules_reconnect() {
        let mut s = session(true, 3);
        connected(&mut s);
        let actions = lose(&mut s);
        assert_eq!(actions, vec![
            SessionAction::Notify(SessionNotice::Disconnected { reason: Some("gone".into()) }),
            SessionAction::ScheduleReconnect {
                delay: Duration::from_secs(2),
                attempt: 1,
                generation: s.generation(),
            },
        ]);
        assert_eq!(s.state(), ConnectionState::Disconnected);

        assert_eq!(fire(&mut s), vec![SessionAction::OpenLink { device: device() }]);
        assert_eq!(s.state(), ConnectionState::Connecting);

        s.handle(SessionEvent::LinkEstablished).unwrap();
        assert_eq!(s.reconnect_attempts(), 0);
    }

    #[test]
    fn loss_without_auto_reconnect_stays_down() {
        let mut s = session(false, 3);
        connected(&mut s);
        let actions = lose(&mut s);
        assert_eq!(actions.len(), 1);
        assert!(!s.is_reconnecting());
    }

    #[test]
    fn failed_reconnect_waits_for_next_trigger() {
        let mut s = session(true, 3);
        connected(&mut s);
        lose(&mut s);

        fire(&mut s);
        let actions = without_logs(s.handle(SessionEvent::LinkFailed { reason: "x".into() }).unwrap());
        assert_eq!(actions, vec![SessionAction::Notify(SessionNotice::ConnectionFailed {
            reason: "x".into()
        })]);
        assert_eq!(s.reconnect_attempts(), 1);
        assert!(!s.is_reconnecting());
    }

    #[test]
    fn retries_give_up_at_max_and_reset() {
        let mut s = session(true, 2);
        connected(&mut s);
        lose(&mut s);
        fire(&mut s);
        s.handle(SessionEvent::LinkFailed { reason: "x".into() }).unwrap();

        let actions = without_logs(s.handle(SessionEvent::RetryReconnect).unwrap());
        assert!(matches!(actions.as_slice(), [SessionAction::ScheduleReconnect { attempt: 2, .. }]));
        fire(&mut s);
        s.handle(SessionEvent::LinkFailed { reason: "x".into() }).unwrap();

        let actions = without_logs(s.handle(SessionEvent::RetryReconnect).unwrap());
        assert!(actions.is_empty(), "gives up silently");
        assert_eq!(s.reconnect_attempts(), 0);
        assert!(!s.is_reconnecting());

        // Counting starts fresh.
        let actions = without_logs(s.handle(SessionEvent::RetryReconnect).unwrap());
        assert!(matches!(actions.as_slice(), [SessionAction::ScheduleReconnect { attempt: 1, .. }]));
    }

    #[test]
    fn unlimited_attempts_keep_scheduling() {
        let mut s = session(true, 0);
        connected(&mut s);
        lose(&mut s);
        for attempt in 2..10 {
            fire(&mut s);
            s.handle(SessionEvent::LinkFailed { reason: "x".into() }).unwrap();
            let actions = s.handle(SessionEvent::RetryReconnect).unwrap();
            assert_eq!(actions, vec![SessionAction::ScheduleReconnect {
                delay: Duration::from_secs(2),
                attempt,
                generation: s.generation(),
            }]);
        }
    }

    #[test]
    fn manual_connect_supersedes_pending_reconnect() {
        let mut s = session(true, 3);
        connected(&mut s);
        lose(&mut s);
        let stale = s.generation();

        let actions = without_logs(s.handle(SessionEvent::Connect { device: device() }).unwrap());
        assert_eq!(actions[0], SessionAction::CancelReconnect);
        assert!(!s.is_reconnecting());

        let actions = without_logs(
            s.handle(SessionEvent::ReconnectTimerFired { generation: stale }).unwrap(),
        );
        assert!(actions.is_empty());
        assert_eq!(s.state(), ConnectionState::Connecting);
    }

    #[test]
    fn disconnect_while_disconnected_cancels_reconnect() {
        let mut s = session(true, 3);
        connected(&mut s);
        lose(&mut s);
        let actions = without_logs(s.handle(SessionEvent::Disconnect).unwrap());
        assert_eq!(actions, vec![SessionAction::CancelReconnect]);
        assert_eq!(s.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn retry_after_user_disconnect_opts_back_in() {
        let mut s = session(true, 3);
        connected(&mut s);
        s.handle(SessionEvent::Disconnect).unwrap();
        s.handle(SessionEvent::LinkClosed).unwrap();

        let actions = s.handle(SessionEvent::RetryReconnect).unwrap();
        assert!(matches!(actions.as_slice(), [SessionAction::ScheduleReconnect { attempt: 1, .. }]));
        assert_eq!(fire(&mut s), vec![SessionAction::OpenLink { device: device() }]);
    }

    #[test]
    fn retry_requires_known_device() {
        let mut s = session(true, 3);
        assert_eq!(s.handle(SessionEvent::RetryReconnect), Err(SessionError::NoKnownDevice));
    }

    #[test]
    fn radio_loss_is_terminal_for_session() {
        let mut s = session(true, 3);
        connected(&mut s);
        let actions = without_logs(
            s.handle(SessionEvent::RadioUnavailable { error: RadioError::PoweredOff }).unwrap(),
        );
        assert_eq!(actions, vec![SessionAction::Notify(SessionNotice::Disconnected {
            reason: Some("bluetooth powered off".into())
        })]);
        assert_eq!(s.state(), ConnectionState::Disconnected);
        assert!(!s.is_reconnecting());
    }

    #[test]
    fn stray_transport_events_are_ignored() {
        let mut s = session(true, 3);
        for event in [
            SessionEvent::LinkEstablished,
            SessionEvent::LinkClosed,
            SessionEvent::LinkLost { reason: "x".into() },
            SessionEvent::LinkFailed { reason: "x".into() },
            SessionEvent::ReconnectTimerFired { generation: 42 },
        ] {
            let actions = s.handle(event).unwrap();
            assert!(without_logs(actions).is_empty());
            assert_eq!(s.state(), ConnectionState::Disconnected);
        }
    }
}
