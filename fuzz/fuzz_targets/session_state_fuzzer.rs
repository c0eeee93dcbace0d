//! Fuzz target for the [`Session`] connection state machine
//!
//! Reconnection must stay bounded and never fire behind the user's back.
//!
//! # Strategy
//!
//! - Event sequences: arbitrary caller requests and transport reports in any
//!   order, including ones invalid for the current state
//! - Timers: live, stale and far-future generations
//! - Config: auto-reconnect on/off and small attempt limits
//!
//! # Invariants
//!
//! - A rejected event leaves the state unchanged and emits nothing
//! - Attempt counter never exceeds a non-zero limit
//! - A pending reconnect exists only while disconnected
//! - After a user disconnect no link is opened until the next connect or
//!   retry
//! - `SendCommand` only follows a transition into `Connected`
//! - NEVER panic

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use cubelink_core::{
    ConnectionState, DeviceId, RadioError, Session, SessionAction, SessionConfig, SessionEvent,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Copy, Arbitrary)]
enum FuzzEvent {
    Connect,
    Disconnect,
    LinkEstablished,
    LinkFailed,
    LinkClosed,
    LinkLost,
    RadioUnavailable(u8),
    TimerFired { offset: i8 },
    RetryReconnect,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    auto_reconnect: bool,
    max_reconnect_attempts: u8,
    events: Vec<FuzzEvent>,
}

fn radio_error(tag: u8) -> RadioError {
    match tag % 3 {
        0 => RadioError::Unavailable,
        1 => RadioError::Unauthorized,
        _ => RadioError::PoweredOff,
    }
}

fuzz_target!(|input: FuzzInput| {
    let max = u32::from(input.max_reconnect_attempts % 5);
    let config = SessionConfig {
        auto_reconnect: input.auto_reconnect,
        max_reconnect_attempts: max,
        reconnect_delay: Duration::from_secs(1),
        ..Default::default()
    };
    let mut session = Session::new(&config);
    let mut user_disconnected = false;

    for event in input.events {
        let before = session.state();
        let event = match event {
            FuzzEvent::Connect => SessionEvent::Connect { device: DeviceId::new("fuzz-cube") },
            FuzzEvent::Disconnect => SessionEvent::Disconnect,
            FuzzEvent::LinkEstablished => SessionEvent::LinkEstablished,
            FuzzEvent::LinkFailed => SessionEvent::LinkFailed { reason: "fuzz".into() },
            FuzzEvent::LinkClosed => SessionEvent::LinkClosed,
            FuzzEvent::LinkLost => SessionEvent::LinkLost { reason: "fuzz".into() },
            FuzzEvent::RadioUnavailable(tag) => {
                SessionEvent::RadioUnavailable { error: radio_error(tag) }
            },
            FuzzEvent::TimerFired { offset } => SessionEvent::ReconnectTimerFired {
                generation: session.generation().wrapping_add_signed(i64::from(offset)),
            },
            FuzzEvent::RetryReconnect => SessionEvent::RetryReconnect,
        };

        if event == SessionEvent::Disconnect {
            user_disconnected = true;
        }
        let is_user_restart =
            matches!(event, SessionEvent::Connect { .. } | SessionEvent::RetryReconnect);

        match session.handle(event) {
            Ok(actions) => {
                if is_user_restart {
                    user_disconnected = false;
                }
                for action in &actions {
                    match action {
                        SessionAction::OpenLink { .. } => {
                            assert!(!user_disconnected, "link opened after user disconnect");
                            assert_eq!(session.state(), ConnectionState::Connecting);
                        },
                        SessionAction::SendCommand(_) => {
                            assert_eq!(before, ConnectionState::Connecting);
                            assert_eq!(session.state(), ConnectionState::Connected);
                        },
                        SessionAction::ScheduleReconnect { attempt, .. } => {
                            assert!(max == 0 || *attempt <= max);
                        },
                        _ => {},
                    }
                }
            },
            Err(_) => assert_eq!(session.state(), before, "rejected event changed state"),
        }

        assert!(max == 0 || session.reconnect_attempts() <= max);
        if session.is_reconnecting() {
            assert_eq!(session.state(), ConnectionState::Disconnected);
        }
    }
});
