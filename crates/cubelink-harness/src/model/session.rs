//! Model session.

use cubelink_core::ConnectionState;

use super::operation::{Operation, OperationResult};

/// Observable state for oracle comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservableState {
    /// Connection state.
    pub state: ConnectionState,
    /// Reconnection attempts counted so far.
    pub attempts: u32,
    /// A reconnect timer is armed.
    pub reconnect_pending: bool,
    /// Total link open requests issued.
    pub links_opened: u32,
}

/// Model session - the reference implementation.
#[derive(Debug, Clone)]
pub struct ModelSession {
    auto_reconnect: bool,
    max_attempts: u32,
    state: ConnectionState,
    has_device: bool,
    user_disconnected: bool,
    timer_pending: bool,
    attempts: u32,
    links_opened: u32,
}

impl ModelSession {
    /// Create a disconnected model.
    pub fn new(auto_reconnect: bool, max_attempts: u32) -> Self {
        Self {
            auto_reconnect,
            max_attempts,
            state: ConnectionState::Disconnected,
            has_device: false,
            user_disconnected: false,
            timer_pending: false,
            attempts: 0,
            links_opened: 0,
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            state: self.state,
            attempts: self.attempts,
            reconnect_pending: self.timer_pending,
            links_opened: self.links_opened,
        }
    }

    /// Apply an operation and return the result.
    pub fn apply(&mut self, op: Operation) -> OperationResult {
        use ConnectionState::{Connected, Connecting, Disconnected, Disconnecting};

        match op {
            Operation::Connect => {
                if self.state != Disconnected {
                    return OperationResult::Rejected;
                }
                self.timer_pending = false;
                self.user_disconnected = false;
                self.has_device = true;
                self.open();
            },
            Operation::Disconnect => {
                self.user_disconnected = true;
                self.timer_pending = false;
                if matches!(self.state, Connected | Connecting) {
                    self.state = Disconnecting;
                }
            },
            Operation::LinkEstablished => {
                if self.state == Connecting {
                    self.state = Connected;
                    self.attempts = 0;
                }
            },
            Operation::LinkFailed => match self.state {
                Connecting => self.failed(),
                Disconnecting => self.state = Disconnected,
                Connected | Disconnected => {},
            },
            Operation::LinkClosed => match self.state {
                Disconnecting => self.state = Disconnected,
                Connected => self.lost(),
                Connecting => self.failed(),
                Disconnected => {},
            },
            Operation::LinkLost => match self.state {
                Connected => self.lost(),
                Connecting => self.failed(),
                Disconnecting => self.state = Disconnected,
                Disconnected => {},
            },
            Operation::RadioLost => {
                self.timer_pending = false;
                self.state = Disconnected;
                self.attempts = 0;
            },
            Operation::FireTimer { stale } => {
                if stale || !self.timer_pending {
                    return OperationResult::Ok;
                }
                self.timer_pending = false;
                if self.state == Disconnected && !self.user_disconnected && self.has_device {
                    self.open();
                }
            },
            Operation::Retry => {
                if self.state != Disconnected || !self.has_device {
                    return OperationResult::Rejected;
                }
                self.user_disconnected = false;
                self.schedule();
            },
        }
        OperationResult::Ok
    }

    fn open(&mut self) {
        self.state = ConnectionState::Connecting;
        self.links_opened += 1;
    }

    fn failed(&mut self) {
        // Failed attempts never reschedule on their own.
        self.state = ConnectionState::Disconnected;
    }

    fn lost(&mut self) {
        self.state = ConnectionState::Disconnected;
        if self.auto_reconnect && !self.user_disconnected {
            self.schedule();
        }
    }

    fn schedule(&mut self) {
        if self.timer_pending {
            return;
        }
        if self.max_attempts > 0 && self.attempts >= self.max_attempts {
            self.attempts = 0;
        } else {
            self.attempts += 1;
            self.timer_pending = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_then_timer_reopens() {
        let mut model = ModelSession::new(true, 3);
        model.apply(Operation::Connect);
        model.apply(Operation::LinkEstablished);
        model.apply(Operation::LinkLost);
        assert!(model.observable_state().reconnect_pending);

        model.apply(Operation::FireTimer { stale: false });
        let observed = model.observable_state();
        assert_eq!(observed.state, ConnectionState::Connecting);
        assert_eq!(observed.links_opened, 2);
    }

    #[test]
    fn failed_reconnect_keeps_count_without_rescheduling() {
        let mut model = ModelSession::new(true, 3);
        model.apply(Operation::Connect);
        model.apply(Operation::LinkEstablished);
        model.apply(Operation::LinkLost);
        model.apply(Operation::FireTimer { stale: false });
        model.apply(Operation::LinkFailed);

        let observed = model.observable_state();
        assert_eq!(observed.state, ConnectionState::Disconnected);
        assert_eq!(observed.attempts, 1);
        assert!(!observed.reconnect_pending);
    }

    #[test]
    fn retry_without_device_is_rejected() {
        let mut model = ModelSession::new(true, 3);
        assert!(model.apply(Operation::Retry).is_err());
    }
}
