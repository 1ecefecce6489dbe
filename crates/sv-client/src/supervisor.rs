//! Reconnection supervision
//!
//! Tracks whether the session should keep itself connected and decides
//! what to do after each drop. The policy is a fixed delay with no backoff
//! growth and no retry cap: the game is a long-lived local companion
//! process, so reconnection repeats until it succeeds or the session is
//! stopped.

use std::time::Duration;

/// Lifecycle state of the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Not connected and not trying to be
    Idle,
    /// Connected (or between reconnect attempts)
    Running,
    /// Stop requested, teardown in progress
    Stopping,
}

/// Decides whether and when to reconnect after a drop
pub struct ReconnectSupervisor {
    state: SupervisorState,
    /// Cleared by `begin_stop`; no reconnect is scheduled once false
    running: bool,
    reconnect_delay: Duration,
}

impl ReconnectSupervisor {
    /// Create a supervisor with the given fixed reconnect delay
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            state: SupervisorState::Idle,
            running: true,
            reconnect_delay,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// The connection opened
    pub fn on_opened(&mut self) {
        self.state = SupervisorState::Running;
    }

    /// The connection closed or errored.
    ///
    /// Returns the delay before the single reconnect attempt to schedule,
    /// or `None` when the run flag is cleared and the supervisor goes idle.
    pub fn on_connection_lost(&mut self) -> Option<Duration> {
        if self.running {
            Some(self.reconnect_delay)
        } else {
            self.state = SupervisorState::Idle;
            None
        }
    }

    /// Stop was requested: clear the run flag so no reconnect is scheduled
    pub fn begin_stop(&mut self) {
        self.running = false;
        self.state = SupervisorState::Stopping;
    }

    /// Teardown finished (transport closed, pending commands flushed)
    pub fn confirm_stopped(&mut self) {
        self.state = SupervisorState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle_with_run_flag_set() {
        let supervisor = ReconnectSupervisor::new(Duration::from_secs(5));
        assert_eq!(supervisor.state(), SupervisorState::Idle);
    }

    #[test]
    fn test_reconnects_with_fixed_delay_while_running() {
        let mut supervisor = ReconnectSupervisor::new(Duration::from_secs(5));
        supervisor.on_opened();
        assert_eq!(supervisor.state(), SupervisorState::Running);

        // Repeated drops keep yielding the same delay, indefinitely.
        for _ in 0..3 {
            assert_eq!(
                supervisor.on_connection_lost(),
                Some(Duration::from_secs(5))
            );
        }
    }

    #[test]
    fn test_no_reconnect_after_stop() {
        let mut supervisor = ReconnectSupervisor::new(Duration::from_secs(5));
        supervisor.on_opened();
        supervisor.begin_stop();
        assert_eq!(supervisor.state(), SupervisorState::Stopping);

        assert_eq!(supervisor.on_connection_lost(), None);
        assert_eq!(supervisor.state(), SupervisorState::Idle);
    }

    #[test]
    fn test_stop_teardown_ends_idle() {
        let mut supervisor = ReconnectSupervisor::new(Duration::from_secs(5));
        supervisor.on_opened();
        supervisor.begin_stop();
        supervisor.confirm_stopped();
        assert_eq!(supervisor.state(), SupervisorState::Idle);
    }
}
