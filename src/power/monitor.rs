//! Slow-tick power-state poll.

use crate::app::events::AppEvent;
use crate::app::ports::{DeviceGateway, EventSink};
use crate::bus::Bus;
use crate::model::PowerState;

/// Result of one [`PowerStateMonitor::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing for the caller to do.
    Steady,
    /// The poll failed; the last known state is kept.
    ReadFailed,
    /// `TurningOff` observed for the first time: run the shutdown sequence.
    ShutdownRequired,
}

#[derive(Debug, Default)]
pub struct PowerStateMonitor {
    /// Latched while consecutive polls fail.
    read_error_active: bool,
    last_state: Option<PowerState>,
    /// Set once `ShutdownRequired` has been returned.
    shutdown_started: bool,
}

impl PowerStateMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the board power state once.
    ///
    /// Read failures are edge-triggered: one `PowerReadFailed` when they
    /// start, one `PowerReadRecovered` on the next good read.
    pub fn poll<G: DeviceGateway>(&mut self, bus: &Bus<G>, sink: &impl EventSink) -> PollOutcome {
        let state = match bus.transact_open(|g| g.read_board_power_state()) {
            Ok(state) => state,
            Err(e) => {
                if !self.read_error_active {
                    self.read_error_active = true;
                    sink.emit(&AppEvent::PowerReadFailed(e));
                }
                return PollOutcome::ReadFailed;
            }
        };

        if self.read_error_active {
            self.read_error_active = false;
            sink.emit(&AppEvent::PowerReadRecovered);
        }

        if self.last_state != Some(state) {
            sink.emit(&AppEvent::PowerStateChanged {
                from: self.last_state,
                to: state,
            });
            self.last_state = Some(state);
        }

        if state == PowerState::TurningOff && !self.shutdown_started {
            self.shutdown_started = true;
            return PollOutcome::ShutdownRequired;
        }
        PollOutcome::Steady
    }

    /// Last successfully read state, `None` before the first good poll.
    pub fn last_state(&self) -> Option<PowerState> {
        self.last_state
    }

    pub fn read_error_active(&self) -> bool {
        self.read_error_active
    }

    pub fn shutdown_started(&self) -> bool {
        self.shutdown_started
    }
}
