//! Shutdown request path and the host power-off sequence.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{DeviceGateway, EventSink, PowerOffPort};
use crate::bus::Bus;
use crate::error::CommandError;

/// Reason given when a shutdown request arrives without confirmation.
pub const SHUTDOWN_DISABLED_REASON: &str = "shutdown requires confirm=true";

/// Ask the board to cut vehicle power.
///
/// Without `confirm` nothing touches the bus.  With it, exactly one
/// turn-off write is issued; failures are returned, never retried.  The
/// host itself is only powered off once the monitor sees the board
/// report `TurningOff`.
pub fn request_shutdown<G: DeviceGateway>(
    bus: &Bus<G>,
    confirm: bool,
    sink: &impl EventSink,
) -> Result<(), CommandError> {
    if !confirm {
        return Err(CommandError::Disabled(SHUTDOWN_DISABLED_REASON));
    }
    bus.transact_open(|g| g.write_turn_off())?;
    sink.emit(&AppEvent::BoardTurnOffRequested);
    Ok(())
}

/// Flush storage, then power the host off.
///
/// Power-off runs even when the flush fails.
pub fn run_shutdown_sequence(power_off: &impl PowerOffPort, sink: &impl EventSink) {
    sink.emit(&AppEvent::ShutdownStarted);

    if let Err(e) = power_off.flush() {
        sink.emit(&AppEvent::ShutdownStepFailed(e));
    }

    info!("shutdown: powering off host");
    if let Err(e) = power_off.power_off() {
        sink.emit(&AppEvent::ShutdownStepFailed(e));
    }
}
