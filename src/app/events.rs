//! Outbound application events.
//!
//! The domain emits these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them; the
//! default [`LogEventSink`](crate::adapters::log_sink::LogEventSink) writes
//! one log line per event.

use crate::app::ports::PowerOffError;
use crate::error::{CommandError, GatewayError};
use crate::led::EffectKind;
use crate::model::{DataLog, DeviceInfo, ErrorLog, PowerState, Resistance};
use crate::telemetry::{Category, Unit};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The bus transport opened.
    BusOpened,

    /// A unit was read successfully; carries the decoded values.
    Telemetry(TelemetryRecord),

    /// A unit read failed; its cached value is kept but marked invalid.
    ReadFailed {
        unit: Unit,
        category: Category,
        error: GatewayError,
    },

    /// A refresh pass was skipped because the bus is not open.
    RefreshSkipped(Category),

    /// A software LED effect was armed.
    LedEffectArmed(EffectKind),

    /// Tick-driven LED writes started failing.
    LedWriteFailed(GatewayError),

    /// Tick-driven LED writes succeed again.
    LedWriteRecovered,

    /// An on-demand command failed or was refused.
    CommandFailed {
        command: &'static str,
        error: CommandError,
    },

    /// The board reported a different power state than the last poll.
    PowerStateChanged {
        from: Option<PowerState>,
        to: PowerState,
    },

    /// First power-state poll failure after a good read (or at startup).
    PowerReadFailed(GatewayError),

    /// First good power-state poll after failures.
    PowerReadRecovered,

    /// The board accepted a turn-off request.
    BoardTurnOffRequested,

    /// The host shutdown sequence has started.
    ShutdownStarted,

    /// A step of the host shutdown sequence failed.
    ShutdownStepFailed(PowerOffError),
}

/// Decoded telemetry of a single unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryRecord {
    EscErrorLog { esc_id: u8, log: ErrorLog },
    EscDataLog { esc_id: u8, data: DataLog },
    EscDeviceInfo { esc_id: u8, info: DeviceInfo },
    EscResistance { esc_id: u8, resistance: Resistance },
    BoardInfo(DeviceInfo),
}
