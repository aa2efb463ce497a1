//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PowerboardService (domain)
//! ```
//!
//! Driven adapters (bus transport, event sinks, OS power control) implement
//! these traits.  The [`PowerboardService`](super::service::PowerboardService)
//! consumes them via generics, so the domain core never touches the bus or
//! the operating system directly.

use crate::error::GatewayError;
use crate::led::{LedChannel, LedCounts, PredefinedEffect, Rgb};
use crate::model::{DataLog, DeviceInfo, ErrorLog, PowerState, Resistance};

// ───────────────────────────────────────────────────────────────
// Device gateway (driven adapter: domain ↔ hardware bus)
// ───────────────────────────────────────────────────────────────

/// Opaque capability over the shared hardware bus.
///
/// Every call is one bounded, synchronous bus transaction and may fail on
/// its own.  ESCs are addressed by their logical id (`esc_base_id + slot`).
/// Callers serialise access through [`Bus`](crate::bus::Bus); implementations
/// need not be thread-safe beyond `Send`.
pub trait DeviceGateway {
    /// Open the transport at `address` (e.g. `/dev/i2c-1`).
    fn open(&mut self, address: &str) -> Result<(), GatewayError>;

    /// Release the transport.  Safe to call when not open.
    fn close(&mut self);

    /// Whether the transport is open and usable.
    fn is_open(&self) -> bool;

    fn read_error_log(&mut self, esc_id: u8) -> Result<ErrorLog, GatewayError>;

    fn read_data_log(&mut self, esc_id: u8) -> Result<DataLog, GatewayError>;

    fn read_device_info(&mut self, esc_id: u8) -> Result<DeviceInfo, GatewayError>;

    fn read_resistance(&mut self, esc_id: u8) -> Result<Resistance, GatewayError>;

    fn read_board_info(&mut self) -> Result<DeviceInfo, GatewayError>;

    fn read_board_power_state(&mut self) -> Result<PowerState, GatewayError>;

    /// Ask the board to cut vehicle power.
    fn write_turn_off(&mut self) -> Result<(), GatewayError>;

    /// Upload one channel's colour buffer.  Not visible until committed.
    fn write_led_buffer(&mut self, channel: LedChannel, colours: &[Rgb]) -> Result<(), GatewayError>;

    /// Latch every uploaded buffer onto the strips.
    fn commit_led_update(&mut self) -> Result<(), GatewayError>;

    fn set_led_counts(&mut self, counts: &LedCounts) -> Result<(), GatewayError>;

    /// Program the board-side blink effect.
    fn set_predefined_hw_effect(&mut self, effect: &PredefinedEffect) -> Result<(), GatewayError>;

    fn enable_predefined_hw_effect(&mut self, enable: bool) -> Result<(), GatewayError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
///
/// Takes `&self`: the sink is shared by the tick driver and request
/// handlers, so stateful implementations bring their own locking.
pub trait EventSink {
    fn emit(&self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Power-off port (driven adapter: domain → operating system)
// ───────────────────────────────────────────────────────────────

/// Host power control used by the shutdown sequence.
pub trait PowerOffPort {
    /// Flush durable state (filesystem buffers) to storage.
    fn flush(&self) -> Result<(), PowerOffError>;

    /// Power the host off.  Normally does not return on success.
    fn power_off(&self) -> Result<(), PowerOffError>;
}

// ───────────────────────────────────────────────────────────────
// Tick delegate (decouples scheduler from the service)
// ───────────────────────────────────────────────────────────────

/// Callback trait the [`Scheduler`](crate::scheduler::Scheduler) invokes
/// on every fast and slow tick.
///
/// The binary implements this by forwarding to the service; the scheduler
/// itself knows nothing about LEDs or power polling.
pub trait TickDelegate {
    /// Called once per base period with the running fast-tick number.
    fn on_fast_tick(&mut self, tick: u64);

    /// Called every `slow_tick_ms / fast_tick_ms` base periods, after that
    /// period's fast tick.
    fn on_slow_tick(&mut self, tick: u64);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`PowerOffPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerOffError {
    /// Flushing storage failed.
    FlushFailed,
    /// The power-off primitive could not be invoked.
    PowerOffFailed,
}

impl core::fmt::Display for PowerOffError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FlushFailed => write!(f, "flush failed"),
            Self::PowerOffFailed => write!(f, "power-off failed"),
        }
    }
}
