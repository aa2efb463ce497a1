//! Application service, the hexagonal core.
//!
//! [`PowerboardService`] owns the shared bus, the telemetry cache, the LED
//! controller and the power monitor.  It exposes a hardware-agnostic API
//! for the tick driver and for an RPC layer.  All I/O flows through the
//! port traits it is built with, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!  DeviceGateway ◀──┐   ┌──────────────────────────┐ ──▶ EventSink
//!                  Bus ◀│    PowerboardService      │
//!                       │ Telemetry · LEDs · Power  │ ──▶ PowerOffPort
//!                       └──────────────────────────┘
//! ```
//!
//! Each component sits behind its own lock; only the bus is shared
//! between them.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{error, info, warn};

use crate::bus::Bus;
use crate::config::SystemConfig;
use crate::error::{CommandError, Error};
use crate::led::{ChannelColours, EffectKind, LedController, LedCounts, PredefinedEffect, Rgb};
use crate::model::{DataLog, DeviceInfo, ErrorLog, ESC_COUNT, PowerState, Resistance};
use crate::power::{self, PollOutcome, PowerStateMonitor};
use crate::telemetry::{Reading, TelemetryCache};

use super::commands::{AppCommand, CommandReply};
use super::events::AppEvent;
use super::ports::{DeviceGateway, EventSink, PowerOffPort};

type Guarded<T> = Mutex<CriticalSectionRawMutex, RefCell<T>>;

// ───────────────────────────────────────────────────────────────
// PowerboardService
// ───────────────────────────────────────────────────────────────

pub struct PowerboardService<G, P, S> {
    bus: Bus<G>,
    bus_device: String,
    telemetry: TelemetryCache,
    leds: Guarded<LedController>,
    monitor: Guarded<PowerStateMonitor>,
    power_off: P,
    sink: S,
}

impl<G, P, S> PowerboardService<G, P, S>
where
    G: DeviceGateway,
    P: PowerOffPort,
    S: EventSink,
{
    /// Construct the service.  The bus stays closed until [`open_bus`](Self::open_bus).
    pub fn new(gateway: G, power_off: P, sink: S, config: &SystemConfig) -> Self {
        let counts = LedCounts::uniform(config.default_led_count, config.additional_led_count);
        Self {
            bus: Bus::new(gateway),
            bus_device: config.bus_device().to_owned(),
            telemetry: TelemetryCache::new(config.esc_base_id),
            leds: Mutex::new(RefCell::new(LedController::new(counts))),
            monitor: Mutex::new(RefCell::new(PowerStateMonitor::new())),
            power_off,
            sink,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Open the bus on the configured device.
    ///
    /// The caller decides whether a failure is fatal; without an open bus
    /// every refresh short-circuits and all telemetry stays invalid.
    pub fn open_bus(&self) -> Result<(), Error> {
        match self.bus.open(&self.bus_device) {
            Ok(()) => {
                info!("Bus opened on {}", self.bus_device);
                self.sink.emit(&AppEvent::BusOpened);
                // A failed sync is retried by the next LED write.
                if let Err(e) = self.leds.lock(|leds| leds.borrow_mut().sync_counts(&self.bus)) {
                    warn!("LED count sync after open failed: {e}");
                }
                Ok(())
            }
            Err(e) => {
                error!("Bus open on {} failed: {e}", self.bus_device);
                Err(Error::Gateway(e))
            }
        }
    }

    pub fn close_bus(&self) {
        self.bus.close();
        self.leds.lock(|leds| leds.borrow_mut().forget_board_counts());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance the LED effect engine.  Returns `true` if a frame was written.
    pub fn fast_tick(&self, tick: u64) -> bool {
        self.leds
            .lock(|leds| leds.borrow_mut().tick(tick, &self.bus, &self.sink))
    }

    /// Poll the board power state; runs the host shutdown sequence the
    /// first time the board reports `TurningOff`.
    pub fn slow_tick(&self) -> PollOutcome {
        let outcome = self
            .monitor
            .lock(|monitor| monitor.borrow_mut().poll(&self.bus, &self.sink));
        if outcome == PollOutcome::ShutdownRequired {
            power::run_shutdown_sequence(&self.power_off, &self.sink);
        }
        outcome
    }

    // ── Telemetry ─────────────────────────────────────────────

    pub fn refresh_all(&self) {
        self.telemetry.refresh_all(&self.bus, &self.sink);
    }

    pub fn get_esc_error_log(&self) -> [Reading<ErrorLog>; ESC_COUNT] {
        self.telemetry.refresh_error_logs(&self.bus, &self.sink);
        self.telemetry.error_logs()
    }

    pub fn get_esc_data_log(&self) -> [Reading<DataLog>; ESC_COUNT] {
        self.telemetry.refresh_data_logs(&self.bus, &self.sink);
        self.telemetry.data_logs()
    }

    pub fn get_esc_device_info(&self) -> [Reading<DeviceInfo>; ESC_COUNT] {
        self.telemetry.refresh_device_info(&self.bus, &self.sink);
        self.telemetry.device_info()
    }

    pub fn get_esc_resistance(&self) -> [Reading<Resistance>; ESC_COUNT] {
        self.telemetry.refresh_resistance(&self.bus, &self.sink);
        self.telemetry.resistance()
    }

    pub fn get_board_device_info(&self) -> Reading<DeviceInfo> {
        self.telemetry.refresh_board_info(&self.bus, &self.sink);
        self.telemetry.board_info()
    }

    /// Cached telemetry without touching the bus.
    pub fn telemetry(&self) -> &TelemetryCache {
        &self.telemetry
    }

    // ── LED commands ──────────────────────────────────────────

    /// Solid colour on the primary strips, and on the additional strip
    /// when `additional` is given.
    pub fn set_led_color(&self, count: u8, colour: Rgb, additional: Option<u8>) -> Result<(), CommandError> {
        let result = self.leds.lock(|leds| {
            leds.borrow_mut()
                .set_solid_colour(&self.bus, count, colour, additional)
        });
        self.report("set_led_color", result)
    }

    pub fn set_led_custom_color(&self, colours: &ChannelColours) -> Result<(), CommandError> {
        let result = self
            .leds
            .lock(|leds| leds.borrow_mut().set_custom_colours(&self.bus, colours));
        self.report("set_led_custom_color", result)
    }

    pub fn set_led_predefined_effect(&self, effect: &PredefinedEffect) -> Result<(), CommandError> {
        let result = self
            .leds
            .lock(|leds| leds.borrow_mut().set_predefined_effect(&self.bus, effect));
        self.report("set_led_predefined_effect", result)
    }

    /// Arm the software effect with wire code `kind`.
    pub fn set_led_custom_effect(&self, kind: u8, kill_predefined: bool) -> Result<(), CommandError> {
        let result = EffectKind::from_code(kind)
            .ok_or(CommandError::InvalidArgument("unknown effect kind"))
            .and_then(|kind| {
                self.leds.lock(|leds| {
                    leds.borrow_mut()
                        .set_custom_effect(&self.bus, kind, kill_predefined)
                })?;
                self.sink.emit(&AppEvent::LedEffectArmed(kind));
                Ok(())
            });
        self.report("set_led_custom_effect", result)
    }

    // ── Shutdown ──────────────────────────────────────────────

    pub fn request_board_shutdown(&self, confirm: bool) -> Result<(), CommandError> {
        let result = power::request_shutdown(&self.bus, confirm, &self.sink);
        self.report("request_board_shutdown", result)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from an RPC layer).
    pub fn handle_command(&self, cmd: AppCommand) -> CommandReply {
        match cmd {
            AppCommand::RefreshTelemetry => {
                self.refresh_all();
                CommandReply::Ok
            }
            AppCommand::SetLedColor { count, colour, additional } => {
                self.set_led_color(count, colour, additional).into()
            }
            AppCommand::SetLedCustomColor(colours) => self.set_led_custom_color(&colours).into(),
            AppCommand::SetLedPredefinedEffect(effect) => self.set_led_predefined_effect(&effect).into(),
            AppCommand::SetLedCustomEffect { kind, kill_predefined } => {
                self.set_led_custom_effect(kind, kill_predefined).into()
            }
            AppCommand::RequestShutdown { confirm } => self.request_board_shutdown(confirm).into(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether the host shutdown sequence has run.
    pub fn shutdown_started(&self) -> bool {
        self.monitor.lock(|monitor| monitor.borrow().shutdown_started())
    }

    /// Last successfully polled board power state.
    pub fn power_state(&self) -> Option<PowerState> {
        self.monitor.lock(|monitor| monitor.borrow().last_state())
    }

    pub fn is_bus_open(&self) -> bool {
        self.bus.is_open()
    }

    pub fn bus(&self) -> &Bus<G> {
        &self.bus
    }

    /// Run `f` against the LED controller state.
    pub fn with_leds<R>(&self, f: impl FnOnce(&LedController) -> R) -> R {
        self.leds.lock(|leds| f(&leds.borrow()))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // ── Internal ──────────────────────────────────────────────

    /// Emit a failure event once per failed command.  Policy refusals are
    /// returned but not reported as failures.
    fn report(&self, command: &'static str, result: Result<(), CommandError>) -> Result<(), CommandError> {
        match result {
            Err(CommandError::Disabled(_)) | Ok(()) => {}
            Err(error) => self.sink.emit(&AppEvent::CommandFailed { command, error }),
        }
        result
    }
}
