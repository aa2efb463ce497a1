//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade, one line per event.  A future RPC adapter would
//! implement the same trait.

use log::{error, info, warn};

use crate::app::events::{AppEvent, TelemetryRecord};
use crate::app::ports::EventSink;
use crate::model::{DeviceInfo, ErrorWarning};

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::BusOpened => info!("BUS   | opened"),
            AppEvent::Telemetry(record) => log_telemetry(record),
            AppEvent::ReadFailed { unit, category, error } => {
                warn!("TELEM | {unit} {} | read failed: {error}", category.label());
            }
            AppEvent::RefreshSkipped(category) => {
                warn!("TELEM | {} | skipped, bus not open", category.label());
            }
            AppEvent::LedEffectArmed(kind) => info!("LED   | effect {kind:?} armed"),
            AppEvent::LedWriteFailed(e) => error!("LED   | write failed: {e}"),
            AppEvent::LedWriteRecovered => info!("LED   | writes recovered"),
            AppEvent::CommandFailed { command, error } => {
                warn!("CMD   | {command} failed: {error}");
            }
            AppEvent::PowerStateChanged { from, to } => {
                info!("POWER | {from:?} -> {to:?} (0x{:02x})", to.raw());
            }
            AppEvent::PowerReadFailed(e) => error!("POWER | state read failed: {e}"),
            AppEvent::PowerReadRecovered => info!("POWER | state read recovered"),
            AppEvent::BoardTurnOffRequested => warn!("POWER | board turn-off requested"),
            AppEvent::ShutdownStarted => warn!("POWER | board turning off, shutting down host"),
            AppEvent::ShutdownStepFailed(e) => error!("POWER | shutdown step: {e}"),
        }
    }
}

fn log_telemetry(record: &TelemetryRecord) {
    match record {
        TelemetryRecord::EscErrorLog { esc_id, log } => {
            info!(
                "TELEM | ESC{esc_id} ERROR LOG | diag=0x{:02x} | last={} prev={} all={}",
                log.diagnostic_status,
                pair(log.last),
                pair(log.previous),
                pair(log.all),
            );
        }
        TelemetryRecord::EscDataLog { esc_id, data } => {
            info!(
                "TELEM | ESC{esc_id} DATA | diag=0x{:02x} | I_max={:.2}A I_avg={:.1}A | \
                 T_motor={}\u{00b0}C T_esc={}\u{00b0}C",
                data.diagnostic_status,
                data.motor_current_max_a(),
                data.motor_current_avg_a(),
                data.motor_temp_max_c(),
                data.esc_temp_max_c(),
            );
        }
        TelemetryRecord::EscDeviceInfo { esc_id, info } => {
            info!("TELEM | ESC{esc_id} INFO | {}", device(info));
        }
        TelemetryRecord::EscResistance { esc_id, resistance } => {
            let [a, b, c] = resistance.phase;
            info!(
                "TELEM | ESC{esc_id} RESISTANCE | phase={a:.3}/{b:.3}/{c:.3} global={:.3}",
                resistance.global,
            );
        }
        TelemetryRecord::BoardInfo(info) => {
            info!("TELEM | BOARD INFO | {}", device(info));
        }
    }
}

fn pair(p: ErrorWarning) -> String {
    format!("E{:04x}/W{:04x}", p.error, p.warning)
}

fn device(info: &DeviceInfo) -> String {
    format!(
        "fw={} hw={}{} sn={} addr=0x{:02x} diag=0x{:02x}",
        info.firmware,
        info.hw_build,
        if info.is_test_build() { " (test)" } else { "" },
        info.serial_number,
        info.address,
        info.diagnostic_status,
    )
}
