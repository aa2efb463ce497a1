//! In-memory power board for host runs.
//!
//! Answers every [`DeviceGateway`] call from fixed, plausible values so
//! the binary can run without the I2C transport.  LED writes are kept so
//! they can be inspected, and a turn-off write makes the next power-state
//! read report `TurningOff`, as the real board does.

use log::debug;

use crate::app::ports::DeviceGateway;
use crate::error::GatewayError;
use crate::led::{LedChannel, LedCounts, PredefinedEffect, Rgb};
use crate::model::{
    DataLog, DeviceInfo, ErrorLog, ErrorWarning, FirmwareVersion, PowerState, Resistance,
};

/// Simulated board with four ESCs behind it.
#[derive(Debug, Default)]
pub struct SimulatedBoard {
    open: Option<String>,
    turning_off: bool,
    counts: LedCounts,
    buffers: [Vec<Rgb>; LedChannel::COUNT],
    commits: u32,
    predefined: Option<PredefinedEffect>,
    predefined_enabled: bool,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device path the transport was opened on.
    pub fn address(&self) -> Option<&str> {
        self.open.as_deref()
    }

    pub fn led_buffer(&self, channel: LedChannel) -> &[Rgb] {
        &self.buffers[channel.index()]
    }

    pub fn led_counts(&self) -> LedCounts {
        self.counts
    }

    pub fn commits(&self) -> u32 {
        self.commits
    }

    pub fn predefined_effect(&self) -> Option<(&PredefinedEffect, bool)> {
        self.predefined.as_ref().map(|e| (e, self.predefined_enabled))
    }

    fn esc_info(esc_id: u8) -> DeviceInfo {
        DeviceInfo {
            firmware: FirmwareVersion { major: 1, mid: 4, minor: 2 },
            hw_build: 2,
            serial_number: 0x0010_0000 + u32::from(esc_id),
            address: 0x20_u8.wrapping_add(esc_id),
            diagnostic_status: 0,
        }
    }
}

impl DeviceGateway for SimulatedBoard {
    fn open(&mut self, address: &str) -> Result<(), GatewayError> {
        if address.is_empty() {
            return Err(GatewayError::OpenFailed);
        }
        debug!("sim: open {address}");
        self.open = Some(address.to_owned());
        Ok(())
    }

    fn close(&mut self) {
        self.open = None;
    }

    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn read_error_log(&mut self, _esc_id: u8) -> Result<ErrorLog, GatewayError> {
        Ok(ErrorLog {
            diagnostic_status: 0,
            last: ErrorWarning::default(),
            previous: ErrorWarning::default(),
            all: ErrorWarning { error: 0, warning: 0x0004 },
        })
    }

    fn read_data_log(&mut self, esc_id: u8) -> Result<DataLog, GatewayError> {
        Ok(DataLog {
            diagnostic_status: 0,
            motor_current_max_raw: 0x0C80 + i16::from(esc_id), // ~12.5 A
            motor_current_avg_raw: 37,
            motor_temp_max_raw: 95,
            esc_temp_max_raw: 88,
        })
    }

    fn read_device_info(&mut self, esc_id: u8) -> Result<DeviceInfo, GatewayError> {
        Ok(Self::esc_info(esc_id))
    }

    fn read_resistance(&mut self, esc_id: u8) -> Result<Resistance, GatewayError> {
        let base = 0.05 + f32::from(esc_id) * 0.001;
        Ok(Resistance {
            phase: [base, base + 0.002, base + 0.001],
            global: base * 3.0,
        })
    }

    fn read_board_info(&mut self) -> Result<DeviceInfo, GatewayError> {
        Ok(DeviceInfo {
            firmware: FirmwareVersion { major: 2, mid: 0, minor: 7 },
            hw_build: 1,
            serial_number: 0x00B0_0001,
            address: 0x10,
            diagnostic_status: 0,
        })
    }

    fn read_board_power_state(&mut self) -> Result<PowerState, GatewayError> {
        Ok(if self.turning_off { PowerState::TurningOff } else { PowerState::Run })
    }

    fn write_turn_off(&mut self) -> Result<(), GatewayError> {
        self.turning_off = true;
        Ok(())
    }

    fn write_led_buffer(&mut self, channel: LedChannel, colours: &[Rgb]) -> Result<(), GatewayError> {
        if colours.len() > usize::from(self.counts.get(channel)) {
            return Err(GatewayError::InvalidArgument("buffer longer than LED count"));
        }
        self.buffers[channel.index()] = colours.to_vec();
        Ok(())
    }

    fn commit_led_update(&mut self) -> Result<(), GatewayError> {
        self.commits += 1;
        Ok(())
    }

    fn set_led_counts(&mut self, counts: &LedCounts) -> Result<(), GatewayError> {
        self.counts = *counts;
        Ok(())
    }

    fn set_predefined_hw_effect(&mut self, effect: &PredefinedEffect) -> Result<(), GatewayError> {
        self.predefined = Some(*effect);
        Ok(())
    }

    fn enable_predefined_hw_effect(&mut self, enable: bool) -> Result<(), GatewayError> {
        self.predefined_enabled = enable;
        Ok(())
    }
}
