//! Shared data model for ESC and power-board telemetry.
//!
//! Values are stored exactly as the devices report them.  The decoding
//! helpers below turn the raw register encodings into engineering units:
//!
//! | Field                | Encoding             | Decoded            |
//! |----------------------|----------------------|--------------------|
//! | max motor current    | signed Q8.8          | amps (`raw / 256`) |
//! | average current      | unsigned, 0.1 A/LSB  | amps               |
//! | temperatures         | `u8`, zero at −50 °C | °C (`raw − 50`)    |

/// Number of ESC slots on the board.
pub const ESC_COUNT: usize = 4;

/// Temperature bytes are offset so that 0 represents −50 °C.
pub const TEMPERATURE_OFFSET_C: i16 = 50;

// ───────────────────────────────────────────────────────────────
// Decoders
// ───────────────────────────────────────────────────────────────

/// Signed Q8.8 fixed point to float. `0x0100` is `1.0`.
pub fn q8_8_to_f32(raw: i16) -> f32 {
    f32::from(raw) / 256.0
}

/// Average-current register (0.1 A per LSB) to amps.
pub fn deciamps_to_f32(raw: u16) -> f32 {
    f32::from(raw) * 0.1
}

/// Offset temperature byte to degrees Celsius.
pub fn offset_temperature_c(raw: u8) -> i16 {
    i16::from(raw) - TEMPERATURE_OFFSET_C
}

// ───────────────────────────────────────────────────────────────
// Device info
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub mid: u8,
    pub minor: u8,
}

impl core::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.mid, self.minor)
    }
}

/// Identity block reported by an ESC or by the power board itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub firmware: FirmwareVersion,
    pub hw_build: u8,
    pub serial_number: u32,
    /// Bus address the unit answers on.
    pub address: u8,
    pub diagnostic_status: u8,
}

impl DeviceInfo {
    /// Bit 0 of the hardware build marks engineering/test units.
    pub fn is_test_build(&self) -> bool {
        self.hw_build & 0x01 != 0
    }
}

// ───────────────────────────────────────────────────────────────
// Error log
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorWarning {
    pub error: u16,
    pub warning: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorLog {
    pub diagnostic_status: u8,
    /// Most recent error/warning pair.
    pub last: ErrorWarning,
    /// The pair before `last`.
    pub previous: ErrorWarning,
    /// Cumulative OR of every code seen since the log was cleared.
    pub all: ErrorWarning,
}

// ───────────────────────────────────────────────────────────────
// Data log
// ───────────────────────────────────────────────────────────────

/// Run-data log exactly as the ESC reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataLog {
    pub diagnostic_status: u8,
    /// Q8.8 signed amps.
    pub motor_current_max_raw: i16,
    /// 0.1 A per LSB.
    pub motor_current_avg_raw: u16,
    pub motor_temp_max_raw: u8,
    pub esc_temp_max_raw: u8,
}

impl DataLog {
    pub fn motor_current_max_a(&self) -> f32 {
        q8_8_to_f32(self.motor_current_max_raw)
    }

    pub fn motor_current_avg_a(&self) -> f32 {
        deciamps_to_f32(self.motor_current_avg_raw)
    }

    pub fn motor_temp_max_c(&self) -> i16 {
        offset_temperature_c(self.motor_temp_max_raw)
    }

    pub fn esc_temp_max_c(&self) -> i16 {
        offset_temperature_c(self.esc_temp_max_raw)
    }
}

// ───────────────────────────────────────────────────────────────
// Resistance
// ───────────────────────────────────────────────────────────────

/// Winding resistance measurement, in device-native units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Resistance {
    pub phase: [f32; 3],
    pub global: f32,
}

// ───────────────────────────────────────────────────────────────
// Board power state
// ───────────────────────────────────────────────────────────────

/// Raw code of [`PowerState::Run`].
pub const POWER_STATE_RUN: u8 = 0x01;
/// Raw code of [`PowerState::TurningOff`].
pub const POWER_STATE_TURNING_OFF: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Run,
    /// The board has started cutting power; the host must shut down now.
    TurningOff,
    /// Any other code, carried through untouched.
    Other(u8),
}

impl PowerState {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            POWER_STATE_RUN => Self::Run,
            POWER_STATE_TURNING_OFF => Self::TurningOff,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            Self::Run => POWER_STATE_RUN,
            Self::TurningOff => POWER_STATE_TURNING_OFF,
            Self::Other(raw) => raw,
        }
    }
}
