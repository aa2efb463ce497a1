//! System configuration parameters
//!
//! All tunable parameters for the power-board manager.  Values come from
//! an optional JSON file; anything missing falls back to the defaults
//! below, and the bus device can be overridden on the command line.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::led::MAX_LEDS_PER_CHANNEL;
use crate::model::ESC_COUNT;

/// Companion computer the board is wired to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    JetsonNano,
    JetsonXavierNx,
}

impl Platform {
    /// I2C device the power board sits on for this platform.
    pub fn default_bus_device(self) -> &'static str {
        match self {
            Self::JetsonNano => "/dev/i2c-1",
            Self::JetsonXavierNx => "/dev/i2c-8",
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Bus ---
    /// Bus device path; `None` uses the platform default
    pub bus_device: Option<String>,
    pub platform: Platform,
    /// Keep running with all telemetry invalid when the bus fails to open
    pub degrade_on_bus_failure: bool,

    // --- Timing ---
    /// Fast tick (LED effects) period in milliseconds
    pub fast_tick_ms: u32,
    /// Slow tick (power-state poll) period in milliseconds
    pub slow_tick_ms: u32,

    // --- Units ---
    /// Logical id of ESC slot 0
    pub esc_base_id: u8,

    // --- LEDs ---
    /// Start-up LED count of each primary strip
    pub default_led_count: u8,
    /// Start-up LED count of the additional strip
    pub additional_led_count: u8,

    // --- Shutdown ---
    /// Commands run in order by the host power-off sequence: the first
    /// flushes storage, the rest power the host off
    pub poweroff_commands: Vec<Vec<String>>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Bus
            bus_device: None,
            platform: Platform::default(),
            degrade_on_bus_failure: false,

            // Timing
            fast_tick_ms: 50,  // 20 Hz
            slow_tick_ms: 1000, // 1 Hz

            // Units
            esc_base_id: 1,

            // LEDs
            default_led_count: 8,
            additional_led_count: 0,

            // Shutdown
            poweroff_commands: vec![
                vec!["sync".into()],
                vec!["systemctl".into(), "poweroff".into()],
            ],
        }
    }
}

impl SystemConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json).map_err(|_| Error::Config("malformed config JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Device path to open: explicit setting, else the platform default.
    pub fn bus_device(&self) -> &str {
        self.bus_device
            .as_deref()
            .unwrap_or_else(|| self.platform.default_bus_device())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.fast_tick_ms == 0 || self.slow_tick_ms == 0 {
            return Err(Error::Config("tick periods must be non-zero"));
        }
        if self.slow_tick_ms % self.fast_tick_ms != 0 {
            return Err(Error::Config("slow tick must be a multiple of the fast tick"));
        }
        let capacity = MAX_LEDS_PER_CHANNEL;
        if usize::from(self.default_led_count) > capacity || usize::from(self.additional_led_count) > capacity {
            return Err(Error::Config("LED count exceeds strip capacity"));
        }
        // Ids run from `esc_base_id` to `esc_base_id + ESC_COUNT - 1` and must fit a u8.
        if usize::from(self.esc_base_id) + ESC_COUNT - 1 > usize::from(u8::MAX) {
            return Err(Error::Config("ESC base id leaves no room for every ESC"));
        }
        if self.bus_device().is_empty() {
            return Err(Error::Config("bus device must not be empty"));
        }
        if self.poweroff_commands.iter().any(Vec::is_empty) {
            return Err(Error::Config("power-off command must not be empty"));
        }
        Ok(())
    }
}
