//! Inbound commands to the application service.
//!
//! These represent the mutating requests an outer RPC layer forwards into
//! the core.  [`PowerboardService::handle_command`](super::service::PowerboardService::handle_command)
//! interprets them and answers with a [`CommandReply`].

use crate::error::CommandError;
use crate::led::{ChannelColours, PredefinedEffect, Rgb};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Re-read every telemetry category from the bus.
    RefreshTelemetry,

    /// Paint the four primary strips (and optionally the additional strip)
    /// with one colour.
    SetLedColor {
        count: u8,
        colour: Rgb,
        /// LED count of the additional strip; `None` leaves it untouched.
        additional: Option<u8>,
    },

    /// Explicit buffer for every channel; each list length becomes the
    /// channel's LED count.
    SetLedCustomColor(ChannelColours),

    /// Hand the strips to the board's built-in blink effect.
    SetLedPredefinedEffect(PredefinedEffect),

    /// Arm a software effect by its wire code.
    SetLedCustomEffect { kind: u8, kill_predefined: bool },

    /// Ask the board to cut power.  Ignored unless `confirm` is set.
    RequestShutdown { confirm: bool },
}

/// Outcome of an [`AppCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandReply {
    Ok,
    /// Refused by policy, with a human-readable reason.
    Disabled(&'static str),
    Failed(CommandError),
}

impl CommandReply {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl From<Result<(), CommandError>> for CommandReply {
    fn from(result: Result<(), CommandError>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(CommandError::Disabled(reason)) => Self::Disabled(reason),
            Err(e) => Self::Failed(e),
        }
    }
}
