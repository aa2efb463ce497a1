//! Unified error types for the power-board manager.
//!
//! Three layers, mirroring how failures propagate:
//!
//! - [`GatewayError`]: a single bus transaction (or the bus itself) failed.
//! - [`CommandError`]: an on-demand command was rejected or could not be
//!   carried out.  Policy rejections ([`CommandError::Disabled`]) are kept
//!   distinct from hardware failures.
//! - [`Error`]: top-level type used by startup code.
//!
//! All variants are `Copy` so they can be stored in events and replies
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Gateway errors
// ---------------------------------------------------------------------------

/// Failure of one gateway operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    /// The transport could not be opened at the requested address.
    OpenFailed,
    /// The transport is closed or failed to open; no transaction attempted.
    NotOpen,
    /// The device did not answer or returned a malformed reply.
    ReadFailed,
    /// The device rejected or did not acknowledge a write.
    WriteFailed,
    /// The request itself is out of range for the device.
    InvalidArgument(&'static str),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed => write!(f, "bus open failed"),
            Self::NotOpen => write!(f, "bus not open"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::WriteFailed => write!(f, "write failed"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The command is refused by policy (not a hardware fault).
    Disabled(&'static str),
    /// The gateway failed while executing the command.
    Gateway(GatewayError),
    /// The request parameters are invalid.
    InvalidArgument(&'static str),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled(reason) => write!(f, "disabled: {reason}"),
            Self::Gateway(e) => write!(f, "gateway: {e}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl From<GatewayError> for CommandError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            other => Self::Gateway(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Startup could not complete.
    Init(&'static str),
    /// A gateway operation failed.
    Gateway(GatewayError),
    /// A command failed.
    Command(CommandError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Gateway(e) => write!(f, "gateway: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for GatewayError {}
impl std::error::Error for CommandError {}

impl From<GatewayError> for Error {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
