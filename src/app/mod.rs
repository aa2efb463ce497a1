//! Application core: domain orchestration behind port traits.
//!
//! This module wires the telemetry cache, the LED controller and the
//! power monitor into one service.  All interaction with the bus, the
//! log and the operating system happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without hardware.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
