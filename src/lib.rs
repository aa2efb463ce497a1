//! Power-distribution board manager library.
//!
//! Exposes the domain core (telemetry cache, LED effect engine, power
//! monitor) and the host adapters for the binary and for integration
//! testing.  The bus transport is reached only through
//! [`app::ports::DeviceGateway`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod bus;
pub mod config;
pub mod error;
pub mod led;
pub mod model;
pub mod power;
pub mod scheduler;
pub mod telemetry;
