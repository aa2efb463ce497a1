//! Board power supervision.
//!
//! - [`monitor`] polls the board power state on the slow tick and runs the
//!   host shutdown sequence when the board reports it is turning off.
//! - [`shutdown`] is the confirmed request path that asks the board to cut
//!   power in the first place.
//!
//! ```text
//!   request_shutdown(true) ──▶ board: TurningOff
//!                                    │  (next slow tick)
//!                                    ▼
//!               PowerStateMonitor::poll ──▶ run_shutdown_sequence
//!                                           (flush, then power off)
//! ```

pub mod monitor;
pub mod shutdown;

pub use monitor::{PollOutcome, PowerStateMonitor};
pub use shutdown::{SHUTDOWN_DISABLED_REASON, request_shutdown, run_shutdown_sequence};
