//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to               |
//! |----------------|--------------------|---------------------------|
//! | `log_sink`     | EventSink          | `log` facade              |
//! | `power_off`    | PowerOffPort       | OS commands (sync, poweroff) |
//! | `sim_gateway`  | DeviceGateway      | In-memory simulated board |

pub mod log_sink;
pub mod power_off;
pub mod sim_gateway;
