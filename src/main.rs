//! Power-board manager main entry point.
//!
//! Hexagonal architecture driven by one periodic tick.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │  SimulatedBoard      LogEventSink      CommandPowerOff     │
//! │  (DeviceGateway)     (EventSink)       (PowerOffPort)      │
//! │                                                            │
//! │  ─────────────────── Port Trait Boundary ────────────────  │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │              PowerboardService                       │  │
//! │  │  Telemetry · LED effects · Power monitor             │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                                                            │
//! │  Scheduler (delegate-driven): fast tick 20 Hz, slow 1 Hz   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `powerboard [bus_device] [--config <file>]`

use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::{info, warn};

use powerboard::adapters::log_sink::LogEventSink;
use powerboard::adapters::power_off::CommandPowerOff;
use powerboard::adapters::sim_gateway::SimulatedBoard;
use powerboard::app::ports::TickDelegate;
use powerboard::app::service::PowerboardService;
use powerboard::config::SystemConfig;
use powerboard::scheduler::Scheduler;

type Service = PowerboardService<SimulatedBoard, CommandPowerOff, LogEventSink>;

// ── Scheduler delegate ────────────────────────────────────────
//
// Bridges the scheduler (which knows nothing about the service) to the
// service's tick entry points.

struct ServiceDelegate<'a> {
    service: &'a Service,
}

impl TickDelegate for ServiceDelegate<'_> {
    fn on_fast_tick(&mut self, tick: u64) {
        self.service.fast_tick(tick);
    }

    fn on_slow_tick(&mut self, _tick: u64) {
        self.service.slow_tick();
    }
}

// ── Command line ──────────────────────────────────────────────

struct Args {
    bus_device: Option<String>,
    config_path: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        bus_device: None,
        config_path: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        if arg == "--config" {
            args.config_path = Some(it.next().context("--config needs a file path")?);
        } else if arg.starts_with("--") {
            bail!("unknown option {arg}");
        } else if args.bus_device.is_none() {
            args.bus_device = Some(arg);
        } else {
            bail!("unexpected argument {arg}");
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<SystemConfig> {
    let mut config = match &args.config_path {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            SystemConfig::from_json_str(&json).with_context(|| format!("parsing {path}"))?
        }
        None => SystemConfig::default(),
    };
    if let Some(device) = &args.bus_device {
        config.bus_device = Some(device.clone());
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  powerboard v{}                   ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let args = parse_args()?;
    let config = load_config(&args)?;
    info!("Platform {:?}, bus device {}", config.platform, config.bus_device());

    let service = PowerboardService::new(
        SimulatedBoard::new(),
        CommandPowerOff::new(&config.poweroff_commands),
        LogEventSink::new(),
        &config,
    );

    if let Err(e) = service.open_bus() {
        if !config.degrade_on_bus_failure {
            return Err(e).context("cannot operate without the board bus");
        }
        warn!("Continuing without bus, all telemetry will read invalid");
    }
    service.refresh_all();

    let mut sched = Scheduler::new(config.fast_tick_ms, config.slow_tick_ms)?;
    let mut delegate = ServiceDelegate { service: &service };

    info!("System ready. Entering tick loop.");

    let mut deadline = Instant::now();
    while !service.shutdown_started() {
        sched.advance(&mut delegate);

        deadline += sched.period();
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        } else {
            // Overran; drop the missed periods instead of bursting.
            deadline = now;
        }
    }

    info!("Shutdown sequence ran after {} ticks, exiting", sched.ticks());
    service.close_bus();
    Ok(())
}
