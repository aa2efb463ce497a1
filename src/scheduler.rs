//! Tick scheduler.
//!
//! One base period drives two cadences.  The scheduler notifies a
//! [`TickDelegate`]; the main loop implements the delegate to forward into
//! the service.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │             base period (fast_tick_ms)                   │
//! │                        │                                 │
//! │           ┌────────────┴─────────────┐                   │
//! │           ▼                          ▼ every `ratio`     │
//! │   on_fast_tick(n)             on_slow_tick(n)            │
//! │   LED effect engine           power-state monitor        │
//! └──────────────────────────────────────────────────────────┘
//! ```

use core::time::Duration;

use log::info;

use crate::app::ports::TickDelegate;
use crate::error::Error;

/// The tick scheduler.
///
/// Decoupled from the service: it only counts base periods and invokes
/// the delegate, so it is testable without a bus or a clock.
#[derive(Debug)]
pub struct Scheduler {
    period: Duration,
    /// Base ticks per slow tick.
    ratio: u64,
    /// Next fast-tick number.
    tick: u64,
}

impl Scheduler {
    /// `slow_ms` must be a non-zero multiple of `fast_ms`.
    pub fn new(fast_ms: u32, slow_ms: u32) -> Result<Self, Error> {
        if fast_ms == 0 || slow_ms == 0 {
            return Err(Error::Config("tick periods must be non-zero"));
        }
        if slow_ms % fast_ms != 0 {
            return Err(Error::Config("slow tick must be a multiple of the fast tick"));
        }
        let ratio = u64::from(slow_ms / fast_ms);
        info!("Scheduler: fast {fast_ms} ms, slow {slow_ms} ms (every {ratio} ticks)");
        Ok(Self {
            period: Duration::from_millis(u64::from(fast_ms)),
            ratio,
            tick: 0,
        })
    }

    /// Run one base period: a fast tick, plus a slow tick on every
    /// `ratio`-th period starting with the first.
    pub fn advance(&mut self, delegate: &mut dyn TickDelegate) {
        let tick = self.tick;
        self.tick = self.tick.wrapping_add(1);

        delegate.on_fast_tick(tick);
        if tick % self.ratio == 0 {
            delegate.on_slow_tick(tick);
        }
    }

    /// Length of one base period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of base periods run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn ratio(&self) -> u64 {
        self.ratio
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
