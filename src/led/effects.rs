//! Software LED effects advanced by the fast tick.
//!
//! Each handler owns only its own phase state and turns a tick number into
//! an optional [`Frame`].  `None` means "nothing changed, stay off the bus".
//!
//! | Effect       | Behaviour                                          |
//! |--------------|----------------------------------------------------|
//! | Blank        | one frame of all-off on the primary strips         |
//! | Alternating  | front toggles every 4 ticks, rear every 8 ticks    |

use super::{COLOUR_RED, COLOUR_WHITE, LedChannel, OFF, Rgb};

/// Strip length the alternating templates are drawn for.
pub const ALTERNATING_LED_COUNT: u8 = 8;

/// Front strips toggle every 4 ticks (200 ms at 20 Hz).
pub const FRONT_PERIOD_TICKS: u64 = 4;

/// Rear strips toggle every 8 ticks (400 ms at 20 Hz).
pub const REAR_PERIOD_TICKS: u64 = 8;

const W: Rgb = COLOUR_WHITE;
const R: Rgb = COLOUR_RED;
const O: Rgb = OFF;

/// Front templates, indexed by the front toggle.
pub static FRONT_TEMPLATES: [[Rgb; 8]; 2] = [
    [W, W, W, W, O, O, O, O],
    [O, O, O, O, W, W, W, W],
];

/// Rear templates, indexed by the rear toggle.
pub static REAR_TEMPLATES: [[Rgb; 8]; 2] = [
    [R, O, R, O, R, O, R, O],
    [O, R, O, R, O, R, O, R],
];

// ───────────────────────────────────────────────────────────────
// Frame
// ───────────────────────────────────────────────────────────────

/// What one channel should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Every LED at the channel's current count gets this colour.
    Fill(Rgb),
    /// Buffer replaced by the template; count becomes the template length.
    Template(&'static [Rgb; 8]),
}

/// Channel updates produced by one effect tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// New LED count for the four primary channels, if any.
    pub resize_primary: Option<u8>,
    pub paints: heapless::Vec<(LedChannel, Paint), 4>,
}

impl Frame {
    fn paint(&mut self, channels: &[LedChannel], paint: Paint) {
        for &channel in channels {
            let _ = self.paints.push((channel, paint));
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Toggle
// ───────────────────────────────────────────────────────────────

/// Binary toggle that flips when `elapsed % period == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    period: u64,
    state: bool,
}

impl Toggle {
    pub const fn new(period: u64) -> Self {
        Self { period, state: false }
    }

    pub fn reset(&mut self) {
        self.state = false;
    }

    /// State the next flip will display.
    pub fn next_shown(&self) -> bool {
        self.state
    }

    /// On a flip tick, returns the state to display and inverts for the
    /// following flip.  `None` between flips.
    fn step(&mut self, elapsed: u64) -> Option<bool> {
        if elapsed % self.period != 0 {
            return None;
        }
        let shown = self.state;
        self.state = !self.state;
        Some(shown)
    }
}

// ───────────────────────────────────────────────────────────────
// Handlers
// ───────────────────────────────────────────────────────────────

/// Blanks the primary strips once after arming.
#[derive(Debug, Clone, Default)]
pub struct BlankEffect;

impl BlankEffect {
    pub fn step(&mut self, update_pending: bool) -> Option<Frame> {
        if !update_pending {
            return None;
        }
        let mut frame = Frame::default();
        frame.paint(&LedChannel::PRIMARY, Paint::Fill(OFF));
        Some(frame)
    }
}

/// Front and rear strips alternating between two templates each.
#[derive(Debug, Clone)]
pub struct AlternatingEffect {
    offset: u64,
    front: Toggle,
    rear: Toggle,
    resized: bool,
}

impl Default for AlternatingEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl AlternatingEffect {
    pub fn new() -> Self {
        Self {
            offset: 0,
            front: Toggle::new(FRONT_PERIOD_TICKS),
            rear: Toggle::new(REAR_PERIOD_TICKS),
            resized: false,
        }
    }

    /// Restart the phase at `tick` with both toggles back at their initial state.
    pub fn rebase(&mut self, tick: u64) {
        self.offset = tick;
        self.front.reset();
        self.rear.reset();
        self.resized = false;
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn front(&self) -> Toggle {
        self.front
    }

    pub fn rear(&self) -> Toggle {
        self.rear
    }

    /// Advance to `tick`.  Produces a frame only when a toggle flips.
    pub fn step(&mut self, tick: u64) -> Option<Frame> {
        let elapsed = tick.wrapping_sub(self.offset);
        let mut frame = Frame::default();

        if let Some(shown) = self.front.step(elapsed) {
            frame.paint(&LedChannel::FRONT, Paint::Template(&FRONT_TEMPLATES[usize::from(shown)]));
        }
        if let Some(shown) = self.rear.step(elapsed) {
            frame.paint(&LedChannel::REAR, Paint::Template(&REAR_TEMPLATES[usize::from(shown)]));
        }

        if frame.paints.is_empty() {
            return None;
        }
        if !self.resized {
            frame.resize_primary = Some(ALTERNATING_LED_COUNT);
            self.resized = true;
        }
        Some(frame)
    }
}
