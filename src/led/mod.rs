//! LED strips: channel buffers, the effect engine and direct colour commands.
//!
//! Five independently addressable strips hang off the power board.  The
//! [`LedController`] owns the host-side copy of every buffer and the
//! [`LedEffectEngine`].  Two ways of driving the strips:
//!
//! - **Tick-driven**: an armed software effect renders frames on the fast
//!   tick; only frames that change something reach the bus.
//! - **Direct**: solid/custom colour and predefined hardware effect
//!   commands disarm the engine and write once.
//!
//! Every bus sequence is staged on a copy of the buffers first; the host
//! copy is only replaced when the whole sequence succeeds.

pub mod effects;
pub mod engine;

pub use effects::{Frame, Paint};
pub use engine::{EffectKind, LedEffectEngine};

use crate::app::events::AppEvent;
use crate::app::ports::{DeviceGateway, EventSink};
use crate::bus::Bus;
use crate::error::{CommandError, GatewayError};

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

pub const OFF: Rgb = (0, 0, 0);
pub const COLOUR_WHITE: Rgb = (255, 255, 255);
pub const COLOUR_RED: Rgb = (255, 0, 0);
pub const COLOUR_GREEN: Rgb = (0, 255, 0);

/// Capacity of one strip buffer.
pub const MAX_LEDS_PER_CHANNEL: usize = 32;

/// Explicit colours for every channel, indexed by [`LedChannel::index`].
pub type ChannelColours = [heapless::Vec<Rgb, MAX_LEDS_PER_CHANNEL>; LedChannel::COUNT];

// ───────────────────────────────────────────────────────────────
// Channels
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedChannel {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
    /// Optional extra strip.
    Additional = 4,
}

impl LedChannel {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::RearLeft,
        Self::RearRight,
        Self::Additional,
    ];

    pub const PRIMARY: [Self; 4] = [Self::FrontLeft, Self::FrontRight, Self::RearLeft, Self::RearRight];

    pub const FRONT: [Self; 2] = [Self::FrontLeft, Self::FrontRight];

    pub const REAR: [Self; 2] = [Self::RearLeft, Self::RearRight];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Mounted LED count of every channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedCounts([u8; LedChannel::COUNT]);

impl LedCounts {
    pub const fn new(counts: [u8; LedChannel::COUNT]) -> Self {
        Self(counts)
    }

    /// Same count on the four primary strips.
    pub const fn uniform(primary: u8, additional: u8) -> Self {
        Self([primary, primary, primary, primary, additional])
    }

    pub fn get(&self, channel: LedChannel) -> u8 {
        self.0[channel.index()]
    }

    pub fn as_array(&self) -> [u8; LedChannel::COUNT] {
        self.0
    }
}

/// Settings of the board's built-in blink effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredefinedEffect {
    /// One colour per primary strip.
    pub colours: [Rgb; 4],
    /// Cycles with the LEDs lit.
    pub on_cycles: u8,
    /// Cycles with the LEDs dark.
    pub off_cycles: u8,
    /// Board-defined effect code, passed through untouched.
    pub kind: u8,
    /// Store in board flash so it survives a power cycle.
    pub persist: bool,
}

// ───────────────────────────────────────────────────────────────
// Buffers
// ───────────────────────────────────────────────────────────────

/// Host-side copy of every strip buffer.  A channel's LED count is the
/// length of its buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedChannels {
    buffers: ChannelColours,
}

impl LedChannels {
    /// All channels dark at the given counts.
    pub fn new(counts: &LedCounts) -> Self {
        let mut channels = Self {
            buffers: core::array::from_fn(|_| heapless::Vec::new()),
        };
        for channel in LedChannel::ALL {
            channels.fill(channel, counts.get(channel), OFF);
        }
        channels
    }

    pub fn buffer(&self, channel: LedChannel) -> &[Rgb] {
        &self.buffers[channel.index()]
    }

    pub fn counts(&self) -> LedCounts {
        LedCounts(core::array::from_fn(|i| self.buffers[i].len() as u8))
    }

    /// Resize `channel` to `count` LEDs, all `colour`.  Clamped to capacity.
    fn fill(&mut self, channel: LedChannel, count: u8, colour: Rgb) {
        let buffer = &mut self.buffers[channel.index()];
        buffer.clear();
        let _ = buffer.resize(usize::from(count).min(MAX_LEDS_PER_CHANNEL), colour);
    }

    fn set(&mut self, channel: LedChannel, colours: &[Rgb]) {
        let buffer = &mut self.buffers[channel.index()];
        buffer.clear();
        let take = colours.len().min(MAX_LEDS_PER_CHANNEL);
        let _ = buffer.extend_from_slice(&colours[..take]);
    }

    fn apply(&mut self, frame: &Frame) {
        if let Some(count) = frame.resize_primary {
            for channel in LedChannel::PRIMARY {
                let colour = self.buffer(channel).first().copied().unwrap_or(OFF);
                self.fill(channel, count, colour);
            }
        }
        for &(channel, paint) in &frame.paints {
            match paint {
                Paint::Fill(colour) => {
                    let count = self.buffer(channel).len() as u8;
                    self.fill(channel, count, colour);
                }
                Paint::Template(template) => self.set(channel, template),
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// Owns the strip buffers and the effect engine.
pub struct LedController {
    channels: LedChannels,
    engine: LedEffectEngine,
    /// Latched while tick-driven writes keep failing.
    write_error_active: bool,
    /// Counts the board last acknowledged; `None` until a write confirms them.
    board_counts: Option<LedCounts>,
    /// Resize carried over from a frame whose write failed.
    pending_resize: Option<u8>,
}

impl LedController {
    pub fn new(counts: LedCounts) -> Self {
        Self {
            channels: LedChannels::new(&counts),
            engine: LedEffectEngine::new(),
            write_error_active: false,
            board_counts: None,
            pending_resize: None,
        }
    }

    pub fn channels(&self) -> &LedChannels {
        &self.channels
    }

    pub fn engine(&self) -> &LedEffectEngine {
        &self.engine
    }

    /// Counts last acknowledged by the board.
    pub fn board_counts(&self) -> Option<LedCounts> {
        self.board_counts
    }

    /// Push the host-side counts to the board, e.g. right after the bus opens.
    pub fn sync_counts<G: DeviceGateway>(&mut self, bus: &Bus<G>) -> Result<(), GatewayError> {
        let counts = self.channels.counts();
        let result = bus.transact_open(|g| g.set_led_counts(&counts));
        self.board_counts = result.is_ok().then_some(counts);
        result
    }

    /// Forget what the board was told; the next write re-sends the counts.
    pub fn forget_board_counts(&mut self) {
        self.board_counts = None;
    }

    // ── Tick-driven ───────────────────────────────────────────

    /// Advance the armed effect.  Returns `true` when a frame was written.
    pub fn tick<G: DeviceGateway>(&mut self, tick: u64, bus: &Bus<G>, sink: &impl EventSink) -> bool {
        let Some(mut frame) = self.engine.tick(tick) else {
            return false;
        };
        if frame.resize_primary.is_none() {
            frame.resize_primary = self.pending_resize;
        }

        let mut staged = self.channels.clone();
        staged.apply(&frame);
        let counts = staged.counts();
        let push_counts = frame.resize_primary.is_some() || self.board_counts != Some(counts);
        // A resize rewrites every primary strip, not only the painted ones.
        let written: heapless::Vec<LedChannel, 4> = if frame.resize_primary.is_some() {
            LedChannel::PRIMARY.into_iter().collect()
        } else {
            frame.paints.iter().map(|(c, _)| *c).collect()
        };

        let result = bus.transact_open(|g| {
            if push_counts {
                g.set_led_counts(&counts)?;
            }
            push_buffers(g, &staged, &written)
        });

        match result {
            Ok(()) => {
                self.channels = staged;
                self.board_counts = Some(counts);
                self.pending_resize = None;
                if self.write_error_active {
                    self.write_error_active = false;
                    sink.emit(&AppEvent::LedWriteRecovered);
                }
                true
            }
            Err(e) => {
                self.pending_resize = frame.resize_primary;
                self.board_counts = None;
                if !self.write_error_active {
                    self.write_error_active = true;
                    sink.emit(&AppEvent::LedWriteFailed(e));
                }
                false
            }
        }
    }

    // ── Direct commands ───────────────────────────────────────

    /// Paint the primary strips with `count` LEDs of `colour`; with
    /// `additional`, the extra strip too.
    pub fn set_solid_colour<G: DeviceGateway>(
        &mut self,
        bus: &Bus<G>,
        count: u8,
        colour: Rgb,
        additional: Option<u8>,
    ) -> Result<(), CommandError> {
        let over = |n: u8| usize::from(n) > MAX_LEDS_PER_CHANNEL;
        if over(count) || additional.is_some_and(over) {
            return Err(CommandError::InvalidArgument("LED count exceeds strip capacity"));
        }
        self.take_over(bus)?;

        let mut staged = self.channels.clone();
        let mut written: heapless::Vec<LedChannel, { LedChannel::COUNT }> = heapless::Vec::new();
        for channel in LedChannel::PRIMARY {
            staged.fill(channel, count, colour);
            let _ = written.push(channel);
        }
        if let Some(n) = additional {
            staged.fill(LedChannel::Additional, n, colour);
            let _ = written.push(LedChannel::Additional);
        }

        self.commit(bus, staged, &written)
    }

    /// Replace every channel's buffer; list lengths become the LED counts.
    pub fn set_custom_colours<G: DeviceGateway>(
        &mut self,
        bus: &Bus<G>,
        colours: &ChannelColours,
    ) -> Result<(), CommandError> {
        self.take_over(bus)?;

        let mut staged = self.channels.clone();
        for channel in LedChannel::ALL {
            staged.set(channel, &colours[channel.index()]);
        }

        self.commit(bus, staged, &LedChannel::ALL)
    }

    /// Hand the strips to the board's built-in effect.
    pub fn set_predefined_effect<G: DeviceGateway>(
        &mut self,
        bus: &Bus<G>,
        effect: &PredefinedEffect,
    ) -> Result<(), CommandError> {
        self.take_over(bus)?;
        bus.transact_open(|g| {
            g.set_predefined_hw_effect(effect)?;
            g.enable_predefined_hw_effect(true)
        })?;
        Ok(())
    }

    /// Arm a software effect, optionally switching the built-in effect off first.
    pub fn set_custom_effect<G: DeviceGateway>(
        &mut self,
        bus: &Bus<G>,
        kind: EffectKind,
        kill_predefined: bool,
    ) -> Result<(), CommandError> {
        if kill_predefined {
            bus.transact_open(|g| g.enable_predefined_hw_effect(false))?;
        }
        self.engine.arm(kind);
        self.pending_resize = None;
        Ok(())
    }

    // ── Internal ──────────────────────────────────────────────

    /// Fail fast on a closed bus, otherwise stop the running effect.
    fn take_over<G: DeviceGateway>(&mut self, bus: &Bus<G>) -> Result<(), CommandError> {
        if !bus.is_open() {
            return Err(GatewayError::NotOpen.into());
        }
        self.engine.disarm();
        self.pending_resize = None;
        Ok(())
    }

    /// Write counts and buffers, then adopt `staged` as the host copy.
    fn commit<G: DeviceGateway>(
        &mut self,
        bus: &Bus<G>,
        staged: LedChannels,
        written: &[LedChannel],
    ) -> Result<(), CommandError> {
        let counts = staged.counts();
        let result = bus.transact_open(|g| {
            g.set_led_counts(&counts)?;
            push_buffers(g, &staged, written)
        });
        if let Err(e) = result {
            self.board_counts = None;
            return Err(e.into());
        }
        self.channels = staged;
        self.board_counts = Some(counts);
        Ok(())
    }
}

fn push_buffers<G: DeviceGateway>(
    gateway: &mut G,
    staged: &LedChannels,
    channels: &[LedChannel],
) -> Result<(), GatewayError> {
    for &channel in channels {
        gateway.write_led_buffer(channel, staged.buffer(channel))?;
    }
    gateway.commit_led_update()
}
