//! Tick-driven LED effect state machine.
//!
//! ```text
//!              arm(kind)                     disarm()
//!   ┌──────┐ ───────────────▶ ┌─────────────┐ ──────────▶ ┌──────┐
//!   │ Idle │                  │ PatternDriven│             │ Idle │
//!   └──────┘ ◀─── disarm() ── └─────────────┘             └──────┘
//!                                   │ tick(n)
//!                                   ▼
//!                       active handler → Option<Frame>
//! ```
//!
//! Arming installs a fresh handler for the requested kind and raises
//! `update_pending`.  The first tick afterwards consumes the flag: the
//! blank effect paints once, the alternating effect re-bases its phase
//! to that tick.  Disarming leaves the strips as last rendered.

use super::effects::{AlternatingEffect, BlankEffect, Frame};

/// Wire code of [`EffectKind::None`].
pub const EFFECT_CODE_NONE: u8 = 0;
/// Wire code of [`EffectKind::Alternating`].
pub const EFFECT_CODE_ALTERNATING: u8 = 1;

/// Software effects selectable by the custom-effect command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EffectKind {
    /// Blank the primary strips once.
    None = EFFECT_CODE_NONE,
    /// Front/rear alternating templates.
    Alternating = EFFECT_CODE_ALTERNATING,
}

impl EffectKind {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            EFFECT_CODE_NONE => Some(Self::None),
            EFFECT_CODE_ALTERNATING => Some(Self::Alternating),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// The armed handler, owning only its own phase state.
#[derive(Debug, Clone)]
enum ActiveEffect {
    Blank(BlankEffect),
    Alternating(AlternatingEffect),
}

impl ActiveEffect {
    fn for_kind(kind: EffectKind) -> Self {
        match kind {
            EffectKind::None => Self::Blank(BlankEffect),
            EffectKind::Alternating => Self::Alternating(AlternatingEffect::new()),
        }
    }
}

pub struct LedEffectEngine {
    running: bool,
    update_pending: bool,
    kind: EffectKind,
    active: ActiveEffect,
}

impl Default for LedEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedEffectEngine {
    /// Idle engine with the blank effect selected.
    pub fn new() -> Self {
        Self {
            running: false,
            update_pending: false,
            kind: EffectKind::None,
            active: ActiveEffect::for_kind(EffectKind::None),
        }
    }

    /// Select `kind`, start running and request one recomputation.
    pub fn arm(&mut self, kind: EffectKind) {
        self.kind = kind;
        self.active = ActiveEffect::for_kind(kind);
        self.running = true;
        self.update_pending = true;
    }

    pub fn disarm(&mut self) {
        self.running = false;
    }

    /// Advance the armed effect to `tick`.  No-op unless running.
    pub fn tick(&mut self, tick: u64) -> Option<Frame> {
        if !self.running {
            return None;
        }
        let first = core::mem::take(&mut self.update_pending);
        match &mut self.active {
            ActiveEffect::Blank(effect) => effect.step(first),
            ActiveEffect::Alternating(effect) => {
                if first {
                    effect.rebase(tick);
                }
                effect.step(tick)
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn update_pending(&self) -> bool {
        self.update_pending
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Phase state of the alternating handler, when it is the armed one.
    pub fn alternating(&self) -> Option<&AlternatingEffect> {
        match &self.active {
            ActiveEffect::Alternating(effect) => Some(effect),
            ActiveEffect::Blank(_) => None,
        }
    }
}
