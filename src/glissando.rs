//! # Glissando engine
//!
//! Converts a (current, target) pitch pair and a configured rate into a per-tick pitch trajectory, so that new
//! notes slide into each other in whole semitone steps instead of jumping. On the target hardware the sounding
//! pitch is a note-select line, not a continuous voltage, which is why the glide moves in discrete semitones.
//!
//! The engine accumulates a 32-bit fixed-point `progress` value with 16 fractional bits. Each tick adds the rate,
//! the integer part is consumed as semitone steps, and the fractional remainder is carried over. Fixed-point
//! accumulation guarantees the configured rate is honored exactly in the long run with bounded error, and costs a
//! handful of integer operations per tick, cheap enough for an interrupt-driven tick.
//!
//! A rate of zero means "instant": the engine never advances on its own and the caller should jump the pitch
//! directly with [`Glissando::jump_to`].

/// A fixed-point glissando (portamento) engine is represented here
pub struct Glissando {
    // the pitch currently sounding, in semitone units
    current: u8,

    // fixed-point increment per tick, zero disables the glide entirely
    rate: u16,

    // fixed-point accumulator with FRACTION_BITS fractional bits
    progress: u32,
}

impl Glissando {
    /// `Glissando::new()` is a new engine, parked at pitch zero with the glide disabled
    pub fn new() -> Self {
        Self {
            current: 0,
            rate: 0,
            progress: 0,
        }
    }

    /// `g.set_rate(r)` sets the per-tick fixed-point rate, zero meaning instant jumps with no glide
    pub fn set_rate(&mut self, rate: u16) {
        self.rate = rate;
    }

    /// `g.rate()` is the configured per-tick rate
    pub fn rate(&self) -> u16 {
        self.rate
    }

    /// `g.is_instant()` is true iff the glide is disabled and pitch changes should be immediate
    pub fn is_instant(&self) -> bool {
        self.rate == 0
    }

    /// `g.current()` is the pitch currently sounding
    pub fn current(&self) -> u8 {
        self.current
    }

    /// `g.jump_to(p)` moves the sounding pitch straight to `p`, used when the glide is disabled
    pub fn jump_to(&mut self, pitch: u8) {
        self.current = pitch;
        self.progress = 0;
    }

    /// `g.tick(target)` advances the glide one tick toward `target` and is the new pitch if it changed
    ///
    /// Expected to be called once per real-time tick while a key is held. The engine never overshoots: when the
    /// accumulated step reaches past the target it snaps exactly onto it. While parked on the target the consumed
    /// integer part is discarded so no phase builds up waiting for the next key change, but the fractional
    /// remainder is always retained across ticks.
    pub fn tick(&mut self, target: u8) -> Option<u8> {
        if self.is_instant() {
            return None;
        }

        self.progress += self.rate as u32;
        let step = (self.progress >> FRACTION_BITS) as u8;

        if step == 0 {
            return None;
        }
        self.progress -= (step as u32) << FRACTION_BITS;

        if self.current == target {
            // burn this step, otherwise it would apply all at once on the next key change
            return None;
        }

        let distance = self.current.abs_diff(target);
        if distance <= step {
            self.current = target;
        } else if self.current < target {
            self.current += step;
        } else {
            self.current -= step;
        }

        Some(self.current)
    }
}

impl Default for Glissando {
    fn default() -> Self {
        Self::new()
    }
}

/// The number of fractional bits in the progress accumulator
const FRACTION_BITS: u32 = 16;
