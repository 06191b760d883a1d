//! # Vibrato LFO
//!
//! A triangle-wave low frequency oscillator built on a bounded signed phase accumulator (an NCO). Each tick the
//! phase moves by the rate in the current direction; when a step would carry the phase past a boundary, the
//! portion past the boundary is reflected back in and the direction flips.
//!
//! Reflecting rather than clamping preserves the exact phase at every turnaround, so the triangle never gains or
//! loses time against an ideal ramp no matter how the rate divides into the boundary. This matters for vibrato:
//! a drifting LFO beats audibly against the note.
//!
//! The rate is set from a linear control value through the piecewise exponential converter in [`crate::expo`],
//! giving the control a musical sweep. The modulation depth (`amount`) only scales the output; it has no effect on
//! the internal phase dynamics, so turning the depth down and back up does not restart the waveform.

use crate::expo;

/// A triangle-wave vibrato LFO is represented here
pub struct VibratoLfo {
    // bounded to [-LFO_PHASE_MAX, LFO_PHASE_MAX]
    phase: i32,

    // step per tick, produced by the exponential converter
    rate: u16,

    // current ramp direction
    direction: Direction,

    // 7-bit modulation depth, applied only at output time
    amount: u8,
}

/// The direction the phase ramp is currently moving
enum Direction {
    Rising,
    Falling,
}

impl VibratoLfo {
    /// `VibratoLfo::new()` is a new LFO at phase zero with zero depth and a moderate default rate
    pub fn new() -> Self {
        Self {
            phase: 0,
            rate: expo::convert_u16(DEFAULT_RATE_LINEAR),
            direction: Direction::Rising,
            amount: 0,
        }
    }

    /// `lfo.set_rate(lin)` sets the oscillation rate from linear control value `lin` in `[0, 1024)`
    ///
    /// The control is mapped through the exponential converter so equal control increments multiply the speed.
    pub fn set_rate(&mut self, linear: u16) {
        self.rate = expo::convert_u16(linear);
    }

    /// `lfo.set_amount(a)` sets the 7-bit modulation depth, zero silencing the output without stopping the phase
    pub fn set_amount(&mut self, amount: u8) {
        self.amount = amount & 0x7F;
    }

    /// `lfo.amount()` is the current modulation depth
    pub fn amount(&self) -> u8 {
        self.amount
    }

    /// `lfo.tick()` advances the LFO by one tick and is the new phase, must be called at the tick rate
    pub fn tick(&mut self) -> i32 {
        let rate = self.rate as i32;

        match self.direction {
            Direction::Rising => {
                self.phase += rate;
                if LFO_PHASE_MAX <= self.phase {
                    // reflect the overshoot back in instead of clamping, keeping the bounce exact
                    self.phase = LFO_PHASE_MAX - (self.phase - LFO_PHASE_MAX);
                    self.direction = Direction::Falling;
                }
            }
            Direction::Falling => {
                self.phase -= rate;
                if self.phase <= -LFO_PHASE_MAX {
                    self.phase = -LFO_PHASE_MAX - (self.phase + LFO_PHASE_MAX);
                    self.direction = Direction::Rising;
                }
            }
        }

        self.phase
    }

    /// `lfo.phase()` is the current phase, in `[-LFO_PHASE_MAX, LFO_PHASE_MAX]`
    pub fn phase(&self) -> i32 {
        self.phase
    }

    /// `lfo.output()` is the depth-scaled output centered at mid-scale, in `[0, 255]`, suitable for a PWM register
    pub fn output(&self) -> u8 {
        (((self.phase * self.amount as i32) >> OUTPUT_SHIFT) + OUTPUT_CENTER) as u8
    }
}

impl Default for VibratoLfo {
    fn default() -> Self {
        Self::new()
    }
}

/// The phase boundary the triangle bounces between, `2^18 - 1`
pub const LFO_PHASE_MAX: i32 = (1 << 18) - 1;

/// The linear rate control value applied at power-on, before any MIDI arrives
const DEFAULT_RATE_LINEAR: u16 = 600;

/// Scales phase times 7-bit amount down to 8 bits of swing around the center
const OUTPUT_SHIFT: u32 = 18;

/// Mid-scale of the 8-bit output
const OUTPUT_CENTER: i32 = 128;
