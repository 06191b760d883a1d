//! # Output driver boundary
//!
//! The control core never touches hardware registers. Everything it decides ends up as a call through the
//! [`OutputDriver`] trait, and a thin per-board adapter translates those calls into multiplexer select lines, PWM
//! duty cycles, and gate signals.
//!
//! Keeping the boundary this narrow is what makes the core testable on a desktop: the unit tests implement the
//! trait with a recorder and assert on the call stream.

/// The hardware output surface a retrofit board exposes to the control core is represented here
pub trait OutputDriver {
    /// `d.select_pitch(n)` routes note `n` in `[0..47]` to the analog pitch-select mechanism
    ///
    /// Adapters for hardware with a 2-octave select range are expected to assert their octave-range line for
    /// notes 24 and above and select `n - 24` within the lower bank.
    fn select_pitch(&mut self, note: u8);

    /// `d.set_gate_velocity(level)` drives the envelope/gate output with an 8-bit level
    ///
    /// The controller doubles the 7-bit MIDI velocity into this range before calling.
    fn set_gate_velocity(&mut self, level: u8);

    /// `d.set_modulation(level)` drives the modulation output with an 8-bit level centered at 128
    fn set_modulation(&mut self, level: u8);

    /// `d.enable_output()` un-mutes the voice-select lines when a key starts sounding
    fn enable_output(&mut self);

    /// `d.disable_output()` mutes the voice-select lines when no key is held, silencing the voice
    fn disable_output(&mut self);
}
