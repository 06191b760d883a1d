//! # Touch-pad scanner
//!
//! Some retrofit builds add a 16-pad capacitive touch strip (a TTP229-style part) as a local keyboard beside the
//! MIDI input. The peripheral hands over one 16-bit word per scan with a set bit for every touched pad; this
//! module diffs consecutive words and turns edges into key events.
//!
//! The pad-to-note mapping follows the original panel layout: pads 0 through 7 play the first eight semitones
//! above the low note, and pads 8 through 15 play the same eight semitones two octaves up.
//!
//! Reading the peripheral (and un-inverting its active-low lines) is the board adapter's job; this module only
//! sees the cooked bitfield.

use heapless::Vec;

/// A key edge detected by the scanner, carrying the MIDI note the pad maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    Pressed(u8),
    Released(u8),
}

/// An edge detector over a 16-pad touch peripheral is represented here
pub struct TouchScanner {
    // the pad bitfield from the previous scan
    last: u16,
}

impl TouchScanner {
    /// `TouchScanner::new()` is a new scanner with no pads touched
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// `ts.update(pads)` is the key events implied by the new pad bitfield `pads`
    ///
    /// Pads which changed since the previous call produce one event each, in pad order. An unchanged bitfield
    /// produces nothing, which makes it cheap to call every tick.
    pub fn update(&mut self, pads: u16) -> Vec<TouchEvent, NUM_PADS> {
        let mut events = Vec::new();

        let changed = pads ^ self.last;
        if changed == 0 {
            return events;
        }
        self.last = pads;

        for pad in 0..NUM_PADS as u8 {
            let mask = 1 << pad;
            if changed & mask != 0 {
                let note = pad_to_note(pad);
                let event = if pads & mask != 0 {
                    TouchEvent::Pressed(note)
                } else {
                    TouchEvent::Released(note)
                };
                events.push(event).ok();
            }
        }

        events
    }
}

impl Default for TouchScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// `pad_to_note(p)` is the MIDI note pad `p` plays: the lower bank sits just above the low note, the upper bank
/// two octaves higher
fn pad_to_note(pad: u8) -> u8 {
    let octave_jump = if UPPER_BANK_START <= pad { 24 } else { 0 };
    crate::voice_controller::LOW_NOTE + pad + octave_jump
}

/// The number of pads the peripheral scans
pub const NUM_PADS: usize = 16;

/// Pads from here up play two octaves above the lower bank
const UPPER_BANK_START: u8 = 8;
