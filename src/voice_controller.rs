//! # Voice controller
//!
//! The orchestrator tying the core together: decoded MIDI events update the note stack, the glissando target, and
//! the LFO parameters, and a fixed-rate tick advances the glissando and LFO and forwards the results to the output
//! driver.
//!
//! The controller moves between two states, idle (no keys held, output muted) and held (at least one key down),
//! with gliding implicit whenever the sounding pitch has not yet reached the top of the note stack. Voice
//! allocation is last-note priority: the most recently pressed key which is still held wins, and releasing it
//! falls back to the previous one without retriggering the gate.
//!
//! Everything the controller owns is long-lived, fixed-size state constructed once at startup. There is no
//! allocation and every operation is O(1), which is what keeps the core deterministic under an interrupt-driven
//! tick.

use crate::glissando::Glissando;
use crate::lfo::VibratoLfo;
use crate::midi_decoder::{MidiDecoder, MidiEvent};
use crate::note_stack::NoteStack;
use crate::output::OutputDriver;

#[cfg(feature = "touch-pads")]
use crate::touch_scanner::{TouchEvent, TouchScanner};

/// A monophonic voice controller is represented here
pub struct VoiceController<D: OutputDriver> {
    decoder: MidiDecoder,
    notes: NoteStack,
    glissando: Glissando,
    lfo: VibratoLfo,
    driver: D,

    #[cfg(feature = "touch-pads")]
    touch: TouchScanner,
}

impl<D: OutputDriver> VoiceController<D> {
    /// `VoiceController::new(d)` is a new idle controller driving its outputs through `d`
    pub fn new(driver: D) -> Self {
        Self {
            decoder: MidiDecoder::new(),
            notes: NoteStack::new(),
            glissando: Glissando::new(),
            lfo: VibratoLfo::new(),
            driver,

            #[cfg(feature = "touch-pads")]
            touch: TouchScanner::new(),
        }
    }

    /// `vc.consume_midi_byte(b)` feeds one received serial byte into the controller
    ///
    /// Expected to be called from the main loop for every byte read from the MIDI UART, faster than bytes arrive.
    pub fn consume_midi_byte(&mut self, byte: u8) {
        if let Some(event) = self.decoder.consume(byte) {
            self.handle_event(event);
        }
    }

    /// `vc.tick()` advances the glissando and LFO by one tick and forwards the results to the driver
    ///
    /// Expected to be called once per real-time tick (4 kHz on the original hardware), promptly after the timer
    /// flag is taken so no tick coalesces with the next.
    pub fn tick(&mut self) {
        // the glide only runs while a key is held, toward the most recently pressed one
        if let Some(target) = self.notes.top() {
            if let Some(pitch) = self.glissando.tick(target) {
                self.driver.select_pitch(pitch);
            }
        }

        self.lfo.tick();
        self.driver.set_modulation(self.lfo.output());
    }

    /// `vc.current_pitch()` is the pitch currently sounding, in semitone units `[0..47]`
    ///
    /// Retained even after all keys are released, so the next attack without glide starts from a sane value.
    pub fn current_pitch(&self) -> u8 {
        self.glissando.current()
    }

    /// `vc.is_idle()` is true iff no keys are held
    pub fn is_idle(&self) -> bool {
        self.notes.is_empty()
    }

    /// `vc.driver()` is a view of the output driver, mainly useful for inspecting test doubles
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// `vc.scan_touch_pads(pads)` plays key changes read from a 16-pad touch scanner
    ///
    /// `pads` is the current bitfield with a set bit per touched pad. Newly touched pads play at a fixed medium
    /// velocity; released pads release their note. Pad-to-note mapping is described in [`crate::touch_scanner`].
    #[cfg(feature = "touch-pads")]
    pub fn scan_touch_pads(&mut self, pads: u16) {
        let events = self.touch.update(pads);
        for event in events {
            match event {
                TouchEvent::Pressed(note) => self.note_on(note, TOUCH_PAD_VELOCITY),
                TouchEvent::Released(note) => self.note_off(note),
            }
        }
    }

    /// `vc.handle_event(e)` applies one decoded MIDI event to the voice
    fn handle_event(&mut self, event: MidiEvent) {
        match event {
            MidiEvent::NoteOn { note, velocity } => self.note_on(note, velocity),
            MidiEvent::NoteOff { note } => self.note_off(note),
            MidiEvent::ControlChange { controller, value } => self.control_change(controller, value),
            // program change, pitch bend, song position and the real-time events are decoded
            // but this voice has no use for them
            _ => (),
        }
    }

    /// `vc.note_on(n, v)` starts sounding MIDI note `n` with velocity `v`
    fn note_on(&mut self, note: u8, velocity: u8) {
        let note = match to_note_window(note) {
            Some(n) => n,
            None => return,
        };

        // 7-bit MIDI velocity doubled onto the 8-bit gate output
        self.driver.set_gate_velocity(velocity << 1);
        self.driver.enable_output();

        if self.glissando.is_instant() {
            self.glissando.jump_to(note);
            self.driver.select_pitch(note);
        } else {
            // hold the sounding pitch and let the glide converge on the new note from here
            self.driver.select_pitch(self.glissando.current());
        }

        self.notes.press(note);
    }

    /// `vc.note_off(n)` stops holding MIDI note `n`, falling back to the previous held note if there is one
    fn note_off(&mut self, note: u8) {
        let note = match to_note_window(note) {
            Some(n) => n,
            None => return,
        };

        self.notes.release(note);

        match self.notes.top() {
            Some(next) => {
                // the remaining note becomes the target with no gate retrigger; with glide active the
                // engine converges on it over the coming ticks
                if self.glissando.is_instant() {
                    self.glissando.jump_to(next);
                    self.driver.select_pitch(next);
                }
            }
            // silence the voice but keep the last sounding pitch for the next attack
            None => self.driver.disable_output(),
        }
    }

    /// `vc.control_change(cc, val)` applies one MIDI controller move
    fn control_change(&mut self, controller: u8, value: u8) {
        match controller {
            CC_MODULATION => self.lfo.set_amount(value),
            CC_PORTAMENTO_TIME => {
                // zero disables the glide entirely, otherwise larger values glide slower
                let rate = if value == 0 {
                    0
                } else {
                    (PORTAMENTO_RATE_SCALE / value as u32) as u16
                };
                self.glissando.set_rate(rate);
            }
            CC_LFO_RATE => {
                // spread the 7-bit controller across the converter's 10-bit domain
                self.lfo.set_rate(value as u16 * 8);
            }
            // portamento on/off switch, recognized but the glide follows the rate alone for now
            CC_PORTAMENTO_SWITCH => (),
            CC_ALL_NOTES_OFF => {
                self.notes.clear();
                self.driver.disable_output();
            }
            _ => (), // ignore all other MIDI CC messages
        }
    }
}

/// `to_note_window(n)` is MIDI note `n` as a semitone offset into the supported window, if it lands inside
///
/// The hardware selects 48 notes starting at [`LOW_NOTE`]; everything outside is ignored with no state change.
fn to_note_window(note: u8) -> Option<u8> {
    if (LOW_NOTE..LOW_NOTE + NOTE_WINDOW).contains(&note) {
        Some(note - LOW_NOTE)
    } else {
        None
    }
}

/// The lowest playable MIDI note (C2), mapped to note-select zero
pub const LOW_NOTE: u8 = 36;

/// The number of selectable notes
pub const NOTE_WINDOW: u8 = 48;

// MIDI CC numbers this controller responds to
const CC_MODULATION: u8 = 1;
const CC_PORTAMENTO_TIME: u8 = 5;
const CC_LFO_RATE: u8 = 16;
const CC_PORTAMENTO_SWITCH: u8 = 65;
const CC_ALL_NOTES_OFF: u8 = 123;

/// Maps CC5 onto the fixed-point glide rate: CC5 is a *time*, so value 1 glides fastest and 127 slowest
const PORTAMENTO_RATE_SCALE: u32 = 51200;

/// The velocity used for touch-pad presses, which carry no velocity of their own
#[cfg(feature = "touch-pads")]
const TOUCH_PAD_VELOCITY: u8 = 64;

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    /// An output driver which records everything the controller tells it, for asserting against
    struct RecordingDriver {
        pitches: Vec<u8, 256>,
        gate_velocity: u8,
        modulation: u8,
        enabled: bool,
        disable_calls: usize,
    }

    impl RecordingDriver {
        fn new() -> Self {
            Self {
                pitches: Vec::new(),
                gate_velocity: 0,
                modulation: 0,
                enabled: false,
                disable_calls: 0,
            }
        }

        fn last_pitch(&self) -> Option<u8> {
            self.pitches.last().copied()
        }
    }

    impl OutputDriver for RecordingDriver {
        fn select_pitch(&mut self, note: u8) {
            self.pitches.push(note).ok();
        }

        fn set_gate_velocity(&mut self, level: u8) {
            self.gate_velocity = level;
        }

        fn set_modulation(&mut self, level: u8) {
            self.modulation = level;
        }

        fn enable_output(&mut self) {
            self.enabled = true;
        }

        fn disable_output(&mut self) {
            self.enabled = false;
            self.disable_calls += 1;
        }
    }

    fn controller() -> VoiceController<RecordingDriver> {
        VoiceController::new(RecordingDriver::new())
    }

    /// `send(vc, bytes)` feeds a whole byte sequence into the controller
    fn send(vc: &mut VoiceController<RecordingDriver>, bytes: &[u8]) {
        for &b in bytes {
            vc.consume_midi_byte(b);
        }
    }

    #[test]
    fn note_on_selects_the_pitch_and_opens_the_gate() {
        let mut vc = controller();
        send(&mut vc, &[0x90, 60, 100]);

        // MIDI note 60 is offset 24 above the low note
        assert_eq!(vc.driver().last_pitch(), Some(24));
        assert_eq!(vc.driver().gate_velocity, 200);
        assert!(vc.driver().enabled);
        assert!(!vc.is_idle());
    }

    #[test]
    fn notes_outside_the_window_are_ignored() {
        let mut vc = controller();
        send(&mut vc, &[0x90, 35, 100]); // just below C2
        send(&mut vc, &[0x90, 84, 100]); // just above the top
        assert_eq!(vc.driver().last_pitch(), None);
        assert!(vc.is_idle());
    }

    #[test]
    fn release_falls_back_to_the_previously_held_note() {
        // glide rate defaults to zero, so pitch changes are instant
        let mut vc = controller();
        send(&mut vc, &[0x90, 60, 100]);
        send(&mut vc, &[0x90, 64, 100]);
        assert_eq!(vc.driver().last_pitch(), Some(28));

        send(&mut vc, &[0x80, 64, 0]);

        // back on the first held note, gate still open
        assert_eq!(vc.driver().last_pitch(), Some(24));
        assert_eq!(vc.current_pitch(), 24);
        assert!(vc.driver().enabled);
    }

    #[test]
    fn releasing_the_last_note_mutes_but_keeps_the_pitch() {
        let mut vc = controller();
        send(&mut vc, &[0x90, 60, 100]);
        send(&mut vc, &[0x80, 60, 0]);

        assert!(vc.is_idle());
        assert!(!vc.driver().enabled);
        assert_eq!(vc.current_pitch(), 24); // retained for the next attack
    }

    #[test]
    fn instant_glide_jumps_with_no_ramp() {
        let mut vc = controller();
        send(&mut vc, &[0xB0, 5, 0]); // portamento time zero: instant
        send(&mut vc, &[0x90, 48, 100]);
        send(&mut vc, &[0x90, 72, 100]);

        // both notes landed in single jumps, no intermediate pitches
        assert_eq!(vc.driver().pitches.as_slice(), &[12, 36]);

        // and ticking produces no further pitch motion
        for _ in 0..100 {
            vc.tick();
        }
        assert_eq!(vc.driver().pitches.as_slice(), &[12, 36]);
    }

    #[test]
    fn glide_converges_one_semitone_at_a_time() {
        let mut vc = controller();
        send(&mut vc, &[0x90, 48, 100]); // instant by default: pitch 12
        send(&mut vc, &[0xB0, 5, 32]); // now turn the glide on
        send(&mut vc, &[0x90, 60, 100]); // new target at offset 24

        // the attack itself does not move the pitch, it re-asserts the current one
        assert_eq!(vc.driver().last_pitch(), Some(12));

        // ticking walks the pitch up one semitone at a time to the target
        let mut ticks = 0;
        while vc.current_pitch() != 24 {
            vc.tick();
            ticks += 1;
            assert!(ticks < 100_000, "glide failed to converge");
        }

        // the first 12 is the instant attack, the second is the glide attack re-asserting it
        let walked: &[u8] = &[12, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24];
        assert_eq!(vc.driver().pitches.as_slice(), walked);
    }

    #[test]
    fn glide_retargets_without_retriggering_the_gate() {
        let mut vc = controller();
        send(&mut vc, &[0xB0, 5, 32]);
        send(&mut vc, &[0x90, 48, 100]);
        send(&mut vc, &[0x90, 72, 100]);

        // part way up, release the top note: the glide turns toward the remaining one
        for _ in 0..600 {
            vc.tick();
        }
        let mid = vc.current_pitch();
        assert!(12 < mid && mid < 36);

        send(&mut vc, &[0x80, 72, 0]);
        let mut ticks = 0;
        while vc.current_pitch() != 12 {
            vc.tick();
            ticks += 1;
            assert!(ticks < 1_000_000, "glide failed to converge");
        }
        assert!(vc.driver().enabled); // never muted along the way
    }

    #[test]
    fn all_notes_off_clears_and_mutes_regardless_of_state() {
        let mut vc = controller();
        send(&mut vc, &[0x90, 60, 100, 0x90, 64, 100, 0x90, 67, 100]);
        assert!(!vc.is_idle());

        send(&mut vc, &[0xB0, 123, 0]);
        assert!(vc.is_idle());
        assert!(!vc.driver().enabled);
        assert_eq!(vc.driver().disable_calls, 1);

        // the held notes are really gone: their note-offs find nothing to fall back to
        send(&mut vc, &[0x80, 60, 0, 0x80, 64, 0, 0x80, 67, 0]);
        assert!(vc.is_idle());
        assert!(!vc.driver().enabled);
    }

    #[test]
    fn mod_wheel_drives_the_modulation_output() {
        let mut vc = controller();
        send(&mut vc, &[0xB0, 1, 0]); // depth zero

        vc.tick();
        assert_eq!(vc.driver().modulation, 128); // centered, no vibrato

        send(&mut vc, &[0xB0, 1, 127]); // full depth
        let mut seen_off_center = false;
        for _ in 0..10_000 {
            vc.tick();
            if vc.driver().modulation != 128 {
                seen_off_center = true;
            }
        }
        assert!(seen_off_center);
    }

    #[test]
    fn lfo_rate_cc_changes_the_modulation_speed() {
        let count_changes = |cc_val: u8| {
            let mut vc = controller();
            send(&mut vc, &[0xB0, 1, 127]); // full depth
            send(&mut vc, &[0xB0, 16, cc_val]);

            let mut changes = 0;
            let mut last = 128_u8;
            for _ in 0..4000 {
                vc.tick();
                let m = vc.driver().modulation;
                if m != last {
                    changes += 1;
                    last = m;
                }
            }
            changes
        };

        assert!(count_changes(10) < count_changes(120));
    }

    #[test]
    fn portamento_switch_is_recognized_but_inert() {
        let mut vc = controller();
        send(&mut vc, &[0xB0, 5, 32]); // glide on
        send(&mut vc, &[0xB0, 65, 0]); // "portamento off"

        send(&mut vc, &[0x90, 48, 100, 0x90, 60, 100]);
        // the glide still runs, CC65 does not disable it
        vc.tick();
        for _ in 0..100_000 {
            vc.tick();
        }
        assert_eq!(vc.current_pitch(), 24);
    }

    #[test]
    fn realtime_bytes_mid_message_do_not_corrupt_the_voice() {
        let mut vc = controller();
        // clock bytes sprayed through a note-on
        send(&mut vc, &[0x90, 0xF8, 60, 0xF8, 100]);
        assert_eq!(vc.driver().last_pitch(), Some(24));
    }

    #[test]
    fn traffic_on_a_foreign_channel_is_ignored() {
        let mut vc = controller();
        send(&mut vc, &[0x90, 60, 100]); // learns channel 0
        send(&mut vc, &[0x91, 64, 100]); // channel 1: filtered
        assert_eq!(vc.driver().last_pitch(), Some(24));
        assert_eq!(vc.driver().pitches.len(), 1);
    }

    #[test]
    fn instant_fallback_sounds_the_first_held_note() {
        // Note-On(60), Note-On(64), Note-Off(64) with glide rate 0 sounds 60 again
        let mut vc = controller();
        send(&mut vc, &[0xB0, 5, 0]);
        send(&mut vc, &[0x90, 60, 100, 0x90, 64, 100, 0x80, 64, 0]);
        assert_eq!(vc.current_pitch(), 60 - LOW_NOTE);
    }

    #[cfg(feature = "touch-pads")]
    #[test]
    fn touch_pads_play_notes_at_fixed_velocity() {
        let mut vc = controller();
        vc.scan_touch_pads(0b0000_0000_0000_0001); // pad 0: C2

        assert_eq!(vc.driver().last_pitch(), Some(0));
        assert_eq!(vc.driver().gate_velocity, 128); // 64 doubled
        assert!(vc.driver().enabled);

        vc.scan_touch_pads(0); // released
        assert!(vc.is_idle());
        assert!(!vc.driver().enabled);
    }

    #[cfg(feature = "touch-pads")]
    #[test]
    fn upper_touch_bank_plays_two_octaves_up() {
        let mut vc = controller();
        vc.scan_touch_pads(1 << 8); // pad 8: first pad of the upper bank
        assert_eq!(vc.driver().last_pitch(), Some(8 + 24));
    }
}
