//! # Held-note stack
//!
//! An ordered record of the keys currently held down, used to decide which note a monophonic voice should sound.
//!
//! Notes are stored in press order with the most recent at the tail, so the top of the stack implements last-note
//! priority: when the player releases the sounding key while still holding others, the voice falls back to the most
//! recently pressed key which is still down.
//!
//! The stack holds semitone offsets in `[0..47]`, one slot per selectable note, and never stores duplicates, so it
//! can never overflow in normal use. Out-of-range or duplicate presses and releases of absent notes are silent
//! no-ops; a performance instrument absorbs odd input instead of failing on it.

use heapless::Vec;

/// A fixed-capacity stack of held notes with last-note priority is represented here
pub struct NoteStack {
    held: Vec<u8, NOTE_STACK_CAPACITY>,
}

impl NoteStack {
    /// `NoteStack::new()` is a new, empty note stack
    pub fn new() -> Self {
        Self { held: Vec::new() }
    }

    /// `ns.press(n)` records note `n` as held
    ///
    /// Notes outside `[0..47]`, notes already held, and presses beyond capacity are ignored.
    pub fn press(&mut self, note: u8) {
        if NOTE_STACK_CAPACITY as u8 <= note {
            return;
        }
        if !self.held.contains(&note) {
            self.held.push(note).ok();
        }
    }

    /// `ns.release(n)` removes note `n` from the held notes, preserving the order of the rest
    ///
    /// Releasing a note which is not held is a no-op.
    pub fn release(&mut self, note: u8) {
        self.held.retain(|n| *n != note);
    }

    /// `ns.top()` is the most recently pressed note still held, if any
    pub fn top(&self) -> Option<u8> {
        self.held.last().copied()
    }

    /// `ns.is_empty()` is true iff no notes are held
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// `ns.len()` is the number of notes currently held
    pub fn len(&self) -> usize {
        self.held.len()
    }

    /// `ns.clear()` releases everything, used for All Notes Off
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl Default for NoteStack {
    fn default() -> Self {
        Self::new()
    }
}

/// One slot per selectable note, so a duplicate-free stack can always hold every key at once
pub const NOTE_STACK_CAPACITY: usize = 48;
