//! # Real-time tick flag
//!
//! The controller is driven by a fixed-rate hardware timer (4 kHz on the original board). The timer interrupt
//! raises a flag and the main loop takes it, so the only data crossing the interrupt boundary is a single bit with
//! one producer and one consumer.
//!
//! The take is a single atomic swap, so a tick raised between the read and the clear can never be lost. The main
//! loop must still poll fast enough that two ticks never coalesce into one — a missed tick shortchanges the
//! fixed-point glide and LFO math by one step.

use core::sync::atomic::{AtomicBool, Ordering};

/// The single-slot tick handoff between a timer interrupt and the main loop is represented here
pub struct TickFlag {
    raised: AtomicBool,
}

impl TickFlag {
    /// `TickFlag::new()` is a new, lowered tick flag, usable in a `static`
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// `tf.raise()` marks a tick as pending, called from the timer interrupt
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// `tf.take()` is true iff a tick was pending, clearing it in the same atomic step
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }
}

impl Default for TickFlag {
    fn default() -> Self {
        Self::new()
    }
}
