#![no_std]
#![doc = include_str!("../README.md")]

pub mod expo;
pub mod glissando;
pub mod lfo;
pub mod midi_decoder;
pub mod note_stack;
pub mod output;
pub mod tick;
#[cfg(feature = "touch-pads")]
pub mod touch_scanner;
pub mod voice_controller;
