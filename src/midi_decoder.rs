//! # MIDI byte-stream decoder
//!
//! A byte-at-a-time protocol state machine which turns the raw serial stream from a MIDI input into discrete
//! events. It is expected to call [`MidiDecoder::consume`] once for every byte received, at any pace.
//!
//! The decoder is single-channel: the first Channel Voice status byte it sees teaches it which channel to listen
//! to, and messages on every other channel are silently drained from then on. This suits retrofit hardware with no
//! channel-select switch.
//!
//! Running status is handled, meaning senders may omit repeated status bytes on consecutive messages of the same
//! type. System Real-Time bytes are handled immediately wherever they appear, even in the middle of another
//! message, without disturbing it. System Exclusive payloads are not interpreted; the decoder skips SysEx bytes
//! until the end-of-exclusive marker.
//!
//! There is no error reporting. Truncated or malformed input simply waits for more bytes or is discarded, in
//! keeping with the error-tolerant philosophy of the MIDI transport: a live instrument must shrug off bad data,
//! not stall on it.

/// A decoded MIDI event is represented here
///
/// Only the messages this decoder can produce are listed. Aftertouch, quarter-frame, song-select and tune-request
/// messages are consumed so the stream stays in sync, but no event is emitted for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    /// A key was pressed. Velocity is in `[1..127]`, a velocity of zero arrives as [`MidiEvent::NoteOff`]
    NoteOn { note: u8, velocity: u8 },
    /// A key was released. Release velocity is discarded
    NoteOff { note: u8 },
    /// A controller moved
    ControlChange { controller: u8, value: u8 },
    /// A patch change request
    ProgramChange { program: u8 },
    /// Pitch bend, 14 bit value with 0x2000 as center
    PitchBend { value: u16 },
    /// Song position pointer, in MIDI beats
    SongPosition { value: u16 },
    /// System Real-Time timing clock, 24 per quarter note
    TimingClock,
    /// System Real-Time start
    Start,
    /// System Real-Time continue
    Continue,
    /// System Real-Time stop
    Stop,
}

/// A single-channel MIDI byte-stream decoder is represented here
pub struct MidiDecoder {
    // the channel learned from the first channel-voice status byte, fixed once learned
    channel: Option<u8>,

    // the last status byte seen, reused across messages per the running-status rule, 0 until the first one
    running_status: u8,

    // pending data bytes of the message in flight
    data: [u8; 2],

    // how many of `data` are filled
    count: u8,
}

impl MidiDecoder {
    /// `MidiDecoder::new()` is a new decoder which will learn its channel from the first channel-voice message
    pub fn new() -> Self {
        Self {
            channel: None,
            running_status: 0,
            data: [0; 2],
            count: 0,
        }
    }

    /// `md.channel()` is the learned MIDI channel in `[0..15]`, or `None` before any channel-voice message arrived
    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// `md.consume(b)` feeds one received byte `b` into the decoder and is the event it completes, if any
    ///
    /// # Examples
    ///
    /// ```
    /// use midi_retrofit::midi_decoder::{MidiDecoder, MidiEvent};
    ///
    /// let mut md = MidiDecoder::new();
    /// assert_eq!(md.consume(0x91), None); // note-on status, channel 1
    /// assert_eq!(md.consume(60), None); // note number
    /// assert_eq!(
    ///     md.consume(100), // velocity completes the message
    ///     Some(MidiEvent::NoteOn { note: 60, velocity: 100 })
    /// );
    /// ```
    pub fn consume(&mut self, byte: u8) -> Option<MidiEvent> {
        // real-time bytes act immediately and may interleave with anything, so they must not touch the
        // running status or the pending data
        if SYSTEM_REAL_TIME <= byte {
            return real_time_event(byte);
        }

        if STATUS_FLAG & byte != 0 {
            self.running_status = byte;
            self.count = 0;
        } else if (self.count as usize) < self.data.len() {
            self.data[self.count as usize] = byte;
            self.count += 1;
        }

        if self.running_status == 0 {
            // data bytes before any status byte have nothing to belong to
            None
        } else if SYSTEM_COMMON <= self.running_status {
            self.system_common()
        } else {
            self.channel_voice()
        }
    }

    /// `md.system_common()` advances a System Common message and is the event it completes, if any
    fn system_common(&mut self) -> Option<MidiEvent> {
        match self.running_status {
            // discard SysEx payload bytes until EOX replaces the running status
            SYSEX_START => {
                self.count = 0;
                None
            }
            SONG_POSITION => {
                if self.count < 2 {
                    return None;
                }
                self.count = 0;
                Some(MidiEvent::SongPosition {
                    value: fourteen_bits(self.data[0], self.data[1]),
                })
            }
            // consumed so the stream stays in sync, but not used
            QUARTER_FRAME | SONG_SELECT => {
                if 1 <= self.count {
                    self.count = 0;
                }
                None
            }
            // tune request, EOX, and the undefined system common bytes carry no data
            _ => {
                self.count = 0;
                None
            }
        }
    }

    /// `md.channel_voice()` advances a Channel Voice message and is the event it completes, if any
    ///
    /// The first channel-voice status byte teaches the decoder its channel. Messages on any other channel are
    /// drained byte-for-byte without emitting anything.
    fn channel_voice(&mut self) -> Option<MidiEvent> {
        let status = self.running_status & STATUS_MASK;
        let incoming_channel = self.running_status & CHANNEL_MASK;

        if self.channel.is_none() {
            self.channel = Some(incoming_channel);
        }

        let expected = expected_data_bytes(status);

        if self.channel != Some(incoming_channel) {
            // silent channel filter: swallow exactly one message worth of bytes
            if expected <= self.count {
                self.count = 0;
            }
            return None;
        }

        if self.count < expected {
            return None;
        }
        self.count = 0;

        match status {
            NOTE_ON => {
                // note-on with velocity of zero is a note-off per the MIDI convention
                if self.data[1] == 0 {
                    Some(MidiEvent::NoteOff { note: self.data[0] })
                } else {
                    Some(MidiEvent::NoteOn {
                        note: self.data[0],
                        velocity: self.data[1],
                    })
                }
            }
            NOTE_OFF => Some(MidiEvent::NoteOff { note: self.data[0] }),
            CONTROL_CHANGE => Some(MidiEvent::ControlChange {
                controller: self.data[0],
                value: self.data[1],
            }),
            PITCH_BEND => Some(MidiEvent::PitchBend {
                value: fourteen_bits(self.data[0], self.data[1]),
            }),
            PROGRAM_CHANGE => Some(MidiEvent::ProgramChange {
                program: self.data[0],
            }),
            // poly and channel aftertouch are consumed but not used
            _ => None,
        }
    }
}

impl Default for MidiDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// `expected_data_bytes(s)` is the number of data bytes which complete a channel-voice message with status `s`
fn expected_data_bytes(status: u8) -> u8 {
    match status {
        PROGRAM_CHANGE | CHANNEL_AFTERTOUCH => 1,
        _ => 2,
    }
}

/// `real_time_event(b)` is the event for System Real-Time byte `b`, if it maps to one
///
/// Active Sensing and System Reset are ignored.
fn real_time_event(byte: u8) -> Option<MidiEvent> {
    match byte {
        TIMING_CLOCK => Some(MidiEvent::TimingClock),
        START => Some(MidiEvent::Start),
        CONTINUE => Some(MidiEvent::Continue),
        STOP => Some(MidiEvent::Stop),
        _ => None,
    }
}

/// `fourteen_bits(lsb, msb)` is the two 7-bit data bytes assembled into one 14-bit value
fn fourteen_bits(lsb: u8, msb: u8) -> u16 {
    lsb as u16 | ((msb as u16) << 7)
}

// status byte layout
const STATUS_FLAG: u8 = 0x80;
const STATUS_MASK: u8 = 0xF0;
const CHANNEL_MASK: u8 = 0x0F;

// channel voice statuses, high nibble
const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const PROGRAM_CHANGE: u8 = 0xC0;
const CHANNEL_AFTERTOUCH: u8 = 0xD0;
const PITCH_BEND: u8 = 0xE0;

// system common statuses
const SYSTEM_COMMON: u8 = 0xF0;
const SYSEX_START: u8 = 0xF0;
const QUARTER_FRAME: u8 = 0xF1;
const SONG_POSITION: u8 = 0xF2;
const SONG_SELECT: u8 = 0xF3;

// system real-time statuses
const SYSTEM_REAL_TIME: u8 = 0xF8;
const TIMING_CLOCK: u8 = 0xF8;
const START: u8 = 0xFA;
const CONTINUE: u8 = 0xFB;
const STOP: u8 = 0xFC;
