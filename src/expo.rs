//! # Piecewise-linear exponential converter
//!
//! Musically useful rate and time controls feel exponential: each equal nudge of the control should multiply the
//! resulting speed, not add to it. Computing a true exponential is expensive on small processors, so this module
//! approximates the curve `y = 0.0125 * (81^x - 1)` with eight straight line segments, each a single multiply-add.
//!
//! Two fixed variants are provided:
//!
//! - A floating point variant over the domain `[0.0, 1.0]`
//! - An integer variant over the domain `[0, 1024)` producing values in `[1, 8192]`, suitable for feeding
//!   fixed-point phase increments directly
//!
//! Both variants are pure functions over shared read-only tables.

/// `convert(lin_val)` is the linear control value `lin_val` mapped onto an exponential response
///
/// # Arguments
///
/// * `lin_val` - the linear input, in `[0.0, 1.0]`
///
/// Inputs at or above the top of the domain are evaluated with the last line segment, so `convert(1.0)` is exactly
/// the last segment's value at the bound.
pub fn convert(lin_val: f32) -> f32 {
    let index = ((lin_val * NUM_SEGMENTS as f32) as usize).min(NUM_SEGMENTS - 1);
    let (slope, offset) = SEGMENTS[index];

    lin_val * slope + offset
}

/// `convert_u16(lin_val)` is the linear control value `lin_val` mapped onto an exponential response, in `[1, 8192]`
///
/// # Arguments
///
/// * `lin_val` - the linear input, nominally in `[0, 1024)`
///
/// The output is never zero. A rate of zero means "disabled" or "instant" to the modules downstream of this
/// converter, and the slowest usable rate must remain distinguishable from that.
pub fn convert_u16(lin_val: u16) -> u16 {
    let index = ((lin_val >> 7) as usize).min(NUM_SEGMENTS - 1);
    let (slope, offset) = SEGMENTS_FIXED[index];

    (((lin_val as i32 * slope) >> 10) + offset + 1) as u16
}

/// The number of line segments used to approximate the exponential curve
const NUM_SEGMENTS: usize = 8;

/// `(slope, offset)` pairs approximating `y = 0.0125 * (81^x - 1)` over `[0.0, 1.0]`
///
/// Segment `i` covers the input interval `[i/8, (i+1)/8)`
const SEGMENTS: [(f32, f32); NUM_SEGMENTS] = [
    (0.07321, 0.00000),
    (0.12679, -0.00670),
    (0.21962, -0.02990),
    (0.38038, -0.09019),
    (0.65885, -0.22942),
    (1.14115, -0.53087),
    (1.97654, -1.15740),
    (3.42346, -2.42346),
];

/// Fixed-point image of [`SEGMENTS`], scaled for 10-bit inputs
///
/// Segment `i` covers the input interval `[i * 128, (i+1) * 128)`
const SEGMENTS_FIXED: [(i32, i32); NUM_SEGMENTS] = [
    (600, 0),
    (1039, -55),
    (1799, -245),
    (3116, -739),
    (5397, -1879),
    (9348, -4349),
    (16192, -9481),
    (28045, -19853),
];
