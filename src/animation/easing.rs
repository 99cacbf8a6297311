//! Easing curves.
//!
//! Curves take `(t, b, c, d)`: elapsed time, start value, total change and
//! duration, and return the eased value at `t`.

/// Exponential ease-out: fast start, `2^(-10t)` approach to the end value.
/// Exactly `b + c` once `t` reaches `d`.
#[inline]
#[must_use]
pub fn expo_ease_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    if t >= d {
        b + c
    } else {
        c * (1.0 - 2f32.powf(-10.0 * t / d)) + b
    }
}
