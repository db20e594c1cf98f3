//! Interpolation helpers:
//! - lerp_f32 (scalar lerp)
//! - ease_sine (cosine ease used by every fade in the crate)
//! - time_in_motion (loop-aware modulo guarded for zero/infinite durations)

use std::f32::consts::PI;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Eased sine ramp: 0 below 0, 1 above 1, `0.5 - 0.5 cos(pi t)` in between.
#[inline]
pub fn ease_sine(t: f32) -> f32 {
    if t < 0.0 {
        0.0
    } else if t > 1.0 {
        1.0
    } else {
        0.5 - 0.5 * (PI * t).cos()
    }
}

/// Map an accumulated playback time into a single loop iteration.
///
/// A zero-length motion always maps to 0 and an unbounded one never wraps.
#[inline]
pub fn time_in_motion(time: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    if duration.is_infinite() {
        return time;
    }
    let m = time % duration;
    if m < 0.0 {
        m + duration
    } else {
        m
    }
}
