//! Fade-in/out weights of a playing clip.
//!
//! Both weights lie in [0, 1] and use the eased sine ramp. With looping and
//! loop fading enabled the ramps restart on every iteration; looping without
//! loop fading never fades out.

use crate::interp::{ease_sine, time_in_motion};

/// Flags shared by both fade computations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoopFlags {
    pub loop_enabled: bool,
    pub loop_fading: bool,
}

impl LoopFlags {
    #[inline]
    fn refades(self) -> bool {
        self.loop_enabled && self.loop_fading
    }
}

/// Fade-in weight at `time`.
pub fn fade_in_weight(time: f32, duration: f32, fade_seconds: f32, flags: LoopFlags) -> f32 {
    if fade_seconds <= 0.0 {
        return 1.0;
    }
    if flags.refades() {
        ease_sine(time_in_motion(time, duration) / fade_seconds)
    } else {
        ease_sine(time / fade_seconds)
    }
}

/// Fade-out weight at `time`.
pub fn fade_out_weight(time: f32, duration: f32, fade_seconds: f32, flags: LoopFlags) -> f32 {
    if fade_seconds <= 0.0 {
        return 1.0;
    }
    if !flags.loop_enabled {
        ease_sine((duration - time) / fade_seconds)
    } else if !flags.loop_fading {
        1.0
    } else {
        ease_sine((duration - time_in_motion(time, duration)) / fade_seconds)
    }
}
