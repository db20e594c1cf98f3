//! Core configuration for marionette-motion-core.

use serde::{Deserialize, Serialize};

/// Configuration for manager sizing and playback defaults.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity hint for a manager's live entry list.
    pub queue_capacity: usize,
    /// Initial capacity hint for per-frame scratch buffers (effect values, fired events).
    pub scratch_capacity: usize,
    /// Whether looping motions re-fade on every iteration when the motion
    /// description does not say otherwise.
    pub loop_fading: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_capacity: 8,
            scratch_capacity: 16,
            loop_fading: true,
        }
    }
}

/// Part-opacity crossfade settings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoseConfig {
    /// Seconds for a newly visible part to reach full opacity.
    pub fade_seconds: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self { fade_seconds: 0.5 }
    }
}

/// Automatic eye blink timing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EyeBlinkConfig {
    /// Mean spacing between blinks.
    pub interval_seconds: f32,
    pub closing_seconds: f32,
    pub closed_seconds: f32,
    pub opening_seconds: f32,
    /// Write `-value` instead of `value` (rigs whose eye parameter is inverted).
    pub inverse: bool,
}

impl Default for EyeBlinkConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 2.0,
            closing_seconds: 0.1,
            closed_seconds: 0.05,
            opening_seconds: 0.15,
            inverse: false,
        }
    }
}
