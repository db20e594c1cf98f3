//! Scalar interpolation and easing helpers shared by curves, fades and
//! the pose crossfade.

pub mod functions;

pub use functions::{ease_sine, lerp_f32, time_in_motion};
