//! Error types for motion construction and playback control.

use crate::ids::EntryId;

/// Errors surfaced by the motion core.
///
/// Load-time data problems that only affect a single curve (an unknown
/// parameter or part id) are not errors: the curve is dropped with a warning.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MotionError {
    /// Elapsed time handed to an update was negative or not a number.
    #[error("Elapsed time must be a non-negative number, got {elapsed}")]
    NegativeElapsed { elapsed: f32 },

    /// Playback speed was negative or not a number.
    #[error("Playback speed must be a non-negative number, got {speed}")]
    InvalidSpeed { speed: f32 },

    /// Playback weight was outside [0, 1] or not a number.
    #[error("Playback weight must lie in [0, 1], got {weight}")]
    InvalidWeight { weight: f32 },

    /// Playback time was negative or not a number.
    #[error("Playback time must be a non-negative number, got {time}")]
    NegativeTime { time: f32 },

    /// Fade seconds handed to a terminate request were not a number.
    #[error("Fade-out seconds must be a number, got {seconds}")]
    InvalidFadeSeconds { seconds: f32 },

    /// Motion duration was negative or not a number.
    #[error("Motion duration must be a non-negative number, got {duration}")]
    InvalidDuration { duration: f32 },

    /// The flat segment encoding of a curve could not be decoded.
    #[error("Malformed segments for curve '{curve}': {reason}")]
    MalformedSegments { curve: String, reason: String },

    /// A segment kind tag outside the four known kinds.
    #[error("Unknown segment kind {kind} in curve '{curve}'")]
    UnknownSegmentKind { curve: String, kind: f32 },

    /// The entry id no longer refers to a live playback.
    #[error("Motion queue entry not found: {entry:?}")]
    UnknownEntry { entry: EntryId },
}

impl MotionError {
    /// True for errors raised by a caller passing a bad argument at runtime,
    /// as opposed to bad motion data at load time.
    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::NegativeElapsed { .. }
                | Self::InvalidSpeed { .. }
                | Self::InvalidWeight { .. }
                | Self::NegativeTime { .. }
                | Self::InvalidFadeSeconds { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Reject negative or NaN elapsed seconds.
#[inline]
pub(crate) fn check_elapsed(elapsed: f32) -> Result<()> {
    if elapsed.is_nan() || elapsed < 0.0 {
        return Err(MotionError::NegativeElapsed { elapsed });
    }
    Ok(())
}
