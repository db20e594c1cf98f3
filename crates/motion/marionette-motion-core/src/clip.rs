//! The playable-clip seam between queue entries and what they play.

use std::fmt;

use crate::scratch::Scratch;
use crate::store::ParameterStore;

/// An immutable, time-indexed clip that a [`MotionQueueEntry`](crate::MotionQueueEntry)
/// can play. One clip may back any number of simultaneous playbacks, so all
/// per-playback state lives in the entry and all per-frame temporaries in
/// [`Scratch`].
pub trait MotionClip: fmt::Debug + Send + Sync {
    /// Length of one iteration in seconds; unbounded clips never finish on their own.
    fn duration(&self) -> f32 {
        f32::INFINITY
    }

    /// Whether the clip may be played in a loop.
    fn can_loop(&self) -> bool {
        false
    }

    /// Blend the clip's contribution at playback `time` into `store`.
    /// `weight` is the playing entry's effective weight in [0, 1].
    fn update(
        &self,
        store: &mut dyn ParameterStore,
        scratch: &mut Scratch,
        time: f32,
        loop_enabled: bool,
        weight: f32,
    );

    /// Append the payloads of events fired between `previous_time` (exclusive)
    /// and `time` (inclusive).
    fn fired_events(&self, _time: f32, _previous_time: f32, _loop_enabled: bool, _out: &mut Vec<String>) {}
}
