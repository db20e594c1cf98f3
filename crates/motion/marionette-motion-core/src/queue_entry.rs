//! One live playback of a shared clip.
//!
//! State machine:
//! - Playing -> Paused | Suspended | Terminated | Finished
//! - Paused -> Playing | Suspended | Terminated | Finished
//! - Suspended -> Playing (resume) | Finished (terminate)
//! - Terminated -> Finished (fade completed)
//! - Finished is absorbing.
//!
//! The effective weight handed to the clip is `user_weight * system_weight`;
//! time advances by `elapsed * user_speed * system_speed`. The system pair is
//! owned by the state machine, the user pair by the caller.

use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::clip::MotionClip;
use crate::error::{check_elapsed, MotionError, Result};
use crate::ids::EntryId;
use crate::interp::ease_sine;
use crate::scratch::Scratch;
use crate::store::ParameterStore;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Playing,
    Paused,
    Suspended,
    Terminated,
    Finished,
}

impl PlaybackState {
    #[inline]
    pub fn is_finished(self) -> bool {
        self == PlaybackState::Finished
    }

    /// Playing or Paused: the states a fade-out can start from.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }
}

/// Per-playback state wrapped around a shared clip.
#[derive(Debug)]
pub struct MotionQueueEntry {
    id: EntryId,
    motion: Arc<dyn MotionClip>,
    loop_enabled: bool,
    state: PlaybackState,
    time: f32,
    previous_time: f32,
    user_speed: f32,
    system_speed: f32,
    user_weight: f32,
    system_weight: f32,
    terminating_elapsed: f32,
    terminating_duration: f32,
}

impl MotionQueueEntry {
    /// Looping is only enabled when the clip allows it.
    pub fn new(id: EntryId, motion: Arc<dyn MotionClip>, loop_requested: bool) -> Self {
        let loop_enabled = loop_requested && motion.can_loop();
        Self {
            id,
            motion,
            loop_enabled,
            state: PlaybackState::Playing,
            time: 0.0,
            previous_time: 0.0,
            user_speed: 1.0,
            system_speed: 1.0,
            user_weight: 1.0,
            system_weight: 1.0,
            terminating_elapsed: 0.0,
            terminating_duration: f32::INFINITY,
        }
    }

    #[inline]
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn motion(&self) -> &Arc<dyn MotionClip> {
        &self.motion
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    #[inline]
    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    /// Pause (`true`) a playing entry or unpause (`false`) a paused one.
    pub fn pause(&mut self, paused: bool) {
        match (paused, self.state) {
            (true, PlaybackState::Playing) => {
                self.system_speed = 0.0;
                self.state = PlaybackState::Paused;
            }
            (false, PlaybackState::Paused) => {
                self.system_speed = 1.0;
                self.state = PlaybackState::Playing;
            }
            _ => {}
        }
    }

    /// Suspend (`true`) a running entry, or bring a suspended one back (`false`).
    /// A suspended entry neither advances nor influences the model.
    pub fn suspend(&mut self, suspended: bool) {
        match (suspended, self.state) {
            (true, PlaybackState::Playing | PlaybackState::Paused) => {
                self.system_weight = 0.0;
                self.system_speed = 0.0;
                self.state = PlaybackState::Suspended;
            }
            (false, PlaybackState::Suspended) => self.make_playing(),
            _ => {}
        }
    }

    /// Clear Paused or Suspended back to Playing.
    pub fn resume(&mut self) {
        if matches!(self.state, PlaybackState::Paused | PlaybackState::Suspended) {
            self.make_playing();
        }
    }

    fn make_playing(&mut self) {
        self.system_weight = 1.0;
        self.system_speed = 1.0;
        self.state = PlaybackState::Playing;
    }

    /// Fade the entry out over `fade_out_seconds`, or finish it right away when
    /// that is not positive.
    ///
    /// An entry that is already fading only accepts a request that would end
    /// sooner than the current fade; the remaining fade is then compressed so
    /// the instantaneous weight stays where it is.
    pub fn terminate(&mut self, fade_out_seconds: f32) -> Result<()> {
        if fade_out_seconds.is_nan() {
            return Err(MotionError::InvalidFadeSeconds {
                seconds: fade_out_seconds,
            });
        }
        match self.state {
            PlaybackState::Playing | PlaybackState::Paused => {
                if fade_out_seconds > 0.0 {
                    self.terminating_elapsed = 0.0;
                    self.terminating_duration = fade_out_seconds;
                    self.state = PlaybackState::Terminated;
                    debug!("entry {:?} terminating over {}s", self.id, fade_out_seconds);
                } else {
                    self.finish();
                }
            }
            PlaybackState::Suspended => self.finish(),
            PlaybackState::Terminated => {
                if fade_out_seconds <= 0.0 {
                    self.finish();
                } else if fade_out_seconds < self.terminating_remaining() {
                    let fraction = self.terminating_elapsed / self.terminating_duration;
                    self.terminating_elapsed = fraction * fade_out_seconds / (1.0 - fraction);
                    self.terminating_duration = self.terminating_elapsed + fade_out_seconds;
                    debug!(
                        "entry {:?} fade compressed to {}s remaining",
                        self.id, fade_out_seconds
                    );
                }
            }
            PlaybackState::Finished => {}
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.system_weight = 0.0;
        self.system_speed = 0.0;
        self.state = PlaybackState::Finished;
        debug!("entry {:?} finished at t={}", self.id, self.time);
    }

    /// Caller-controlled weight in [0, 1].
    #[inline]
    pub fn weight(&self) -> f32 {
        self.user_weight
    }

    pub fn set_weight(&mut self, weight: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(MotionError::InvalidWeight { weight });
        }
        self.user_weight = weight;
        Ok(())
    }

    /// Caller-controlled speed multiplier.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.user_speed
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        if speed.is_nan() || speed < 0.0 {
            return Err(MotionError::InvalidSpeed { speed });
        }
        self.user_speed = speed;
        Ok(())
    }

    /// Playback time in seconds.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn previous_time(&self) -> f32 {
        self.previous_time
    }

    /// Jump to `time`. The jump itself fires no events.
    pub fn set_time(&mut self, time: f32) -> Result<()> {
        if time.is_nan() || time < 0.0 {
            return Err(MotionError::NegativeTime { time });
        }
        self.time = time;
        self.previous_time = time;
        Ok(())
    }

    #[inline]
    pub fn system_weight(&self) -> f32 {
        self.system_weight
    }

    #[inline]
    pub fn system_speed(&self) -> f32 {
        self.system_speed
    }

    /// `user_weight * system_weight`, the weight the clip is evaluated with.
    #[inline]
    pub fn effective_weight(&self) -> f32 {
        self.user_weight * self.system_weight
    }

    #[inline]
    pub fn terminating_elapsed(&self) -> f32 {
        self.terminating_elapsed
    }

    #[inline]
    pub fn terminating_duration(&self) -> f32 {
        self.terminating_duration
    }

    /// Seconds left of the current fade-out.
    #[inline]
    pub fn terminating_remaining(&self) -> f32 {
        self.terminating_duration - self.terminating_elapsed
    }

    /// Fade-out weight implied by the current termination progress.
    pub fn terminating_weight(&self) -> f32 {
        if self.terminating_duration > 0.0 {
            1.0 - ease_sine(self.terminating_elapsed / self.terminating_duration)
        } else {
            0.0
        }
    }

    /// Advance one frame: evaluate the clip at the current time, collect the
    /// events fired since the previous frame into `scratch.fired`, then move
    /// time forward and run end-of-playback bookkeeping.
    ///
    /// Returns `Ok(false)` without touching anything once finished.
    pub fn update(
        &mut self,
        store: &mut dyn ParameterStore,
        scratch: &mut Scratch,
        elapsed: f32,
    ) -> Result<bool> {
        check_elapsed(elapsed)?;
        scratch.fired.clear();
        if self.is_finished() {
            return Ok(false);
        }

        let weight = self.effective_weight();
        if weight > 0.0 {
            self.motion
                .update(store, scratch, self.time, self.loop_enabled, weight);
        }
        self.motion.fired_events(
            self.time,
            self.previous_time,
            self.loop_enabled,
            &mut scratch.fired,
        );
        trace!(
            "entry {:?} t={} weight={} fired={}",
            self.id,
            self.time,
            weight,
            scratch.fired.len()
        );

        self.previous_time = self.time;
        self.time += elapsed * self.user_speed * self.system_speed;

        if !self.loop_enabled && self.motion.duration() <= self.time {
            self.finish();
        }

        if self.state == PlaybackState::Terminated {
            self.system_weight = self.terminating_weight();
            self.terminating_elapsed += elapsed;
            if self.terminating_duration <= self.terminating_elapsed {
                self.finish();
            }
        }
        Ok(true)
    }
}
