//! Blending channels of one rigged character.
//!
//! Three independent managers are layered every frame:
//! 1. restore the parameters saved last frame, then run the Base channel,
//! 2. save the result (so base motions always start from their own output),
//! 3. run the Expression and Effect channels on top,
//! 4. eye blink and pose crossfade, when configured.

use std::sync::Arc;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::breath::Breath;
use crate::clip::MotionClip;
use crate::config::Config;
use crate::error::{check_elapsed, Result};
use crate::eye_blink::EyeBlink;
use crate::ids::EntryId;
use crate::manager::MotionManager;
use crate::pose::Pose;
use crate::store::ParameterStore;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionChannel {
    Base,
    Expression,
    Effect,
}

#[derive(Debug)]
pub struct Rig {
    base: MotionManager,
    expression: MotionManager,
    effect: MotionManager,
    eye_blink: Option<EyeBlink>,
    pose: Option<Pose>,
    breath: Option<EntryId>,
}

impl Default for Rig {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Rig {
    pub fn new(cfg: &Config) -> Self {
        Self {
            base: MotionManager::new(cfg.clone()),
            expression: MotionManager::new(cfg.clone()),
            effect: MotionManager::new(cfg.clone()),
            eye_blink: None,
            pose: None,
            breath: None,
        }
    }

    pub fn manager(&self, channel: MotionChannel) -> &MotionManager {
        match channel {
            MotionChannel::Base => &self.base,
            MotionChannel::Expression => &self.expression,
            MotionChannel::Effect => &self.effect,
        }
    }

    pub fn manager_mut(&mut self, channel: MotionChannel) -> &mut MotionManager {
        match channel {
            MotionChannel::Base => &mut self.base,
            MotionChannel::Expression => &mut self.expression,
            MotionChannel::Effect => &mut self.effect,
        }
    }

    /// Start `clip` on `channel`.
    pub fn start_motion(&mut self, channel: MotionChannel, clip: Arc<dyn MotionClip>, loop_enabled: bool) -> EntryId {
        self.manager_mut(channel).start_motion(clip, loop_enabled)
    }

    pub fn set_eye_blink(&mut self, eye_blink: Option<EyeBlink>) {
        self.eye_blink = eye_blink;
    }

    pub fn eye_blink(&self) -> Option<&EyeBlink> {
        self.eye_blink.as_ref()
    }

    /// Install a pose crossfade; the store is expected to be in the pose's reset state.
    pub fn set_pose(&mut self, pose: Option<Pose>) {
        self.pose = pose;
    }

    pub fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    /// Play `breath` forever on the Effect channel, replacing the previous one.
    pub fn set_breath(&mut self, breath: Breath) -> Result<EntryId> {
        if let Some(previous) = self.breath.take() {
            if let Some(entry) = self.effect.entry_mut(previous) {
                entry.terminate(0.0)?;
            }
        }
        let id = self.effect.start_motion(Arc::new(breath), true);
        self.breath = Some(id);
        Ok(id)
    }

    /// True when no channel has a live entry.
    pub fn all_finished(&self) -> bool {
        self.base.all_finished() && self.expression.all_finished() && self.effect.all_finished()
    }

    /// Advance every channel by `elapsed` seconds.
    pub fn update(&mut self, store: &mut dyn ParameterStore, elapsed: f32) -> Result<()> {
        check_elapsed(elapsed)?;
        trace!("rig update dt={elapsed}");

        store.restore_parameters();
        self.base.update(store, elapsed)?;
        store.save_parameters();
        self.expression.update(store, elapsed)?;
        self.effect.update(store, elapsed)?;

        if let Some(eye_blink) = self.eye_blink.as_mut() {
            eye_blink.update(store, elapsed)?;
        }
        if let Some(pose) = self.pose.as_ref() {
            pose.update(store, elapsed);
        }
        Ok(())
    }
}
