//! Keyframed motion clips.
//!
//! A [`Motion`] is built once from a [`MotionData`] description and then only
//! read. Every frame it evaluates its curves at the playback time and blends
//! the results into the parameter store:
//! 1. effect channel curves are evaluated first (their values scale the
//!    parameter curves linked to them),
//! 2. parameter curves blend towards their value in declaration order,
//! 3. part opacity curves write the target opacity directly,
//! 4. parameters of an effect's group that no curve animates blend towards
//!    the effect value itself.

use log::{debug, warn};

use crate::binding::{ParameterGroups, ParameterHandle};
use crate::blend::{blend_parameter, write_part_target};
use crate::clip::MotionClip;
use crate::config::Config;
use crate::curve::{decode_segments, CurveTarget, MotionCurve};
use crate::data::{MotionData, MotionSettings, TARGET_MODEL, TARGET_PARAMETER, TARGET_PART_OPACITY};
use crate::error::Result;
use crate::fade::{fade_in_weight, fade_out_weight, LoopFlags};
use crate::interp::time_in_motion;
use crate::scratch::Scratch;
use crate::store::ParameterStore;

/// A time-stamped event payload.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEventData {
    pub fire_time: f32,
    pub value: String,
}

/// A named effect channel and the curve producing its coefficient.
#[derive(Clone, Debug, PartialEq)]
struct EffectChannel {
    id: String,
    curve: MotionCurve,
}

/// Immutable keyframed motion.
#[derive(Clone, Debug, PartialEq)]
pub struct Motion {
    duration: f32,
    can_loop: bool,
    loop_fading: bool,
    fade_in_seconds: f32,
    fade_out_seconds: f32,
    /// Parameter and part opacity curves, in declaration order.
    curves: Vec<MotionCurve>,
    /// Effect index per entry of `curves`.
    curve_effects: Vec<Option<usize>>,
    effects: Vec<EffectChannel>,
    /// Parameter group associated with an effect id, kept so links survive
    /// curves added later.
    effect_groups: Vec<(String, Vec<ParameterHandle>)>,
    /// Group parameters of an effect that no curve of this motion animates.
    effect_unused: Vec<(usize, ParameterHandle)>,
    events: Vec<MotionEventData>,
}

impl Motion {
    /// An empty motion of the given length; populate it with the `with_*` builders.
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            can_loop: false,
            loop_fading: true,
            fade_in_seconds: 0.0,
            fade_out_seconds: 0.0,
            curves: Vec::new(),
            curve_effects: Vec::new(),
            effects: Vec::new(),
            effect_groups: Vec::new(),
            effect_unused: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Build a motion with default settings.
    pub fn from_data<S: ParameterStore + ?Sized>(
        data: &MotionData,
        store: &S,
        groups: &ParameterGroups,
    ) -> Result<Self> {
        Self::from_data_with(data, store, groups, &MotionSettings::default(), &Config::default())
    }

    /// Build a motion, resolving curve ids against `store` and linking effect
    /// channels to the parameter group of the same name.
    ///
    /// Curves whose id cannot be resolved, or whose target is unknown, are
    /// dropped with a warning.
    pub fn from_data_with<S: ParameterStore + ?Sized>(
        data: &MotionData,
        store: &S,
        groups: &ParameterGroups,
        settings: &MotionSettings,
        cfg: &Config,
    ) -> Result<Self> {
        data.validate_basic()?;
        let meta = &data.meta;

        let mut motion = Motion::new(meta.duration)
            .with_loop(meta.can_loop)
            .with_loop_fading(meta.loop_fading.unwrap_or(cfg.loop_fading))
            .with_fades(
                pick_fade(settings.fade_in_time, meta.fade_in_time),
                pick_fade(settings.fade_out_time, meta.fade_out_time),
            );

        for item in &data.curves {
            let target = match item.target.as_str() {
                TARGET_MODEL => CurveTarget::Effect(item.id.clone()),
                TARGET_PARAMETER => match store.parameter(&item.id) {
                    Some(handle) => CurveTarget::Parameter(handle),
                    None => {
                        warn!("motion curve dropped: unknown parameter '{}'", item.id);
                        continue;
                    }
                },
                TARGET_PART_OPACITY => match store.part(&item.id) {
                    Some(handle) => CurveTarget::PartOpacity(handle),
                    None => {
                        warn!("motion curve dropped: unknown part '{}'", item.id);
                        continue;
                    }
                },
                other => {
                    warn!("motion curve dropped: unknown target '{other}' for '{}'", item.id);
                    continue;
                }
            };
            let mut curve = MotionCurve::new(target, decode_segments(&item.id, &item.segments)?);
            curve.fade_in_seconds = item.fade_in_time.filter(|s| s.is_finite());
            curve.fade_out_seconds = item.fade_out_time.filter(|s| s.is_finite());
            motion = motion.with_curve(curve);
        }

        match meta.user_data_count {
            Some(count) if count != data.user_data.len() => {
                warn!(
                    "motion events ignored: UserDataCount {} does not match {} entries",
                    count,
                    data.user_data.len()
                );
            }
            _ => {
                for item in &data.user_data {
                    motion = motion.with_event(item.time, &item.value);
                }
            }
        }

        let effect_ids: Vec<String> = motion.effects.iter().map(|e| e.id.clone()).collect();
        for id in effect_ids {
            if let Some(params) = groups.get(&id) {
                motion = motion.with_effect_parameters(&id, params);
            }
        }

        debug!(
            "motion built: duration={} curves={} effects={} events={}",
            motion.duration,
            motion.curves.len(),
            motion.effects.len(),
            motion.events.len()
        );
        Ok(motion)
    }

    pub fn with_loop(mut self, can_loop: bool) -> Self {
        self.can_loop = can_loop;
        self
    }

    pub fn with_loop_fading(mut self, loop_fading: bool) -> Self {
        self.loop_fading = loop_fading;
        self
    }

    /// Global fade-in/out seconds (values <= 0 disable the fade).
    pub fn with_fades(mut self, fade_in_seconds: f32, fade_out_seconds: f32) -> Self {
        self.fade_in_seconds = fade_in_seconds;
        self.fade_out_seconds = fade_out_seconds;
        self
    }

    /// Append a curve. Effect-target curves become effect channels; a later
    /// curve for an existing channel replaces it.
    pub fn with_curve(mut self, curve: MotionCurve) -> Self {
        if let CurveTarget::Effect(id) = &curve.target {
            let id = id.clone();
            match self.effects.iter_mut().find(|e| e.id == id) {
                Some(existing) => existing.curve = curve,
                None => self.effects.push(EffectChannel { id, curve }),
            }
        } else {
            self.curves.push(curve);
        }
        self.link_effects();
        self
    }

    pub fn with_event(mut self, fire_time: f32, value: &str) -> Self {
        self.events.push(MotionEventData {
            fire_time,
            value: value.to_string(),
        });
        self
    }

    /// Associate the parameters of a group with the effect channel `effect_id`.
    ///
    /// Parameter curves targeting a member get scaled by the effect value;
    /// members with no curve are driven by the effect value directly. When
    /// several effects claim the same curve, the effect channel declared first
    /// wins. Associations may be made before or after the curves they affect;
    /// a group whose effect channel never appears has no effect.
    pub fn with_effect_parameters(mut self, effect_id: &str, parameters: &[ParameterHandle]) -> Self {
        match self.effect_groups.iter_mut().find(|(id, _)| id == effect_id) {
            Some((_, group)) => *group = parameters.to_vec(),
            None => self
                .effect_groups
                .push((effect_id.to_string(), parameters.to_vec())),
        }
        self.link_effects();
        self
    }

    /// Recompute curve links and effect-driven parameters from scratch.
    fn link_effects(&mut self) {
        self.curve_effects.clear();
        self.curve_effects.resize(self.curves.len(), None);
        self.effect_unused.clear();

        for (effect, channel) in self.effects.iter().enumerate() {
            let Some((_, group)) = self.effect_groups.iter().find(|(id, _)| *id == channel.id) else {
                continue;
            };
            for param in group {
                let mut animated = false;
                for (curve, link) in self.curves.iter().zip(self.curve_effects.iter_mut()) {
                    if let CurveTarget::Parameter(handle) = &curve.target {
                        if handle.index == param.index {
                            animated = true;
                            if link.is_none() {
                                *link = Some(effect);
                            }
                        }
                    }
                }
                if !animated {
                    self.effect_unused.push((effect, param.clone()));
                }
            }
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn can_loop(&self) -> bool {
        self.can_loop
    }

    pub fn loop_fading(&self) -> bool {
        self.loop_fading
    }

    pub fn fade_in_seconds(&self) -> f32 {
        self.fade_in_seconds
    }

    pub fn fade_out_seconds(&self) -> f32 {
        self.fade_out_seconds
    }

    /// Parameter and part opacity curves in declaration order.
    pub fn curves(&self) -> &[MotionCurve] {
        &self.curves
    }

    pub fn events(&self) -> &[MotionEventData] {
        &self.events
    }

    /// Ids of the effect channels carried by this motion.
    pub fn effect_ids(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().map(|e| e.id.as_str())
    }

    /// Effect channel linked to the curve at `curve_index`, if any.
    pub fn curve_effect(&self, curve_index: usize) -> Option<&str> {
        self.curve_effects
            .get(curve_index)
            .copied()
            .flatten()
            .map(|idx| self.effects[idx].id.as_str())
    }

    /// Names of group parameters driven by an effect without a curve of their own.
    pub fn effect_driven_parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.effect_unused
            .iter()
            .map(|(idx, h)| (self.effects[*idx].id.as_str(), h.name.as_str()))
    }

    fn loop_flags(&self, loop_enabled: bool) -> LoopFlags {
        LoopFlags {
            loop_enabled,
            loop_fading: self.loop_fading,
        }
    }

    /// Global fade-in and fade-out weights at `time`.
    pub fn global_fade_weights(&self, time: f32, loop_enabled: bool) -> (f32, f32) {
        let flags = self.loop_flags(loop_enabled);
        (
            fade_in_weight(time, self.duration, self.fade_in_seconds, flags),
            fade_out_weight(time, self.duration, self.fade_out_seconds, flags),
        )
    }

    /// Fade weight of one curve at `time`, given the global weights.
    fn curve_fade(&self, curve: &MotionCurve, time: f32, flags: LoopFlags, global: (f32, f32)) -> f32 {
        if !curve.has_fade_override() {
            return global.0 * global.1;
        }
        let fade_in = curve
            .fade_in_seconds
            .map_or(global.0, |s| fade_in_weight(time, self.duration, s, flags));
        let fade_out = curve
            .fade_out_seconds
            .map_or(global.1, |s| fade_out_weight(time, self.duration, s, flags));
        fade_in * fade_out
    }
}

/// Settings override first, then the motion's own value, then no fade.
fn pick_fade(setting: Option<f32>, meta: Option<f32>) -> f32 {
    setting
        .filter(|s| s.is_finite())
        .or(meta.filter(|s| s.is_finite()))
        .unwrap_or(0.0)
}

impl MotionClip for Motion {
    fn duration(&self) -> f32 {
        self.duration
    }

    fn can_loop(&self) -> bool {
        self.can_loop
    }

    fn update(
        &self,
        store: &mut dyn ParameterStore,
        scratch: &mut Scratch,
        time: f32,
        loop_enabled: bool,
        weight: f32,
    ) {
        let flags = self.loop_flags(loop_enabled);
        let local_time = time_in_motion(time, self.duration);
        let global = self.global_fade_weights(time, loop_enabled);

        scratch.effect_values.clear();
        scratch
            .effect_values
            .extend(self.effects.iter().map(|e| e.curve.evaluate(time)));

        for (curve, link) in self.curves.iter().zip(self.curve_effects.iter()) {
            match &curve.target {
                CurveTarget::Parameter(handle) => {
                    let mut value = curve.evaluate(local_time);
                    if let Some(effect) = link {
                        value *= scratch.effect_values[*effect];
                    }
                    let fade = self.curve_fade(curve, time, flags, global);
                    blend_parameter(store, handle, value, weight * fade);
                }
                CurveTarget::PartOpacity(handle) => {
                    write_part_target(store, handle, curve.evaluate(local_time));
                }
                CurveTarget::Effect(_) => {}
            }
        }

        let unused_weight = weight * global.0 * global.1;
        for (effect, handle) in &self.effect_unused {
            blend_parameter(store, handle, scratch.effect_values[*effect], unused_weight);
        }
    }

    fn fired_events(&self, time: f32, previous_time: f32, loop_enabled: bool, out: &mut Vec<String>) {
        if !loop_enabled {
            for event in &self.events {
                if previous_time < event.fire_time && event.fire_time <= time {
                    out.push(event.value.clone());
                }
            }
            return;
        }

        let now = time_in_motion(time, self.duration);
        let before = time_in_motion(previous_time, self.duration);
        let wrapped = now < before;
        for event in &self.events {
            let f = event.fire_time;
            let fired = if wrapped {
                before < f || f <= now
            } else {
                before < f && f <= now
            };
            if fired {
                out.push(event.value.clone());
            }
        }
    }
}
