//! Expression clips: fixed parameter offsets layered over the base motion.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::binding::ParameterHandle;
use crate::blend::write_parameter;
use crate::clip::MotionClip;
use crate::data::ExpressionData;
use crate::fade::{fade_in_weight, LoopFlags};
use crate::interp::lerp_f32;
use crate::scratch::Scratch;
use crate::store::ParameterStore;

/// How an expression value combines with the value already in the store.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionBlend {
    #[default]
    Add,
    Multiply,
    Overwrite,
}

impl ExpressionBlend {
    /// Unknown or missing names fall back to `Add`.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("Multiply") => ExpressionBlend::Multiply,
            Some("Overwrite") => ExpressionBlend::Overwrite,
            Some("Add") | None => ExpressionBlend::Add,
            Some(other) => {
                warn!("unknown expression blend '{other}', using Add");
                ExpressionBlend::Add
            }
        }
    }

    /// Combine `current` with `value` at `weight`.
    #[inline]
    pub fn apply(self, current: f32, value: f32, weight: f32) -> f32 {
        match self {
            ExpressionBlend::Add => current + value * weight,
            ExpressionBlend::Multiply => current * (1.0 + (value - 1.0) * weight),
            ExpressionBlend::Overwrite => lerp_f32(current, value, weight),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionParameter {
    pub handle: ParameterHandle,
    pub blend: ExpressionBlend,
    pub value: f32,
}

/// Infinite clip holding `(parameter, blend, value)` triples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionMotion {
    parameters: Vec<ExpressionParameter>,
    fade_in_seconds: f32,
    fade_out_seconds: f32,
}

/// Expression fades are limited to one second.
fn clamp_fade(seconds: Option<f32>) -> f32 {
    seconds
        .filter(|s| !s.is_nan())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0)
}

impl ExpressionMotion {
    pub fn new(fade_in_seconds: f32, fade_out_seconds: f32) -> Self {
        Self {
            parameters: Vec::new(),
            fade_in_seconds: clamp_fade(Some(fade_in_seconds)),
            fade_out_seconds: clamp_fade(Some(fade_out_seconds)),
        }
    }

    /// Build from a description; parameters the store does not know are dropped.
    pub fn from_data<S: ParameterStore + ?Sized>(data: &ExpressionData, store: &S) -> Self {
        let mut expression = Self {
            parameters: Vec::with_capacity(data.parameters.len()),
            fade_in_seconds: clamp_fade(data.fade_in_time),
            fade_out_seconds: clamp_fade(data.fade_out_time),
        };
        for item in &data.parameters {
            let Some(handle) = store.parameter(&item.id) else {
                warn!("expression parameter dropped: unknown parameter '{}'", item.id);
                continue;
            };
            expression.parameters.push(ExpressionParameter {
                handle,
                blend: ExpressionBlend::from_name(item.blend.as_deref()),
                value: item.value,
            });
        }
        debug!("expression built: {} parameters", expression.parameters.len());
        expression
    }

    pub fn with_parameter(mut self, handle: ParameterHandle, blend: ExpressionBlend, value: f32) -> Self {
        self.parameters.push(ExpressionParameter { handle, blend, value });
        self
    }

    pub fn parameters(&self) -> &[ExpressionParameter] {
        &self.parameters
    }

    pub fn fade_in_seconds(&self) -> f32 {
        self.fade_in_seconds
    }

    /// Suggested fade when terminating a playback of this expression.
    pub fn fade_out_seconds(&self) -> f32 {
        self.fade_out_seconds
    }
}

impl MotionClip for ExpressionMotion {
    fn update(
        &self,
        store: &mut dyn ParameterStore,
        _scratch: &mut Scratch,
        time: f32,
        _loop_enabled: bool,
        weight: f32,
    ) {
        let flags = LoopFlags {
            loop_enabled: false,
            loop_fading: false,
        };
        let weight = weight * fade_in_weight(time, f32::INFINITY, self.fade_in_seconds, flags);
        for param in &self.parameters {
            let current = store.parameter_value(&param.handle);
            write_parameter(store, &param.handle, param.blend.apply(current, param.value, weight));
        }
    }
}
