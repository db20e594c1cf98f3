//! Serializable descriptions of motions, expressions and poses.
//!
//! Key names follow the motion exchange format (PascalCase). These types are
//! plain data: building a playable clip resolves ids against a store and
//! happens in [`crate::motion`], [`crate::expression`] and [`crate::pose`].

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};

/// Target string of effect-channel curves.
pub const TARGET_MODEL: &str = "Model";
/// Target string of parameter curves.
pub const TARGET_PARAMETER: &str = "Parameter";
/// Target string of part opacity curves.
pub const TARGET_PART_OPACITY: &str = "PartOpacity";

/// A motion clip description.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MotionData {
    #[serde(default)]
    pub version: u32,
    pub meta: MotionMeta,
    #[serde(default)]
    pub curves: Vec<CurveData>,
    #[serde(default)]
    pub user_data: Vec<UserDataItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MotionMeta {
    /// Length of one iteration, in seconds.
    pub duration: f32,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default, rename = "Loop")]
    pub can_loop: bool,
    #[serde(default)]
    pub fade_in_time: Option<f32>,
    #[serde(default)]
    pub fade_out_time: Option<f32>,
    /// When present, events are only loaded if it matches `UserData.len()`.
    #[serde(default)]
    pub user_data_count: Option<usize>,
    /// Re-fade on every loop iteration; falls back to the manager config.
    #[serde(default)]
    pub loop_fading: Option<bool>,
}

/// One curve: flat segment encoding plus optional fade overrides.
///
/// Segment encoding: `[t0, v0, kind, points..., kind, points..., ...]` where
/// kind 0 = linear (1 point), 1 = bezier (3 points), 2 = stepped (1 point),
/// 3 = inverse stepped (1 point). Each segment starts at the last point of
/// the previous one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CurveData {
    pub target: String,
    pub id: String,
    pub segments: Vec<f32>,
    #[serde(default)]
    pub fade_in_time: Option<f32>,
    #[serde(default)]
    pub fade_out_time: Option<f32>,
}

/// A time-stamped event payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UserDataItem {
    pub time: f32,
    pub value: String,
}

/// Fade overrides supplied by the model settings for one motion; they take
/// precedence over the motion's own meta values.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MotionSettings {
    #[serde(default)]
    pub fade_in_time: Option<f32>,
    #[serde(default)]
    pub fade_out_time: Option<f32>,
}

impl MotionData {
    /// Validate basic invariants (finite non-negative duration, finite event times).
    pub fn validate_basic(&self) -> Result<()> {
        let duration = self.meta.duration;
        if duration.is_nan() || duration < 0.0 {
            return Err(MotionError::InvalidDuration { duration });
        }
        for curve in &self.curves {
            if curve.segments.iter().any(|v| !v.is_finite()) {
                return Err(MotionError::MalformedSegments {
                    curve: curve.id.clone(),
                    reason: "non-finite number in segment data".into(),
                });
            }
        }
        Ok(())
    }
}

/// Expression description: a set of parameter offsets blended on top of the
/// base motion.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ExpressionData {
    #[serde(default)]
    pub fade_in_time: Option<f32>,
    #[serde(default)]
    pub fade_out_time: Option<f32>,
    #[serde(default)]
    pub parameters: Vec<ExpressionParameterData>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ExpressionParameterData {
    pub id: String,
    pub value: f32,
    /// "Add" (default), "Multiply" or "Overwrite".
    #[serde(default)]
    pub blend: Option<String>,
}

/// Pose description: groups of mutually exclusive parts.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PoseData {
    #[serde(default)]
    pub fade_in_time: Option<f32>,
    #[serde(default)]
    pub groups: Vec<Vec<PosePartData>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PosePartData {
    pub id: String,
    #[serde(default)]
    pub link: Vec<String>,
}
