//! Marionette Motion Core (engine-agnostic)
//!
//! Keyframed motion playback and parameter blending for parameter-driven 2D
//! rigs. This crate defines motion descriptions, curve evaluation, fade
//! weights, per-playback queue entries, the motion manager and the layered
//! rig channels (expression, breath, eye blink, pose crossfade) on top of a
//! caller-owned [`ParameterStore`].

pub mod binding;
pub mod blend;
pub mod breath;
pub mod clip;
pub mod config;
pub mod curve;
pub mod data;
pub mod error;
pub mod expression;
pub mod eye_blink;
pub mod fade;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod manager;
pub mod motion;
pub mod outputs;
pub mod pose;
pub mod queue_entry;
pub mod rig;
pub mod scratch;
pub mod store;

// Re-exports for consumers (adapters)
pub use binding::{ParameterGroups, ParameterHandle, PartHandle};
pub use breath::{Breath, BreathParameter};
pub use clip::MotionClip;
pub use config::{Config, EyeBlinkConfig, PoseConfig};
pub use curve::{decode_segments, CurveTarget, MotionCurve, MotionPoint, Segment};
pub use data::{
    CurveData, ExpressionData, ExpressionParameterData, MotionData, MotionMeta, MotionSettings,
    PoseData, PosePartData, UserDataItem,
};
pub use error::{MotionError, Result};
pub use expression::{ExpressionBlend, ExpressionMotion};
pub use eye_blink::{BlinkState, EyeBlink};
pub use fade::{fade_in_weight, fade_out_weight, LoopFlags};
pub use ids::EntryId;
pub use inputs::{EntryCommand, Inputs};
pub use interp::{ease_sine, time_in_motion};
pub use manager::{MotionEventListener, MotionManager};
pub use motion::{Motion, MotionEventData};
pub use outputs::{MotionEvent, Outputs};
pub use pose::Pose;
pub use queue_entry::{MotionQueueEntry, PlaybackState};
pub use rig::{MotionChannel, Rig};
pub use scratch::Scratch;
pub use store::{ModelLayout, ParameterStore, ParameterTable};
