//! Weighted writes into the parameter store.
//!
//! Every motion write is a blend towards its target computed against the
//! value currently in the store, so several playbacks in one pass accumulate
//! in iteration order instead of overwriting each other. Clamping to the
//! handle bounds happens here, before the store sees the value.

use crate::binding::{clamp_opacity, ParameterHandle, PartHandle};
use crate::interp::lerp_f32;
use crate::store::ParameterStore;

/// Move a parameter towards `target` by `weight` (0 keeps the current value,
/// 1 writes `target`). Returns the value written.
#[inline]
pub fn blend_parameter<S: ParameterStore + ?Sized>(
    store: &mut S,
    handle: &ParameterHandle,
    target: f32,
    weight: f32,
) -> f32 {
    let current = store.parameter_value(handle);
    write_parameter(store, handle, lerp_f32(current, target, weight))
}

/// Clamp and write an absolute parameter value. Returns the value written.
#[inline]
pub fn write_parameter<S: ParameterStore + ?Sized>(
    store: &mut S,
    handle: &ParameterHandle,
    value: f32,
) -> f32 {
    let clamped = handle.clamp(value);
    store.set_parameter_value(handle, clamped);
    clamped
}

/// Clamp and write a part's target opacity.
#[inline]
pub fn write_part_target<S: ParameterStore + ?Sized>(store: &mut S, handle: &PartHandle, value: f32) {
    store.set_part_target_opacity(handle, clamp_opacity(value));
}

/// Clamp and write a part's current opacity.
#[inline]
pub fn write_part_opacity<S: ParameterStore + ?Sized>(store: &mut S, handle: &PartHandle, value: f32) {
    store.set_part_opacity(handle, clamp_opacity(value));
}
