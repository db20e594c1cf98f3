//! Idle breathing: sinusoidal offsets added on top of whatever is in the store.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::binding::ParameterHandle;
use crate::blend::write_parameter;
use crate::clip::MotionClip;
use crate::scratch::Scratch;
use crate::store::ParameterStore;

/// One breathing parameter: `offset + peak * sin(2πt / cycle)`, scaled by `weight`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreathParameter {
    pub handle: ParameterHandle,
    pub offset: f32,
    pub peak: f32,
    /// Period in seconds.
    pub cycle: f32,
    pub weight: f32,
}

impl BreathParameter {
    /// Wave value at `time`; a non-positive cycle holds the offset.
    pub fn value_at(&self, time: f32) -> f32 {
        if self.cycle <= 0.0 {
            return self.offset;
        }
        self.offset + self.peak * (TAU * time / self.cycle).sin()
    }
}

/// Infinite clip driving every registered breath parameter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Breath {
    parameters: Vec<BreathParameter>,
}

impl Breath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter; registering the same slot again replaces it.
    pub fn set_parameter(&mut self, parameter: BreathParameter) {
        match self
            .parameters
            .iter_mut()
            .find(|p| p.handle.index == parameter.handle.index)
        {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
    }

    /// Stop driving the slot behind `handle`.
    pub fn remove_parameter(&mut self, handle: &ParameterHandle) {
        self.parameters.retain(|p| p.handle.index != handle.index);
    }

    pub fn with_parameter(mut self, parameter: BreathParameter) -> Self {
        self.set_parameter(parameter);
        self
    }

    pub fn parameters(&self) -> &[BreathParameter] {
        &self.parameters
    }
}

impl MotionClip for Breath {
    fn can_loop(&self) -> bool {
        true
    }

    fn update(
        &self,
        store: &mut dyn ParameterStore,
        _scratch: &mut Scratch,
        time: f32,
        _loop_enabled: bool,
        weight: f32,
    ) {
        for param in &self.parameters {
            let current = store.parameter_value(&param.handle);
            let value = current + param.value_at(time) * param.weight * weight;
            write_parameter(store, &param.handle, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(name: &str, index: usize) -> ParameterHandle {
        ParameterHandle {
            name: name.to_string(),
            index,
            minimum: -30.0,
            maximum: 30.0,
            default: 0.0,
        }
    }

    #[test]
    fn wave_hits_peak_at_quarter_cycle() {
        let p = BreathParameter {
            handle: handle("ParamAngleX", 0),
            offset: 1.0,
            peak: 10.0,
            cycle: 4.0,
            weight: 0.5,
        };
        assert!((p.value_at(0.0) - 1.0).abs() < 1e-5);
        assert!((p.value_at(1.0) - 11.0).abs() < 1e-4);
        assert!((p.value_at(3.0) + 9.0).abs() < 1e-4);
    }

    #[test]
    fn zero_cycle_holds_offset() {
        let p = BreathParameter {
            handle: handle("ParamBreath", 0),
            offset: 0.5,
            peak: 0.5,
            cycle: 0.0,
            weight: 1.0,
        };
        assert_eq!(p.value_at(2.0), 0.5);
    }

    #[test]
    fn set_parameter_replaces_same_slot() {
        let mut breath = Breath::new();
        let mut p = BreathParameter {
            handle: handle("ParamAngleX", 0),
            offset: 0.0,
            peak: 15.0,
            cycle: 6.5,
            weight: 0.5,
        };
        breath.set_parameter(p.clone());
        p.peak = 5.0;
        breath.set_parameter(p);
        assert_eq!(breath.parameters().len(), 1);
        assert_eq!(breath.parameters()[0].peak, 5.0);
        breath.remove_parameter(&handle("ParamAngleY", 1));
        assert_eq!(breath.parameters().len(), 1);
        breath.remove_parameter(&handle("ParamAngleX", 0));
        assert!(breath.parameters().is_empty());
    }
}
