//! Parameter store contract and an in-memory implementation.
//!
//! The authoritative parameter/opacity arrays belong to the model evaluation
//! core; the motion engine only resolves names to handles at load time and
//! reads/writes slots through those handles every frame. Writes arrive here
//! already clamped (see [`crate::blend`]).

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::binding::{ParameterGroups, ParameterHandle, PartHandle};

/// Trait implemented by whatever owns the model's parameter and opacity arrays.
pub trait ParameterStore {
    /// Resolve a parameter id into a handle with its bounds.
    fn parameter(&self, name: &str) -> Option<ParameterHandle>;
    /// Resolve a part id into a handle.
    fn part(&self, name: &str) -> Option<PartHandle>;

    fn parameter_value(&self, handle: &ParameterHandle) -> f32;
    fn set_parameter_value(&mut self, handle: &ParameterHandle, value: f32);

    /// Opacity currently applied to the part.
    fn part_opacity(&self, handle: &PartHandle) -> f32;
    fn set_part_opacity(&mut self, handle: &PartHandle, value: f32);

    /// Opacity the pose crossfade is steering the part towards.
    fn part_target_opacity(&self, handle: &PartHandle) -> f32;
    fn set_part_target_opacity(&mut self, handle: &PartHandle, value: f32);

    /// Snapshot the parameter array (used between the base and layered passes).
    fn save_parameters(&mut self) {}
    /// Restore the last snapshot, if any.
    fn restore_parameters(&mut self) {}
}

/// Serializable description of a model's parameter and part layout.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ModelLayout {
    #[serde(default)]
    pub parameters: Vec<ParameterDef>,
    #[serde(default)]
    pub parts: Vec<PartDef>,
    #[serde(default)]
    pub groups: Vec<GroupDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterDef {
    pub id: String,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PartDef {
    pub id: String,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
}

fn full_opacity() -> f32 {
    1.0
}

/// A named id group, as declared in the model settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GroupDef {
    /// Only "Parameter" groups take part in effect association.
    pub target: String,
    pub name: String,
    #[serde(default)]
    pub ids: Vec<String>,
}

impl ModelLayout {
    /// Resolve the layout's parameter groups against `store`.
    pub fn parameter_groups<S: ParameterStore + ?Sized>(&self, store: &S) -> ParameterGroups {
        let mut groups = ParameterGroups::new();
        for group in self.groups.iter().filter(|g| g.target == "Parameter") {
            groups.insert(&group.name, &group.ids, store);
        }
        groups
    }
}

/// Flat in-memory parameter store.
#[derive(Clone, Debug, Default)]
pub struct ParameterTable {
    parameters: Vec<ParameterHandle>,
    values: Vec<f32>,
    saved: Option<Vec<f32>>,
    parameter_index: HashMap<String, usize>,
    parts: Vec<PartHandle>,
    part_opacities: Vec<f32>,
    part_targets: Vec<f32>,
    part_index: HashMap<String, usize>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table with every parameter at its default value.
    pub fn from_layout(layout: &ModelLayout) -> Self {
        let mut table = Self::new();
        for p in &layout.parameters {
            table.add_parameter(&p.id, p.min, p.max, p.default);
        }
        for part in &layout.parts {
            let handle = table.add_part(&part.id);
            table.part_opacities[handle.index] = part.opacity.clamp(0.0, 1.0);
            table.part_targets[handle.index] = part.opacity.clamp(0.0, 1.0);
        }
        table
    }

    /// Register a parameter (or return the existing handle for `name`).
    pub fn add_parameter(&mut self, name: &str, min: f32, max: f32, default: f32) -> ParameterHandle {
        if let Some(&idx) = self.parameter_index.get(name) {
            return self.parameters[idx].clone();
        }
        let index = self.parameters.len();
        let handle = ParameterHandle {
            name: name.to_string(),
            index,
            minimum: min,
            maximum: max,
            default,
        };
        self.parameters.push(handle.clone());
        self.values.push(handle.clamp(default));
        self.parameter_index.insert(name.to_string(), index);
        handle
    }

    /// Register a fully opaque part (or return the existing handle for `name`).
    pub fn add_part(&mut self, name: &str) -> PartHandle {
        if let Some(&idx) = self.part_index.get(name) {
            return self.parts[idx].clone();
        }
        let index = self.parts.len();
        let handle = PartHandle {
            name: name.to_string(),
            index,
        };
        self.parts.push(handle.clone());
        self.part_opacities.push(1.0);
        self.part_targets.push(1.0);
        self.part_index.insert(name.to_string(), index);
        handle
    }

    /// Current value by parameter id.
    pub fn value(&self, name: &str) -> Option<f32> {
        self.parameter_index.get(name).map(|&i| self.values[i])
    }

    /// Current opacity by part id.
    pub fn opacity(&self, name: &str) -> Option<f32> {
        self.part_index.get(name).map(|&i| self.part_opacities[i])
    }

    /// Target opacity by part id.
    pub fn target_opacity(&self, name: &str) -> Option<f32> {
        self.part_index.get(name).map(|&i| self.part_targets[i])
    }

    /// Put every parameter back to its default.
    pub fn reset_parameters(&mut self) {
        for (value, handle) in self.values.iter_mut().zip(self.parameters.iter()) {
            *value = handle.clamp(handle.default);
        }
    }

    pub fn parameter_values(&self) -> &[f32] {
        &self.values
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

impl ParameterStore for ParameterTable {
    fn parameter(&self, name: &str) -> Option<ParameterHandle> {
        self.parameter_index
            .get(name)
            .map(|&i| self.parameters[i].clone())
    }

    fn part(&self, name: &str) -> Option<PartHandle> {
        self.part_index.get(name).map(|&i| self.parts[i].clone())
    }

    fn parameter_value(&self, handle: &ParameterHandle) -> f32 {
        self.values.get(handle.index).copied().unwrap_or(handle.default)
    }

    fn set_parameter_value(&mut self, handle: &ParameterHandle, value: f32) {
        if let Some(slot) = self.values.get_mut(handle.index) {
            *slot = value;
        }
    }

    fn part_opacity(&self, handle: &PartHandle) -> f32 {
        self.part_opacities.get(handle.index).copied().unwrap_or(0.0)
    }

    fn set_part_opacity(&mut self, handle: &PartHandle, value: f32) {
        if let Some(slot) = self.part_opacities.get_mut(handle.index) {
            *slot = value;
        }
    }

    fn part_target_opacity(&self, handle: &PartHandle) -> f32 {
        self.part_targets.get(handle.index).copied().unwrap_or(0.0)
    }

    fn set_part_target_opacity(&mut self, handle: &PartHandle, value: f32) {
        if let Some(slot) = self.part_targets.get_mut(handle.index) {
            *slot = value;
        }
    }

    fn save_parameters(&mut self) {
        match &mut self.saved {
            Some(saved) => {
                saved.clear();
                saved.extend_from_slice(&self.values);
            }
            None => self.saved = Some(self.values.clone()),
        }
    }

    fn restore_parameters(&mut self) {
        if let Some(saved) = &self.saved {
            // Parameters registered after the snapshot keep their current value.
            let n = saved.len().min(self.values.len());
            self.values[..n].copy_from_slice(&saved[..n]);
        }
    }
}
