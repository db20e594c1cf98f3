//! Handles into the parameter store and named parameter groups.
//!
//! Curves are bound once, when a motion is built: every id in the motion
//! description is resolved against the store into a handle carrying the slot
//! index (and, for parameters, the bounds used to clamp writes). Groups map a
//! group name ("EyeBlink", "LipSync", ...) to the handles it covers; a motion
//! effect channel with the same name modulates those parameters.

use hashbrown::HashMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::store::ParameterStore;

/// One scalar slot of the parameter array, with its bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterHandle {
    pub name: String,
    pub index: usize,
    pub minimum: f32,
    pub maximum: f32,
    pub default: f32,
}

impl ParameterHandle {
    /// Clamp a value into `[minimum, maximum]`.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.minimum).min(self.maximum)
    }
}

/// One slot of the part opacity array.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartHandle {
    pub name: String,
    pub index: usize,
}

/// Clamp an opacity into `[0, 1]`.
#[inline]
pub fn clamp_opacity(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Named groups of parameters, resolved against a store.
#[derive(Clone, Debug, Default)]
pub struct ParameterGroups {
    groups: HashMap<String, Vec<ParameterHandle>>,
}

impl ParameterGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `ids` and register them under `name`, replacing any previous
    /// group of that name. Duplicate ids are kept once; unknown ids are skipped.
    pub fn insert<S: ParameterStore + ?Sized>(&mut self, name: &str, ids: &[String], store: &S) {
        let mut handles: Vec<ParameterHandle> = Vec::with_capacity(ids.len());
        for id in ids {
            if handles.iter().any(|h| &h.name == id) {
                continue;
            }
            match store.parameter(id) {
                Some(handle) => handles.push(handle),
                None => warn!("parameter group '{name}': unknown parameter '{id}' skipped"),
            }
        }
        self.groups.insert(name.to_string(), handles);
    }

    pub fn get(&self, name: &str) -> Option<&[ParameterHandle]> {
        self.groups.get(name).map(|v| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ParameterHandle])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
