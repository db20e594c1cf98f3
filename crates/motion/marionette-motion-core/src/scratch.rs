//! Scratch buffers reused across frames.
//!
//! Clips are shared and immutable, so anything they compute per frame lives
//! here and is owned by the manager driving them.

use crate::config::Config;

#[derive(Debug, Default)]
pub struct Scratch {
    /// Effect channel coefficients of the clip being evaluated, by effect index.
    pub effect_values: Vec<f32>,
    /// Event payloads fired by the entry being updated.
    pub fired: Vec<String>,
}

impl Scratch {
    pub fn new(cfg: &Config) -> Self {
        Self {
            effect_values: Vec::with_capacity(cfg.scratch_capacity),
            fired: Vec::with_capacity(cfg.scratch_capacity),
        }
    }

    #[inline]
    pub fn begin_frame(&mut self) {
        self.effect_values.clear();
        self.fired.clear();
    }
}
