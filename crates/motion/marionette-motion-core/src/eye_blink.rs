//! Automatic eye blinking.
//!
//! A small state machine on its own clock:
//! First -> Interval -> Closing -> Closed -> Opening -> Interval -> ...
//! The eye value is 1 while open and 0 while closed, with linear ramps in
//! between; it is written (not blended) to every blink parameter.

use std::fmt;

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::binding::ParameterHandle;
use crate::blend::write_parameter;
use crate::config::EyeBlinkConfig;
use crate::error::{check_elapsed, Result};
use crate::store::ParameterStore;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlinkState {
    First,
    Interval,
    Closing,
    Closed,
    Opening,
}

pub struct EyeBlink {
    cfg: EyeBlinkConfig,
    parameters: Vec<ParameterHandle>,
    rng: Box<dyn RngCore + Send>,
    state: BlinkState,
    clock: f32,
    state_start: f32,
    next_blink: f32,
}

impl fmt::Debug for EyeBlink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EyeBlink")
            .field("cfg", &self.cfg)
            .field("parameters", &self.parameters)
            .field("state", &self.state)
            .field("clock", &self.clock)
            .field("next_blink", &self.next_blink)
            .finish()
    }
}

impl EyeBlink {
    /// Blink `parameters` with timing jitter drawn from `rng`.
    pub fn new(cfg: EyeBlinkConfig, parameters: Vec<ParameterHandle>, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            cfg,
            parameters,
            rng,
            state: BlinkState::First,
            clock: 0.0,
            state_start: 0.0,
            next_blink: 0.0,
        }
    }

    /// Same as [`EyeBlink::new`] with an entropy-seeded generator.
    pub fn from_entropy(cfg: EyeBlinkConfig, parameters: Vec<ParameterHandle>) -> Self {
        Self::new(cfg, parameters, Box::new(StdRng::from_entropy()))
    }

    #[inline]
    pub fn state(&self) -> BlinkState {
        self.state
    }

    pub fn parameters(&self) -> &[ParameterHandle] {
        &self.parameters
    }

    pub fn config(&self) -> &EyeBlinkConfig {
        &self.cfg
    }

    /// Clock time at which the next blink starts closing.
    pub fn next_blink_time(&self) -> f32 {
        self.next_blink
    }

    fn schedule_next(&mut self) {
        let r: f32 = self.rng.gen();
        self.next_blink = self.clock + r * (2.0 * self.cfg.interval_seconds - 1.0);
    }

    /// Progress through the current timed state; zero-length states are done at once.
    fn progress(&self, seconds: f32) -> f32 {
        if seconds <= 0.0 {
            return 1.0;
        }
        (self.clock - self.state_start) / seconds
    }

    fn enter(&mut self, state: BlinkState) {
        self.state = state;
        self.state_start = self.clock;
    }

    /// Advance the clock by `elapsed` and write the eye value. Returns the value written
    /// before clamping.
    pub fn update(&mut self, store: &mut dyn ParameterStore, elapsed: f32) -> Result<f32> {
        check_elapsed(elapsed)?;
        self.clock += elapsed;

        let value = match self.state {
            BlinkState::Closing => {
                let mut t = self.progress(self.cfg.closing_seconds);
                if t >= 1.0 {
                    t = 1.0;
                    self.enter(BlinkState::Closed);
                }
                1.0 - t
            }
            BlinkState::Closed => {
                if self.progress(self.cfg.closed_seconds) >= 1.0 {
                    self.enter(BlinkState::Opening);
                }
                0.0
            }
            BlinkState::Opening => {
                let mut t = self.progress(self.cfg.opening_seconds);
                if t >= 1.0 {
                    t = 1.0;
                    self.state = BlinkState::Interval;
                    self.schedule_next();
                }
                t
            }
            BlinkState::Interval => {
                if self.next_blink < self.clock {
                    self.enter(BlinkState::Closing);
                }
                1.0
            }
            BlinkState::First => {
                self.state = BlinkState::Interval;
                self.schedule_next();
                1.0
            }
        };
        let value = if self.cfg.inverse { -value } else { value };
        trace!("eye blink {:?} value={}", self.state, value);

        for handle in &self.parameters {
            write_parameter(store, handle, value);
        }
        Ok(value)
    }
}
