//! Motion manager: owns the live playbacks of one blending channel.
//!
//! Methods:
//! - start_motion, update (entries in start order → events → listener → cleanup)
//! - terminate_motions / terminate_all_motions, apply_inputs, entry lookup
//!
//! Entries write into the store in start order, so later playbacks blend
//! against whatever earlier ones left in the same tick. Nothing is ever dropped
//! for capacity: an embedder wanting independent categories runs one manager
//! per category.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::clip::MotionClip;
use crate::config::Config;
use crate::error::{check_elapsed, MotionError, Result};
use crate::ids::{EntryId, IdAllocator};
use crate::inputs::{EntryCommand, Inputs};
use crate::outputs::{MotionEvent, Outputs};
use crate::queue_entry::{MotionQueueEntry, PlaybackState};
use crate::scratch::Scratch;
use crate::store::ParameterStore;

/// Receives user-data events synchronously during [`MotionManager::update`].
///
/// Events are collected during the entry pass and delivered afterwards, in
/// entry order, once every entry has been updated and before finished entries
/// are dropped. A listener therefore never observes a half-updated queue: the
/// `&MotionManager` it receives already reflects this frame's times and
/// states. The listener value itself carries whatever context the embedder
/// needs.
pub trait MotionEventListener: Send {
    fn on_event(&mut self, manager: &MotionManager, value: &str);
}

impl<F> MotionEventListener for F
where
    F: FnMut(&MotionManager, &str) + Send,
{
    fn on_event(&mut self, manager: &MotionManager, value: &str) {
        self(manager, value)
    }
}

pub struct MotionManager {
    pub cfg: Config,
    ids: IdAllocator,
    entries: Vec<MotionQueueEntry>,
    scratch: Scratch,
    outputs: Outputs,
    listener: Option<Box<dyn MotionEventListener>>,
}

impl fmt::Debug for MotionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionManager")
            .field("cfg", &self.cfg)
            .field("entries", &self.entries)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl Default for MotionManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl MotionManager {
    pub fn new(cfg: Config) -> Self {
        Self {
            ids: IdAllocator::new(),
            entries: Vec::with_capacity(cfg.queue_capacity),
            scratch: Scratch::new(&cfg),
            outputs: Outputs::default(),
            listener: None,
            cfg,
        }
    }

    /// Start a new playback of `motion`. Looping is only honored when the
    /// clip supports it.
    pub fn start_motion(&mut self, motion: Arc<dyn MotionClip>, loop_enabled: bool) -> EntryId {
        let id = self.ids.alloc_entry();
        let entry = MotionQueueEntry::new(id, motion, loop_enabled);
        debug!(
            "entry {:?} started: duration={} loop={}",
            id,
            entry.motion().duration(),
            entry.loop_enabled()
        );
        self.entries.push(entry);
        id
    }

    /// Register the event listener, replacing any previous one.
    pub fn set_event_listener<L: MotionEventListener + 'static>(&mut self, listener: L) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_event_listener(&mut self) {
        self.listener = None;
    }

    /// Advance every live entry by `elapsed` seconds.
    pub fn update(&mut self, store: &mut dyn ParameterStore, elapsed: f32) -> Result<&Outputs> {
        check_elapsed(elapsed)?;
        self.outputs.clear();
        self.scratch.begin_frame();

        for entry in self.entries.iter_mut() {
            let advanced = entry.update(store, &mut self.scratch, elapsed)?;
            if advanced {
                let id = entry.id();
                for value in self.scratch.fired.drain(..) {
                    self.outputs.push_event(MotionEvent::UserData { entry: id, value });
                }
            }
            if entry.is_finished() {
                self.outputs
                    .push_event(MotionEvent::Finished { entry: entry.id() });
            }
        }

        if let Some(mut listener) = self.listener.take() {
            for event in &self.outputs.events {
                if let MotionEvent::UserData { value, .. } = event {
                    listener.on_event(self, value);
                }
            }
            self.listener = Some(listener);
        }

        let before = self.entries.len();
        self.entries.retain(|e| !e.is_finished());
        if self.entries.len() != before {
            debug!(
                "dropped {} finished entries, {} live",
                before - self.entries.len(),
                self.entries.len()
            );
        }
        Ok(&self.outputs)
    }

    /// Terminate every unfinished entry matching `predicate`.
    ///
    /// Entries already fading out at least as fast as requested are left alone
    /// (and are not offered to the predicate).
    pub fn terminate_motions<P>(&mut self, mut predicate: P, fade_out_seconds: f32) -> Result<()>
    where
        P: FnMut(&MotionQueueEntry) -> bool,
    {
        if fade_out_seconds.is_nan() {
            return Err(MotionError::InvalidFadeSeconds {
                seconds: fade_out_seconds,
            });
        }
        for entry in self.entries.iter_mut() {
            if entry.is_finished() {
                continue;
            }
            if entry.state() == PlaybackState::Terminated
                && entry.terminating_remaining() <= fade_out_seconds
            {
                continue;
            }
            if predicate(entry) {
                entry.terminate(fade_out_seconds)?;
            }
        }
        Ok(())
    }

    pub fn terminate_all_motions(&mut self, fade_out_seconds: f32) -> Result<()> {
        self.terminate_motions(|_| true, fade_out_seconds)
    }

    /// True when no entry is live. Finished entries are dropped at the end of
    /// every update, so this is the same as "everything finished".
    #[inline]
    pub fn all_finished(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live entries in start order.
    pub fn entries(&self) -> impl Iterator<Item = &MotionQueueEntry> {
        self.entries.iter()
    }

    pub fn entry(&self, id: EntryId) -> Option<&MotionQueueEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut MotionQueueEntry> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    /// Outputs of the last update.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Apply a batch of entry commands in order, stopping at the first failure.
    pub fn apply_inputs(&mut self, inputs: &Inputs) -> Result<()> {
        for cmd in &inputs.entry_cmds {
            let id = cmd.entry();
            let entry = self
                .entry_mut(id)
                .ok_or(MotionError::UnknownEntry { entry: id })?;
            match *cmd {
                EntryCommand::Pause { paused, .. } => entry.pause(paused),
                EntryCommand::Suspend { suspended, .. } => entry.suspend(suspended),
                EntryCommand::Resume { .. } => entry.resume(),
                EntryCommand::Terminate {
                    fade_out_seconds, ..
                } => entry.terminate(fade_out_seconds)?,
                EntryCommand::SetWeight { weight, .. } => entry.set_weight(weight)?,
                EntryCommand::SetSpeed { speed, .. } => entry.set_speed(speed)?,
                EntryCommand::SetTime { time, .. } => entry.set_time(time)?,
            }
        }
        Ok(())
    }
}
