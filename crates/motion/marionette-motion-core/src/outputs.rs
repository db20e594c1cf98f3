//! Output contracts from a motion manager tick.
//!
//! Parameter writes go straight into the store; outputs only carry the
//! discrete events of the tick so adapters can transport them.

use serde::{Deserialize, Serialize};

use crate::ids::EntryId;

/// Discrete signals emitted during one manager update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionEvent {
    /// A user-data event of the entry's clip was crossed this tick.
    UserData { entry: EntryId, value: String },
    /// The entry reached Finished and was dropped at the end of the tick.
    Finished { entry: EntryId },
}

/// Outputs returned by `MotionManager::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<MotionEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: MotionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Payloads of the user-data events, in firing order.
    pub fn user_data(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            MotionEvent::UserData { value, .. } => Some(value.as_str()),
            _ => None,
        })
    }

    /// Entries that finished this tick.
    pub fn finished(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.events.iter().filter_map(|e| match e {
            MotionEvent::Finished { entry } => Some(*entry),
            _ => None,
        })
    }
}
