//! Input contracts for a motion manager.
//!
//! Adapters that cannot hold `&mut MotionQueueEntry` borrows across frames
//! batch their playback control as commands and hand them to
//! `MotionManager::apply_inputs()` before the next update.

use serde::{Deserialize, Serialize};

use crate::ids::EntryId;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Entry-level commands, applied in order.
    #[serde(default)]
    pub entry_cmds: Vec<EntryCommand>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum EntryCommand {
    Pause {
        entry: EntryId,
        paused: bool,
    },
    Suspend {
        entry: EntryId,
        suspended: bool,
    },
    Resume {
        entry: EntryId,
    },
    Terminate {
        entry: EntryId,
        fade_out_seconds: f32,
    },
    SetWeight {
        entry: EntryId,
        weight: f32,
    },
    SetSpeed {
        entry: EntryId,
        speed: f32,
    },
    SetTime {
        entry: EntryId,
        time: f32,
    },
}

impl EntryCommand {
    /// The entry the command targets.
    pub fn entry(&self) -> EntryId {
        match self {
            EntryCommand::Pause { entry, .. }
            | EntryCommand::Suspend { entry, .. }
            | EntryCommand::Resume { entry }
            | EntryCommand::Terminate { entry, .. }
            | EntryCommand::SetWeight { entry, .. }
            | EntryCommand::SetSpeed { entry, .. }
            | EntryCommand::SetTime { entry, .. } => *entry,
        }
    }
}
