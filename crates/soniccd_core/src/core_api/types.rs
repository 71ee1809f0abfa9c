use serde::{Deserialize, Serialize};

use crate::model::{Options, Platform, SaveSlot};

/// Outcome of decoding one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    Present,
    Empty,
    ChecksumMismatch,
}

impl SlotState {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Present => "present",
            Self::Empty => "empty",
            Self::ChecksumMismatch => "checksum mismatch",
        }
    }
}

/// Serializable copy of a collection used to resume an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSnapshot {
    pub platform: Platform,
    pub selected: usize,
    pub knuckles_available: bool,
    pub options: Options,
    pub slots: Vec<SaveSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotSummary {
    pub index: usize,
    pub state: SlotState,
    pub name: String,
    pub is_new: bool,
    pub progress: String,
}
