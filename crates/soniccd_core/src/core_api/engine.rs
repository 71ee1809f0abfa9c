use chrono::Local;

use crate::collection;
use crate::model::{Platform, SaveCollection, SaveSlot, TotalTime};

use super::error::{CoreError, CoreErrorCode};
use super::types::{SessionSnapshot, SlotState, SlotSummary};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

#[derive(Debug, Clone)]
pub struct Session {
    collection: SaveCollection,
    slot_states: Vec<SlotState>,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        hint: Option<Platform>,
    ) -> Result<Session, CoreError> {
        let decoded = collection::decode(bytes.as_ref(), hint)?;
        Ok(Session {
            collection: decoded.collection,
            slot_states: decoded.slot_states,
        })
    }

    /// Like [`Engine::open_bytes`], taking the hint from the file extension.
    pub fn open_named<B: AsRef<[u8]>>(
        &self,
        file_name: &str,
        bytes: B,
    ) -> Result<Session, CoreError> {
        self.open_bytes(bytes, Platform::from_file_name(file_name))
    }

    pub fn new_session(&self, platform: Platform) -> Session {
        Session::from_collection(SaveCollection::new(platform))
    }

    pub fn restore(&self, snapshot: SessionSnapshot) -> Result<Session, CoreError> {
        SaveCollection::from_snapshot(snapshot).map(Session::from_collection)
    }
}

impl Session {
    fn from_collection(collection: SaveCollection) -> Self {
        let slot_states = states_of(&collection);
        Self {
            collection,
            slot_states,
        }
    }

    pub fn platform(&self) -> Platform {
        self.collection.platform()
    }

    pub fn collection(&self) -> &SaveCollection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut SaveCollection {
        &mut self.collection
    }

    pub fn slot_states(&self) -> &[SlotState] {
        &self.slot_states
    }

    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slot_states.get(index).copied()
    }

    pub fn selected(&self) -> usize {
        self.collection.selected()
    }

    pub fn select(&mut self, index: usize) -> Result<(), CoreError> {
        self.collection.select(index)
    }

    pub fn slot(&self, index: usize) -> Result<&SaveSlot, CoreError> {
        self.collection
            .slot(index)
            .ok_or_else(|| invalid_slot(index, self.collection.slots().len()))
    }

    /// Editing a slot marks it present, so it is written on the next encode.
    /// A PC slot without a save time is stamped with the current local time.
    pub fn slot_mut(&mut self, index: usize) -> Result<&mut SaveSlot, CoreError> {
        let count = self.collection.slots().len();
        let stamp = self.platform() == Platform::Pc;
        let slot = self
            .collection
            .slot_mut(index)
            .ok_or_else(|| invalid_slot(index, count))?;
        slot.mark_present(index);
        if stamp && slot.metadata.timestamp.is_none() {
            slot.metadata.timestamp = Some(Local::now().naive_local());
        }
        self.slot_states[index] = SlotState::Present;
        Ok(slot)
    }

    pub fn slot_summaries(&self) -> Vec<SlotSummary> {
        self.collection
            .slots()
            .iter()
            .zip(&self.slot_states)
            .enumerate()
            .map(|(index, (slot, &state))| SlotSummary {
                index,
                state,
                name: slot.metadata.name.clone(),
                is_new: slot.single_player.is_new,
                progress: slot.single_player.stage_name().to_string(),
            })
            .collect()
    }

    pub fn total_time(&self, index: usize) -> Result<TotalTime, CoreError> {
        Ok(self.slot(index)?.time_attack.total_time(self.platform()))
    }

    pub fn file_name(&self) -> &'static str {
        self.collection.file_name()
    }

    pub fn encode(&self, template: &[u8]) -> Result<Vec<u8>, CoreError> {
        collection::encode(&self.collection, template)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.collection.to_snapshot()
    }

    pub fn restore_defaults(&mut self) {
        self.collection.restore_defaults();
        self.slot_states = states_of(&self.collection);
    }

    pub fn convert_to(&mut self, platform: Platform) {
        let collection = std::mem::replace(&mut self.collection, SaveCollection::new(platform));
        self.collection = collection.convert_to(platform);
        self.slot_states = states_of(&self.collection);
    }
}

fn states_of(collection: &SaveCollection) -> Vec<SlotState> {
    collection
        .slots()
        .iter()
        .map(|slot| {
            if slot.is_empty {
                SlotState::Empty
            } else {
                SlotState::Present
            }
        })
        .collect()
}

fn invalid_slot(index: usize, count: usize) -> CoreError {
    CoreError::new(
        CoreErrorCode::InvalidSlot,
        format!("invalid slot {index}, expected 0..{}", count.saturating_sub(1)),
    )
}
