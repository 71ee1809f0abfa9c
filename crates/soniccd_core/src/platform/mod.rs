//! Per-platform slot codecs.
//!
//! Each release stores the same game state with its own offsets and quirks.
//! [`PlatformCodec`] is the fixed set of operations the collection codec
//! drives; the three implementations keep their offset tables private.

pub mod pc;
pub mod retro;
pub mod sega_cd;

use std::io;

use crate::core_api::SlotState;
use crate::layout::PlatformLayout;
use crate::model::{
    GoodFutures, Options, PLACES, Platform, ROUNDS, RankedTime, SaveCollection, SaveSlot,
    TIME_STONE_COUNT, TimeStones,
};

pub use pc::PcCodec;
pub use retro::RetroCodec;
pub use sega_cd::SegaCdCodec;

pub trait PlatformCodec: Sync {
    fn platform(&self) -> Platform;

    fn layout(&self) -> &'static PlatformLayout;

    /// Content validation. A file is only decoded by a codec that accepts it.
    fn detect(&self, file: &[u8]) -> bool;

    /// Whether a defaults template of `len` bytes can receive encoded slots.
    fn accepts_template_len(&self, len: usize) -> bool {
        len == self.layout().file_len
    }

    fn decode_slot(&self, index: usize, bytes: &[u8]) -> io::Result<(SaveSlot, SlotState)>;

    /// Encodes one slot to exactly `layout().slot_len` bytes.
    fn encode_slot(&self, slot: &SaveSlot) -> io::Result<Vec<u8>>;

    /// Reads file-wide data outside the slot ranges and returns the selected
    /// slot index.
    fn decode_shared(
        &self,
        _file: &[u8],
        _slots: &mut [SaveSlot],
        _options: &mut Options,
    ) -> io::Result<usize> {
        Ok(0)
    }

    /// Writes file-wide data after every slot has been overlaid.
    fn encode_shared(&self, _collection: &SaveCollection, _file: &mut [u8]) -> io::Result<()> {
        Ok(())
    }
}

impl Platform {
    pub fn codec(self) -> &'static dyn PlatformCodec {
        match self {
            Platform::SegaCd => &SegaCdCodec,
            Platform::Pc => &PcCodec,
            Platform::Retro => &RetroCodec,
        }
    }

    pub fn layout(&self) -> &'static PlatformLayout {
        self.codec().layout()
    }
}

/// Progress fields shared by the Sega CD and PC layouts, which store one
/// good-futures byte and derive machines and holograms from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StoredProgress {
    pub is_new: bool,
    pub stage_byte: u8,
    pub special_stage_byte: u8,
    pub good_futures: u8,
    pub time_stones: u8,
}

pub(crate) fn decode_stored_progress(slot: &mut SaveSlot, stored: StoredProgress) {
    let time_stones = TimeStones(stored.time_stones);
    let good_futures = GoodFutures(stored.good_futures);

    let player = &mut slot.single_player;
    player.is_new = stored.is_new;
    player.stage = if stored.is_new {
        0
    } else {
        stored.stage_byte.saturating_add(1).min(ROUNDS as u8)
    };
    player.special_stage = decode_special_stage(stored.special_stage_byte, time_stones);
    player.good_futures = good_futures;
    player.machines = good_futures.expand_to_machines();
    player.holograms = good_futures.holograms();
    player.time_stones = time_stones;
}

pub(crate) fn decode_special_stage(raw: u8, time_stones: TimeStones) -> u8 {
    if time_stones.is_complete() {
        0
    } else {
        raw.saturating_add(1).min(TIME_STONE_COUNT as u8)
    }
}

pub(crate) fn encode_special_stage(special_stage: u8, time_stones: TimeStones) -> u8 {
    if time_stones.is_complete() {
        0
    } else {
        special_stage.saturating_sub(1)
    }
}

pub(crate) fn slot_len_error(platform: Platform, expected: usize, actual: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{platform} slot must be {expected} bytes, got {actual}"),
    )
}

pub(crate) fn places_array(places: Vec<RankedTime>) -> io::Result<[RankedTime; PLACES]> {
    places.try_into().map_err(|places: Vec<RankedTime>| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected {PLACES} ranked times, got {}", places.len()),
        )
    })
}
