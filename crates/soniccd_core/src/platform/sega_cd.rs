use std::io::{self, Cursor};

use crate::charset::{self, INITIALS_LEN};
use crate::core_api::SlotState;
use crate::layout::PlatformLayout;
use crate::model::{LEVEL_COUNT, PLACES, Platform, RankedTime, SaveSlot, ZONES};
use crate::reader::LittleEndianReader;
use crate::writer::SlotWriter;

use super::{
    PlatformCodec, StoredProgress, decode_stored_progress, encode_special_stage, places_array,
    slot_len_error,
};

/// Trailing signature of a formatted backup RAM cartridge image.
pub const IDENTIFIER: &[u8; 32] = b"SEGA_CD_ROM\x00\x01\x00\x00\x00RAM_CARTRIDGE___";

pub const LAYOUT: PlatformLayout = PlatformLayout {
    file_len: 8192,
    slot_start: 0x040,
    slot_len: 704,
    slot_count: 1,
};

const TIMES_OFFSET: usize = 0x000;
const RECORD_LEN: usize = 4;
const INITIALS_OFFSET: usize = 0x150;
const DEFAULT_INITIALS_OFFSET: usize = 0x2a0;
const STAGE_OFFSET: usize = 0x2a4;
const COMPLETED_OFFSET: usize = 0x2a5;
const GOOD_FUTURES_OFFSET: usize = 0x2a7;
const NEW_GAME_OFFSET: usize = 0x2a8;
const SPECIAL_STAGE_OFFSET: usize = 0x2ac;
const TIME_STONES_OFFSET: usize = 0x2ad;

const NEW_GAME: u8 = 0x10;
const CONTINUE: u8 = 0x70;

#[derive(Debug, Default, Clone, Copy)]
pub struct SegaCdCodec;

fn record_offset(level: usize, place: usize) -> usize {
    TIMES_OFFSET + (level * PLACES + place) * RECORD_LEN
}

impl PlatformCodec for SegaCdCodec {
    fn platform(&self) -> Platform {
        Platform::SegaCd
    }

    fn layout(&self) -> &'static PlatformLayout {
        &LAYOUT
    }

    fn detect(&self, file: &[u8]) -> bool {
        self.accepts_template_len(file.len()) && file.ends_with(IDENTIFIER)
    }

    /// Cartridge images may span several 8 KiB banks.
    fn accepts_template_len(&self, len: usize) -> bool {
        len > 0 && len % LAYOUT.file_len == 0
    }

    fn decode_slot(&self, index: usize, bytes: &[u8]) -> io::Result<(SaveSlot, SlotState)> {
        if bytes.len() != LAYOUT.slot_len {
            return Err(slot_len_error(Platform::SegaCd, LAYOUT.slot_len, bytes.len()));
        }
        let mut r = LittleEndianReader::new(Cursor::new(bytes));

        let mut records = Vec::with_capacity(LEVEL_COUNT);
        let mut sum = 0u32;
        for level in 0..LEVEL_COUNT {
            let mut places = Vec::with_capacity(PLACES);
            for place in 0..PLACES {
                let pos = record_offset(level, place);
                let time = r.read_bytes_at(pos + 1, 3)?;
                let initials = r.read_bytes_at(pos + INITIALS_OFFSET, INITIALS_LEN)?;
                sum += time.iter().map(|&b| u32::from(b)).sum::<u32>();
                places.push(RankedTime::new(
                    time[0],
                    time[1],
                    time[2],
                    charset::decode_alphabet(&initials),
                ));
            }
            records.push(places_array(places)?);
        }

        if sum == 0 {
            tracing::debug!(index, "sega cd slot has no recorded times");
            let mut slot = SaveSlot::empty(index);
            slot.time_attack.records = records;
            return Ok((slot, SlotState::Empty));
        }

        let mut slot = SaveSlot::new(index);
        decode_stored_progress(
            &mut slot,
            StoredProgress {
                is_new: r.read_u8_at(NEW_GAME_OFFSET)? == NEW_GAME,
                stage_byte: r.read_u8_at(STAGE_OFFSET)?,
                special_stage_byte: r.read_u8_at(SPECIAL_STAGE_OFFSET)?,
                good_futures: r.read_u8_at(GOOD_FUTURES_OFFSET)?,
                time_stones: r.read_u8_at(TIME_STONES_OFFSET)?,
            },
        );

        slot.time_attack.records = records;
        slot.time_attack.level = r.read_u8_at(COMPLETED_OFFSET)? / ZONES as u8;
        slot.time_attack.initials =
            charset::decode_alphabet(&r.read_bytes_at(DEFAULT_INITIALS_OFFSET, INITIALS_LEN)?);

        Ok((slot, SlotState::Present))
    }

    fn encode_slot(&self, slot: &SaveSlot) -> io::Result<Vec<u8>> {
        let mut w = SlotWriter::zeroed(LAYOUT.slot_len);
        let player = &slot.single_player;

        let new_game = if player.is_new { NEW_GAME } else { CONTINUE };
        w.put_u8(NEW_GAME_OFFSET, new_game, "new game")?;
        w.put_u8(GOOD_FUTURES_OFFSET, player.good_futures.0, "good futures")?;
        w.put_u8(TIME_STONES_OFFSET, player.time_stones.0, "time stones")?;

        let stage = if player.is_new {
            0
        } else {
            player.stage.saturating_sub(1)
        };
        w.put_u8(STAGE_OFFSET, stage, "stage")?;
        w.put_u8(
            SPECIAL_STAGE_OFFSET,
            encode_special_stage(player.special_stage, player.time_stones),
            "special stage",
        )?;

        // All-zero times would load back as an empty slot.
        let blank = slot.time_attack.has_no_times();
        if blank {
            tracing::debug!("sega cd slot has no recorded times, writing default records");
        }
        let placeholder = RankedTime::placeholder();
        for (level, places) in slot.time_attack.records.iter().take(LEVEL_COUNT).enumerate() {
            for (place, record) in places.iter().enumerate() {
                let record = if blank { &placeholder } else { record };
                let pos = record_offset(level, place);
                w.put_bytes(pos + 1, &[record.min, record.sec, record.tick], "time")?;
                w.put_bytes(
                    pos + INITIALS_OFFSET,
                    &charset::encode_alphabet(&record.initials, INITIALS_LEN),
                    "initials",
                )?;
            }
        }

        w.put_bytes(
            DEFAULT_INITIALS_OFFSET,
            &charset::encode_alphabet(&slot.time_attack.initials, INITIALS_LEN),
            "default initials",
        )?;
        w.put_u8(
            COMPLETED_OFFSET,
            slot.time_attack.level.saturating_mul(ZONES as u8),
            "completed levels",
        )?;

        Ok(w.into_bytes())
    }
}
