use std::io::{self, Cursor};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::charset::{self, INITIALS_LEN};
use crate::cipher;
use crate::core_api::SlotState;
use crate::layout::PlatformLayout;
use crate::model::{
    DEFAULT_INITIALS, LEVEL_COUNT, MAIN_LEVELS, Options, PLACES, Platform, ROUNDS, RankedTime,
    SaveCollection, SaveSlot,
};
use crate::reader::LittleEndianReader;
use crate::writer::SlotWriter;

use super::{
    PlatformCodec, StoredProgress, decode_stored_progress, encode_special_stage, places_array,
    slot_len_error,
};

pub const LAYOUT: PlatformLayout = PlatformLayout {
    file_len: 4324,
    slot_start: 0x004,
    slot_len: 720,
    slot_count: 6,
};

pub const NAME_LEN: usize = 12;

const SELECTED_OFFSET: usize = 0;
const NEW_GAME_OFFSET: usize = 0x000;
const NAME_OFFSET: usize = 0x004;
const STAGE_OFFSET: usize = 0x010;
const DATETIME_OFFSET: usize = 0x014;
const TIMES_OFFSET: usize = 0x020;
const RECORD_LEN: usize = 8;
const RECORD_INITIALS_OFFSET: usize = 4;
const TOTAL_TIME_OFFSET: usize = 0x2c0;
const TIME_STONES_OFFSET: usize = 0x2c4;
const GOOD_FUTURES_OFFSET: usize = 0x2c5;
const SPECIAL_STAGE_OFFSET: usize = 0x2c6;

const FRAMES_PER_MINUTE: u32 = 60 * 60;

/// Written for slots that were never stamped, so encoding stays repeatable.
/// Any date after 1970 keeps the slot present on the next load.
pub fn fallback_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1993, 9, 23)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PcCodec;

fn record_offset(level: usize, place: usize) -> usize {
    TIMES_OFFSET + (level * PLACES + place) * RECORD_LEN
}

fn frames_to_time(frames: u16) -> (u8, u8, u8) {
    let frames = u32::from(frames);
    let rem = frames % FRAMES_PER_MINUTE;
    (
        (frames / FRAMES_PER_MINUTE) as u8,
        (rem / 60) as u8,
        (frames % 60) as u8,
    )
}

/// Record times are read back from 16 bits, so longer times are clamped.
fn stored_frames(record: &RankedTime, level: usize, place: usize) -> u32 {
    let frames = record.total_frames();
    let max = u32::from(u16::MAX);
    if frames > max {
        tracing::warn!(
            level,
            place,
            %record,
            "pc record time too long, clamping to {max} frames"
        );
        return max;
    }
    frames
}

/// Save time as stored by the game: year, then month, day, hour, minute and
/// second each in the low byte of a 16-bit field.
fn read_timestamp<R: io::Read + io::Seek>(
    r: &mut LittleEndianReader<R>,
) -> io::Result<Option<NaiveDateTime>> {
    let year = r.read_u16_at(DATETIME_OFFSET)?;
    let month = r.read_u8_at(DATETIME_OFFSET + 2)?;
    let day = r.read_u8_at(DATETIME_OFFSET + 4)?;
    let hour = r.read_u8_at(DATETIME_OFFSET + 6)?;
    let minute = r.read_u8_at(DATETIME_OFFSET + 8)?;
    let second = r.read_u8_at(DATETIME_OFFSET + 10)?;

    let timestamp = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .and_then(|date| {
            date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second))
        });
    Ok(timestamp.filter(|t| t.and_utc().timestamp_millis() > 0))
}

fn write_timestamp(w: &mut SlotWriter, timestamp: NaiveDateTime) -> io::Result<()> {
    let year = u16::try_from(timestamp.year()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("save year {} does not fit the PC format", timestamp.year()),
        )
    })?;
    w.put_u16(DATETIME_OFFSET, year, "year")?;
    w.put_u8(DATETIME_OFFSET + 2, timestamp.month() as u8, "month")?;
    w.put_u8(DATETIME_OFFSET + 4, timestamp.day() as u8, "day")?;
    w.put_u8(DATETIME_OFFSET + 6, timestamp.hour() as u8, "hour")?;
    w.put_u8(DATETIME_OFFSET + 8, timestamp.minute() as u8, "minute")?;
    w.put_u8(DATETIME_OFFSET + 10, timestamp.second() as u8, "second")
}

impl PlatformCodec for PcCodec {
    fn platform(&self) -> Platform {
        Platform::Pc
    }

    fn layout(&self) -> &'static PlatformLayout {
        &LAYOUT
    }

    fn detect(&self, file: &[u8]) -> bool {
        file.len() == LAYOUT.file_len
            && usize::from(file[SELECTED_OFFSET]) < LAYOUT.slot_count
            && file[1..4].iter().all(|&b| b == 0)
    }

    fn decode_slot(&self, index: usize, bytes: &[u8]) -> io::Result<(SaveSlot, SlotState)> {
        if bytes.len() != LAYOUT.slot_len {
            return Err(slot_len_error(Platform::Pc, LAYOUT.slot_len, bytes.len()));
        }
        let mut plain = bytes.to_vec();
        cipher::apply(&mut plain);
        let mut r = LittleEndianReader::new(Cursor::new(plain.as_slice()));

        let Some(timestamp) = read_timestamp(&mut r)? else {
            tracing::debug!(index, "pc slot has no valid save time");
            return Ok((SaveSlot::empty(index), SlotState::Empty));
        };

        if !cipher::verify_checksum(&plain) {
            tracing::warn!(
                index,
                stored = ?cipher::stored_checksum(&plain),
                calculated = cipher::calculate_checksum(&plain),
                "pc slot checksum mismatch, treating slot as empty"
            );
            return Ok((SaveSlot::empty(index), SlotState::ChecksumMismatch));
        }

        let mut slot = SaveSlot::new(index);
        slot.metadata.name = charset::decode_ascii_field(&r.read_bytes_at(NAME_OFFSET, NAME_LEN)?);
        slot.metadata.timestamp = Some(timestamp);

        let stage_byte = r.read_u8_at(STAGE_OFFSET)?;
        decode_stored_progress(
            &mut slot,
            StoredProgress {
                is_new: r.read_u8_at(NEW_GAME_OFFSET)? == 0,
                stage_byte,
                special_stage_byte: r.read_u8_at(SPECIAL_STAGE_OFFSET)?,
                good_futures: r.read_u8_at(GOOD_FUTURES_OFFSET)?,
                time_stones: r.read_u8_at(TIME_STONES_OFFSET)?,
            },
        );

        let mut records = Vec::with_capacity(LEVEL_COUNT);
        for level in 0..LEVEL_COUNT {
            let mut places = Vec::with_capacity(PLACES);
            for place in 0..PLACES {
                let pos = record_offset(level, place);
                let (min, sec, tick) = frames_to_time(r.read_u16_at(pos)?);
                let initials =
                    r.read_bytes_at(pos + RECORD_INITIALS_OFFSET, INITIALS_LEN)?;
                places.push(RankedTime::new(
                    min,
                    sec,
                    tick,
                    charset::decode_ascii_field(&initials),
                ));
            }
            records.push(places_array(places)?);
        }

        slot.time_attack.records = records;
        slot.time_attack.level = stage_byte;
        slot.time_attack.initials = DEFAULT_INITIALS.to_string();

        Ok((slot, SlotState::Present))
    }

    fn encode_slot(&self, slot: &SaveSlot) -> io::Result<Vec<u8>> {
        let mut w = SlotWriter::zeroed(LAYOUT.slot_len);
        let player = &slot.single_player;

        w.put_bytes(
            NAME_OFFSET,
            &charset::encode_ascii_name(&slot.metadata.name, NAME_LEN),
            "name",
        )?;
        let timestamp = slot
            .metadata
            .timestamp
            .unwrap_or_else(fallback_timestamp);
        write_timestamp(&mut w, timestamp)?;

        let stage = if player.is_new {
            0
        } else if player.stage >= ROUNDS as u8 && slot.time_attack.level >= ROUNDS as u8 {
            // Metallic Madness cleared and unlocked in time attack
            ROUNDS as u8
        } else {
            player.stage.saturating_sub(1)
        };
        w.put_u8(STAGE_OFFSET, stage, "stage")?;
        w.put_u8(
            SPECIAL_STAGE_OFFSET,
            encode_special_stage(player.special_stage, player.time_stones),
            "special stage",
        )?;
        w.put_u8(NEW_GAME_OFFSET, u8::from(!player.is_new), "new game")?;
        w.put_u8(GOOD_FUTURES_OFFSET, player.good_futures.0, "good futures")?;
        w.put_u8(TIME_STONES_OFFSET, player.time_stones.0, "time stones")?;

        let mut total_time = 0u32;
        for (level, places) in slot.time_attack.records.iter().take(LEVEL_COUNT).enumerate() {
            for (place, record) in places.iter().enumerate() {
                let pos = record_offset(level, place);
                let frames = stored_frames(record, level, place);
                w.put_u24(pos, frames, "time")?;
                w.put_bytes(
                    pos + RECORD_INITIALS_OFFSET,
                    &charset::encode_ascii_initials(&record.initials, INITIALS_LEN),
                    "initials",
                )?;
                if place == 0 && level < MAIN_LEVELS {
                    total_time += frames;
                }
            }
        }
        w.put_u24(TOTAL_TIME_OFFSET, total_time, "total time")?;

        let mut bytes = w.into_bytes();
        cipher::write_checksum(&mut bytes);
        cipher::apply(&mut bytes);
        Ok(bytes)
    }

    fn decode_shared(
        &self,
        file: &[u8],
        _slots: &mut [SaveSlot],
        _options: &mut Options,
    ) -> io::Result<usize> {
        let selected = file.get(SELECTED_OFFSET).copied().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "pc file has no selection byte")
        })?;
        Ok(usize::from(selected))
    }

    fn encode_shared(&self, collection: &SaveCollection, file: &mut [u8]) -> io::Result<()> {
        let selected = u8::try_from(collection.selected()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("selected slot {} does not fit a byte", collection.selected()),
            )
        })?;
        let byte = file.get_mut(SELECTED_OFFSET).ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "pc file has no selection byte")
        })?;
        *byte = selected;
        Ok(())
    }
}
