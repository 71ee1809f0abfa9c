use std::io::{self, Cursor};

use crate::core_api::SlotState;
use crate::layout::PlatformLayout;
use crate::model::{
    Character, DEFAULT_INITIALS, DEFAULT_PLACE_INITIALS, DEFAULT_RECORD_MINUTES,
    DESKTOP_MAX_VOLUME, GoodFutures, LEVEL_COUNT, MAIN_LEVELS, Machines, Options, PLACES,
    Platform, ROUNDS, RankedTime, SaveCollection, SaveSlot, TIME_STONE_COUNT, TimeAttack,
    TimeStones, ZONES,
};
use crate::reader::LittleEndianReader;
use crate::tick;
use crate::writer::SlotWriter;

use super::{
    PlatformCodec, decode_special_stage, encode_special_stage, places_array, slot_len_error,
};

pub const LAYOUT: PlatformLayout = PlatformLayout {
    file_len: 32768,
    slot_start: 0x000,
    slot_len: 32,
    slot_count: 4,
};

/// Acts per round in the packed stage byte.
pub const ACTS: u8 = 10;
/// Added to the packed stage byte while the player is in a special stage.
pub const IN_SPECIAL_STAGE: u8 = 0x50;
/// Mobile builds store volumes scaled by this factor.
pub const MOBILE_VOLUME_SCALE: u8 = 10;

const CHARACTER_OFFSET: usize = 0x000;
const LIVES_OFFSET: usize = 0x004;
const SCORE_OFFSET: usize = 0x008;
const STAGE_OFFSET: usize = 0x00c;
const TIME_STONES_OFFSET: usize = 0x010;
const SPECIAL_STAGE_OFFSET: usize = 0x014;
const NEXT_EXTRA_LIFE_OFFSET: usize = 0x018;
const MACHINES_OFFSET: usize = 0x01c;
const HOLOGRAMS_OFFSET: usize = 0x01e;

const MUSIC_VOLUME_OFFSET: usize = 0x084;
const SOUND_VOLUME_OFFSET: usize = 0x088;
const SPIN_DASH_OFFSET: usize = 0x08c;
const TAILS_OFFSET: usize = 0x090;
const FILTER_OFFSET: usize = 0x094;
const SOUNDTRACK_OFFSET: usize = 0x098;
const COMPLETED_OFFSET: usize = 0x09c;

const TIMES_OFFSET: usize = 0x0c0;
const RECORD_STRIDE: usize = 8;
/// Special stage records sit between the main-level records, shifted by
/// this much, with nine places per stage of which the game reads three.
const SPECIAL_RECORD_SHIFT: usize = 4;
const SPECIAL_PLACES: usize = 9;

const CENTIS_PER_MINUTE: u32 = 60 * 100;

#[derive(Debug, Default, Clone, Copy)]
pub struct RetroCodec;

/// File offset of one stored time; `level` counts the 21 main levels first,
/// then the special stages.
fn record_offset(level: usize, place: usize) -> usize {
    if level < MAIN_LEVELS {
        TIMES_OFFSET + (level * PLACES + place) * RECORD_STRIDE
    } else {
        let stage = level - MAIN_LEVELS;
        TIMES_OFFSET
            + stage * ZONES * PLACES * RECORD_STRIDE
            + SPECIAL_RECORD_SHIFT
            + place * RECORD_STRIDE
    }
}

fn centis_to_time(centis: u16) -> RankedTime {
    let centis = u32::from(centis);
    let rem = centis % CENTIS_PER_MINUTE;
    let hundredths = (centis % 100) as u8;
    let frame = tick::centis_to_frames(hundredths).unwrap_or_else(|| {
        let frame = tick::nearest_frame(hundredths);
        tracing::warn!(
            centis = hundredths,
            frame,
            "retro time has no exact frame, rounding down"
        );
        frame
    });
    RankedTime::new(
        (centis / CENTIS_PER_MINUTE) as u8,
        (rem / 100) as u8,
        frame,
        DEFAULT_PLACE_INITIALS,
    )
}

fn time_to_centis(record: &RankedTime) -> u16 {
    record.total_centis().min(u32::from(u16::MAX)) as u16
}

/// Unpacks the stage byte into `(stage, act, in_special_stage)`.
fn decode_stage(raw: u8) -> (u8, u8, bool) {
    if raw == 0 {
        return (0, 0, false);
    }
    let in_special = raw > IN_SPECIAL_STAGE;
    let packed = if in_special { raw - IN_SPECIAL_STAGE } else { raw };
    let stage = (packed - 1) / ACTS + 1;
    let act = (packed - 1) % ACTS + 1;
    (stage.min(ROUNDS as u8), act, in_special)
}

fn encode_stage(stage: u8, act: u8, in_special: bool) -> u8 {
    let mut packed = u16::from(stage.saturating_sub(1)) * u16::from(ACTS) + u16::from(act);
    if in_special {
        packed += u16::from(IN_SPECIAL_STAGE);
    }
    packed.clamp(1, u16::from(u8::MAX)) as u8
}

fn decode_time_attack(file: &[u8]) -> io::Result<Option<TimeAttack>> {
    let mut r = LittleEndianReader::new(Cursor::new(file));
    let mut records = Vec::with_capacity(LEVEL_COUNT);
    let mut all_zero = true;

    for level in 0..LEVEL_COUNT {
        let mut places = Vec::with_capacity(PLACES);
        for place in 0..PLACES {
            let centis = r.read_u16_at(record_offset(level, place))?;
            all_zero &= centis == 0;
            places.push(centis_to_time(centis));
        }
        records.push(places_array(places)?);
    }

    if all_zero {
        return Ok(None);
    }
    Ok(Some(TimeAttack {
        records,
        level: r.read_u8_at(COMPLETED_OFFSET)?,
        initials: DEFAULT_INITIALS.to_string(),
    }))
}

fn encode_time_attack(time_attack: &TimeAttack, w: &mut SlotWriter) -> io::Result<()> {
    for (level, places) in time_attack.records.iter().take(LEVEL_COUNT).enumerate() {
        for (place, record) in places.iter().enumerate() {
            w.put_u16(record_offset(level, place), time_to_centis(record), "time")?;
        }
        if level >= MAIN_LEVELS {
            for place in PLACES..SPECIAL_PLACES {
                let unused = u16::from(DEFAULT_RECORD_MINUTES) * CENTIS_PER_MINUTE as u16;
                w.put_u16(record_offset(level, place), unused, "unused time")?;
            }
        }
    }
    w.put_u8(COMPLETED_OFFSET, time_attack.level, "completed levels")
}

fn decode_options<R: io::Read + io::Seek>(r: &mut LittleEndianReader<R>) -> io::Result<Options> {
    let mut music_volume = r.read_u8_at(MUSIC_VOLUME_OFFSET)?;
    let mut sound_volume = r.read_u8_at(SOUND_VOLUME_OFFSET)?;

    // both volumes muted reads as desktop
    let mobile = music_volume > DESKTOP_MAX_VOLUME || sound_volume > DESKTOP_MAX_VOLUME;
    if mobile {
        music_volume /= MOBILE_VOLUME_SCALE;
        sound_volume /= MOBILE_VOLUME_SCALE;
    }

    Ok(Options {
        mobile,
        soundtrack: r.read_u8_at(SOUNDTRACK_OFFSET)?,
        music_volume,
        sound_volume,
        spin_dash: r.read_u8_at(SPIN_DASH_OFFSET)? != 0,
        video_filter: r.read_u8_at(FILTER_OFFSET)?,
        unlock_tails: r.read_u8_at(TAILS_OFFSET)? != 0,
    })
}

fn encode_options(options: &Options, w: &mut SlotWriter) -> io::Result<()> {
    let scale = if options.mobile { MOBILE_VOLUME_SCALE } else { 1 };
    w.put_u8(
        MUSIC_VOLUME_OFFSET,
        options.music_volume.saturating_mul(scale),
        "music volume",
    )?;
    w.put_u8(
        SOUND_VOLUME_OFFSET,
        options.sound_volume.saturating_mul(scale),
        "sound volume",
    )?;
    w.put_u8(SPIN_DASH_OFFSET, u8::from(options.spin_dash), "spin dash")?;
    w.put_u8(TAILS_OFFSET, u8::from(options.unlock_tails), "tails")?;
    w.put_u8(FILTER_OFFSET, options.video_filter, "video filter")?;
    w.put_u8(SOUNDTRACK_OFFSET, options.soundtrack, "soundtrack")
}

impl PlatformCodec for RetroCodec {
    fn platform(&self) -> Platform {
        Platform::Retro
    }

    fn layout(&self) -> &'static PlatformLayout {
        &LAYOUT
    }

    /// The remaster's save has no signature; size is all there is to check.
    fn detect(&self, file: &[u8]) -> bool {
        file.len() == LAYOUT.file_len
    }

    fn decode_slot(&self, index: usize, bytes: &[u8]) -> io::Result<(SaveSlot, SlotState)> {
        if bytes.len() != LAYOUT.slot_len {
            return Err(slot_len_error(Platform::Retro, LAYOUT.slot_len, bytes.len()));
        }
        let mut r = LittleEndianReader::new(Cursor::new(bytes));

        let raw_stage = r.read_u8_at(STAGE_OFFSET)?;
        let (stage, act, in_special_stage) = decode_stage(raw_stage);
        let time_stones = TimeStones(r.read_u8_at(TIME_STONES_OFFSET)?);
        let machines = Machines(r.read_u16_at(MACHINES_OFFSET)?);

        let mut slot = SaveSlot::new(index);
        let player = &mut slot.single_player;
        player.is_new = raw_stage == 0;
        player.character = Character::from_raw(r.read_u8_at(CHARACTER_OFFSET)?);
        player.lives = r.read_u8_at(LIVES_OFFSET)?;
        player.score = r.read_u32_at(SCORE_OFFSET)?;
        player.stage = stage;
        player.act = act;
        player.in_special_stage = in_special_stage;
        player.special_stage =
            decode_special_stage(r.read_u8_at(SPECIAL_STAGE_OFFSET)?, time_stones);
        player.good_futures = GoodFutures::from_machines(machines);
        player.machines = machines;
        player.holograms = r.read_u8_at(HOLOGRAMS_OFFSET)?;
        player.time_stones = time_stones;

        tracing::debug!(index, raw_stage, "decoded retro slot");
        Ok((slot, SlotState::Present))
    }

    fn encode_slot(&self, slot: &SaveSlot) -> io::Result<Vec<u8>> {
        let mut w = SlotWriter::zeroed(LAYOUT.slot_len);
        let player = &slot.single_player;

        w.put_u8(CHARACTER_OFFSET, player.character.raw(), "character")?;
        w.put_u8(LIVES_OFFSET, player.lives, "lives")?;
        w.put_u8(HOLOGRAMS_OFFSET, player.holograms, "holograms")?;
        w.put_u8(
            SPECIAL_STAGE_OFFSET,
            encode_special_stage(player.special_stage, player.time_stones),
            "special stage",
        )?;
        w.put_u8(TIME_STONES_OFFSET, player.time_stones.0, "time stones")?;

        let stage = if player.is_new {
            0
        } else {
            encode_stage(player.stage, player.act, player.in_special_stage)
        };
        w.put_u8(STAGE_OFFSET, stage, "stage")?;
        w.put_u16(MACHINES_OFFSET, player.machines.0, "machines")?;
        w.put_u32(SCORE_OFFSET, player.score, "score")?;

        // the game grants a life for every threshold between this and the score
        if !player.is_new {
            w.put_u32(NEXT_EXTRA_LIFE_OFFSET, player.next_extra_life(), "next extra life")?;
        }

        Ok(w.into_bytes())
    }

    fn decode_shared(
        &self,
        file: &[u8],
        slots: &mut [SaveSlot],
        options: &mut Options,
    ) -> io::Result<usize> {
        if let Some(first) = slots.first_mut() {
            match decode_time_attack(file)? {
                Some(time_attack) => first.time_attack = time_attack,
                None => tracing::debug!("retro time attack section is blank, keeping defaults"),
            }
        }
        let mut r = LittleEndianReader::new(Cursor::new(file));
        *options = decode_options(&mut r)?;
        Ok(0)
    }

    fn encode_shared(&self, collection: &SaveCollection, file: &mut [u8]) -> io::Result<()> {
        let mut w = SlotWriter::from_bytes(file.to_vec());
        if let Some(first) = collection.slots().first().filter(|slot| !slot.is_empty) {
            encode_time_attack(&first.time_attack, &mut w)?;
        }
        encode_options(&collection.options, &mut w)?;
        file.copy_from_slice(w.as_slice());
        Ok(())
    }
}
