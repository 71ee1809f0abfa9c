use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode, SessionSnapshot};
use crate::tick;

pub const ROUNDS: usize = 7;
pub const ZONES: usize = 3;
pub const MAIN_LEVELS: usize = ROUNDS * ZONES;
pub const TIME_STONE_COUNT: usize = 7;
/// 21 main levels followed by the 7 special stages.
pub const LEVEL_COUNT: usize = MAIN_LEVELS + TIME_STONE_COUNT;
pub const PLACES: usize = 3;

pub const DEFAULT_LIVES: u8 = 3;
pub const DEFAULT_INITIALS: &str = "YOU";
pub const DEFAULT_PLACE_INITIALS: &str = "AAA";
pub const DEFAULT_RECORD_MINUTES: u8 = 5;
pub const EXTRA_LIFE_INTERVAL: u32 = 50_000;

pub const DESKTOP_MAX_VOLUME: u8 = 9;
pub const MOBILE_MAX_VOLUME: u8 = 10;

pub const STAGE_NAMES: [&str; ROUNDS] = [
    "Palmtree Panic",
    "Collision Chaos",
    "Tidal Tempest",
    "Quartz Quadrant",
    "Wacky Workbench",
    "Stardust Speedway",
    "Metallic Madness",
];

const ZONE_NUMERALS: [&str; ZONES] = ["I", "II", "III"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    SegaCd,
    Pc,
    Retro,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::SegaCd, Platform::Pc, Platform::Retro];

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::SegaCd => "Sega CD",
            Self::Pc => "PC",
            Self::Retro => "Retro",
        }
    }

    /// Platform suggested by a file extension. Content is still validated.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "brm" | "crm" => Some(Self::SegaCd),
            "dat" => Some(Self::Pc),
            "bin" => Some(Self::Retro),
            _ => None,
        }
    }

    /// Name the game itself uses for this platform's save file.
    pub fn file_name(&self, mobile: bool) -> &'static str {
        match *self {
            Self::SegaCd => "soniccd.brm",
            Self::Pc => "s_score.dat",
            Self::Retro if mobile => "sgame.bin",
            Self::Retro => "sdata.bin",
        }
    }

    pub fn slot_count(&self) -> usize {
        self.layout().slot_count
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Character {
    Sonic,
    Tails,
    Knuckles,
    Unknown(u8),
}

impl Character {
    pub const SONIC_RAW: u8 = 0;
    pub const TAILS_RAW: u8 = 1;
    pub const KNUCKLES_RAW: u8 = 2;

    pub fn from_raw(raw: u8) -> Self {
        match raw {
            Self::SONIC_RAW => Self::Sonic,
            Self::TAILS_RAW => Self::Tails,
            Self::KNUCKLES_RAW => Self::Knuckles,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u8 {
        match *self {
            Self::Sonic => Self::SONIC_RAW,
            Self::Tails => Self::TAILS_RAW,
            Self::Knuckles => Self::KNUCKLES_RAW,
            Self::Unknown(other) => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Sonic => "Sonic",
            Self::Tails => "Tails",
            Self::Knuckles => "Knuckles",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "Unknown ({})", v),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// One bit per round, bit `r` set when round `r` ends in a good future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoodFutures(pub u8);

impl GoodFutures {
    pub const ALL: Self = Self(0x7f);

    pub fn is_good(self, round: usize) -> bool {
        round < ROUNDS && self.0 & (1 << round) != 0
    }

    pub fn set(&mut self, round: usize, good: bool) {
        if round >= ROUNDS {
            return;
        }
        if good {
            self.0 |= 1 << round;
        } else {
            self.0 &= !(1 << round);
        }
    }

    pub fn is_complete(self) -> bool {
        self.0 & Self::ALL.0 == Self::ALL.0
    }

    /// A round is good when either of its two machines is destroyed.
    pub fn from_machines(machines: Machines) -> Self {
        let mut out = Self::default();
        for round in 0..ROUNDS {
            out.set(round, machines.is_round_destroyed(round));
        }
        out
    }

    /// Both machines of every good round count as destroyed.
    pub fn expand_to_machines(self) -> Machines {
        let mut machines = Machines::default();
        for round in 0..ROUNDS {
            if self.is_good(round) {
                machines.set_round(round, true);
            }
        }
        machines
    }

    /// Two holograms per good round. Metallic Madness has none.
    pub fn holograms(self) -> u8 {
        (0..ROUNDS - 1).filter(|&round| self.is_good(round)).count() as u8 * 2
    }
}

/// Two bits per round (one per machine), 14 bits in all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Machines(pub u16);

impl Machines {
    pub const ALL: Self = Self(0x3fff);

    pub fn is_destroyed(self, round: usize, machine: usize) -> bool {
        round < ROUNDS && machine < 2 && self.0 & (1 << (round * 2 + machine)) != 0
    }

    pub fn is_round_destroyed(self, round: usize) -> bool {
        self.is_destroyed(round, 0) || self.is_destroyed(round, 1)
    }

    pub fn set(&mut self, round: usize, machine: usize, destroyed: bool) {
        if round >= ROUNDS || machine >= 2 {
            return;
        }
        let bit = 1 << (round * 2 + machine);
        if destroyed {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn set_round(&mut self, round: usize, destroyed: bool) {
        self.set(round, 0, destroyed);
        self.set(round, 1, destroyed);
    }

    pub fn is_all_destroyed(self) -> bool {
        self.0 & Self::ALL.0 == Self::ALL.0
    }
}

/// One bit per time stone; `0x7f` means all seven are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeStones(pub u8);

impl TimeStones {
    pub const ALL: Self = Self(0x7f);

    pub fn has(self, stone: usize) -> bool {
        stone < TIME_STONE_COUNT && self.0 & (1 << stone) != 0
    }

    pub fn set(&mut self, stone: usize, collected: bool) {
        if stone >= TIME_STONE_COUNT {
            return;
        }
        if collected {
            self.0 |= 1 << stone;
        } else {
            self.0 &= !(1 << stone);
        }
    }

    pub fn is_complete(self) -> bool {
        self == Self::ALL
    }

    pub fn count(self) -> usize {
        (0..TIME_STONE_COUNT).filter(|&stone| self.has(stone)).count()
    }

    /// 1-based special stage of the first stone still missing.
    pub fn first_missing_stage(self) -> Option<u8> {
        (0..TIME_STONE_COUNT)
            .find(|&stone| !self.has(stone))
            .map(|stone| stone as u8 + 1)
    }
}

/// A recorded time. `tick` is a 1/60 s frame index in `0..60`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTime {
    pub min: u8,
    pub sec: u8,
    pub tick: u8,
    pub initials: String,
}

impl RankedTime {
    pub fn new(min: u8, sec: u8, tick: u8, initials: impl Into<String>) -> Self {
        Self {
            min,
            sec,
            tick,
            initials: initials.into(),
        }
    }

    pub fn placeholder() -> Self {
        Self::new(DEFAULT_RECORD_MINUTES, 0, 0, DEFAULT_PLACE_INITIALS)
    }

    pub fn centis(&self) -> u8 {
        tick::frames_to_centis(self.tick)
    }

    pub fn total_frames(&self) -> u32 {
        u32::from(self.min) * 3600 + u32::from(self.sec) * 60 + u32::from(self.tick)
    }

    pub fn total_centis(&self) -> u32 {
        u32::from(self.min) * 6000 + u32::from(self.sec) * 100 + u32::from(self.centis())
    }

    pub fn is_zero(&self) -> bool {
        self.min == 0 && self.sec == 0 && self.tick == 0
    }
}

impl fmt::Display for RankedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{:02}\"{:02}", self.min, self.sec, self.centis())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalTime {
    pub min: u32,
    pub sec: u8,
    pub centis: u8,
}

impl fmt::Display for TotalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{:02}\"{:02}", self.min, self.sec, self.centis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAttack {
    /// `LEVEL_COUNT` entries, each ranked fastest first.
    pub records: Vec<[RankedTime; PLACES]>,
    pub level: u8,
    pub initials: String,
}

impl TimeAttack {
    pub fn new(slot_index: usize) -> Self {
        Self {
            records: (0..LEVEL_COUNT)
                .map(|_| std::array::from_fn(|_| RankedTime::placeholder()))
                .collect(),
            level: u8::from(slot_index == 0),
            initials: DEFAULT_INITIALS.to_string(),
        }
    }

    pub fn has_no_times(&self) -> bool {
        self.records.iter().flatten().all(RankedTime::is_zero)
    }

    pub fn record(&self, level: usize, place: usize) -> Option<&RankedTime> {
        self.records.get(level)?.get(place)
    }

    /// Sum of first places over the main levels. The PC release adds frames,
    /// the others add the centiseconds shown on screen.
    pub fn total_time(&self, platform: Platform) -> TotalTime {
        let firsts = self.records.iter().take(MAIN_LEVELS).map(|places| &places[0]);
        match platform {
            Platform::Pc => {
                let frames: u32 = firsts.map(RankedTime::total_frames).sum();
                let rem = frames % 3600;
                TotalTime {
                    min: frames / 3600,
                    sec: (rem / 60) as u8,
                    centis: tick::frames_to_centis((rem % 60) as u8),
                }
            }
            Platform::SegaCd | Platform::Retro => {
                let centis: u32 = firsts.map(RankedTime::total_centis).sum();
                let rem = centis % 6000;
                TotalTime {
                    min: centis / 6000,
                    sec: (rem / 100) as u8,
                    centis: (rem % 100) as u8,
                }
            }
        }
    }
}

/// Display name of a time-attack level (1-based; 0 is a new game).
pub fn level_name(level: usize) -> String {
    if level == 0 {
        return "New Game".to_string();
    }
    if level > MAIN_LEVELS {
        return format!("Special Zone {}", level - MAIN_LEVELS);
    }
    let round = (level - 1) / ZONES;
    let zone = (level - 1) % ZONES;
    format!("{} {}", STAGE_NAMES[round], ZONE_NUMERALS[zone])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinglePlayer {
    pub is_new: bool,
    pub character: Character,
    pub lives: u8,
    pub score: u32,
    /// 1-based round, 0 on a new game.
    pub stage: u8,
    pub act: u8,
    /// 1-based special stage, 0 once every time stone is collected.
    pub special_stage: u8,
    pub in_special_stage: bool,
    pub good_futures: GoodFutures,
    pub machines: Machines,
    pub holograms: u8,
    pub time_stones: TimeStones,
}

impl SinglePlayer {
    pub fn new(slot_index: usize) -> Self {
        Self {
            is_new: slot_index > 0,
            character: Character::Sonic,
            lives: DEFAULT_LIVES,
            score: 0,
            stage: 1,
            act: 1,
            special_stage: 1,
            in_special_stage: false,
            good_futures: GoodFutures::default(),
            machines: Machines::default(),
            holograms: 0,
            time_stones: TimeStones::default(),
        }
    }

    /// Applies the editor's consistency rules after a manual edit: stage 0
    /// is a new game, futures only for rounds already reached, and a special
    /// stage whose stone is still missing. Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();

        if self.stage == 0 {
            self.is_new = true;
        }
        for round in 0..ROUNDS {
            if round >= self.stage as usize {
                self.good_futures.set(round, false);
            }
        }

        if self.time_stones.is_complete() {
            self.special_stage = 0;
            self.in_special_stage = false;
        } else {
            let stage = self.special_stage as usize;
            if stage == 0 || stage > TIME_STONE_COUNT || self.time_stones.has(stage - 1) {
                self.special_stage = self.time_stones.first_missing_stage().unwrap_or(0);
            }
        }

        *self != before
    }

    /// Round the player continues from, or `New Game`.
    pub fn stage_name(&self) -> &'static str {
        if self.is_new {
            return "New Game";
        }
        usize::from(self.stage)
            .checked_sub(1)
            .and_then(|round| STAGE_NAMES.get(round))
            .copied()
            .unwrap_or("Unknown")
    }

    /// First multiple of the extra-life interval strictly above the score.
    pub fn next_extra_life(&self) -> u32 {
        (self.score - self.score % EXTRA_LIFE_INTERVAL).saturating_add(EXTRA_LIFE_INTERVAL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMetadata {
    pub name: String,
    /// Only the PC release stores a save time.
    pub timestamp: Option<NaiveDateTime>,
}

impl SlotMetadata {
    pub fn new(slot_index: usize) -> Self {
        Self {
            name: format!("PLAYER {}", slot_index + 1),
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSlot {
    pub is_empty: bool,
    pub metadata: SlotMetadata,
    pub single_player: SinglePlayer,
    pub time_attack: TimeAttack,
}

impl SaveSlot {
    pub fn new(slot_index: usize) -> Self {
        Self {
            is_empty: false,
            metadata: SlotMetadata::new(slot_index),
            single_player: SinglePlayer::new(slot_index),
            time_attack: TimeAttack::new(slot_index),
        }
    }

    pub fn empty(slot_index: usize) -> Self {
        Self {
            is_empty: true,
            ..Self::new(slot_index)
        }
    }

    /// Turns an empty slot into one that is written on encode. A slot read
    /// from blank storage has no recorded times and gets the default records,
    /// otherwise it would load as empty again.
    pub fn mark_present(&mut self, slot_index: usize) {
        if !self.is_empty {
            return;
        }
        self.is_empty = false;
        if self.time_attack.has_no_times() {
            self.time_attack.records = TimeAttack::new(slot_index).records;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub mobile: bool,
    pub soundtrack: u8,
    pub music_volume: u8,
    pub sound_volume: u8,
    pub spin_dash: bool,
    pub video_filter: u8,
    pub unlock_tails: bool,
}

impl Options {
    pub fn max_volume(&self) -> u8 {
        if self.mobile {
            MOBILE_MAX_VOLUME
        } else {
            DESKTOP_MAX_VOLUME
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mobile: false,
            soundtrack: 0,
            music_volume: DESKTOP_MAX_VOLUME,
            sound_volume: DESKTOP_MAX_VOLUME,
            spin_dash: false,
            video_filter: 0,
            unlock_tails: false,
        }
    }
}

/// Every slot of one save file plus the file-wide options.
///
/// The slot count is fixed by the platform; `selected` always indexes a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveCollection {
    platform: Platform,
    slots: Vec<SaveSlot>,
    selected: usize,
    pub options: Options,
    pub knuckles_available: bool,
}

impl SaveCollection {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            slots: (0..platform.slot_count()).map(SaveSlot::new).collect(),
            selected: 0,
            options: Options::default(),
            knuckles_available: false,
        }
    }

    pub(crate) fn from_decoded(
        platform: Platform,
        slots: Vec<SaveSlot>,
        selected: usize,
        options: Options,
    ) -> Self {
        let knuckles_available = slots
            .iter()
            .any(|slot| slot.single_player.character == Character::Knuckles);
        Self {
            platform,
            slots,
            selected,
            options,
            knuckles_available,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn slots(&self) -> &[SaveSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [SaveSlot] {
        &mut self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&SaveSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut SaveSlot> {
        self.slots.get_mut(index)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize) -> Result<(), CoreError> {
        if index >= self.slots.len() {
            return Err(CoreError::new(
                CoreErrorCode::InvalidSlot,
                format!(
                    "invalid slot {index}, {} has slots 0..{}",
                    self.platform,
                    self.slots.len() - 1
                ),
            ));
        }
        self.selected = index;
        Ok(())
    }

    pub fn file_name(&self) -> &'static str {
        self.platform.file_name(self.options.mobile)
    }

    /// Replaces every slot and option with defaults, keeping the platform.
    pub fn restore_defaults(&mut self) {
        *self = Self::new(self.platform);
    }

    /// Re-targets the collection to another platform, dropping or adding
    /// default slots as needed.
    pub fn convert_to(mut self, platform: Platform) -> Self {
        let count = platform.slot_count();
        self.slots.truncate(count);
        while self.slots.len() < count {
            let index = self.slots.len();
            self.slots.push(SaveSlot::new(index));
        }
        self.selected = self.selected.min(count - 1);
        self.platform = platform;
        self
    }

    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            platform: self.platform,
            selected: self.selected,
            knuckles_available: self.knuckles_available,
            options: self.options.clone(),
            slots: self.slots.clone(),
        }
    }

    pub fn from_snapshot(snapshot: SessionSnapshot) -> Result<Self, CoreError> {
        let expected = snapshot.platform.slot_count();
        if snapshot.slots.len() != expected {
            return Err(CoreError::new(
                CoreErrorCode::InvalidSnapshot,
                format!(
                    "{} snapshot must hold {expected} slots, found {}",
                    snapshot.platform,
                    snapshot.slots.len()
                ),
            ));
        }
        if snapshot.selected >= expected {
            return Err(CoreError::new(
                CoreErrorCode::InvalidSnapshot,
                format!(
                    "selected slot {} out of range for {} slots",
                    snapshot.selected, expected
                ),
            ));
        }
        if let Some((index, slot)) = snapshot
            .slots
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.time_attack.records.len() != LEVEL_COUNT)
        {
            return Err(CoreError::new(
                CoreErrorCode::InvalidSnapshot,
                format!(
                    "slot {index} holds {} time-attack levels, expected {LEVEL_COUNT}",
                    slot.time_attack.records.len()
                ),
            ));
        }

        Ok(Self {
            platform: snapshot.platform,
            slots: snapshot.slots,
            selected: snapshot.selected,
            options: snapshot.options,
            knuckles_available: snapshot.knuckles_available,
        })
    }
}
