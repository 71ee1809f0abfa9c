use std::fmt::Write as _;

use soniccd_core::core_api::{Session, SlotState};
use soniccd_core::model::{
    LEVEL_COUNT, MAIN_LEVELS, Options, Platform, ROUNDS, RankedTime, SaveSlot, SinglePlayer,
    STAGE_NAMES, TIME_STONE_COUNT, TimeAttack, level_name,
};
use serde_json::{Map as JsonMap, Value as JsonValue};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LEVEL_COL_WIDTH: usize = 24;
const TIME_COL_WIDTH: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Sheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Only this slot is rendered when set.
    pub slot: Option<usize>,
    /// Show all three places of every level instead of first places only.
    pub verbose: bool,
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session, None)),
    }
}

/// Like [`render_json_full`] with `slots` holding only the requested slot.
/// An out-of-range index yields an empty `slots` array.
pub fn render_json_slot(session: &Session, index: usize, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session, Some(index))),
    }
}

pub fn render_text(session: &Session, style: TextStyle) -> String {
    render_text_with_options(session, style, TextRenderOptions::default())
}

pub fn render_text_with_options(
    session: &Session,
    style: TextStyle,
    options: TextRenderOptions,
) -> String {
    match style {
        TextStyle::Sheet => render_sheet_impl(session, options),
    }
}

fn default_json(session: &Session, only_slot: Option<usize>) -> JsonMap<String, JsonValue> {
    let collection = session.collection();
    let mut out = JsonMap::new();

    out.insert(
        "platform".to_string(),
        JsonValue::String(session.platform().as_str().to_string()),
    );
    out.insert(
        "file_name".to_string(),
        JsonValue::String(session.file_name().to_string()),
    );
    out.insert("selected".to_string(), JsonValue::from(session.selected()));
    out.insert(
        "knuckles_available".to_string(),
        JsonValue::Bool(collection.knuckles_available),
    );
    out.insert("options".to_string(), options_to_json(&collection.options));

    let slots = collection
        .slots()
        .iter()
        .zip(session.slot_states())
        .enumerate()
        .filter(|(index, _)| only_slot.is_none_or(|only| only == *index))
        .map(|(index, (slot, state))| slot_to_json(session.platform(), index, *state, slot))
        .collect();
    out.insert("slots".to_string(), JsonValue::Array(slots));

    out
}

fn options_to_json(options: &Options) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("mobile".to_string(), JsonValue::Bool(options.mobile));
    m.insert("soundtrack".to_string(), JsonValue::from(options.soundtrack));
    m.insert(
        "music_volume".to_string(),
        JsonValue::from(options.music_volume),
    );
    m.insert(
        "sound_volume".to_string(),
        JsonValue::from(options.sound_volume),
    );
    m.insert("max_volume".to_string(), JsonValue::from(options.max_volume()));
    m.insert("spin_dash".to_string(), JsonValue::Bool(options.spin_dash));
    m.insert(
        "video_filter".to_string(),
        JsonValue::from(options.video_filter),
    );
    m.insert(
        "unlock_tails".to_string(),
        JsonValue::Bool(options.unlock_tails),
    );
    JsonValue::Object(m)
}

fn slot_to_json(platform: Platform, index: usize, state: SlotState, slot: &SaveSlot) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("index".to_string(), JsonValue::from(index));
    m.insert(
        "state".to_string(),
        JsonValue::String(state.as_str().to_string()),
    );
    m.insert(
        "name".to_string(),
        JsonValue::String(slot.metadata.name.clone()),
    );
    m.insert(
        "timestamp".to_string(),
        match slot.metadata.timestamp {
            Some(t) => JsonValue::String(t.format(TIMESTAMP_FORMAT).to_string()),
            None => JsonValue::Null,
        },
    );
    m.insert(
        "single_player".to_string(),
        single_player_to_json(&slot.single_player),
    );
    m.insert(
        "time_attack".to_string(),
        time_attack_to_json(platform, &slot.time_attack),
    );
    JsonValue::Object(m)
}

fn single_player_to_json(player: &SinglePlayer) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("is_new".to_string(), JsonValue::Bool(player.is_new));
    m.insert(
        "character".to_string(),
        JsonValue::String(player.character.to_string()),
    );
    m.insert("lives".to_string(), JsonValue::from(player.lives));
    m.insert("score".to_string(), JsonValue::from(player.score));
    m.insert(
        "next_extra_life".to_string(),
        JsonValue::from(player.next_extra_life()),
    );
    m.insert("stage".to_string(), JsonValue::from(player.stage));
    m.insert(
        "stage_name".to_string(),
        JsonValue::String(player.stage_name().to_string()),
    );
    m.insert("act".to_string(), JsonValue::from(player.act));
    m.insert(
        "special_stage".to_string(),
        JsonValue::from(player.special_stage),
    );
    m.insert(
        "in_special_stage".to_string(),
        JsonValue::Bool(player.in_special_stage),
    );
    m.insert(
        "good_futures".to_string(),
        JsonValue::Array(
            (0..ROUNDS)
                .filter(|&round| player.good_futures.is_good(round))
                .map(|round| JsonValue::String(STAGE_NAMES[round].to_string()))
                .collect(),
        ),
    );
    m.insert("machines".to_string(), JsonValue::from(player.machines.0));
    m.insert("holograms".to_string(), JsonValue::from(player.holograms));
    m.insert(
        "time_stones".to_string(),
        JsonValue::Array(
            (0..TIME_STONE_COUNT)
                .filter(|&stone| player.time_stones.has(stone))
                .map(|stone| JsonValue::from(stone + 1))
                .collect(),
        ),
    );
    JsonValue::Object(m)
}

fn time_attack_to_json(platform: Platform, time_attack: &TimeAttack) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("level".to_string(), JsonValue::from(time_attack.level));
    m.insert(
        "level_name".to_string(),
        JsonValue::String(level_name(usize::from(time_attack.level))),
    );
    m.insert(
        "initials".to_string(),
        JsonValue::String(time_attack.initials.clone()),
    );
    m.insert(
        "total_time".to_string(),
        JsonValue::String(time_attack.total_time(platform).to_string()),
    );
    m.insert(
        "records".to_string(),
        JsonValue::Array(
            time_attack
                .records
                .iter()
                .enumerate()
                .map(|(level, places)| {
                    let mut r = JsonMap::new();
                    r.insert("level".to_string(), JsonValue::String(level_name(level + 1)));
                    r.insert(
                        "places".to_string(),
                        JsonValue::Array(places.iter().map(record_to_json).collect()),
                    );
                    JsonValue::Object(r)
                })
                .collect(),
        ),
    );
    JsonValue::Object(m)
}

fn record_to_json(record: &RankedTime) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("time".to_string(), JsonValue::String(record.to_string()));
    m.insert(
        "initials".to_string(),
        JsonValue::String(record.initials.clone()),
    );
    JsonValue::Object(m)
}

fn render_sheet_impl(session: &Session, options: TextRenderOptions) -> String {
    let collection = session.collection();
    let platform = session.platform();

    let mut out = String::new();
    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "  SONIC CD  {} save ({})",
        platform,
        session.file_name()
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out, "  Selected slot: {}", session.selected() + 1)
        .expect("writing to String cannot fail");
    if platform == Platform::Retro {
        write_options(&mut out, &collection.options);
    }
    if collection.knuckles_available {
        writeln!(&mut out, "  Knuckles available").expect("writing to String cannot fail");
    }

    for (index, (slot, state)) in collection
        .slots()
        .iter()
        .zip(session.slot_states())
        .enumerate()
    {
        if options.slot.is_some_and(|only| only != index) {
            continue;
        }
        writeln!(&mut out).expect("writing to String cannot fail");
        write_slot(&mut out, platform, index, *state, slot, options.verbose);
    }
    out
}

fn write_options(out: &mut String, options: &Options) {
    let max = options.max_volume();
    writeln!(
        out,
        "  Music: {}/{max}  Sound: {}/{max}  Spin dash: {}  Tails: {}",
        options.music_volume,
        options.sound_volume,
        on_off(options.spin_dash),
        if options.unlock_tails {
            "unlocked"
        } else {
            "locked"
        },
    )
    .expect("writing to String cannot fail");
    writeln!(
        out,
        "  Soundtrack: {}  Filter: {}  Build: {}",
        if options.soundtrack == 0 { "JP/EU" } else { "US" },
        options.video_filter,
        if options.mobile { "mobile" } else { "desktop" },
    )
    .expect("writing to String cannot fail");
}

fn write_slot(
    out: &mut String,
    platform: Platform,
    index: usize,
    state: SlotState,
    slot: &SaveSlot,
    verbose: bool,
) {
    writeln!(
        out,
        " ::: Slot {} :::  {} ({})",
        index + 1,
        slot.metadata.name,
        state.as_str()
    )
    .expect("writing to String cannot fail");
    if state != SlotState::Present {
        return;
    }
    if let Some(timestamp) = slot.metadata.timestamp {
        writeln!(out, "  Saved: {}", timestamp.format(TIMESTAMP_FORMAT))
            .expect("writing to String cannot fail");
    }

    let player = &slot.single_player;
    let mut progress = player.stage_name().to_string();
    if platform == Platform::Retro && !player.is_new {
        write!(&mut progress, " act {}", player.act).expect("writing to String cannot fail");
        if player.in_special_stage {
            progress.push_str(" (special stage)");
        }
    }
    writeln!(out, "  Progress: {progress}").expect("writing to String cannot fail");
    if platform == Platform::Retro {
        writeln!(
            out,
            "  {}  Lives: {}  Score: {}  Next life: {}",
            player.character,
            player.lives,
            player.score,
            player.next_extra_life()
        )
        .expect("writing to String cannot fail");
    }

    let stones: Vec<String> = (0..TIME_STONE_COUNT)
        .map(|stone| {
            if player.time_stones.has(stone) {
                (stone + 1).to_string()
            } else {
                "-".to_string()
            }
        })
        .collect();
    writeln!(
        out,
        "  Time stones: {} ({}/{TIME_STONE_COUNT})  Special stage: {}",
        stones.join(" "),
        player.time_stones.count(),
        player.special_stage
    )
    .expect("writing to String cannot fail");

    let futures: Vec<&str> = (0..ROUNDS)
        .filter(|&round| player.good_futures.is_good(round))
        .map(|round| STAGE_NAMES[round])
        .collect();
    writeln!(
        out,
        "  Good futures: {}",
        if futures.is_empty() {
            "none".to_string()
        } else {
            futures.join(", ")
        }
    )
    .expect("writing to String cannot fail");
    writeln!(out, "  Holograms: {}", player.holograms).expect("writing to String cannot fail");

    write_time_attack(out, platform, &slot.time_attack, verbose);
}

fn write_time_attack(
    out: &mut String,
    platform: Platform,
    time_attack: &TimeAttack,
    verbose: bool,
) {
    writeln!(
        out,
        " ::: Time Attack :::  {} ({})",
        level_name(usize::from(time_attack.level)),
        time_attack.initials
    )
    .expect("writing to String cannot fail");

    for (level, places) in time_attack.records.iter().take(LEVEL_COUNT).enumerate() {
        let shown = if verbose { &places[..] } else { &places[..1] };
        let times: String = shown
            .iter()
            .map(|record| {
                format!(
                    "{:<w$}",
                    format!("{record} {}", record.initials),
                    w = TIME_COL_WIDTH
                )
            })
            .collect();
        let line = format!(
            "  {:<w$}{}",
            level_name(level + 1),
            times,
            w = LEVEL_COL_WIDTH
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
        if level + 1 == MAIN_LEVELS {
            writeln!(
                out,
                "  {:<w$}{}",
                "Total time",
                time_attack.total_time(platform),
                w = LEVEL_COL_WIDTH
            )
            .expect("writing to String cannot fail");
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
