use chrono::NaiveDate;
use soniccd_core::core_api::{Engine, Session};
use soniccd_core::model::{Character, GoodFutures, Platform, RankedTime, TimeStones};
use soniccd_render::{
    JsonStyle, TextRenderOptions, TextStyle, render_json_full, render_json_slot, render_text,
    render_text_with_options,
};

fn pc_session() -> Session {
    let mut session = Engine::new().new_session(Platform::Pc);
    let slot = session.slot_mut(0).expect("slot 0");
    slot.metadata.name = "SONIC TEAM".to_string();
    slot.metadata.timestamp = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|date| date.and_hms_opt(12, 30, 45));
    slot.single_player.stage = 3;
    slot.single_player.good_futures = GoodFutures(0b101);
    slot.single_player.time_stones = TimeStones(0b11);
    slot.time_attack.records[0][0] = RankedTime::new(0, 48, 30, "SON");
    session
}

fn keys(value: &serde_json::Value) -> Vec<&str> {
    value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect()
}

#[test]
fn full_json_uses_canonical_key_order() {
    let session = pc_session();
    let value = render_json_full(&session, JsonStyle::CanonicalV1);

    assert_eq!(
        keys(&value),
        vec![
            "platform",
            "file_name",
            "selected",
            "knuckles_available",
            "options",
            "slots",
        ]
    );
    let slots = value["slots"].as_array().expect("slots should be an array");
    assert_eq!(slots.len(), 6);
    assert_eq!(
        keys(&slots[0]),
        vec![
            "index",
            "state",
            "name",
            "timestamp",
            "single_player",
            "time_attack",
        ]
    );
}

#[test]
fn full_json_carries_slot_values() {
    let session = pc_session();
    let value = render_json_full(&session, JsonStyle::CanonicalV1);

    assert_eq!(value["platform"], "PC");
    assert_eq!(value["file_name"], "s_score.dat");
    let slot = &value["slots"][0];
    assert_eq!(slot["state"], "present");
    assert_eq!(slot["name"], "SONIC TEAM");
    assert_eq!(slot["timestamp"], "2024-05-01 12:30:45");
    assert_eq!(slot["single_player"]["stage_name"], "Tidal Tempest");
    assert_eq!(
        slot["single_player"]["good_futures"],
        serde_json::json!(["Palmtree Panic", "Tidal Tempest"])
    );
    assert_eq!(slot["single_player"]["time_stones"], serde_json::json!([1, 2]));
    assert_eq!(slot["time_attack"]["records"][0]["level"], "Palmtree Panic I");
    assert_eq!(
        slot["time_attack"]["records"][0]["places"][0]["time"],
        "0'48\"50"
    );
    assert_eq!(
        slot["time_attack"]["records"][27]["level"],
        "Special Zone 7"
    );
    assert!(value["slots"][1]["timestamp"].is_null());
}

#[test]
fn slot_json_keeps_only_the_requested_slot() {
    let session = pc_session();
    let value = render_json_slot(&session, 4, JsonStyle::CanonicalV1);
    let slots = value["slots"].as_array().expect("slots should be an array");
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["index"], 4);
    assert_eq!(slots[0]["name"], "PLAYER 5");

    let value = render_json_slot(&session, 9, JsonStyle::CanonicalV1);
    assert_eq!(value["slots"], serde_json::json!([]));
}

#[test]
fn text_sheet_contains_expected_sections() {
    let session = pc_session();
    let rendered = render_text(&session, TextStyle::Sheet);

    assert!(rendered.starts_with('\n'));
    assert!(rendered.contains("SONIC CD  PC save (s_score.dat)"));
    assert!(rendered.contains(" ::: Slot 1 :::  SONIC TEAM (present)"));
    assert!(rendered.contains("Saved: 2024-05-01 12:30:45"));
    assert!(rendered.contains("Progress: Tidal Tempest"));
    assert!(rendered.contains("Time stones: 1 2 - - - - - (2/7)"));
    assert!(rendered.contains("Good futures: Palmtree Panic, Tidal Tempest"));
    assert!(rendered.contains(" ::: Time Attack :::"));
    assert!(rendered.contains("0'48\"50 SON"));
    assert!(rendered.contains("Total time"));
    assert!(!rendered.contains("Music:"));
}

#[test]
fn retro_sheet_shows_options_and_acts() {
    let mut session = Engine::new().new_session(Platform::Retro);
    session.collection_mut().options.unlock_tails = true;
    session.collection_mut().knuckles_available = true;
    {
        let player = &mut session.slot_mut(0).expect("slot 0").single_player;
        player.character = Character::Knuckles;
        player.stage = 2;
        player.act = 3;
        player.in_special_stage = true;
        player.score = 60_000;
    }

    let rendered = render_text_with_options(
        &session,
        TextStyle::Sheet,
        TextRenderOptions {
            slot: Some(0),
            verbose: true,
        },
    );
    assert!(rendered.contains("Music: 9/9"));
    assert!(rendered.contains("Tails: unlocked"));
    assert!(rendered.contains("Knuckles available"));
    assert!(rendered.contains("Progress: Collision Chaos act 3 (special stage)"));
    assert!(rendered.contains("Knuckles  Lives: 3  Score: 60000  Next life: 100000"));
    assert!(rendered.contains("5'00\"00 AAA  5'00\"00 AAA  5'00\"00 AAA"));
    assert!(!rendered.contains("Slot 2"));
}
