mod common;

use soniccd_core::core_api::{CoreErrorCode, SlotState};
use soniccd_core::model::{
    Character, GoodFutures, Machines, Platform, RankedTime, SaveCollection, TimeStones,
};
use soniccd_core::platform::sega_cd;
use soniccd_core::{decode, detect, encode};

use common::sega_cd_blank;

const SLOT: usize = 0x040;

#[test]
fn blank_cartridge_decodes_to_an_empty_slot() {
    let decoded = decode(&sega_cd_blank(), None).expect("blank cartridge should decode");

    assert_eq!(decoded.platform, Platform::SegaCd);
    assert_eq!(decoded.selected, 0);
    assert_eq!(decoded.slot_states, vec![SlotState::Empty]);

    let slot = &decoded.collection.slots()[0];
    assert!(slot.is_empty);
    for places in &slot.time_attack.records {
        for record in places {
            assert_eq!((record.min, record.sec, record.tick), (0, 0, 0));
        }
    }
}

#[test]
fn identifier_is_required() {
    let mut file = sega_cd_blank();
    let last = file.len() - 1;
    file[last] = b'X';

    let err = decode(&file, Some(Platform::SegaCd)).expect_err("corrupt signature");
    assert_eq!(err.code, CoreErrorCode::FormatUnrecognized);
}

#[test]
fn larger_cartridges_are_accepted() {
    let mut file = vec![0u8; sega_cd::LAYOUT.file_len * 2];
    let tail = file.len() - sega_cd::IDENTIFIER.len();
    file[tail..].copy_from_slice(sega_cd::IDENTIFIER);
    assert_eq!(detect(&file, None).expect("two-bank image"), Platform::SegaCd);

    let odd = vec![0u8; sega_cd::LAYOUT.file_len + 1];
    assert!(detect(&odd, Some(Platform::SegaCd)).is_err());
}

fn played_cartridge() -> Vec<u8> {
    let mut file = sega_cd_blank();
    file[SLOT + 1..SLOT + 4].copy_from_slice(&[1, 2, 30]);
    file[SLOT + 0x150..SLOT + 0x153].copy_from_slice(&[29, 25, 24]);
    file[SLOT + 0x2a0..SLOT + 0x2a3].copy_from_slice(&[11, 11, 11]);
    file[SLOT + 0x2a4] = 2;
    file[SLOT + 0x2a5] = 9;
    file[SLOT + 0x2a7] = 0b11;
    file[SLOT + 0x2a8] = 0x70;
    file[SLOT + 0x2ac] = 4;
    file[SLOT + 0x2ad] = 0b1111;
    file
}

#[test]
fn decodes_progress_and_expands_good_futures() {
    let decoded = decode(&played_cartridge(), None).expect("played cartridge");
    assert_eq!(decoded.slot_states, vec![SlotState::Present]);

    let slot = &decoded.collection.slots()[0];
    let player = &slot.single_player;
    assert!(!slot.is_empty);
    assert!(!player.is_new);
    assert_eq!(player.stage, 3);
    assert_eq!(player.special_stage, 5);
    assert_eq!(player.good_futures, GoodFutures(0b11));
    assert_eq!(player.machines, Machines(0x0f));
    assert_eq!(player.holograms, 4);
    assert_eq!(player.time_stones, TimeStones(0b1111));

    assert_eq!(player.character, Character::Sonic);
    assert_eq!(player.lives, 3);
    assert_eq!(player.score, 0);
    assert_eq!(player.act, 1);
    assert!(!player.in_special_stage);

    let time_attack = &slot.time_attack;
    assert_eq!(time_attack.records[0][0], RankedTime::new(1, 2, 30, "SON"));
    assert_eq!(time_attack.records[0][1], RankedTime::new(0, 0, 0, "   "));
    assert_eq!(time_attack.level, 3);
    assert_eq!(time_attack.initials, "AAA");
}

#[test]
fn collected_stones_suppress_the_special_stage() {
    let mut file = played_cartridge();
    file[SLOT + 0x2ad] = 0x7f;

    let decoded = decode(&file, None).expect("played cartridge");
    let player = &decoded.collection.slots()[0].single_player;
    assert!(player.time_stones.is_complete());
    assert_eq!(player.special_stage, 0);
}

#[test]
fn new_game_sentinel_clears_the_stage() {
    let mut file = played_cartridge();
    file[SLOT + 0x2a8] = 0x10;
    file[SLOT + 0x2a4] = 9;

    let decoded = decode(&file, None).expect("played cartridge");
    let player = &decoded.collection.slots()[0].single_player;
    assert!(player.is_new);
    assert_eq!(player.stage, 0);

    file[SLOT + 0x2a8] = 0x70;
    let decoded = decode(&file, None).expect("played cartridge");
    assert_eq!(decoded.collection.slots()[0].single_player.stage, 7);
}

fn edited_collection() -> SaveCollection {
    let mut collection = SaveCollection::new(Platform::SegaCd);
    let slot = collection.slot_mut(0).expect("single slot");
    let player = &mut slot.single_player;
    player.is_new = false;
    player.stage = 4;
    player.special_stage = 3;
    player.good_futures = GoodFutures(0b101);
    player.machines = player.good_futures.expand_to_machines();
    player.holograms = player.good_futures.holograms();
    player.time_stones = TimeStones(0b11);

    slot.time_attack.records[0][0] = RankedTime::new(0, 58, 59, "SEG");
    slot.time_attack.records[20][2] = RankedTime::new(9, 59, 0, "Z 9");
    slot.time_attack.records[27][1] = RankedTime::new(0, 31, 12, "ABC");
    slot.time_attack.level = 5;
    slot.time_attack.initials = "ABC".to_string();
    collection
}

#[test]
fn round_trips_through_a_blank_template() {
    let collection = edited_collection();
    let bytes = encode(&collection, &sega_cd_blank()).expect("encode");
    assert_eq!(bytes.len(), sega_cd::LAYOUT.file_len);
    assert!(bytes.ends_with(sega_cd::IDENTIFIER));
    assert_eq!(bytes[SLOT + 0x2a8], 0x70);
    assert_eq!(bytes[SLOT + 0x2a5], 15);

    let decoded = decode(&bytes, None).expect("decode");
    assert_eq!(decoded.collection, collection);
}

#[test]
fn continue_state_is_not_persisted() {
    let mut collection = edited_collection();
    {
        let player = &mut collection.slot_mut(0).expect("single slot").single_player;
        player.character = Character::Tails;
        player.lives = 9;
        player.score = 12_345;
        player.act = 2;
        player.in_special_stage = true;
    }

    let bytes = encode(&collection, &sega_cd_blank()).expect("encode");
    let decoded = decode(&bytes, None).expect("decode");
    let player = &decoded.collection.slots()[0].single_player;
    assert_eq!(player.character, Character::Sonic);
    assert_eq!(player.lives, 3);
    assert_eq!(player.score, 0);
    assert_eq!(player.act, 1);
    assert!(!player.in_special_stage);
    assert_eq!(decoded.collection, edited_collection());
}

#[test]
fn present_slot_without_times_gets_default_records() {
    let mut collection = decode(&sega_cd_blank(), None)
        .expect("blank cartridge should decode")
        .collection;
    {
        let slot = collection.slot_mut(0).expect("single slot");
        slot.is_empty = false;
        slot.single_player.stage = 6;
    }

    let bytes = encode(&collection, &sega_cd_blank()).expect("encode");
    assert_eq!(bytes[SLOT + 1], 5);

    let decoded = decode(&bytes, None).expect("decode");
    assert_eq!(decoded.slot_states, vec![SlotState::Present]);
    let slot = &decoded.collection.slots()[0];
    assert_eq!(slot.single_player.stage, 6);
    assert!(
        slot.time_attack
            .records
            .iter()
            .flatten()
            .all(|record| *record == RankedTime::placeholder())
    );
}
