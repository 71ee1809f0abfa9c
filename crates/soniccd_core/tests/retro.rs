mod common;

use soniccd_core::core_api::{CoreErrorCode, SlotState};
use soniccd_core::model::{
    Character, GoodFutures, Machines, Options, Platform, RankedTime, SaveCollection, TimeAttack,
    TimeStones,
};
use soniccd_core::platform::retro;
use soniccd_core::{decode, encode};

use common::{get_u16, get_u32, put_u16, retro_blank};

#[test]
fn scaled_volumes_identify_mobile_saves() {
    let mut file = retro_blank();
    file[0x084] = 15;

    let decoded = decode(&file, None).expect("retro save should decode");
    assert_eq!(decoded.platform, Platform::Retro);
    assert!(decoded.collection.options.mobile);
    assert_eq!(decoded.collection.options.music_volume, 1);
    assert_eq!(decoded.collection.options.sound_volume, 0);
    assert_eq!(decoded.collection.file_name(), "sgame.bin");
}

#[test]
fn muted_volumes_read_as_desktop() {
    let decoded = decode(&retro_blank(), None).expect("blank retro save");
    assert!(!decoded.collection.options.mobile);
    assert_eq!(decoded.collection.options.music_volume, 0);
}

#[test]
fn blank_time_attack_keeps_defaults_and_slots_stay_present() {
    let decoded = decode(&retro_blank(), None).expect("blank retro save");
    assert_eq!(decoded.slot_states, vec![SlotState::Present; 4]);
    assert_eq!(decoded.collection.slots()[0].time_attack, TimeAttack::new(0));
    for slot in decoded.collection.slots() {
        assert!(!slot.is_empty);
        assert!(slot.single_player.is_new);
        assert_eq!(slot.single_player.stage, 0);
    }
}

fn played_file() -> Vec<u8> {
    let mut file = retro_blank();
    let slot = 32;
    file[slot] = 2;
    file[slot + 0x04] = 5;
    file[slot + 0x08..slot + 0x0c].copy_from_slice(&123_456u32.to_le_bytes());
    file[slot + 0x0c] = 0x50 + 23;
    file[slot + 0x10] = 0b1;
    file[slot + 0x14] = 2;
    put_u16(&mut file, slot + 0x1c, 0b0100_0011);
    file[slot + 0x1e] = 6;

    file[0x088] = 7;
    file[0x08c] = 1;
    file[0x094] = 2;
    file[0x098] = 1;
    file[0x09c] = 12;
    put_u16(&mut file, 0x0c0, 6000 + 2 * 100 + 50);
    put_u16(&mut file, 0x0c0 + 24, 102);
    put_u16(&mut file, 0x0c4, 30 * 100 + 50);
    file
}

#[test]
fn decodes_single_player_and_shared_sections() {
    let decoded = decode(&played_file(), None).expect("played retro save");
    let collection = &decoded.collection;
    assert!(collection.knuckles_available);

    let player = &collection.slots()[1].single_player;
    assert!(!player.is_new);
    assert_eq!(player.character, Character::Knuckles);
    assert_eq!(player.lives, 5);
    assert_eq!(player.score, 123_456);
    assert_eq!((player.stage, player.act), (3, 3));
    assert!(player.in_special_stage);
    assert_eq!(player.special_stage, 3);
    assert_eq!(player.time_stones, TimeStones(0b1));
    assert_eq!(player.machines, Machines(0b0100_0011));
    assert_eq!(player.good_futures, GoodFutures(0b1001));
    assert_eq!(player.holograms, 6);

    let options = &collection.options;
    assert!(!options.mobile);
    assert_eq!(options.sound_volume, 7);
    assert!(options.spin_dash);
    assert!(!options.unlock_tails);
    assert_eq!(options.video_filter, 2);
    assert_eq!(options.soundtrack, 1);

    let time_attack = &collection.slots()[0].time_attack;
    assert_eq!(time_attack.level, 12);
    assert_eq!(time_attack.initials, "YOU");
    assert_eq!(time_attack.records[0][0], RankedTime::new(1, 2, 30, "AAA"));
    assert_eq!(time_attack.records[0][1], RankedTime::new(0, 0, 0, "AAA"));
    // 2 hundredths is between two frames
    assert_eq!(time_attack.records[1][0], RankedTime::new(0, 1, 1, "AAA"));
    assert_eq!(time_attack.records[21][0], RankedTime::new(0, 30, 30, "AAA"));
}

#[test]
fn collected_stones_suppress_the_special_stage() {
    let mut file = played_file();
    file[32 + 0x10] = 0x7f;
    let decoded = decode(&file, None).expect("played retro save");
    assert_eq!(decoded.collection.slots()[1].single_player.special_stage, 0);
}

fn edited_collection() -> SaveCollection {
    let mut collection = SaveCollection::new(Platform::Retro);
    collection.options = Options {
        mobile: true,
        soundtrack: 1,
        music_volume: 10,
        sound_volume: 4,
        spin_dash: true,
        video_filter: 2,
        unlock_tails: true,
    };

    let slots = collection.slots_mut();
    {
        let player = &mut slots[0].single_player;
        player.character = Character::Tails;
        player.lives = 7;
        player.score = 250_000;
        player.stage = 6;
        player.act = 10;
        player.special_stage = 5;
        player.time_stones = TimeStones(0b1011);
        player.machines = Machines(0b11_0000_0011);
        player.good_futures = GoodFutures::from_machines(player.machines);
        player.holograms = 9;

        let time_attack = &mut slots[0].time_attack;
        time_attack.level = 9;
        time_attack.records[0][0] = RankedTime::new(0, 48, 59, "AAA");
        time_attack.records[13][1] = RankedTime::new(2, 3, 7, "AAA");
        time_attack.records[27][2] = RankedTime::new(1, 1, 1, "AAA");
    }
    {
        let player = &mut slots[1].single_player;
        player.is_new = false;
        player.stage = 2;
        player.act = 1;
        player.in_special_stage = true;
        player.machines = Machines::ALL;
        player.good_futures = GoodFutures::ALL;
        player.time_stones = TimeStones::ALL;
        player.special_stage = 0;
    }
    for slot in &mut slots[2..] {
        slot.single_player.stage = 0;
        slot.single_player.act = 0;
    }
    collection
}

#[test]
fn round_trips_through_a_blank_template() {
    let collection = edited_collection();
    let bytes = encode(&collection, &retro_blank()).expect("encode");
    assert_eq!(bytes.len(), retro::LAYOUT.file_len);

    let decoded = decode(&bytes, None).expect("decode");
    assert_eq!(decoded.collection, collection);
}

#[test]
fn encode_writes_packed_fields() {
    let bytes = encode(&edited_collection(), &retro_blank()).expect("encode");

    assert_eq!(bytes[0x0c], 50 + 10);
    assert_eq!(bytes[32 + 0x0c], 0x50 + 11);
    assert_eq!(bytes[64 + 0x0c], 0);
    assert_eq!(get_u16(&bytes, 32 + 0x1c), 0x3fff);

    assert_eq!(get_u32(&bytes, 0x08), 250_000);
    assert_eq!(get_u32(&bytes, 0x18), 300_000);
    assert_eq!(get_u32(&bytes, 64 + 0x18), 0);

    assert_eq!(bytes[0x084], 100);
    assert_eq!(bytes[0x088], 40);
    assert_eq!(bytes[0x09c], 9);

    assert_eq!(get_u16(&bytes, 0x0c0), 48 * 100 + 98);
    // places the game never shows hold five minutes
    assert_eq!(get_u16(&bytes, 0x0c4 + 3 * 8), 30_000);
    assert_eq!(get_u16(&bytes, 0x0c4 + 6 * 72 + 8 * 8), 30_000);
}

#[test]
fn rejects_templates_of_the_wrong_size() {
    let err = encode(&edited_collection(), &[0u8; 100]).expect_err("short template");
    assert_eq!(err.code, CoreErrorCode::TemplateMismatch);
}
