#![allow(dead_code)]

use soniccd_core::cipher;
use soniccd_core::platform::{pc, retro, sega_cd};

/// Formatted cartridge image with nothing saved in it.
pub fn sega_cd_blank() -> Vec<u8> {
    let mut file = vec![0u8; sega_cd::LAYOUT.file_len];
    let tail = file.len() - sega_cd::IDENTIFIER.len();
    file[tail..].copy_from_slice(sega_cd::IDENTIFIER);
    file
}

/// PC save whose slots hold ciphered zeros, so none carries a valid date.
pub fn pc_blank(selected: u8) -> Vec<u8> {
    let mut file = vec![0u8; pc::LAYOUT.file_len];
    file[0] = selected;
    for range in pc::LAYOUT.slot_ranges() {
        cipher::apply(&mut file[range.start..range.end]);
    }
    file
}

pub fn retro_blank() -> Vec<u8> {
    vec![0u8; retro::LAYOUT.file_len]
}

pub fn put_u16(bytes: &mut [u8], pos: usize, value: u16) {
    bytes[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn get_u16(bytes: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([bytes[pos], bytes[pos + 1]])
}

pub fn get_u32(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

/// Plain (unciphered) PC slot dated 2024-05-01 12:30:45 that continues from
/// round `stage_byte + 1`.
pub fn pc_plain_slot(stage_byte: u8) -> Vec<u8> {
    let mut slot = vec![0u8; pc::LAYOUT.slot_len];
    slot[0x000] = 1;
    slot[0x004..0x010].copy_from_slice(b"SONIC_TEAM  ");
    slot[0x010] = stage_byte;
    put_u16(&mut slot, 0x014, 2024);
    slot[0x016] = 5;
    slot[0x018] = 1;
    slot[0x01a] = 12;
    slot[0x01c] = 30;
    slot[0x01e] = 45;
    slot
}

/// Checksums and ciphers a plain PC slot into its on-disk form.
pub fn seal_pc_slot(mut plain: Vec<u8>) -> Vec<u8> {
    cipher::write_checksum(&mut plain);
    cipher::apply(&mut plain);
    plain
}

pub fn place_pc_slot(file: &mut [u8], index: usize, sealed: &[u8]) {
    let range = pc::LAYOUT.slot_range(index);
    file[range.start..range.end].copy_from_slice(sealed);
}
