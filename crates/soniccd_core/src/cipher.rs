//! Slot obfuscation and integrity check used by the PC release.
//!
//! Every byte of a PC slot is XORed with the matching byte of a fixed
//! pseudorandom sequence, and the plain slot carries a 16-bit checksum four
//! bytes before its end.

pub const KEY_LEN: usize = 720;
pub const CHECKSUM_TAIL: usize = 4;

pub const KEY: [u8; KEY_LEN] = [
    0x83, 0x0c, 0x27, 0xdf, 0x0f, 0x2c, 0xbb, 0x88, 0x24, 0xf4, 0x89, 0xf0,
    0xb8, 0x17, 0xc6, 0x86, 0x49, 0xa6, 0x8e, 0x0c, 0x66, 0x87, 0x83, 0xa5,
    0x71, 0x24, 0xb7, 0x2f, 0xa3, 0x60, 0xcc, 0xd2, 0x50, 0xcf, 0x59, 0xd9,
    0x6d, 0x26, 0x90, 0xc1, 0x4f, 0xf0, 0x1e, 0x90, 0xb5, 0x83, 0x53, 0x69,
    0x09, 0x33, 0x83, 0x5c, 0xe3, 0xc5, 0xac, 0x82, 0xcf, 0x27, 0x58, 0x4a,
    0x50, 0x5e, 0xc5, 0x0e, 0x25, 0xbf, 0x44, 0xea, 0xca, 0x62, 0xdf, 0xcd,
    0x42, 0xd4, 0x3e, 0xd0, 0x14, 0x0c, 0xcc, 0xc7, 0x94, 0xa0, 0x15, 0x16,
    0x63, 0x39, 0x72, 0xc7, 0x39, 0x45, 0xe9, 0xd9, 0xe2, 0xeb, 0x4f, 0xda,
    0x87, 0x44, 0xaf, 0xb8, 0x2f, 0xc8, 0xf0, 0xd4, 0x85, 0x06, 0xb1, 0x58,
    0xdc, 0x99, 0x78, 0xcb, 0x70, 0x57, 0x0c, 0xe2, 0xef, 0xcb, 0x1f, 0x99,
    0x38, 0xe6, 0x30, 0x83, 0x62, 0xf1, 0xb0, 0x5e, 0x00, 0xc6, 0x64, 0xeb,
    0xa3, 0x40, 0x0a, 0xfd, 0xa1, 0xf0, 0x3f, 0xcf, 0x15, 0x11, 0xa0, 0x9a,
    0x27, 0xbe, 0x30, 0x67, 0x8e, 0x63, 0xfa, 0x22, 0x53, 0x72, 0xf7, 0xf1,
    0xd7, 0x57, 0x31, 0xc4, 0x17, 0xad, 0x29, 0x2c, 0x2f, 0xb2, 0x76, 0x70,
    0x1d, 0xf8, 0xb0, 0xde, 0xc8, 0x5e, 0x8c, 0x5f, 0x41, 0x3f, 0x48, 0x4e,
    0x48, 0xe9, 0x4a, 0x8a, 0x12, 0x51, 0x04, 0xca, 0x49, 0x05, 0x1a, 0x31,
    0x55, 0x61, 0xc7, 0x23, 0xda, 0x06, 0x7d, 0x56, 0x81, 0x88, 0xcb, 0x2c,
    0xfc, 0x67, 0x84, 0x40, 0x44, 0x41, 0x1e, 0x3e, 0x25, 0x45, 0x58, 0xf9,
    0xfd, 0xeb, 0x1f, 0xb7, 0xc1, 0xe2, 0xb3, 0xcf, 0x40, 0x4a, 0x06, 0x77,
    0xac, 0x24, 0x65, 0xd7, 0x56, 0x07, 0x59, 0x62, 0xb9, 0x14, 0xd0, 0x65,
    0xba, 0x2c, 0x78, 0xe0, 0x2e, 0x60, 0x6c, 0x96, 0x9d, 0xa8, 0x12, 0x60,
    0x45, 0xd8, 0x43, 0xc6, 0x62, 0xd1, 0xad, 0xd0, 0xad, 0xf4, 0x76, 0x1a,
    0x23, 0xdd, 0x22, 0x27, 0x07, 0x4d, 0xb7, 0xf7, 0x2a, 0x67, 0x1f, 0xdc,
    0x6a, 0x20, 0xcd, 0x89, 0x79, 0xf1, 0xa4, 0x6c, 0xe0, 0xce, 0x14, 0x3e,
    0x43, 0x5c, 0x86, 0xd8, 0xe6, 0x5f, 0xfa, 0x48, 0x70, 0x71, 0xee, 0x24,
    0xef, 0xfa, 0x82, 0x1e, 0x1d, 0x5c, 0xdb, 0xd9, 0xe2, 0x6e, 0xc5, 0xfb,
    0x19, 0x2c, 0x9c, 0x84, 0x97, 0xad, 0x6c, 0x5e, 0x69, 0x55, 0x57, 0x34,
    0x5e, 0x4b, 0x37, 0x88, 0xc6, 0x2d, 0x85, 0x00, 0x78, 0x03, 0x7a, 0x01,
    0x1a, 0x72, 0x73, 0x7f, 0x9c, 0x33, 0x9a, 0x14, 0x06, 0xc3, 0xc3, 0x4f,
    0x74, 0x5b, 0x94, 0x4e, 0x5e, 0x22, 0xe9, 0x8f, 0x1d, 0xa2, 0x76, 0x03,
    0xab, 0x78, 0xaf, 0x64, 0xab, 0x50, 0xe4, 0xc9, 0xa9, 0x11, 0xb1, 0x78,
    0xa2, 0x55, 0x95, 0xfb, 0xc7, 0x1c, 0xe1, 0x76, 0x7e, 0xc1, 0xd4, 0x37,
    0xaa, 0x2d, 0x04, 0x8f, 0x2c, 0x4a, 0xff, 0xe0, 0xaa, 0xba, 0x33, 0xf8,
    0x8e, 0xca, 0x0b, 0x9d, 0x52, 0xa1, 0x5b, 0x69, 0xfc, 0xbe, 0xfe, 0xd9,
    0xe4, 0xa1, 0xbe, 0xa0, 0xbd, 0xc7, 0x73, 0x41, 0xd3, 0xdc, 0x6f, 0xdc,
    0x92, 0x2d, 0x1a, 0x48, 0x48, 0x5c, 0xda, 0x63, 0x2c, 0x57, 0x36, 0xa6,
    0x9e, 0x8a, 0x3a, 0xfd, 0xb0, 0x54, 0x1d, 0xd5, 0xe6, 0xb8, 0x21, 0x76,
    0x3a, 0x56, 0xbb, 0x93, 0x63, 0x99, 0xf4, 0x1f, 0x57, 0x31, 0x0f, 0x63,
    0x0f, 0xc4, 0x6c, 0x4e, 0x8a, 0xe0, 0xac, 0x0c, 0x14, 0x35, 0x16, 0xda,
    0xc8, 0x01, 0x39, 0x18, 0x54, 0xcb, 0xd3, 0x9f, 0xfc, 0x54, 0xf2, 0x56,
    0xe2, 0xcb, 0x59, 0x00, 0x84, 0x40, 0x25, 0x58, 0x86, 0x5b, 0xb1, 0x60,
    0xb2, 0x4e, 0xb6, 0xf6, 0x3d, 0x08, 0xb7, 0xa8, 0x4b, 0xab, 0x9c, 0xc9,
    0xb6, 0x41, 0x9d, 0xc4, 0x0b, 0xab, 0x61, 0xb1, 0xd6, 0xd9, 0x67, 0x26,
    0x20, 0x41, 0xa6, 0x50, 0x35, 0x89, 0x70, 0x42, 0xab, 0x87, 0x9c, 0x8c,
    0x9f, 0x6c, 0xe4, 0x10, 0x42, 0x3c, 0x8c, 0x11, 0x95, 0x82, 0x45, 0x8d,
    0x70, 0x41, 0x50, 0xcd, 0xc9, 0x2d, 0xe6, 0x3a, 0x33, 0x1b, 0xd8, 0x72,
    0xa5, 0xb7, 0x73, 0x9b, 0x7d, 0x75, 0xa6, 0xf8, 0xc4, 0xca, 0x67, 0xb9,
    0xb4, 0x9b, 0x52, 0x18, 0x77, 0xf6, 0x93, 0xa1, 0x32, 0x00, 0x07, 0xd1,
    0x42, 0x2e, 0x9e, 0xe3, 0xc6, 0xb8, 0x04, 0xe7, 0x5d, 0x4b, 0x80, 0x14,
    0x31, 0xff, 0x1c, 0x5f, 0x34, 0x88, 0x06, 0x4d, 0xa9, 0xb0, 0x36, 0x05,
    0xe7, 0x05, 0x51, 0xa9, 0x59, 0xce, 0xcd, 0xe6, 0xca, 0x44, 0x57, 0xca,
    0xdf, 0xff, 0x71, 0xd6, 0xe5, 0xaf, 0x60, 0x55, 0xcd, 0x0c, 0x45, 0xec,
    0x75, 0x10, 0x8a, 0x71, 0x2a, 0x63, 0x7f, 0x00, 0x6a, 0x17, 0x45, 0x4c,
    0xee, 0x95, 0xec, 0x34, 0xe8, 0xd7, 0xd8, 0x97, 0x89, 0xd8, 0x69, 0x68,
    0xc6, 0x49, 0xdb, 0x05, 0x5c, 0x86, 0x6a, 0xc4, 0x11, 0xc8, 0xba, 0xcf,
    0x3d, 0x9c, 0x77, 0x33, 0x8a, 0x94, 0x38, 0x33, 0xf8, 0x3c, 0xaa, 0xe2,
    0x24, 0x4f, 0xea, 0xf1, 0xc9, 0x2b, 0x32, 0xc5, 0x87, 0x83, 0xb8, 0xcc,
    0xe3, 0x54, 0xd3, 0x12, 0x90, 0x1a, 0x60, 0x0f, 0xed, 0x43, 0x64, 0xc4,
    0xce, 0xe4, 0xf3, 0x06, 0x7f, 0xab, 0x50, 0x19, 0x06, 0x15, 0x55, 0x80,
    0xa9, 0xe0, 0x15, 0x14, 0xb0, 0xc4, 0xc1, 0x54, 0x6c, 0x5e, 0xc8, 0xfc,
];

/// XORs `bytes` with the key stream in place. Applying it twice restores the
/// input. Bytes past the key length are left untouched.
pub fn apply(bytes: &mut [u8]) {
    for (byte, key) in bytes.iter_mut().zip(KEY.iter()) {
        *byte ^= key;
    }
}

/// Sum of every byte but the trailing four, each read as a signed 8-bit value.
pub fn calculate_checksum(bytes: &[u8]) -> i32 {
    let end = bytes.len().saturating_sub(CHECKSUM_TAIL);
    bytes[..end].iter().map(|&b| i32::from(b as i8)).sum()
}

pub fn stored_checksum(bytes: &[u8]) -> Option<u16> {
    let pos = bytes.len().checked_sub(CHECKSUM_TAIL)?;
    Some(u16::from_le_bytes([bytes[pos], bytes[pos + 1]]))
}

/// Stores the checksum (mod 65536) at `len - 4`. Buffers shorter than the
/// checksum tail are left untouched.
pub fn write_checksum(bytes: &mut [u8]) {
    let Some(pos) = bytes.len().checked_sub(CHECKSUM_TAIL) else {
        return;
    };
    let checksum = calculate_checksum(bytes) as u16;
    bytes[pos..pos + 2].copy_from_slice(&checksum.to_le_bytes());
}

pub fn verify_checksum(bytes: &[u8]) -> bool {
    stored_checksum(bytes).is_some_and(|stored| stored == calculate_checksum(bytes) as u16)
}
