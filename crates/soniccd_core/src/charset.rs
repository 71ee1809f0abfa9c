//! Text encodings used for player names and time-attack initials.

pub const INITIALS_LEN: usize = 3;

/// Sega CD initials alphabet, indexed by the stored byte.
pub const INITIALS_ALPHABET: [char; 37] = [
    ' ', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H',
    'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Out-of-range indices decode to a space.
pub fn alphabet_char(index: u8) -> char {
    INITIALS_ALPHABET
        .get(index as usize)
        .copied()
        .unwrap_or(' ')
}

/// Characters outside the alphabet encode as a space (index 0).
pub fn alphabet_index(c: char) -> u8 {
    let upper = c.to_ascii_uppercase();
    INITIALS_ALPHABET
        .iter()
        .position(|&candidate| candidate == upper)
        .map(|index| index as u8)
        .unwrap_or(0)
}

pub fn decode_alphabet(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| alphabet_char(b)).collect()
}

/// Always yields exactly `len` bytes, padding with spaces.
pub fn encode_alphabet(text: &str, len: usize) -> Vec<u8> {
    let mut chars = text.chars();
    (0..len)
        .map(|_| chars.next().map(alphabet_index).unwrap_or(0))
        .collect()
}

/// PC text fields: ASCII, `_` standing in for a space, padded with spaces or
/// NULs. Decoding restores spaces and drops the padding.
pub fn decode_ascii_field(bytes: &[u8]) -> String {
    let text: String = bytes
        .iter()
        .map(|&b| match b {
            b'_' => ' ',
            0x20..=0x7e => b as char,
            _ => ' ',
        })
        .collect();
    text.trim_end().to_string()
}

/// Player names: upper-cased printable ASCII, spaces stored as `_`, padded
/// with spaces to `len`.
pub fn encode_ascii_name(text: &str, len: usize) -> Vec<u8> {
    let mut out: Vec<u8> = text
        .chars()
        .take(len)
        .map(|c| match c.to_ascii_uppercase() {
            ' ' => b'_',
            c @ '!'..='~' => c as u8,
            _ => b'_',
        })
        .collect();
    out.resize(len, b' ');
    out
}

/// Initials: upper-cased, anything outside `[-0-9A-Z]` becomes a space.
pub fn encode_ascii_initials(text: &str, len: usize) -> Vec<u8> {
    let mut out: Vec<u8> = text
        .chars()
        .take(len)
        .map(|c| match c.to_ascii_uppercase() {
            c @ ('-' | '0'..='9' | 'A'..='Z') => c as u8,
            _ => b' ',
        })
        .collect();
    out.resize(len, b' ');
    out
}
