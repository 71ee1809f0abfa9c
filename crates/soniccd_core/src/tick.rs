//! Conversion between 1/60 s frame ticks and 1/100 s centiseconds.
//!
//! The canonical model stores the sub-second part of a record time as a
//! frame index in `0..60`. The Retro release stores centiseconds instead.

pub const FRAMES_PER_SECOND: usize = 60;

/// `TICK_TABLE[i] == floor(100 * i / 60)`: the centisecond shown for frame `i`.
pub const TICK_TABLE: [u8; FRAMES_PER_SECOND] = build_tick_table();

const fn build_tick_table() -> [u8; FRAMES_PER_SECOND] {
    let mut table = [0u8; FRAMES_PER_SECOND];
    let mut i = 0;
    while i < FRAMES_PER_SECOND {
        table[i] = (100 * i / FRAMES_PER_SECOND) as u8;
        i += 1;
    }
    table
}

/// Frame index to centiseconds. Out-of-range frames saturate at the last frame.
pub fn frames_to_centis(frame: u8) -> u8 {
    TICK_TABLE[(frame as usize).min(FRAMES_PER_SECOND - 1)]
}

/// First frame whose table value is exactly `centis`.
pub fn centis_to_frames(centis: u8) -> Option<u8> {
    TICK_TABLE
        .iter()
        .position(|&value| value == centis)
        .map(|index| index as u8)
}

/// Like [`centis_to_frames`], but values the table never produces resolve to
/// the last frame at or below them.
pub fn nearest_frame(centis: u8) -> u8 {
    if let Some(frame) = centis_to_frames(centis) {
        return frame;
    }
    TICK_TABLE
        .iter()
        .rposition(|&value| value <= centis)
        .map(|index| index as u8)
        .unwrap_or(0)
}
