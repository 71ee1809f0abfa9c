use soniccd_core::tick::{
    FRAMES_PER_SECOND, TICK_TABLE, centis_to_frames, frames_to_centis, nearest_frame,
};

#[test]
fn table_maps_frames_to_floored_centiseconds() {
    assert_eq!(TICK_TABLE.len(), FRAMES_PER_SECOND);
    assert_eq!(TICK_TABLE[0], 0);
    assert_eq!(TICK_TABLE[1], 1);
    assert_eq!(TICK_TABLE[2], 3);
    assert_eq!(TICK_TABLE[3], 5);
    assert_eq!(TICK_TABLE[30], 50);
    assert_eq!(TICK_TABLE[59], 98);
    for (i, &value) in TICK_TABLE.iter().enumerate() {
        assert_eq!(usize::from(value), 100 * i / 60);
    }
}

#[test]
fn inverse_lookup_is_exact_for_table_values() {
    for frame in 0..FRAMES_PER_SECOND as u8 {
        assert_eq!(centis_to_frames(frames_to_centis(frame)), Some(frame));
    }
}

#[test]
fn values_outside_the_table_have_no_exact_frame() {
    assert_eq!(centis_to_frames(2), None);
    assert_eq!(centis_to_frames(99), None);
    assert_eq!(nearest_frame(2), 1);
    assert_eq!(nearest_frame(99), 59);
    assert_eq!(nearest_frame(50), 30);
}

#[test]
fn frames_past_one_second_saturate() {
    assert_eq!(frames_to_centis(60), 98);
    assert_eq!(frames_to_centis(u8::MAX), 98);
}
