use super::*;

#[test]
fn endpoints_and_midpoint_for_240_frames() {
    let m = FrameMapper::new(240).unwrap();
    assert_eq!(m.slot(Progress::ZERO), 0);
    assert_eq!(m.slot(Progress::ONE), 239);
    assert_eq!(m.index(Progress::new(0.5)), 119.5);
    assert_eq!(m.slot(Progress::new(0.5)), 119);
}

#[test]
fn resolve_floors_and_clamps() {
    let m = FrameMapper::new(10).unwrap();
    assert_eq!(m.resolve(3.99), 3);
    assert_eq!(m.resolve(-0.1), 0);
    assert_eq!(m.resolve(9.0000001), 9);
    assert_eq!(m.resolve(1e12), 9);
    assert_eq!(m.resolve(f64::NAN), 0);
    assert_eq!(m.resolve(f64::INFINITY), 9);
}

#[test]
fn slot_stays_in_range_across_the_unit_interval() {
    let m = FrameMapper::new(240).unwrap();
    let mut prev = 0;
    for i in 0..=1000 {
        let slot = m.slot(Progress::new(i as f64 / 1000.0));
        assert!(slot < 240);
        assert!(slot >= prev);
        prev = slot;
    }
}

#[test]
fn single_frame_sequence_always_maps_to_zero() {
    let m = FrameMapper::new(1).unwrap();
    assert_eq!(m.slot(Progress::ONE), 0);
    assert!(FrameMapper::new(0).is_err());
}
