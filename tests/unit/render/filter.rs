use super::*;

#[test]
fn identity_leaves_pixels_alone() {
    let mut px = vec![10u8, 20, 30, 255, 5, 6, 7, 128];
    let before = px.clone();
    FrameFilter::IDENTITY.apply_premul_rgba8(&mut px);
    assert_eq!(px, before);
}

#[test]
fn contrast_pushes_away_from_mid_grey() {
    let filter = FrameFilter {
        contrast: 1.1,
        saturate: 1.0,
    };
    let mut px = vec![200u8, 200, 200, 255, 50, 50, 50, 255, 128, 128, 128, 255];
    filter.apply_premul_rgba8(&mut px);
    assert!(px[0] > 200);
    assert!(px[4] < 50);
    // Greys stay grey.
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
    assert!((i16::from(px[8]) - 128).abs() <= 1);
}

#[test]
fn saturate_widens_channel_spread_and_keeps_greys() {
    let filter = FrameFilter {
        contrast: 1.0,
        saturate: 1.5,
    };
    let mut px = vec![180u8, 100, 60, 255, 90, 90, 90, 255];
    filter.apply_premul_rgba8(&mut px);
    assert!(i16::from(px[0]) - i16::from(px[2]) > 120);
    assert!((i16::from(px[4]) - 90).abs() <= 1);
    assert!((i16::from(px[6]) - 90).abs() <= 1);
}

#[test]
fn alpha_is_preserved_and_transparent_pixels_skipped() {
    let mut px = vec![100u8, 50, 20, 128, 0, 0, 0, 0];
    FrameFilter::default().apply_premul_rgba8(&mut px);
    assert_eq!(px[3], 128);
    assert!(px[0] <= 128 && px[1] <= 128 && px[2] <= 128);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
}

#[test]
fn negative_factors_are_invalid() {
    assert!(FrameFilter::default().validate().is_ok());
    let bad = FrameFilter {
        contrast: -1.0,
        saturate: 1.0,
    };
    assert!(bad.validate().is_err());
}
