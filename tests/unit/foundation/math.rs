use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premultiply_handles_opaque_and_transparent() {
    let mut px = vec![100u8, 50, 200, 255, 100, 50, 200, 0, 100, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[100, 50, 200, 255]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(
        &px[8..12],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
}

#[test]
fn unpremul_inverts_within_rounding() {
    for c in [0u8, 17, 100, 200, 255] {
        let p = mul_div255_u8(u16::from(c), 128);
        let back = unpremul_channel(p, 128);
        assert!((i16::from(back) - i16::from(c)).abs() <= 1);
    }
    assert_eq!(unpremul_channel(50, 0), 0);
}

#[test]
fn lerp_endpoints() {
    assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
    assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
}
