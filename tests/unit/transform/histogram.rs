use super::*;

#[test]
fn disabled_is_identity() {
    let img = ImageArray::new(1, 3, 1, vec![5, 6, 7]).unwrap();
    assert_eq!(equalize_hist(&img, false), img);
}

#[test]
fn stretches_narrow_range_to_full_scale() {
    let data: Vec<u8> = (0..64u8).map(|v| 100 + v % 4).collect();
    let img = ImageArray::new(8, 8, 1, data).unwrap();
    let out = equalize_hist(&img, true);
    let min = *out.data().iter().min().unwrap();
    let max = *out.data().iter().max().unwrap();
    assert_eq!(min, 0);
    assert_eq!(max, 255);
}

#[test]
fn constant_plane_is_unchanged() {
    let img = ImageArray::filled(4, 4, 3, 42).unwrap();
    assert_eq!(equalize_hist(&img, true), img);
}

#[test]
fn lut_is_monotone() {
    let lut = equalization_lut([3u8, 3, 10, 50, 50, 50, 200].into_iter());
    assert!(lut.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(lut[3], 0);
    assert_eq!(lut[200], 255);
}
