use super::*;

#[test]
fn disabled_laplacian_is_identity() {
    let img = ImageArray::new(2, 2, 1, vec![1, 2, 3, 4]).unwrap();
    assert_eq!(laplacian(&img, false), img);
}

#[test]
fn flat_regions_have_zero_response() {
    let img = ImageArray::filled(6, 6, 3, 90).unwrap();
    assert!(laplacian(&img, true).data().iter().all(|&v| v == 0));
    assert_eq!(sharpen(&img).unwrap(), img);
}

#[test]
fn single_spike_saturates_center() {
    let mut img = ImageArray::filled(5, 5, 1, 0).unwrap();
    img.set(2, 2, 0, 100);
    let out = laplacian(&img, true);
    // |-8 * 100| saturates.
    assert_eq!(out.get(2, 2, 0), 255);
    // Diagonal neighbours see 2 * 100.
    assert_eq!(out.get(1, 1, 0), 200);
    // Edge-adjacent neighbours have a zero tap.
    assert_eq!(out.get(1, 2, 0), 0);
}

#[test]
fn sharpen_boosts_a_lone_peak_per_channel() {
    let mut img = ImageArray::filled(5, 5, 3, 40).unwrap();
    img.set(2, 2, 1, 60);
    let out = sharpen(&img).unwrap();
    // 5 * 60 - 4 * 40 on the touched channel, untouched channels stay flat.
    assert_eq!(out.pixel(2, 2), &[40, 140, 40]);
    assert_eq!(out.get(1, 2, 1), 20);
    assert_eq!(out.get(0, 0, 1), 40);
}
