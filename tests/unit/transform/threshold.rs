use super::*;
use crate::foundation::rng::{CountingRng, seeded_rng};

fn gradient() -> ImageArray {
    let data: Vec<u8> = (0..=255u8).collect();
    ImageArray::new(16, 16, 1, data).unwrap()
}

#[test]
fn output_is_two_valued_and_matches_threshold() {
    let img = gradient();
    let mut rng = seeded_rng(1);
    let out = binarize(&img, Threshold::Fixed(100), &mut rng).unwrap();
    for (&a, &b) in img.data().iter().zip(out.data()) {
        assert!(b == 0 || b == 255);
        assert_eq!(b == 255, a > 100);
    }
}

#[test]
fn fixed_out_of_range_is_disabled_without_draws() {
    let img = gradient();
    for t in [0, 255, 300, -1, -5] {
        let mut rng = CountingRng::new(seeded_rng(1));
        let out = binarize(&img, Threshold::Fixed(t), &mut rng).unwrap();
        assert_eq!(out, img);
        assert_eq!(rng.draws(), 0);
    }
}

#[test]
fn disabled_consumes_no_randomness() {
    let img = gradient();
    let mut rng = CountingRng::new(seeded_rng(1));
    assert_eq!(binarize(&img, Threshold::Disabled, &mut rng).unwrap(), img);
    assert_eq!(rng.draws(), 0);
}

#[test]
fn range_samples_inside_bounds() {
    let mut rng = seeded_rng(9);
    for _ in 0..200 {
        let t = Threshold::Range(40, 60).resolve(&mut rng).unwrap().unwrap();
        assert!((40..=60).contains(&t));
    }
}

#[test]
fn inverted_range_is_a_configuration_error() {
    let mut rng = seeded_rng(1);
    let err = binarize(&gradient(), Threshold::Range(200, 100), &mut rng).unwrap_err();
    assert!(matches!(err, AugmentError::Configuration(_)));
}

#[test]
fn range_hitting_minus_one_is_disabled() {
    let mut rng = seeded_rng(1);
    assert_eq!(Threshold::Range(-1, -1).resolve(&mut rng).unwrap(), None);
}

#[test]
fn applies_per_channel_on_color() {
    let img = ImageArray::filled(64, 64, 3, 128).unwrap();
    let out = binarize(&img, Threshold::Fixed(100), &mut seeded_rng(0)).unwrap();
    assert_eq!(out.shape(), (64, 64, 3));
    assert!(out.data().iter().all(|&v| v == 255));
}
