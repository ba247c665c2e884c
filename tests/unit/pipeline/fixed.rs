use super::*;
use crate::foundation::rng::{CountingRng, seeded_rng};
use crate::transform::Threshold;

fn noisy(h: u32, w: u32, c: usize) -> ImageArray {
    let data = (0..h as usize * w as usize * c)
        .map(|i| ((i * 37 + i / 7) % 251) as u8)
        .collect();
    ImageArray::new(h, w, c, data).unwrap()
}

#[test]
fn disabled_pipeline_is_identity_without_draws() {
    let img = noisy(12, 9, 3);
    let mut rng = CountingRng::new(seeded_rng(5));
    let out = StaticPipeline::default().run(&img, &mut rng).unwrap();
    assert_eq!(out, img);
    assert_eq!(rng.draws(), 0);
}

#[test]
fn fixed_binarize_whitens_mid_gray() {
    let img = ImageArray::filled(64, 64, 3, 128).unwrap();
    let cfg = PipelineConfig {
        binarize: Threshold::Fixed(100),
        ..PipelineConfig::default()
    };
    let out = StaticPipeline::new(cfg).run(&img, &mut seeded_rng(0)).unwrap();
    assert_eq!(out.shape(), (64, 64, 3));
    assert!(out.data().iter().all(|&v| v == 255));
}

#[test]
fn zero_kernel_blurs_are_identity() {
    let img = noisy(10, 10, 1);
    let cfg = PipelineConfig {
        median_blur: Some(0),
        gaussian_blur: Some(0),
        ..PipelineConfig::default()
    };
    let mut rng = CountingRng::new(seeded_rng(1));
    let out = StaticPipeline::new(cfg).run(&img, &mut rng).unwrap();
    assert_eq!(out, img);
    assert_eq!(rng.draws(), 0);
}

#[test]
fn key_order_does_not_change_result() {
    let a = PipelineConfig::from_json_str(
        r#"{"random_hue": true, "laplacian": true, "rotate": 10, "median_blur": 3}"#,
    )
    .unwrap();
    let b = PipelineConfig::from_json_str(
        r#"{"median_blur": 3, "rotate": 10, "laplacian": true, "random_hue": true}"#,
    )
    .unwrap();
    let img = noisy(20, 24, 3);
    let out_a = StaticPipeline::new(a).run(&img, &mut seeded_rng(42)).unwrap();
    let out_b = StaticPipeline::new(b).run(&img, &mut seeded_rng(42)).unwrap();
    assert_eq!(out_a, out_b);
}

#[test]
fn same_seed_same_output() {
    let pipeline = StaticPipeline::new(PipelineConfig::heavy());
    let img = noisy(32, 40, 3);
    let a = pipeline.run(&img, &mut seeded_rng(9)).unwrap();
    let b = pipeline.run(&img, &mut seeded_rng(9)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.shape(), img.shape());
}

#[test]
fn heavy_preset_runs_on_grayscale() {
    let img = noisy(30, 30, 1);
    let out = StaticPipeline::new(PipelineConfig::heavy())
        .run(&img, &mut seeded_rng(3))
        .unwrap();
    assert_eq!(out.shape(), (30, 30, 1));
}

#[test]
fn input_is_never_mutated() {
    let img = noisy(16, 16, 3);
    let before = img.clone();
    let cfg = PipelineConfig {
        random_blank: Some(2),
        ..PipelineConfig::default()
    };
    let out = StaticPipeline::new(cfg).run(&img, &mut seeded_rng(2)).unwrap();
    assert_eq!(img, before);
    assert_ne!(out, img);
}

#[test]
fn hue_only_touches_first_channel() {
    let img = noisy(8, 8, 3);
    let cfg = PipelineConfig {
        random_hue: true,
        ..PipelineConfig::default()
    };
    let out = StaticPipeline::new(cfg).run(&img, &mut seeded_rng(4)).unwrap();
    for (a, b) in img.data().chunks_exact(3).zip(out.data().chunks_exact(3)) {
        assert_eq!(a[1..], b[1..]);
    }
}
