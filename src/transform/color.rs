//! Tone and color perturbations.
//!
//! The saturation and hue operators work on channels 1 and 0 of a 3-channel buffer directly,
//! treating it as an HSV-like layout with hue in `[0, 180)`. Converting into that layout is the
//! caller's job. All channel-dependent operators are no-ops on single-channel buffers and consume
//! no randomness there.

use rand::Rng;

use crate::foundation::error::AugmentResult;
use crate::foundation::image::ImageArray;
use crate::foundation::math::{round_u8, trunc_u8};

/// Maximum absolute brightness offset.
pub const BRIGHTNESS_DELTA: f64 = 84.0;
/// Default hue shift bound.
pub const DEFAULT_HUE_DELTA: f64 = 18.0;
/// Hue domain size.
pub const HUE_PERIOD: f64 = 180.0;

/// The five non-identity permutations of three channels.
pub const CHANNEL_PERMUTATIONS: [[usize; 3]; 5] =
    [[0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

/// Add one random offset in `[-84, 84)` to every sample.
pub fn random_brightness<R: Rng + ?Sized>(image: &ImageArray, rng: &mut R) -> ImageArray {
    let beta = rng.random_range(-BRIGHTNESS_DELTA..BRIGHTNESS_DELTA);
    adjust_brightness(image, beta)
}

pub fn adjust_brightness(image: &ImageArray, beta: f64) -> ImageArray {
    image.map_samples(|v| trunc_u8(f64::from(v) + beta))
}

/// Scale channel 1 by a random factor in `[0.3, 2.0)`.
pub fn random_saturation<R: Rng + ?Sized>(image: &ImageArray, rng: &mut R) -> ImageArray {
    if !image.is_color() {
        return image.clone();
    }
    let factor = rng.random_range(0.3..2.0);
    image.map_channel(1, |v| trunc_u8(f64::from(v) * factor))
}

/// Shift channel 0 by a random delta in `[-max_delta, max_delta)`, wrapping into `[0, 180)`.
pub fn random_hue<R: Rng + ?Sized>(image: &ImageArray, max_delta: f64, rng: &mut R) -> ImageArray {
    if !image.is_color() {
        return image.clone();
    }
    let delta = if max_delta > 0.0 {
        rng.random_range(-max_delta..max_delta)
    } else {
        0.0
    };
    shift_hue(image, delta)
}

pub fn shift_hue(image: &ImageArray, delta: f64) -> ImageArray {
    image.map_channel(0, |v| {
        let h = (f64::from(v) + delta).rem_euclid(HUE_PERIOD) as u8;
        // rem_euclid can round up to the period itself for tiny negative inputs.
        if f64::from(h) >= HUE_PERIOD { 0 } else { h }
    })
}

/// Remap every sample through a power curve with a random gamma in `[0.25, 2.0)`.
pub fn random_gamma<R: Rng + ?Sized>(image: &ImageArray, rng: &mut R) -> ImageArray {
    if !image.is_color() {
        return image.clone();
    }
    let gamma = rng.random_range(0.25..2.0);
    let table = gamma_table(gamma);
    image.map_samples(|v| table[usize::from(v)])
}

/// `table[i] = round((i / 255)^(1 / gamma) * 255)`.
pub fn gamma_table(gamma: f64) -> [u8; 256] {
    let inv = 1.0 / gamma;
    let mut table = [0u8; 256];
    for (i, v) in table.iter_mut().enumerate() {
        *v = round_u8((i as f64 / 255.0).powf(inv) * 255.0);
    }
    table
}

/// Reorder channels with one of [`CHANNEL_PERMUTATIONS`], chosen uniformly.
pub fn random_channel_swap<R: Rng + ?Sized>(image: &ImageArray, rng: &mut R) -> ImageArray {
    if !image.is_color() {
        return image.clone();
    }
    let order = CHANNEL_PERMUTATIONS[rng.random_range(0..CHANNEL_PERMUTATIONS.len())];
    permute_channels(image, order)
}

pub fn permute_channels(image: &ImageArray, order: [usize; 3]) -> ImageArray {
    let mut out = image.clone();
    for (dst, src) in out
        .data_mut()
        .chunks_exact_mut(3)
        .zip(image.data().chunks_exact(3))
    {
        dst[0] = src[order[0]];
        dst[1] = src[order[1]];
        dst[2] = src[order[2]];
    }
    out
}

/// Luma of a BGR buffer as a single-channel image. Gray input is returned unchanged.
pub fn bgr_to_gray(image: &ImageArray) -> AugmentResult<ImageArray> {
    if !image.is_color() {
        return Ok(image.clone());
    }
    let data = image
        .data()
        .chunks_exact(3)
        .map(|px| {
            round_u8(0.114 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.299 * f64::from(px[2]))
        })
        .collect();
    ImageArray::new(image.height(), image.width(), 1, data)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/color.rs"]
mod tests;
