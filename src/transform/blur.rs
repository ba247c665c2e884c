use rand::Rng;

use crate::foundation::error::{AugmentError, AugmentResult};
use crate::foundation::image::ImageArray;
use crate::foundation::math::reflect_101;

/// Largest accepted `max_kernel` for the random blurs. Sampled kernels stay within
/// `MAX_KERNEL_SIZE + 1`.
pub const MAX_KERNEL_SIZE: u32 = 255;

/// Fixed taps OpenCV uses instead of the sigma formula for the smallest default kernels.
const SMALL_GAUSSIAN_TABLES: [&[f64]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Sample a kernel size uniformly in `[0, max_kernel]` and bump even values to the next odd one.
///
/// The result is always odd and lies in `[1, max_kernel + 1]`.
pub fn sample_odd_kernel<R: Rng + ?Sized>(max_kernel: u32, rng: &mut R) -> u32 {
    let k = rng.random_range(0..=max_kernel);
    if k % 2 == 0 { k + 1 } else { k }
}

/// Median filter with a randomly sized square window. `max_kernel == 0` is a no-op.
pub fn median_blur<R: Rng + ?Sized>(
    image: &ImageArray,
    max_kernel: u32,
    rng: &mut R,
) -> AugmentResult<ImageArray> {
    if max_kernel == 0 {
        return Ok(image.clone());
    }
    check_max_kernel(max_kernel)?;
    let k = sample_odd_kernel(max_kernel, rng);
    median_filter(image, k)
}

/// Gaussian smoothing with a randomly sized square kernel. `max_kernel == 0` is a no-op.
pub fn gaussian_blur<R: Rng + ?Sized>(
    image: &ImageArray,
    max_kernel: u32,
    rng: &mut R,
) -> AugmentResult<ImageArray> {
    if max_kernel == 0 {
        return Ok(image.clone());
    }
    check_max_kernel(max_kernel)?;
    let k = sample_odd_kernel(max_kernel, rng);
    if k <= 1 {
        return Ok(image.clone());
    }
    let kernel = default_kernel_q16(k)?;
    Ok(separable(image, &kernel))
}

fn check_max_kernel(max_kernel: u32) -> AugmentResult<()> {
    if max_kernel > MAX_KERNEL_SIZE {
        return Err(AugmentError::configuration(format!(
            "max kernel size {max_kernel} exceeds {MAX_KERNEL_SIZE}"
        )));
    }
    Ok(())
}

fn check_ksize(ksize: u32) -> AugmentResult<()> {
    if ksize > MAX_KERNEL_SIZE + 1 {
        return Err(AugmentError::configuration(format!(
            "kernel size {ksize} exceeds {}",
            MAX_KERNEL_SIZE + 1
        )));
    }
    Ok(())
}

/// Sigma used when only a kernel size is given.
///
/// Kernels of 7 taps or fewer ignore it; see [`default_kernel_q16`].
pub fn default_sigma(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Q16 taps for a kernel size with no explicit sigma: the fixed binomial tables up to 7 taps,
/// the [`default_sigma`] Gaussian above that.
pub(crate) fn default_kernel_q16(ksize: u32) -> AugmentResult<Vec<u32>> {
    match SMALL_GAUSSIAN_TABLES.get((ksize / 2) as usize) {
        Some(table) if ksize % 2 == 1 => Ok(table.iter().map(|&w| (w * 65536.0) as u32).collect()),
        _ => gaussian_kernel_q16(ksize / 2, default_sigma(ksize)),
    }
}

/// Median over a `ksize x ksize` window per channel, edges replicated.
pub fn median_filter(image: &ImageArray, ksize: u32) -> AugmentResult<ImageArray> {
    if ksize <= 1 {
        return Ok(image.clone());
    }
    check_ksize(ksize)?;
    let r = ksize / 2;
    image.map_planes(
        |g| imageproc::filter::median_filter(g, r, r),
        |c| imageproc::filter::median_filter(c, r, r),
    )
}

/// Separable Gaussian with a `ksize`-tap kernel, reflect-101 borders.
pub fn gaussian_filter(image: &ImageArray, ksize: u32, sigma: f32) -> AugmentResult<ImageArray> {
    if ksize <= 1 {
        return Ok(image.clone());
    }
    check_ksize(ksize)?;
    let kernel = gaussian_kernel_q16(ksize / 2, sigma)?;
    Ok(separable(image, &kernel))
}

fn separable(image: &ImageArray, kernel: &[u32]) -> ImageArray {
    let mut tmp = image.zeros_like();
    let mut out = image.zeros_like();
    horizontal_pass(image, &mut tmp, kernel);
    vertical_pass(&tmp, &mut out, kernel);
    out
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> AugmentResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(AugmentError::configuration("blur sigma must be > 0"));
    }

    let r = i64::from(radius);
    let taps = usize::try_from(radius)
        .ok()
        .and_then(|v| v.checked_mul(2))
        .and_then(|v| v.checked_add(1))
        .ok_or_else(|| AugmentError::configuration("blur radius too large"))?;
    let mut weights_f = Vec::<f64>::with_capacity(taps);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push the rounding residue into the center tap so the kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &ImageArray, dst: &mut ImageArray, k: &[u32]) {
    let radius = (k.len() / 2) as isize;
    let (h, w, ch) = (src.height() as usize, src.width() as usize, src.channels());
    for y in 0..h {
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0u64;
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = reflect_101(x as isize + ki as isize - radius, w);
                    acc += u64::from(kw) * u64::from(src.get(y, sx, c));
                }
                dst.set(y, x, c, q16_to_u8(acc));
            }
        }
    }
}

fn vertical_pass(src: &ImageArray, dst: &mut ImageArray, k: &[u32]) {
    let radius = (k.len() / 2) as isize;
    let (h, w, ch) = (src.height() as usize, src.width() as usize, src.channels());
    for y in 0..h {
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0u64;
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = reflect_101(y as isize + ki as isize - radius, h);
                    acc += u64::from(kw) * u64::from(src.get(sy, x, c));
                }
                dst.set(y, x, c, q16_to_u8(acc));
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/transform/blur.rs"]
mod tests;
