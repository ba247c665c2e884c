use crate::foundation::image::ImageArray;
use crate::foundation::math::round_u8;

/// Global histogram equalization. Color buffers are equalized channel by channel.
pub fn equalize_hist(image: &ImageArray, enabled: bool) -> ImageArray {
    if !enabled {
        return image.clone();
    }
    let ch = image.channels();
    let mut out = image.clone();
    for c in 0..ch {
        let lut = equalization_lut(image.data().iter().skip(c).step_by(ch).copied());
        for px in out.data_mut().chunks_exact_mut(ch) {
            px[c] = lut[usize::from(px[c])];
        }
    }
    out
}

/// Cumulative-histogram lookup table; the darkest occupied level maps to 0.
pub(crate) fn equalization_lut(samples: impl Iterator<Item = u8>) -> [u8; 256] {
    let mut hist = [0u64; 256];
    let mut total = 0u64;
    for v in samples {
        hist[usize::from(v)] += 1;
        total += 1;
    }

    let mut lut = [0u8; 256];
    let Some(first) = hist.iter().position(|&n| n != 0) else {
        return lut;
    };
    if hist[first] == total {
        // Constant plane: keep it as is.
        for (i, v) in lut.iter_mut().enumerate() {
            *v = i as u8;
        }
        return lut;
    }

    let scale = 255.0 / (total - hist[first]) as f64;
    let mut sum = 0u64;
    for i in first + 1..256 {
        sum += hist[i];
        lut[i] = round_u8(sum as f64 * scale);
    }
    lut
}

#[cfg(test)]
#[path = "../../tests/unit/transform/histogram.rs"]
mod tests;
