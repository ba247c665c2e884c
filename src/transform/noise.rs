use rand::Rng;

use crate::foundation::image::ImageArray;
use crate::foundation::rng::coin;

/// Salt-and-pepper noise. Runs only for `0 < probability < 1`.
///
/// One uniform draw per pixel: below `probability` the pixel turns black, above
/// `1 - probability` it turns white, otherwise it is kept. All channels of a pixel move together.
pub fn sp_noise<R: Rng + ?Sized>(image: &ImageArray, probability: f64, rng: &mut R) -> ImageArray {
    if !(probability > 0.0 && probability < 1.0) {
        return image.clone();
    }
    let upper = 1.0 - probability;
    let mut out = image.clone();
    for px in out.data_mut().chunks_exact_mut(image.channels()) {
        let r: f64 = rng.random();
        if r < probability {
            px.fill(0);
        } else if r > upper {
            px.fill(255);
        }
    }
    out
}

/// Copying form of [`random_blank_in_place`].
pub fn random_blank<R: Rng + ?Sized>(image: &ImageArray, max_extent: u32, rng: &mut R) -> ImageArray {
    let mut out = image.clone();
    random_blank_in_place(&mut out, max_extent, rng);
    out
}

/// Paint one full row and one full column, each `[0, max_extent]` pixels in from the top/left or
/// bottom/right edge, with 255 or a randomly chosen 255/0 value.
pub fn random_blank_in_place<R: Rng + ?Sized>(image: &mut ImageArray, max_extent: u32, rng: &mut R) {
    let extent_w = i64::from(rng.random_range(0..=max_extent));
    let extent_h = i64::from(rng.random_range(0..=max_extent));

    let row = if coin(rng) { -extent_h } else { extent_h };
    let row_fallback = if coin(rng) { 255 } else { 0 };
    let col = if coin(rng) { -extent_w } else { extent_w };
    let col_fallback = if coin(rng) { 255 } else { 0 };
    let row_fill = if coin(rng) { 255 } else { row_fallback };
    let col_fill = if coin(rng) { 255 } else { col_fallback };

    let (h, w) = (image.height() as usize, image.width() as usize);
    let y = band_index(row, h);
    let x = band_index(col, w);
    let all_cols: Vec<usize> = (0..w).collect();
    let all_rows: Vec<usize> = (0..h).collect();
    let chans: Vec<usize> = (0..image.channels()).collect();
    image.fill_region(&[y], &all_cols, &chans, row_fill);
    image.fill_region(&all_rows, &[x], &chans, col_fill);
}

/// Python-style index: negatives count from the end; out-of-range values clamp to the axis.
fn band_index(i: i64, len: usize) -> usize {
    let len = len as i64;
    let i = if i < 0 { len + i } else { i };
    i.clamp(0, len - 1) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/transform/noise.rs"]
mod tests;
