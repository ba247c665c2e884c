use image::GrayImage;

use crate::foundation::error::{AugmentError, AugmentResult};
use crate::foundation::image::ImageArray;
use crate::foundation::math::reflect_101;

/// 3x3-aperture Laplacian (second-derivative) kernel.
const LAPLACIAN_3X3: [[i32; 3]; 3] = [[2, 0, 2], [0, -8, 0], [2, 0, 2]];

/// Laplacian edge response, magnitude rescaled back to 8 bits. Disabled is a no-op.
pub fn laplacian(image: &ImageArray, enabled: bool) -> ImageArray {
    if !enabled {
        return image.clone();
    }
    convolve_3x3(image, &LAPLACIAN_3X3, |v| {
        // Signed 16-bit intermediate, then absolute value saturated to u8.
        let v = v.clamp(i32::from(i16::MIN), i32::from(i16::MAX));
        v.unsigned_abs().min(255) as u8
    })
}

/// Classic 3x3 sharpening kernel, applied to each channel on its own.
pub fn sharpen(image: &ImageArray) -> AugmentResult<ImageArray> {
    let ch = image.channels();
    let mut out = image.zeros_like();
    for c in 0..ch {
        let plane: Vec<u8> = image.data().iter().skip(c).step_by(ch).copied().collect();
        let plane = GrayImage::from_raw(image.width(), image.height(), plane)
            .ok_or_else(|| AugmentError::buffer("channel plane does not match image dimensions"))?;
        let sharp = imageproc::filter::sharpen3x3(&plane);
        for (dst, v) in out.data_mut().iter_mut().skip(c).step_by(ch).zip(sharp.into_raw()) {
            *dst = v;
        }
    }
    Ok(out)
}

fn convolve_3x3(image: &ImageArray, k: &[[i32; 3]; 3], finish: impl Fn(i32) -> u8) -> ImageArray {
    let (h, w, ch) = (
        image.height() as usize,
        image.width() as usize,
        image.channels(),
    );
    let mut out = image.zeros_like();
    for y in 0..h {
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0i32;
                for (ky, row) in k.iter().enumerate() {
                    let sy = reflect_101(y as isize + ky as isize - 1, h);
                    for (kx, &kw) in row.iter().enumerate() {
                        if kw == 0 {
                            continue;
                        }
                        let sx = reflect_101(x as isize + kx as isize - 1, w);
                        acc += kw * i32::from(image.get(sy, sx, c));
                    }
                }
                out.set(y, x, c, finish(acc));
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/transform/edge.rs"]
mod tests;
