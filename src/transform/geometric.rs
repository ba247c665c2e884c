use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Pixel};
use imageproc::geometric_transformations::Projection;
use kurbo::{Affine, Point};
use rand::Rng;

use crate::foundation::error::{AugmentError, AugmentResult};
use crate::foundation::image::ImageArray;
use crate::foundation::rng::coin;

/// Angles (degrees) picked on the "large rotation" branch of [`rotate`].
pub const LARGE_ANGLES: [i32; 20] = [
    -10, -20, -30, -45, -50, -60, -75, -90, -95, -100, 10, 20, 30, 45, 50, 60, 75, 90, 95, 100,
];

/// Rotate about the image center by a random angle on a same-size canvas.
///
/// Half the time the angle comes from [`LARGE_ANGLES`]; otherwise it is an integer drawn from
/// `[-max_angle, max_angle]` (negated). `max_angle == 0` is a no-op.
pub fn rotate<R: Rng + ?Sized>(
    image: &ImageArray,
    max_angle: u32,
    rng: &mut R,
) -> AugmentResult<ImageArray> {
    if max_angle == 0 {
        return Ok(image.clone());
    }
    let angle = sample_angle(max_angle, rng);
    rotate_degrees(image, angle as f64)
}

/// The angle [`rotate`] turns by, in degrees.
pub fn sample_angle<R: Rng + ?Sized>(max_angle: u32, rng: &mut R) -> i64 {
    if coin(rng) {
        i64::from(LARGE_ANGLES[rng.random_range(0..LARGE_ANGLES.len())])
    } else {
        let m = i64::from(max_angle);
        -rng.random_range(-m..=m)
    }
}

/// Counter-clockwise rotation about `(width / 2, height / 2)`, corners clipped, black fill.
pub fn rotate_degrees(image: &ImageArray, degrees: f64) -> AugmentResult<ImageArray> {
    let center = Point::new(
        f64::from(image.width() / 2),
        f64::from(image.height() / 2),
    );
    // y points down, so a counter-clockwise turn is a negative kurbo angle.
    let forward = Affine::rotate_about(-degrees.to_radians(), center);
    warp_affine(image, forward, 0)
}

/// Draws for [`warp_perspective`], in the order they are taken from the random source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveDraw {
    pub near: f32,
    pub side: f32,
    pub mid: f32,
    pub far: f32,
    /// Map the skewed quad onto the square instead of the other way round.
    pub swap: bool,
}

impl PerspectiveDraw {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let near = rng.random_range(3..=9u8);
        let side = rng.random_range(25..=30u8);
        let mid = rng.random_range(23..=27u8);
        let far = rng.random_range(33..=37u8);
        Self {
            near: f32::from(near),
            side: f32::from(side),
            mid: f32::from(mid),
            far: f32::from(far),
            swap: coin(rng),
        }
    }

    /// `(from, to)` control points of the forward (source -> destination) map.
    pub fn control_points(&self) -> ([(f32, f32); 4], [(f32, f32); 4]) {
        let Self {
            near,
            side,
            mid,
            far,
            swap,
        } = *self;
        let square = [(0.0, 0.0), (0.0, side), (side, side), (side, 0.0)];
        let skewed = [(near, 0.0), (-near, side), (mid, side), (far, 0.0)];
        if swap { (skewed, square) } else { (square, skewed) }
    }
}

/// Perspective warp between a reference square and a randomly perturbed quadrilateral.
pub fn warp_perspective<R: Rng + ?Sized>(
    image: &ImageArray,
    rng: &mut R,
) -> AugmentResult<ImageArray> {
    let (from, to) = PerspectiveDraw::sample(rng).control_points();
    // Sampling walks destination pixels, so solve for the destination -> source mapping.
    let inverse = Projection::from_control_points(to, from)
        .ok_or_else(|| AugmentError::transform("perspective control points are degenerate"))?;
    Ok(warp_with(image, 0, |x, y| {
        let (u, v) = inverse * (x as f32, y as f32);
        Some((f64::from(u), f64::from(v)))
    }))
}

/// Translate by a random offset, filling the exposed area with near-white or black.
pub fn random_transition<R: Rng + ?Sized>(
    image: &ImageArray,
    max_extent: u32,
    rng: &mut R,
) -> AugmentResult<ImageArray> {
    let dx = rng.random_range(0..=max_extent);
    let dy = rng.random_range(0..=max_extent);
    let light = rng.random_range(240..=255u8);
    let border = if coin(rng) { light } else { 0 };
    translate(image, f64::from(dx), f64::from(dy), border)
}

pub fn translate(image: &ImageArray, dx: f64, dy: f64, border: u8) -> AugmentResult<ImageArray> {
    warp_affine(image, Affine::translate((dx, dy)), border)
}

/// Warp with a forward (source -> destination) affine map onto a same-size canvas.
pub fn warp_affine(image: &ImageArray, forward: Affine, border: u8) -> AugmentResult<ImageArray> {
    if forward.determinant().abs() < 1e-12 {
        return Err(AugmentError::transform("affine map is not invertible"));
    }
    let inverse = forward.inverse();
    Ok(warp_with(image, border, |x, y| {
        let p = inverse * Point::new(x, y);
        Some((p.x, p.y))
    }))
}

/// Resample every destination pixel from `map(x, y)` in the source.
///
/// Bilinear with a constant border blended per tap, as OpenCV's `BORDER_CONSTANT` does.
/// `imageproc`'s `warp` drops a sample to the default pixel once any tap falls outside, which
/// darkens the last row and column of an otherwise exact shift.
fn warp_with(
    image: &ImageArray,
    border: u8,
    map: impl Fn(f64, f64) -> Option<(f64, f64)>,
) -> ImageArray {
    let (h, w, ch) = (
        image.height() as usize,
        image.width() as usize,
        image.channels(),
    );
    let mut out = image.zeros_like();
    for y in 0..h {
        for x in 0..w {
            let Some((sx, sy)) = map(x as f64, y as f64) else {
                for c in 0..ch {
                    out.set(y, x, c, border);
                }
                continue;
            };
            for c in 0..ch {
                out.set(y, x, c, sample_bilinear(image, sx, sy, c, border));
            }
        }
    }
    out
}

fn sample_bilinear(image: &ImageArray, sx: f64, sy: f64, c: usize, border: u8) -> u8 {
    if !sx.is_finite() || !sy.is_finite() {
        return border;
    }
    let (w, h) = (image.width() as i64, image.height() as i64);
    let x0f = sx.floor();
    let y0f = sy.floor();
    let fx = sx - x0f;
    let fy = sy - y0f;
    let (x0, y0) = (x0f as i64, y0f as i64);

    let at = |x: i64, y: i64| -> f64 {
        if x < 0 || y < 0 || x >= w || y >= h {
            f64::from(border)
        } else {
            f64::from(image.get(y as usize, x as usize, c))
        }
    };

    let top = at(x0, y0) * (1.0 - fx) + at(x0 + 1, y0) * fx;
    let bottom = at(x0, y0 + 1) * (1.0 - fx) + at(x0 + 1, y0 + 1) * fx;
    let v = top * (1.0 - fy) + bottom * fy;
    v.round().clamp(0.0, 255.0) as u8
}

/// Mirror left-right.
pub fn flip_horizontal(image: &ImageArray) -> AugmentResult<ImageArray> {
    image.map_planes(|g| imageops::flip_horizontal(g), |c| imageops::flip_horizontal(c))
}

/// Mirror top-bottom.
pub fn flip_vertical(image: &ImageArray) -> AugmentResult<ImageArray> {
    image.map_planes(|g| imageops::flip_vertical(g), |c| imageops::flip_vertical(c))
}

/// Bilinear (triangle filter) resize.
pub fn resize(image: &ImageArray, width: u32, height: u32) -> AugmentResult<ImageArray> {
    if width == 0 || height == 0 {
        return Err(AugmentError::buffer(format!(
            "resize target must be non-zero, got {width}x{height}"
        )));
    }
    image.map_planes(
        |g| imageops::resize(g, width, height, FilterType::Triangle),
        |c| imageops::resize(c, width, height, FilterType::Triangle),
    )
}

/// Surround the image with a constant border.
pub fn pad(
    image: &ImageArray,
    top: u32,
    bottom: u32,
    left: u32,
    right: u32,
    value: u8,
) -> AugmentResult<ImageArray> {
    let height = image
        .height()
        .checked_add(top)
        .and_then(|v| v.checked_add(bottom))
        .ok_or_else(|| AugmentError::buffer("padded height overflows"))?;
    let width = image
        .width()
        .checked_add(left)
        .and_then(|v| v.checked_add(right))
        .ok_or_else(|| AugmentError::buffer("padded width overflows"))?;
    let mut out = ImageArray::filled(height, width, image.channels(), value)?;
    let rows: Vec<usize> = (top as usize..(top + image.height()) as usize).collect();
    let cols: Vec<usize> = (left as usize..(left + image.width()) as usize).collect();
    let chans: Vec<usize> = (0..image.channels()).collect();
    out.paste_region(&rows, &cols, &chans, image)?;
    Ok(out)
}

/// Place `right` next to `left`. Heights and channel counts must match.
pub fn hconcat(left: &ImageArray, right: &ImageArray) -> AugmentResult<ImageArray> {
    if left.height() != right.height() || left.channels() != right.channels() {
        return Err(AugmentError::buffer(format!(
            "hconcat needs equal height and channels, got {:?} and {:?}",
            left.shape(),
            right.shape()
        )));
    }
    let width = left
        .width()
        .checked_add(right.width())
        .ok_or_else(|| AugmentError::buffer("concatenated width overflows"))?;
    concat(left, right, (width, left.height()), (i64::from(left.width()), 0))
}

/// Place `bottom` under `top`. Widths and channel counts must match.
pub fn vconcat(top: &ImageArray, bottom: &ImageArray) -> AugmentResult<ImageArray> {
    if top.width() != bottom.width() || top.channels() != bottom.channels() {
        return Err(AugmentError::buffer(format!(
            "vconcat needs equal width and channels, got {:?} and {:?}",
            top.shape(),
            bottom.shape()
        )));
    }
    let height = top
        .height()
        .checked_add(bottom.height())
        .ok_or_else(|| AugmentError::buffer("concatenated height overflows"))?;
    concat(top, bottom, (top.width(), height), (0, i64::from(top.height())))
}

fn concat(
    first: &ImageArray,
    second: &ImageArray,
    size: (u32, u32),
    at: (i64, i64),
) -> AugmentResult<ImageArray> {
    match (first.to_dynamic()?, second.to_dynamic()?) {
        (DynamicImage::ImageLuma8(a), DynamicImage::ImageLuma8(b)) => {
            Ok(ImageArray::from_gray(stack(&a, &b, size, at)))
        }
        (DynamicImage::ImageRgb8(a), DynamicImage::ImageRgb8(b)) => {
            Ok(ImageArray::from_rgb(stack(&a, &b, size, at)))
        }
        _ => Err(AugmentError::buffer("concatenated images must share a pixel layout")),
    }
}

fn stack<P: Pixel<Subpixel = u8>>(
    first: &ImageBuffer<P, Vec<u8>>,
    second: &ImageBuffer<P, Vec<u8>>,
    (width, height): (u32, u32),
    (x, y): (i64, i64),
) -> ImageBuffer<P, Vec<u8>> {
    let mut out = ImageBuffer::new(width, height);
    imageops::replace(&mut out, first, 0, 0);
    imageops::replace(&mut out, second, x, y);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/transform/geometric.rs"]
mod tests;
