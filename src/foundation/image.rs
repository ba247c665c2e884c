use std::path::Path;

use anyhow::Context as _;
use image::{DynamicImage, GrayImage, RgbImage};

use crate::foundation::error::{AugmentError, AugmentResult};

/// Dense row-major `height x width x channels` array of 8-bit samples.
///
/// `channels` is 1 (grayscale) or 3 (color). The color layout (RGB or BGR) is not tracked;
/// callers keep track of which one they hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageArray {
    height: u32,
    width: u32,
    channels: usize,
    data: Vec<u8>,
}

impl ImageArray {
    /// Wrap an existing sample vector, validating its length against the shape.
    pub fn new(height: u32, width: u32, channels: usize, data: Vec<u8>) -> AugmentResult<Self> {
        let expected = checked_len(height, width, channels)?;
        if data.len() != expected {
            return Err(AugmentError::buffer(format!(
                "expected {expected} samples for {height}x{width}x{channels}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Create an array with every sample set to `value`.
    pub fn filled(height: u32, width: u32, channels: usize, value: u8) -> AugmentResult<Self> {
        let len = checked_len(height, width, channels)?;
        Ok(Self {
            height,
            width,
            channels,
            data: vec![value; len],
        })
    }

    /// Zeroed array with the same shape as `self`.
    pub(crate) fn zeros_like(&self) -> Self {
        Self {
            height: self.height,
            width: self.width,
            channels: self.channels,
            data: vec![0; self.data.len()],
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `true` for 3-channel buffers.
    pub fn is_color(&self) -> bool {
        self.channels == 3
    }

    /// `(height, width, channels)`.
    pub fn shape(&self) -> (u32, u32, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub(crate) fn offset(&self, y: usize, x: usize, c: usize) -> usize {
        (y * self.width as usize + x) * self.channels + c
    }

    /// Sample at `(y, x, c)`. Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, y: usize, x: usize, c: usize) -> u8 {
        self.data[self.offset(y, x, c)]
    }

    #[inline]
    pub fn set(&mut self, y: usize, x: usize, c: usize, v: u8) {
        let i = self.offset(y, x, c);
        self.data[i] = v;
    }

    /// All channels of the pixel at `(y, x)`.
    pub fn pixel(&self, y: usize, x: usize) -> &[u8] {
        let i = self.offset(y, x, 0);
        &self.data[i..i + self.channels]
    }

    pub fn pixel_mut(&mut self, y: usize, x: usize) -> &mut [u8] {
        let i = self.offset(y, x, 0);
        let n = self.channels;
        &mut self.data[i..i + n]
    }

    /// Apply `f` to every sample.
    pub fn map_samples(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            height: self.height,
            width: self.width,
            channels: self.channels,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Apply `f` to every sample of channel `c`, leaving the other channels untouched.
    pub fn map_channel(&self, c: usize, f: impl Fn(u8) -> u8) -> Self {
        let mut out = self.clone();
        for px in out.data.chunks_exact_mut(self.channels) {
            px[c] = f(px[c]);
        }
        out
    }

    /// Reorder (or select) channels. The result must have 1 or 3 channels.
    pub fn select_channels(&self, order: &[usize]) -> AugmentResult<Self> {
        if order.iter().any(|&c| c >= self.channels) {
            return Err(AugmentError::buffer(format!(
                "channel selection {order:?} out of range for {} channels",
                self.channels
            )));
        }
        self.gather(
            &(0..self.height as usize).collect::<Vec<_>>(),
            &(0..self.width as usize).collect::<Vec<_>>(),
            order,
        )
    }

    /// RGB <-> BGR conversion. 1-channel buffers are returned unchanged.
    pub fn swap_red_blue(&self) -> Self {
        if !self.is_color() {
            return self.clone();
        }
        let mut out = self.clone();
        for px in out.data.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        out
    }

    /// Build a new array from the cartesian product of row, column and channel indices.
    pub fn gather(&self, rows: &[usize], cols: &[usize], chans: &[usize]) -> AugmentResult<Self> {
        let h = u32::try_from(rows.len())
            .map_err(|_| AugmentError::buffer("row selection too large"))?;
        let w = u32::try_from(cols.len())
            .map_err(|_| AugmentError::buffer("column selection too large"))?;
        let len = checked_len(h, w, chans.len())?;
        let mut data = Vec::with_capacity(len);
        for &y in rows {
            for &x in cols {
                let base = self.offset(y, x, 0);
                for &c in chans {
                    data.push(self.data[base + c]);
                }
            }
        }
        Self::new(h, w, chans.len(), data)
    }

    /// Set every selected sample to `value`.
    pub fn fill_region(&mut self, rows: &[usize], cols: &[usize], chans: &[usize], value: u8) {
        for &y in rows {
            for &x in cols {
                let base = self.offset(y, x, 0);
                for &c in chans {
                    self.data[base + c] = value;
                }
            }
        }
    }

    /// Copy `src` into the selected region. `src` must match the selection's shape.
    pub fn paste_region(
        &mut self,
        rows: &[usize],
        cols: &[usize],
        chans: &[usize],
        src: &Self,
    ) -> AugmentResult<()> {
        if src.height as usize != rows.len()
            || src.width as usize != cols.len()
            || src.channels != chans.len()
        {
            return Err(AugmentError::buffer(format!(
                "cannot paste {}x{}x{} into a {}x{}x{} region",
                src.height,
                src.width,
                src.channels,
                rows.len(),
                cols.len(),
                chans.len()
            )));
        }
        for (sy, &y) in rows.iter().enumerate() {
            for (sx, &x) in cols.iter().enumerate() {
                let base = self.offset(y, x, 0);
                for (sc, &c) in chans.iter().enumerate() {
                    self.data[base + c] = src.get(sy, sx, sc);
                }
            }
        }
        Ok(())
    }

    /// Convert a decoded image. 8-bit grayscale stays single-channel, everything else is
    /// converted to 8-bit RGB.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(g) => Self::from_gray(g.clone()),
            other => Self::from_rgb(other.to_rgb8()),
        }
    }

    pub fn from_gray(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            height,
            width,
            channels: 1,
            data: img.into_raw(),
        }
    }

    pub fn from_rgb(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            height,
            width,
            channels: 3,
            data: img.into_raw(),
        }
    }

    /// Decode an image file; channel handling follows [`ImageArray::from_dynamic`].
    pub fn open(path: impl AsRef<Path>) -> AugmentResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
        Ok(Self::from_dynamic(&img))
    }

    /// Encode to `path`. The format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> AugmentResult<()> {
        let path = path.as_ref();
        self.to_dynamic()?
            .save(path)
            .with_context(|| format!("write image '{}'", path.display()))?;
        Ok(())
    }

    /// Run an `image`/`imageproc` operation on the typed buffer matching the channel count.
    pub(crate) fn map_planes(
        &self,
        gray: impl FnOnce(&GrayImage) -> GrayImage,
        rgb: impl FnOnce(&RgbImage) -> RgbImage,
    ) -> AugmentResult<Self> {
        match self.to_dynamic()? {
            DynamicImage::ImageLuma8(img) => Ok(Self::from_gray(gray(&img))),
            DynamicImage::ImageRgb8(img) => Ok(Self::from_rgb(rgb(&img))),
            _ => Err(AugmentError::buffer("unexpected pixel layout")),
        }
    }

    /// Convert back into an `image` buffer for encoding.
    pub fn to_dynamic(&self) -> AugmentResult<DynamicImage> {
        let raw = self.data.clone();
        let img = if self.is_color() {
            RgbImage::from_raw(self.width, self.height, raw).map(DynamicImage::ImageRgb8)
        } else {
            GrayImage::from_raw(self.width, self.height, raw).map(DynamicImage::ImageLuma8)
        };
        img.ok_or_else(|| AugmentError::buffer("sample count does not match image dimensions"))
    }
}

fn checked_len(height: u32, width: u32, channels: usize) -> AugmentResult<usize> {
    if height == 0 || width == 0 {
        return Err(AugmentError::buffer(format!(
            "image dimensions must be non-zero, got {height}x{width}"
        )));
    }
    if channels != 1 && channels != 3 {
        return Err(AugmentError::buffer(format!(
            "images must have 1 or 3 channels, got {channels}"
        )));
    }
    (height as usize)
        .checked_mul(width as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| AugmentError::buffer("image buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/image.rs"]
mod tests;
