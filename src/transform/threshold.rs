use rand::Rng;

use crate::foundation::error::{AugmentError, AugmentResult};
use crate::foundation::image::ImageArray;

/// Parameter domain of [`binarize`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Threshold {
    /// Leave the image untouched.
    #[default]
    Disabled,
    /// Fixed threshold; only values in `(0, 255)` are active.
    Fixed(i64),
    /// Threshold sampled uniformly from the inclusive range at call time.
    Range(i64, i64),
}

impl Threshold {
    /// Resolve the threshold for one call. `None` means disabled.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> AugmentResult<Option<i64>> {
        let t = match self {
            Self::Disabled => return Ok(None),
            Self::Fixed(v) => {
                if 0 < v && v < 255 {
                    v
                } else {
                    return Ok(None);
                }
            }
            Self::Range(lo, hi) => {
                if lo > hi {
                    return Err(AugmentError::configuration(format!(
                        "binarize range [{lo}, {hi}] has low > high"
                    )));
                }
                rng.random_range(lo..=hi)
            }
        };
        // -1 is the disabled sentinel even when it comes out of a range.
        Ok((t != -1).then_some(t))
    }
}

/// Global fixed-threshold binarization: samples above the threshold become 255, others 0.
pub fn binarize<R: Rng + ?Sized>(
    image: &ImageArray,
    threshold: Threshold,
    rng: &mut R,
) -> AugmentResult<ImageArray> {
    let Some(t) = threshold.resolve(rng)? else {
        return Ok(image.clone());
    };
    Ok(apply_threshold(image, t))
}

pub(crate) fn apply_threshold(image: &ImageArray, t: i64) -> ImageArray {
    image.map_samples(|v| if i64::from(v) > t { 255 } else { 0 })
}

#[cfg(test)]
#[path = "../../tests/unit/transform/threshold.rs"]
mod tests;
