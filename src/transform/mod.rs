//! Transform catalogue.
//!
//! Every operation is a pure function from the current buffer (plus parameters and an explicit
//! random source) to a new buffer. Keeping the result is the caller's decision; see
//! [`crate::TransformState`]. Disabled parameter values return the input unchanged and draw
//! nothing from the random source.

pub(crate) mod blur;
pub(crate) mod color;
pub(crate) mod edge;
pub(crate) mod geometric;
pub(crate) mod histogram;
pub(crate) mod noise;
pub(crate) mod threshold;

pub use blur::{MAX_KERNEL_SIZE, gaussian_blur, median_blur, sample_odd_kernel};
pub use color::{
    CHANNEL_PERMUTATIONS, DEFAULT_HUE_DELTA, bgr_to_gray, gamma_table, random_brightness,
    random_channel_swap, random_gamma, random_hue, random_saturation,
};
pub use edge::{laplacian, sharpen};
pub use geometric::{
    LARGE_ANGLES, PerspectiveDraw, flip_horizontal, flip_vertical, hconcat, pad,
    random_transition, resize, rotate, rotate_degrees, sample_angle, translate, vconcat,
    warp_perspective,
};
pub use histogram::equalize_hist;
pub use noise::{random_blank, random_blank_in_place, sp_noise};
pub use threshold::{Threshold, binarize};
