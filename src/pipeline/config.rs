use crate::foundation::error::{AugmentError, AugmentResult};
use crate::transform::{MAX_KERNEL_SIZE, Threshold};

/// Extent used when `random_transition` is enabled with a plain `true`.
pub const DEFAULT_TRANSITION_EXTENT: u32 = 5;
/// Extent used when `random_blank` is enabled with a plain `true`.
pub const DEFAULT_BLANK_EXTENT: u32 = 2;

/// Catalogue entries driven by [`PipelineConfig`], in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
    Rotate,
    RandomTransition,
    SpNoise,
    Binarize,
    MedianBlur,
    GaussianBlur,
    EqualizeHist,
    Laplacian,
    WarpPerspective,
    RandomBrightness,
    RandomBlank,
    RandomGamma,
    RandomChannelSwap,
    RandomSaturation,
    RandomHue,
}

impl StepKind {
    /// Fixed execution order of the static pipeline. Color-layout dependent steps come last.
    pub const ORDER: [StepKind; 15] = [
        StepKind::Rotate,
        StepKind::RandomTransition,
        StepKind::SpNoise,
        StepKind::Binarize,
        StepKind::MedianBlur,
        StepKind::GaussianBlur,
        StepKind::EqualizeHist,
        StepKind::Laplacian,
        StepKind::WarpPerspective,
        StepKind::RandomBrightness,
        StepKind::RandomBlank,
        StepKind::RandomGamma,
        StepKind::RandomChannelSwap,
        StepKind::RandomSaturation,
        StepKind::RandomHue,
    ];

    /// Canonical configuration key.
    pub fn name(self) -> &'static str {
        match self {
            StepKind::Rotate => "rotate",
            StepKind::RandomTransition => "random_transition",
            StepKind::SpNoise => "sp_noise",
            StepKind::Binarize => "binarize",
            StepKind::MedianBlur => "median_blur",
            StepKind::GaussianBlur => "gaussian_blur",
            StepKind::EqualizeHist => "equalize_hist",
            StepKind::Laplacian => "laplacian",
            StepKind::WarpPerspective => "warp_perspective",
            StepKind::RandomBrightness => "random_brightness",
            StepKind::RandomBlank => "random_blank",
            StepKind::RandomGamma => "random_gamma",
            StepKind::RandomChannelSwap => "random_channel_swap",
            StepKind::RandomSaturation => "random_saturation",
            StepKind::RandomHue => "random_hue",
        }
    }

    /// Resolve a configuration key. Case, `_` and `-` are ignored, so `medianBlur`,
    /// `median_blur` and `median-blur` are the same key.
    pub fn from_key(key: &str) -> Option<StepKind> {
        let folded: String = key
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        StepKind::ORDER
            .into_iter()
            .find(|k| k.name().replace('_', "") == folded)
    }
}

/// Per-call configuration of the static pipeline. Every field defaults to disabled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineConfig {
    /// Maximum rotation angle in degrees.
    pub rotate: Option<u32>,
    /// Maximum translation in pixels.
    pub random_transition: Option<u32>,
    /// Salt-and-pepper probability, kept only when inside `(0, 1)`.
    pub sp_noise: Option<f64>,
    pub binarize: Threshold,
    /// Maximum median kernel; `Some(0)` runs as an identity.
    pub median_blur: Option<u32>,
    /// Maximum Gaussian kernel; `Some(0)` runs as an identity.
    pub gaussian_blur: Option<u32>,
    pub equalize_hist: bool,
    pub laplacian: bool,
    pub warp_perspective: bool,
    pub random_brightness: bool,
    /// Maximum blank-band offset from the border.
    pub random_blank: Option<u32>,
    pub random_gamma: bool,
    pub random_channel_swap: bool,
    pub random_saturation: bool,
    pub random_hue: bool,
}

impl PipelineConfig {
    /// Everything disabled.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Mild geometric and tone jitter.
    pub fn light() -> Self {
        Self {
            rotate: Some(5),
            random_transition: Some(2),
            gaussian_blur: Some(2),
            random_brightness: true,
            ..Self::default()
        }
    }

    /// Aggressive augmentation for small datasets.
    pub fn heavy() -> Self {
        Self {
            rotate: Some(20),
            random_transition: Some(DEFAULT_TRANSITION_EXTENT),
            sp_noise: Some(0.02),
            median_blur: Some(3),
            warp_perspective: true,
            random_brightness: true,
            random_blank: Some(DEFAULT_BLANK_EXTENT),
            random_gamma: true,
            random_channel_swap: true,
            random_saturation: true,
            random_hue: true,
            ..Self::default()
        }
    }

    /// Parse a JSON object keyed by step name.
    ///
    /// Accepts the sentinel conventions `-1`, `false` and `null` for "disabled".
    pub fn from_value(value: &serde_json::Value) -> AugmentResult<Self> {
        let Some(obj) = value.as_object() else {
            return Err(AugmentError::configuration(
                "pipeline config must be a JSON object",
            ));
        };

        let mut cfg = Self::default();
        for (key, v) in obj {
            let Some(kind) = StepKind::from_key(key) else {
                return Err(AugmentError::configuration(format!(
                    "unknown pipeline step '{key}'"
                )));
            };
            match kind {
                StepKind::Rotate => cfg.rotate = parse_positive(kind, v)?,
                StepKind::RandomTransition => {
                    cfg.random_transition = parse_extent(kind, v, DEFAULT_TRANSITION_EXTENT)?
                }
                StepKind::SpNoise => cfg.sp_noise = parse_probability(kind, v)?,
                StepKind::Binarize => cfg.binarize = parse_threshold(v)?,
                StepKind::MedianBlur => cfg.median_blur = parse_kernel(kind, v)?,
                StepKind::GaussianBlur => cfg.gaussian_blur = parse_kernel(kind, v)?,
                StepKind::EqualizeHist => cfg.equalize_hist = parse_flag(kind, v)?,
                StepKind::Laplacian => cfg.laplacian = parse_flag(kind, v)?,
                StepKind::WarpPerspective => cfg.warp_perspective = parse_flag(kind, v)?,
                StepKind::RandomBrightness => cfg.random_brightness = parse_flag(kind, v)?,
                StepKind::RandomBlank => {
                    cfg.random_blank = parse_extent(kind, v, DEFAULT_BLANK_EXTENT)?
                }
                StepKind::RandomGamma => cfg.random_gamma = parse_flag(kind, v)?,
                StepKind::RandomChannelSwap => cfg.random_channel_swap = parse_flag(kind, v)?,
                StepKind::RandomSaturation => cfg.random_saturation = parse_flag(kind, v)?,
                StepKind::RandomHue => cfg.random_hue = parse_flag(kind, v)?,
            }
        }
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> AugmentResult<Self> {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| AugmentError::configuration(format!("invalid pipeline JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Whether `kind` will run (and draw randomness) under this configuration.
    pub fn is_enabled(&self, kind: StepKind) -> bool {
        match kind {
            StepKind::Rotate => self.rotate.is_some_and(|v| v > 0),
            StepKind::RandomTransition => self.random_transition.is_some(),
            StepKind::SpNoise => self.sp_noise.is_some_and(|p| p > 0.0 && p < 1.0),
            StepKind::Binarize => self.binarize != Threshold::Disabled,
            StepKind::MedianBlur => self.median_blur.is_some(),
            StepKind::GaussianBlur => self.gaussian_blur.is_some(),
            StepKind::EqualizeHist => self.equalize_hist,
            StepKind::Laplacian => self.laplacian,
            StepKind::WarpPerspective => self.warp_perspective,
            StepKind::RandomBrightness => self.random_brightness,
            StepKind::RandomBlank => self.random_blank.is_some(),
            StepKind::RandomGamma => self.random_gamma,
            StepKind::RandomChannelSwap => self.random_channel_swap,
            StepKind::RandomSaturation => self.random_saturation,
            StepKind::RandomHue => self.random_hue,
        }
    }

    /// Enabled steps in execution order.
    pub fn enabled_steps(&self) -> Vec<StepKind> {
        StepKind::ORDER
            .into_iter()
            .filter(|k| self.is_enabled(*k))
            .collect()
    }
}

fn is_off(v: &serde_json::Value) -> bool {
    v.is_null() || v.as_bool() == Some(false)
}

fn get_i64(kind: StepKind, v: &serde_json::Value) -> AugmentResult<i64> {
    v.as_i64().ok_or_else(|| {
        AugmentError::configuration(format!("'{}' expects an integer, got {v}", kind.name()))
    })
}

fn to_u32(kind: StepKind, n: i64) -> AugmentResult<u32> {
    u32::try_from(n).map_err(|_| {
        AugmentError::configuration(format!("'{}' value {n} is out of range", kind.name()))
    })
}

/// `> 0` enables, anything else disables.
fn parse_positive(kind: StepKind, v: &serde_json::Value) -> AugmentResult<Option<u32>> {
    if is_off(v) {
        return Ok(None);
    }
    let n = get_i64(kind, v)?;
    if n <= 0 {
        return Ok(None);
    }
    to_u32(kind, n).map(Some)
}

/// `-1` disables, `0..=MAX_KERNEL_SIZE` is the maximum kernel size.
fn parse_kernel(kind: StepKind, v: &serde_json::Value) -> AugmentResult<Option<u32>> {
    match parse_count(kind, v)? {
        Some(n) if n > MAX_KERNEL_SIZE => Err(AugmentError::configuration(format!(
            "'{}' must be at most {MAX_KERNEL_SIZE}, got {n}",
            kind.name()
        ))),
        other => Ok(other),
    }
}

/// `-1` disables, `0..` is the maximum.
fn parse_count(kind: StepKind, v: &serde_json::Value) -> AugmentResult<Option<u32>> {
    if is_off(v) {
        return Ok(None);
    }
    match get_i64(kind, v)? {
        -1 => Ok(None),
        n if n < 0 => Err(AugmentError::configuration(format!(
            "'{}' must be -1 or >= 0, got {n}",
            kind.name()
        ))),
        n => to_u32(kind, n).map(Some),
    }
}

/// Like [`parse_count`], plus `true` selects `default`.
fn parse_extent(kind: StepKind, v: &serde_json::Value, default: u32) -> AugmentResult<Option<u32>> {
    if v.as_bool() == Some(true) {
        return Ok(Some(default));
    }
    parse_count(kind, v)
}

fn parse_probability(kind: StepKind, v: &serde_json::Value) -> AugmentResult<Option<f64>> {
    if is_off(v) {
        return Ok(None);
    }
    let p = v.as_f64().ok_or_else(|| {
        AugmentError::configuration(format!("'{}' expects a number, got {v}", kind.name()))
    })?;
    Ok((p > 0.0 && p < 1.0).then_some(p))
}

fn parse_flag(kind: StepKind, v: &serde_json::Value) -> AugmentResult<bool> {
    if v.is_null() {
        return Ok(false);
    }
    v.as_bool().ok_or_else(|| {
        AugmentError::configuration(format!("'{}' expects a boolean, got {v}", kind.name()))
    })
}

fn parse_threshold(v: &serde_json::Value) -> AugmentResult<Threshold> {
    if is_off(v) {
        return Ok(Threshold::Disabled);
    }
    if let Some(arr) = v.as_array() {
        if arr.len() != 2 {
            return Err(AugmentError::configuration(format!(
                "'binarize' range must be [low, high], got {} elements",
                arr.len()
            )));
        }
        let lo = get_i64(StepKind::Binarize, &arr[0])?;
        let hi = get_i64(StepKind::Binarize, &arr[1])?;
        if lo > hi {
            return Err(AugmentError::configuration(format!(
                "'binarize' range [{lo}, {hi}] has low > high"
            )));
        }
        return Ok(Threshold::Range(lo, hi));
    }
    Ok(Threshold::Fixed(get_i64(StepKind::Binarize, v)?))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
