use rand::RngCore;

use crate::foundation::error::AugmentResult;
use crate::foundation::image::ImageArray;
use crate::pipeline::config::{PipelineConfig, StepKind};
use crate::pipeline::state::TransformState;
use crate::transform;

/// Runs the enabled catalogue entries of a [`PipelineConfig`] in [`StepKind::ORDER`].
///
/// The order is fixed, so the layout of the configuration source never changes the result.
#[derive(Clone, Debug, Default)]
pub struct StaticPipeline {
    config: PipelineConfig,
}

impl StaticPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Augment one image. Disabled steps are skipped and draw nothing from `rng`.
    #[tracing::instrument(skip(self, image, rng), fields(shape = ?image.shape()))]
    pub fn run(&self, image: &ImageArray, rng: &mut dyn RngCore) -> AugmentResult<ImageArray> {
        let mut state = TransformState::new(image.clone());
        for kind in self.config.enabled_steps() {
            tracing::debug!(step = kind.name(), "applying");
            self.apply_step(&mut state, kind, rng)?;
        }
        Ok(state.into_inner())
    }

    fn apply_step(
        &self,
        state: &mut TransformState,
        kind: StepKind,
        rng: &mut dyn RngCore,
    ) -> AugmentResult<()> {
        let cfg = &self.config;
        match kind {
            StepKind::Rotate => {
                let max = cfg.rotate.unwrap_or(0);
                state.apply(|img| transform::rotate(img, max, rng))
            }
            StepKind::RandomTransition => {
                let max = cfg.random_transition.unwrap_or(0);
                state.apply(|img| transform::random_transition(img, max, rng))
            }
            StepKind::SpNoise => {
                let p = cfg.sp_noise.unwrap_or(0.0);
                state.apply(|img| Ok(transform::sp_noise(img, p, rng)))
            }
            StepKind::Binarize => state.apply(|img| transform::binarize(img, cfg.binarize, rng)),
            StepKind::MedianBlur => {
                let max = cfg.median_blur.unwrap_or(0);
                state.apply(|img| transform::median_blur(img, max, rng))
            }
            StepKind::GaussianBlur => {
                let max = cfg.gaussian_blur.unwrap_or(0);
                state.apply(|img| transform::gaussian_blur(img, max, rng))
            }
            StepKind::EqualizeHist => state.apply(|img| Ok(transform::equalize_hist(img, true))),
            StepKind::Laplacian => state.apply(|img| Ok(transform::laplacian(img, true))),
            StepKind::WarpPerspective => state.apply(|img| transform::warp_perspective(img, rng)),
            StepKind::RandomBrightness => {
                state.apply(|img| Ok(transform::random_brightness(img, rng)))
            }
            StepKind::RandomBlank => {
                let max = cfg.random_blank.unwrap_or(0);
                state.apply_in_place(|img| transform::random_blank_in_place(img, max, rng));
                Ok(())
            }
            StepKind::RandomGamma => state.apply(|img| Ok(transform::random_gamma(img, rng))),
            StepKind::RandomChannelSwap => {
                state.apply(|img| Ok(transform::random_channel_swap(img, rng)))
            }
            StepKind::RandomSaturation => {
                state.apply(|img| Ok(transform::random_saturation(img, rng)))
            }
            StepKind::RandomHue => {
                state.apply(|img| Ok(transform::random_hue(img, transform::DEFAULT_HUE_DELTA, rng)))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/fixed.rs"]
mod tests;
