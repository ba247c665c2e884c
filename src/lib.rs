//! Stochastic image augmentation for training-data pipelines.
//!
//! Two entry points share one transform catalogue:
//!
//! - [`StaticPipeline`] runs the enabled transforms of a [`PipelineConfig`] in a fixed order.
//! - [`DynamicPipeline`] picks one named group of scripted steps at random and evaluates it
//!   against the working buffer.
//!
//! All randomness comes from the `rng` argument of each call; seed it with [`seeded_rng`] for
//! reproducible output.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod pipeline;
pub(crate) mod script;
/// Transform catalogue.
pub mod transform;

pub use crate::foundation::error::{AugmentError, AugmentResult};
pub use crate::foundation::image::ImageArray;
pub use crate::foundation::rng::{CountingRng, rng_for, seeded_rng};

pub use crate::pipeline::{
    DEFAULT_BLANK_EXTENT, DEFAULT_TRANSITION_EXTENT, DynamicPipeline, DynamicPipelineConfig,
    EXPRESSION_PREFIX, PipelineConfig, SOURCE_SYMBOL, STATEMENT_PREFIX, StaticPipeline, StepKind,
    TransformState, WORKING_SYMBOL,
};
pub use crate::script::{CallCtx, FunctionRegistry, NativeFn, ScriptError, Value};
