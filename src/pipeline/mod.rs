//! Static and dynamic augmentation pipelines.

pub(crate) mod config;
pub(crate) mod dynamic;
pub(crate) mod fixed;
pub(crate) mod state;

pub use config::{DEFAULT_BLANK_EXTENT, DEFAULT_TRANSITION_EXTENT, PipelineConfig, StepKind};
pub use dynamic::{
    DynamicPipeline, DynamicPipelineConfig, EXPRESSION_PREFIX, SOURCE_SYMBOL, STATEMENT_PREFIX,
    WORKING_SYMBOL,
};
pub use fixed::StaticPipeline;
pub use state::TransformState;
