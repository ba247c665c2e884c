use crate::script::error::ScriptError;

/// Convenience result type used across the crate.
pub type AugmentResult<T> = Result<T, AugmentError>;

/// Top-level error type returned by transforms and pipelines.
#[derive(thiserror::Error, Debug)]
pub enum AugmentError {
    /// Malformed parameter domain or pipeline configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A named pipeline group does not exist.
    #[error("unknown pipeline group '{0}'")]
    UnknownGroup(String),

    /// A scripted step failed to parse or evaluate.
    #[error("script error in group '{group}' step {step}: {source}")]
    Script {
        /// Group the failing step belongs to.
        group: String,
        /// Zero-based position of the step inside its group.
        step: usize,
        /// Underlying parse/evaluation failure.
        #[source]
        source: ScriptError,
    },

    /// Invalid buffer construction or shape mismatch.
    #[error("buffer error: {0}")]
    Buffer(String),

    /// Degenerate geometric transform.
    #[error("transform error: {0}")]
    Transform(String),

    /// Wrapped foreign error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AugmentError {
    /// Build a [`AugmentError::Configuration`].
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`AugmentError::Buffer`].
    pub fn buffer(msg: impl Into<String>) -> Self {
        Self::Buffer(msg.into())
    }

    /// Build a [`AugmentError::Transform`].
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Attach step coordinates to a script failure.
    pub fn script(group: impl Into<String>, step: usize, source: ScriptError) -> Self {
        Self::Script {
            group: group.into(),
            step,
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
