use std::fmt;

/// Parse or evaluation failure inside a step body.
///
/// `offset` is a byte offset into the step body (after the `@@`/`$$` prefix).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    offset: usize,
    message: String,
}

impl ScriptError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    /// Error without a position, for native functions. The caller relocates it to the call site.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at byte {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ScriptError {}
