use std::fmt;

use crate::foundation::image::ImageArray;
use crate::script::error::ScriptError;

/// Runtime value of the step language.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Bool(bool),
    Image(ImageArray),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Num(_) => "number",
            Self::Bool(_) => "bool",
            Self::Image(_) => "image",
        }
    }

    pub fn as_f64(&self) -> Result<f64, ScriptError> {
        match self {
            Self::Num(v) => Ok(*v),
            other => Err(ScriptError::msg(format!(
                "expected number, got {}",
                other.type_name()
            ))),
        }
    }

    /// Whole number; fractional or non-finite values are rejected.
    pub fn as_i64(&self) -> Result<i64, ScriptError> {
        let v = self.as_f64()?;
        if !v.is_finite() || v.fract() != 0.0 || v.abs() > 9.0e15 {
            return Err(ScriptError::msg(format!("expected an integer, got {v}")));
        }
        Ok(v as i64)
    }

    pub fn as_bool(&self) -> Result<bool, ScriptError> {
        match self {
            Self::Bool(v) => Ok(*v),
            other => Err(ScriptError::msg(format!(
                "expected bool, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn as_image(&self) -> Result<&ImageArray, ScriptError> {
        match self {
            Self::Image(img) => Ok(img),
            other => Err(ScriptError::msg(format!(
                "expected image, got {}",
                other.type_name()
            ))),
        }
    }

    /// Take the image out, handing the value back on mismatch.
    pub fn into_image(self) -> Result<ImageArray, Value> {
        match self {
            Self::Image(img) => Ok(img),
            other => Err(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Image(img) => {
                let (h, w, c) = img.shape();
                write!(f, "image({h}x{w}x{c})")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Num(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<ImageArray> for Value {
    fn from(v: ImageArray) -> Self {
        Self::Image(v)
    }
}
