use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::foundation::error::{AugmentError, AugmentResult};
use crate::foundation::image::ImageArray;
use crate::foundation::math::trunc_u8;
use crate::pipeline::config::{DEFAULT_BLANK_EXTENT, DEFAULT_TRANSITION_EXTENT};
use crate::script::error::ScriptError;
use crate::script::value::Value;
use crate::transform::{self, Threshold};

/// Native function callable from step bodies.
pub type NativeFn =
    Arc<dyn Fn(&mut CallCtx<'_>, &[Value]) -> Result<Value, ScriptError> + Send + Sync>;

/// Per-call context handed to native functions.
pub struct CallCtx<'a> {
    rng: &'a mut dyn RngCore,
}

impl<'a> CallCtx<'a> {
    pub(crate) fn new(rng: &'a mut dyn RngCore) -> Self {
        Self { rng }
    }

    /// Random source of the current pipeline invocation.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }
}

/// Name -> function table consulted by the interpreter. Only registered names are callable.
#[derive(Clone)]
pub struct FunctionRegistry {
    fns: BTreeMap<String, NativeFn>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.fns.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FunctionRegistry {
    /// No functions at all.
    pub fn empty() -> Self {
        Self {
            fns: BTreeMap::new(),
        }
    }

    /// Transform catalogue, image helpers, numeric helpers and `trace`.
    pub fn standard() -> Self {
        let mut r = Self::empty();
        register_catalogue(&mut r);
        register_image_helpers(&mut r);
        register_numeric(&mut r);
        r.register("trace", |_, args| {
            arity("trace", args, 1, 1)?;
            tracing::debug!(value = %args[0], "trace");
            Ok(args[0].clone())
        });
        r
    }

    /// Add or replace a function.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut CallCtx<'_>, &[Value]) -> Result<Value, ScriptError> + Send + Sync + 'static,
    {
        self.fns.insert(name.into(), Arc::new(f));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fns.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fns.keys().map(String::as_str)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&NativeFn> {
        self.fns.get(name)
    }
}

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), ScriptError> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        format!("{min}")
    } else {
        format!("{min} to {max}")
    };
    Err(ScriptError::msg(format!(
        "{name} expects {expected} args, got {}",
        args.len()
    )))
}

fn image(args: &[Value], i: usize) -> Result<&ImageArray, ScriptError> {
    args[i]
        .as_image()
        .map_err(|e| ScriptError::msg(format!("arg {}: {}", i + 1, e.message())))
}

fn num(args: &[Value], i: usize) -> Result<f64, ScriptError> {
    args[i]
        .as_f64()
        .map_err(|e| ScriptError::msg(format!("arg {}: {}", i + 1, e.message())))
}

fn int(args: &[Value], i: usize) -> Result<i64, ScriptError> {
    args[i]
        .as_i64()
        .map_err(|e| ScriptError::msg(format!("arg {}: {}", i + 1, e.message())))
}

fn uint(args: &[Value], i: usize) -> Result<u32, ScriptError> {
    let v = int(args, i)?;
    u32::try_from(v).map_err(|_| ScriptError::msg(format!("arg {}: {v} is out of range", i + 1)))
}

/// Optional extent argument: absent selects `default`, negative disables.
fn extent(args: &[Value], i: usize, default: u32) -> Result<Option<u32>, ScriptError> {
    if args.len() <= i {
        return Ok(Some(default));
    }
    let v = int(args, i)?;
    if v < 0 {
        return Ok(None);
    }
    uint(args, i).map(Some)
}

fn lift(e: AugmentError) -> ScriptError {
    ScriptError::msg(e.to_string())
}

fn image_value(r: Result<ImageArray, AugmentError>) -> Result<Value, ScriptError> {
    r.map(Value::Image).map_err(lift)
}

/// `name(img)` for a transform that only needs the random source.
fn register_unary_random(
    r: &mut FunctionRegistry,
    name: &'static str,
    op: fn(&ImageArray, &mut dyn RngCore) -> ImageArray,
) {
    r.register(name, move |ctx, args| {
        arity(name, args, 1, 1)?;
        Ok(Value::Image(op(image(args, 0)?, ctx.rng())))
    });
}

/// `name(img)` for a deterministic transform.
fn register_unary(
    r: &mut FunctionRegistry,
    name: &'static str,
    op: fn(&ImageArray) -> AugmentResult<ImageArray>,
) {
    r.register(name, move |_, args| {
        arity(name, args, 1, 1)?;
        image_value(op(image(args, 0)?))
    });
}

fn register_catalogue(r: &mut FunctionRegistry) {
    r.register("binarize", |ctx, args| {
        arity("binarize", args, 2, 3)?;
        let threshold = if args.len() == 3 {
            Threshold::Range(int(args, 1)?, int(args, 2)?)
        } else {
            Threshold::Fixed(int(args, 1)?)
        };
        image_value(transform::binarize(image(args, 0)?, threshold, ctx.rng()))
    });
    r.register("median_blur", |ctx, args| {
        arity("median_blur", args, 2, 2)?;
        let img = image(args, 0)?;
        match extent(args, 1, 0)? {
            Some(k) => image_value(transform::median_blur(img, k, ctx.rng())),
            None => Ok(Value::Image(img.clone())),
        }
    });
    r.register("gaussian_blur", |ctx, args| {
        arity("gaussian_blur", args, 2, 2)?;
        let img = image(args, 0)?;
        match extent(args, 1, 0)? {
            Some(k) => image_value(transform::gaussian_blur(img, k, ctx.rng())),
            None => Ok(Value::Image(img.clone())),
        }
    });
    register_unary(r, "equalize_hist", |img| Ok(transform::equalize_hist(img, true)));
    register_unary(r, "laplacian", |img| Ok(transform::laplacian(img, true)));
    r.register("rotate", |ctx, args| {
        arity("rotate", args, 2, 2)?;
        let img = image(args, 0)?;
        let max = int(args, 1)?;
        if max <= 0 {
            return Ok(Value::Image(img.clone()));
        }
        image_value(transform::rotate(img, uint(args, 1)?, ctx.rng()))
    });
    r.register("warp_perspective", |ctx, args| {
        arity("warp_perspective", args, 1, 1)?;
        image_value(transform::warp_perspective(image(args, 0)?, ctx.rng()))
    });
    r.register("sp_noise", |ctx, args| {
        arity("sp_noise", args, 2, 2)?;
        Ok(Value::Image(transform::sp_noise(
            image(args, 0)?,
            num(args, 1)?,
            ctx.rng(),
        )))
    });
    register_unary_random(r, "random_brightness", |img, rng| {
        transform::random_brightness(img, rng)
    });
    register_unary_random(r, "random_saturation", |img, rng| {
        transform::random_saturation(img, rng)
    });
    register_unary_random(r, "random_gamma", |img, rng| transform::random_gamma(img, rng));
    register_unary_random(r, "random_channel_swap", |img, rng| {
        transform::random_channel_swap(img, rng)
    });
    r.register("random_hue", |ctx, args| {
        arity("random_hue", args, 1, 2)?;
        let delta = if args.len() == 2 {
            num(args, 1)?
        } else {
            transform::DEFAULT_HUE_DELTA
        };
        Ok(Value::Image(transform::random_hue(
            image(args, 0)?,
            delta,
            ctx.rng(),
        )))
    });
    r.register("random_blank", |ctx, args| {
        arity("random_blank", args, 1, 2)?;
        let img = image(args, 0)?;
        match extent(args, 1, DEFAULT_BLANK_EXTENT)? {
            Some(max) => Ok(Value::Image(transform::random_blank(img, max, ctx.rng()))),
            None => Ok(Value::Image(img.clone())),
        }
    });
    r.register("random_transition", |ctx, args| {
        arity("random_transition", args, 1, 2)?;
        let img = image(args, 0)?;
        match extent(args, 1, DEFAULT_TRANSITION_EXTENT)? {
            Some(max) => image_value(transform::random_transition(img, max, ctx.rng())),
            None => Ok(Value::Image(img.clone())),
        }
    });
}

fn register_image_helpers(r: &mut FunctionRegistry) {
    register_unary(r, "sharpen", transform::sharpen);
    register_unary(r, "hflip", transform::flip_horizontal);
    register_unary(r, "vflip", transform::flip_vertical);
    r.register("gray", |_, args| {
        arity("gray", args, 1, 1)?;
        image_value(transform::bgr_to_gray(image(args, 0)?))
    });
    r.register("resize", |_, args| {
        arity("resize", args, 3, 3)?;
        image_value(transform::resize(image(args, 0)?, uint(args, 1)?, uint(args, 2)?))
    });
    r.register("pad", |_, args| {
        arity("pad", args, 5, 6)?;
        let value = if args.len() == 6 {
            trunc_u8(num(args, 5)?)
        } else {
            0
        };
        image_value(transform::pad(
            image(args, 0)?,
            uint(args, 1)?,
            uint(args, 2)?,
            uint(args, 3)?,
            uint(args, 4)?,
            value,
        ))
    });
    r.register("hconcat", |_, args| {
        arity("hconcat", args, 2, 2)?;
        image_value(transform::hconcat(image(args, 0)?, image(args, 1)?))
    });
    r.register("vconcat", |_, args| {
        arity("vconcat", args, 2, 2)?;
        image_value(transform::vconcat(image(args, 0)?, image(args, 1)?))
    });
    r.register("full", |_, args| {
        arity("full", args, 4, 4)?;
        let channels = uint(args, 2)? as usize;
        image_value(ImageArray::filled(
            uint(args, 0)?,
            uint(args, 1)?,
            channels,
            trunc_u8(num(args, 3)?),
        ))
    });
    r.register("height", |_, args| {
        arity("height", args, 1, 1)?;
        Ok(Value::Num(f64::from(image(args, 0)?.height())))
    });
    r.register("width", |_, args| {
        arity("width", args, 1, 1)?;
        Ok(Value::Num(f64::from(image(args, 0)?.width())))
    });
    r.register("channels", |_, args| {
        arity("channels", args, 1, 1)?;
        Ok(Value::Num(image(args, 0)?.channels() as f64))
    });
}

fn register_numeric(r: &mut FunctionRegistry) {
    r.register("abs", |_, args| {
        arity("abs", args, 1, 1)?;
        Ok(Value::Num(num(args, 0)?.abs()))
    });
    r.register("min", |_, args| {
        arity("min", args, 2, 2)?;
        Ok(Value::Num(num(args, 0)?.min(num(args, 1)?)))
    });
    r.register("max", |_, args| {
        arity("max", args, 2, 2)?;
        Ok(Value::Num(num(args, 0)?.max(num(args, 1)?)))
    });
    r.register("clamp", |_, args| {
        arity("clamp", args, 3, 3)?;
        let (x, lo, hi) = (num(args, 0)?, num(args, 1)?, num(args, 2)?);
        if lo > hi {
            return Err(ScriptError::msg(format!("clamp bounds [{lo}, {hi}] are inverted")));
        }
        Ok(Value::Num(x.clamp(lo, hi)))
    });
    r.register("randint", |ctx, args| {
        arity("randint", args, 2, 2)?;
        let (lo, hi) = (int(args, 0)?, int(args, 1)?);
        if lo > hi {
            return Err(ScriptError::msg(format!("randint range [{lo}, {hi}] is empty")));
        }
        Ok(Value::Num(ctx.rng().random_range(lo..=hi) as f64))
    });
    r.register("uniform", |ctx, args| {
        arity("uniform", args, 2, 2)?;
        let (lo, hi) = (num(args, 0)?, num(args, 1)?);
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(ScriptError::msg(format!("uniform range [{lo}, {hi}) is invalid")));
        }
        if lo == hi {
            return Ok(Value::Num(lo));
        }
        Ok(Value::Num(ctx.rng().random_range(lo..hi)))
    });
    r.register("coin", |ctx, args| {
        arity("coin", args, 0, 0)?;
        Ok(Value::Bool(ctx.rng().random::<bool>()))
    });
}

#[cfg(test)]
#[path = "../../tests/unit/script/builtins.rs"]
mod tests;
