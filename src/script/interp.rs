use std::borrow::Cow;
use std::collections::HashMap;

use rand::RngCore;

use crate::foundation::image::ImageArray;
use crate::foundation::math::trunc_u8;
use crate::script::ast::{BinaryOp, Expr, IndexArg, Lit, Stmt, UnaryOp};
use crate::script::builtins::{CallCtx, FunctionRegistry};
use crate::script::error::ScriptError;
use crate::script::slice::{full, resolve_index, resolve_slice};
use crate::script::value::Value;

/// Variables visible to the steps of one pipeline invocation.
pub(crate) type Scope = HashMap<String, Value>;

/// Tree-walking evaluator over a caller-owned scope.
pub(crate) struct Interpreter<'a> {
    registry: &'a FunctionRegistry,
    scope: &'a mut Scope,
    rng: &'a mut dyn RngCore,
}

/// Row, column and channel positions picked out by an index expression.
struct Selection {
    rows: Vec<usize>,
    cols: Vec<usize>,
    chans: Vec<usize>,
}

/// Evaluated index arguments, not yet resolved against a shape.
enum RawIndex {
    At(i64),
    Slice(Option<i64>, Option<i64>, Option<i64>),
}

fn resolve_selection(
    raw: &[RawIndex],
    shape: (u32, u32, usize),
    at: usize,
) -> Result<Selection, ScriptError> {
    let (h, w, c) = shape;
    let lens = [h as usize, w as usize, c];
    let mut axes = lens.map(full);
    for (axis, idx) in raw.iter().enumerate() {
        let resolved = match *idx {
            RawIndex::At(i) => resolve_index(i, lens[axis]).map(|i| vec![i]),
            RawIndex::Slice(start, stop, step) => resolve_slice(start, stop, step, lens[axis]),
        };
        axes[axis] = resolved.map_err(|m| ScriptError::new(at, m))?;
    }
    let [rows, cols, chans] = axes;
    Ok(Selection { rows, cols, chans })
}

fn relocate(at: usize) -> impl Fn(ScriptError) -> ScriptError {
    move |e| ScriptError::new(at, e.message())
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(
        registry: &'a FunctionRegistry,
        scope: &'a mut Scope,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self {
            registry,
            scope,
            rng,
        }
    }

    pub(crate) fn exec(&mut self, stmt: &Stmt) -> Result<(), ScriptError> {
        match stmt {
            Stmt::Assign { name, value } => {
                let v = self.eval(value)?;
                self.scope.insert(name.clone(), v);
            }
            Stmt::IndexAssign {
                name,
                indices,
                value,
                at,
            } => {
                let v = self.eval(value)?;
                let raw = self.eval_indices(indices, *at)?;
                let shape = self
                    .lookup(name, *at)?
                    .as_image()
                    .map_err(relocate(*at))?
                    .shape();
                let sel = resolve_selection(&raw, shape, *at)?;
                let target = match self.scope.get_mut(name) {
                    Some(Value::Image(img)) => img,
                    _ => return Err(ScriptError::new(*at, format!("'{name}' is not an image"))),
                };
                match v {
                    Value::Num(n) => target.fill_region(&sel.rows, &sel.cols, &sel.chans, trunc_u8(n)),
                    Value::Image(src) => target
                        .paste_region(&sel.rows, &sel.cols, &sel.chans, &src)
                        .map_err(|e| ScriptError::new(*at, e.to_string()))?,
                    Value::Bool(_) => {
                        return Err(ScriptError::new(
                            *at,
                            "only numbers or images can be assigned into an image region",
                        ));
                    }
                }
            }
            Stmt::Expr(e) => {
                self.eval(e)?;
            }
        }
        Ok(())
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        Ok(self.eval_ref(expr)?.into_owned())
    }

    /// Like [`eval`](Self::eval), but variables are borrowed instead of cloned.
    fn eval_ref(&mut self, expr: &Expr) -> Result<Cow<'_, Value>, ScriptError> {
        let v = match expr {
            Expr::Lit(Lit::F64(v)) => Value::Num(*v),
            Expr::Lit(Lit::Bool(v)) => Value::Bool(*v),
            Expr::Var { name, at } => return self.lookup(name, *at).map(Cow::Borrowed),
            Expr::Unary { op, expr, at } => {
                let v = self.eval(expr)?;
                match op {
                    UnaryOp::Neg => Value::Num(-v.as_f64().map_err(relocate(*at))?),
                    UnaryOp::Not => Value::Bool(!v.as_bool().map_err(relocate(*at))?),
                }
            }
            Expr::Binary {
                op,
                left,
                right,
                at,
            } => self.eval_binary(*op, left, right, *at)?,
            Expr::Cond {
                cond,
                then,
                otherwise,
                at,
            } => {
                let c = self.eval(cond)?.as_bool().map_err(relocate(*at))?;
                return self.eval_ref(if c { then } else { otherwise });
            }
            Expr::Call { func, args, at } => self.call(func, args, *at)?,
            Expr::Attr { base, name, at } => {
                let b = self.eval_ref(base)?;
                let img = b.as_image().map_err(relocate(*at))?;
                match name.as_str() {
                    "height" => Value::Num(f64::from(img.height())),
                    "width" => Value::Num(f64::from(img.width())),
                    "channels" => Value::Num(img.channels() as f64),
                    other => {
                        return Err(ScriptError::new(
                            *at,
                            format!("unknown image attribute '{other}'"),
                        ));
                    }
                }
            }
            Expr::Index { base, indices, at } => {
                // Base first, then the indices; a variable base is borrowed afterwards.
                let owned = match base.as_ref() {
                    Expr::Var { .. } => None,
                    other => Some(self.eval(other)?),
                };
                let raw = self.eval_indices(indices, *at)?;
                let b = match owned {
                    Some(v) => Cow::Owned(v),
                    None => self.eval_ref(base)?,
                };
                let img = b.as_image().map_err(relocate(*at))?;
                let sel = resolve_selection(&raw, img.shape(), *at)?;
                let out = img
                    .gather(&sel.rows, &sel.cols, &sel.chans)
                    .map_err(|e| ScriptError::new(*at, e.to_string()))?;
                Value::Image(out)
            }
        };
        Ok(Cow::Owned(v))
    }

    fn lookup(&self, name: &str, at: usize) -> Result<&Value, ScriptError> {
        self.scope
            .get(name)
            .ok_or_else(|| ScriptError::new(at, format!("unknown variable '{name}'")))
    }

    fn call(&mut self, func: &str, args: &[Expr], at: usize) -> Result<Value, ScriptError> {
        let registry = self.registry;
        let Some(f) = registry.get(func) else {
            return Err(ScriptError::new(at, format!("unknown function '{func}'")));
        };
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval(a)?);
        }
        let mut ctx = CallCtx::new(&mut *self.rng);
        f(&mut ctx, &values).map_err(|e| ScriptError::new(at, format!("{func}: {}", e.message())))
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        at: usize,
    ) -> Result<Value, ScriptError> {
        let loc = relocate(at);
        match op {
            BinaryOp::And | BinaryOp::Or => {
                let l = self.eval(left)?.as_bool().map_err(&loc)?;
                if (op == BinaryOp::And) != l {
                    return Ok(Value::Bool(l));
                }
                let r = self.eval(right)?.as_bool().map_err(&loc)?;
                return Ok(Value::Bool(r));
            }
            _ => {}
        }

        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match op {
            BinaryOp::Eq | BinaryOp::Ne => {
                let eq = match (&l, &r) {
                    (Value::Num(a), Value::Num(b)) => a == b,
                    (Value::Bool(a), Value::Bool(b)) => a == b,
                    (Value::Image(a), Value::Image(b)) => a == b,
                    _ => {
                        return Err(ScriptError::new(
                            at,
                            format!("cannot compare {} with {}", l.type_name(), r.type_name()),
                        ));
                    }
                };
                Ok(Value::Bool(eq == (op == BinaryOp::Eq)))
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let (a, b) = (l.as_f64().map_err(&loc)?, r.as_f64().map_err(&loc)?);
                Ok(Value::Bool(match op {
                    BinaryOp::Lt => a < b,
                    BinaryOp::Le => a <= b,
                    BinaryOp::Gt => a > b,
                    _ => a >= b,
                }))
            }
            _ => arithmetic(op, l, r).map_err(&loc),
        }
    }

    fn eval_indices(&mut self, indices: &[IndexArg], at: usize) -> Result<Vec<RawIndex>, ScriptError> {
        let mut out = Vec::with_capacity(indices.len());
        for arg in indices {
            out.push(match arg {
                IndexArg::At(e) => RawIndex::At(self.eval(e)?.as_i64().map_err(relocate(at))?),
                IndexArg::Slice { start, stop, step } => RawIndex::Slice(
                    self.eval_opt_int(start.as_ref(), at)?,
                    self.eval_opt_int(stop.as_ref(), at)?,
                    self.eval_opt_int(step.as_ref(), at)?,
                ),
            });
        }
        Ok(out)
    }

    fn eval_opt_int(&mut self, e: Option<&Expr>, at: usize) -> Result<Option<i64>, ScriptError> {
        match e {
            Some(e) => Ok(Some(self.eval(e)?.as_i64().map_err(relocate(at))?)),
            None => Ok(None),
        }
    }
}

fn arithmetic(op: BinaryOp, l: Value, r: Value) -> Result<Value, ScriptError> {
    match (l, r) {
        (Value::Num(a), Value::Num(b)) => {
            if matches!(op, BinaryOp::Div | BinaryOp::Mod) && b == 0.0 {
                return Err(ScriptError::msg("division by zero"));
            }
            Ok(Value::Num(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a.rem_euclid(b),
            }))
        }
        (Value::Image(img), Value::Num(n)) => {
            let f = sample_op(op, n, false)?;
            Ok(Value::Image(img.map_samples(f)))
        }
        (Value::Num(n), Value::Image(img)) => {
            let f = sample_op(op, n, true)?;
            Ok(Value::Image(img.map_samples(f)))
        }
        (Value::Image(a), Value::Image(b)) => image_op(op, &a, &b).map(Value::Image),
        (l, r) => Err(ScriptError::msg(format!(
            "unsupported operand types {} and {}",
            l.type_name(),
            r.type_name()
        ))),
    }
}

/// Per-sample closure for image-with-number arithmetic, saturating to `[0, 255]`.
fn sample_op(op: BinaryOp, n: f64, number_first: bool) -> Result<impl Fn(u8) -> u8, ScriptError> {
    if !matches!(
        op,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
    ) {
        return Err(ScriptError::msg(format!(
            "operator {op:?} is not defined for images"
        )));
    }
    if op == BinaryOp::Div && !number_first && n == 0.0 {
        return Err(ScriptError::msg("division by zero"));
    }
    Ok(move |v: u8| {
        let v = f64::from(v);
        let (a, b) = if number_first { (n, v) } else { (v, n) };
        let out = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            _ if b == 0.0 => 255.0,
            _ => a / b,
        };
        trunc_u8(out)
    })
}

fn image_op(op: BinaryOp, a: &ImageArray, b: &ImageArray) -> Result<ImageArray, ScriptError> {
    if !a.same_shape(b) {
        return Err(ScriptError::msg(format!(
            "image shapes differ: {:?} vs {:?}",
            a.shape(),
            b.shape()
        )));
    }
    let f: fn(u8, u8) -> u8 = match op {
        BinaryOp::Add => u8::saturating_add,
        BinaryOp::Sub => u8::saturating_sub,
        _ => {
            return Err(ScriptError::msg(format!(
                "operator {op:?} is not defined between images"
            )));
        }
    };
    let mut out = a.clone();
    for (dst, &s) in out.data_mut().iter_mut().zip(b.data()) {
        *dst = f(*dst, s);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/script/interp.rs"]
mod tests;
