//! Step language of dynamic pipelines.
//!
//! Step bodies are parsed once into an AST and evaluated by a small tree-walking interpreter.
//! Functions are resolved through a [`FunctionRegistry`]; nothing outside it is callable.

pub(crate) mod ast;
pub(crate) mod builtins;
pub(crate) mod error;
pub(crate) mod interp;
pub(crate) mod lexer;
pub(crate) mod parser;
pub(crate) mod slice;
pub(crate) mod value;

pub use builtins::{CallCtx, FunctionRegistry, NativeFn};
pub use error::ScriptError;
pub use value::Value;
