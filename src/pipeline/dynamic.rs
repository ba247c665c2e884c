use std::collections::BTreeMap;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::foundation::error::{AugmentError, AugmentResult};
use crate::foundation::image::ImageArray;
use crate::script::ast::{Expr, Stmt};
use crate::script::builtins::FunctionRegistry;
use crate::script::error::ScriptError;
use crate::script::interp::{Interpreter, Scope};
use crate::script::parser::{parse_expression, parse_statements};
use crate::script::value::Value;

/// Prefix of a step whose body is an expression producing the next working buffer.
pub const EXPRESSION_PREFIX: &str = "@@";
/// Prefix of a step whose body is a `;`-separated list of statements.
pub const STATEMENT_PREFIX: &str = "$$";

/// Symbol bound to the working buffer (BGR layout for color images).
pub const WORKING_SYMBOL: &str = "img";
/// Symbol bound to the untouched input (RGB layout for color images).
pub const SOURCE_SYMBOL: &str = "src";

/// Named groups of step strings. Groups are kept sorted by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicPipelineConfig {
    groups: BTreeMap<String, Vec<String>>,
}

impl DynamicPipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a group.
    pub fn with_group<I, S>(mut self, name: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(name.into(), steps.into_iter().map(Into::into).collect());
        self
    }

    pub fn from_value(value: &serde_json::Value) -> AugmentResult<Self> {
        Self::deserialize(value).map_err(|e| {
            AugmentError::configuration(format!("invalid dynamic pipeline config: {e}"))
        })
    }

    pub fn from_json_str(s: &str) -> AugmentResult<Self> {
        serde_json::from_str(s).map_err(|e| {
            AugmentError::configuration(format!("invalid dynamic pipeline config: {e}"))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }
}

#[derive(Clone, Debug)]
enum Step {
    Expression(Expr),
    Statements(Vec<Stmt>),
}

#[derive(Clone, Debug)]
struct Group {
    name: String,
    steps: Vec<Step>,
}

/// Compiled dynamic pipeline: every step is parsed and its calls checked up front.
#[derive(Clone, Debug)]
pub struct DynamicPipeline {
    groups: Vec<Group>,
    registry: FunctionRegistry,
}

impl DynamicPipeline {
    /// Compile against [`FunctionRegistry::standard`].
    pub fn compile(config: &DynamicPipelineConfig) -> AugmentResult<Self> {
        Self::with_registry(config, FunctionRegistry::standard())
    }

    #[tracing::instrument(skip(config, registry), fields(groups = config.groups.len()))]
    pub fn with_registry(
        config: &DynamicPipelineConfig,
        registry: FunctionRegistry,
    ) -> AugmentResult<Self> {
        let mut groups = Vec::with_capacity(config.groups.len());
        for (name, sources) in &config.groups {
            if name.trim().is_empty() {
                return Err(AugmentError::configuration(
                    "dynamic pipeline group names must not be blank",
                ));
            }
            let mut steps = Vec::with_capacity(sources.len());
            for (i, src) in sources.iter().enumerate() {
                steps.push(compile_step(name, i, src, &registry)?);
            }
            groups.push(Group {
                name: name.clone(),
                steps,
            });
        }
        Ok(Self { groups, registry })
    }

    /// Declared group names in selection order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Augment an RGB (or gray) image with one uniformly chosen group.
    ///
    /// With no groups the input is returned as is and `rng` is left untouched.
    pub fn run(&self, source: &ImageArray, rng: &mut dyn RngCore) -> AugmentResult<ImageArray> {
        if self.groups.is_empty() {
            return Ok(source.clone());
        }
        let idx = rng.random_range(0..self.groups.len());
        self.execute(&self.groups[idx], source, rng)
    }

    /// Run the group called `name`.
    pub fn run_group(
        &self,
        name: &str,
        source: &ImageArray,
        rng: &mut dyn RngCore,
    ) -> AugmentResult<ImageArray> {
        let group = self
            .groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| AugmentError::UnknownGroup(name.to_owned()))?;
        self.execute(group, source, rng)
    }

    #[tracing::instrument(skip(self, group, source, rng), fields(group = %group.name))]
    fn execute(
        &self,
        group: &Group,
        source: &ImageArray,
        rng: &mut dyn RngCore,
    ) -> AugmentResult<ImageArray> {
        tracing::debug!(steps = group.steps.len(), "running dynamic group");

        let mut scope = Scope::new();
        scope.insert(WORKING_SYMBOL.to_owned(), Value::Image(source.swap_red_blue()));
        scope.insert(SOURCE_SYMBOL.to_owned(), Value::Image(source.clone()));

        for (i, step) in group.steps.iter().enumerate() {
            tracing::trace!(step = i, "executing step");
            let fail = |e: ScriptError| AugmentError::script(group.name.clone(), i, e);
            let mut interp = Interpreter::new(&self.registry, &mut scope, &mut *rng);
            match step {
                Step::Expression(expr) => {
                    let value = interp.eval(expr).map_err(fail)?;
                    let img = value.into_image().map_err(|v| {
                        fail(ScriptError::new(
                            0,
                            format!("expression step must produce an image, got {}", v.type_name()),
                        ))
                    })?;
                    scope.insert(WORKING_SYMBOL.to_owned(), Value::Image(img));
                }
                Step::Statements(stmts) => {
                    for stmt in stmts {
                        interp.exec(stmt).map_err(fail)?;
                    }
                    match scope.get(WORKING_SYMBOL) {
                        Some(Value::Image(_)) => {}
                        other => {
                            let kind = other.map_or("nothing", Value::type_name);
                            return Err(fail(ScriptError::new(
                                0,
                                format!("'{WORKING_SYMBOL}' must stay an image, got {kind}"),
                            )));
                        }
                    }
                }
            }
        }

        match scope.remove(WORKING_SYMBOL) {
            Some(Value::Image(img)) => Ok(img.swap_red_blue()),
            _ => Err(AugmentError::script(
                group.name.clone(),
                group.steps.len().saturating_sub(1),
                ScriptError::new(0, format!("'{WORKING_SYMBOL}' is not an image")),
            )),
        }
    }
}

fn compile_step(
    group: &str,
    index: usize,
    source: &str,
    registry: &FunctionRegistry,
) -> AugmentResult<Step> {
    let fail = |e: ScriptError| AugmentError::script(group, index, e);
    let known = |name: &str| registry.contains(name);

    if source.starts_with(EXPRESSION_PREFIX) {
        let expr = parse_expression(source, EXPRESSION_PREFIX.len()).map_err(fail)?;
        if let Some((at, name)) = expr.find_unknown_call(&known) {
            return Err(fail(ScriptError::new(at, format!("unknown function '{name}'"))));
        }
        return Ok(Step::Expression(expr));
    }
    if source.starts_with(STATEMENT_PREFIX) {
        let stmts = parse_statements(source, STATEMENT_PREFIX.len()).map_err(fail)?;
        if let Some((at, name)) = stmts.iter().find_map(|s| s.find_unknown_call(&known)) {
            return Err(fail(ScriptError::new(at, format!("unknown function '{name}'"))));
        }
        return Ok(Step::Statements(stmts));
    }
    Err(AugmentError::configuration(format!(
        "step {index} of group '{group}' must start with '{EXPRESSION_PREFIX}' or '{STATEMENT_PREFIX}'"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/dynamic.rs"]
mod tests;
