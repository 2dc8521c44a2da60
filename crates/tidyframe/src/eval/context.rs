//! Evaluation contexts and verb parameter signatures.

use serde::Serialize;

/// How a verb argument is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalContext {
    /// Column references resolve to whole columns of the ungrouped table.
    WholeTable,
    /// Column references resolve per group; plain tables behave like
    /// [`EvalContext::WholeTable`].
    PerGroup,
    /// The argument selects columns by name and never reads cell values.
    NameSelection,
}

/// One declared parameter of a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub context: EvalContext,
    /// Accepts any number of arguments.
    pub variadic: bool,
}

impl ParamSpec {
    pub const fn new(name: &'static str, context: EvalContext) -> Self {
        Self {
            name,
            context,
            variadic: false,
        }
    }

    pub const fn variadic(name: &'static str, context: EvalContext) -> Self {
        Self {
            name,
            context,
            variadic: true,
        }
    }
}

/// Name of the parameter that collects unnamed arguments.
pub const DOTS: &str = "...";

/// The parameters a verb declares, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerbSignature {
    pub verb: &'static str,
    pub params: &'static [ParamSpec],
}

impl VerbSignature {
    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// The parameter unnamed arguments bind to.
    pub fn dots(&self) -> Option<&ParamSpec> {
        self.param(DOTS)
    }
}
