//! Verb registry: maps a verb name and grouping kind to an implementation,
//! and binds call arguments under each parameter's evaluation context.

use std::collections::HashMap;

use log::debug;

use super::complete::{CompleteSpec, complete};
use super::core::{Selection, SummariseGroups, filter, group_by, mutate, rowwise, select, summarise};
use super::join::{
    JoinBy, JoinOptions, anti_join, full_join, inner_join, left_join, nest_join, right_join, semi_join,
};
use crate::error::{Result, TidyError};
use crate::eval::{DOTS, Datum, EvalContext, Evaluator, Expr, ParamSpec, Resolved, VerbSignature};
use crate::group::{GroupOptions, GroupedTable, GroupingKind};
use crate::table::Value;

use EvalContext::{NameSelection, PerGroup, WholeTable};

pub const GROUP_BY: VerbSignature = VerbSignature {
    verb: "group_by",
    params: &[
        ParamSpec::variadic(DOTS, NameSelection),
        ParamSpec::new("add", WholeTable),
        ParamSpec::new("sort", WholeTable),
        ParamSpec::new("dropna", WholeTable),
        ParamSpec::new("drop", WholeTable),
    ],
};

pub const ROWWISE: VerbSignature = VerbSignature {
    verb: "rowwise",
    params: &[ParamSpec::variadic(DOTS, NameSelection)],
};

pub const UNGROUP: VerbSignature = VerbSignature {
    verb: "ungroup",
    params: &[],
};

pub const SELECT: VerbSignature = VerbSignature {
    verb: "select",
    params: &[ParamSpec::variadic(DOTS, NameSelection)],
};

pub const MUTATE: VerbSignature = VerbSignature {
    verb: "mutate",
    params: &[ParamSpec::variadic(DOTS, PerGroup)],
};

pub const FILTER: VerbSignature = VerbSignature {
    verb: "filter",
    params: &[ParamSpec::variadic(DOTS, PerGroup)],
};

pub const SUMMARISE: VerbSignature = VerbSignature {
    verb: "summarise",
    params: &[
        ParamSpec::variadic(DOTS, PerGroup),
        ParamSpec::new("groups", WholeTable),
    ],
};

pub const COMPLETE: VerbSignature = VerbSignature {
    verb: "complete",
    params: &[
        ParamSpec::variadic(DOTS, NameSelection),
        ParamSpec::variadic("fill", WholeTable),
    ],
};

const JOIN_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("by", NameSelection),
    ParamSpec::new("suffix", WholeTable),
    ParamSpec::new("keep", WholeTable),
];

const NEST_JOIN_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("by", NameSelection),
    ParamSpec::new("keep", WholeTable),
    ParamSpec::new("name", WholeTable),
];

const FILTER_JOIN_PARAMS: &[ParamSpec] = &[ParamSpec::new("by", NameSelection)];

pub const INNER_JOIN: VerbSignature = VerbSignature {
    verb: "inner_join",
    params: JOIN_PARAMS,
};
pub const LEFT_JOIN: VerbSignature = VerbSignature {
    verb: "left_join",
    params: JOIN_PARAMS,
};
pub const RIGHT_JOIN: VerbSignature = VerbSignature {
    verb: "right_join",
    params: JOIN_PARAMS,
};
pub const FULL_JOIN: VerbSignature = VerbSignature {
    verb: "full_join",
    params: JOIN_PARAMS,
};
pub const SEMI_JOIN: VerbSignature = VerbSignature {
    verb: "semi_join",
    params: FILTER_JOIN_PARAMS,
};
pub const ANTI_JOIN: VerbSignature = VerbSignature {
    verb: "anti_join",
    params: FILTER_JOIN_PARAMS,
};
pub const NEST_JOIN: VerbSignature = VerbSignature {
    verb: "nest_join",
    params: NEST_JOIN_PARAMS,
};

/// One argument of a verb call.
#[derive(Debug, Clone)]
pub struct Arg {
    /// Parameter to bind to; `None` binds to the variadic `...`.
    pub param: Option<String>,
    /// Output or target name, e.g. the column a `mutate` assigns.
    pub name: Option<String>,
    pub expr: Expr,
}

impl Arg {
    /// An unnamed argument for `...`.
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            param: None,
            name: None,
            expr: expr.into(),
        }
    }

    /// A named argument for `...`.
    pub fn named(name: &str, expr: impl Into<Expr>) -> Self {
        Self {
            param: None,
            name: Some(name.to_string()),
            expr: expr.into(),
        }
    }

    /// An argument for a specific parameter.
    pub fn param(param: &str, expr: impl Into<Expr>) -> Self {
        Self {
            param: Some(param.to_string()),
            name: None,
            expr: expr.into(),
        }
    }

    /// Attach a name, e.g. the column a `fill` entry applies to.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// A verb invocation.
#[derive(Debug, Clone)]
pub struct VerbCall {
    pub verb: String,
    pub args: Vec<Arg>,
    /// Right-hand table for joins.
    pub other: Option<GroupedTable>,
}

impl VerbCall {
    pub fn new(verb: &str) -> Self {
        Self {
            verb: verb.to_string(),
            args: Vec::new(),
            other: None,
        }
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn with_other(mut self, other: GroupedTable) -> Self {
        self.other = Some(other);
        self
    }
}

/// An argument after binding.
#[derive(Debug, Clone)]
pub enum Bound {
    /// Resolved at bind time (name-selection and whole-table parameters).
    Resolved(Resolved),
    /// Per-group expressions are evaluated by the verb itself, since they
    /// may depend on columns the verb creates along the way.
    Deferred(Expr),
}

#[derive(Debug, Clone)]
pub struct BoundArg {
    pub param: &'static str,
    pub name: Option<String>,
    pub value: Bound,
}

/// Arguments bound to a verb's parameters.
#[derive(Debug, Clone)]
pub struct BoundArgs {
    args: Vec<BoundArg>,
    other: Option<GroupedTable>,
}

impl BoundArgs {
    /// Every argument bound to `param`, in call order.
    pub fn all<'a>(&'a self, param: &str) -> impl Iterator<Item = &'a BoundArg> + use<'a> {
        let param = param.to_string();
        self.args.iter().filter(move |a| a.param == param)
    }

    pub fn one(&self, param: &str) -> Option<&BoundArg> {
        self.all(param).next()
    }

    /// The right-hand table of a join.
    pub fn other(&self) -> Result<&GroupedTable> {
        self.other
            .as_ref()
            .ok_or_else(|| TidyError::InvalidArgument("this verb needs a second table".to_string()))
    }

    /// All names selected through `param`.
    pub fn names(&self, param: &str) -> Result<Vec<String>> {
        let mut out: Vec<String> = Vec::new();
        for arg in self.all(param) {
            match &arg.value {
                Bound::Resolved(Resolved::Names(names)) => {
                    for name in names {
                        if !out.contains(name) {
                            out.push(name.clone());
                        }
                    }
                }
                _ => {
                    return Err(TidyError::InvalidArgument(format!(
                        "'{}' expects column names",
                        param
                    )));
                }
            }
        }
        Ok(out)
    }

    /// A scalar argument, if given.
    pub fn scalar(&self, param: &str) -> Result<Option<Value>> {
        self.one(param).map(|arg| scalar(param, &arg.value)).transpose()
    }

    pub fn flag(&self, param: &str, default: bool) -> Result<bool> {
        match self.scalar(param)? {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(b),
            Some(other) => Err(TidyError::type_mismatch(param, "boolean", other.type_name())),
        }
    }

    pub fn string(&self, param: &str) -> Result<Option<String>> {
        match self.scalar(param)? {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(other) => Err(TidyError::type_mismatch(param, "string", other.type_name())),
        }
    }

    /// Per-group expressions with their names.
    pub fn deferred(&self, param: &str) -> Result<Vec<(Option<&str>, &Expr)>> {
        self.all(param)
            .map(|arg| match &arg.value {
                Bound::Deferred(expr) => Ok((arg.name.as_deref(), expr)),
                Bound::Resolved(_) => Err(TidyError::InvalidArgument(format!(
                    "'{}' is not a per-group parameter",
                    param
                ))),
            })
            .collect()
    }

    fn assignments(&self, verb: &str) -> Result<Vec<(String, Expr)>> {
        self.deferred(DOTS)?
            .into_iter()
            .map(|(name, expr)| match (name, expr) {
                (Some(name), _) => Ok((name.to_string(), expr.clone())),
                (None, Expr::Col(col)) => Ok((col.clone(), expr.clone())),
                (None, _) => Err(TidyError::InvalidArgument(format!(
                    "{} arguments need a name",
                    verb
                ))),
            })
            .collect()
    }
}

fn scalar(param: &str, bound: &Bound) -> Result<Value> {
    match bound {
        Bound::Resolved(Resolved::Values(Datum::Scalar(v))) => Ok(v.clone()),
        Bound::Resolved(Resolved::Values(Datum::Column(v))) if v.len() == 1 => Ok(v[0].clone()),
        _ => Err(TidyError::InvalidArgument(format!("'{}' expects a single value", param))),
    }
}

/// Implementation of a verb for one grouping kind.
pub type VerbFn = fn(&GroupedTable, &BoundArgs) -> Result<GroupedTable>;

#[derive(Clone, Copy)]
struct Entry {
    signature: &'static VerbSignature,
    run: VerbFn,
}

const ALL_KINDS: &[GroupingKind] = &[GroupingKind::Plain, GroupingKind::Grouped, GroupingKind::RowWise];

/// Lookup table from `(verb, grouping kind)` to implementation.
#[derive(Clone, Default)]
pub struct VerbRegistry {
    verbs: HashMap<(String, GroupingKind), Entry>,
}

impl VerbRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in verb.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ALL_KINDS, &GROUP_BY, group_by_verb);
        registry.register(&[GroupingKind::Plain, GroupingKind::RowWise], &ROWWISE, rowwise_verb);
        registry.register(&[GroupingKind::Grouped], &ROWWISE, rowwise_grouped_verb);
        registry.register(ALL_KINDS, &UNGROUP, |t, _| Ok(t.ungroup()));
        registry.register(ALL_KINDS, &SELECT, select_verb);
        registry.register(ALL_KINDS, &MUTATE, mutate_verb);
        registry.register(ALL_KINDS, &FILTER, filter_verb);
        registry.register(ALL_KINDS, &SUMMARISE, summarise_verb);
        registry.register(ALL_KINDS, &COMPLETE, complete_verb);
        registry.register(ALL_KINDS, &INNER_JOIN, |t, a| {
            inner_join(t, a.other()?, &join_by(a)?, &join_options(a)?)
        });
        registry.register(ALL_KINDS, &LEFT_JOIN, |t, a| {
            left_join(t, a.other()?, &join_by(a)?, &join_options(a)?)
        });
        registry.register(ALL_KINDS, &RIGHT_JOIN, |t, a| {
            right_join(t, a.other()?, &join_by(a)?, &join_options(a)?)
        });
        registry.register(ALL_KINDS, &FULL_JOIN, |t, a| {
            full_join(t, a.other()?, &join_by(a)?, &join_options(a)?)
        });
        registry.register(ALL_KINDS, &SEMI_JOIN, |t, a| semi_join(t, a.other()?, &join_by(a)?));
        registry.register(ALL_KINDS, &ANTI_JOIN, |t, a| anti_join(t, a.other()?, &join_by(a)?));
        registry.register(ALL_KINDS, &NEST_JOIN, |t, a| {
            nest_join(t, a.other()?, &join_by(a)?, &join_options(a)?)
        });
        registry
    }

    /// Register an implementation for each of `kinds`, replacing any
    /// previous one.
    pub fn register(&mut self, kinds: &[GroupingKind], signature: &'static VerbSignature, run: VerbFn) {
        for kind in kinds {
            self.verbs
                .insert((signature.verb.to_string(), *kind), Entry { signature, run });
        }
    }

    /// Signature of a verb for a grouping kind.
    pub fn signature(&self, verb: &str, kind: GroupingKind) -> Option<&'static VerbSignature> {
        self.verbs.get(&(verb.to_string(), kind)).map(|e| e.signature)
    }

    /// Registered verb names, sorted.
    pub fn verbs(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.verbs.keys().map(|(v, _)| v.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Run a verb on a table.
    pub fn call(&self, table: &GroupedTable, call: &VerbCall) -> Result<GroupedTable> {
        let kind = table.grouping_kind();
        let entry = self
            .verbs
            .get(&(call.verb.clone(), kind))
            .ok_or_else(|| TidyError::UnknownVerb {
                verb: call.verb.clone(),
                kind: kind.to_string(),
            })?;
        debug!("dispatching {} on a {} table", call.verb, kind);
        let args = bind(entry.signature, table, call)?;
        (entry.run)(table, &args)
    }
}

fn bind(signature: &'static VerbSignature, table: &GroupedTable, call: &VerbCall) -> Result<BoundArgs> {
    let evaluator = Evaluator::new();
    let mut args: Vec<BoundArg> = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        let param_name = arg.param.as_deref().unwrap_or(DOTS);
        let spec = signature.param(param_name).ok_or_else(|| {
            TidyError::InvalidArgument(format!(
                "{}() has no parameter '{}'",
                signature.verb, param_name
            ))
        })?;
        if !spec.variadic && args.iter().any(|a| a.param == spec.name) {
            return Err(TidyError::InvalidArgument(format!(
                "{}() got '{}' more than once",
                signature.verb, spec.name
            )));
        }
        let value = match (spec.context, &arg.expr) {
            (PerGroup, expr) => Bound::Deferred(expr.clone()),
            // A named literal is a value list for that name, never a column.
            (NameSelection, Expr::Lit(value)) if arg.name.is_some() => {
                Bound::Resolved(Resolved::Values(Datum::Scalar(value.clone())))
            }
            (context, expr) => Bound::Resolved(evaluator.resolve(expr, context, table)?),
        };
        args.push(BoundArg {
            param: spec.name,
            name: arg.name.clone(),
            value,
        });
    }
    Ok(BoundArgs {
        args,
        other: call.other.clone(),
    })
}

fn group_by_verb(table: &GroupedTable, args: &BoundArgs) -> Result<GroupedTable> {
    let defaults = GroupOptions::default();
    let options = GroupOptions {
        sort: args.flag("sort", defaults.sort)?,
        dropna: args.flag("dropna", defaults.dropna)?,
        drop: args.flag("drop", defaults.drop)?,
    };
    group_by(table, &args.names(DOTS)?, args.flag("add", false)?, options)
}

fn rowwise_verb(table: &GroupedTable, args: &BoundArgs) -> Result<GroupedTable> {
    rowwise(table, &args.names(DOTS)?)
}

fn rowwise_grouped_verb(table: &GroupedTable, args: &BoundArgs) -> Result<GroupedTable> {
    let names = args.names(DOTS)?;
    if !names.is_empty() {
        return Err(TidyError::InvalidArgument(
            "rowwise() on a grouped table takes no columns; it keeps the group variables".to_string(),
        ));
    }
    rowwise::<String>(table, &[])
}

fn select_verb(table: &GroupedTable, args: &BoundArgs) -> Result<GroupedTable> {
    let selections = args
        .all(DOTS)
        .map(|arg| match &arg.value {
            Bound::Resolved(Resolved::Names(names)) => Ok(Selection {
                names: names.clone(),
                rename: arg.name.clone(),
            }),
            _ => Err(TidyError::InvalidArgument("select() expects column selections".to_string())),
        })
        .collect::<Result<Vec<_>>>()?;
    select(table, &selections)
}

fn mutate_verb(table: &GroupedTable, args: &BoundArgs) -> Result<GroupedTable> {
    mutate(table, &args.assignments("mutate")?)
}

fn filter_verb(table: &GroupedTable, args: &BoundArgs) -> Result<GroupedTable> {
    let predicates: Vec<Expr> = args
        .deferred(DOTS)?
        .into_iter()
        .map(|(_, expr)| expr.clone())
        .collect();
    filter(table, &predicates)
}

fn summarise_verb(table: &GroupedTable, args: &BoundArgs) -> Result<GroupedTable> {
    let groups = match args.string("groups")? {
        Some(s) => s.parse()?,
        None => SummariseGroups::default(),
    };
    summarise(table, &args.assignments("summarise")?, groups)
}

fn complete_verb(table: &GroupedTable, args: &BoundArgs) -> Result<GroupedTable> {
    let mut specs = Vec::new();
    for arg in args.all(DOTS) {
        match (&arg.value, &arg.name) {
            (Bound::Resolved(Resolved::Names(names)), None) => {
                specs.extend(names.iter().map(|n| CompleteSpec::Column(n.clone())));
            }
            (Bound::Resolved(Resolved::Names(_)), Some(column)) => {
                return Err(TidyError::InvalidArgument(format!(
                    "complete() value list for '{}' must be values, not column names",
                    column
                )));
            }
            (Bound::Resolved(Resolved::Values(datum)), Some(column)) => {
                let values = match datum {
                    Datum::Scalar(Value::Null) => Vec::new(),
                    Datum::Scalar(v) => vec![v.clone()],
                    Datum::Column(values) => values.clone(),
                    other => {
                        return Err(TidyError::InvalidArgument(format!(
                            "complete() can't expand a {}",
                            other.kind_name()
                        )));
                    }
                };
                specs.push(CompleteSpec::Values {
                    column: column.clone(),
                    values,
                });
            }
            _ => {
                return Err(TidyError::InvalidArgument(
                    "complete() value lists need a column name".to_string(),
                ));
            }
        }
    }
    let fill = args
        .all("fill")
        .map(|arg| {
            let column = arg.name.clone().ok_or_else(|| {
                TidyError::InvalidArgument("fill values need a column name".to_string())
            })?;
            Ok((column, scalar("fill", &arg.value)?))
        })
        .collect::<Result<Vec<_>>>()?;
    complete(table, &specs, &fill)
}

fn join_by(args: &BoundArgs) -> Result<JoinBy> {
    match args.one("by").map(|a| &a.value) {
        None => Ok(JoinBy::Infer),
        Some(Bound::Resolved(Resolved::Names(names))) => Ok(JoinBy::Columns(names.clone())),
        Some(Bound::Resolved(Resolved::Pairs(pairs))) => Ok(JoinBy::Mapping(pairs.clone())),
        Some(_) => Err(TidyError::InvalidArgument(
            "'by' expects column names or name pairs".to_string(),
        )),
    }
}

fn join_options(args: &BoundArgs) -> Result<JoinOptions> {
    let mut options = JoinOptions {
        keep: args.flag("keep", false)?,
        name: args.string("name")?,
        ..JoinOptions::default()
    };
    if let Some(arg) = args.one("suffix") {
        match &arg.value {
            Bound::Resolved(Resolved::Values(Datum::Column(values))) => match values.as_slice() {
                [Value::Str(x), Value::Str(y)] => options.suffix = (x.clone(), y.clone()),
                _ => {
                    return Err(TidyError::InvalidArgument(
                        "'suffix' expects two strings".to_string(),
                    ));
                }
            },
            _ => {
                return Err(TidyError::InvalidArgument(
                    "'suffix' expects two strings".to_string(),
                ));
            }
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{all_of, call, col, lit, pairs, vector};
    use crate::table::{Column, Table};

    fn table() -> GroupedTable {
        GroupedTable::plain(
            Table::from_columns(vec![
                ("g", Column::from(vec!["a", "b", "a"])),
                ("x", Column::from(vec![3, 1, 2])),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_dispatch_by_kind() {
        let registry = VerbRegistry::with_defaults();
        let grouped = registry
            .call(&table(), &VerbCall::new("group_by").arg(Arg::new(col("g"))))
            .unwrap();
        assert_eq!(grouped.grouping_kind(), GroupingKind::Grouped);

        let ranked = registry
            .call(
                &grouped,
                &VerbCall::new("mutate").arg(Arg::named("r", call("row_number", vec![]))),
            )
            .unwrap();
        assert_eq!(
            ranked.table().column("r").unwrap().values(),
            &[Value::from(1), Value::from(1), Value::from(2)]
        );

        let rowwise_err = registry.call(
            &grouped,
            &VerbCall::new("rowwise").arg(Arg::new(col("x"))),
        );
        assert!(matches!(rowwise_err, Err(TidyError::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_verb_and_param() {
        let registry = VerbRegistry::with_defaults();
        assert!(matches!(
            registry.call(&table(), &VerbCall::new("pivot")),
            Err(TidyError::UnknownVerb { .. })
        ));
        assert!(matches!(
            registry.call(&table(), &VerbCall::new("select").arg(Arg::param("nope", col("x")))),
            Err(TidyError::InvalidArgument(_))
        ));
        assert_eq!(
            registry.signature("summarise", GroupingKind::RowWise).map(|s| s.verb),
            Some("summarise")
        );
        assert!(registry.verbs().contains(&"nest_join"));
    }

    #[test]
    fn test_join_through_registry() {
        let registry = VerbRegistry::with_defaults();
        let other = GroupedTable::plain(
            Table::from_columns(vec![
                ("key", Column::from(vec!["a"])),
                ("x", Column::from(vec![9])),
            ])
            .unwrap(),
        );
        let call = VerbCall::new("left_join")
            .arg(Arg::param("by", Expr::Select(pairs(&[("g", "key")]))))
            .arg(Arg::param("suffix", vector(["_l", "_r"])))
            .with_other(other);
        let out = registry.call(&table(), &call).unwrap();
        assert_eq!(out.table().column_names(), vec!["g", "x_l", "x_r"]);
    }

    #[test]
    fn test_summarise_and_complete_through_registry() {
        let registry = VerbRegistry::with_defaults();
        let summary = registry
            .call(
                &table(),
                &VerbCall::new("summarise")
                    .arg(Arg::named("total", call("sum", vec![col("x")])))
                    .arg(Arg::param("groups", lit("drop"))),
            )
            .unwrap();
        assert_eq!(summary.table().get(0, "total"), Some(&Value::from(6)));

        let completed = registry
            .call(
                &table(),
                &VerbCall::new("complete")
                    .arg(Arg::new(Expr::Select(all_of(&["g"]))))
                    .arg(Arg::named("x", vector([1, 2, 3])))
                    .arg(Arg::param("fill", lit(0)).with_name("x")),
            )
            .unwrap();
        assert_eq!(completed.nrows(), 6);
    }

    #[test]
    fn test_bound_args_lookup() {
        let call = VerbCall::new("mutate")
            .arg(Arg::named("y", col("x") + lit(1)))
            .arg(Arg::new(col("g")));
        let args = bind(&MUTATE, &table(), &call).unwrap();

        let first = args.one(DOTS).unwrap();
        assert_eq!(first.name.as_deref(), Some("y"));
        assert!(args.one("groups").is_none());

        let deferred = args.deferred(DOTS).unwrap();
        assert_eq!(deferred.len(), 2);
        assert_eq!(deferred[0].0, Some("y"));
        assert!(matches!(deferred[1], (None, Expr::Col(c)) if c == "g"));

        let summarise = VerbCall::new("summarise").arg(Arg::param("groups", lit("keep")));
        let args = bind(&SUMMARISE, &table(), &summarise).unwrap();
        assert!(matches!(args.deferred("groups"), Err(TidyError::InvalidArgument(_))));
        assert_eq!(args.string("groups").unwrap().as_deref(), Some("keep"));
    }

    #[test]
    fn test_complete_named_single_value() {
        let registry = VerbRegistry::with_defaults();
        let input = GroupedTable::plain(
            Table::from_columns(vec![
                ("g", Column::from(vec!["a", "b"])),
                ("h", Column::from(vec!["x", "y"])),
            ])
            .unwrap(),
        );
        let completed = registry
            .call(
                &input,
                &VerbCall::new("complete")
                    .arg(Arg::new(col("g")))
                    .arg(Arg::named("h", lit("a"))),
            )
            .unwrap();
        assert_eq!(completed.nrows(), 4);
        let added = (0..completed.nrows())
            .filter(|&r| completed.table().get(r, "h") == Some(&Value::from("a")))
            .count();
        assert_eq!(added, 2);

        let named_columns = registry.call(
            &input,
            &VerbCall::new("complete").arg(Arg::named("h", Expr::Select(all_of(&["g"])))),
        );
        assert!(matches!(named_columns, Err(TidyError::InvalidArgument(_))));
    }
}
