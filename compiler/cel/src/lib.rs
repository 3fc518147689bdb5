//! The `cel` facade: wires [`cel_checker`] and [`cel_cost`] into a single
//! pipeline and re-exports the pieces a host embedding this workspace
//! needs, the way a compiler driver wires its phase crates (lexer, parser,
//! typeck, eval) behind one entry point.
//!
//! This crate adds no behavior of its own beyond [`check_and_estimate_cost`]
//! — every type here is a re-export of its owning crate.

pub use cel_checker::{Checker, CheckedExpr, Issue, Issues, Location};
pub use cel_cost::{estimate_cost, CallEstimate, CostConfig, CostEstimate, CostEstimator, Interval, NoCostEstimator, SizeEstimate};
pub use cel_ir::{
    ComprehensionExpr, ExprId, ExprKind, LiteralKind, MapEntry, Name, ParsedExpr, SharedInterner, SourceInfo, StringInterner,
    StructField,
};
pub use cel_types::{
    assignable, equal_or_less_specific, most_general, occurs, substitute, ConstantValue, Declaration, EmptyTypeProvider, EnvError,
    Environment, FieldType, Function, FreshVarGen, Overload, Primitive, Reference, Substitution, Type, TypeProvider, Variable,
    WellKnown,
};

/// Check `expr` against `env`, then estimate its cost under `collaborator`
/// and `config` — the full §4.4 + §4.5 pipeline a host otherwise wires by
/// hand.
///
/// Cost is always computed, even when `issues` is non-empty: per §7's
/// propagation policy an `Error`-typed subtree costs `[0, u64::MAX]`
/// rather than panicking or being skipped, so there is never a reason to
/// gate the call on `issues.is_empty()`. Callers that only want a cost for
/// a clean check should check `issues` themselves before using it.
#[must_use]
pub fn check_and_estimate_cost(
    env: Environment,
    interner: SharedInterner,
    expr: &ParsedExpr,
    source_info: SourceInfo,
    collaborator: &dyn CostEstimator,
    config: &CostConfig,
) -> (CheckedExpr, Issues, CostEstimate) {
    let (checked, issues) = Checker::new(env, interner.clone()).check(expr, source_info);
    let cost = estimate_cost(&checked, &interner, collaborator, config);
    (checked, issues, cost)
}
