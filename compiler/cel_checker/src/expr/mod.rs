//! Per-node-kind checking, one file per construct (§4.4).

mod call;
mod collections;
mod comprehension;
mod ident;
mod literal;
mod select;

use cel_ir::{ExprKind, ParsedExpr};
use cel_stack::ensure_sufficient_stack;

use crate::checker::Checker;

/// Check `expr`, growing the stack first if needed. This is the entry
/// point every recursive call into a child expression goes through, so
/// stack growth is checked at every nesting level (§5 bounded recursion).
pub(crate) fn check_expr(checker: &mut Checker, expr: &ParsedExpr) {
    ensure_sufficient_stack(|| check_expr_inner(checker, expr));
}

/// Dispatch on node kind. Sets exactly one `type_map` entry for `expr.id`,
/// even on error (§4.4).
fn check_expr_inner(checker: &mut Checker, expr: &ParsedExpr) {
    match &expr.kind {
        ExprKind::Literal(kind) => literal::check_literal(checker, expr.id, kind),
        ExprKind::Ident(name) => ident::check_ident(checker, expr.id, *name),
        ExprKind::Select {
            operand,
            field,
            test_only,
            optional,
        } => select::check_select(checker, expr.id, operand, *field, *test_only, *optional),
        ExprKind::Call {
            target,
            function,
            args,
        } => call::check_call(checker, expr.id, target.as_deref(), *function, args),
        ExprKind::List {
            elements,
            optional_indices,
        } => collections::check_list(checker, expr.id, elements, optional_indices),
        ExprKind::Map { entries } => collections::check_map(checker, expr.id, entries),
        ExprKind::Struct { type_name, fields } => {
            collections::check_struct(checker, expr.id, *type_name, fields);
        }
        ExprKind::Comprehension(comp) => comprehension::check_comprehension(checker, expr.id, comp),
    }
}

/// Flatten a chain of plain `Ident`/`Select` nodes (no `has()`, no `.?`)
/// into a dotted name, for the qualified-name-first resolution §4.2/§4.4
/// describe for both selects and call targets. Returns `None` as soon as
/// the chain bottoms out in anything else.
pub(crate) fn flatten_qualified_name(expr: &ParsedExpr, checker: &Checker) -> Option<String> {
    match &expr.kind {
        ExprKind::Ident(name) => Some(checker.lookup_name(*name).to_string()),
        ExprKind::Select {
            operand,
            field,
            test_only: false,
            optional: false,
        } => {
            let prefix = flatten_qualified_name(operand, checker)?;
            Some(format!("{prefix}.{}", checker.lookup_name(*field)))
        }
        _ => None,
    }
}

/// Render a candidate argument type list the way §7's normative
/// "no matching overload" message expects: comma-joined, in call order.
pub(crate) fn render_arg_types(types: &[cel_types::Type]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
