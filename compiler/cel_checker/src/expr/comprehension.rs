//! Comprehension nodes — the fold macros expand into these (§4.4
//! Comprehensions).

use cel_diagnostic::{invalid_comprehension_range, type_mismatch};
use cel_ir::{ComprehensionExpr, ExprId};
use cel_types::Type;

use crate::checker::Checker;
use crate::expr::check_expr;

pub(crate) fn check_comprehension(checker: &mut Checker, id: ExprId, comp: &ComprehensionExpr) {
    check_expr(checker, &comp.iter_range);
    let range_ty = checker.type_of(comp.iter_range.id).clone();

    let iter_var_ty = match &range_ty {
        Type::List(elem) => (**elem).clone(),
        // Two-variable map iteration binds `iter_var` to the key and
        // `iter_var2` to the value (handled separately below).
        Type::Map(key, _) => (**key).clone(),
        Type::Dyn | Type::Error => Type::Dyn,
        other => {
            let span = checker.span_of(comp.iter_range.id);
            checker.report(comp.iter_range.id, invalid_comprehension_range(span, &other.to_string()));
            Type::Error
        }
    };

    check_expr(checker, &comp.accu_init);
    let accu_ty = checker.type_of(comp.accu_init.id).clone();

    let outer_saved = checker.push_scope();
    checker.declare_local(checker.lookup_name(comp.accu_var).to_string(), accu_ty.clone());

    let inner_saved = checker.push_scope();
    checker.declare_local(checker.lookup_name(comp.iter_var).to_string(), iter_var_ty);
    if let (Some(iter_var2), Type::Map(_, value)) = (comp.iter_var2, &range_ty) {
        checker.declare_local(checker.lookup_name(iter_var2).to_string(), (**value).clone());
    }

    check_expr(checker, &comp.loop_condition);
    let cond_ty = checker.type_of(comp.loop_condition.id).clone();
    if cel_types::assignable(checker.subst(), &Type::Primitive(cel_types::Primitive::Bool), &cond_ty).is_none() {
        let span = checker.span_of(comp.loop_condition.id);
        checker.report(comp.loop_condition.id, type_mismatch(span, "bool", &cond_ty.to_string()));
    }

    check_expr(checker, &comp.loop_step);
    let step_ty = checker.type_of(comp.loop_step.id).clone();
    if let Some(next) = cel_types::assignable(checker.subst(), &accu_ty, &step_ty) {
        checker.commit(next);
    } else {
        let span = checker.span_of(comp.loop_step.id);
        checker.report(comp.loop_step.id, type_mismatch(span, &accu_ty.to_string(), &step_ty.to_string()));
    }

    checker.pop_scope(inner_saved);

    check_expr(checker, &comp.result);
    let result_ty = checker.type_of(comp.result.id).clone();

    checker.pop_scope(outer_saved);

    checker.record_type(id, result_ty);
}
