//! Call nodes and overload resolution (§4.4 Calls).

use cel_diagnostic::no_matching_overload;
use cel_ir::{ExprId, Name, ParsedExpr};
use cel_types::{Declaration, Function, Reference, Type};
use tracing::trace;

use crate::checker::Checker;
use crate::expr::{check_expr, flatten_qualified_name, render_arg_types};

pub(crate) fn check_call(
    checker: &mut Checker,
    id: ExprId,
    target: Option<&ParsedExpr>,
    function: Name,
    args: &[ParsedExpr],
) {
    let fn_name = checker.lookup_name(function).to_string();

    // Step 1: target may itself be a qualified name combining with the
    // function name into a static reference, e.g. `pkg.sub.f(x)` (§4.4
    // Calls step 1).
    if let Some(target_expr) = target {
        if let Some(base) = flatten_qualified_name(target_expr, checker) {
            let combined = format!("{base}.{fn_name}");
            if let Some((_, Declaration::Function(func))) = checker.env().resolve_ident_owned(&combined) {
                for arg in args {
                    check_expr(checker, arg);
                }
                let arg_types: Vec<Type> = args.iter().map(|a| checker.type_of(a.id).clone()).collect();
                resolve_overloads(checker, id, &fn_name, &func, false, None, arg_types);
                return;
            }
        }
    }

    // Step 2: plain lookup, static or instance-with-receiver.
    let target_ty = target.map(|t| {
        check_expr(checker, t);
        checker.type_of(t.id).clone()
    });
    for arg in args {
        check_expr(checker, arg);
    }
    let arg_types: Vec<Type> = args.iter().map(|a| checker.type_of(a.id).clone()).collect();

    match checker.env().resolve_ident_owned(&fn_name) {
        Some((_, Declaration::Function(func))) => {
            resolve_overloads(checker, id, &fn_name, &func, target.is_some(), target_ty, arg_types);
        }
        _ => {
            let candidates: Vec<Type> = target_ty.into_iter().chain(arg_types).collect();
            let span = checker.span_of(id);
            let joined = render_arg_types(&candidates);
            checker.report(id, no_matching_overload(span, &fn_name, &joined));
            checker.record_type(id, Type::Error);
        }
    }
}

/// Try every overload compatible in call-style, instantiating fresh type
/// variables per attempt; narrow to `Dyn` on ambiguity (§4.4 Calls steps
/// 3-6).
fn resolve_overloads(
    checker: &mut Checker,
    id: ExprId,
    fn_name: &str,
    func: &Function,
    has_target: bool,
    target_ty: Option<Type>,
    arg_types: Vec<Type>,
) {
    let candidate_types: Vec<Type> = target_ty.into_iter().chain(arg_types).collect();

    let mut matched_ids = Vec::new();
    let mut result_ty: Option<Type> = None;

    for overload in &func.overloads {
        if !overload.call_style_matches(has_target) || overload.args.len() != candidate_types.len() {
            continue;
        }

        let renaming = checker.instantiate_overload(&overload.type_params);
        let mut working = checker.subst().clone();
        let mut ok = true;
        for (declared, supplied) in overload.args.iter().zip(&candidate_types) {
            let declared = cel_types::substitute(&renaming, declared, false);
            match cel_types::assignable(&working, &declared, supplied) {
                Some(next) => working = next,
                None => {
                    ok = false;
                    break;
                }
            }
        }
        trace!(overload_id = %overload.id, matched = ok, "overload candidate");
        if !ok {
            continue;
        }

        matched_ids.push(overload.id.clone());
        if matched_ids.len() == 1 {
            let declared_result = cel_types::substitute(&renaming, &overload.result, false);
            result_ty = Some(cel_types::substitute(&working, &declared_result, false));
            checker.commit(working);
        }
    }

    match matched_ids.len() {
        0 => {
            let span = checker.span_of(id);
            let joined = render_arg_types(&candidate_types);
            checker.report(id, no_matching_overload(span, fn_name, &joined));
            checker.record_type(id, Type::Error);
        }
        1 => {
            checker.record_type(id, result_ty.unwrap_or(Type::Dyn));
            checker.record_reference(id, Reference::Overloads(matched_ids));
        }
        _ => {
            checker.record_type(id, Type::Dyn);
            checker.record_reference(id, Reference::Overloads(matched_ids));
        }
    }
}
