//! List, map and message-constructor nodes (§4.4 Create List / Create Map
//! or Message).

use cel_diagnostic::{aggregate_type_mismatch, field_type_mismatch, not_a_message_type, not_a_type, type_mismatch, undefined_field};
use cel_ir::{ExprId, MapEntry, Name, StructField};
use cel_types::{Declaration, Type};

use crate::checker::Checker;
use crate::expr::check_expr;

/// Join a running element/key/value type with one more observed type
/// (§4.4: "if prev is absent -> cur; else attempt assignable, on success
/// mostGeneral, on failure report and keep prev").
fn join(checker: &mut Checker, id: ExprId, prev: Type, cur: Type) -> Type {
    match cel_types::assignable(checker.subst(), &prev, &cur) {
        Some(next) => {
            checker.commit(next);
            cel_types::most_general(prev, cur)
        }
        None => {
            let span = checker.span_of(id);
            checker.report(id, aggregate_type_mismatch(span, &cur.to_string(), &prev.to_string()));
            prev
        }
    }
}

pub(crate) fn check_list(checker: &mut Checker, id: ExprId, elements: &[cel_ir::ParsedExpr], _optional_indices: &[u32]) {
    let mut elem_ty: Option<Type> = None;
    for element in elements {
        check_expr(checker, element);
        let cur = checker.type_of(element.id).clone();
        elem_ty = Some(match elem_ty {
            None => cur,
            Some(prev) => join(checker, element.id, prev, cur),
        });
    }
    let elem_ty = elem_ty.unwrap_or_else(|| checker.fresh_var());
    checker.record_type(id, Type::list(elem_ty));
}

pub(crate) fn check_map(checker: &mut Checker, id: ExprId, entries: &[MapEntry]) {
    let mut key_ty: Option<Type> = None;
    let mut val_ty: Option<Type> = None;

    for entry in entries {
        check_expr(checker, &entry.key);
        check_expr(checker, &entry.value);

        let key = checker.type_of(entry.key.id).clone();
        let mut value = checker.type_of(entry.value.id).clone();

        // `{?k: v}` requires `v: optional_type(V)`; the map's value type
        // carries the unwrapped `V` (§4.4 Optional syntax).
        if entry.optional {
            match value.as_optional() {
                Some(inner) => value = inner.clone(),
                None => {
                    let span = checker.span_of(entry.value.id);
                    checker.report(entry.value.id, type_mismatch(span, "optional_type(V)", &value.to_string()));
                }
            }
        }

        key_ty = Some(match key_ty {
            None => key,
            Some(prev) => join(checker, entry.key.id, prev, key),
        });
        val_ty = Some(match val_ty {
            None => value,
            Some(prev) => join(checker, entry.value.id, prev, value),
        });
    }

    let key_ty = key_ty.unwrap_or_else(|| checker.fresh_var());
    let val_ty = val_ty.unwrap_or_else(|| checker.fresh_var());
    checker.record_type(id, Type::map(key_ty, val_ty));
}

pub(crate) fn check_struct(checker: &mut Checker, id: ExprId, type_name: Name, fields: &[StructField]) {
    let type_name_str = checker.lookup_name(type_name).to_string();

    let resolved = match checker.env().resolve_ident_owned(&type_name_str) {
        Some((_, Declaration::Variable(var))) => Some(var.ty),
        _ => checker.env().provider().find_ident(&type_name_str).map(|(ty, _)| ty),
    };

    let object_ty = match resolved {
        Some(Type::Type(Some(inner))) if matches!(*inner, Type::Object(_)) => Some(*inner),
        Some(Type::Type(Some(inner))) => {
            let span = checker.span_of(id);
            checker.report(id, not_a_type(span, &type_name_str, &inner.to_string()));
            None
        }
        _ => {
            let span = checker.span_of(id);
            checker.report(id, not_a_message_type(span, &type_name_str));
            None
        }
    };

    for field in fields {
        check_expr(checker, &field.value);
        let field_name = checker.lookup_name(field.name).to_string();
        let mut field_ty = checker.type_of(field.value.id).clone();

        if field.optional {
            if let Some(inner) = field_ty.as_optional() {
                field_ty = inner.clone();
            }
        }

        let Some(object_ty) = &object_ty else { continue };
        match checker.env().provider().find_field_type(object_ty, &field_name) {
            Some(declared) => {
                if cel_types::assignable(checker.subst(), &declared.ty, &field_ty).is_none() {
                    let span = checker.span_of(field.value.id);
                    checker.report(
                        id,
                        field_type_mismatch(span, &field_name, &declared.ty.to_string(), &field_ty.to_string()),
                    );
                }
            }
            None => {
                let span = checker.span_of(field.value.id);
                checker.report(id, undefined_field(span, &field_name));
            }
        }
    }

    checker.record_type(id, object_ty.unwrap_or(Type::Error));
}
