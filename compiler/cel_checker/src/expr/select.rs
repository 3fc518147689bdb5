//! Select and presence-test nodes (§4.4 Select).

use cel_diagnostic::{field_not_testable, field_selection_unsupported, presence_test_not_a_select, undefined_field};
use cel_ir::{ExprId, Name, ParsedExpr};
use cel_types::{Declaration, Primitive, Reference, Type};

use crate::checker::Checker;
use crate::expr::{check_expr, flatten_qualified_name};

pub(crate) fn check_select(
    checker: &mut Checker,
    id: ExprId,
    operand: &ParsedExpr,
    field: Name,
    test_only: bool,
    optional: bool,
) {
    let field_name = checker.lookup_name(field).to_string();

    // Qualified-name resolution first (§4.2, §4.4 Select): `a.b.c` may
    // itself be a declared name, not a field access into `a.b`.
    if !optional {
        if let Some(base) = flatten_qualified_name(operand, checker) {
            let dotted = format!("{base}.{field_name}");
            if let Some((fqn, Declaration::Variable(var))) = checker.env().resolve_ident_owned(&dotted) {
                if test_only {
                    let span = checker.span_of(id);
                    checker.report(id, presence_test_not_a_select(span));
                }
                checker.record_reference(
                    id,
                    Reference::Ident {
                        name: fqn,
                        constant_value: var.constant_value,
                    },
                );
                let ty = if test_only { Type::Primitive(Primitive::Bool) } else { var.ty };
                checker.record_type(id, ty);
                return;
            }
        }
    }

    check_expr(checker, operand);
    let operand_ty = checker.type_of(operand.id).clone();

    // An optional-typed operand unwraps for field lookup; the result is
    // rewrapped whether or not `.?` was also used (§4.4 Select, Optional
    // syntax — both paths produce the same `optional_type(FieldType)` shape).
    let (lookup_ty, operand_was_optional) = match operand_ty.as_optional() {
        Some(inner) => (inner.clone(), true),
        None => (operand_ty.clone(), false),
    };

    let field_ty = match &lookup_ty {
        Type::Error | Type::Dyn => Type::Dyn,
        Type::Object(_) => match checker.env().provider().find_field_type(&lookup_ty, &field_name) {
            Some(field) => {
                if test_only && !field.supports_presence {
                    let span = checker.span_of(id);
                    checker.report(id, field_not_testable(span, &field_name));
                }
                field.ty
            }
            None => {
                let span = checker.span_of(id);
                checker.report(id, undefined_field(span, &field_name));
                Type::Error
            }
        },
        Type::Map(_, value) => (**value).clone(),
        _ => {
            let span = checker.span_of(id);
            checker.report(id, field_selection_unsupported(span, &operand_ty.to_string()));
            Type::Error
        }
    };

    let selected = if operand_was_optional || optional {
        Type::optional(field_ty)
    } else {
        field_ty
    };

    checker.record_type(id, if test_only { Type::Primitive(Primitive::Bool) } else { selected });
}
