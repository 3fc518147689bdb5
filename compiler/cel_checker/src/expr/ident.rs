//! Identifier nodes (§4.4 Identifiers).

use cel_diagnostic::undeclared_reference;
use cel_ir::{ExprId, Name};
use cel_types::{Declaration, Reference, Type};

use crate::checker::Checker;

pub(crate) fn check_ident(checker: &mut Checker, id: ExprId, name: Name) {
    let reference = checker.lookup_name(name).to_string();

    match checker.env().resolve_ident_owned(&reference) {
        Some((fqn, Declaration::Variable(var))) => {
            checker.record_type(id, var.ty);
            checker.record_reference(
                id,
                Reference::Ident {
                    name: fqn,
                    constant_value: var.constant_value,
                },
            );
        }
        // A bare function name does not resolve to "the variable's declared
        // type" (§4.4) — only a `Call` node consults the overload set.
        Some((_, Declaration::Function(_))) | None => {
            let span = checker.span_of(id);
            let container = checker.env().container().to_string();
            checker.report(id, undeclared_reference(span, &reference, &container));
            checker.record_type(id, Type::Error);
        }
    }
}
