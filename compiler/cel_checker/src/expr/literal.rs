//! Literal nodes (§4.4 Literals).
//!
//! Every `LiteralKind` variant the parser can hand us is covered below;
//! there is no "unrecognized literal kind" arm because the enum is closed
//! — unlike a wire format decoded at runtime, this match is exhaustive by
//! construction, so that branch of §4.4 has no reachable counterpart here.

use cel_ir::{ExprId, LiteralKind};
use cel_types::{Primitive, Type};

use crate::checker::Checker;

pub(crate) fn check_literal(checker: &mut Checker, id: ExprId, kind: &LiteralKind) {
    let ty = match kind {
        LiteralKind::Int(_) => Type::Primitive(Primitive::Int),
        LiteralKind::Uint(_) => Type::Primitive(Primitive::Uint),
        LiteralKind::Double(_) => Type::Primitive(Primitive::Double),
        LiteralKind::Bool(_) => Type::Primitive(Primitive::Bool),
        LiteralKind::String(_) => Type::Primitive(Primitive::String),
        LiteralKind::Bytes(_) => Type::Primitive(Primitive::Bytes),
        LiteralKind::Null => Type::Null,
    };
    checker.record_type(id, ty);
}
