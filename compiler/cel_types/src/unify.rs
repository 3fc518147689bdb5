//! Assignability and unification over the substitution map (§4.3).

use std::rc::Rc;

use crate::subst::Substitution;
use crate::types::Type;

/// Structural "no more specific than" comparison — no substitution
/// involved. `Dyn` and type-parameters are maximally general; everything
/// else compares by kind, recursing into children.
#[must_use]
pub fn equal_or_less_specific(t1: &Type, t2: &Type) -> bool {
    if matches!(t1, Type::Dyn | Type::TypeParam(_)) {
        return true;
    }
    if matches!(t2, Type::Dyn | Type::TypeParam(_)) {
        return false;
    }
    match (t1, t2) {
        (Type::Error, Type::Error) | (Type::Null, Type::Null) => true,
        (Type::Primitive(a), Type::Primitive(b)) => a == b,
        (Type::Wrapper(a), Type::Wrapper(b)) => a == b,
        (Type::WellKnown(a), Type::WellKnown(b)) => a == b,
        (Type::Object(a), Type::Object(b)) => a == b,
        (Type::List(e1), Type::List(e2)) => equal_or_less_specific(e1, e2),
        (Type::Map(k1, v1), Type::Map(k2, v2)) => {
            equal_or_less_specific(k1, k2) && equal_or_less_specific(v1, v2)
        }
        (Type::Type(None), Type::Type(None)) => true,
        (Type::Type(Some(a)), Type::Type(Some(b))) => equal_or_less_specific(a, b),
        (Type::Opaque(n1, p1), Type::Opaque(n2, p2)) => {
            n1 == n2
                && p1.len() == p2.len()
                && p1.iter().zip(p2).all(|(a, b)| equal_or_less_specific(a, b))
        }
        (Type::Function(r1, a1), Type::Function(r2, a2)) => {
            equal_or_less_specific(r1, r2)
                && a1.len() == a2.len()
                && a1.iter().zip(a2).all(|(a, b)| equal_or_less_specific(a, b))
        }
        _ => false,
    }
}

/// `t1` if it is no more specific than `t2`, else `t2` (§4.3).
#[must_use]
pub fn most_general(t1: Type, t2: Type) -> Type {
    if equal_or_less_specific(&t1, &t2) {
        t1
    } else {
        t2
    }
}

/// Whether `param` appears anywhere inside `ty` (occurs-check).
#[must_use]
pub fn occurs(param: &str, ty: &Type) -> bool {
    match ty {
        Type::TypeParam(p) => &**p == param,
        Type::List(elem) => occurs(param, elem),
        Type::Map(k, v) => occurs(param, k) || occurs(param, v),
        Type::Type(Some(inner)) => occurs(param, inner),
        Type::Opaque(_, params) => params.iter().any(|p| occurs(param, p)),
        Type::Function(result, args) => occurs(param, result) || args.iter().any(|a| occurs(param, a)),
        _ => false,
    }
}

/// Attempt to extend `m` so that `t2` may be substituted for `t1` (§4.3).
///
/// Copy-on-write: the working map is cloned up front, so a failed attempt
/// never mutates the caller's substitution.
#[must_use]
pub fn assignable(m: &Substitution, t1: &Type, t2: &Type) -> Option<Substitution> {
    let mut working = m.clone();
    if try_assign(&mut working, t1, t2) {
        Some(working)
    } else {
        None
    }
}

fn try_assign(m: &mut Substitution, t1: &Type, t2: &Type) -> bool {
    if let (Type::TypeParam(p1), Type::TypeParam(p2)) = (t1, t2) {
        if p1 == p2 {
            return true;
        }
    }
    if let Type::TypeParam(p) = t2 {
        if let Some(bound) = m.lookup(p).cloned() {
            return try_assign(m, t1, &bound);
        }
        if occurs(p, t1) {
            return false;
        }
        m.bind(Rc::clone(p), t1.clone());
        return true;
    }
    if let Type::TypeParam(p) = t1 {
        if let Some(bound) = m.lookup(p).cloned() {
            return try_assign(m, &bound, t2);
        }
        if occurs(p, t2) {
            return false;
        }
        m.bind(Rc::clone(p), t2.clone());
        return true;
    }
    if matches!(t1, Type::Dyn | Type::Error) || matches!(t2, Type::Dyn | Type::Error) {
        return true;
    }
    if (matches!(t1, Type::Null) && t2.is_nullable()) || (matches!(t2, Type::Null) && t1.is_nullable())
    {
        return true;
    }

    let unwrapped1 = unwrap_wrapper(t1);
    let unwrapped2 = unwrap_wrapper(t2);

    match (unwrapped1, unwrapped2) {
        (Type::Null, Type::Null) => true,
        (Type::Primitive(a), Type::Primitive(b)) => a == b,
        (Type::WellKnown(a), Type::WellKnown(b)) => a == b,
        (Type::Object(a), Type::Object(b)) => a == b,
        (Type::List(e1), Type::List(e2)) => try_assign(m, &e1, &e2),
        (Type::Map(k1, v1), Type::Map(k2, v2)) => try_assign(m, &k1, &k2) && try_assign(m, &v1, &v2),
        (Type::Type(None), Type::Type(None)) => true,
        (Type::Type(Some(a)), Type::Type(Some(b))) => try_assign(m, &a, &b),
        (Type::Opaque(n1, p1), Type::Opaque(n2, p2)) => {
            n1 == n2
                && p1.len() == p2.len()
                && p1.into_iter().zip(p2).all(|(a, b)| try_assign(m, &a, &b))
        }
        (Type::Function(r1, a1), Type::Function(r2, a2)) => {
            try_assign(m, &r1, &r2)
                && a1.len() == a2.len()
                && a1.into_iter().zip(a2).all(|(a, b)| try_assign(m, &a, &b))
        }
        _ => false,
    }
}

/// Unwrap a `Wrapper(P)` to its underlying `Primitive(P)`; everything else
/// passes through by value (§4.3 rule 5).
fn unwrap_wrapper(ty: &Type) -> Type {
    match ty {
        Type::Wrapper(p) => Type::Primitive(*p),
        other => other.clone(),
    }
}

/// Replace every bound type-parameter in `ty` with its binding in `m`.
/// When `free_params_to_dyn` is set, any parameter still unbound after
/// the walk becomes `Dyn` — this is the final pass over the annotated
/// tree (§4.4 Final substitution).
#[must_use]
pub fn substitute(m: &Substitution, ty: &Type, free_params_to_dyn: bool) -> Type {
    match ty {
        Type::TypeParam(p) => match m.lookup(p) {
            Some(bound) => substitute(m, &bound.clone(), free_params_to_dyn),
            None if free_params_to_dyn => Type::Dyn,
            None => ty.clone(),
        },
        Type::List(elem) => Type::list(substitute(m, elem, free_params_to_dyn)),
        Type::Map(k, v) => Type::map(
            substitute(m, k, free_params_to_dyn),
            substitute(m, v, free_params_to_dyn),
        ),
        Type::Type(Some(inner)) => Type::Type(Some(Box::new(substitute(m, inner, free_params_to_dyn)))),
        Type::Opaque(name, params) => Type::Opaque(
            Rc::clone(name),
            params.iter().map(|p| substitute(m, p, free_params_to_dyn)).collect(),
        ),
        Type::Function(result, args) => Type::Function(
            Box::new(substitute(m, result, free_params_to_dyn)),
            args.iter().map(|a| substitute(m, a, free_params_to_dyn)).collect(),
        ),
        _ => ty.clone(),
    }
}

/// Mints type-parameter names disjoint across overload instantiations
/// (§9 "Fresh type variables").
#[derive(Debug, Default)]
pub struct FreshVarGen {
    counter: u32,
}

impl FreshVarGen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single fresh type-parameter.
    pub fn fresh(&mut self) -> Type {
        let id = self.counter;
        self.counter += 1;
        Type::type_param(format!("_fresh{id}"))
    }

    /// Instantiate an overload's declared type-parameters with fresh,
    /// mutually-disjoint variables, returning the renaming substitution
    /// to apply to its argument/result types before calling `assignable`.
    pub fn instantiate(&mut self, declared_params: &[String]) -> Substitution {
        let mut renaming = Substitution::new();
        for param in declared_params {
            renaming.bind(Rc::from(param.as_str()), self.fresh());
        }
        renaming
    }
}
