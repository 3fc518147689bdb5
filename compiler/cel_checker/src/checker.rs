//! The type checker (§4.4): one recursive walk that annotates every node
//! with a type and, where applicable, a resolved reference.

use cel_diagnostic::Diagnostic;
use cel_ir::{ExprId, Name, ParsedExpr, SharedInterner, SourceInfo, Span};
use cel_types::{Environment, FreshVarGen, Reference, Substitution, Type, Variable};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::expr::check_expr;
use crate::output::{CheckedExpr, Issue, Issues, Location};

/// Owns everything one `check()` call needs: its own substitution map,
/// fresh-variable counter, and the annotation maps being built up. The
/// `Environment` is cloned in — cheap, since it's `Rc`-backed — so a fresh
/// `Checker` is constructed per invocation and discarded, satisfying the
/// per-invocation-owned-state requirement of §5.
pub struct Checker {
    env: Environment,
    interner: SharedInterner,
    subst: Substitution,
    fresh: FreshVarGen,
    type_map: FxHashMap<ExprId, Type>,
    reference_map: FxHashMap<ExprId, Reference>,
    errors: Vec<Issue>,
    source_info: SourceInfo,
}

impl Checker {
    #[must_use]
    pub fn new(env: Environment, interner: SharedInterner) -> Self {
        Checker {
            env,
            interner,
            subst: Substitution::new(),
            fresh: FreshVarGen::new(),
            type_map: FxHashMap::default(),
            reference_map: FxHashMap::default(),
            errors: Vec::new(),
            source_info: SourceInfo::new(Vec::new()),
        }
    }

    /// Check `expr`, consuming `self`. Returns the annotated tree plus
    /// every issue collected along the way (§4.4, §6.4).
    #[must_use]
    pub fn check(mut self, expr: &ParsedExpr, source_info: SourceInfo) -> (CheckedExpr, Issues) {
        debug!(root = expr.id.get(), "checking expression");
        self.source_info = source_info;

        check_expr(&mut self, expr);

        let subst = self.subst.clone();
        let type_map = self
            .type_map
            .into_iter()
            .map(|(id, ty)| (id, cel_types::substitute(&subst, &ty, true)))
            .collect();

        let checked = CheckedExpr {
            expr: expr.clone(),
            source_info: self.source_info,
            type_map,
            reference_map: self.reference_map,
        };
        (checked, Issues { errors: self.errors })
    }

    #[must_use]
    pub(crate) fn env(&self) -> &Environment {
        &self.env
    }

    /// Push a child scope, returning the environment to restore on pop.
    pub(crate) fn push_scope(&mut self) -> Environment {
        let child = self.env.child();
        std::mem::replace(&mut self.env, child)
    }

    pub(crate) fn pop_scope(&mut self, saved: Environment) {
        self.env = saved;
    }

    pub(crate) fn declare_local(&mut self, name: impl Into<String>, ty: Type) {
        self.env.declare_variable(Variable::new(name, ty));
    }

    pub(crate) fn fresh_var(&mut self) -> Type {
        self.fresh.fresh()
    }

    pub(crate) fn instantiate_overload(&mut self, type_params: &[String]) -> Substitution {
        self.fresh.instantiate(type_params)
    }

    #[must_use]
    pub(crate) fn subst(&self) -> &Substitution {
        &self.subst
    }

    /// Commit a substitution produced by a successful `assignable` chain —
    /// only the first matching overload / first successful aggregate join
    /// does this (§4.4 Calls step 5, Create List/Map).
    pub(crate) fn commit(&mut self, subst: Substitution) {
        self.subst = subst;
    }

    #[must_use]
    pub(crate) fn lookup_name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    /// Record `id`'s type. A re-write is only permitted when the new type
    /// compares equal to the one already recorded — anything else is the
    /// hard internal invariant violation §4.4 "Re-entrancy" describes.
    pub(crate) fn record_type(&mut self, id: ExprId, ty: Type) {
        if let Some(existing) = self.type_map.get(&id) {
            assert_eq!(
                existing,
                &ty,
                "internal invariant violation: node {} re-typed from {existing} to {ty}",
                id.get()
            );
            return;
        }
        self.type_map.insert(id, ty);
    }

    pub(crate) fn record_reference(&mut self, id: ExprId, reference: Reference) {
        self.reference_map.insert(id, reference);
    }

    #[must_use]
    pub(crate) fn type_of(&self, id: ExprId) -> &Type {
        self.type_map.get(&id).unwrap_or(&Type::Dyn)
    }

    /// The span the parser recorded for `id` — a zero-length point at its
    /// byte offset, since `SourceInfo` only carries node starts (§6.1).
    #[must_use]
    pub(crate) fn span_of(&self, id: ExprId) -> Span {
        Span::point(self.source_info.offset(id).unwrap_or(0))
    }

    /// Turn `diagnostic` into an `Issue` located against `id`'s recorded
    /// source offset, and push it onto the collected list (§4.6).
    pub(crate) fn report(&mut self, id: ExprId, diagnostic: Diagnostic) {
        let offset = self.source_info.offset(id).unwrap_or(0);
        self.errors.push(Issue {
            id,
            location: self.location_of(offset),
            message: diagnostic.message,
        });
    }

    fn location_of(&self, offset: u32) -> Location {
        let line_offsets = self.source_info.line_offsets();
        let line_idx = match line_offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        let line_start = line_offsets.get(line_idx).copied().unwrap_or(0);
        Location {
            #[expect(clippy::cast_possible_truncation, reason = "line count fits u32")]
            line: line_idx as u32 + 1,
            column: offset.saturating_sub(line_start) + 1,
        }
    }
}
