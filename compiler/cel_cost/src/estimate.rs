//! The cost/size walk (§4.5): one recursive pass over a checked expression
//! producing a root [`CostEstimate`], consulting the [`CostEstimator`]
//! collaborator for sizes and per-overload cost rules it doesn't already
//! know, and falling back to the built-in rule table otherwise.

use cel_checker::CheckedExpr;
use cel_ir::{ComprehensionExpr, ExprId, ExprKind, LiteralKind, MapEntry, Name, ParsedExpr, SharedInterner, StructField};
use cel_stack::ensure_sufficient_stack;
use cel_types::{Primitive, Reference, Type};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::collaborator::CostEstimator;
use crate::config::CostConfig;
use crate::interval::{CostEstimate, Interval, SizeEstimate};
use crate::path::{self, Binding, PathScope};

/// Walk `checked` and return the root's cost estimate (§4.5).
#[must_use]
pub fn estimate_cost(
    checked: &CheckedExpr,
    interner: &SharedInterner,
    collaborator: &dyn CostEstimator,
    config: &CostConfig,
) -> CostEstimate {
    debug!(root = checked.expr.id.get(), "estimating cost");
    let mut walker = Walker {
        checked,
        interner,
        collaborator,
        config,
        paths: PathScope::new(),
        sizes: FxHashMap::default(),
        element_sizes: FxHashMap::default(),
        key_sizes: FxHashMap::default(),
    };
    walker.cost_of(&checked.expr)
}

struct Walker<'a> {
    checked: &'a CheckedExpr,
    interner: &'a SharedInterner,
    collaborator: &'a dyn CostEstimator,
    config: &'a CostConfig,
    paths: PathScope,
    sizes: FxHashMap<ExprId, SizeEstimate>,
    /// For `List`/`Map` container nodes: the union of element (or value)
    /// sizes, used to seed the iter-var size when the container is a
    /// comprehension range, or an index result's size (§4.5 "Sizes").
    element_sizes: FxHashMap<ExprId, SizeEstimate>,
    /// Map-only: the union of key sizes, for two-variable iteration.
    key_sizes: FxHashMap<ExprId, SizeEstimate>,
}

impl Walker<'_> {
    fn cost_of(&mut self, expr: &ParsedExpr) -> CostEstimate {
        ensure_sufficient_stack(|| self.cost_of_inner(expr))
    }

    fn cost_of_inner(&mut self, expr: &ParsedExpr) -> CostEstimate {
        match &expr.kind {
            ExprKind::Literal(kind) => self.cost_literal(expr.id, kind),
            ExprKind::Ident(name) => self.cost_ident(expr.id, *name),
            ExprKind::Select {
                operand,
                field,
                test_only,
                optional,
            } => self.cost_select(expr.id, operand, *field, *test_only, *optional),
            ExprKind::Call {
                target,
                function,
                args,
            } => self.cost_call(expr.id, target.as_deref(), *function, args),
            ExprKind::List { elements, .. } => self.cost_list(expr.id, elements),
            ExprKind::Map { entries } => self.cost_map(expr.id, entries),
            ExprKind::Struct { fields, .. } => self.cost_struct(expr.id, fields),
            ExprKind::Comprehension(comp) => self.cost_comprehension(expr.id, comp),
        }
    }

    fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    fn record_size(&mut self, id: ExprId, size: SizeEstimate) -> SizeEstimate {
        self.sizes.insert(id, size);
        size
    }

    fn size_of(&self, id: ExprId) -> SizeEstimate {
        self.sizes.get(&id).copied().unwrap_or(Interval::UNKNOWN)
    }

    fn type_of(&self, id: ExprId) -> Type {
        self.checked.type_of(id).cloned().unwrap_or(Type::Dyn)
    }

    fn size_by_path(&self, path: Option<Vec<String>>) -> SizeEstimate {
        match path {
            Some(segments) => self.collaborator.estimate_size(&segments).unwrap_or(Interval::UNKNOWN),
            None => Interval::UNKNOWN,
        }
    }

    /// Build the collaborator path for `expr`, following plain
    /// `Ident`/`Select` chains (§4.5 "Path construction").
    fn path_of(&self, expr: &ParsedExpr) -> Option<Vec<String>> {
        match &expr.kind {
            ExprKind::Ident(name) => self.path_of_name(self.name(*name)),
            ExprKind::Select { operand, field, .. } => path::append(self.path_of(operand).as_deref(), self.name(*field)),
            _ => None,
        }
    }

    /// The collaborator path for a bare name, for extending into a `Select`
    /// chain. A name bound directly to a size (an inline-literal iter-var)
    /// has no path to extend from.
    fn path_of_name(&self, name: &str) -> Option<Vec<String>> {
        match self.paths.lookup(name) {
            Some(Some(Binding::Path(path))) => Some(path.to_vec()),
            Some(Some(Binding::Size(_)) | None) => None,
            None => Some(vec![name.to_string()]),
        }
    }

    /// The size of a bare name reference: a direct size binding short-
    /// circuits the collaborator query entirely.
    fn size_of_name(&self, name: &str) -> SizeEstimate {
        match self.paths.lookup(name) {
            Some(Some(Binding::Size(size))) => *size,
            Some(Some(Binding::Path(path))) => self.size_by_path(Some(path.to_vec())),
            Some(None) => Interval::UNKNOWN,
            None => self.size_by_path(Some(vec![name.to_string()])),
        }
    }

    /// Size of `target[_]`: the element/value union recorded when `target`
    /// is a list or map literal, else a collaborator lookup through the
    /// `@items`/`@values` path suffix (§4.5 "Sizes", "index results").
    fn index_result_size(&self, target: &ParsedExpr, target_ty: Option<&Type>) -> SizeEstimate {
        if let Some(size) = self.element_sizes.get(&target.id) {
            return *size;
        }
        let suffix = match target_ty {
            Some(Type::Map(..)) => "@values",
            _ => "@items",
        };
        self.size_by_path(path::append(self.path_of(target).as_deref(), suffix))
    }

    fn cost_literal(&mut self, id: ExprId, kind: &LiteralKind) -> CostEstimate {
        let size = match kind {
            LiteralKind::String(name) => Interval::exact(u64::try_from(self.name(*name).len()).unwrap_or(u64::MAX)),
            LiteralKind::Bytes(bytes) => Interval::exact(u64::try_from(bytes.len()).unwrap_or(u64::MAX)),
            LiteralKind::Int(_) | LiteralKind::Uint(_) | LiteralKind::Double(_) | LiteralKind::Bool(_) | LiteralKind::Null => {
                Interval::exact(1)
            }
        };
        self.record_size(id, size);
        CostEstimate::ZERO
    }

    fn cost_ident(&mut self, id: ExprId, name: Name) -> CostEstimate {
        let name = self.name(name).to_string();
        let size = self.size_of_name(&name);
        self.record_size(id, size);
        Interval::exact(1)
    }

    fn cost_select(&mut self, id: ExprId, operand: &ParsedExpr, field: Name, test_only: bool, _optional: bool) -> CostEstimate {
        let operand_cost = self.cost_of(operand);
        let path = path::append(self.path_of(operand).as_deref(), self.name(field));
        let size = self.size_by_path(path);
        self.record_size(id, size);

        let base = 1 + if test_only { self.config.presence_test_cost } else { 0 };
        operand_cost.add(Interval::exact(base))
    }

    fn cost_call(&mut self, id: ExprId, target: Option<&ParsedExpr>, function: Name, args: &[ParsedExpr]) -> CostEstimate {
        let fn_name = self.name(function).to_string();

        let target_cost = target.map(|t| self.cost_of(t)).unwrap_or(Interval::ZERO);
        let target_size = target.map(|t| self.size_of(t.id));
        let target_ty = target.map(|t| self.type_of(t.id));

        let arg_costs: Vec<CostEstimate> = args.iter().map(|a| self.cost_of(a)).collect();
        let arg_sizes: Vec<SizeEstimate> = args.iter().map(|a| self.size_of(a.id)).collect();

        match fn_name.as_str() {
            "&&" | "||" if arg_costs.len() == 2 => {
                let short_circuit = arg_costs[0].union(arg_costs[0].add(arg_costs[1]));
                self.record_size(id, Interval::UNKNOWN);
                return short_circuit;
            }
            "?:" if arg_costs.len() == 3 => {
                let cond_cost = arg_costs[0];
                let branch_cost = arg_costs[1].union(arg_costs[2]);
                let result_size = arg_sizes[1].union(arg_sizes[2]);
                self.record_size(id, result_size);
                return cond_cost.add(branch_cost);
            }
            "_[_]" => {
                if let Some(t) = target {
                    let result_size = self.index_result_size(t, target_ty.as_ref());
                    self.record_size(id, result_size);
                    return target_cost.add(arg_costs.into_iter().fold(Interval::ZERO, Interval::add)).add(Interval::exact(1));
                }
            }
            _ => {}
        }

        let overload_id = self.overload_id_of(id);
        let (call_cost, result_size) = match self
            .collaborator
            .estimate_call(&fn_name, &overload_id, target_size, &arg_sizes)
        {
            Some(estimate) => (estimate.cost, estimate.result_size),
            None => builtin_call_cost(&fn_name, target_ty.as_ref(), target_size, &arg_sizes),
        };

        self.record_size(id, result_size.unwrap_or(Interval::UNKNOWN));

        let args_total = arg_costs.into_iter().fold(Interval::ZERO, Interval::add);
        target_cost.add(args_total).add(call_cost)
    }

    /// The overload id the checker resolved for this call, or `""` if
    /// unresolved (ambiguous calls already narrowed to `Dyn` by the
    /// checker; the collaborator sees only the first matching id).
    fn overload_id_of(&self, id: ExprId) -> String {
        match self.checked.reference_of(id) {
            Some(Reference::Overloads(ids)) => ids.first().cloned().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn cost_list(&mut self, id: ExprId, elements: &[ParsedExpr]) -> CostEstimate {
        let mut total = Interval::exact(10);
        let mut element_size = None;
        for element in elements {
            total = total.add(self.cost_of(element));
            let size = self.size_of(element.id);
            element_size = Some(match element_size {
                None => size,
                Some(prev) => Interval::union(prev, size),
            });
        }
        self.record_size(id, Interval::exact(u64::try_from(elements.len()).unwrap_or(u64::MAX)));
        if let Some(size) = element_size {
            self.element_sizes.insert(id, size);
        }
        total
    }

    fn cost_map(&mut self, id: ExprId, entries: &[MapEntry]) -> CostEstimate {
        let mut total = Interval::exact(30);
        let mut key_size = None;
        let mut value_size = None;
        for entry in entries {
            total = total.add(self.cost_of(&entry.key)).add(self.cost_of(&entry.value));
            let k = self.size_of(entry.key.id);
            let v = self.size_of(entry.value.id);
            key_size = Some(key_size.map_or(k, |prev| Interval::union(prev, k)));
            value_size = Some(value_size.map_or(v, |prev| Interval::union(prev, v)));
        }
        self.record_size(id, Interval::exact(u64::try_from(entries.len()).unwrap_or(u64::MAX)));
        if let Some(size) = key_size {
            self.key_sizes.insert(id, size);
        }
        if let Some(size) = value_size {
            self.element_sizes.insert(id, size);
        }
        total
    }

    fn cost_struct(&mut self, id: ExprId, fields: &[StructField]) -> CostEstimate {
        let mut total = Interval::exact(40);
        for field in fields {
            total = total.add(self.cost_of(&field.value));
        }
        self.record_size(id, Interval::exact(1));
        total
    }

    fn cost_comprehension(&mut self, id: ExprId, comp: &ComprehensionExpr) -> CostEstimate {
        let range_cost = self.cost_of(&comp.iter_range);
        let range_size = self.size_of(comp.iter_range.id);
        let range_ty = self.type_of(comp.iter_range.id);
        let range_path = self.path_of(&comp.iter_range);

        let accu_init_cost = self.cost_of(&comp.accu_init);
        let accu_init_size = self.size_of(comp.accu_init.id);

        let is_bind = self.is_bind_pattern(comp);

        let outer_saved = self.paths.clone();
        self.paths = self.paths.child();
        self.paths.bind(self.name(comp.accu_var).to_string(), None);

        let inner_saved = self.paths.clone();
        self.paths = self.paths.child();
        self.bind_iter_vars(comp, comp.iter_range.id, &range_ty, range_path.as_deref());

        let condition_cost = self.cost_of(&comp.loop_condition);
        let step_cost = self.cost_of(&comp.loop_step);

        self.paths = inner_saved;

        let total = if is_bind {
            let result_cost = self.cost_of(&comp.result);
            self.paths = outer_saved;
            let result_size = self.size_of(comp.result.id);
            self.record_size(id, result_size);
            range_cost.add(accu_init_cost).add(result_cost)
        } else {
            let per_iteration = condition_cost.add(step_cost);
            let loop_cost = range_size.multiply(per_iteration);
            let result_cost = self.cost_of(&comp.result);
            self.paths = outer_saved;
            let result_size = self.size_of(comp.result.id).union(accu_init_size);
            self.record_size(id, result_size);
            range_cost.add(accu_init_cost).add(loop_cost).add(result_cost)
        };
        total
    }

    /// Bind `iter_var`/`iter_var2` to paths derived from the range's own
    /// path, suffixed per §4.5 "Path construction": `@items` for a
    /// single-variable list loop, `@indices`/`@items` for the two-variable
    /// list form, `@keys`/`@values` for maps. When the range has no path of
    /// its own (an inline list/map literal), fall back to the element/key
    /// size union the constructor already recorded.
    fn bind_iter_vars(&mut self, comp: &ComprehensionExpr, range_id: ExprId, range_ty: &Type, range_path: Option<&[String]>) {
        let element_size = self.element_sizes.get(&range_id).copied();
        let key_size = self.key_sizes.get(&range_id).copied();
        let iter_var = self.name(comp.iter_var).to_string();

        match (range_ty, comp.iter_var2) {
            (Type::List(_), None) => {
                self.bind_name_or_size(iter_var, path::append(range_path, "@items"), element_size);
            }
            (Type::List(_), Some(iter_var2)) => {
                self.bind_name_or_size(iter_var, path::append(range_path, "@indices"), None);
                let value_name = self.name(iter_var2).to_string();
                self.bind_name_or_size(value_name, path::append(range_path, "@items"), element_size);
            }
            (Type::Map(..), None) => {
                self.bind_name_or_size(iter_var, path::append(range_path, "@keys"), key_size);
            }
            (Type::Map(..), Some(iter_var2)) => {
                self.bind_name_or_size(iter_var, path::append(range_path, "@keys"), key_size);
                let value_name = self.name(iter_var2).to_string();
                self.bind_name_or_size(value_name, path::append(range_path, "@values"), element_size);
            }
            _ => {
                self.paths.bind(iter_var, None);
                if let Some(iter_var2) = comp.iter_var2 {
                    let value_name = self.name(iter_var2).to_string();
                    self.paths.bind(value_name, None);
                }
            }
        }
    }

    /// Bind `name` to a path when the range has one; otherwise to the
    /// literal-derived size directly, or root-less if neither is known.
    fn bind_name_or_size(&mut self, name: String, path: Option<Vec<String>>, literal_size: Option<SizeEstimate>) {
        match (path, literal_size) {
            (Some(p), _) => self.paths.bind(name, Some(p)),
            (None, Some(size)) => self.paths.bind_size(name, size),
            (None, None) => self.paths.bind(name, None),
        }
    }

    /// A comprehension recognized as a sequential `let`-binding rather than
    /// an actual loop: empty-list range, a `false` loop condition, and an
    /// accumulator variable other than the reserved one the macro expander
    /// uses for real iteration (`all`, `exists`, ...) — the shape
    /// `cel.bind`/`optMap`-style single-evaluation constructs emit (§4.5
    /// "Comprehension cost").
    fn is_bind_pattern(&self, comp: &ComprehensionExpr) -> bool {
        let empty_range = matches!(&comp.iter_range.kind, ExprKind::List { elements, .. } if elements.is_empty());
        let false_condition = matches!(&comp.loop_condition.kind, ExprKind::Literal(LiteralKind::Bool(false)));
        let non_reserved_accu = self.name(comp.accu_var) != RESERVED_ACCUMULATOR_VAR;
        empty_range && false_condition && non_reserved_accu
    }
}

/// The accumulator-variable name the macro expander reserves for real
/// iteration (`all`, `exists`, `exists_one`, `map`, `filter`); a
/// comprehension using it is never a bind pattern even if its range and
/// loop condition happen to match that shape.
const RESERVED_ACCUMULATOR_VAR: &str = "__result__";

/// The built-in per-overload cost table (§4.5 "Per-overload cost"),
/// consulted when the `CostEstimator` collaborator has no rule of its own.
fn builtin_call_cost(
    function: &str,
    target_ty: Option<&Type>,
    target_size: Option<SizeEstimate>,
    arg_sizes: &[SizeEstimate],
) -> (CostEstimate, Option<SizeEstimate>) {
    let operand_size = target_size.or_else(|| arg_sizes.first().copied()).unwrap_or(Interval::UNKNOWN);

    match function {
        "startsWith" | "endsWith" | "string" | "bytes" => (operand_size.multiply_by_cost_factor(0.1), None),
        "matches" => {
            let pattern = arg_sizes.first().copied().unwrap_or(Interval::UNKNOWN);
            let target_factor = operand_size.add(Interval::exact(1)).multiply_by_cost_factor(0.1);
            let pattern_factor = pattern.multiply_by_cost_factor(0.25);
            (target_factor.multiply(pattern_factor), None)
        }
        "contains" => {
            let substr = arg_sizes.first().copied().unwrap_or(Interval::UNKNOWN);
            let left = operand_size.multiply_by_cost_factor(0.1);
            let right = substr.multiply_by_cost_factor(0.1);
            (left.multiply(right), None)
        }
        "in" | "in_list" => {
            let list = arg_sizes.last().copied().unwrap_or(Interval::UNKNOWN);
            (list, None)
        }
        "+" => match target_ty {
            Some(Type::Primitive(Primitive::String | Primitive::Bytes)) | None if is_string_like(arg_sizes) => {
                let combined = operand_size.add(arg_sizes.first().copied().unwrap_or(Interval::UNKNOWN));
                (combined.multiply_by_cost_factor(0.1), Some(combined))
            }
            Some(Type::List(_)) => {
                let combined = operand_size.add(arg_sizes.first().copied().unwrap_or(Interval::UNKNOWN));
                (Interval::exact(1), Some(combined))
            }
            _ => (Interval::exact(1), None),
        },
        "<" | "<=" | ">" | ">=" => match target_ty {
            Some(Type::Primitive(Primitive::String | Primitive::Bytes)) => {
                let rhs = arg_sizes.first().copied().unwrap_or(Interval::UNKNOWN);
                (min_interval(operand_size, rhs).multiply_by_cost_factor(0.1), None)
            }
            _ => (Interval::exact(1), None),
        },
        _ => (Interval::exact(1), None),
    }
}

/// Best-effort fallback used only when `+`'s target type wasn't resolved
/// (e.g. operating on `Dyn`): treat it as string-like if an arg size was
/// even recorded, since numeric literals never populate a size.
fn is_string_like(arg_sizes: &[SizeEstimate]) -> bool {
    arg_sizes.first().is_some_and(|s| *s != Interval::UNKNOWN)
}

/// Element-wise minimum, used by the relational-operator rule above
/// (§4.5: `0.1 × min(size(lhs), size(rhs))`).
fn min_interval(a: Interval, b: Interval) -> Interval {
    Interval::new(a.min.min(b.min), a.max.min(b.max))
}

#[cfg(test)]
mod tests;
