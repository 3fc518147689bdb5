use std::rc::Rc;

use cel_checker::Checker;
use cel_ir::{ExprId, ExprKind, LiteralKind, MapEntry, ParsedExpr, SharedInterner, SourceInfo, StructField};
use cel_types::{Environment, FieldType, Overload, Primitive, Type, TypeProvider, Variable};
use rustc_hash::FxHashMap;

use super::*;
use crate::collaborator::{CallEstimate, NoCostEstimator};
use crate::config::CostConfig;

/// One object type, `Msg`, with an `int` field `n`.
#[derive(Debug, Default)]
struct TestProvider;

impl TypeProvider for TestProvider {
    fn find_type(&self, fqn: &str) -> Option<Type> {
        (fqn == "Msg").then(|| Type::object("Msg"))
    }

    fn find_field_type(&self, object_type: &Type, field_name: &str) -> Option<FieldType> {
        (object_type == &Type::object("Msg") && field_name == "n").then(|| FieldType::new(Type::Primitive(Primitive::Int), true))
    }

    fn find_ident(&self, _name: &str) -> Option<(Type, Option<cel_types::ConstantValue>)> {
        None
    }
}

fn env() -> Environment {
    Environment::new("", Rc::new(TestProvider))
}

fn id(raw: u32) -> ExprId {
    ExprId::new(raw)
}

fn lit_int(raw: u32, value: i64) -> ParsedExpr {
    ParsedExpr::new(id(raw), ExprKind::Literal(LiteralKind::Int(value)))
}

fn lit_str(raw: u32, interner: &SharedInterner, value: &str) -> ParsedExpr {
    ParsedExpr::new(id(raw), ExprKind::Literal(LiteralKind::String(interner.intern(value))))
}

fn ident_expr(raw: u32, interner: &SharedInterner, name: &str) -> ParsedExpr {
    ParsedExpr::new(id(raw), ExprKind::Ident(interner.intern(name)))
}

fn declare_contains_overload(environment: &mut Environment) {
    environment
        .declare_overload(
            "contains",
            Overload::new(
                "contains_string",
                vec![Type::Primitive(Primitive::String), Type::Primitive(Primitive::String)],
                Type::Primitive(Primitive::Bool),
            )
            .instance(),
        )
        .expect("no prior overload for 'contains' in a fresh environment");
}

fn declare_starts_with_overload(environment: &mut Environment) {
    environment
        .declare_overload(
            "startsWith",
            Overload::new(
                "starts_with_string",
                vec![Type::Primitive(Primitive::String), Type::Primitive(Primitive::String)],
                Type::Primitive(Primitive::Bool),
            )
            .instance(),
        )
        .expect("no prior overload for 'startsWith' in a fresh environment");
}

fn checked(environment: Environment, interner: SharedInterner, expr: &ParsedExpr) -> CheckedExpr {
    let (checked, issues) = Checker::new(environment, interner).check(expr, SourceInfo::default());
    assert!(issues.is_empty(), "unexpected check errors: {:?}", issues.errors);
    checked
}

/// A collaborator backed by a fixed path → size table; `estimate_call`
/// always defers to the built-in rules unless overridden by a subtype.
#[derive(Default)]
struct FakeEstimator {
    sizes: FxHashMap<Vec<String>, SizeEstimate>,
}

impl FakeEstimator {
    fn with(mut self, path: &[&str], size: SizeEstimate) -> Self {
        self.sizes.insert(path.iter().map(ToString::to_string).collect(), size);
        self
    }
}

impl CostEstimator for FakeEstimator {
    fn estimate_size(&self, path: &[String]) -> Option<SizeEstimate> {
        self.sizes.get(path).copied()
    }

    fn estimate_call(&self, _function: &str, _overload_id: &str, _target: Option<SizeEstimate>, _args: &[SizeEstimate]) -> Option<CallEstimate> {
        None
    }
}

#[test]
fn test_literal_cost_is_zero_and_size_is_byte_length() {
    let interner = SharedInterner::new();
    let expr = lit_str(1, &interner, "ab");
    let checked = checked(env(), interner.clone(), &expr);

    let cost = estimate_cost(&checked, &interner, &NoCostEstimator, &CostConfig::default());
    assert_eq!(cost, CostEstimate::ZERO);
}

#[test]
fn test_ident_cost_is_one_and_size_comes_from_collaborator() {
    let interner = SharedInterner::new();
    let mut environment = env();
    environment.declare_variable(Variable::new("x", Type::Primitive(Primitive::Int)));
    let expr = ident_expr(1, &interner, "x");
    let checked = checked(environment, interner.clone(), &expr);

    let collaborator = FakeEstimator::default().with(&["x"], Interval::exact(4));
    let cost = estimate_cost(&checked, &interner, &collaborator, &CostConfig::default());
    assert_eq!(cost, CostEstimate::exact(1));
}

#[test]
fn test_select_adds_presence_test_cost_on_top_of_the_field_select() {
    let interner = SharedInterner::new();
    let mut environment = env();
    environment.declare_variable(Variable::new("msg", Type::object("Msg")));

    let operand = ident_expr(1, &interner, "msg");
    let has = ParsedExpr::new(
        id(2),
        ExprKind::Select {
            operand: Box::new(operand),
            field: interner.intern("n"),
            test_only: true,
            optional: false,
        },
    );
    let checked = checked(environment, interner.clone(), &has);

    let cost = estimate_cost(&checked, &interner, &NoCostEstimator, &CostConfig::default());
    // ident(1) + select(1) + presence test(1, the default) = 3.
    assert_eq!(cost, CostEstimate::exact(3));
}

#[test]
fn test_list_base_cost_plus_element_costs() {
    let interner = SharedInterner::new();
    let list = ParsedExpr::new(
        id(3),
        ExprKind::List {
            elements: vec![lit_int(1, 1), lit_int(2, 2)],
            optional_indices: Vec::new(),
        },
    );
    let checked = checked(env(), interner.clone(), &list);

    let cost = estimate_cost(&checked, &interner, &NoCostEstimator, &CostConfig::default());
    assert_eq!(cost, CostEstimate::exact(10));
}

#[test]
fn test_map_base_cost_plus_entry_costs() {
    let interner = SharedInterner::new();
    let map = ParsedExpr::new(
        id(3),
        ExprKind::Map {
            entries: vec![MapEntry {
                key: lit_int(1, 1),
                value: lit_int(2, 2),
                optional: false,
            }],
        },
    );
    let checked = checked(env(), interner.clone(), &map);

    let cost = estimate_cost(&checked, &interner, &NoCostEstimator, &CostConfig::default());
    assert_eq!(cost, CostEstimate::exact(30));
}

#[test]
fn test_struct_base_cost_plus_field_costs() {
    let interner = SharedInterner::new();
    let strukt = ParsedExpr::new(
        id(3),
        ExprKind::Struct {
            type_name: interner.intern("Msg"),
            fields: vec![StructField {
                name: interner.intern("n"),
                value: lit_int(1, 5),
                optional: false,
            }],
        },
    );
    let checked = checked(env(), interner.clone(), &strukt);

    let cost = estimate_cost(&checked, &interner, &NoCostEstimator, &CostConfig::default());
    assert_eq!(cost, CostEstimate::exact(40));
}

#[test]
fn test_logical_and_costs_the_union_of_short_circuit_and_full_evaluation() {
    let interner = SharedInterner::new();
    let mut environment = env();
    environment.declare_variable(Variable::new("a", Type::Primitive(Primitive::Bool)));
    environment.declare_variable(Variable::new("b", Type::Primitive(Primitive::Bool)));
    environment
        .declare_overload(
            "&&",
            Overload::new(
                "logical_and",
                vec![Type::Primitive(Primitive::Bool), Type::Primitive(Primitive::Bool)],
                Type::Primitive(Primitive::Bool),
            ),
        )
        .expect("no prior overload for '&&' in a fresh environment");

    let call = ParsedExpr::new(
        id(3),
        ExprKind::Call {
            target: None,
            function: interner.intern("&&"),
            args: vec![ident_expr(1, &interner, "a"), ident_expr(2, &interner, "b")],
        },
    );
    let checked = checked(environment, interner.clone(), &call);

    let cost = estimate_cost(&checked, &interner, &NoCostEstimator, &CostConfig::default());
    // Each ident costs 1; short-circuit unions [1, 1+1] = [1, 2].
    assert_eq!(cost, CostEstimate::new(1, 2));
}

#[test]
fn test_conditional_costs_condition_plus_union_of_branches() {
    let interner = SharedInterner::new();
    let mut environment = env();
    environment.declare_variable(Variable::new("c", Type::Primitive(Primitive::Bool)));
    environment
        .declare_overload(
            "?:",
            Overload::new(
                "conditional",
                vec![Type::Primitive(Primitive::Bool), Type::Primitive(Primitive::Int), Type::Primitive(Primitive::Int)],
                Type::Primitive(Primitive::Int),
            ),
        )
        .expect("no prior overload for '?:' in a fresh environment");

    let call = ParsedExpr::new(
        id(4),
        ExprKind::Call {
            target: None,
            function: interner.intern("?:"),
            args: vec![ident_expr(1, &interner, "c"), lit_int(2, 1), lit_int(3, 2)],
        },
    );
    let checked = checked(environment, interner.clone(), &call);

    let cost = estimate_cost(&checked, &interner, &NoCostEstimator, &CostConfig::default());
    // cond(1) + union(branch costs 0, 0) = 1.
    assert_eq!(cost, CostEstimate::exact(1));
}

#[test]
fn test_contains_cost_scales_with_target_and_argument_size() {
    let interner = SharedInterner::new();
    let mut environment = env();
    environment.declare_variable(Variable::new("s", Type::Primitive(Primitive::String)));
    declare_contains_overload(&mut environment);

    let call = ParsedExpr::new(
        id(2),
        ExprKind::Call {
            target: Some(Box::new(ident_expr(1, &interner, "s"))),
            function: interner.intern("contains"),
            args: vec![lit_str(3, &interner, "needle")],
        },
    );
    let checked = checked(environment, interner.clone(), &call);

    let collaborator = FakeEstimator::default().with(&["s"], Interval::exact(100));
    let cost = estimate_cost(&checked, &interner, &collaborator, &CostConfig::default());
    // target cost 1 + arg cost 0 + (0.1*100 ceil) * (0.1*6 ceil) = 1 + 10*1 = 11.
    assert_eq!(cost, CostEstimate::exact(11));
}

/// A collaborator that overrides every call with a fixed estimate,
/// regardless of what the built-in rule table would say.
struct FixedCallEstimator(CallEstimate);

impl CostEstimator for FixedCallEstimator {
    fn estimate_size(&self, _path: &[String]) -> Option<SizeEstimate> {
        None
    }

    fn estimate_call(&self, _function: &str, _overload_id: &str, _target: Option<SizeEstimate>, _args: &[SizeEstimate]) -> Option<CallEstimate> {
        Some(self.0)
    }
}

#[test]
fn test_collaborator_call_override_replaces_the_builtin_rule() {
    let interner = SharedInterner::new();
    let mut environment = env();
    environment.declare_variable(Variable::new("s", Type::Primitive(Primitive::String)));
    declare_contains_overload(&mut environment);

    let call = ParsedExpr::new(
        id(2),
        ExprKind::Call {
            target: Some(Box::new(ident_expr(1, &interner, "s"))),
            function: interner.intern("contains"),
            args: vec![lit_str(3, &interner, "needle")],
        },
    );
    let checked = checked(environment, interner.clone(), &call);

    let collaborator = FixedCallEstimator(CallEstimate {
        cost: CostEstimate::exact(500),
        result_size: None,
    });
    let cost = estimate_cost(&checked, &interner, &collaborator, &CostConfig::default());
    // target(1) + arg(0) + collaborator's fixed call cost(500), not the built-in 0.1*0.1 rule.
    assert_eq!(cost, CostEstimate::exact(501));
}

#[test]
fn test_bind_pattern_comprehension_skips_the_range_multiplication() {
    let interner = SharedInterner::new();
    // Not the reserved `__result__` accumulator name: a real `all`/`exists`
    // loop never takes the bind shortcut even with an empty range and a
    // `false` condition, so the bind-pattern recognition this test targets
    // only fires away from that name.
    let accu_var = interner.intern("acc");
    let iter_var = interner.intern("unused");

    let comprehension = ParsedExpr::new(
        id(6),
        ExprKind::Comprehension(Box::new(cel_ir::ComprehensionExpr {
            iter_var,
            iter_var2: None,
            iter_range: ParsedExpr::new(
                id(1),
                ExprKind::List {
                    elements: Vec::new(),
                    optional_indices: Vec::new(),
                },
            ),
            accu_var,
            accu_init: lit_int(2, 1),
            loop_condition: ParsedExpr::new(id(3), ExprKind::Literal(LiteralKind::Bool(false))),
            loop_step: ParsedExpr::new(id(4), ExprKind::Ident(accu_var)),
            result: ParsedExpr::new(id(5), ExprKind::Ident(accu_var)),
        })),
    );
    let checked = checked(env(), interner.clone(), &comprehension);

    let cost = estimate_cost(&checked, &interner, &NoCostEstimator, &CostConfig::default());
    // range(10, empty list) + accu_init(0) + result(1, ident) = 11; no per-iteration term.
    assert_eq!(cost, CostEstimate::exact(11));
}

#[test]
fn test_reserved_accu_var_name_is_never_treated_as_a_bind_pattern() {
    // Same empty-range/false-condition shape as the bind pattern above, but
    // with the reserved `__result__` accumulator name a real `all`/`exists`
    // loop uses. The comprehension's *cost* comes out the same either way
    // (the range is empty, so the per-iteration term is always zero), but
    // its recorded *size* differs: the general path unions in `accu_init`'s
    // size, the bind path doesn't. Wrapping it in `startsWith` surfaces that
    // difference in the outer call's cost.
    let interner = SharedInterner::new();
    let accu_var = interner.intern("__result__");
    let iter_var = interner.intern("unused");

    let comprehension = ParsedExpr::new(
        id(6),
        ExprKind::Comprehension(Box::new(cel_ir::ComprehensionExpr {
            iter_var,
            iter_var2: None,
            iter_range: ParsedExpr::new(
                id(1),
                ExprKind::List {
                    elements: Vec::new(),
                    optional_indices: Vec::new(),
                },
            ),
            accu_var,
            accu_init: lit_str(2, &interner, "01234567890123456789012345678901234567890123456789"),
            loop_condition: ParsedExpr::new(id(3), ExprKind::Literal(LiteralKind::Bool(false))),
            loop_step: ParsedExpr::new(id(4), ExprKind::Ident(accu_var)),
            result: lit_str(5, &interner, "abc"),
        })),
    );
    let call = ParsedExpr::new(
        id(7),
        ExprKind::Call {
            target: Some(Box::new(comprehension)),
            function: interner.intern("startsWith"),
            args: vec![lit_str(8, &interner, "x")],
        },
    );

    let mut environment = env();
    declare_starts_with_overload(&mut environment);
    let checked = checked(environment, interner.clone(), &call);

    let cost = estimate_cost(&checked, &interner, &NoCostEstimator, &CostConfig::default());
    // comprehension: range(10) + accu_init(0) + result(0) = 10, size =
    // union(size("abc")=3, size(the 50-char accu_init)=50) = [3,50] via the
    // general path (the bind path would report size 3 alone). startsWith
    // scales that by 0.1: [ceil(0.3), ceil(5.0)] = [1,5]. Total = 10 + 0
    // (arg) + [1,5].
    assert_eq!(cost, CostEstimate::new(11, 15));
}

#[test]
fn test_general_comprehension_multiplies_range_size_by_loop_body_cost() {
    let interner = SharedInterner::new();
    let mut environment = env();
    environment.declare_variable(Variable::new("items", Type::list(Type::Primitive(Primitive::Int))));

    let accu_var = interner.intern("__result__");
    let iter_var = interner.intern("x");

    let comprehension = ParsedExpr::new(
        id(6),
        ExprKind::Comprehension(Box::new(cel_ir::ComprehensionExpr {
            iter_var,
            iter_var2: None,
            iter_range: ident_expr(1, &interner, "items"),
            accu_var,
            accu_init: lit_int(2, 0),
            loop_condition: ParsedExpr::new(id(3), ExprKind::Literal(LiteralKind::Bool(true))),
            loop_step: ParsedExpr::new(id(4), ExprKind::Ident(iter_var)),
            result: ParsedExpr::new(id(5), ExprKind::Ident(accu_var)),
        })),
    );
    let checked = checked(environment, interner.clone(), &comprehension);

    let collaborator = FakeEstimator::default().with(&["items"], Interval::exact(3));
    let cost = estimate_cost(&checked, &interner, &collaborator, &CostConfig::default());
    // range ident(1) + accu_init(0) + range_size(3)*(cond literal(0) + step ident(1)) + result ident(1) = 5.
    assert_eq!(cost, CostEstimate::exact(5));
}
