//! Shared fixtures for the end-to-end scenario tests (§8).

use std::rc::Rc;

use cel::{CallEstimate, ConstantValue, CostEstimator, Environment, FieldType, Overload, Primitive, SizeEstimate, Type, TypeProvider, Variable};
use rustc_hash::FxHashMap;

/// A provider resolving `google.expr.proto3.test.TestAllTypes`, the message
/// type the §8 scenario table exercises, with the handful of fields S2/S5
/// reference.
#[derive(Debug, Default)]
pub struct TestAllTypesProvider;

const TEST_ALL_TYPES: &str = "TestAllTypes";

impl TypeProvider for TestAllTypesProvider {
    fn find_type(&self, fqn: &str) -> Option<Type> {
        (fqn == TEST_ALL_TYPES).then(|| Type::object(TEST_ALL_TYPES))
    }

    fn find_field_type(&self, object_type: &Type, field_name: &str) -> Option<FieldType> {
        if object_type != &Type::object(TEST_ALL_TYPES) {
            return None;
        }
        match field_name {
            "single_int32" => Some(FieldType::new(Type::Primitive(Primitive::Int), true)),
            _ => None,
        }
    }

    fn find_ident(&self, name: &str) -> Option<(Type, Option<ConstantValue>)> {
        (name == TEST_ALL_TYPES).then(|| (Type::Type(Some(Box::new(Type::object(TEST_ALL_TYPES)))), None))
    }
}

/// Register the operator/macro-support overloads the scenario table's
/// expressions call: `matches` (S3), `@not_strictly_false` and `&&` (S4's
/// `all()` macro expansion), `in` (S6). None of this is specific to any one
/// scenario's variable declarations, so it's kept separate from `env_for`.
pub fn declare_stdlib_overloads(env: &mut Environment) {
    env.declare_overload(
        "matches",
        Overload::new(
            "matches_string",
            vec![Type::Primitive(Primitive::String), Type::Primitive(Primitive::String)],
            Type::Primitive(Primitive::Bool),
        )
        .instance(),
    )
    .expect("no prior overload for 'matches' in a fresh environment");

    env.declare_overload(
        "&&",
        Overload::new(
            "logical_and",
            vec![Type::Primitive(Primitive::Bool), Type::Primitive(Primitive::Bool)],
            Type::Primitive(Primitive::Bool),
        ),
    )
    .expect("no prior overload for '&&' in a fresh environment");

    env.declare_overload(
        "@not_strictly_false",
        Overload::new("not_strictly_false", vec![Type::Primitive(Primitive::Bool)], Type::Primitive(Primitive::Bool)),
    )
    .expect("no prior overload for '@not_strictly_false' in a fresh environment");

    env.declare_overload(
        "in",
        Overload::new(
            "in_list",
            vec![Type::type_param("T"), Type::list(Type::type_param("T"))],
            Type::Primitive(Primitive::Bool),
        )
        .with_type_params(vec!["T".to_string()]),
    )
    .expect("no prior overload for 'in' in a fresh environment");
}

/// A collaborator backed by a fixed path -> size table (§6.3); `estimate_call`
/// always defers to the built-in per-overload rules.
#[derive(Default)]
pub struct FixedSizeEstimator {
    sizes: FxHashMap<Vec<String>, SizeEstimate>,
}

impl FixedSizeEstimator {
    #[must_use]
    pub fn with(mut self, path: &[&str], size: SizeEstimate) -> Self {
        self.sizes.insert(path.iter().map(ToString::to_string).collect(), size);
        self
    }
}

impl CostEstimator for FixedSizeEstimator {
    fn estimate_size(&self, path: &[String]) -> Option<SizeEstimate> {
        self.sizes.get(path).copied()
    }

    fn estimate_call(&self, _function: &str, _overload_id: &str, _target: Option<SizeEstimate>, _args: &[SizeEstimate]) -> Option<CallEstimate> {
        None
    }
}

/// An `Environment` with `variable: ty` declared, nothing else — the shape
/// every scenario in §8's table needs.
#[must_use]
pub fn env_with_variable(provider: Rc<dyn TypeProvider>, variable: &str, ty: Type) -> Environment {
    let mut env = Environment::new("", provider);
    env.declare_variable(Variable::new(variable, ty));
    env
}
