use super::*;

#[test]
fn test_primitive_display() {
    assert_eq!(Type::Primitive(Primitive::Int).to_string(), "int");
    assert_eq!(Type::Primitive(Primitive::String).to_string(), "string");
}

#[test]
fn test_dyn_and_null_display() {
    assert_eq!(Type::Dyn.to_string(), "dyn");
    assert_eq!(Type::Null.to_string(), "null");
    assert_eq!(Type::Error.to_string(), "!error!");
}

#[test]
fn test_wrapper_display() {
    assert_eq!(Type::Wrapper(Primitive::Int).to_string(), "wrapper(int)");
}

#[test]
fn test_list_and_map_display() {
    assert_eq!(Type::list(Type::Primitive(Primitive::Int)).to_string(), "list(int)");
    assert_eq!(
        Type::map(Type::Primitive(Primitive::String), Type::Primitive(Primitive::Int)).to_string(),
        "map(string, int)"
    );
}

#[test]
fn test_object_display() {
    assert_eq!(
        Type::object("google.expr.proto3.test.TestAllTypes").to_string(),
        "google.expr.proto3.test.TestAllTypes"
    );
}

#[test]
fn test_meta_type_display() {
    assert_eq!(Type::Type(None).to_string(), "type");
    assert_eq!(
        Type::Type(Some(Box::new(Type::Primitive(Primitive::Int)))).to_string(),
        "type(int)"
    );
}

#[test]
fn test_opaque_display_with_and_without_params() {
    assert_eq!(
        Type::optional(Type::Primitive(Primitive::Int)).to_string(),
        "optional_type(int)"
    );
    assert_eq!(Type::opaque("unit", vec![]).to_string(), "unit");
}

#[test]
fn test_as_optional() {
    let opt = Type::optional(Type::Primitive(Primitive::Int));
    assert_eq!(opt.as_optional(), Some(&Type::Primitive(Primitive::Int)));
    assert_eq!(Type::Primitive(Primitive::Int).as_optional(), None);
}

#[test]
fn test_is_nullable() {
    assert!(Type::object("Foo").is_nullable());
    assert!(Type::Wrapper(Primitive::Int).is_nullable());
    assert!(Type::WellKnown(WellKnown::Timestamp).is_nullable());
    assert!(Type::optional(Type::Dyn).is_nullable());
    assert!(!Type::Primitive(Primitive::Int).is_nullable());
    assert!(!Type::Dyn.is_nullable());
}

#[test]
fn test_structural_equality() {
    assert_eq!(
        Type::list(Type::Primitive(Primitive::Int)),
        Type::list(Type::Primitive(Primitive::Int))
    );
    assert_ne!(
        Type::list(Type::Primitive(Primitive::Int)),
        Type::list(Type::Primitive(Primitive::Uint))
    );
}

#[test]
fn test_function_display() {
    let f = Type::Function(
        Box::new(Type::Primitive(Primitive::Bool)),
        vec![Type::Primitive(Primitive::String), Type::Primitive(Primitive::String)],
    );
    assert_eq!(f.to_string(), "(string, string) -> bool");
}
