//! The type provider collaborator (§6.2).
//!
//! Protobuf descriptor loading lives outside this workspace; the checker
//! only ever sees it through this trait.

use crate::decl::ConstantValue;
use crate::types::Type;

/// The result of resolving one field of an object type.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldType {
    pub ty: Type,
    pub supports_presence: bool,
}

impl FieldType {
    #[must_use]
    pub fn new(ty: Type, supports_presence: bool) -> Self {
        FieldType { ty, supports_presence }
    }
}

/// Read-only collaborator resolving named types, fields and identifiers
/// the checker itself has no declarations for (§6.2).
pub trait TypeProvider {
    /// Resolve a fully-qualified name to an object (or well-known) type.
    fn find_type(&self, fqn: &str) -> Option<Type>;

    /// Resolve a field of an object type.
    fn find_field_type(&self, object_type: &Type, field_name: &str) -> Option<FieldType>;

    /// Resolve a name to an identifier declaration — used for enum
    /// constants and type identifiers that aren't plain variables.
    fn find_ident(&self, name: &str) -> Option<(Type, Option<ConstantValue>)>;
}

/// A `TypeProvider` with nothing registered — useful for tests and for
/// expressions that only use primitives, lists and maps.
#[derive(Debug, Default)]
pub struct EmptyTypeProvider;

impl TypeProvider for EmptyTypeProvider {
    fn find_type(&self, _fqn: &str) -> Option<Type> {
        None
    }

    fn find_field_type(&self, _object_type: &Type, _field_name: &str) -> Option<FieldType> {
        None
    }

    fn find_ident(&self, _name: &str) -> Option<(Type, Option<ConstantValue>)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_provider_resolves_nothing() {
        let provider = EmptyTypeProvider;
        assert_eq!(provider.find_type("a.B"), None);
        assert_eq!(provider.find_ident("x"), None);
        assert_eq!(provider.find_field_type(&Type::object("a.B"), "f"), None);
    }
}
