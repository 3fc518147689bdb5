//! The substitution map (§4.3): `TypeParam` name → bound `Type`.
//!
//! Mirrors the `Rc`-based copy-on-write scheme the checker's environment
//! uses for scope chains: cloning a `Substitution` is O(1), and the first
//! write after a clone pays for a single `Rc::make_mut` copy of the map.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::types::Type;

#[derive(Clone, Debug, Default, PartialEq)]
struct Bindings(FxHashMap<Rc<str>, Type>);

/// Copy-on-write map from type-parameter name to its bound type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Substitution(Rc<Bindings>);

impl Substitution {
    #[must_use]
    pub fn new() -> Self {
        Substitution::default()
    }

    #[must_use]
    pub fn lookup(&self, param: &str) -> Option<&Type> {
        self.0 .0.get(param)
    }

    #[must_use]
    pub fn is_bound(&self, param: &str) -> bool {
        self.0 .0.contains_key(param)
    }

    pub fn bind(&mut self, param: Rc<str>, ty: Type) {
        Rc::make_mut(&mut self.0).0.insert(param, ty);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0 .0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 .0.is_empty()
    }
}
