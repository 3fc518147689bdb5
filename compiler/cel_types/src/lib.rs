//! CEL's type lattice, declarations, environment and unifier (§3, §4.1-4.3).
//!
//! This crate has no notion of an expression tree — it is the data model
//! the checker (`cel_checker`) builds and walks. Types are compared
//! structurally; there is deliberately no interner here, since a checker
//! run type-checks one expression and is discarded (see `types` module
//! docs for the full rationale).

mod decl;
mod env;
mod provider;
mod subst;
mod types;
mod unify;

pub use decl::{ConstantValue, Declaration, Function, Overload, Reference, Variable};
pub use env::{EnvError, Environment};
pub use provider::{EmptyTypeProvider, FieldType, TypeProvider};
pub use subst::Substitution;
pub use types::{Primitive, Type, WellKnown};
pub use unify::{assignable, equal_or_less_specific, most_general, occurs, substitute, FreshVarGen};
