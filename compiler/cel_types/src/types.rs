//! The CEL type lattice (§3, §4.1).
//!
//! Types are plain recursive trees compared structurally — there is no
//! interning here. The checker runs once per expression and never needs
//! the O(1)-equality tricks an incremental compiler relies on, so a
//! `Box`/`Rc`-based tree is the right tool, not a liability.

use std::fmt;
use std::rc::Rc;

/// CEL's primitive scalar kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Primitive {
    Bool,
    Int,
    Uint,
    Double,
    String,
    Bytes,
}

impl Primitive {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Uint => "uint",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Bytes => "bytes",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known protobuf message types CEL treats specially.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum WellKnown {
    Any,
    Timestamp,
    Duration,
}

impl WellKnown {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WellKnown::Any => "google.protobuf.Any",
            WellKnown::Timestamp => "google.protobuf.Timestamp",
            WellKnown::Duration => "google.protobuf.Duration",
        }
    }
}

impl fmt::Display for WellKnown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CEL type (§3).
///
/// `Object`, `TypeParam` and `Opaque` carry `Rc<str>` names: these are often
/// built dynamically (container candidate expansion, fresh type-variable
/// minting) and cloned through every `assignable`/`substitute` call, so a
/// refcounted string avoids repeated heap copies of the same name.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    /// Sentinel for "already reported" — assigns to and from everything.
    Error,
    /// The universal top/bottom type for assignability.
    Dyn,
    Null,
    Primitive(Primitive),
    /// A nullable primitive (protobuf wrapper message).
    Wrapper(Primitive),
    WellKnown(WellKnown),
    List(Box<Type>),
    Map(Box<Type>, Box<Type>),
    /// A named protobuf message type, by fully-qualified name.
    Object(Rc<str>),
    /// The meta-type value, e.g. `int` evaluated is `Type(Some(Int))`.
    Type(Option<Box<Type>>),
    /// A free type variable.
    TypeParam(Rc<str>),
    /// An abstract parameterized type, e.g. `optional_type(T)`, `set(T)`.
    Opaque(Rc<str>, Vec<Type>),
    Function(Box<Type>, Vec<Type>),
}

impl Type {
    #[must_use]
    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }

    #[must_use]
    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Box::new(key), Box::new(value))
    }

    #[must_use]
    pub fn opaque(name: impl Into<Rc<str>>, params: Vec<Type>) -> Type {
        Type::Opaque(name.into(), params)
    }

    /// The `optional_type(inner)` opaque used by `.?` / `{?k: v}` / `[?x]`.
    #[must_use]
    pub fn optional(inner: Type) -> Type {
        Type::opaque("optional_type", vec![inner])
    }

    /// If this is `optional_type(T)`, the wrapped `T`.
    #[must_use]
    pub fn as_optional(&self) -> Option<&Type> {
        match self {
            Type::Opaque(name, params) if &**name == "optional_type" && params.len() == 1 => {
                Some(&params[0])
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn type_param(name: impl Into<Rc<str>>) -> Type {
        Type::TypeParam(name.into())
    }

    #[must_use]
    pub fn object(fqn: impl Into<Rc<str>>) -> Type {
        Type::Object(fqn.into())
    }

    /// Whether `Null` may be assigned to/from this type (§4.3 rule 4).
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            Type::Object(_) | Type::Wrapper(_) | Type::WellKnown(_) | Type::Opaque(..)
        )
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    #[must_use]
    pub fn is_dyn(&self) -> bool {
        matches!(self, Type::Dyn)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Error => write!(f, "!error!"),
            Type::Dyn => write!(f, "dyn"),
            Type::Null => write!(f, "null"),
            Type::Primitive(p) => write!(f, "{p}"),
            Type::Wrapper(p) => write!(f, "wrapper({p})"),
            Type::WellKnown(w) => write!(f, "{w}"),
            Type::List(elem) => write!(f, "list({elem})"),
            Type::Map(k, v) => write!(f, "map({k}, {v})"),
            Type::Object(fqn) => write!(f, "{fqn}"),
            Type::Type(None) => write!(f, "type"),
            Type::Type(Some(inner)) => write!(f, "type({inner})"),
            Type::TypeParam(name) => write!(f, "{name}"),
            Type::Opaque(name, params) => {
                if params.is_empty() {
                    write!(f, "{name}")
                } else {
                    write!(f, "{name}(")?;
                    for (i, p) in params.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{p}")?;
                    }
                    write!(f, ")")
                }
            }
            Type::Function(result, args) => {
                write!(f, "(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ") -> {result}")
            }
        }
    }
}

#[cfg(test)]
mod tests;
