//! Declarations and resolved references (§3 Declarations, §6.4 Reference).

use crate::types::Type;

/// A literal constant attached to a variable or identifier reference.
///
/// Distinct from `cel_ir::LiteralKind`: that type is the parser's
/// node payload (string literals interned as `Name`); this one is the
/// checker-facing value a declaration or `TypeProvider` hands back
/// (enum constants, folded literals), so it owns its data.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Null,
}

/// A variable declaration (§3).
#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub constant_value: Option<ConstantValue>,
}

impl Variable {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Variable {
            name: name.into(),
            ty,
            constant_value: None,
        }
    }

    #[must_use]
    pub fn with_constant_value(mut self, value: ConstantValue) -> Self {
        self.constant_value = Some(value);
        self
    }
}

/// One overload of a function declaration (§3).
#[derive(Clone, Debug)]
pub struct Overload {
    pub id: String,
    pub is_instance: bool,
    pub type_params: Vec<String>,
    pub args: Vec<Type>,
    pub result: Type,
    pub non_strict: bool,
    pub operand_traits: Vec<String>,
}

impl Overload {
    #[must_use]
    pub fn new(id: impl Into<String>, args: Vec<Type>, result: Type) -> Self {
        Overload {
            id: id.into(),
            is_instance: false,
            type_params: Vec::new(),
            args,
            result,
            non_strict: false,
            operand_traits: Vec::new(),
        }
    }

    #[must_use]
    pub fn instance(mut self) -> Self {
        self.is_instance = true;
        self
    }

    #[must_use]
    pub fn with_type_params(mut self, params: Vec<String>) -> Self {
        self.type_params = params;
        self
    }

    /// The declared argument list, with the receiver prepended when this is
    /// an instance overload — matches the candidate list the checker builds
    /// for a call with a target (§4.4 Calls, step 3).
    #[must_use]
    pub fn call_style_matches(&self, has_target: bool) -> bool {
        self.is_instance == has_target
    }
}

/// A function declaration: a name plus its overload set (§3).
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub overloads: Vec<Overload>,
}

impl Function {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            overloads: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_overload(mut self, overload: Overload) -> Self {
        self.overloads.push(overload);
        self
    }
}

/// Either kind of thing a name in scope can resolve to.
#[derive(Clone, Debug)]
pub enum Declaration {
    Variable(Variable),
    Function(Function),
}

impl Declaration {
    #[must_use]
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Declaration::Variable(v) => Some(v),
            Declaration::Function(_) => None,
        }
    }

    #[must_use]
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Declaration::Function(f) => Some(f),
            Declaration::Variable(_) => None,
        }
    }
}

/// What an identifier or call node resolved to (§6.4).
#[derive(Clone, Debug, PartialEq)]
pub enum Reference {
    /// An identifier, select-as-qualified-name, or constant.
    Ident {
        name: String,
        constant_value: Option<ConstantValue>,
    },
    /// A call's matching overload set; more than one entry means the result
    /// type was narrowed to `Dyn` (§4.4 Calls, step 5).
    Overloads(Vec<String>),
}
