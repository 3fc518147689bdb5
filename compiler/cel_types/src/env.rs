//! The type environment: scopes, container resolution, abbreviations and
//! aliases (§4.2, §3 Environment).
//!
//! Scopes chain through `Rc`: pushing a child scope is an O(1) `Rc` clone of
//! the parent, and the first declaration in a fresh scope pays for a single
//! `Rc::make_mut` copy.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::decl::{Declaration, Function, Overload, Variable};
use crate::provider::TypeProvider;

#[derive(Clone, Debug, Default)]
struct ScopeInner {
    declarations: FxHashMap<String, Declaration>,
    parent: Option<Rc<ScopeInner>>,
}

/// An error constructing or extending an `Environment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// An abbreviation's leading segment collides with a container segment.
    AbbreviationCollidesWithContainer(String),
    /// The same abbreviation segment was registered twice.
    DuplicateAbbreviation(String),
    /// The same alias token was registered twice.
    DuplicateAlias(String),
    /// Two overloads share an id but disagree on signature (§3 invariants).
    OverloadSignatureConflict(String),
}

impl std::fmt::Display for EnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvError::AbbreviationCollidesWithContainer(seg) => {
                write!(f, "abbreviation '{seg}' collides with a container segment")
            }
            EnvError::DuplicateAbbreviation(seg) => write!(f, "duplicate abbreviation '{seg}'"),
            EnvError::DuplicateAlias(alias) => write!(f, "duplicate alias '{alias}'"),
            EnvError::OverloadSignatureConflict(id) => {
                write!(f, "overload '{id}' already declared with a different signature")
            }
        }
    }
}

impl std::error::Error for EnvError {}

/// A stack of scopes plus the container/abbreviation/alias/provider
/// context name resolution needs (§3 Environment).
#[derive(Clone)]
pub struct Environment {
    scope: Rc<ScopeInner>,
    container: Rc<str>,
    abbreviations: Rc<FxHashMap<String, String>>,
    aliases: Rc<FxHashMap<String, String>>,
    provider: Rc<dyn TypeProvider>,
}

impl Environment {
    #[must_use]
    pub fn new(container: impl Into<Rc<str>>, provider: Rc<dyn TypeProvider>) -> Self {
        Environment {
            scope: Rc::new(ScopeInner::default()),
            container: container.into(),
            abbreviations: Rc::new(FxHashMap::default()),
            aliases: Rc::new(FxHashMap::default()),
            provider,
        }
    }

    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    #[must_use]
    pub fn provider(&self) -> &dyn TypeProvider {
        &*self.provider
    }

    /// Push a child scope. O(1): shares the parent via `Rc`.
    #[must_use]
    pub fn child(&self) -> Self {
        let mut env = self.clone();
        env.scope = Rc::new(ScopeInner {
            declarations: FxHashMap::default(),
            parent: Some(Rc::clone(&self.scope)),
        });
        env
    }

    pub fn declare_variable(&mut self, variable: Variable) {
        let name = variable.name.clone();
        Rc::make_mut(&mut self.scope)
            .declarations
            .insert(name, Declaration::Variable(variable));
    }

    /// Declare a function overload, merging into an existing `Function`
    /// declaration of the same name in the *current* scope if present.
    ///
    /// An overload id collision is only an error when the conflicting
    /// overloads disagree on argument/result shape (§3 invariants).
    pub fn declare_overload(&mut self, function_name: &str, overload: Overload) -> Result<(), EnvError> {
        let inner = Rc::make_mut(&mut self.scope);
        match inner.declarations.get_mut(function_name) {
            Some(Declaration::Function(f)) => {
                if let Some(existing) = f.overloads.iter().find(|o| o.id == overload.id) {
                    if existing.args != overload.args || existing.result != overload.result {
                        trace!(overload_id = %overload.id, "overload signature conflict");
                        return Err(EnvError::OverloadSignatureConflict(overload.id));
                    }
                } else {
                    f.overloads.push(overload);
                }
            }
            Some(Declaration::Variable(_)) | None => {
                inner.declarations.insert(
                    function_name.to_string(),
                    Declaration::Function(Function::new(function_name).with_overload(overload)),
                );
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_bound_locally(&self, name: &str) -> bool {
        self.scope.declarations.contains_key(name)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Declaration> {
        let mut scope = &*self.scope;
        loop {
            if let Some(decl) = scope.declarations.get(name) {
                return Some(decl);
            }
            scope = scope.parent.as_deref()?;
        }
    }

    pub fn add_abbreviation(
        &mut self,
        segment: impl Into<String>,
        fqn: impl Into<String>,
    ) -> Result<(), EnvError> {
        let segment = segment.into();
        if self.container.split('.').any(|s| s == segment) {
            return Err(EnvError::AbbreviationCollidesWithContainer(segment));
        }
        let abbreviations = Rc::make_mut(&mut self.abbreviations);
        if abbreviations.contains_key(&segment) {
            return Err(EnvError::DuplicateAbbreviation(segment));
        }
        abbreviations.insert(segment, fqn.into());
        Ok(())
    }

    pub fn add_alias(&mut self, qualified_name: impl Into<String>, alias: impl Into<String>) -> Result<(), EnvError> {
        let alias = alias.into();
        let aliases = Rc::make_mut(&mut self.aliases);
        if aliases.contains_key(&alias) {
            return Err(EnvError::DuplicateAlias(alias));
        }
        aliases.insert(alias, qualified_name.into());
        Ok(())
    }

    /// The candidate fully-qualified names to try for `reference`, in
    /// most-specific-first order (§4.2, property 5).
    ///
    /// A leading `.` forces the remainder literally, bypassing both
    /// abbreviation expansion and container prefixing.
    #[must_use]
    pub fn resolve_candidates(&self, reference: &str) -> Vec<String> {
        if let Some(stripped) = reference.strip_prefix('.') {
            return vec![stripped.to_string()];
        }

        let head = reference.split('.').next().unwrap_or(reference);
        if let Some(expanded) = self.abbreviations.get(head) {
            let rest = &reference[head.len()..];
            return vec![format!("{expanded}{rest}")];
        }
        if let Some(expanded) = self.aliases.get(head) {
            let rest = &reference[head.len()..];
            return vec![format!("{expanded}{rest}")];
        }

        let segments: Vec<&str> = if self.container.is_empty() {
            Vec::new()
        } else {
            self.container.split('.').collect()
        };

        let mut candidates = Vec::with_capacity(segments.len() + 1);
        for i in (0..=segments.len()).rev() {
            if i == 0 {
                candidates.push(reference.to_string());
            } else {
                candidates.push(format!("{}.{reference}", segments[..i].join(".")));
            }
        }
        candidates
    }

    /// Resolve `reference` against declared names, trying each container
    /// candidate in order; returns the fully-qualified name that matched
    /// plus its declaration.
    #[must_use]
    pub fn resolve_ident(&self, reference: &str) -> Option<(String, &Declaration)> {
        for candidate in self.resolve_candidates(reference) {
            if let Some(decl) = self.lookup(&candidate) {
                return Some((candidate, decl));
            }
        }
        None
    }

    /// Same as [`Environment::resolve_ident`], but clones the declaration
    /// out so the caller isn't left holding a borrow of `self` — the shape
    /// the checker wants, since it needs to mutate its own maps while
    /// acting on the result.
    #[must_use]
    pub fn resolve_ident_owned(&self, reference: &str) -> Option<(String, Declaration)> {
        self.resolve_ident(reference).map(|(fqn, decl)| (fqn, decl.clone()))
    }
}
