//! Scoped variable → collaborator-path bindings (§4.5 "Path construction").
//!
//! Mirrors `cel_types::env::Environment`'s `Rc`-chained scope shape: pushing
//! a child scope is an O(1) `Rc` clone, a binding is a single
//! `Rc::make_mut` copy. A binding is `None` when it's root-less — the
//! accumulator variable of a comprehension has no root, so any reference
//! through it must report "no path" rather than a wrong one.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::interval::SizeEstimate;

/// What a bound name resolves to: a collaborator path to query, or (for a
/// variable ranging over an inline list/map literal, which has no path of
/// its own) the size already known from the literal's own element union.
#[derive(Clone, Debug)]
pub enum Binding {
    Path(Vec<String>),
    Size(SizeEstimate),
}

#[derive(Clone, Debug, Default)]
struct ScopeInner {
    bindings: FxHashMap<String, Option<Binding>>,
    parent: Option<Rc<ScopeInner>>,
}

#[derive(Clone, Default)]
pub struct PathScope(Rc<ScopeInner>);

impl PathScope {
    #[must_use]
    pub fn new() -> Self {
        PathScope::default()
    }

    #[must_use]
    pub fn child(&self) -> Self {
        PathScope(Rc::new(ScopeInner {
            bindings: FxHashMap::default(),
            parent: Some(Rc::clone(&self.0)),
        }))
    }

    pub fn bind(&mut self, name: impl Into<String>, path: Option<Vec<String>>) {
        Rc::make_mut(&mut self.0).bindings.insert(name.into(), path.map(Binding::Path));
    }

    pub fn bind_size(&mut self, name: impl Into<String>, size: SizeEstimate) {
        Rc::make_mut(&mut self.0).bindings.insert(name.into(), Some(Binding::Size(size)));
    }

    /// `None` if `name` isn't bound in any enclosing scope; `Some(None)` if
    /// it's bound but root-less (e.g. the accumulator variable).
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Option<&Binding>> {
        let mut scope = &*self.0;
        loop {
            if let Some(binding) = scope.bindings.get(name) {
                return Some(binding.as_ref());
            }
            scope = scope.parent.as_deref()?;
        }
    }
}

/// Append a suffix segment to a path, unless the path is root-less.
#[must_use]
pub fn append(base: Option<&[String]>, suffix: &str) -> Option<Vec<String>> {
    let mut segments = base?.to_vec();
    segments.push(suffix.to_string());
    Some(segments)
}
