//! The checker's output types (§6.4): the annotated tree plus collected issues.

use cel_ir::{ExprId, ParsedExpr, SourceInfo};
use cel_types::{Reference, Type};
use rustc_hash::FxHashMap;

/// A 1-based (line, column) pair.
///
/// Computed the same way the error reporter does (§4.6): binary-search the
/// byte offset against the parser's line-start table, then subtract the
/// line start. This is byte-based, not char-based — accurate column
/// rendering over multi-byte characters needs the source text, which this
/// layer never holds; that's the snippet emitter's job once it has it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// One collected error, keyed by the node that caused it (§6.4).
#[derive(Clone, Debug)]
pub struct Issue {
    pub id: ExprId,
    pub location: Location,
    pub message: String,
}

/// Every error collected during one `Checker::check` call.
#[derive(Clone, Debug, Default)]
pub struct Issues {
    pub errors: Vec<Issue>,
}

impl Issues {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The checker's output (§6.4): the input tree, unchanged, plus the type and
/// (where applicable) the resolved reference recorded for every node.
#[derive(Clone, Debug)]
pub struct CheckedExpr {
    pub expr: ParsedExpr,
    pub source_info: SourceInfo,
    pub type_map: FxHashMap<ExprId, Type>,
    pub reference_map: FxHashMap<ExprId, Reference>,
}

impl CheckedExpr {
    #[must_use]
    pub fn type_of(&self, id: ExprId) -> Option<&Type> {
        self.type_map.get(&id)
    }

    #[must_use]
    pub fn reference_of(&self, id: ExprId) -> Option<&Reference> {
        self.reference_map.get(&id)
    }
}
