//! Per-parse source metadata (§6.1): node id → byte offset, plus line starts.

use rustc_hash::FxHashMap;

use crate::expr::ExprId;

/// Maps each parsed node back to where it started in the source text, and
/// carries the line-start table the error reporter binary-searches to turn
/// an offset into a (line, column).
#[derive(Clone, Debug, Default)]
pub struct SourceInfo {
    positions: FxHashMap<ExprId, u32>,
    /// Byte offset of the start of each line; `line_offsets[0] == 0`.
    line_offsets: Vec<u32>,
}

impl SourceInfo {
    #[must_use]
    pub fn new(line_offsets: Vec<u32>) -> Self {
        let line_offsets = if line_offsets.is_empty() {
            vec![0]
        } else {
            line_offsets
        };
        SourceInfo {
            positions: FxHashMap::default(),
            line_offsets,
        }
    }

    /// Record the byte offset at which `id` begins in the source.
    pub fn record(&mut self, id: ExprId, offset: u32) {
        self.positions.insert(id, offset);
    }

    #[must_use]
    pub fn offset(&self, id: ExprId) -> Option<u32> {
        self.positions.get(&id).copied()
    }

    #[must_use]
    pub fn line_offsets(&self) -> &[u32] {
        &self.line_offsets
    }
}
