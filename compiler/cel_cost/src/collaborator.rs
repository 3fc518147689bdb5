//! The cost estimator collaborator (§6.3): read-only hooks a host may
//! plug in to replace the built-in per-overload cost rules or supply
//! size hints this crate has no way to compute on its own (e.g. the
//! length of a field the provider resolves at runtime).

use crate::interval::{CostEstimate, SizeEstimate};

/// What a custom overload rule contributes (§6.3 `estimate_call`).
#[derive(Copy, Clone, Debug)]
pub struct CallEstimate {
    pub cost: CostEstimate,
    pub result_size: Option<SizeEstimate>,
}

/// Read-only collaborator consulted before the built-in cost rules (§4.5,
/// §6.3). `path` segments are variable names or the literal suffixes
/// `@items`, `@indices`, `@keys`, `@values` (§4.5 "Path construction").
pub trait CostEstimator {
    fn estimate_size(&self, path: &[String]) -> Option<SizeEstimate>;

    fn estimate_call(
        &self,
        function: &str,
        overload_id: &str,
        target: Option<SizeEstimate>,
        args: &[SizeEstimate],
    ) -> Option<CallEstimate>;
}

/// A collaborator with nothing registered — every query falls through to
/// the built-in rules.
#[derive(Debug, Default)]
pub struct NoCostEstimator;

impl CostEstimator for NoCostEstimator {
    fn estimate_size(&self, _path: &[String]) -> Option<SizeEstimate> {
        None
    }

    fn estimate_call(
        &self,
        _function: &str,
        _overload_id: &str,
        _target: Option<SizeEstimate>,
        _args: &[SizeEstimate],
    ) -> Option<CallEstimate> {
        None
    }
}
