//! Runtime cost and size estimation over a checked CEL expression (§4.5).
//!
//! [`estimate_cost`] walks a [`cel_checker::CheckedExpr`] once, tracking
//! the collaborator path of every subexpression so that field selects and
//! comprehension iteration variables resolve back to the [`CostEstimator`]
//! the host supplies, and falls back to a built-in per-overload rule table
//! where the collaborator has nothing to say.

mod collaborator;
mod config;
mod estimate;
mod interval;
mod path;

pub use collaborator::{CallEstimate, CostEstimator, NoCostEstimator};
pub use config::CostConfig;
pub use estimate::estimate_cost;
pub use interval::{CostEstimate, Interval, SizeEstimate};
