//! CEL IR - parsed-expression data structures consumed by the checker.
//!
//! This crate holds only what the checker and cost estimator need as input:
//! - [`Span`] / [`SourceInfo`] for source locations
//! - [`Name`] + [`StringInterner`] for interned identifiers
//! - [`ParsedExpr`] / [`ExprKind`] — the parser's output tree
//!
//! The parser, macro expander and runtime evaluator that produce and consume
//! these types live outside this workspace; this crate only describes the
//! shape of their hand-off.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod expr;
mod interner;
mod name;
mod source_info;
mod span;

pub use expr::{ComprehensionExpr, ExprId, ExprKind, LiteralKind, MapEntry, ParsedExpr, StructField};
pub use interner::{SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use source_info::SourceInfo;
pub use span::{Span, SpanError};
