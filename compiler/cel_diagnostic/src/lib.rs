//! Diagnostic system for rich checker error reporting.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong, matching the checker's normative
//!   error text)
//! - Primary span (where it went wrong)
//! - Context labels (why it's wrong)
//! - Suggestions (how to fix)
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was emitted. This prevents "forgotten" error conditions where code
//! fails silently without reporting an error.
//!
//! ```ignore
//! // Can only get ErrorGuaranteed by emitting an error
//! let guarantee = queue.emit_error(diagnostic, line, column);
//!
//! // Functions can return ErrorGuaranteed to prove they reported errors
//! fn check(expr: &ParsedExpr) -> Result<CheckedExpr, ErrorGuaranteed> { ... }
//! ```

pub mod emitter;
mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;
pub mod span_utils;

pub use error_code::ErrorCode;
pub use diagnostic::{
    Applicability, Diagnostic, Label, Severity, Substitution, Suggestion,
    aggregate_type_mismatch, field_not_testable, field_selection_unsupported,
    field_type_mismatch, internal_unresolved_type, invalid_comprehension_range,
    no_matching_overload, not_a_message_type, not_a_type, presence_test_not_a_select,
    type_mismatch, undeclared_reference, undefined_field, unexpected_literal_type,
};
pub use guarantee::ErrorGuaranteed;
