//! Core diagnostic types for structured error reporting.
//!
//! Defines [`Diagnostic`], [`Label`], [`Severity`], and [`Suggestion`] — the
//! building blocks the checker uses to report type errors (§7 of the
//! checker spec lists the normative message text for each kind).

use cel_ir::Span;
use std::fmt;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// Applicability level for a code suggestion.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Applicability {
    MachineApplicable,
    MaybeIncorrect,
    HasPlaceholders,
    #[default]
    Unspecified,
}

impl Applicability {
    pub fn is_machine_applicable(&self) -> bool {
        matches!(self, Applicability::MachineApplicable)
    }
}

/// A text substitution for a code fix.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Substitution {
    pub span: Span,
    pub snippet: String,
}

impl Substitution {
    pub fn new(span: Span, snippet: impl Into<String>) -> Self {
        Substitution {
            span,
            snippet: snippet.into(),
        }
    }
}

/// A structured suggestion attached to a diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Suggestion {
    pub message: String,
    pub substitutions: Vec<Substitution>,
    pub applicability: Applicability,
}

impl Suggestion {
    pub fn new(
        message: impl Into<String>,
        span: Span,
        snippet: impl Into<String>,
        applicability: Applicability,
    ) -> Self {
        Suggestion {
            message: message.into(),
            substitutions: vec![Substitution::new(span, snippet)],
            applicability,
        }
    }

    /// A text-only suggestion (no code substitution) — e.g. "use `dyn(x)`".
    pub fn text(message: impl Into<String>) -> Self {
        Suggestion {
            message: message.into(),
            substitutions: Vec::new(),
            applicability: Applicability::Unspecified,
        }
    }

    pub fn is_text_only(&self) -> bool {
        self.substitutions.is_empty()
    }
}

/// A labeled span with an explanatory message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A rich diagnostic carrying everything needed to render a good error (§4.6).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub suggestions: Vec<Suggestion>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    #[must_use]
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, message: impl Into<String>) -> Self {
        self.suggestions.push(Suggestion::text(message));
        self
    }

    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {:?}: {}", marker, label.span, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        for suggestion in &self.suggestions {
            write!(f, "\n  = help: {}", suggestion.message)?;
        }

        Ok(())
    }
}

/// Build the normative `undeclared reference` diagnostic (§7).
pub fn undeclared_reference(span: Span, name: &str, container: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message(format!(
            "undeclared reference to '{name}' (in container '{container}')"
        ))
        .with_label(span, "not found in this scope")
}

/// Build the normative `undefined field` diagnostic (§7).
pub fn undefined_field(span: Span, field: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2010)
        .with_message(format!("undefined field '{field}'"))
        .with_label(span, "no such field")
}

/// Build the normative "field does not support presence check" diagnostic (§7).
pub fn field_not_testable(span: Span, field: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2011)
        .with_message(format!(
            "field '{field}' does not support presence check"
        ))
        .with_label(span, "not testable with has()")
}

/// Build the normative "type does not support field selection" diagnostic (§7).
pub fn field_selection_unsupported(span: Span, ty: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2012)
        .with_message(format!("type '{ty}' does not support field selection"))
        .with_label(span, "cannot select a field here")
}

/// Build the normative "expression does not select a field" diagnostic (§7).
pub fn presence_test_not_a_select(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2013)
        .with_message("expression does not select a field".to_string())
        .with_label(span, "has() requires a field selection")
}

/// Build the normative "no matching overload" diagnostic (§7).
pub fn no_matching_overload(span: Span, function: &str, arg_types: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2020)
        .with_message(format!(
            "found no matching overload for '{function}' applied to '({arg_types})'"
        ))
        .with_label(span, "no overload accepts these argument types")
}

/// Build the normative "expected type X but found Y" diagnostic (§7).
pub fn type_mismatch(span: Span, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!(
            "expected type '{expected}' but found '{found}'"
        ))
        .with_label(span, format!("expected '{expected}'"))
}

/// Build the normative field-initializer type mismatch diagnostic (§7).
pub fn field_type_mismatch(span: Span, field: &str, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message(format!(
            "expected type of field '{field}' is '{expected}' but provided type is '{found}'"
        ))
        .with_label(span, format!("expected '{expected}'"))
}

/// Build the normative aggregate-join mismatch diagnostic (§7).
pub fn aggregate_type_mismatch(span: Span, found: &str, previous: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2030)
        .with_message(format!(
            "type '{found}' does not match previous type '{previous}' in aggregate. Use 'dyn(x)' to make the aggregate dynamic."
        ))
        .with_label(span, "inconsistent element type")
        .with_suggestion("wrap one side in dyn(x) to make the aggregate dynamic")
}

/// Build the normative "not a message type" diagnostic (§7).
pub fn not_a_message_type(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2014)
        .with_message(format!("'{name}' is not a message type"))
        .with_label(span, "expected a message type here")
}

/// Build the normative "not a type" diagnostic (§7).
pub fn not_a_type(span: Span, name: &str, inner: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2015)
        .with_message(format!("'{name}({inner})' is not a type"))
        .with_label(span, "expected a type value here")
}

/// Build the normative "cannot be range of a comprehension" diagnostic (§7).
pub fn invalid_comprehension_range(span: Span, ty: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2040)
        .with_message(format!(
            "expression of type '{ty}' cannot be range of a comprehension (must be list, map, or dynamic)"
        ))
        .with_label(span, "invalid range expression")
}

/// Build the normative internal-error diagnostic for unresolved type names (§7).
pub fn internal_unresolved_type(span: Span, type_name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9001)
        .with_message(format!(
            "[internal] unexpected failed resolution of '{type_name}'"
        ))
        .with_label(span, "resolution failed")
}

/// Build the normative "unexpected literal type" diagnostic (§7).
pub fn unexpected_literal_type(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message("unexpected literal type".to_string())
        .with_label(span, "unrecognized literal kind")
}
