//! Error and diagnostic types.
//!
//! Parsing has exactly one hard failure, input larger than the configured
//! bounds, reported as [`ParseError`]. Every other problem is recovered
//! from and surfaces as a [`Diagnostic`].

use std::fmt;

use thiserror::Error;

use crate::span::Span;

/// Fatal parse failure. The document is not parsed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input is {bytes} bytes, exceeding the limit of {limit} bytes")]
    InputTooLarge { bytes: usize, limit: usize },

    #[error("input has {lines} lines, exceeding the limit of {limit} lines")]
    TooManyLines { lines: usize, limit: usize },
}

/// Failure while loading parser or marker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    #[error("invalid marker definition '{name}': {reason}")]
    InvalidMarker { name: String, reason: &'static str },
}

/// How loudly a diagnostic should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Categories of recoverable problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// `;;;name;;;` where `name` has no marker definition.
    UnknownMarker,
    /// Marker block still open at end of document.
    UnterminatedMarker,
    /// Code fence still open at end of document.
    UnterminatedCodeFence,
    /// A marker opener inside an already open marker block.
    NestedMarker,
    /// Non-item line directly after a list item.
    MalformedListContinuation,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::MalformedListContinuation => Severity::Info,
            DiagnosticKind::UnknownMarker
            | DiagnosticKind::UnterminatedMarker
            | DiagnosticKind::UnterminatedCodeFence
            | DiagnosticKind::NestedMarker => Severity::Warning,
        }
    }

    /// Stable identifier, used in structured log output and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnknownMarker => "unknown-marker",
            DiagnosticKind::UnterminatedMarker => "unterminated-marker",
            DiagnosticKind::UnterminatedCodeFence => "unterminated-code-fence",
            DiagnosticKind::NestedMarker => "nested-marker",
            DiagnosticKind::MalformedListContinuation => "malformed-list-continuation",
        }
    }
}

/// A recovered problem, with where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    /// Source bytes concerned: the offending line, or for an unclosed block
    /// everything from its opener to the end of the document.
    pub span: Span,
    /// 1-based line number.
    pub line: u32,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span, line: u32) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            span,
            line,
        }
    }

    pub fn unknown_marker(name: &str, span: Span, line: u32) -> Self {
        Self::new(
            DiagnosticKind::UnknownMarker,
            format!("unknown marker: {}", name),
            span,
            line,
        )
    }

    pub fn unterminated_marker(name: &str, span: Span, line: u32) -> Self {
        Self::new(
            DiagnosticKind::UnterminatedMarker,
            format!("unclosed marker '{}', closed at end of document", name),
            span,
            line,
        )
    }

    pub fn unterminated_code_fence(span: Span, line: u32) -> Self {
        Self::new(
            DiagnosticKind::UnterminatedCodeFence,
            "unclosed code fence, closed at end of document",
            span,
            line,
        )
    }

    pub fn nested_marker(inner: &str, outer: &str, span: Span, line: u32) -> Self {
        Self::new(
            DiagnosticKind::NestedMarker,
            format!("marker '{}' inside open marker '{}' kept as text", inner, outer),
            span,
            line,
        )
    }

    pub fn malformed_list_continuation(span: Span, line: u32) -> Self {
        Self::new(
            DiagnosticKind::MalformedListContinuation,
            "line without a list marker appended to the previous item",
            span,
            line,
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.message, self.line)
    }
}

/// Diagnostics gathered during one parse, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(|d| d.severity >= Severity::Warning)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(items: Vec<Diagnostic>) -> Self {
        Self { items }
    }
}
