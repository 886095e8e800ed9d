//! Destinations for recoverable diagnostics.
//!
//! The parser never touches a global logger. Callers hand a
//! [`DiagnosticSink`] to each parse; the parser works the same whether the
//! sink records, forwards, or drops what it is given.

use crate::error::{Diagnostic, Severity};

/// Receives each diagnostic as soon as the parser finds it.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to the `log` facade under the `kumihan` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        let level = match diagnostic.severity {
            Severity::Warning => log::Level::Warn,
            Severity::Info => log::Level::Info,
        };
        log::log!(
            target: "kumihan",
            level,
            "[{}] line {}: {}",
            diagnostic.kind.as_str(),
            diagnostic.line,
            diagnostic.message
        );
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: &Diagnostic) {}
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.push(diagnostic.clone());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: &Diagnostic) {
        (**self).report(diagnostic);
    }
}
