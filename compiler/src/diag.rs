// diag.rs - Unified diagnostics model
//
// Provides the diagnostic type every failure is reported through, with
// stable codes and optional hints.
//
// Preconditions: none (types only).
// Postconditions: none (types only).
// Failure modes: none.
// Side effects: none.

use std::fmt;

use crate::lexer::Span;

// ── Diagnostic code ──────────────────────────────────────────────────────

/// A stable diagnostic code (e.g., `E0002`).
///
/// Once assigned, a code must never be reassigned to a different meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub mod codes {
    use super::DiagCode;

    /// Illegal character or incomplete operator.
    pub const E0001: DiagCode = DiagCode("E0001");
    /// Unexpected token.
    pub const E0002: DiagCode = DiagCode("E0002");
    /// Parenthesis nesting exceeds the configured limit.
    pub const E0003: DiagCode = DiagCode("E0003");
}

// ── Severity level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Error,
    Warning,
}

// ── Diagnostic ───────────────────────────────────────────────────────────

/// A compiler diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<DiagCode>,
    pub level: DiagLevel,
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with no code or hint.
    pub fn new(level: DiagLevel, span: Span, message: impl Into<String>) -> Self {
        Self {
            code: None,
            level,
            span,
            message: message.into(),
            hint: None,
        }
    }

    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagLevel::Error, span, message)
    }

    /// Attach a stable diagnostic code.
    pub fn with_code(mut self, code: DiagCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Render with a `file:line:col:` prefix resolved against `source`.
    pub fn render(&self, file: &str, source: &str) -> String {
        let (line, col) = self.span.line_col(source);
        format!("{file}:{line}:{col}: {self}")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagLevel::Error => "error",
            DiagLevel::Warning => "warning",
        };
        if let Some(code) = &self.code {
            write!(f, "{}[{}]: {}", level, code, self.message)?;
        } else {
            write!(f, "{}: {}", level, self.message)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_without_code() {
        let d = Diagnostic::error(Span::new(0, 1), "something failed");
        assert_eq!(format!("{d}"), "error: something failed");
    }

    #[test]
    fn display_with_code_and_hint() {
        let d = Diagnostic::error(Span::new(0, 1), "expected a factor, found '+'")
            .with_code(codes::E0002)
            .with_hint("remove the extra operator");
        assert_eq!(
            format!("{d}"),
            "error[E0002]: expected a factor, found '+'\n  hint: remove the extra operator"
        );
    }

    #[test]
    fn render_prefixes_location() {
        let d = Diagnostic::new(DiagLevel::Warning, Span::new(4, 5), "odd").with_code(DiagCode("W0001"));
        assert_eq!(d.render("in.expr", "a +\nb"), "in.expr:2:1: warning[W0001]: odd");
    }
}
