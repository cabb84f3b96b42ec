// error.rs - Build failures
//
// A build either yields a complete DAG or exactly one `BuildError`; there
// is no partial result. `to_diagnostic` maps each failure onto the stable
// diagnostic codes in `diag::codes`.

use thiserror::Error;

use crate::diag::{codes, Diagnostic};
use crate::lexer::{Span, Token};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The token source produced an error token.
    #[error("{message}")]
    Lexical { message: String, span: Span },

    /// A token other than the one the grammar requires.
    #[error("expected {expected}, found {found}")]
    Syntax {
        expected: String,
        found: Token,
        span: Span,
    },

    #[error("parentheses nested deeper than {limit}")]
    TooDeep { limit: usize, span: Span },
}

impl BuildError {
    pub fn span(&self) -> Span {
        match self {
            BuildError::Lexical { span, .. }
            | BuildError::Syntax { span, .. }
            | BuildError::TooDeep { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.span(), self.to_string());
        match self {
            BuildError::Lexical { message, .. } => {
                let diag = diag.with_code(codes::E0001);
                if message.contains("'=='") {
                    diag.with_hint("equality is written '=='; there is no assignment")
                } else {
                    diag
                }
            }
            BuildError::Syntax { found, .. } => {
                let diag = diag.with_code(codes::E0002);
                match found {
                    Token::EndOfInput => diag.with_hint("the expression ends too early"),
                    Token::Less | Token::Greater | Token::Equals => diag.with_hint(
                        "comparisons do not chain; combine them with '&&' instead",
                    ),
                    _ => diag,
                }
            }
            BuildError::TooDeep { .. } => diag
                .with_code(codes::E0003)
                .with_hint("raise the limit with --max-depth"),
        }
    }
}
