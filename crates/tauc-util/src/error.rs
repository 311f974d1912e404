//! Compiler error taxonomy.
//!
//! Every user-facing diagnostic is one of the variants below, each carrying
//! a message and the source span it points at. There is no error recovery:
//! the first `Lex`/`Parse`/`Name`/`Type` error aborts the pipeline.
//! `Internal` marks an invariant violation and must never be reachable from
//! accepted input.

use thiserror::Error;

use crate::span::Span;

/// A compilation diagnostic with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Invalid character in the source text.
    #[error("lex error: {message}")]
    Lex { message: String, span: Span },

    /// Unexpected token during parsing.
    #[error("parse error: expected {expected}, found {found}")]
    Parse {
        expected: String,
        found: String,
        span: Span,
    },

    /// Unresolved identifier or duplicate definition in one scope.
    #[error("name error: {message}")]
    Name { message: String, span: Span },

    /// Mismatched or invalid types, arity mismatch, bad return.
    #[error("type error: {message}")]
    Type { message: String, span: Span },

    /// Compiler invariant violation; a bug, never expected on any input.
    #[error("internal error: {message}")]
    Internal { message: String, span: Span },
}

impl CompileError {
    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        Self::Lex {
            message: message.into(),
            span,
        }
    }

    pub fn parse(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        Self::Parse {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn name(message: impl Into<String>, span: Span) -> Self {
        Self::Name {
            message: message.into(),
            span,
        }
    }

    pub fn ty(message: impl Into<String>, span: Span) -> Self {
        Self::Type {
            message: message.into(),
            span,
        }
    }

    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        Self::Internal {
            message: message.into(),
            span,
        }
    }

    /// The source span the diagnostic points at.
    pub fn span(&self) -> Span {
        match self {
            Self::Lex { span, .. }
            | Self::Parse { span, .. }
            | Self::Name { span, .. }
            | Self::Type { span, .. }
            | Self::Internal { span, .. } => *span,
        }
    }
}

/// Result type used by every compiler phase.
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Coord;

    #[test]
    fn test_display() {
        let err = CompileError::parse(")", "EOF", Span::DUMMY);
        assert_eq!(err.to_string(), "parse error: expected ), found EOF");

        let err = CompileError::ty("condition must have type bool", Span::DUMMY);
        assert_eq!(err.to_string(), "type error: condition must have type bool");
    }

    #[test]
    fn test_span_accessor() {
        let span = Span::new(Coord::new(3, 1), Coord::new(4, 1));
        let err = CompileError::name("undefined name `y`", span);
        assert_eq!(err.span(), span);
    }
}
