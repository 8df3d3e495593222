//! Non-fatal findings reported while compressing.
//!
//! Malformed input is never an error: the lexer and analyzer recover and
//! record a `Diagnostic` instead, so callers can surface warnings without
//! losing output.

use crate::span::{LineIndex, Span};
use std::fmt;

/// What was noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    UnterminatedString,
    UnterminatedComment,
    UnterminatedTemplate,
    UnbalancedBracket,
    /// `eval(...)` disables renaming for the enclosing scopes.
    EvalUsed,
    /// `with` disables renaming for the enclosing scopes.
    WithUsed,
    /// The same `var` was declared twice in one scope.
    DuplicateDeclaration,
}

impl DiagnosticKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::UnterminatedString => "UNTERMINATED_STRING",
            Self::UnterminatedComment => "UNTERMINATED_COMMENT",
            Self::UnterminatedTemplate => "UNTERMINATED_TEMPLATE",
            Self::UnbalancedBracket => "UNBALANCED_BRACKET",
            Self::EvalUsed => "EVAL_USED",
            Self::WithUsed => "WITH_USED",
            Self::DuplicateDeclaration => "DUPLICATE_DECLARATION",
        }
    }
}

/// A single finding with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// 1-based line and column of the start of the span.
    pub fn location(&self, index: &LineIndex) -> (u32, u32) {
        let (line, col) = index.line_col(self.span.start);
        (line + 1, col + 1)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (at byte {})", self.kind.code(), self.message, self.span.start)
    }
}
