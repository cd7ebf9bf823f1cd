use std::fmt;

use serde::Serialize;

use hvm_common::Span;

/// A lexer error with location information.
///
/// The compiler does not recover from lexical errors: the first one
/// encountered aborts the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The specific kind of lexer error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    /// A character appeared where the grammar forbids it (currently
    /// unreachable in `INITIAL`/`brackexpr` modes, since `OrdChar` is a
    /// catch-all there; kept for forward compatibility and to give
    /// `compile`'s error type a uniform shape for any mode the lexer adds).
    UnexpectedCharacter(char),
    /// `\` was the last character of the input.
    UnterminatedEscape,
    /// A letter other than `\ * + ? ( ) | [ ] ^ - t n r f v w W d D s S`
    /// followed a `\`.
    InvalidEscapeLetter(char),
    /// A `[` was never closed by a matching `]`.
    UnterminatedBracketExpression,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::UnterminatedEscape => write!(f, "unterminated escape sequence"),
            Self::InvalidEscapeLetter(c) => write!(f, "invalid escape sequence: \\{c}"),
            Self::UnterminatedBracketExpression => write!(f, "unterminated bracket expression"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::new(LexErrorKind::InvalidEscapeLetter('q'), Span::new(0, 2));
        assert_eq!(err.to_string(), "invalid escape sequence: \\q");
    }

    #[test]
    fn lex_error_kind_display_all_variants() {
        assert_eq!(
            LexErrorKind::UnexpectedCharacter('@').to_string(),
            "unexpected character: '@'"
        );
        assert_eq!(
            LexErrorKind::UnterminatedEscape.to_string(),
            "unterminated escape sequence"
        );
        assert_eq!(
            LexErrorKind::UnterminatedBracketExpression.to_string(),
            "unterminated bracket expression"
        );
    }
}
