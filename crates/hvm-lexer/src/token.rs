use serde::Serialize;

use hvm_common::Span;

/// A token produced by the lexer.
///
/// `value` carries the matched character for tokens whose identity depends
/// on it (ordinary characters, bracket/escape tokens); it is `None` for
/// purely structural tokens where the parser only cares about the kind
/// (parens, `Eof`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<char>,
    pub span: Span,
}

impl Token {
    /// Create a new token from a kind, an optional character value, and byte offsets.
    pub fn new(kind: TokenKind, value: Option<char>, start: u32, end: u32) -> Self {
        Self {
            kind,
            value,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// An ordinary literal character outside a bracket expression, or an
    /// in-bracket character that isn't `^`, `]`, `\`, or `-` in a context
    /// where those are special.
    OrdChar,
    LParen,
    RParen,
    /// `[`, also the entry point into bracket-expression mode.
    LBrack,
    /// `]` closing a bracket expression (only emitted once `first` has
    /// been cleared; a leading `]` is re-typed as `OrdChar`).
    RBrack,
    /// `^` as bracket-expression negation, or as a literal top-level operator.
    Carat,
    Star,
    Plus,
    Qmark,
    Dot,
    Pipe,
    /// `-` as a bracket-expression range separator (not at the leading position).
    Dash,
    /// An escaped literal from the set `` \ * + ? ( ) | [ ] ^ - ``.
    EsNormal,
    /// An escaped control-character letter: one of `t n r f v`.
    EsChar,
    /// An escaped named-class letter: one of `w W d D s S`.
    EsSpecial,
    Eof,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_new_sets_span() {
        let tok = Token::new(TokenKind::OrdChar, Some('a'), 2, 3);
        assert_eq!(tok.kind, TokenKind::OrdChar);
        assert_eq!(tok.value, Some('a'));
        assert_eq!(tok.span, Span::new(2, 3));
    }
}
