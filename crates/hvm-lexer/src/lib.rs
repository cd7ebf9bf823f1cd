//! Mode-switching tokenizer for the regex surface syntax.
//!
//! Three modes: `INITIAL`, `brackexpr`, `escseq`. `brackexpr` is entered at
//! `[` and exited at the matching `]`; `escseq` is entered by `\` and exited
//! after exactly one more character, so it never outlives a single call to
//! [`Lexer::next`] — it is implemented as a synchronous helper rather than a
//! third stack entry (see `DESIGN.md`).

mod cursor;
mod error;
mod token;

use cursor::Cursor;

pub use error::{LexError, LexErrorKind};
pub use token::{Token, TokenKind};

/// Lexing context. Forms a stack; `brackexpr` never nests (a `[` inside a
/// bracket expression is just an ordinary character), so depth never
/// exceeds two.
#[derive(Debug, Clone, PartialEq)]
enum LexState {
    Initial,
    /// `leading` is true only for the very first character after `[`: only
    /// there can `^` act as the negation marker. `first_content` is true
    /// until the first content character (including a consumed negation
    /// marker) has been accounted for; it lets `]` and `-` be literal
    /// immediately after `[` or after a leading `^`.
    BrackExpr { leading: bool, first_content: bool },
}

/// The regex lexer. Converts source text into a stream of tokens.
///
/// Implements `Iterator<Item = Result<Token, LexError>>`: lexing aborts at
/// the first error, matching the compiler's no-recovery policy, and the
/// iterator yields `None` forever after that error (and after `Eof`).
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    done: bool,
    state_stack: Vec<LexState>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            done: false,
            state_stack: vec![LexState::Initial],
        }
    }

    /// Tokenize the entire source into a `Vec<Token>`, stopping at the first
    /// error (the `Eof` token is included on success).
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        Lexer::new(source).collect()
    }

    fn current_state(&self) -> LexState {
        self.state_stack
            .last()
            .cloned()
            .expect("state stack must never be empty")
    }

    fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        if self.done {
            return None;
        }
        let result = match self.current_state() {
            LexState::Initial => self.lex_initial(),
            LexState::BrackExpr { leading, first_content } => {
                self.lex_brackexpr(leading, first_content)
            }
        };
        if matches!(&result, Ok(t) if t.kind == TokenKind::Eof) || result.is_err() {
            self.done = true;
        }
        Some(result)
    }

    // ── INITIAL mode ───────────────────────────────────────────────────

    fn lex_initial(&mut self) -> Result<Token, LexError> {
        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Ok(Token::new(TokenKind::Eof, None, start, start));
        };

        tracing::trace!(char = %c, pos = start, "lex_initial");

        match c {
            '(' => Ok(self.single(TokenKind::LParen, c, start)),
            ')' => Ok(self.single(TokenKind::RParen, c, start)),
            '[' => {
                self.cursor.advance();
                self.state_stack.push(LexState::BrackExpr {
                    leading: true,
                    first_content: true,
                });
                Ok(Token::new(TokenKind::LBrack, Some('['), start, self.cursor.pos()))
            }
            '^' => Ok(self.single(TokenKind::Carat, c, start)),
            '*' => Ok(self.single(TokenKind::Star, c, start)),
            '+' => Ok(self.single(TokenKind::Plus, c, start)),
            '?' => Ok(self.single(TokenKind::Qmark, c, start)),
            '.' => Ok(self.single(TokenKind::Dot, c, start)),
            '|' => Ok(self.single(TokenKind::Pipe, c, start)),
            '\\' => {
                self.cursor.advance();
                self.lex_escape(start, false)
            }
            _ => {
                self.cursor.advance();
                Ok(Token::new(TokenKind::OrdChar, Some(c), start, self.cursor.pos()))
            }
        }
    }

    // ── brackexpr mode ─────────────────────────────────────────────────

    fn lex_brackexpr(&mut self, leading: bool, first_content: bool) -> Result<Token, LexError> {
        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Err(LexError::new(
                LexErrorKind::UnterminatedBracketExpression,
                hvm_common::Span::at(start),
            ));
        };

        tracing::trace!(char = %c, pos = start, leading, first_content, "lex_brackexpr");

        match c {
            '^' if leading => {
                self.cursor.advance();
                // Negation consumed, but the next character is still the
                // bracket expression's first content character.
                self.set_leading(false);
                Ok(Token::new(TokenKind::Carat, Some('^'), start, self.cursor.pos()))
            }
            ']' if first_content => {
                self.cursor.advance();
                self.clear_flags();
                Ok(Token::new(TokenKind::OrdChar, Some(']'), start, self.cursor.pos()))
            }
            ']' => {
                self.cursor.advance();
                self.state_stack.pop();
                Ok(Token::new(TokenKind::RBrack, Some(']'), start, self.cursor.pos()))
            }
            '-' if first_content => {
                self.cursor.advance();
                self.clear_flags();
                Ok(Token::new(TokenKind::OrdChar, Some('-'), start, self.cursor.pos()))
            }
            '-' => {
                self.cursor.advance();
                self.clear_flags();
                Ok(Token::new(TokenKind::Dash, Some('-'), start, self.cursor.pos()))
            }
            '^' => {
                self.cursor.advance();
                self.clear_flags();
                Ok(Token::new(TokenKind::OrdChar, Some('^'), start, self.cursor.pos()))
            }
            '\\' => {
                self.cursor.advance();
                let tok = self.lex_escape(start, true);
                self.clear_flags();
                tok
            }
            _ => {
                self.cursor.advance();
                self.clear_flags();
                Ok(Token::new(TokenKind::OrdChar, Some(c), start, self.cursor.pos()))
            }
        }
    }

    /// Clear `leading` only (used after consuming the negation marker).
    fn set_leading(&mut self, value: bool) {
        if let Some(LexState::BrackExpr { leading, .. }) = self.state_stack.last_mut() {
            *leading = value;
        }
    }

    /// Clear both `leading` and `first_content` (used after any content
    /// character has been consumed).
    fn clear_flags(&mut self) {
        if let Some(LexState::BrackExpr { leading, first_content }) = self.state_stack.last_mut() {
            *leading = false;
            *first_content = false;
        }
    }

    // ── escseq (synchronous, one character) ───────────────────────────

    /// Consume exactly one more character after an already-consumed `\` and
    /// classify it as `EsNormal`, `EsChar`, or `EsSpecial`.
    fn lex_escape(&mut self, start: u32, in_brack_expr: bool) -> Result<Token, LexError> {
        let Some(c) = self.cursor.advance() else {
            return Err(LexError::new(LexErrorKind::UnterminatedEscape, hvm_common::Span::at(start)));
        };
        let end = self.cursor.pos();

        match c {
            '\\' | '*' | '+' | '?' | '(' | ')' | '|' | '[' | ']' | '^' | '-' => {
                if !in_brack_expr && c == '-' {
                    // `\-` outside a bracket expression is a literal `-`.
                    Ok(Token::new(TokenKind::OrdChar, Some('-'), start, end))
                } else {
                    Ok(Token::new(TokenKind::EsNormal, Some(c), start, end))
                }
            }
            't' | 'n' | 'r' | 'f' | 'v' => Ok(Token::new(TokenKind::EsChar, Some(c), start, end)),
            _ if hvm_common::constants::is_class_letter(c) => {
                Ok(Token::new(TokenKind::EsSpecial, Some(c), start, end))
            }
            other => Err(LexError::new(
                LexErrorKind::InvalidEscapeLetter(other),
                hvm_common::Span::new(start, end),
            )),
        }
    }

    fn single(&mut self, kind: TokenKind, c: char, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, Some(c), start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
