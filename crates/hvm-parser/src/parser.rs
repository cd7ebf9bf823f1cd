use hvm_common::constants;
use hvm_lexer::{Token, TokenKind};

use crate::ast::{
    Ast, BrackExprNode, CharValue, DupKind, NonDupReNode, ReExprNode, RegexNode, SimpleReNode,
};
use crate::error::ParseError;

/// Recursive-descent parser over an already-lexed token slice.
///
/// Grammar (`E` = regex, `T` = re-expr, `S` = simple-re, `N` = non-dup-re):
///
/// ```text
/// E  -> T | E '|' T
/// T  -> S | T S
/// S  -> N | N U
/// U  -> '*' | '+' | '?'
/// N  -> one_char | '(' E ')'
/// ```
///
/// Duplication binds tightest, concatenation is left-associative,
/// alternation is the loosest.
pub struct Parser<'toks> {
    tokens: &'toks [Token],
    pos: usize,
    full_graph: bool,
}

/// The result of reducing `one_char`: either a scalar codepoint (wrapped by
/// the caller into `NonDupRe::Char`) or a fully-formed node (a bracket
/// expression or bare named class, which is already the right shape for
/// `N` and needs no further wrapping).
enum OneChar {
    Scalar(CharValue),
    Node(Ast),
}

/// Parse a full token stream (including the trailing `Eof`) into an AST.
pub fn parse(tokens: &[Token], full_graph: bool) -> Result<Ast, ParseError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        full_graph,
    };
    let ast = parser.parse_e()?;
    parser.expect(TokenKind::Eof, "expected end of input")?;
    Ok(ast)
}

const S_FIRST_SET: &[TokenKind] = &[
    TokenKind::OrdChar,
    TokenKind::EsNormal,
    TokenKind::Dot,
    TokenKind::Dash,
    TokenKind::LBrack,
    TokenKind::EsChar,
    TokenKind::EsSpecial,
    TokenKind::LParen,
];

impl<'toks> Parser<'toks> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(ParseError::new(message, self.peek().span))
        }
    }

    // ── E -> T | E '|' T ───────────────────────────────────────────────

    fn parse_e(&mut self) -> Result<Ast, ParseError> {
        let first = self.parse_t()?;
        if self.peek_kind() != TokenKind::Pipe {
            return Ok(self.wrap_regex_plain(first));
        }
        let mut acc = first;
        while self.peek_kind() == TokenKind::Pipe {
            self.advance();
            let rhs = self.parse_t()?;
            acc = Ast::Regex(RegexNode::Alt(Box::new(acc), Box::new(rhs)));
        }
        Ok(acc)
    }

    fn wrap_regex_plain(&self, child: Ast) -> Ast {
        if self.full_graph {
            Ast::Regex(RegexNode::Plain(Box::new(child)))
        } else {
            child
        }
    }

    // ── T -> S | T S ───────────────────────────────────────────────────

    fn parse_t(&mut self) -> Result<Ast, ParseError> {
        let first = self.parse_s()?;
        if !S_FIRST_SET.contains(&self.peek_kind()) {
            return Ok(self.wrap_re_expr_plain(first));
        }
        let mut acc = first;
        while S_FIRST_SET.contains(&self.peek_kind()) {
            let rhs = self.parse_s()?;
            acc = Ast::ReExpr(ReExprNode::Concat(Box::new(acc), Box::new(rhs)));
        }
        Ok(acc)
    }

    fn wrap_re_expr_plain(&self, child: Ast) -> Ast {
        if self.full_graph {
            Ast::ReExpr(ReExprNode::Plain(Box::new(child)))
        } else {
            child
        }
    }

    // ── S -> N | N U ───────────────────────────────────────────────────

    fn parse_s(&mut self) -> Result<Ast, ParseError> {
        let n = self.parse_n()?;
        let dup = match self.peek_kind() {
            TokenKind::Star => Some(DupKind::Star),
            TokenKind::Plus => Some(DupKind::Plus),
            TokenKind::Qmark => Some(DupKind::Qmark),
            _ => None,
        };
        match dup {
            Some(kind) => {
                self.advance();
                Ok(Ast::SimpleRe(SimpleReNode::Dup(kind, Box::new(n))))
            }
            None => {
                if self.full_graph {
                    Ok(Ast::SimpleRe(SimpleReNode::Plain(Box::new(n))))
                } else {
                    Ok(n)
                }
            }
        }
    }

    // ── N -> one_char | '(' E ')' ──────────────────────────────────────

    fn parse_n(&mut self) -> Result<Ast, ParseError> {
        if self.peek_kind() == TokenKind::LParen {
            let open = self.advance();
            let inner = self.parse_e()?;
            if self.peek_kind() != TokenKind::RParen {
                return Err(ParseError::with_related(
                    "unbalanced parenthesis: expected ')'",
                    self.peek().span,
                    "'(' opened here",
                    open.span,
                ));
            }
            self.advance();
            return Ok(Ast::NonDupRe(NonDupReNode::Group(Box::new(inner))));
        }

        match self.parse_one_char()? {
            OneChar::Scalar(value) => {
                let children = if self.full_graph {
                    vec![Ast::OneChar(value)]
                } else {
                    Vec::new()
                };
                Ok(Ast::NonDupRe(NonDupReNode::Char { value, children }))
            }
            OneChar::Node(ast) => Ok(ast),
        }
    }

    // ── one_char -> ORD_CHAR | ES_NORMAL | '.' | DASH | brack_expr | escaped_char

    fn parse_one_char(&mut self) -> Result<OneChar, ParseError> {
        match self.peek_kind() {
            TokenKind::OrdChar | TokenKind::EsNormal => {
                let tok = self.advance();
                Ok(OneChar::Scalar(CharValue::Char(tok.value.expect("char token carries a value"))))
            }
            TokenKind::Dash => {
                self.advance();
                Ok(OneChar::Scalar(CharValue::Char('-')))
            }
            TokenKind::Dot => {
                self.advance();
                Ok(OneChar::Scalar(CharValue::Wildcard))
            }
            TokenKind::EsChar => {
                let tok = self.advance();
                let letter = tok.value.expect("escape-char token carries a value");
                let mapped = constants::escape_letter_to_char(letter)
                    .expect("lexer only emits EsChar for t/n/r/f/v");
                Ok(OneChar::Scalar(CharValue::Char(mapped)))
            }
            TokenKind::LBrack => Ok(OneChar::Node(self.parse_brack_expr()?)),
            TokenKind::EsSpecial => {
                let tok = self.advance();
                Ok(OneChar::Node(self.bare_special_escape(tok.value.expect("class token carries a value"))))
            }
            _ => Err(ParseError::new(
                format!("unexpected token {:?}", self.peek_kind()),
                self.peek().span,
            )),
        }
    }

    /// A bare `\w \W \d \D \s \S` outside a bracket expression compiles as
    /// if it were `[...]` (lowercase letters) or `[^...]` over the positive
    /// counterpart (uppercase letters).
    fn bare_special_escape(&self, letter: char) -> Ast {
        if constants::is_negated_class(letter) {
            let positive = constants::positive_letter(letter).expect("negated class letter");
            Ast::BrackExpr(BrackExprNode {
                matching: false,
                children: vec![Ast::CharClass(positive)],
            })
        } else {
            Ast::BrackExpr(BrackExprNode {
                matching: true,
                children: vec![Ast::CharClass(letter)],
            })
        }
    }

    // ── brack_expr -> '[' matching_list ']' | '[' nonmatching_list ']' ──

    fn parse_brack_expr(&mut self) -> Result<Ast, ParseError> {
        let open = self.advance(); // '['
        let matching = if self.peek_kind() == TokenKind::Carat {
            self.advance();
            false
        } else {
            true
        };
        let children = self.parse_bracket_list()?;
        if children.is_empty() {
            return Err(ParseError::new(
                "empty bracket expression",
                open.span.merge(self.peek().span),
            ));
        }
        self.expect(TokenKind::RBrack, "expected ']' to close bracket expression")?;
        Ok(Ast::BrackExpr(BrackExprNode { matching, children }))
    }

    /// `bracket_list -> follow_list | follow_list '-'`.
    /// `follow_list -> expr_term | follow_list expr_term`.
    /// `expr_term -> single_expr | range_expr | special_escape`.
    fn parse_bracket_list(&mut self) -> Result<Vec<Ast>, ParseError> {
        let mut terms = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RBrack => break,
                TokenKind::EsSpecial => {
                    let tok = self.advance();
                    terms.push(Ast::CharClass(tok.value.expect("class token carries a value")));
                }
                TokenKind::OrdChar | TokenKind::EsNormal | TokenKind::EsChar => {
                    let lo = self.end_range_value()?;
                    if self.peek_kind() == TokenKind::Dash {
                        self.advance(); // tentative start_range
                        match self.peek_kind() {
                            TokenKind::OrdChar | TokenKind::EsNormal | TokenKind::EsChar => {
                                let hi = self.end_range_value()?;
                                terms.push(self.make_range_expr(lo, hi)?);
                            }
                            TokenKind::Dash => {
                                self.advance();
                                terms.push(self.make_range_expr(lo, '-')?);
                            }
                            _ => {
                                // `bracket_list -> follow_list '-'`: a trailing
                                // lone dash, not a range.
                                terms.push(Ast::EndRange(lo));
                                terms.push(Ast::EndRange('-'));
                            }
                        }
                    } else {
                        terms.push(Ast::EndRange(lo));
                    }
                }
                _ => {
                    return Err(ParseError::new(
                        format!("unexpected token {:?} in bracket expression", self.peek_kind()),
                        self.peek().span,
                    ))
                }
            }
        }
        Ok(terms)
    }

    fn make_range_expr(&self, lo: char, hi: char) -> Result<Ast, ParseError> {
        if lo > hi {
            return Err(ParseError::new(
                format!("reversed range in bracket expression: {lo}-{hi}"),
                self.tokens[self.pos.saturating_sub(1)].span,
            ));
        }
        Ok(Ast::RangeExpr(lo, hi))
    }

    /// `end_range -> ORD_CHAR | ES_NORMAL | escaped_char`.
    fn end_range_value(&mut self) -> Result<char, ParseError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::OrdChar | TokenKind::EsNormal => {
                Ok(tok.value.expect("char token carries a value"))
            }
            TokenKind::EsChar => {
                let letter = tok.value.expect("escape-char token carries a value");
                Ok(constants::escape_letter_to_char(letter).expect("lexer only emits EsChar for t/n/r/f/v"))
            }
            _ => unreachable!("end_range_value called on a non-end_range token"),
        }
    }
}
