//! Recursive-descent parser turning a lexed token stream into the regex AST.

mod ast;
mod error;
mod parser;

pub use ast::{
    Ast, BrackExprNode, CharValue, DupKind, NonDupReNode, ReExprNode, RegexNode, SimpleReNode,
};
pub use error::ParseError;
pub use hvm_lexer::{Token, TokenKind};
pub use parser::parse;
