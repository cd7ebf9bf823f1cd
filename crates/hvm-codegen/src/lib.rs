//! Turns regex source text into a hendersonvm bytecode program: lex, parse,
//! generate, serialize.

mod brackets;
mod error;
mod generate;
mod opcode;
mod ranges;
mod serialize;

use std::error::Error;
use std::fmt;

use hvm_lexer::{LexError, Lexer};
use hvm_parser::{Ast, ParseError};

pub use error::CodegenError;
pub use opcode::{Arg, Instruction, Opcode, INF, WILDCARD};
pub use serialize::Triple;

/// Any failure in the lex/parse/generate/serialize pipeline.
#[derive(Debug)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
    Codegen(CodegenError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{e}"),
            CompileError::Parse(e) => write!(f, "{e}"),
            CompileError::Codegen(e) => write!(f, "{e}"),
        }
    }
}

impl Error for CompileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CompileError::Lex(e) => Some(e),
            CompileError::Parse(e) => Some(e),
            CompileError::Codegen(e) => Some(e),
        }
    }
}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<CodegenError> for CompileError {
    fn from(e: CodegenError) -> Self {
        CompileError::Codegen(e)
    }
}

/// Lex, parse, emit, and serialize `regex`, appending a terminal `match`
/// instruction. `full_graph` is `false`: unit productions collapse and the
/// AST is discarded once code generation is done.
pub fn compile(regex: &str) -> Result<Vec<Triple>, CompileError> {
    let (_, program) = compile_with_ast(regex, false)?;
    Ok(program)
}

/// As [`compile`], but also returns the parsed AST, e.g. for diagramming.
/// `full_graph` controls whether unit productions are collapsed (`false`,
/// the default compiler behavior) or materialized in full (`true`).
pub fn compile_with_ast(regex: &str, full_graph: bool) -> Result<(Ast, Vec<Triple>), CompileError> {
    let tokens = Lexer::tokenize(regex)?;
    let ast = hvm_parser::parse(&tokens, full_graph)?;

    let mut instructions = Vec::new();
    generate::generate(&ast, &mut instructions);
    instructions.push(Instruction::match_instr());

    let program = serialize::serialize(&instructions)?;
    Ok((ast, program))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_char_compiles_to_char_then_match() {
        let program = compile("a").unwrap();
        assert_eq!(program, vec![(Opcode::Char as u32, 'a' as u32, 0), (Opcode::Match as u32, 0, 0)]);
    }

    #[test]
    fn every_program_ends_with_match() {
        for pattern in ["a", "a|b", "a*", "a+", "a?", "(ab)+", "[abc]", "\\d+"] {
            let program = compile(pattern).unwrap();
            let (cmd, a1, a2) = *program.last().unwrap();
            assert_eq!((cmd, a1, a2), (Opcode::Match as u32, 0, 0), "pattern {pattern}");
        }
    }

    #[test]
    fn compile_is_deterministic() {
        assert_eq!(compile("(a|b)*c+d?").unwrap(), compile("(a|b)*c+d?").unwrap());
    }

    #[test]
    fn full_graph_does_not_change_the_emitted_program() {
        let (_, collapsed) = compile_with_ast("a|b*", false).unwrap();
        let (_, full) = compile_with_ast("a|b*", true).unwrap();
        assert_eq!(collapsed, full);
    }

    #[test]
    fn dot_wildcard_compiles_to_full_range_char() {
        let program = compile(".").unwrap();
        assert_eq!(program, vec![(Opcode::Char as u32, 0, INF), (Opcode::Match as u32, 0, 0)]);
    }

    #[test]
    fn single_range_bracket_equals_equivalent_range() {
        assert_eq!(compile("[a-a]").unwrap(), compile("[a]").unwrap());
    }

    #[test]
    fn bare_digit_class_is_equivalent_to_bracketed_range() {
        assert_eq!(compile("\\d").unwrap(), compile("[0-9]").unwrap());
    }

    #[test]
    fn bare_negated_digit_class_is_a_single_nchar_range() {
        let program = compile("\\D").unwrap();
        assert_eq!(
            program,
            vec![(Opcode::Nchar as u32, '0' as u32, '9' as u32), (Opcode::Match as u32, 0, 0)]
        );
    }

    #[test]
    fn concatenation_of_groups_then_plus_scopes_dup_over_the_group() {
        // (ab)+ : concatenation of a,b, then a split back to position 0.
        let program = compile("(ab)+").unwrap();
        assert_eq!(
            program,
            vec![
                (Opcode::Char as u32, 'a' as u32, 0),
                (Opcode::Char as u32, 'b' as u32, 0),
                (Opcode::Split as u32, 0, 3),
                (Opcode::Match as u32, 0, 0),
            ]
        );
    }

    #[test]
    fn lex_error_propagates_as_compile_error() {
        assert!(matches!(compile("[a-"), Err(CompileError::Lex(_)) | Err(CompileError::Parse(_))));
    }

    #[test]
    fn unbalanced_group_is_a_parse_error() {
        assert!(matches!(compile("(a"), Err(CompileError::Parse(_))));
    }
}
