//! AST-to-instruction dispatch. Mirrors the node-by-node emitters in
//! `rajax/ast.py`'s `ASTNode` subclasses; `full_graph`'s `Plain` wrapper
//! variants delegate straight through, so codegen is invariant under it.

use hvm_parser::{Ast, BrackExprNode, CharValue, DupKind, NonDupReNode, ReExprNode, RegexNode, SimpleReNode};

use crate::brackets;
use crate::opcode::{Instruction, INF};

/// Append `node`'s instructions to `out`.
pub fn generate(node: &Ast, out: &mut Vec<Instruction>) {
    match node {
        Ast::Regex(RegexNode::Plain(child)) => generate(child, out),
        Ast::Regex(RegexNode::Alt(lhs, rhs)) => generate_alt(lhs, rhs, out),

        Ast::ReExpr(ReExprNode::Plain(child)) => generate(child, out),
        Ast::ReExpr(ReExprNode::Concat(lhs, rhs)) => {
            generate(lhs, out);
            generate(rhs, out);
        }

        Ast::SimpleRe(SimpleReNode::Plain(child)) => generate(child, out),
        Ast::SimpleRe(SimpleReNode::Dup(kind, child)) => generate_dup(*kind, child, out),

        Ast::NonDupRe(NonDupReNode::Char { value, .. }) => generate_char_value(*value, out),
        Ast::NonDupRe(NonDupReNode::Group(child)) => generate(child, out),

        Ast::OneChar(value) => generate_char_value(*value, out),

        Ast::BrackExpr(BrackExprNode { matching, children }) => {
            brackets::lower(*matching, children, out);
        }

        other => unreachable!("{other:?} cannot be codegen'd as a top-level node"),
    }
}

fn generate_char_value(value: CharValue, out: &mut Vec<Instruction>) {
    match value {
        CharValue::Char(c) => out.push(Instruction::char_single(c as u32)),
        CharValue::Wildcard => out.push(Instruction::char_range(0, INF)),
    }
}

/// ```text
/// L0: split L1, L2
/// L1: <code for a>
///     jmp L3
/// L2: <code for b>
/// L3:
/// ```
fn generate_alt(lhs: &Ast, rhs: &Ast, out: &mut Vec<Instruction>) {
    let back_jump = out.len() as u32 + 1;
    let split_idx = out.len();
    out.push(Instruction::split_placeholder(back_jump));

    generate(lhs, out);

    let jmp_idx = out.len();
    out.push(Instruction::jmp_placeholder());
    out[split_idx].arg2 = (out.len() as u32).into();

    generate(rhs, out);
    out[jmp_idx].arg1 = (out.len() as u32).into();
}

fn generate_dup(kind: DupKind, child: &Ast, out: &mut Vec<Instruction>) {
    match kind {
        DupKind::Plus => {
            // L1: <code for e>
            //     split L1, L3
            let back_jump = out.len() as u32;
            generate(child, out);
            let forward_jump = out.len() as u32 + 1;
            out.push(Instruction::split(back_jump, forward_jump));
        }
        DupKind::Star => {
            // L1: split L2, L3
            // L2: <code for e>
            //     jmp L1
            // L3:
            let back_jump = out.len() as u32 + 1;
            let split_idx = out.len();
            out.push(Instruction::split_placeholder(back_jump));
            generate(child, out);
            out.push(Instruction::jmp(back_jump - 1));
            out[split_idx].arg2 = (out.len() as u32).into();
        }
        DupKind::Qmark => {
            // L0: split L1, L2
            // L1: <code for e>
            // L2:
            let back_jump = out.len() as u32 + 1;
            let split_idx = out.len();
            out.push(Instruction::split_placeholder(back_jump));
            generate(child, out);
            out[split_idx].arg2 = (out.len() as u32).into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    fn gen(ast: &Ast) -> Vec<Instruction> {
        let mut out = Vec::new();
        generate(ast, &mut out);
        out
    }

    fn char_node(c: char) -> Ast {
        Ast::NonDupRe(NonDupReNode::Char { value: CharValue::Char(c), children: vec![] })
    }

    #[test]
    fn single_char() {
        let out = gen(&char_node('a'));
        assert_eq!(out, vec![Instruction::char_single('a' as u32)]);
    }

    #[test]
    fn wildcard_emits_full_range() {
        let out = gen(&Ast::OneChar(CharValue::Wildcard));
        assert_eq!(out, vec![Instruction::char_range(0, INF)]);
    }

    #[test]
    fn concat_emits_both_children_in_order() {
        let ast = Ast::ReExpr(ReExprNode::Concat(Box::new(char_node('a')), Box::new(char_node('b'))));
        let out = gen(&ast);
        assert_eq!(out, vec![Instruction::char_single('a' as u32), Instruction::char_single('b' as u32)]);
    }

    #[test]
    fn alternation_matches_canonical_scenario() {
        let ast = Ast::Regex(RegexNode::Alt(Box::new(char_node('a')), Box::new(char_node('b'))));
        let out = gen(&ast);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], Instruction::split(1u32, 3u32));
        assert_eq!(out[1], Instruction::char_single('a' as u32));
        assert_eq!(out[2], Instruction::jmp(4u32));
        assert_eq!(out[3], Instruction::char_single('b' as u32));
    }

    #[test]
    fn star_matches_canonical_scenario() {
        let ast = Ast::SimpleRe(SimpleReNode::Dup(DupKind::Star, Box::new(char_node('a'))));
        let out = gen(&ast);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], Instruction::split(1u32, 3u32));
        assert_eq!(out[1], Instruction::char_single('a' as u32));
        assert_eq!(out[2], Instruction::jmp(0u32));
    }

    #[test]
    fn plus_matches_canonical_scenario() {
        let ast = Ast::SimpleRe(SimpleReNode::Dup(DupKind::Plus, Box::new(char_node('a'))));
        let out = gen(&ast);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Instruction::char_single('a' as u32));
        assert_eq!(out[1], Instruction::split(0u32, 2u32));
    }

    #[test]
    fn qmark_matches_canonical_scenario() {
        let ast = Ast::SimpleRe(SimpleReNode::Dup(DupKind::Qmark, Box::new(char_node('a'))));
        let out = gen(&ast);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Instruction::split(1u32, 2u32));
        assert_eq!(out[1], Instruction::char_single('a' as u32));
    }

    #[test]
    fn group_delegates_to_child() {
        let ast = Ast::NonDupRe(NonDupReNode::Group(Box::new(char_node('a'))));
        let out = gen(&ast);
        assert_eq!(out, vec![Instruction::char_single('a' as u32)]);
    }

    #[test]
    fn full_graph_plain_wrappers_are_invariant() {
        let plain = Ast::Regex(RegexNode::Plain(Box::new(Ast::ReExpr(ReExprNode::Plain(Box::new(
            Ast::SimpleRe(SimpleReNode::Plain(Box::new(char_node('a')))),
        ))))));
        assert_eq!(gen(&plain), gen(&char_node('a')));
    }

    #[test]
    fn nested_alt_uses_opcode_split() {
        let ast = Ast::Regex(RegexNode::Alt(Box::new(char_node('a')), Box::new(char_node('b'))));
        let out = gen(&ast);
        assert_eq!(out[0].cmd, Opcode::Split);
    }
}
