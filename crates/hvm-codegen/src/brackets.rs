//! Bracket-expression lowering: the set-algebra-heavy core of code
//! generation. Grounded directly on `rajax/ast.py`'s `CharClassNode` and
//! `BrackExprListNode.generate_instructions`.

use hvm_common::constants;
use hvm_parser::Ast;

use crate::opcode::{Instruction, INF};
use crate::ranges::{transform_classes, Range};

/// A raw emission from a bracket expression's inner terms, before the
/// matching/nonmatching alternatives are assembled. `Break` partitions
/// alternatives and never reaches the final program.
#[derive(Debug, Clone, Copy, PartialEq)]
enum InnerInstr {
    Char(u32, u32),
    Nchar(u32, u32),
    Break,
}

/// Lower a bracket expression's children directly into `out`, handling the
/// split/jmp scaffold if more than one alternative survives.
pub fn lower(matching: bool, children: &[Ast], out: &mut Vec<Instruction>) {
    let inner = emit_inner(children, matching);
    let blocks = if matching {
        assemble_matching(inner)
    } else {
        assemble_nonmatching(inner)
    };
    build_scaffold(blocks, out);
}

fn emit_inner(children: &[Ast], matching: bool) -> Vec<InnerInstr> {
    let mut out = Vec::new();
    for child in children {
        match child {
            Ast::EndRange(c) => {
                let v = *c as u32;
                out.push(if matching { InnerInstr::Char(v, v) } else { InnerInstr::Nchar(v, v) });
            }
            Ast::RangeExpr(lo, hi) => {
                let (lo, hi) = (*lo as u32, *hi as u32);
                out.push(if matching { InnerInstr::Char(lo, hi) } else { InnerInstr::Nchar(lo, hi) });
            }
            Ast::CharClass(letter) => emit_char_class(*letter, matching, &mut out),
            other => unreachable!("bracket expression child must be a follow-list term, got {other:?}"),
        }
    }
    out
}

/// `CharClassNode.generate_instructions`: dispatch on whether the letter is
/// one of the negated aliases (`S D W`) and on the enclosing `matching`
/// flag, inserting a `BREAK` when two same-command emissions would
/// otherwise run together.
fn emit_char_class(letter: char, matching: bool, out: &mut Vec<InnerInstr>) {
    let negated = constants::is_negated_class(letter);
    let positive = constants::positive_letter(letter).expect("parser only emits known class letters");
    let ranges = constants::class_ranges(positive);

    let push_ranges = |out: &mut Vec<InnerInstr>, make: fn(u32, u32) -> InnerInstr| {
        for (a, b) in &ranges {
            out.push(make(*a as u32, *b as u32));
        }
    };

    match (matching, negated) {
        // [\W]: emits nchar (negation of the complement), breaking a run of nchar.
        (true, true) => {
            if matches!(out.last(), Some(InnerInstr::Nchar(..))) {
                out.push(InnerInstr::Break);
            }
            push_ranges(out, InnerInstr::Nchar);
        }
        // [\w]: emits char, no break needed.
        (true, false) => push_ranges(out, InnerInstr::Char),
        // [^\W] == [\w]: emits char, breaking a run of char.
        (false, true) => {
            if matches!(out.last(), Some(InnerInstr::Char(..))) {
                out.push(InnerInstr::Break);
            }
            push_ranges(out, InnerInstr::Char);
        }
        // [^\w]: emits nchar, no break.
        (false, false) => push_ranges(out, InnerInstr::Nchar),
    }
}

fn make_char(lo: u32, hi: u32) -> Instruction {
    if lo == hi {
        Instruction::char_single(lo)
    } else {
        Instruction::char_range(lo, hi)
    }
}

fn make_nchar(lo: u32, hi: u32) -> Instruction {
    if lo == hi {
        Instruction::nchar_single(lo)
    } else {
        Instruction::nchar_range(lo, hi)
    }
}

/// `matching_list`: every `char` is its own alternative; every `nchar` is
/// expanded into the alternatives covering its complement over the full
/// codepoint range. `BREAK` starts a fresh, initially empty alternative.
fn assemble_matching(inner: Vec<InnerInstr>) -> Vec<Vec<Instruction>> {
    let mut blocks = Vec::new();
    for instr in inner {
        match instr {
            InnerInstr::Char(lo, hi) => blocks.push(vec![make_char(lo, hi)]),
            InnerInstr::Nchar(lo, hi) => {
                let complement = transform_classes(&[vec![(0, INF)]], &[(lo, hi)]);
                for r in complement {
                    blocks.push(vec![make_char(r.0, r.1)]);
                }
            }
            InnerInstr::Break => blocks.push(Vec::new()),
        }
    }
    blocks
}

/// `nonmatching_list`: plain exclusions (`nchar` from literal chars, ranges,
/// or non-negated classes) only need to hold simultaneously — no alternative
/// cascade is needed, so they are emitted directly rather than routed
/// through a positive-range seed. A genuine positive contribution (from a
/// negated class like `\D`/`\W`/`\S`) does need the alternative/exclude
/// algebra, since it turns the bracket into "one of these, minus the
/// excludes" rather than a plain conjunction of exclusions; those are
/// combined with `transform_classes`. See `DESIGN.md` for why this departs
/// from a literal port of the universal-range seed.
fn assemble_nonmatching(inner: Vec<InnerInstr>) -> Vec<Vec<Instruction>> {
    let mut families: Vec<Vec<Range>> = Vec::new();
    let mut excludes: Vec<Range> = Vec::new();
    let mut start_new_family = true;

    for instr in inner {
        match instr {
            InnerInstr::Char(lo, hi) => {
                if start_new_family || families.is_empty() {
                    families.push(vec![(lo, hi)]);
                } else {
                    families.last_mut().expect("just checked non-empty").push((lo, hi));
                }
                start_new_family = false;
            }
            InnerInstr::Nchar(lo, hi) => {
                excludes.push((lo, hi));
                start_new_family = true;
            }
            InnerInstr::Break => start_new_family = true,
        }
    }

    if families.is_empty() {
        return excludes.into_iter().map(|(lo, hi)| vec![make_nchar(lo, hi)]).collect();
    }
    transform_classes(&families, &excludes)
        .into_iter()
        .map(|(lo, hi)| vec![make_char(lo, hi)])
        .collect()
}

/// Build the split/jmp cascade over the final alternatives, or emit the
/// single instruction directly when there is exactly one. An empty
/// alternative list means the bracket can never match (e.g. `[^\w\D]`,
/// whose constraints are mutually exclusive); that is represented as a
/// single unconditional `nchar` over the full range.
fn build_scaffold(blocks: Vec<Vec<Instruction>>, out: &mut Vec<Instruction>) {
    let blocks = if blocks.is_empty() {
        vec![vec![Instruction::nchar_range(0, INF)]]
    } else {
        blocks
    };

    if blocks.len() == 1 && blocks[0].len() == 1 {
        out.push(blocks[0][0]);
        return;
    }

    let base = out.len() as u32;
    let k = blocks.len() as u32;
    let total_len: u32 = blocks.iter().map(|b| b.len() as u32).sum();
    let end_of_splits = base + k;
    let end_of_jumps = base + 2 * k - 1 + total_len;

    let mut i = 0u32;
    for block in &blocks[..blocks.len() - 1] {
        let fallthrough = out.len() as u32 + 1;
        out.push(Instruction::split(fallthrough, end_of_splits + i));
        i += 1 + block.len() as u32;
    }
    out.push(Instruction::jmp(end_of_splits + i));

    for block in &blocks[..blocks.len() - 1] {
        out.extend(block.iter().copied());
        out.push(Instruction::jmp(end_of_jumps));
    }
    out.extend(blocks.last().expect("non-empty").iter().copied());
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvm_parser::Ast;

    fn lower_to_vec(matching: bool, children: Vec<Ast>) -> Vec<Instruction> {
        let mut out = Vec::new();
        lower(matching, &children, &mut out);
        out
    }

    #[test]
    fn single_char_matching_emits_one_char_instruction() {
        let out = lower_to_vec(true, vec![Ast::EndRange('a')]);
        assert_eq!(out, vec![Instruction::char_single('a' as u32)]);
    }

    #[test]
    fn single_range_matching_emits_one_char_range() {
        let out = lower_to_vec(true, vec![Ast::RangeExpr('a', 'z')]);
        assert_eq!(out, vec![Instruction::char_range('a' as u32, 'z' as u32)]);
    }

    #[test]
    fn single_char_nonmatching_emits_one_nchar_instruction() {
        let out = lower_to_vec(false, vec![Ast::EndRange('a')]);
        assert_eq!(out, vec![Instruction::nchar_single('a' as u32)]);
    }

    #[test]
    fn multi_char_matching_builds_cascade() {
        let out = lower_to_vec(
            true,
            vec![Ast::EndRange('a'), Ast::EndRange('b'), Ast::EndRange('c')],
        );
        assert_eq!(out.len(), 9);
        assert_eq!(out[0], Instruction::split(1u32, 3u32));
        assert_eq!(out[1], Instruction::split(2u32, 5u32));
        assert_eq!(out[2], Instruction::jmp(7u32));
        assert_eq!(out[3], Instruction::char_single('a' as u32));
        assert_eq!(out[4], Instruction::jmp(8u32));
        assert_eq!(out[5], Instruction::char_single('b' as u32));
        assert_eq!(out[6], Instruction::jmp(8u32));
        assert_eq!(out[7], Instruction::char_single('c' as u32));
    }

    #[test]
    fn bare_digit_class_nonmatching_collapses_to_single_nchar() {
        // `\D` lowers to `BrackExpr{matching:false, children:[CharClass('d')]}`.
        let out = lower_to_vec(false, vec![Ast::CharClass('d')]);
        assert_eq!(out, vec![Instruction::nchar_range('0' as u32, '9' as u32)]);
    }

    #[test]
    fn intersecting_negated_classes_reduce_to_digit_only() {
        // `[^\D\W]` == digit AND word == digit.
        let out = lower_to_vec(false, vec![Ast::CharClass('D'), Ast::CharClass('W')]);
        assert_eq!(out, vec![Instruction::char_range('0' as u32, '9' as u32)]);
    }

    #[test]
    fn mutually_exclusive_negated_classes_are_unmatchable() {
        // `[^\w\D]`: not-word AND digit is impossible since digits are word chars.
        let out = lower_to_vec(false, vec![Ast::CharClass('w'), Ast::CharClass('D')]);
        assert_eq!(out, vec![Instruction::nchar_range(0, INF)]);
    }

    #[test]
    fn negated_w_excludes_digits_from_word_class() {
        // `[^\W\d]`: word AND not-digit == letters and underscore.
        let out = lower_to_vec(false, vec![Ast::CharClass('W'), Ast::CharClass('d')]);
        assert!(out.iter().all(|i| i.cmd == crate::opcode::Opcode::Char));
        assert!(!out.iter().any(|i| i.range() == ('0' as u32, '9' as u32)));
    }
}
