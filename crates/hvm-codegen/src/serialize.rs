//! Resolving backpatched instructions into the wire triples described in
//! the data model: `(opcode, arg1, arg2)`, each a `u32`.

use crate::error::CodegenError;
use crate::opcode::Instruction;

/// A serialized instruction: `(opcode, arg1, arg2)`.
pub type Triple = (u32, u32, u32);

/// Resolve every instruction's arguments, failing if any placeholder was
/// never back-patched by a scaffold builder.
pub fn serialize(instructions: &[Instruction]) -> Result<Vec<Triple>, CodegenError> {
    instructions
        .iter()
        .enumerate()
        .map(|(i, instr)| {
            let arg1 = instr
                .arg1
                .resolve()
                .ok_or(CodegenError::UnresolvedPlaceholder { instruction_index: i })?;
            let arg2 = instr
                .arg2
                .resolve()
                .ok_or(CodegenError::UnresolvedPlaceholder { instruction_index: i })?;
            Ok((instr.cmd.as_u32(), arg1, arg2))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Arg;

    #[test]
    fn resolves_plain_instructions() {
        let instrs = vec![Instruction::char_single('a' as u32), Instruction::match_instr()];
        let out = serialize(&instrs).unwrap();
        assert_eq!(out, vec![(1, 'a' as u32, 0), (0, 0, 0)]);
    }

    #[test]
    fn unresolved_placeholder_is_an_error() {
        let instrs = vec![Instruction::jmp_placeholder()];
        assert_eq!(
            serialize(&instrs),
            Err(CodegenError::UnresolvedPlaceholder { instruction_index: 0 })
        );
    }

    #[test]
    fn backpatched_split_resolves_cleanly() {
        let mut instr = Instruction::split_placeholder(1u32);
        instr.arg2 = Arg::Int(5);
        let out = serialize(&[instr]).unwrap();
        assert_eq!(out, vec![(2, 1, 5)]);
    }
}
