//! The default textual program listing. Grounded on
//! `examples/original_source/instructions.py`'s `prettyprint_program`:
//! index-aligned, opcode left-justified, `char`/`nchar` arguments rendered
//! as a symbolic name (`INF`, `ZERO`) or literal character rather than a
//! raw codepoint.

use std::fmt::Write as _;

use hvm_codegen::{Triple, INF};

fn opcode_name(cmd: u32) -> &'static str {
    match cmd {
        0 => "match",
        1 => "char",
        2 => "split",
        3 => "jmp",
        4 => "nchar",
        other => unreachable!("unknown opcode {other}"),
    }
}

/// Render a `char`/`nchar` argument: `INF` for the wildcard sentinel,
/// `ZERO` for a literal NUL (indistinguishable here from "absent", as in
/// the source this is ported from), otherwise the character itself.
fn render_char_arg(v: u32) -> String {
    match v {
        INF => "INF".to_string(),
        0 => "ZERO".to_string(),
        c => char::from_u32(c).map(String::from).unwrap_or_else(|| c.to_string()),
    }
}

pub fn render_program(program: &[Triple]) -> String {
    let index_width = program.len().to_string().len();
    let mut out = String::new();

    for (idx, &(cmd, arg1, arg2)) in program.iter().enumerate() {
        let name = opcode_name(cmd);
        let is_char_like = matches!(cmd, 1 | 4);

        if arg2 != 0 {
            let a1 = if is_char_like { render_char_arg(arg1) } else { arg1.to_string() };
            let a2 = if is_char_like { render_char_arg(arg2) } else { arg2.to_string() };
            let _ = writeln!(out, "{idx:>index_width$}: {name:<5} {a1:>3} {a2:>3}");
        } else if arg1 != 0 || name == "jmp" {
            let a1 = if is_char_like { render_char_arg(arg1) } else { arg1.to_string() };
            let _ = writeln!(out, "{idx:>index_width$}: {name:<5} {a1:>3}");
        } else {
            let _ = writeln!(out, "{idx:>index_width$}: {name:<5}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_char_arguments_as_literal_characters() {
        let out = render_program(&[(1, 'a' as u32, 0), (0, 0, 0)]);
        let first_line: Vec<&str> = out.lines().next().unwrap().split_whitespace().collect();
        assert_eq!(first_line, vec!["0:", "char", "a"]);
    }

    #[test]
    fn renders_wildcard_range_with_symbolic_names() {
        let out = render_program(&[(1, 0, INF)]);
        assert!(out.contains("ZERO"));
        assert!(out.contains("INF"));
    }

    #[test]
    fn jmp_is_always_shown_even_with_zero_target() {
        let out = render_program(&[(3, 0, 0)]);
        assert!(out.contains("jmp"));
        assert!(out.contains("0: jmp"));
    }

    #[test]
    fn match_with_no_args_prints_bare_mnemonic() {
        let out = render_program(&[(0, 0, 0)]);
        assert_eq!(out.trim_end(), "0: match");
    }
}
