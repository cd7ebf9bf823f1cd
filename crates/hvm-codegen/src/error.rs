use std::error::Error;
use std::fmt;

/// Failures that can occur while turning a generated instruction list into
/// its wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A jump or split target was never back-patched. Indicates a bug in a
    /// scaffold builder rather than anything a caller can act on.
    UnresolvedPlaceholder { instruction_index: usize },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::UnresolvedPlaceholder { instruction_index } => {
                write!(f, "instruction {instruction_index} has an unresolved jump target")
            }
        }
    }
}

impl Error for CodegenError {}
