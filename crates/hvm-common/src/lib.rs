//! Shared types for the hendersonvm regex compiler: source spans and the
//! line index used to render diagnostics.

pub mod constants;
pub mod span;

pub use span::{LineIndex, Span};
