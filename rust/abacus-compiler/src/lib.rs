//! Abacus Compiler
//!
//! Turns expression source text into the executable form: a hand-written
//! precedence-climbing parser producing the IR, and a lowering pass that
//! resolves function names against a registry and validates arities.

pub mod compiler;

pub use compiler::lower::{lower, CompileError};
pub use compiler::parser::{parse, ParseError};
