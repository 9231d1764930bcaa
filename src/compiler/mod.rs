// src/compiler/mod.rs

//! Compiler abstraction used by the loader.
//!
//! The loader treats compiled programs as opaque: it hands source bytes to a
//! [`Compiler`] and either installs the result or reports its diagnostics.
//! [`rules::RuleCompiler`] is the built-in implementation used by the binary.

use std::fmt;

pub mod rules;

pub use rules::{Rule, RuleCompiler, RuleProgram};

/// A single human-readable problem found while compiling a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub program: String,
    /// 1-based source line, when the problem can be pinned to one.
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(program: &str, line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            program: program.to_string(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.program, line, self.message),
            None => write!(f, "{}: {}", self.program, self.message),
        }
    }
}

/// Turns program source into an executable representation.
///
/// `compile` returns every diagnostic it found, in source order; an `Err`
/// is never empty.
pub trait Compiler: Send + Sync + 'static {
    type Program: Send + Sync + 'static;

    fn compile(&self, name: &str, source: &[u8]) -> Result<Self::Program, Vec<Diagnostic>>;

    /// Render the compiled form for inspection.
    fn dump(&self, name: &str, program: &Self::Program) -> String;
}
