use std::sync::{Arc, Mutex};

use progload::compiler::{Compiler, Diagnostic, RuleCompiler, RuleProgram};

/// Wraps the real `RuleCompiler` and records every name it is asked to
/// compile, so tests can assert what reached the compiler at all.
#[derive(Debug, Clone, Default)]
pub struct RecordingCompiler {
    inner: RuleCompiler,
    compiled: Arc<Mutex<Vec<String>>>,
}

impl RecordingCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the recorded names; stays valid after the compiler
    /// has been moved into a loader.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.compiled)
    }
}

impl Compiler for RecordingCompiler {
    type Program = RuleProgram;

    fn compile(&self, name: &str, source: &[u8]) -> Result<RuleProgram, Vec<Diagnostic>> {
        self.compiled.lock().unwrap().push(name.to_string());
        self.inner.compile(name, source)
    }

    fn dump(&self, name: &str, program: &RuleProgram) -> String {
        self.inner.dump(name, program)
    }
}
