//! Crate-level tests: operator tables and whole-program behaviour.
//!
//! Programs are built with `dws_ir::build` and run under
//! [`EvalMode::TestRun`], so `PrintLn` output lands in a buffer.

use dws_ir::ast::Program;

use crate::{EvalMode, Interpreter, InterpreterBuilder, RunError};

mod arrays_tests;
mod classes_tests;
mod exceptions_tests;
mod overloads_tests;
mod statements_tests;
mod unary_operators_tests;

/// A fresh interpreter with captured output.
pub(crate) fn interpreter() -> Interpreter {
    InterpreterBuilder::new()
        .mode(EvalMode::TestRun)
        .build()
        .unwrap_or_else(|e| panic!("standard classes failed to load: {e}"))
}

/// Run `program` and return everything it printed.
pub(crate) fn output_of(program: &Program) -> String {
    let mut interp = interpreter();
    if let Err(e) = interp.run(program) {
        panic!("program failed: {e}");
    }
    interp.print_handler().get_output()
}

/// Run `program`, expecting it to fail; returns the failure and the output
/// printed before it.
pub(crate) fn failure_of(program: &Program) -> (RunError, String) {
    let mut interp = interpreter();
    match interp.run(program) {
        Ok(()) => panic!(
            "program succeeded, printed {:?}",
            interp.print_handler().get_output()
        ),
        Err(e) => (e, interp.print_handler().get_output()),
    }
}

/// Lines of output, for programs that print several values.
pub(crate) fn lines(output: &str) -> Vec<&str> {
    output.lines().collect()
}
