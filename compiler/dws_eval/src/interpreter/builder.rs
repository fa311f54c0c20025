//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use dws_ir::{Position, SemanticInfo};

use super::{CallContext, Interpreter, KnownNames};
use crate::builtins::{BuiltinRegistry, StandardBuiltins};
use crate::diagnostics::CallStack;
use crate::errors::EvalError;
use crate::eval_mode::EvalMode;
use crate::exec::ExceptionState;
use crate::ffi::ExternalRegistry;
use crate::print_handler::{buffer_handler, stdout_handler, SharedPrintHandler};
use crate::types::{TypeRegistry, MAX_CONVERSION_CHAIN_DEPTH};
use crate::{Environment, SharedMutableRegistry};

/// Builder for creating Interpreter instances with various configurations.
///
/// The mode decides the defaults: `Interpret` prints to stdout and allows
/// 1024 nested calls, `TestRun` captures output and allows 256.
pub struct InterpreterBuilder {
    mode: EvalMode,
    max_recursion_depth: Option<usize>,
    print_handler: Option<SharedPrintHandler>,
    semantic_info: Option<Rc<dyn SemanticInfo>>,
    builtins: Option<Rc<dyn BuiltinRegistry>>,
    externals: Option<SharedMutableRegistry<ExternalRegistry>>,
    max_conversion_chain_depth: usize,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            mode: EvalMode::default(),
            max_recursion_depth: None,
            print_handler: None,
            semantic_info: None,
            builtins: None,
            externals: None,
            max_conversion_chain_depth: MAX_CONVERSION_CHAIN_DEPTH,
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: EvalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the mode's call depth limit.
    #[must_use]
    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = Some(depth);
        self
    }

    /// Where `PrintLn` writes. Overrides the mode-based default.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Static types from the semantic pass. Used to pick the static class
    /// of virtual calls and the element type of untyped array literals.
    #[must_use]
    pub fn semantic_info(mut self, info: Rc<dyn SemanticInfo>) -> Self {
        self.semantic_info = Some(info);
        self
    }

    /// Replace the standard builtin functions.
    #[must_use]
    pub fn builtins(mut self, builtins: Rc<dyn BuiltinRegistry>) -> Self {
        self.builtins = Some(builtins);
        self
    }

    /// Share a host function registry with the interpreter.
    #[must_use]
    pub fn externals(mut self, externals: SharedMutableRegistry<ExternalRegistry>) -> Self {
        self.externals = Some(externals);
        self
    }

    /// Longest implicit conversion chain applied to one value.
    #[must_use]
    pub fn max_conversion_chain_depth(mut self, depth: usize) -> Self {
        self.max_conversion_chain_depth = depth;
        self
    }

    /// Build the interpreter and declare the standard classes.
    pub fn build(self) -> Result<Interpreter, EvalError> {
        let print_handler = self.print_handler.unwrap_or_else(|| {
            if self.mode.allows_io() {
                stdout_handler()
            } else {
                buffer_handler()
            }
        });
        let max_depth = self
            .max_recursion_depth
            .unwrap_or_else(|| self.mode.max_recursion_depth());

        let mut interpreter = Interpreter {
            env: Environment::new(),
            types: TypeRegistry::new(),
            functions: FxHashMap::default(),
            semantic: self.semantic_info,
            builtins: self
                .builtins
                .unwrap_or_else(|| Rc::new(StandardBuiltins::new())),
            externals: self.externals.unwrap_or_default(),
            mode: self.mode,
            call_stack: CallStack::new(max_depth),
            print_handler,
            exceptions: ExceptionState::new(),
            context: CallContext::default(),
            current_pos: Position::DUMMY,
            max_conversion_depth: self.max_conversion_chain_depth,
            names: KnownNames::new(),
        };
        interpreter.declare_standard_classes()?;
        Ok(interpreter)
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
