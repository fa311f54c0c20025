//! Built-in routines available to every script.
//!
//! Builtins come in two shapes. [`Builtin::Direct`] functions see only
//! their arguments; [`Builtin::Evaluator`] functions get the interpreter
//! too, for output or for calling back into script code (`Map`,
//! `Filter`, ...).
//!
//! Hosts can replace the whole set through
//! [`InterpreterBuilder::builtins`](crate::InterpreterBuilder::builtins).

mod core;
mod higher_order;
mod json;

use rustc_hash::FxHashMap;

use dws_ir::Name;

use crate::errors::{arity_mismatch, EvalError, EvalResult};
use crate::value::Value;
use crate::Interpreter;

/// A failure inside a direct builtin.
#[derive(Debug)]
pub enum BuiltinError {
    /// Internal error; aborts evaluation.
    Eval(EvalError),
    /// Raise a standard script exception, e.g. `EConvertError`.
    Raise {
        class_name: &'static str,
        message: String,
    },
}

impl From<EvalError> for BuiltinError {
    fn from(err: EvalError) -> Self {
        BuiltinError::Eval(err)
    }
}

#[derive(Clone, Copy)]
pub enum Builtin {
    Direct(fn(&[Value]) -> Result<Value, BuiltinError>),
    Evaluator(fn(&mut Interpreter, Vec<Value>) -> EvalResult),
}

/// Name lookup for builtins.
pub trait BuiltinRegistry {
    fn lookup(&self, name: &Name) -> Option<Builtin>;
}

/// The standard library: output, conversions, array helpers, assertions,
/// higher-order functions and JSON.
pub struct StandardBuiltins {
    entries: FxHashMap<Name, Builtin>,
}

impl StandardBuiltins {
    pub fn new() -> Self {
        let mut entries = FxHashMap::default();
        let mut add = |name: &str, builtin: Builtin| {
            entries.insert(Name::new(name), builtin);
        };
        core::register(&mut add);
        higher_order::register(&mut add);
        json::register(&mut add);
        StandardBuiltins { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StandardBuiltins {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinRegistry for StandardBuiltins {
    fn lookup(&self, name: &Name) -> Option<Builtin> {
        self.entries.get(name).copied()
    }
}

/// Fail unless exactly `expected` arguments were passed.
fn expect_args(name: &str, args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(arity_mismatch(name, expected, args.len()))
    }
}
