//! Host functions callable from scripts.
//!
//! Hosts register closures in an [`ExternalRegistry`]. A host function
//! receives a [`HostCall`] through which it can call back into script
//! function pointers, plus the evaluated arguments.
//!
//! Failures never unwind into the evaluator. A returned [`HostError`] and a
//! panic both become a pending `EHost` script exception; for a panic the
//! interpreter's environment, call stack and handler frames are first put
//! back the way they were before the call.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use dws_ir::{Name, Position};

use crate::diagnostics::CallFrame;
use crate::errors::{undefined_function, EvalResult};
use crate::interpreter::standard_classes::ESTACK_OVERFLOW;
use crate::value::Value;
use crate::Interpreter;

/// A host function.
pub type ExternalFunction =
    Arc<dyn Fn(&mut HostCall<'_>, &[Value]) -> Result<Value, HostError> + Send + Sync>;

/// A host function failure, surfaced to scripts as `EHost`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{type_name}: {message}")]
pub struct HostError {
    /// The host's own error type, stored in `EHost.ExceptionClass`.
    pub type_name: String,
    pub message: String,
}

impl HostError {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        HostError {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

/// Host functions by case-insensitive name.
#[derive(Clone, Default)]
pub struct ExternalRegistry {
    functions: FxHashMap<String, ExternalFunction>,
}

impl ExternalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`, replacing any earlier one.
    pub fn register<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&mut HostCall<'_>, &[Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        self.functions
            .insert(name.to_ascii_lowercase(), Arc::new(function));
    }

    pub fn get(&self, name: &Name) -> Option<ExternalFunction> {
        self.functions.get(&name.key()).cloned()
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.functions.contains_key(&name.key())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for ExternalRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("ExternalRegistry")
            .field("functions", &names)
            .finish()
    }
}

/// The interpreter as seen from inside a host function.
pub struct HostCall<'a> {
    interpreter: &'a mut Interpreter,
}

impl HostCall<'_> {
    /// Call a script function pointer or lambda.
    ///
    /// The interpreter's current position is preserved across the call. A
    /// script exception raised by the callee stays pending; check
    /// [`exception_pending`](Self::exception_pending).
    pub fn invoke(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, HostError> {
        let saved_pos = self.interpreter.current_pos;
        let outcome = self.interpreter.call_value(callee, args);
        self.interpreter.current_pos = saved_pos;
        outcome.map_err(|e| HostError::new("EvalError", e.message))
    }

    /// Write a line through the interpreter's print handler.
    pub fn println(&self, msg: &str) {
        self.interpreter.print_handler().println(msg);
    }

    pub fn exception_pending(&self) -> bool {
        self.interpreter.exception_pending()
    }
}

impl Interpreter {
    /// Call host function `name`.
    #[tracing::instrument(level = "debug", skip_all, fields(function = %name))]
    pub(crate) fn call_external(&mut self, name: &Name, args: Vec<Value>, pos: Position) -> EvalResult {
        let Some(function) = self.externals.read().get(name) else {
            return Err(undefined_function(name.as_str()));
        };
        if let Err(overflow) = self.call_stack.push(CallFrame::new(name.clone(), pos)) {
            self.raise_standard(ESTACK_OVERFLOW, overflow.message, pos)?;
            return Ok(Value::Nil);
        }

        let call_depth = self.call_stack.depth();
        let frame_depth = self.exceptions.frame_depth();
        let saved_scopes = self.env.enter(self.env.current_scope());
        let saved_context = self.context.clone();
        let saved_pos = self.current_pos;

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut call = HostCall { interpreter: self };
            function(&mut call, &args)
        }));

        self.env.restore(saved_scopes);
        self.context = saved_context;
        self.current_pos = saved_pos;
        self.call_stack.truncate(call_depth);
        self.call_stack.pop();
        self.exceptions.truncate_frames(frame_depth);

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                if !self.exceptions.is_pending() {
                    self.raise_host(&err.type_name, &err.message, pos)?;
                }
                Ok(Value::Nil)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(function = %name, panic = %message, "host function panicked");
                self.raise_host("panic", &format!("panic: {message}"), pos)?;
                Ok(Value::Nil)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests;
