//! DWS Eval - runtime evaluator for DWScript programs.
//!
//! This crate walks an already parsed and type-checked [`dws_ir::ast::Program`]
//! and executes it.
//!
//! # Architecture
//!
//! - `Value`: tagged runtime values; arrays, records and objects are shared
//!   cells, static arrays and records are copied on assignment
//! - `TypeRegistry`: classes (with virtual method tables), records,
//!   interfaces, enums, operator overloads and implicit conversions
//! - `Environment`: scope chain; routine calls swap in a fresh frame whose
//!   parent is the callee's defining scope
//! - `evaluate_binary` / `evaluate_unary`: built-in operators over plain
//!   values, behind user operator overload resolution
//! - `ExceptionState`: the pending script exception and the active handler
//!   and finally frames
//! - `BuiltinRegistry` and `ExternalRegistry`: standard library and host
//!   functions
//!
//! # Errors
//!
//! [`EvalError`] is an internal failure and aborts evaluation. A script
//! exception is interpreter state, surfaced to the host as
//! [`RunError::Uncaught`] only when it escapes the program.

mod builtins;
mod diagnostics;
mod environment;
pub mod errors;
mod eval_mode;
pub mod exec;
mod ffi;
mod interpreter;
mod operators;
mod print_handler;
mod shared;
pub mod types;
mod unary_operators;
pub mod value;

pub use builtins::{Builtin, BuiltinError, BuiltinRegistry, StandardBuiltins};
pub use diagnostics::{CallFrame, CallStack};
pub use environment::{Environment, LocalScope, Mutability, Scope};
pub use errors::{EvalBacktrace, EvalError, EvalErrorKind, EvalResult, RunError};
pub use eval_mode::EvalMode;
pub use exec::{ControlAction, ExecResult};
pub use ffi::{ExternalFunction, ExternalRegistry, HostCall, HostError};
pub use interpreter::{standard_classes, Interpreter, InterpreterBuilder, ScopedInterpreter};
pub use operators::{evaluate_binary, values_equal};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler,
};
pub use shared::SharedMutableRegistry;
pub use unary_operators::evaluate_unary;
pub use value::Value;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=dws_eval=debug` or
/// `RUST_LOG=dws_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let installed = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
            if installed.is_err() {
                tracing::debug!("a global tracing subscriber was already installed");
            }
        }
    });
}

#[cfg(test)]
mod tests;
