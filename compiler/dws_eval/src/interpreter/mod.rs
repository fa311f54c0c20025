//! Tree-walking interpreter for DWScript programs.
//!
//! # Architecture
//!
//! `Interpreter` owns every piece of runtime state: the environment, the
//! type registry, global routines, the call stack and the script exception
//! state. Evaluation is split by concern:
//!
//! - `declarations` - classes, records, interfaces, enums, routines,
//!   operators and constants; the standard exception hierarchy
//! - `expr` - identifiers, members, `is`/`as`/`implements`, lambdas
//! - `index` - `a[i]`, multi-index properties and default properties
//! - `array_literal` - `[...]` construction and element type inference
//! - `operators` - overload resolution in front of the built-in operators
//! - `conversion` - assignment coercion and implicit conversion chains
//! - `assign` - writes to variables, fields, properties and elements
//! - `stmt` - statements and loops
//! - `exceptions` - `raise` and `try`/`except`/`finally`
//! - `function_call` - the call core shared by routines, methods and lambdas
//! - `method_dispatch` - receivers, virtual dispatch, constructors, `inherited`
//! - `properties` - property getters and setters
//! - `standard_classes` - `TObject` and the built-in exception classes
//!
//! # Two failure channels
//!
//! Internal errors (`EvalError`) travel through `Err` and abort evaluation.
//! Script exceptions are state: once one is pending, `eval_expr` returns
//! `Nil` without evaluating and every statement list stops after the
//! current statement, until a `try` statement takes the exception.

mod array_literal;
mod assign;
mod builder;
mod conversion;
mod declarations;
mod exceptions;
mod expr;
mod function_call;
mod index;
mod interned_names;
mod method_dispatch;
mod operators;
mod properties;
mod scope_guard;
pub mod standard_classes;
mod stmt;

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use interned_names::KnownNames;

use std::rc::Rc;

use rustc_hash::FxHashMap;

use dws_ir::ast::{Expr, FunctionDecl, Program, Stmt};
use dws_ir::{Name, Position, SemanticInfo};

use crate::builtins::BuiltinRegistry;
use crate::diagnostics::CallStack;
use crate::errors::{EvalError, EvalResult, RunError};
use crate::eval_mode::EvalMode;
use crate::exec::ExceptionState;
use crate::ffi::ExternalRegistry;
use crate::print_handler::SharedPrintHandler;
use crate::types::{RuntimeType, TypeRegistry};
use crate::value::{ExceptionValue, Value};
use crate::{Environment, SharedMutableRegistry};

/// The routine whose body is executing.
#[derive(Clone, Default)]
pub(crate) struct CallContext {
    /// `None` for the main block and lambdas.
    pub(crate) routine: Option<Rc<FunctionDecl>>,
    /// Class or record declaring the routine, for `inherited`.
    pub(crate) owner: Option<Name>,
}

/// Tree-walking interpreter for DWScript.
///
/// Create one with [`InterpreterBuilder`], feed it a [`Program`] with
/// [`run`](Self::run), or load declarations and evaluate pieces with
/// [`load`](Self::load), [`eval`](Self::eval) and [`exec`](Self::exec).
pub struct Interpreter {
    pub(crate) env: Environment,
    pub(crate) types: TypeRegistry,
    /// Global routines by name; overloads share a name.
    pub(crate) functions: FxHashMap<Name, Vec<Rc<FunctionDecl>>>,
    /// Resolved types from the semantic pass, when the host has them.
    pub(crate) semantic: Option<Rc<dyn SemanticInfo>>,
    pub(crate) builtins: Rc<dyn BuiltinRegistry>,
    /// Host functions. Shared so hosts can keep registering after build.
    pub(crate) externals: SharedMutableRegistry<ExternalRegistry>,
    pub(crate) mode: EvalMode,
    /// Live call stack for recursion limiting and backtraces.
    pub(crate) call_stack: CallStack,
    pub(crate) print_handler: SharedPrintHandler,
    pub(crate) exceptions: ExceptionState,
    pub(crate) context: CallContext,
    /// Position of the statement or call being evaluated.
    pub(crate) current_pos: Position,
    pub(crate) max_conversion_depth: usize,
    pub(crate) names: KnownNames,
}

impl Interpreter {
    /// Load a program's declarations, run its main block, and report an
    /// exception that escaped it.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, program: &Program) -> Result<(), RunError> {
        self.load(program)?;
        let outcome = self.exec_block(&program.main);
        self.finish(outcome.map(|_| ()))
    }

    /// Register a program's declarations without running its main block.
    pub fn load(&mut self, program: &Program) -> Result<(), RunError> {
        for decl in &program.decls {
            self.declare(decl)
                .map_err(|e| self.call_stack.attach_backtrace(e))?;
        }
        self.finish(Ok(()))
    }

    /// Evaluate a single expression in the global scope.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value, RunError> {
        let value = self.eval_expr(expr);
        let value = self.finish(value)?;
        Ok(value)
    }

    /// Execute a single statement in the global scope.
    pub fn exec(&mut self, stmt: &Stmt) -> Result<(), RunError> {
        let outcome = self.exec_stmt(stmt);
        self.finish(outcome.map(|_| ()))
    }

    /// Turn an evaluation outcome into the host-facing result: an internal
    /// error, or the exception left pending at top level.
    fn finish<T>(&mut self, outcome: Result<T, EvalError>) -> Result<T, RunError> {
        let value = outcome.map_err(|e| RunError::Internal(self.call_stack.attach_backtrace(e)))?;
        match self.exceptions.take() {
            Some(exception) => Err(RunError::uncaught(exception)),
            None => Ok(value),
        }
    }

    /// Call a function pointer or other callable value.
    ///
    /// Used by evaluator-aware builtins and host callbacks. A script
    /// exception raised by the callee stays pending; check
    /// [`exception_pending`](Self::exception_pending).
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult {
        let pos = self.current_pos;
        self.call_function_value(callee, args, pos)
            .map(|outcome| outcome.result)
    }

    /// Current value of a variable visible from the innermost scope.
    pub fn lookup_variable(&self, name: &str) -> Option<Value> {
        self.env.lookup(&Name::new(name))
    }

    #[inline]
    pub fn exception_pending(&self) -> bool {
        self.exceptions.is_pending()
    }

    pub fn pending_exception(&self) -> Option<&ExceptionValue> {
        self.exceptions.active()
    }

    /// Stop propagation of the pending exception and return it.
    pub fn take_exception(&mut self) -> Option<ExceptionValue> {
        self.exceptions.take()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn mode(&self) -> EvalMode {
        self.mode
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.depth()
    }

    /// Host function registry; registrations are visible immediately.
    pub fn externals(&self) -> SharedMutableRegistry<ExternalRegistry> {
        self.externals.clone()
    }

    /// Evaluate a sub-expression; `None` when it left an exception pending.
    #[inline]
    pub(crate) fn eval_checked(&mut self, expr: &Expr) -> Result<Option<Value>, EvalError> {
        let value = self.eval_expr(expr)?;
        Ok((!self.exceptions.is_pending()).then_some(value))
    }

    /// Evaluate arguments left to right; `None` when one raised.
    pub(crate) fn eval_args(&mut self, args: &[Expr]) -> Result<Option<Vec<Value>>, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            match self.eval_checked(arg)? {
                Some(value) => values.push(value),
                None => return Ok(None),
            }
        }
        Ok(Some(values))
    }

    /// Type the semantic pass recorded for `expr`, if any.
    pub(crate) fn semantic_type(&self, expr: &Expr) -> Option<RuntimeType> {
        let ty = self.semantic.as_ref()?.type_of(expr.id)?;
        self.types.resolve(ty).ok()
    }

    /// `Self` in the current routine.
    pub(crate) fn self_value(&self) -> Option<Value> {
        self.env.lookup(&self.names.self_)
    }
}
