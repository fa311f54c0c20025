//! The call core shared by routines, methods, lambdas and operators.
//!
//! Every script-level call goes through [`Interpreter::invoke`]:
//!
//! 1. check the argument count and push a call frame
//! 2. swap in a fresh environment frame whose parent is the callee's
//!    defining scope (the globals, or a lambda's captured scope)
//! 3. bind `Self`, the parameters (coerced to their types) and `Result`
//! 4. run the body
//! 5. restore the caller's environment and context, pop the frame
//!
//! `var` parameters are copied in and copied back: the callee's final
//! values come back in [`CallOutcome::out_args`] and the caller writes
//! them to its argument expressions.

use std::rc::Rc;

use dws_ir::ast::{Block, Expr, ExprKind, FunctionDecl, Param, ParamMode};
use dws_ir::{Name, Position, TypeExpr};
use dws_stack::ensure_sufficient_stack;

use super::standard_classes::ESTACK_OVERFLOW;
use super::{CallContext, Interpreter};
use crate::builtins::{Builtin, BuiltinError};
use crate::diagnostics::CallFrame;
use crate::environment::{LocalScope, Mutability, Scope};
use crate::errors::{arity_mismatch, not_callable, undefined_function, EvalError, EvalResult};
use crate::types::RuntimeType;
use crate::value::{Closure, FunctionPointer, Value};

/// What a call produced.
pub(crate) struct CallOutcome {
    pub(crate) result: Value,
    /// Final parameter values, in declaration order.
    pub(crate) out_args: Vec<Value>,
}

impl CallOutcome {
    /// A call without parameters to copy back.
    pub(crate) fn value(result: Value) -> Self {
        CallOutcome {
            result,
            out_args: Vec::new(),
        }
    }
}

/// Everything [`Interpreter::invoke`] needs to run a body.
pub(crate) struct Invocation<'d> {
    pub(crate) frame_name: Name,
    pub(crate) params: &'d [Param],
    pub(crate) return_type: Option<&'d TypeExpr>,
    pub(crate) body: &'d Block,
    /// Parent of the callee's frame.
    pub(crate) scope: LocalScope<Scope>,
    pub(crate) self_value: Option<Value>,
    pub(crate) context: CallContext,
}

impl Interpreter {
    /// Evaluate `callee(args)`.
    pub(crate) fn eval_call(&mut self, callee: &Expr, args: &[Expr], pos: Position) -> EvalResult {
        self.current_pos = pos;
        match &callee.kind {
            ExprKind::Ident(name) => self.call_named(name, args, pos),
            ExprKind::Member { object, member } => self.call_member(object, member, args, pos),
            ExprKind::Inherited { method, args: _ } => self.eval_inherited(method.as_ref(), args, pos),
            _ => {
                let Some(target) = self.eval_checked(callee)? else {
                    return Ok(Value::Nil);
                };
                let Some(values) = self.eval_args(args)? else {
                    return Ok(Value::Nil);
                };
                self.call_function_value(&target, values, pos)
                    .map(|outcome| outcome.result)
            }
        }
    }

    /// Call by bare name. Resolution order: a variable holding a function
    /// pointer, a method of `Self`, a declared routine, a builtin, a host
    /// function.
    pub(crate) fn call_named(&mut self, name: &Name, arg_exprs: &[Expr], pos: Position) -> EvalResult {
        if let Some(value) = self.env.lookup(name) {
            let Some(args) = self.eval_args(arg_exprs)? else {
                return Ok(Value::Nil);
            };
            return self
                .call_function_value(&value, args, pos)
                .map(|outcome| outcome.result);
        }

        if let Some(receiver) = self.self_value() {
            if let Some(result) = self.call_self_method(receiver, name, arg_exprs, pos)? {
                return Ok(result);
            }
        }

        if let Some(candidates) = self.functions.get(name).cloned() {
            let Some(args) = self.eval_args(arg_exprs)? else {
                return Ok(Value::Nil);
            };
            let Some(decl) = self.select_routine(&candidates, &args) else {
                let expected = candidates.first().map_or(0, |d| d.params.len());
                return Err(arity_mismatch(name.as_str(), expected, args.len()));
            };
            let outcome = self.call_routine(&decl, args, pos)?;
            return self.finish_call(&decl.params, arg_exprs, outcome);
        }

        if self.builtins.lookup(name).is_some() {
            let Some(args) = self.eval_args(arg_exprs)? else {
                return Ok(Value::Nil);
            };
            return self.call_builtin(name, args, pos);
        }

        if self.externals.read().contains(name) {
            let Some(args) = self.eval_args(arg_exprs)? else {
                return Ok(Value::Nil);
            };
            return self.call_external(name, args, pos);
        }

        Err(undefined_function(name.as_str()))
    }

    /// Call a routine, builtin or host function by name with evaluated
    /// arguments. Used by operator overloads and conversions.
    pub(crate) fn call_global(&mut self, name: &Name, args: Vec<Value>, pos: Position) -> EvalResult {
        if let Some(candidates) = self.functions.get(name).cloned() {
            let Some(decl) = self.select_routine(&candidates, &args) else {
                let expected = candidates.first().map_or(0, |d| d.params.len());
                return Err(arity_mismatch(name.as_str(), expected, args.len()));
            };
            return self.call_routine(&decl, args, pos).map(|o| o.result);
        }
        if self.builtins.lookup(name).is_some() {
            return self.call_builtin(name, args, pos);
        }
        if self.externals.read().contains(name) {
            return self.call_external(name, args, pos);
        }
        Err(undefined_function(name.as_str()))
    }

    /// Pick the overload for `args`: matching arity, then the first whose
    /// parameter types accept the arguments.
    fn select_routine(&self, candidates: &[Rc<FunctionDecl>], args: &[Value]) -> Option<Rc<FunctionDecl>> {
        let mut same_arity = candidates.iter().filter(|d| d.params.len() == args.len());
        let first = same_arity.next()?;
        let best = std::iter::once(first)
            .chain(same_arity)
            .find(|d| self.params_accept(&d.params, args))
            .unwrap_or(first);
        Some(Rc::clone(best))
    }

    fn params_accept(&self, params: &[Param], args: &[Value]) -> bool {
        params.iter().zip(args).all(|(param, arg)| {
            let Some(ty) = &param.ty else {
                return true;
            };
            match self.types.resolve(ty) {
                Ok(ty) => {
                    self.types.is_assignable(arg, &ty)
                        || matches!((arg, &ty), (Value::Integer(_), RuntimeType::Float))
                }
                Err(_) => false,
            }
        })
    }

    /// Call a callable value: a function pointer, bound method or lambda.
    pub(crate) fn call_function_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        pos: Position,
    ) -> Result<CallOutcome, EvalError> {
        match callee {
            Value::Function(FunctionPointer::Routine(decl)) => self.call_routine(decl, args, pos),
            Value::Function(FunctionPointer::Method { method, receiver }) => {
                self.call_method(method, Some((**receiver).clone()), args, pos)
            }
            Value::Function(FunctionPointer::Lambda(closure)) => self.call_lambda(closure, args, pos),
            Value::Function(FunctionPointer::Builtin(name)) => {
                self.call_builtin(name, args, pos).map(CallOutcome::value)
            }
            Value::Function(FunctionPointer::External(name)) => {
                self.call_external(name, args, pos).map(CallOutcome::value)
            }
            Value::Variant(_) => {
                let inner = callee.clone().unwrap_variant();
                self.call_function_value(&inner, args, pos)
            }
            other => Err(not_callable(&other.type_name())),
        }
    }

    pub(crate) fn call_routine(
        &mut self,
        decl: &Rc<FunctionDecl>,
        args: Vec<Value>,
        pos: Position,
    ) -> Result<CallOutcome, EvalError> {
        let Some(body) = &decl.body else {
            return Err(EvalError::new(format!("routine '{}' has no body", decl.name)));
        };
        let invocation = Invocation {
            frame_name: decl.name.clone(),
            params: &decl.params,
            return_type: decl.return_type.as_ref(),
            body,
            scope: self.env.global(),
            self_value: None,
            context: CallContext {
                routine: Some(Rc::clone(decl)),
                owner: None,
            },
        };
        self.invoke(invocation, args, pos)
    }

    fn call_lambda(&mut self, closure: &Rc<Closure>, args: Vec<Value>, pos: Position) -> Result<CallOutcome, EvalError> {
        let invocation = Invocation {
            frame_name: Name::new("<lambda>"),
            params: &closure.decl.params,
            return_type: closure.decl.return_type.as_ref(),
            body: &closure.decl.body,
            scope: closure.scope.clone(),
            self_value: None,
            context: CallContext::default(),
        };
        self.invoke(invocation, args, pos)
    }

    pub(crate) fn call_builtin(&mut self, name: &Name, args: Vec<Value>, pos: Position) -> EvalResult {
        let Some(builtin) = self.builtins.lookup(name) else {
            return Err(undefined_function(name.as_str()));
        };
        self.current_pos = pos;
        match builtin {
            Builtin::Direct(f) => match f(&args) {
                Ok(value) => Ok(value),
                Err(BuiltinError::Eval(err)) => Err(err),
                Err(BuiltinError::Raise {
                    class_name,
                    message,
                }) => {
                    self.raise_standard(class_name, message, pos)?;
                    Ok(Value::Nil)
                }
            },
            Builtin::Evaluator(f) => f(self, args),
        }
    }

    /// Run a body. See the module docs for the steps.
    #[tracing::instrument(level = "debug", skip_all, fields(routine = %invocation.frame_name))]
    pub(crate) fn invoke(
        &mut self,
        invocation: Invocation<'_>,
        args: Vec<Value>,
        pos: Position,
    ) -> Result<CallOutcome, EvalError> {
        if args.len() != invocation.params.len() {
            return Err(arity_mismatch(
                invocation.frame_name.as_str(),
                invocation.params.len(),
                args.len(),
            ));
        }
        if let Err(overflow) = self
            .call_stack
            .push(CallFrame::new(invocation.frame_name.clone(), pos))
        {
            self.raise_standard(ESTACK_OVERFLOW, overflow.message, pos)?;
            return Ok(CallOutcome::value(Value::Nil));
        }

        let saved_scopes = self.env.enter(invocation.scope.clone());
        let saved_context = std::mem::replace(&mut self.context, invocation.context.clone());
        let outcome = self
            .run_body(&invocation, args)
            .map_err(|e| self.call_stack.attach_backtrace(e));
        self.env.restore(saved_scopes);
        self.context = saved_context;
        self.call_stack.pop();
        outcome
    }

    fn run_body(&mut self, invocation: &Invocation<'_>, args: Vec<Value>) -> Result<CallOutcome, EvalError> {
        if let Some(receiver) = &invocation.self_value {
            self.env
                .define(self.names.self_.clone(), receiver.clone(), Mutability::Immutable);
        }
        for (param, arg) in invocation.params.iter().zip(args) {
            let ty = param
                .ty
                .as_ref()
                .map(|t| self.types.resolve(t))
                .transpose()?;
            let value = match &ty {
                Some(t) => self.coerce(arg, t)?,
                None => arg,
            };
            let mutability = if param.mode == ParamMode::Const {
                Mutability::Immutable
            } else {
                Mutability::Mutable
            };
            self.env
                .define_typed(param.name.clone(), value.copy_for_assignment(), mutability, ty);
        }
        let result_type = invocation
            .return_type
            .map(|t| self.types.resolve(t))
            .transpose()?;
        if let Some(ty) = &result_type {
            let zero = self.types.zero_value(ty);
            self.env
                .define_typed(self.names.result.clone(), zero, Mutability::Mutable, Some(ty.clone()));
        }

        if !self.exceptions.is_pending() {
            ensure_sufficient_stack(|| self.exec_block(invocation.body))?;
        }

        let out_args = invocation
            .params
            .iter()
            .map(|p| self.env.lookup(&p.name).unwrap_or(Value::Nil))
            .collect();
        let result = match result_type {
            Some(_) if !self.exceptions.is_pending() => self
                .env
                .lookup(&self.names.result)
                .unwrap_or(Value::Nil),
            _ => Value::Nil,
        };
        Ok(CallOutcome { result, out_args })
    }

    /// Copy `var` parameters back to the caller's argument expressions.
    pub(crate) fn finish_call(&mut self, params: &[Param], arg_exprs: &[Expr], outcome: CallOutcome) -> EvalResult {
        if self.exceptions.is_pending() {
            return Ok(Value::Nil);
        }
        for ((param, target), value) in params.iter().zip(arg_exprs).zip(outcome.out_args) {
            if param.mode == ParamMode::Var {
                self.assign_to(target, value)?;
            }
        }
        Ok(outcome.result)
    }
}
