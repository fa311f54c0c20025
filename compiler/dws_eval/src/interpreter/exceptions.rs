//! `raise` and `try`/`except`/`finally`.
//!
//! A handler runs with its exception parked in a `Handler` frame, so a bare
//! `raise` and `ExceptObject` can find it; a finally block parks the
//! in-flight exception in a `Finally` frame and restores it afterwards
//! unless the block raised a new one.

use dws_ir::ast::{Block, ExceptClause, Expr, TryStmt};
use dws_ir::{Name, Position};

use super::standard_classes::EHOST;
use super::Interpreter;
use crate::environment::Mutability;
use crate::errors::{bare_raise_without_exception, raise_non_object, undefined_type, EvalError};
use crate::exec::{ControlAction, ExecResult, FrameKind};
use crate::value::{ExceptionValue, ObjectRef, Value};

impl Interpreter {
    pub(crate) fn exec_try(&mut self, stmt: &TryStmt) -> ExecResult {
        let mut action = self.exec_scoped_block(&stmt.body)?;
        if let Some(clause) = &stmt.except {
            if self.exceptions.is_pending() {
                action = self.handle_exception(clause)?;
            }
        }
        if let Some(finally) = &stmt.finally {
            action = self.run_finally(finally, action)?;
        }
        Ok(action)
    }

    /// Take the pending exception and run the first matching handler.
    /// Without a match the exception goes back to pending.
    fn handle_exception(&mut self, clause: &ExceptClause) -> ExecResult {
        let Some(exception) = self.exceptions.take() else {
            return Ok(ControlAction::Normal);
        };

        for handler in &clause.handlers {
            if let Some(class_name) = &handler.class_name {
                if self.types.class(class_name).is_none() {
                    self.exceptions.restore(Some(exception));
                    return Err(undefined_type(class_name.as_str()));
                }
                if !exception.is_instance_of(class_name) {
                    continue;
                }
            }
            tracing::debug!(class = %exception.class_name(), "exception handled");
            let instance = Value::Object(exception.instance.clone());
            self.exceptions.push_frame(FrameKind::Handler, Some(exception));
            let outcome = match &handler.variable {
                Some(var) => self.with_binding(var.clone(), instance, Mutability::Mutable, |scoped| {
                    scoped.exec_stmt(&handler.body)
                }),
                None => self.exec_stmt(&handler.body),
            };
            self.exceptions.pop_frame();
            return outcome;
        }

        if clause.handlers.is_empty() || clause.else_block.is_some() {
            self.exceptions.push_frame(FrameKind::Handler, Some(exception));
            let outcome = match &clause.else_block {
                Some(block) => self.exec_scoped_block(block),
                None => Ok(ControlAction::Normal),
            };
            self.exceptions.pop_frame();
            return outcome;
        }

        self.exceptions.restore(Some(exception));
        Ok(ControlAction::Normal)
    }

    /// Run a finally block with the in-flight exception parked. An
    /// exception raised inside replaces it; a `break`, `continue` or `exit`
    /// inside overrides the protected block's action.
    fn run_finally(&mut self, block: &Block, action: ControlAction) -> ExecResult {
        let saved = self.exceptions.take();
        self.exceptions.push_frame(FrameKind::Finally, saved.clone());
        let outcome = self.exec_scoped_block(block);
        self.exceptions.pop_frame();
        let finally_action = outcome?;
        if self.exceptions.is_pending() {
            return Ok(ControlAction::Normal);
        }
        self.exceptions.restore(saved);
        Ok(if finally_action.is_normal() {
            action
        } else {
            finally_action
        })
    }

    /// `raise E;` or a bare `raise;`.
    pub(crate) fn exec_raise(&mut self, value: Option<&Expr>, pos: Position) -> ExecResult {
        let Some(value) = value else {
            let Some(target) = self.exceptions.reraise_target().cloned() else {
                return Err(bare_raise_without_exception());
            };
            tracing::debug!(class = %target.class_name(), "re-raise");
            self.exceptions.raise(target);
            return Ok(ControlAction::Normal);
        };

        let Some(value) = self.eval_checked(value)? else {
            return Ok(ControlAction::Normal);
        };
        let instance = match value.unwrap_variant() {
            Value::Object(object) => object,
            Value::Interface(reference) => reference.object,
            other => return Err(raise_non_object(&other.type_name())),
        };
        self.raise_object(instance, pos);
        Ok(ControlAction::Normal)
    }

    /// Make `instance` the pending exception, capturing its message and the
    /// call stack.
    pub(crate) fn raise_object(&mut self, instance: ObjectRef, pos: Position) {
        let message = match instance.get_field(&self.names.message) {
            Some(Value::Nil) | None => String::new(),
            Some(Value::String(s)) => s.to_string(),
            Some(other) => other.to_string(),
        };
        let class = instance.class();
        tracing::debug!(class = %class.name, %message, "raise");
        self.exceptions.raise(ExceptionValue {
            class,
            instance,
            message,
            position: pos,
            call_stack: self.call_stack.capture(),
        });
    }

    /// A fresh instance of a standard exception class with `Message` set.
    pub(crate) fn standard_instance(&self, class_name: &str, message: impl Into<String>) -> Result<ObjectRef, EvalError> {
        let Some(class) = self.types.class(&Name::new(class_name)) else {
            return Err(undefined_type(class_name));
        };
        let fields = self.types.instance_fields(&class);
        let instance = ObjectRef::new(class, fields);
        instance.set_field(&self.names.message, Value::string(message.into()));
        Ok(instance)
    }

    /// Raise a standard exception, e.g. `EDivByZero`.
    pub(crate) fn raise_standard(
        &mut self,
        class_name: &str,
        message: impl Into<String>,
        pos: Position,
    ) -> Result<(), EvalError> {
        let instance = self.standard_instance(class_name, message)?;
        self.raise_object(instance, pos);
        Ok(())
    }

    /// Raise `EHost` for a failed host call, keeping the host's own error
    /// type name in `ExceptionClass`.
    pub(crate) fn raise_host(&mut self, type_name: &str, message: &str, pos: Position) -> Result<(), EvalError> {
        let instance = self.standard_instance(EHOST, message)?;
        instance.set_field(&self.names.exception_class, Value::string(type_name));
        self.raise_object(instance, pos);
        Ok(())
    }
}
