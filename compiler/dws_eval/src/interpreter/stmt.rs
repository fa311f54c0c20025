//! Statement execution.
//!
//! Every statement list checks for a pending script exception after each
//! statement and stops early; loops check after the condition and after
//! the body.

use std::rc::Rc;

use dws_ir::ast::{Block, CaseBranch, Expr, ExprKind, ForDirection, Stmt, StmtKind};
use dws_ir::{Name, TypeExpr};
use dws_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::environment::Mutability;
use crate::errors::{type_mismatch, EvalError};
use crate::exec::{ControlAction, ExecResult};
use crate::operators::values_equal;
use crate::types::{EnumType, RuntimeType};
use crate::value::{unwrap_json, EnumValue, Value};

/// How a loop body's action affects the loop.
enum LoopFlow {
    Next,
    Stop,
    Leave(ControlAction),
}

impl LoopFlow {
    fn of(action: ControlAction) -> Self {
        match action {
            ControlAction::Normal | ControlAction::Continue => LoopFlow::Next,
            ControlAction::Break => LoopFlow::Stop,
            ControlAction::Exit => LoopFlow::Leave(ControlAction::Exit),
        }
    }
}

impl Interpreter {
    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        if self.exceptions.is_pending() {
            return Ok(ControlAction::Normal);
        }
        self.current_pos = stmt.pos;
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt)).map_err(|e| e.at(stmt.pos))
    }

    /// Run statements in the current scope.
    pub(crate) fn exec_block(&mut self, block: &Block) -> ExecResult {
        for stmt in &block.stmts {
            let action = self.exec_stmt(stmt)?;
            if self.exceptions.is_pending() {
                return Ok(ControlAction::Normal);
            }
            if !action.is_normal() {
                return Ok(action);
            }
        }
        Ok(ControlAction::Normal)
    }

    /// Run statements in a fresh block scope.
    pub(crate) fn exec_scoped_block(&mut self, block: &Block) -> ExecResult {
        self.with_env_scope(|scoped| scoped.exec_block(block))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> ExecResult {
        match &stmt.kind {
            StmtKind::Var { names, ty, init } => {
                self.exec_var(names, ty.as_ref(), init.as_ref())?;
                Ok(ControlAction::Normal)
            }
            StmtKind::Assign { target, value } => {
                let expected = match &target.kind {
                    ExprKind::Ident(name) => self.env.declared_type(name),
                    _ => None,
                };
                let Some(value) = self.eval_expected_checked(value, expected.as_ref())? else {
                    return Ok(ControlAction::Normal);
                };
                self.assign_to(target, value)?;
                Ok(ControlAction::Normal)
            }
            StmtKind::CompoundAssign { op, target, value } => {
                let Some(current) = self.eval_checked(target)? else {
                    return Ok(ControlAction::Normal);
                };
                let Some(operand) = self.eval_checked(value)? else {
                    return Ok(ControlAction::Normal);
                };
                let result = self.binary_values(*op, current, operand, stmt.pos)?;
                if !self.exceptions.is_pending() {
                    self.assign_to(target, result)?;
                }
                Ok(ControlAction::Normal)
            }
            StmtKind::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(ControlAction::Normal)
            }
            StmtKind::Block(block) => self.exec_scoped_block(block),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let Some(taken) = self.eval_condition(cond)? else {
                    return Ok(ControlAction::Normal);
                };
                match (taken, else_branch) {
                    (true, _) => self.exec_stmt(then_branch),
                    (false, Some(otherwise)) => self.exec_stmt(otherwise),
                    (false, None) => Ok(ControlAction::Normal),
                }
            }
            StmtKind::While { cond, body } => self.exec_while(cond, body),
            StmtKind::Repeat { body, until } => self.exec_repeat(body, until),
            StmtKind::For {
                var,
                start,
                end,
                direction,
                body,
            } => self.exec_for(var, start, end, *direction, body),
            StmtKind::ForIn {
                var,
                collection,
                body,
            } => self.exec_for_in(var, collection, body),
            StmtKind::Case {
                selector,
                branches,
                else_branch,
            } => self.exec_case(selector, branches, else_branch.as_ref()),
            StmtKind::Break => Ok(ControlAction::Break),
            StmtKind::Continue => Ok(ControlAction::Continue),
            StmtKind::Exit(value) => {
                if let Some(value) = value {
                    let result = self.names.result.clone();
                    let expected = self.env.declared_type(&result);
                    let Some(value) = self.eval_expected_checked(value, expected.as_ref())? else {
                        return Ok(ControlAction::Normal);
                    };
                    self.assign_variable(&result, value)?;
                }
                Ok(ControlAction::Exit)
            }
            StmtKind::Try(try_stmt) => self.exec_try(try_stmt),
            StmtKind::Raise(value) => self.exec_raise(value.as_ref(), stmt.pos),
        }
    }

    fn eval_expected_checked(
        &mut self,
        expr: &Expr,
        expected: Option<&RuntimeType>,
    ) -> Result<Option<Value>, EvalError> {
        let value = self.eval_expected(expr, expected)?;
        Ok((!self.exceptions.is_pending()).then_some(value))
    }

    /// `var a, b: T := init;`. Without a type the slot takes the
    /// initializer's type; without either it is an unassigned Variant.
    fn exec_var(&mut self, names: &[Name], ty: Option<&TypeExpr>, init: Option<&Expr>) -> Result<(), EvalError> {
        let declared = ty.map(|t| self.types.resolve(t)).transpose()?;
        let initial = match init {
            Some(init) => {
                let Some(value) = self.eval_expected_checked(init, declared.as_ref())? else {
                    return Ok(());
                };
                Some(match &declared {
                    Some(t) => self.coerce(value, t)?,
                    None => value,
                })
            }
            None => None,
        };

        for name in names {
            let (value, slot_type) = match (&initial, &declared) {
                (Some(value), Some(t)) => (value.copy_for_assignment(), Some(t.clone())),
                (Some(value), None) => (value.copy_for_assignment(), self.runtime_type_of(value)),
                (None, Some(t)) => (self.types.zero_value(t), Some(t.clone())),
                (None, None) => (Value::unassigned(), Some(RuntimeType::Variant)),
            };
            self.env
                .define_typed(name.clone(), value, Mutability::Mutable, slot_type);
        }
        Ok(())
    }

    /// `None` when evaluating the condition raised.
    fn eval_condition(&mut self, cond: &Expr) -> Result<Option<bool>, EvalError> {
        let Some(value) = self.eval_checked(cond)? else {
            return Ok(None);
        };
        match value.is_truthy() {
            Some(b) => Ok(Some(b)),
            None => Err(type_mismatch("Boolean", &value.type_name())),
        }
    }

    fn run_loop_body(&mut self, body: &Stmt) -> Result<LoopFlow, EvalError> {
        let action = self.exec_stmt(body)?;
        if self.exceptions.is_pending() {
            return Ok(LoopFlow::Leave(ControlAction::Normal));
        }
        Ok(LoopFlow::of(action))
    }

    fn exec_while(&mut self, cond: &Expr, body: &Stmt) -> ExecResult {
        loop {
            match self.eval_condition(cond)? {
                Some(true) => {}
                Some(false) | None => return Ok(ControlAction::Normal),
            }
            match self.run_loop_body(body)? {
                LoopFlow::Next => {}
                LoopFlow::Stop => return Ok(ControlAction::Normal),
                LoopFlow::Leave(action) => return Ok(action),
            }
        }
    }

    /// `continue` still evaluates the `until` condition.
    fn exec_repeat(&mut self, body: &Block, until: &Expr) -> ExecResult {
        loop {
            let action = self.exec_block(body)?;
            if self.exceptions.is_pending() {
                return Ok(ControlAction::Normal);
            }
            match LoopFlow::of(action) {
                LoopFlow::Next => {}
                LoopFlow::Stop => return Ok(ControlAction::Normal),
                LoopFlow::Leave(action) => return Ok(action),
            }
            match self.eval_condition(until)? {
                Some(false) => {}
                Some(true) | None => return Ok(ControlAction::Normal),
            }
        }
    }

    /// Counting loop over integers or enum ordinals. Bounds are evaluated
    /// once; the counter never steps past `end`.
    fn exec_for(
        &mut self,
        var: &Name,
        start: &Expr,
        end: &Expr,
        direction: ForDirection,
        body: &Stmt,
    ) -> ExecResult {
        let Some(first) = self.eval_checked(start)? else {
            return Ok(ControlAction::Normal);
        };
        let Some(last) = self.eval_checked(end)? else {
            return Ok(ControlAction::Normal);
        };
        let first = first.unwrap_variant_or_json();
        let last = last.unwrap_variant_or_json();
        let enum_type = match &first {
            Value::Enum(e) => self.types.enum_type(&e.type_name),
            _ => None,
        };
        let (Some(from), Some(to)) = (first.as_ordinal(), last.as_ordinal()) else {
            let offending = if first.as_ordinal().is_none() { &first } else { &last };
            return Err(type_mismatch("ordinal", &offending.type_name()));
        };

        if self.env.lookup(var).is_none() {
            let slot_type = self.runtime_type_of(&first);
            self.env
                .define_typed(var.clone(), first.clone(), Mutability::Mutable, slot_type);
        }

        let mut i = from;
        loop {
            let in_range = match direction {
                ForDirection::To => i <= to,
                ForDirection::DownTo => i >= to,
            };
            if !in_range {
                return Ok(ControlAction::Normal);
            }
            if let Some(value) = counter_value(enum_type.as_ref(), i) {
                self.assign_variable(var, value)?;
                match self.run_loop_body(body)? {
                    LoopFlow::Next => {}
                    LoopFlow::Stop => return Ok(ControlAction::Normal),
                    LoopFlow::Leave(action) => return Ok(action),
                }
            }
            if i == to {
                return Ok(ControlAction::Normal);
            }
            let step = match direction {
                ForDirection::To => i.checked_add(1),
                ForDirection::DownTo => i.checked_sub(1),
            };
            match step {
                Some(next) => i = next,
                None => return Ok(ControlAction::Normal),
            }
        }
    }

    /// `for x in collection`: array elements, string characters, or the
    /// elements of a JSON array.
    fn exec_for_in(&mut self, var: &Name, collection: &Expr, body: &Stmt) -> ExecResult {
        let Some(collection) = self.eval_checked(collection)? else {
            return Ok(ControlAction::Normal);
        };
        let items: Vec<Value> = match collection.unwrap_variant() {
            Value::Array(array) => array.elements(),
            Value::String(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
            Value::Json(node) => match &*node {
                serde_json::Value::Array(items) => items.iter().map(unwrap_json).collect(),
                serde_json::Value::Object(map) => map.keys().map(Value::string).collect(),
                _ => Vec::new(),
            },
            other => return Err(type_mismatch("array", &other.type_name())),
        };

        let declared = self.env.lookup(var).is_some();
        self.with_env_scope(|scoped| {
            for item in items {
                let item = item.copy_for_assignment();
                if declared {
                    scoped.assign_variable(var, item)?;
                } else {
                    scoped.env.define(var.clone(), item, Mutability::Mutable);
                }
                match scoped.run_loop_body(body)? {
                    LoopFlow::Next => {}
                    LoopFlow::Stop => break,
                    LoopFlow::Leave(action) => return Ok(action),
                }
            }
            Ok(ControlAction::Normal)
        })
    }

    fn exec_case(&mut self, selector: &Expr, branches: &[CaseBranch], else_branch: Option<&Block>) -> ExecResult {
        let Some(selector) = self.eval_checked(selector)? else {
            return Ok(ControlAction::Normal);
        };
        let selector = selector.unwrap_variant_or_json();
        for branch in branches {
            for candidate in &branch.values {
                let Some(candidate) = self.eval_checked(candidate)? else {
                    return Ok(ControlAction::Normal);
                };
                if values_equal(&selector, &candidate.unwrap_variant_or_json()) {
                    return self.exec_stmt(&branch.body);
                }
            }
        }
        match else_branch {
            Some(block) => self.exec_block(block),
            None => Ok(ControlAction::Normal),
        }
    }
}

/// The loop counter's value at ordinal `i`; `None` for a gap in an
/// enumeration with explicit ordinals.
fn counter_value(enum_type: Option<&Rc<EnumType>>, i: i64) -> Option<Value> {
    let Some(enum_type) = enum_type else {
        return Some(Value::Integer(i));
    };
    enum_type.element_by_ordinal(i).map(|element| {
        Value::Enum(EnumValue {
            type_name: enum_type.name.clone(),
            element: element.clone(),
            ordinal: i,
        })
    })
}
