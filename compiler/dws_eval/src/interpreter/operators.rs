//! Operator evaluation with overload resolution.
//!
//! Lookup order for an operator application:
//!
//! 1. the left operand's class or record operator table
//! 2. the right operand's
//! 3. the global operator table
//! 4. the built-in operators in [`crate::operators`]
//!
//! `and`/`or` on Booleans short-circuit before any of this.

use dws_ir::ast::Expr;
use dws_ir::{BinaryOp, Name, OperatorSymbol, Position, UnaryOp};

use super::Interpreter;
use crate::errors::{EvalError, EvalErrorKind, EvalResult};
use crate::operators::evaluate_binary;
use crate::types::OperatorEntry;
use crate::unary_operators::evaluate_unary;
use crate::value::Value;

use super::standard_classes::EDIV_BY_ZERO;

impl Interpreter {
    pub(crate) fn eval_binary_expr(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        pos: Position,
    ) -> EvalResult {
        let Some(lhs) = self.eval_checked(left)? else {
            return Ok(Value::Nil);
        };
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            match (op, lhs.clone().unwrap_variant()) {
                (BinaryOp::And, Value::Boolean(false)) => return Ok(Value::Boolean(false)),
                (BinaryOp::Or, Value::Boolean(true)) => return Ok(Value::Boolean(true)),
                _ => {}
            }
        }
        let Some(rhs) = self.eval_checked(right)? else {
            return Ok(Value::Nil);
        };
        self.binary_values(op, lhs, rhs, pos)
    }

    /// Apply a binary operator to evaluated operands.
    pub(crate) fn binary_values(&mut self, op: BinaryOp, lhs: Value, rhs: Value, pos: Position) -> EvalResult {
        let operands = [lhs.unwrap_variant(), rhs.unwrap_variant()];
        if let Some(result) = self.try_overload(OperatorSymbol::Binary(op), &operands, pos)? {
            return Ok(result);
        }
        let [lhs, rhs] = operands;
        let outcome = evaluate_binary(
            &lhs.unwrap_variant_or_json(),
            op,
            &rhs.unwrap_variant_or_json(),
        );
        self.raise_arithmetic(outcome, pos)
    }

    pub(crate) fn eval_unary_expr(&mut self, op: UnaryOp, operand: &Expr, pos: Position) -> EvalResult {
        let Some(value) = self.eval_checked(operand)? else {
            return Ok(Value::Nil);
        };
        let operands = [value.unwrap_variant()];
        if let Some(result) = self.try_overload(OperatorSymbol::Unary(op), &operands, pos)? {
            return Ok(result);
        }
        let [value] = operands;
        evaluate_unary(&value.unwrap_variant_or_json(), op)
    }

    /// Division by zero is a script exception; other operator failures are
    /// internal errors.
    fn raise_arithmetic(&mut self, outcome: EvalResult, pos: Position) -> EvalResult {
        match outcome {
            Err(err) if err.kind == EvalErrorKind::DivisionByZero => {
                self.raise_standard(EDIV_BY_ZERO, err.message, pos)?;
                Ok(Value::Nil)
            }
            other => other,
        }
    }

    /// Call a user-defined operator for `operands`, if one matches.
    fn try_overload(
        &mut self,
        symbol: OperatorSymbol,
        operands: &[Value],
        pos: Position,
    ) -> Result<Option<Value>, EvalError> {
        let has_owner = operands
            .iter()
            .any(|v| matches!(v, Value::Object(_) | Value::Interface(_) | Value::Record(_)));
        if !has_owner && self.types.operators().is_empty() {
            return Ok(None);
        }

        let chains: Vec<Vec<Name>> = operands.iter().map(Value::type_chain).collect();
        let local = operands.iter().find_map(|operand| match operand {
            Value::Object(object) => {
                let class = object.class();
                class
                    .lookup_operator(symbol, &chains)
                    .map(|entry| (entry, Some(class.name.clone())))
            }
            Value::Record(record) => record
                .ty()
                .lookup_operator(symbol, &chains)
                .map(|entry| (entry, Some(record.type_name()))),
            _ => None,
        });
        let found = local.or_else(|| {
            self.types
                .operators()
                .lookup(symbol, &chains)
                .map(|entry| (entry.clone(), None))
        });
        let Some((entry, owner)) = found else {
            return Ok(None);
        };

        tracing::trace!(binding = %entry.binding, "operator overload");
        self.call_operator(&entry, owner.as_ref(), operands, pos).map(Some)
    }

    fn call_operator(
        &mut self,
        entry: &OperatorEntry,
        owner: Option<&Name>,
        operands: &[Value],
        pos: Position,
    ) -> EvalResult {
        match (owner, entry.self_index) {
            (Some(_), Some(index)) if index < operands.len() => {
                let receiver = operands[index].clone();
                let args: Vec<Value> = operands
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, v)| v.clone())
                    .collect();
                let method = match &receiver {
                    Value::Object(object) => {
                        let class = object.class();
                        self.resolve_method(&class, &class, &entry.binding, args.len())
                    }
                    Value::Record(record) => record.ty().find_method(&entry.binding, args.len()),
                    _ => None,
                };
                let Some(method) = method else {
                    return Err(EvalError::new(format!(
                        "operator method '{}' not found on {}",
                        entry.binding,
                        receiver.type_name()
                    )));
                };
                self.call_method(&method, Some(receiver), args, pos)
                    .map(|outcome| outcome.result)
            }
            (Some(owner), _) => self.call_static_method(owner, &entry.binding, operands.to_vec(), pos),
            (None, _) => self.call_global(&entry.binding, operands.to_vec(), pos),
        }
    }
}
