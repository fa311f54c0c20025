//! Unary operator implementations for the evaluator.
//!
//! Direct enum-based dispatch over built-in kinds. `not` is logical on
//! Booleans and bitwise on Integers.

use dws_ir::UnaryOp;

use crate::errors::{integer_overflow, invalid_unary_op, EvalResult};
use crate::value::Value;

/// Evaluate a unary operation. Variant and JSON-scalar wrappers must already
/// be removed.
pub fn evaluate_unary(value: &Value, op: UnaryOp) -> EvalResult {
    match (value, op) {
        (Value::Integer(n), UnaryOp::Neg) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| integer_overflow("negation")),
        (Value::Float(f), UnaryOp::Neg) => Ok(Value::Float(-f)),
        (Value::Integer(_) | Value::Float(_), UnaryOp::Plus) => Ok(value.clone()),
        (Value::Boolean(b), UnaryOp::Not) => Ok(Value::Boolean(!b)),
        (Value::Integer(n), UnaryOp::Not) => Ok(Value::Integer(!n)),
        _ => Err(invalid_unary_op(op, &value.type_name())),
    }
}
