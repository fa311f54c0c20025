//! Binary operator implementations for built-in value kinds.
//!
//! Direct enum-based dispatch: the built-in type set is fixed, so pattern
//! matching covers it exhaustively. User-declared operator overloads are
//! resolved by the interpreter before falling back to this module.

use dws_ir::BinaryOp;

use crate::errors::{
    division_by_zero, integer_overflow, invalid_binary_op, invalid_shift, EvalError, EvalResult,
};
use crate::value::Value;

/// Checked arithmetic operation with overflow handling.
#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> EvalResult {
    result.map(Value::Integer).ok_or_else(|| integer_overflow(op_name))
}

/// Integer to Float promotion.
#[inline]
#[expect(
    clippy::cast_precision_loss,
    reason = "promotion follows the language's Integer to Float rule"
)]
pub fn int_to_float(n: i64) -> f64 {
    n as f64
}

/// Evaluate a binary operation over built-in kinds.
///
/// Operands must already have Variant and JSON-scalar wrappers removed.
/// Integer `div`/`mod` by zero yields a `DivisionByZero` error, which the
/// interpreter surfaces as `EDivByZero`.
pub fn evaluate_binary(left: &Value, op: BinaryOp, right: &Value) -> EvalResult {
    if op == BinaryOp::In {
        return eval_in(left, right);
    }
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => eval_int_binary(*a, op, *b),
        (Value::Float(a), Value::Float(b)) => eval_float_binary(*a, op, *b),
        (Value::Integer(a), Value::Float(b)) => eval_float_binary(int_to_float(*a), op, *b),
        (Value::Float(a), Value::Integer(b)) => eval_float_binary(*a, op, int_to_float(*b)),
        (Value::Boolean(a), Value::Boolean(b)) => eval_bool_binary(*a, op, *b),
        (Value::String(a), Value::String(b)) => eval_string_binary(a, op, b),
        (Value::Enum(a), Value::Enum(b)) if a.type_name == b.type_name => {
            compare(a.ordinal.cmp(&b.ordinal), op).ok_or_else(|| mismatch(left, op, right))
        }
        _ if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) => equality(left, right)
            .map(|eq| Value::Boolean(eq == (op == BinaryOp::Eq)))
            .ok_or_else(|| mismatch(left, op, right)),
        _ => Err(mismatch(left, op, right)),
    }
}

fn mismatch(left: &Value, op: BinaryOp, right: &Value) -> EvalError {
    invalid_binary_op(&left.type_name(), op, &right.type_name())
}

/// Comparison operators over an ordering; `None` for non-comparison ops.
fn compare(ordering: std::cmp::Ordering, op: BinaryOp) -> Option<Value> {
    use std::cmp::Ordering::{Equal, Greater, Less};
    let result = match op {
        BinaryOp::Eq => ordering == Equal,
        BinaryOp::NotEq => ordering != Equal,
        BinaryOp::Lt => ordering == Less,
        BinaryOp::LtEq => ordering != Greater,
        BinaryOp::Gt => ordering == Greater,
        BinaryOp::GtEq => ordering != Less,
        _ => return None,
    };
    Some(Value::Boolean(result))
}

fn eval_int_binary(a: i64, op: BinaryOp, b: i64) -> EvalResult {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => Ok(Value::Float(int_to_float(a) / int_to_float(b))),
        BinaryOp::IntDiv if b == 0 => Err(division_by_zero()),
        BinaryOp::IntDiv => checked_arith(a.checked_div(b), "division"),
        BinaryOp::Mod if b == 0 => Err(division_by_zero()),
        BinaryOp::Mod => checked_arith(a.checked_rem(b), "modulo"),
        BinaryOp::And => Ok(Value::Integer(a & b)),
        BinaryOp::Or => Ok(Value::Integer(a | b)),
        BinaryOp::Xor => Ok(Value::Integer(a ^ b)),
        BinaryOp::Shl | BinaryOp::Shr => {
            let amount = u32::try_from(b).map_err(|_| invalid_shift(b))?;
            let shifted = if op == BinaryOp::Shl {
                a.checked_shl(amount)
            } else {
                a.checked_shr(amount)
            };
            shifted.map(Value::Integer).ok_or_else(|| invalid_shift(b))
        }
        _ => compare(a.cmp(&b), op).ok_or_else(|| invalid_binary_op("Integer", op, "Integer")),
    }
}

fn eval_float_binary(a: f64, op: BinaryOp, b: f64) -> EvalResult {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        _ => a
            .partial_cmp(&b)
            .and_then(|ordering| compare(ordering, op))
            .or_else(|| match op {
                // NaN: only `<>` holds.
                BinaryOp::NotEq => Some(Value::Boolean(true)),
                BinaryOp::Eq | BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                    Some(Value::Boolean(false))
                }
                _ => None,
            })
            .ok_or_else(|| invalid_binary_op("Float", op, "Float")),
    }
}

fn eval_bool_binary(a: bool, op: BinaryOp, b: bool) -> EvalResult {
    match op {
        BinaryOp::And => Ok(Value::Boolean(a && b)),
        BinaryOp::Or => Ok(Value::Boolean(a || b)),
        BinaryOp::Xor => Ok(Value::Boolean(a ^ b)),
        _ => compare(a.cmp(&b), op).ok_or_else(|| invalid_binary_op("Boolean", op, "Boolean")),
    }
}

fn eval_string_binary(a: &str, op: BinaryOp, b: &str) -> EvalResult {
    match op {
        BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::string(joined))
        }
        _ => compare(a.cmp(b), op).ok_or_else(|| invalid_binary_op("String", op, "String")),
    }
}

/// `x in arr`: membership by script equality.
fn eval_in(needle: &Value, haystack: &Value) -> EvalResult {
    match haystack {
        Value::Array(array) => Ok(Value::Boolean(
            array
                .elements()
                .iter()
                .any(|e| values_equal(needle, &e.clone().unwrap_variant_or_json())),
        )),
        Value::String(s) => match needle {
            Value::String(sub) => Ok(Value::Boolean(s.contains(&**sub))),
            _ => Err(mismatch(needle, BinaryOp::In, haystack)),
        },
        _ => Err(mismatch(needle, BinaryOp::In, haystack)),
    }
}

/// Script-level `=` for kinds without an ordering.
///
/// Objects and interfaces compare by identity, records field-wise, arrays
/// element-wise; `nil` equals only `nil`. `None` when the kinds cannot be
/// compared at all.
fn equality(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Nil, Value::Nil) => Some(true),
        (
            Value::Nil,
            Value::Object(_) | Value::Interface(_) | Value::Class(_) | Value::Function(_) | Value::Array(_),
        )
        | (
            Value::Object(_) | Value::Interface(_) | Value::Class(_) | Value::Function(_) | Value::Array(_),
            Value::Nil,
        ) => Some(false),
        (Value::Object(a), Value::Object(b)) => Some(a.ptr_eq(b)),
        (Value::Interface(a), Value::Interface(b)) => Some(a.object.ptr_eq(&b.object)),
        (Value::Object(a), Value::Interface(b)) | (Value::Interface(b), Value::Object(a)) => {
            Some(a.ptr_eq(&b.object))
        }
        (Value::Class(a), Value::Class(b)) => Some(a.name == b.name),
        (Value::Function(a), Value::Function(b)) => Some(a.same_target(b)),
        (Value::Record(a), Value::Record(b)) => Some(
            a.type_name() == b.type_name()
                && a.fields()
                    .iter()
                    .zip(b.fields().iter())
                    .all(|((_, x), (_, y))| values_equal(x, y)),
        ),
        (Value::Array(a), Value::Array(b)) => {
            let (xs, ys) = (a.elements(), b.elements());
            Some(xs.len() == ys.len() && xs.iter().zip(&ys).all(|(x, y)| values_equal(x, y)))
        }
        (Value::Json(a), Value::Json(b)) => Some(a == b),
        _ => None,
    }
}

/// Script-level equality used by `in`, `case` and record comparison.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    let left = left.clone().unwrap_variant_or_json();
    let right = right.clone().unwrap_variant_or_json();
    match evaluate_binary(&left, BinaryOp::Eq, &right) {
        Ok(Value::Boolean(b)) => b,
        _ => false,
    }
}

