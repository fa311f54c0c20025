//! Tests for the built-in unary operators.

use dws_ir::UnaryOp;
use pretty_assertions::assert_eq;

use crate::unary_operators::evaluate_unary;
use crate::value::Value;

#[test]
fn negation() {
    assert_eq!(evaluate_unary(&Value::Integer(5), UnaryOp::Neg).ok(), Some(Value::Integer(-5)));
    assert_eq!(evaluate_unary(&Value::Float(2.5), UnaryOp::Neg).ok(), Some(Value::Float(-2.5)));
}

#[test]
fn negating_min_overflows() {
    let err = evaluate_unary(&Value::Integer(i64::MIN), UnaryOp::Neg).err();
    assert_eq!(
        err.map(|e| e.message).as_deref(),
        Some("integer overflow in negation")
    );
}

#[test]
fn not_is_logical_or_bitwise() {
    assert_eq!(evaluate_unary(&Value::Boolean(true), UnaryOp::Not).ok(), Some(Value::Boolean(false)));
    assert_eq!(evaluate_unary(&Value::Integer(0), UnaryOp::Not).ok(), Some(Value::Integer(-1)));
}

#[test]
fn unary_plus_rejects_strings() {
    let err = evaluate_unary(&Value::string("x"), UnaryOp::Plus).err();
    assert_eq!(
        err.map(|e| e.message).as_deref(),
        Some("operator + cannot be applied to String")
    );
}
