use std::rc::Rc;

use dws_ir::ast::ExprKind;
use dws_ir::build::{ident, index, index_multi, int};
use dws_ir::ArrayBounds;
use pretty_assertions::assert_eq;

use super::*;
use crate::errors::EvalErrorKind;
use crate::tests::interpreter;
use crate::types::{ArrayType, RuntimeType};
use crate::value::ArrayValue;

fn static_ints(low: i64, values: &[i64]) -> Value {
    let high = low + i64::try_from(values.len()).unwrap_or(0) - 1;
    Value::Array(ArrayValue::new(
        Rc::new(ArrayType::new(
            RuntimeType::Integer,
            Some(ArrayBounds::new(low, high)),
        )),
        values.iter().map(|&v| Value::Integer(v)).collect(),
    ))
}

#[test]
fn flatten_puts_the_outermost_index_last() {
    let expr = index_multi(ident("grid"), vec![int(1), int(2), int(3)]);
    let (root, indices) = flatten_index(&expr);
    assert!(matches!(&root.kind, ExprKind::Ident(name) if name.is("grid")));
    let literals: Vec<i64> = indices
        .iter()
        .filter_map(|e| match e.kind {
            ExprKind::Int(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(literals, vec![1, 2, 3]);
}

#[test]
fn flatten_of_a_plain_expression_has_no_indices() {
    let expr = ident("x");
    let (root, indices) = flatten_index(&expr);
    assert!(std::ptr::eq(root, &expr));
    assert!(indices.is_empty());

    let single = index(ident("x"), int(0));
    assert_eq!(flatten_index(&single).1.len(), 1);
}

#[test]
fn char_offsets_are_one_based() {
    assert_eq!(char_offset(1), Some(0));
    assert_eq!(char_offset(5), Some(4));
    assert_eq!(char_offset(0), None);
    assert_eq!(char_offset(i64::MIN), None);
}

#[test]
fn ordinal_index_accepts_ordinals_only() {
    assert_eq!(ordinal_index(&Value::Integer(3)).ok(), Some(3));
    assert_eq!(
        ordinal_index(&Value::variant(Value::Integer(4))).ok(),
        Some(4)
    );
    assert_eq!(
        ordinal_index(&Value::string("x")).err().map(|e| e.kind),
        Some(EvalErrorKind::InvalidIndexType {
            got: "String".to_string()
        })
    );
}

#[test]
fn json_missing_keys_and_elements_read_as_nil() {
    let node: serde_json::Value = serde_json::json!({"a": [10, 20], "b": "text"});
    assert_eq!(json_index(&node, &Value::string("b")).ok(), Some(Value::string("text")));
    assert_eq!(json_index(&node, &Value::string("missing")).ok(), Some(Value::Nil));

    let items = serde_json::json!([1, 2]);
    assert_eq!(json_index(&items, &Value::Integer(1)).ok(), Some(Value::Integer(2)));
    assert_eq!(json_index(&items, &Value::Integer(-1)).ok(), Some(Value::Nil));
    assert_eq!(json_index(&items, &Value::Integer(9)).ok(), Some(Value::Nil));
}

#[test]
fn json_index_kind_must_match_the_container() {
    let object = serde_json::json!({"a": 1});
    assert_eq!(
        json_index(&object, &Value::Integer(0)).err().map(|e| e.kind),
        Some(EvalErrorKind::JsonIndexType {
            container: "object",
            expected: "a string",
        })
    );
    let items = serde_json::json!([10, 20]);
    assert_eq!(
        json_index(&items, &Value::string("a")).err().map(|e| e.kind),
        Some(EvalErrorKind::JsonIndexType {
            container: "array",
            expected: "an integer",
        })
    );
    let scalar = serde_json::json!(3);
    assert_eq!(
        json_index(&scalar, &Value::Integer(0)).err().map(|e| e.to_string()),
        Some("cannot index type JSON number".to_string())
    );
}

#[test]
fn array_index_respects_low_bound() {
    let mut interp = interpreter();
    let array = static_ints(5, &[50, 60, 70]);
    assert_eq!(
        interp.index_value(array.clone(), Value::Integer(6)).ok(),
        Some(Value::Integer(60))
    );
    assert_eq!(
        interp
            .index_value(array, Value::Integer(4))
            .err()
            .map(|e| e.kind),
        Some(EvalErrorKind::IndexOutOfBounds {
            index: 4,
            low: 5,
            high: 7,
        })
    );
}

#[test]
fn string_index_yields_a_character() {
    let mut interp = interpreter();
    assert_eq!(
        interp
            .index_value(Value::string("héllo"), Value::Integer(2))
            .ok(),
        Some(Value::string("é"))
    );
    assert_eq!(
        interp
            .index_value(Value::string("abc"), Value::Integer(0))
            .err()
            .map(|e| e.kind),
        Some(EvalErrorKind::StringIndexOutOfBounds { index: 0, len: 3 })
    );
}

#[test]
fn indexing_nil_is_a_nil_dereference() {
    let mut interp = interpreter();
    assert_eq!(
        interp
            .index_value(Value::Nil, Value::Integer(0))
            .err()
            .map(|e| e.kind),
        Some(EvalErrorKind::NilDereference {
            member: "[]".to_string()
        })
    );
}

#[test]
fn variant_wrapped_arrays_index_through() {
    let mut interp = interpreter();
    let boxed = Value::variant(static_ints(0, &[1, 2]));
    assert_eq!(
        interp.index_value(boxed, Value::Integer(1)).ok(),
        Some(Value::Integer(2))
    );
}
