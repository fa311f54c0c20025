//! `Map`, `Filter`, `Reduce` and `ForEach`.
//!
//! Each calls back into the interpreter for its callback and stops as soon
//! as a callback leaves a script exception pending.

use std::rc::Rc;

use super::{expect_args, Builtin};
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::types::{ArrayType, RuntimeType};
use crate::value::{ArrayValue, Value};
use crate::Interpreter;

pub(super) fn register(add: &mut impl FnMut(&str, Builtin)) {
    add("Map", Builtin::Evaluator(map));
    add("Filter", Builtin::Evaluator(filter));
    add("Reduce", Builtin::Evaluator(reduce));
    add("ForEach", Builtin::Evaluator(for_each));
}

fn source_array(value: &Value) -> Result<ArrayValue, EvalError> {
    match value.clone().unwrap_variant() {
        Value::Array(array) => Ok(array),
        other => Err(type_mismatch("array", &other.type_name())),
    }
}

/// `Map(array, f)`: a dynamic array of `f(element)`.
fn map(interpreter: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("Map", &args, 2)?;
    let source = source_array(&args[0])?;
    let mut results = Vec::with_capacity(source.len());
    for element in source.elements() {
        let value = interpreter.call_value(&args[1], vec![element])?;
        if interpreter.exception_pending() {
            return Ok(Value::Nil);
        }
        results.push(value);
    }
    let element_type = results
        .first()
        .and_then(|v| interpreter.runtime_type_of(v))
        .unwrap_or(RuntimeType::Unknown);
    Ok(Value::Array(ArrayValue::new(
        Rc::new(ArrayType::dynamic(element_type)),
        results,
    )))
}

/// `Filter(array, predicate)`: the elements the predicate accepts.
fn filter(interpreter: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("Filter", &args, 2)?;
    let source = source_array(&args[0])?;
    let mut kept = Vec::new();
    for element in source.elements() {
        let verdict = interpreter.call_value(&args[1], vec![element.clone()])?;
        if interpreter.exception_pending() {
            return Ok(Value::Nil);
        }
        match verdict.is_truthy() {
            Some(true) => kept.push(element),
            Some(false) => {}
            None => return Err(type_mismatch("Boolean", &verdict.type_name())),
        }
    }
    let element_type = source.ty().element.clone();
    Ok(Value::Array(ArrayValue::new(
        Rc::new(ArrayType::dynamic(element_type)),
        kept,
    )))
}

/// `Reduce(array, f, initial)`: left fold with `f(accumulator, element)`.
fn reduce(interpreter: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("Reduce", &args, 3)?;
    let source = source_array(&args[0])?;
    let mut accumulator = args[2].clone();
    for element in source.elements() {
        accumulator = interpreter.call_value(&args[1], vec![accumulator, element])?;
        if interpreter.exception_pending() {
            return Ok(Value::Nil);
        }
    }
    Ok(accumulator)
}

fn for_each(interpreter: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("ForEach", &args, 2)?;
    let source = source_array(&args[0])?;
    for element in source.elements() {
        interpreter.call_value(&args[1], vec![element])?;
        if interpreter.exception_pending() {
            break;
        }
    }
    Ok(Value::Nil)
}
