//! Output, conversions, array helpers and assertions.

use super::{expect_args, Builtin, BuiltinError};
use crate::errors::{arity_mismatch, type_mismatch, EvalError, EvalResult};
use crate::interpreter::standard_classes::{EASSERTION_FAILED, ECONVERT_ERROR, ERANGE_ERROR};
use crate::operators::int_to_float;
use crate::value::{format_float, Value};
use crate::Interpreter;

pub(super) fn register(add: &mut impl FnMut(&str, Builtin)) {
    add("PrintLn", Builtin::Evaluator(print_ln));
    add("Print", Builtin::Evaluator(print));
    add("Length", Builtin::Direct(length));
    add("Low", Builtin::Direct(low));
    add("High", Builtin::Direct(high));
    add("SetLength", Builtin::Evaluator(set_length));
    add("IntToStr", Builtin::Direct(int_to_str));
    add("FloatToStr", Builtin::Direct(float_to_str));
    add("StrToInt", Builtin::Direct(str_to_int));
    add("StrToFloat", Builtin::Direct(str_to_float));
    add("Assert", Builtin::Direct(assert));
    add("Ord", Builtin::Direct(ord));
    add("Chr", Builtin::Direct(chr));
}

fn joined(args: &[Value]) -> String {
    args.iter().map(ToString::to_string).collect()
}

fn print_ln(interpreter: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    interpreter.print_handler().println(&joined(&args));
    Ok(Value::Nil)
}

fn print(interpreter: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    interpreter.print_handler().print(&joined(&args));
    Ok(Value::Nil)
}

fn count(n: usize) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

fn single(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, args, 1)?;
    Ok(args[0].clone().unwrap_variant())
}

fn length(args: &[Value]) -> Result<Value, BuiltinError> {
    match single("Length", args)? {
        Value::Array(array) => Ok(count(array.len())),
        Value::String(s) => Ok(count(s.chars().count())),
        Value::Json(node) => Ok(count(match &*node {
            serde_json::Value::Array(items) => items.len(),
            serde_json::Value::Object(map) => map.len(),
            serde_json::Value::String(s) => s.chars().count(),
            _ => 0,
        })),
        Value::Nil => Ok(Value::Integer(0)),
        other => Err(type_mismatch("array or string", &other.type_name()).into()),
    }
}

fn low(args: &[Value]) -> Result<Value, BuiltinError> {
    match single("Low", args)? {
        Value::Array(array) => Ok(Value::Integer(array.bounds().0)),
        Value::String(_) => Ok(Value::Integer(1)),
        other => Err(type_mismatch("array or string", &other.type_name()).into()),
    }
}

fn high(args: &[Value]) -> Result<Value, BuiltinError> {
    match single("High", args)? {
        Value::Array(array) => Ok(Value::Integer(array.bounds().1)),
        Value::String(s) => Ok(count(s.chars().count())),
        other => Err(type_mismatch("array or string", &other.type_name()).into()),
    }
}

/// Resize a dynamic array in place; new slots hold the element type's
/// zero value.
fn set_length(interpreter: &mut Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("SetLength", &args, 2)?;
    let (Value::Array(array), Some(len)) = (args[0].clone().unwrap_variant(), args[1].as_int()) else {
        return Err(type_mismatch("dynamic array, Integer", &args[0].type_name()));
    };
    if array.is_static() {
        return Err(EvalError::new("SetLength requires a dynamic array"));
    }
    let Ok(len) = usize::try_from(len) else {
        let pos = interpreter.current_pos;
        interpreter.raise_standard(ERANGE_ERROR, format!("Invalid array length {len}"), pos)?;
        return Ok(Value::Nil);
    };
    let element = array.ty().element.clone();
    array.resize_with(len, || interpreter.types().zero_value(&element));
    Ok(Value::Nil)
}

fn int_to_str(args: &[Value]) -> Result<Value, BuiltinError> {
    match single("IntToStr", args)? {
        Value::Integer(n) => Ok(Value::string(n.to_string())),
        other => Err(type_mismatch("Integer", &other.type_name()).into()),
    }
}

fn float_to_str(args: &[Value]) -> Result<Value, BuiltinError> {
    match single("FloatToStr", args)? {
        Value::Float(f) => Ok(Value::string(format_float(f))),
        Value::Integer(n) => Ok(Value::string(format_float(int_to_float(n)))),
        other => Err(type_mismatch("Float", &other.type_name()).into()),
    }
}

fn str_to_int(args: &[Value]) -> Result<Value, BuiltinError> {
    match single("StrToInt", args)? {
        Value::String(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| BuiltinError::Raise {
            class_name: ECONVERT_ERROR,
            message: format!("'{s}' is not a valid integer value"),
        }),
        other => Err(type_mismatch("String", &other.type_name()).into()),
    }
}

fn str_to_float(args: &[Value]) -> Result<Value, BuiltinError> {
    match single("StrToFloat", args)? {
        Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| BuiltinError::Raise {
            class_name: ECONVERT_ERROR,
            message: format!("'{s}' is not a valid floating point value"),
        }),
        other => Err(type_mismatch("String", &other.type_name()).into()),
    }
}

/// `Assert(cond)` or `Assert(cond, message)`.
fn assert(args: &[Value]) -> Result<Value, BuiltinError> {
    let (cond, message) = match args {
        [cond] => (cond, None),
        [cond, message] => (cond, Some(message.to_string())),
        _ => return Err(arity_mismatch("Assert", 1, args.len()).into()),
    };
    match cond.is_truthy() {
        Some(true) => Ok(Value::Nil),
        Some(false) => Err(BuiltinError::Raise {
            class_name: EASSERTION_FAILED,
            message: message.unwrap_or_else(|| "Assertion failed".to_string()),
        }),
        None => Err(type_mismatch("Boolean", &cond.type_name()).into()),
    }
}

fn ord(args: &[Value]) -> Result<Value, BuiltinError> {
    let value = single("Ord", args)?;
    if let Value::String(s) = &value {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Value::Integer(i64::from(u32::from(c))));
        }
    }
    value
        .as_ordinal()
        .map(Value::Integer)
        .ok_or_else(|| type_mismatch("ordinal", &value.type_name()).into())
}

fn chr(args: &[Value]) -> Result<Value, BuiltinError> {
    let value = single("Chr", args)?;
    let Some(code) = value.as_int() else {
        return Err(type_mismatch("Integer", &value.type_name()).into());
    };
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::string(c.to_string()))
        .ok_or_else(|| BuiltinError::Raise {
            class_name: ERANGE_ERROR,
            message: format!("Invalid character code {code}"),
        })
}
