//! JSON text conversion through `serde_json`.

use super::{expect_args, Builtin, BuiltinError};
use crate::errors::type_mismatch;
use crate::interpreter::standard_classes::ECONVERT_ERROR;
use crate::value::{to_json, Value};

pub(super) fn register(add: &mut impl FnMut(&str, Builtin)) {
    add("ParseJSON", Builtin::Direct(parse_json));
    add("JSONStringify", Builtin::Direct(stringify));
}

/// Parse JSON text into a JSON value. Malformed text raises
/// `EConvertError`.
fn parse_json(args: &[Value]) -> Result<Value, BuiltinError> {
    expect_args("ParseJSON", args, 1)?;
    let text = args[0].clone().unwrap_variant();
    let Some(text) = text.as_str() else {
        return Err(type_mismatch("String", &text.type_name()).into());
    };
    serde_json::from_str(text)
        .map(Value::json)
        .map_err(|e| BuiltinError::Raise {
            class_name: ECONVERT_ERROR,
            message: format!("invalid JSON: {e}"),
        })
}

fn stringify(args: &[Value]) -> Result<Value, BuiltinError> {
    expect_args("JSONStringify", args, 1)?;
    let Some(node) = to_json(&args[0]) else {
        return Err(type_mismatch("JSON-representable value", &args[0].type_name()).into());
    };
    Ok(Value::string(node.to_string()))
}
