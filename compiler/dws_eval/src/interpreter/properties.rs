//! Property getters and setters.
//!
//! A property's `read`/`write` specifier names either a field or a method.
//! Index arguments of an indexed property are passed to the method first;
//! a setter receives the assigned value last.

use std::rc::Rc;

use dws_ir::{Name, Position};

use super::Interpreter;
use crate::errors::{property_access, undefined_member, EvalError, EvalResult};
use crate::types::{MethodInfo, PropertyInfo};
use crate::value::Value;

impl Interpreter {
    pub(crate) fn read_property(
        &mut self,
        receiver: Value,
        property: &PropertyInfo,
        index_args: Vec<Value>,
        pos: Position,
    ) -> EvalResult {
        let Some(reader) = &property.read else {
            return Err(property_access(property.name.as_str(), "readable"));
        };
        if index_args.is_empty() {
            if let Some(value) = stored_field(&receiver, reader) {
                return Ok(value);
            }
        }
        let method = self.accessor(&receiver, reader, index_args.len(), &property.name)?;
        self.call_method(&method, Some(receiver), index_args, pos)
            .map(|outcome| outcome.result)
    }

    pub(crate) fn write_property(
        &mut self,
        receiver: Value,
        property: &PropertyInfo,
        mut index_args: Vec<Value>,
        value: Value,
        pos: Position,
    ) -> Result<(), EvalError> {
        let Some(writer) = &property.write else {
            return Err(property_access(property.name.as_str(), "writable"));
        };
        let value = self.coerce(value, &property.ty)?;
        if index_args.is_empty() && write_field(&receiver, writer, &value) {
            return Ok(());
        }
        let method = self.accessor(&receiver, writer, index_args.len() + 1, &property.name)?;
        index_args.push(value);
        self.call_method(&method, Some(receiver), index_args, pos)?;
        Ok(())
    }

    /// The getter or setter method `name` taking `arity` arguments, resolved
    /// against the receiver's runtime class.
    fn accessor(
        &self,
        receiver: &Value,
        name: &Name,
        arity: usize,
        property: &Name,
    ) -> Result<Rc<MethodInfo>, EvalError> {
        let (method, type_name) = match receiver {
            Value::Object(object) => {
                let class = object.class();
                (self.resolve_method(&class, &class, name, arity), class.name.clone())
            }
            Value::Interface(reference) => {
                let class = reference.object.class();
                (self.resolve_method(&class, &class, name, arity), class.name.clone())
            }
            Value::Record(record) => (record.ty().find_method(name, arity), record.type_name()),
            other => return Err(undefined_member(property.as_str(), &other.type_name())),
        };
        method.ok_or_else(|| undefined_member(name.as_str(), type_name.as_str()))
    }
}

fn stored_field(receiver: &Value, field: &Name) -> Option<Value> {
    match receiver {
        Value::Object(object) => object.get_field(field),
        Value::Interface(reference) => reference.object.get_field(field),
        Value::Record(record) => record.get_field(field),
        _ => None,
    }
}

fn write_field(receiver: &Value, field: &Name, value: &Value) -> bool {
    let value = value.copy_for_assignment();
    match receiver {
        Value::Object(object) => object.set_field(field, value),
        Value::Interface(reference) => reference.object.set_field(field, value),
        Value::Record(record) => record.set_field(field, value),
        _ => false,
    }
}
