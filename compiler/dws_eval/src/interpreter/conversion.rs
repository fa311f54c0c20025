//! Coercion of values into typed slots.
//!
//! Every write into a declared slot (variable, field, parameter, `Result`,
//! array element) goes through [`Interpreter::coerce`]. The rules, first
//! match wins:
//!
//! 1. an untyped slot takes the value as is; a Variant slot boxes it
//! 2. Variant and JSON values are unwrapped first; an empty one fills a
//!    value slot with its zero value, while a bare `nil` there is an error
//! 3. assignable values pass unchanged; Integer widens to Float; objects
//!    become interface references and back; arrays convert element-wise
//! 4. a registered implicit conversion chain is applied
//! 5. anything else falls through unconverted

use std::rc::Rc;

use dws_ir::{Name, Position};

use super::Interpreter;
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::operators::int_to_float;
use crate::types::{ArrayType, ClassInfo, Conversion, InterfaceInfo, RuntimeType};
use crate::value::{ArrayValue, InterfaceValue, Value};

impl Interpreter {
    pub(crate) fn coerce(&mut self, value: Value, target: &RuntimeType) -> EvalResult {
        match target {
            RuntimeType::Unknown => return Ok(value),
            RuntimeType::Variant => return Ok(Value::variant(value)),
            _ => {}
        }

        let boxed = matches!(value, Value::Variant(_) | Value::Json(_));
        let value = match value {
            Value::Variant(_) => value.unwrap_variant(),
            Value::Json(_) if !matches!(target, RuntimeType::Json) => value.unwrap_variant_or_json(),
            other => other,
        };
        if value.is_nil() && !target.accepts_nil() {
            // Unassigned and Null variants read as the slot's zero value.
            if boxed {
                return Ok(self.types.zero_value(target));
            }
            return Err(type_mismatch(&target.to_string(), "Nil"));
        }
        if self.types.is_assignable(&value, target) {
            return Ok(value);
        }

        match (&value, target) {
            (Value::Integer(n), RuntimeType::Float) => return Ok(Value::Float(int_to_float(*n))),
            (Value::Object(object), RuntimeType::Interface(name)) => {
                if let Some(info) = self.types.interface(name) {
                    if self.class_implements(&object.class(), &info) {
                        return Ok(Value::Interface(InterfaceValue {
                            info,
                            object: object.clone(),
                        }));
                    }
                }
            }
            (Value::Interface(reference), RuntimeType::Interface(name)) => {
                if let Some(info) = self.types.interface(name) {
                    if self.class_implements(&reference.object.class(), &info) {
                        return Ok(Value::Interface(InterfaceValue {
                            info,
                            object: reference.object.clone(),
                        }));
                    }
                }
            }
            (Value::Interface(reference), RuntimeType::Class(name))
                if reference.object.class().inherits_from(name) =>
            {
                return Ok(Value::Object(reference.object.clone()));
            }
            (Value::Array(array), RuntimeType::Array(target_type)) => {
                if let Some(converted) = self.convert_array(array, target_type)? {
                    return Ok(converted);
                }
            }
            _ => {}
        }

        self.apply_conversion_chain(value, target)
    }

    /// Coerce each element of `array` when only the element types differ.
    fn convert_array(&mut self, array: &ArrayValue, target: &Rc<ArrayType>) -> Result<Option<Value>, EvalError> {
        let shape_agrees = match target.bounds {
            Some(bounds) => array.len() == bounds.len(),
            None => true,
        };
        if !shape_agrees {
            return Ok(None);
        }
        let mut elements = Vec::with_capacity(array.len());
        for element in array.elements() {
            let converted = self.coerce(element, &target.element)?;
            if !self.types.is_assignable(&converted, &target.element) {
                return Ok(None);
            }
            elements.push(converted);
        }
        Ok(Some(Value::Array(ArrayValue::new(Rc::clone(target), elements))))
    }

    /// Static type of a slot initialized from `value`; `None` for `nil`.
    pub(crate) fn runtime_type_of(&self, value: &Value) -> Option<RuntimeType> {
        let ty = match value {
            Value::Nil => return None,
            Value::Integer(_) => RuntimeType::Integer,
            Value::Float(_) => RuntimeType::Float,
            Value::String(_) => RuntimeType::String,
            Value::Boolean(_) => RuntimeType::Boolean,
            Value::Enum(e) => RuntimeType::Enum(self.types.enum_type(&e.type_name)?),
            Value::Array(array) => RuntimeType::Array(array.ty()),
            Value::Record(record) => RuntimeType::Record(record.type_name()),
            Value::Object(object) => RuntimeType::Class(object.class_name()),
            Value::Interface(reference) => RuntimeType::Interface(reference.info.name.clone()),
            Value::Function(_) => RuntimeType::Function,
            Value::Variant(_) => RuntimeType::Variant,
            Value::Json(_) => RuntimeType::Json,
            Value::Class(_) => RuntimeType::Unknown,
        };
        Some(ty)
    }

    /// Declared interfaces first, then a structural method check.
    pub(crate) fn class_implements(&self, class: &ClassInfo, interface: &InterfaceInfo) -> bool {
        let declared = class.declared_interfaces().iter().any(|name| {
            name == &interface.name
                || self
                    .types
                    .interface(name)
                    .is_some_and(|i| i.inherits_from(&interface.name))
        });
        declared || class.implements(interface)
    }

    fn apply_conversion_chain(&mut self, value: Value, target: &RuntimeType) -> EvalResult {
        let from = Name::new(&value.type_name());
        let to = target.name();
        let Some(path) = self
            .types
            .conversions()
            .find_path(&from, &to, self.max_conversion_depth)
        else {
            return Ok(value);
        };

        let pos = self.current_pos;
        let mut current = value;
        for step in &path {
            current = self.call_conversion(step, current, pos)?;
            if self.exceptions.is_pending() {
                return Ok(Value::Nil);
            }
        }
        Ok(current)
    }

    fn call_conversion(&mut self, conversion: &Conversion, value: Value, pos: Position) -> EvalResult {
        tracing::trace!(
            from = %conversion.from,
            to = %conversion.to,
            binding = %conversion.binding,
            "implicit conversion"
        );
        match &conversion.owner {
            Some(owner) => self.call_static_method(owner, &conversion.binding, vec![value], pos),
            None => self.call_global(&conversion.binding, vec![value], pos),
        }
    }
}
