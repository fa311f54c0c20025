//! Array and record literals.
//!
//! An array literal's type comes from, in order: its own annotation, the
//! type expected at the use site, or inference over the elements. Inferred
//! literals are static arrays `[0..n-1]`; an empty one is a dynamic array
//! of unknown elements.

use std::rc::Rc;

use dws_ir::ast::Expr;
use dws_ir::{ArrayBounds, Name, TypeExpr};

use super::Interpreter;
use crate::errors::{
    array_element_mismatch, array_literal_size, undefined_member, undefined_type, EvalError,
    EvalResult,
};
use crate::types::{ArrayType, RuntimeType};
use crate::value::{ArrayValue, Value};

impl Interpreter {
    pub(crate) fn eval_array_literal(
        &mut self,
        elements: &[Expr],
        annotation: Option<&TypeExpr>,
        expected: Option<&RuntimeType>,
    ) -> EvalResult {
        let target = match annotation {
            Some(ty) => match self.types.resolve(ty)? {
                RuntimeType::Array(array_type) => Some(array_type),
                element => Some(Rc::new(ArrayType::dynamic(element))),
            },
            None => match expected {
                Some(RuntimeType::Array(array_type)) => Some(Rc::clone(array_type)),
                _ => None,
            },
        };

        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            let element_type = target.as_ref().map(|t| &t.element);
            let value = self.eval_expected(element, element_type)?;
            if self.exceptions.is_pending() {
                return Ok(Value::Nil);
            }
            values.push(value);
        }

        let array_type = match target {
            Some(array_type) => {
                if let Some(bounds) = array_type.bounds {
                    if bounds.len() != values.len() {
                        return Err(array_literal_size(values.len(), bounds.len()));
                    }
                }
                array_type
            }
            None => Rc::new(self.infer_array_type(&values)?),
        };

        let mut coerced = Vec::with_capacity(values.len());
        for (position, value) in values.into_iter().enumerate() {
            coerced.push(self.coerce_element(value, &array_type.element, position + 1)?);
        }
        Ok(Value::Array(ArrayValue::new(array_type, coerced)))
    }

    /// Unify the element types: Integer with Float widens to Float, objects
    /// meet at their nearest common class.
    fn infer_array_type(&self, values: &[Value]) -> Result<ArrayType, EvalError> {
        if values.is_empty() {
            return Ok(ArrayType::dynamic(RuntimeType::Unknown));
        }
        let mut unified: Option<RuntimeType> = None;
        for (position, value) in values.iter().enumerate() {
            let Some(ty) = self.runtime_type_of(value) else {
                continue;
            };
            unified = Some(match unified {
                None => ty,
                Some(current) => self
                    .unify(&current, &ty)
                    .ok_or_else(|| array_element_mismatch(position + 1, &ty.to_string(), &current.to_string()))?,
            });
        }
        let high = i64::try_from(values.len()).unwrap_or(i64::MAX) - 1;
        Ok(ArrayType::new(
            unified.unwrap_or(RuntimeType::Unknown),
            Some(ArrayBounds::new(0, high)),
        ))
    }

    fn unify(&self, current: &RuntimeType, next: &RuntimeType) -> Option<RuntimeType> {
        match (current, next) {
            _ if current == next => Some(current.clone()),
            (RuntimeType::Integer, RuntimeType::Float) | (RuntimeType::Float, RuntimeType::Integer) => {
                Some(RuntimeType::Float)
            }
            (RuntimeType::Class(a), RuntimeType::Class(b)) => {
                let a = self.types.class(a)?;
                let b = self.types.class(b)?;
                let common = a
                    .ancestry()
                    .find(|ancestor| b.inherits_from(&ancestor.name))
                    .map(|common| RuntimeType::Class(common.name.clone()));
                common
            }
            (RuntimeType::Array(a), RuntimeType::Array(b)) => {
                if self.types.array_compatible(b, a) {
                    Some(current.clone())
                } else if self.types.array_compatible(a, b) {
                    Some(next.clone())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Fit one element into the literal's element type. `position` is
    /// 1-based, for diagnostics.
    fn coerce_element(&mut self, value: Value, element_type: &RuntimeType, position: usize) -> EvalResult {
        if matches!(element_type, RuntimeType::Variant) {
            return Ok(Value::variant(value));
        }
        if value.is_nil() {
            return match element_type {
                RuntimeType::Class(_)
                | RuntimeType::Interface(_)
                | RuntimeType::Array(_)
                | RuntimeType::Function
                | RuntimeType::Json
                | RuntimeType::Unknown => Ok(Value::Nil),
                other => Err(array_element_mismatch(position, "Nil", &other.to_string())),
            };
        }
        let got = value.type_name();
        let converted = self.coerce(value, element_type)?;
        if self.types.is_assignable(&converted, element_type) {
            Ok(converted.copy_for_assignment())
        } else {
            Err(array_element_mismatch(position, &got, &element_type.to_string()))
        }
    }

    pub(crate) fn eval_record_literal(
        &mut self,
        type_name: Option<&Name>,
        fields: &[(Name, Expr)],
        expected: Option<&RuntimeType>,
    ) -> EvalResult {
        let name = match (type_name, expected) {
            (Some(name), _) | (None, Some(RuntimeType::Record(name))) => name,
            _ => return Err(EvalError::new("cannot infer the type of a record literal")),
        };
        let Some(record_type) = self.types.record(name) else {
            return Err(undefined_type(name.as_str()));
        };

        let record = self.types.instantiate_record(&record_type);
        for (field_name, init) in fields {
            let Some(field) = record_type.field(field_name) else {
                return Err(undefined_member(field_name.as_str(), record_type.name.as_str()));
            };
            let field_type = field.ty.clone();
            let value = self.eval_expected(init, Some(&field_type))?;
            if self.exceptions.is_pending() {
                return Ok(Value::Nil);
            }
            let value = self.coerce(value, &field_type)?;
            record.set_field(field_name, value.copy_for_assignment());
        }
        Ok(Value::Record(record))
    }
}
