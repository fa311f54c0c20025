//! Writes: variables, fields, properties and elements.

use dws_ir::ast::{Expr, ExprKind};
use dws_ir::{Name, Position};

use super::Interpreter;
use crate::environment::AssignError;
use crate::errors::{
    assign_to_constant, nil_dereference, undefined_member, undefined_variable, EvalError,
};
use crate::value::Value;

impl Interpreter {
    /// Store `value` in the location `target` denotes.
    pub(crate) fn assign_to(&mut self, target: &Expr, value: Value) -> Result<(), EvalError> {
        match &target.kind {
            ExprKind::Ident(name) => self.assign_variable(name, value),
            ExprKind::Member { object, member } => {
                let Some(receiver) = self.eval_checked(object)? else {
                    return Ok(());
                };
                self.set_member(receiver, member, value, target.pos)
            }
            ExprKind::Index { .. } => self.assign_index(target, value),
            _ => Err(EvalError::new("invalid assignment target")),
        }
    }

    /// Assign to a variable by name.
    ///
    /// Falls back to `Result` when the name is the enclosing function's,
    /// then to a field or property of `Self`.
    pub(crate) fn assign_variable(&mut self, name: &Name, value: Value) -> Result<(), EvalError> {
        let value = match self.env.declared_type(name) {
            Some(ty) => self.coerce(value, &ty)?,
            None => value,
        };
        match self.env.assign(name, value.copy_for_assignment()) {
            Ok(()) => Ok(()),
            Err(AssignError::Immutable) => Err(assign_to_constant(name.as_str())),
            Err(AssignError::Undefined) => self.assign_fallback(name, value),
        }
    }

    fn assign_fallback(&mut self, name: &Name, value: Value) -> Result<(), EvalError> {
        let is_routine_name = self
            .context
            .routine
            .as_ref()
            .is_some_and(|r| &r.name == name && r.return_type.is_some());
        if is_routine_name {
            let result = self.names.result.clone();
            return self.assign_variable(&result, value);
        }
        if let Some(receiver) = self.self_value() {
            let has_member = match &receiver {
                Value::Object(object) => {
                    let class = object.class();
                    class.field(name).is_some() || class.find_property(name).is_some()
                }
                Value::Record(record) => {
                    let ty = record.ty();
                    ty.field(name).is_some() || ty.find_property(name).is_some()
                }
                _ => false,
            };
            if has_member {
                let pos = self.current_pos;
                return self.set_member(receiver, name, value, pos);
            }
        }
        Err(undefined_variable(name.as_str()))
    }

    /// `receiver.member := value`.
    pub(crate) fn set_member(
        &mut self,
        receiver: Value,
        member: &Name,
        value: Value,
        pos: Position,
    ) -> Result<(), EvalError> {
        match receiver {
            Value::Object(object) => {
                let class = object.class();
                if let Some(field) = class.field(member) {
                    let value = self.coerce(value, &field.ty)?;
                    object.set_field(member, value.copy_for_assignment());
                    return Ok(());
                }
                if let Some(property) = class.find_property(member) {
                    return self.write_property(Value::Object(object), &property, Vec::new(), value, pos);
                }
                Err(undefined_member(member.as_str(), class.name.as_str()))
            }
            Value::Interface(reference) => self.set_member(Value::Object(reference.object), member, value, pos),
            Value::Record(record) => {
                let ty = record.ty();
                if let Some(field) = ty.field(member) {
                    let value = self.coerce(value, &field.ty)?;
                    record.set_field(member, value.copy_for_assignment());
                    return Ok(());
                }
                if let Some(property) = ty.find_property(member) {
                    return self.write_property(Value::Record(record), &property, Vec::new(), value, pos);
                }
                Err(undefined_member(member.as_str(), ty.name.as_str()))
            }
            Value::Variant(_) => {
                let inner = receiver.unwrap_variant();
                if inner.is_nil() {
                    return Err(nil_dereference(member.as_str()));
                }
                self.set_member(inner, member, value, pos)
            }
            Value::Nil => Err(nil_dereference(member.as_str())),
            Value::Json(_) => Err(EvalError::new("JSON values are read-only")),
            other => Err(undefined_member(member.as_str(), &other.type_name())),
        }
    }
}
