//! Indexing: `a[i]`, `a[i, j]`, `a[i][j]`, indexed and default
//! properties, strings and JSON values.
//!
//! An index chain is flattened first so that `obj.Prop[i, j]` and
//! `obj.Prop[i][j]` reach a two-parameter property getter with both
//! indices. Everything else is indexed one level at a time, left to right.

use std::rc::Rc;

use dws_ir::ast::{Expr, ExprKind};
use dws_ir::{Name, Position};

use super::Interpreter;
use crate::errors::{
    arity_mismatch, cannot_index, index_out_of_bounds, invalid_index_type, json_index_type,
    nil_dereference, string_index_out_of_bounds, type_mismatch, EvalError, EvalResult,
};
use crate::types::PropertyInfo;
use crate::value::{unwrap_json, Value};

/// Split `base[i][j]` into `base` and `[i, j]`, outermost index last.
fn flatten_index(expr: &Expr) -> (&Expr, Vec<&Expr>) {
    let mut indices = Vec::new();
    let mut current = expr;
    while let ExprKind::Index { base, index } = &current.kind {
        indices.push(&**index);
        current = base;
    }
    indices.reverse();
    (current, indices)
}

/// Indexed property `name` of an object, interface or record.
fn indexed_property(receiver: &Value, name: &Name) -> Option<Rc<PropertyInfo>> {
    let property = match receiver {
        Value::Object(object) => object.class().find_property(name),
        Value::Interface(reference) => reference.object.class().find_property(name),
        Value::Record(record) => record.ty().find_property(name),
        _ => None,
    }?;
    property.is_indexed().then_some(property)
}

fn default_property(receiver: &Value) -> Option<Rc<PropertyInfo>> {
    match receiver {
        Value::Object(object) => object.class().default_property(),
        Value::Interface(reference) => reference.object.class().default_property(),
        Value::Record(record) => record.ty().default_property(),
        _ => None,
    }
}

/// One step along an index chain: how many indices it consumes and
/// whether a property getter or setter handles them.
enum Step {
    Property(Rc<PropertyInfo>),
    Element,
}

impl Step {
    fn of(container: &Value) -> Self {
        match default_property(container) {
            Some(property) => Step::Property(property),
            None => Step::Element,
        }
    }

    fn width(&self) -> usize {
        match self {
            Step::Property(property) => property.index_params.len().max(1),
            Step::Element => 1,
        }
    }
}

impl Interpreter {
    pub(crate) fn eval_index(&mut self, expr: &Expr) -> EvalResult {
        let (root, indices) = flatten_index(expr);
        let Some((mut current, mut next)) = self.index_root(root, &indices, expr.pos)? else {
            return Ok(Value::Nil);
        };
        while next < indices.len() {
            let step = Step::of(&current);
            let Some(args) = self.eval_indices(&indices[next..], step.width())? else {
                return Ok(Value::Nil);
            };
            next += args.len();
            current = match step {
                Step::Property(property) => self.read_property(current, &property, args, expr.pos)?,
                Step::Element => self.index_value(current, args.into_iter().next().unwrap_or(Value::Nil))?,
            };
            if self.exceptions.is_pending() {
                return Ok(Value::Nil);
            }
        }
        Ok(current)
    }

    /// Write `value` through an index chain.
    pub(crate) fn assign_index(&mut self, target: &Expr, value: Value) -> Result<(), EvalError> {
        let (root, indices) = flatten_index(target);

        if let ExprKind::Member { object, member } = &root.kind {
            let Some(receiver) = self.eval_checked(object)? else {
                return Ok(());
            };
            if let Some(property) = indexed_property(&receiver, member) {
                let width = property.index_params.len();
                if indices.len() == width {
                    let Some(args) = self.eval_indices(&indices, width)? else {
                        return Ok(());
                    };
                    return self.write_property(receiver, &property, args, value, target.pos);
                }
            }
            let Some((container, next)) =
                self.index_member_root(receiver, member, &indices, target.pos)?
            else {
                return Ok(());
            };
            return self.assign_along(target, container, &indices[next..], value);
        }

        let Some(container) = self.eval_checked(root)? else {
            return Ok(());
        };
        self.assign_along(target, container, &indices, value)
    }

    /// Walk `indices` from `container`, reading every step but the last and
    /// writing `value` at the last.
    fn assign_along(
        &mut self,
        target: &Expr,
        mut container: Value,
        indices: &[&Expr],
        value: Value,
    ) -> Result<(), EvalError> {
        let mut next = 0;
        loop {
            if let Value::Variant(_) = container {
                container = container.unwrap_variant();
            }
            let step = Step::of(&container);
            let Some(args) = self.eval_indices(&indices[next..], step.width())? else {
                return Ok(());
            };
            next += args.len();
            let last = next >= indices.len();

            match step {
                Step::Property(property) if last => {
                    return self.write_property(container, &property, args, value, target.pos);
                }
                Step::Property(property) => {
                    container = self.read_property(container, &property, args, target.pos)?;
                }
                Step::Element => {
                    let index = args.into_iter().next().unwrap_or(Value::Nil);
                    if last {
                        return self.store_element(target, container, index, value);
                    }
                    container = self.index_value(container, index)?;
                }
            }
            if self.exceptions.is_pending() {
                return Ok(());
            }
        }
    }

    fn store_element(&mut self, target: &Expr, container: Value, index: Value, value: Value) -> Result<(), EvalError> {
        match container {
            Value::Array(array) => {
                let i = ordinal_index(&index)?;
                let offset = array.offset_of(i).map_err(|(low, high)| index_out_of_bounds(i, low, high))?;
                let element_type = array.ty().element.clone();
                let value = self.coerce(value, &element_type)?;
                array.set(offset, value.copy_for_assignment());
                Ok(())
            }
            Value::String(s) => {
                let i = ordinal_index(&index)?;
                let replacement = value.unwrap_variant_or_json();
                let Some(replacement) = replacement.as_str() else {
                    return Err(type_mismatch("Char", &replacement.type_name()));
                };
                let len = s.chars().count();
                let offset = char_offset(i)
                    .filter(|o| *o < len)
                    .ok_or_else(|| string_index_out_of_bounds(i, len))?;
                let updated: String = s
                    .chars()
                    .enumerate()
                    .map(|(n, c)| if n == offset { replacement.to_string() } else { c.to_string() })
                    .collect();
                let ExprKind::Index { base, .. } = &target.kind else {
                    return Err(cannot_index("String"));
                };
                self.assign_to(base, Value::string(updated))
            }
            Value::Json(_) => Err(EvalError::new("JSON values are read-only")),
            Value::Nil => Err(nil_dereference("[]")),
            other => Err(cannot_index(&other.type_name())),
        }
    }

    /// Evaluate the root of an index chain. An indexed property at the root
    /// consumes as many indices as it declares.
    fn index_root(
        &mut self,
        root: &Expr,
        indices: &[&Expr],
        pos: Position,
    ) -> Result<Option<(Value, usize)>, EvalError> {
        if let ExprKind::Member { object, member } = &root.kind {
            let Some(receiver) = self.eval_checked(object)? else {
                return Ok(None);
            };
            return self.index_member_root(receiver, member, indices, pos);
        }
        Ok(self.eval_checked(root)?.map(|value| (value, 0)))
    }

    fn index_member_root(
        &mut self,
        receiver: Value,
        member: &Name,
        indices: &[&Expr],
        pos: Position,
    ) -> Result<Option<(Value, usize)>, EvalError> {
        if let Some(property) = indexed_property(&receiver, member) {
            let width = property.index_params.len();
            if indices.len() < width {
                return Err(arity_mismatch(property.name.as_str(), width, indices.len()));
            }
            let Some(args) = self.eval_indices(indices, width)? else {
                return Ok(None);
            };
            let value = self.read_property(receiver, &property, args, pos)?;
            return Ok((!self.exceptions.is_pending()).then_some((value, width)));
        }
        let value = self.member_of(receiver, member, None, pos)?;
        Ok((!self.exceptions.is_pending()).then_some((value, 0)))
    }

    /// Evaluate the next `width` indices; fewer available is an error.
    fn eval_indices(&mut self, indices: &[&Expr], width: usize) -> Result<Option<Vec<Value>>, EvalError> {
        if indices.len() < width {
            return Err(arity_mismatch("[]", width, indices.len()));
        }
        let mut values = Vec::with_capacity(width);
        for index in &indices[..width] {
            match self.eval_checked(index)? {
                Some(value) => values.push(value),
                None => return Ok(None),
            }
        }
        Ok(Some(values))
    }

    /// `base[index]` for an evaluated base and index.
    pub(crate) fn index_value(&mut self, base: Value, index: Value) -> EvalResult {
        match base {
            Value::Json(node) => json_index(&node, &index),
            Value::Variant(_) => self.index_value(base.unwrap_variant(), index),
            Value::Array(array) => {
                let i = ordinal_index(&index)?;
                let offset = array.offset_of(i).map_err(|(low, high)| index_out_of_bounds(i, low, high))?;
                match array.get(offset) {
                    Some(Value::Nil) | None => Ok(self.types.zero_value(&array.ty().element)),
                    Some(element) => Ok(element),
                }
            }
            Value::String(s) => {
                let i = ordinal_index(&index)?;
                let len = s.chars().count();
                char_offset(i)
                    .and_then(|offset| s.chars().nth(offset))
                    .map(|c| Value::string(c.to_string()))
                    .ok_or_else(|| string_index_out_of_bounds(i, len))
            }
            Value::Nil => Err(nil_dereference("[]")),
            other => Err(cannot_index(&other.type_name())),
        }
    }
}

fn ordinal_index(index: &Value) -> Result<i64, EvalError> {
    let index = index.clone().unwrap_variant_or_json();
    index
        .as_ordinal()
        .ok_or_else(|| invalid_index_type(&index.type_name()))
}

/// Zero-based offset of the 1-based string index `i`.
fn char_offset(i: i64) -> Option<usize> {
    i.checked_sub(1).and_then(|o| usize::try_from(o).ok())
}

/// String keys index objects and integers index arrays. A missing key or
/// element reads as `nil`; any other pairing is an error.
fn json_index(node: &serde_json::Value, index: &Value) -> EvalResult {
    let index = index.clone().unwrap_variant();
    match node {
        serde_json::Value::Object(map) => match index {
            Value::String(key) => Ok(map.get(&*key).map_or(Value::Nil, unwrap_json)),
            _ => Err(json_index_type("object", "a string")),
        },
        serde_json::Value::Array(items) => match index {
            Value::Integer(i) => Ok(usize::try_from(i)
                .ok()
                .and_then(|i| items.get(i))
                .map_or(Value::Nil, unwrap_json)),
            _ => Err(json_index_type("array", "an integer")),
        },
        scalar => Err(cannot_index(&format!("JSON {}", json_kind(scalar)))),
    }
}

fn json_kind(node: &serde_json::Value) -> &'static str {
    match node {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests;
