//! Expression evaluation: dispatch, identifiers, member reads, type tests,
//! lambdas and function references.

use std::rc::Rc;

use dws_ir::ast::{Expr, ExprKind, LambdaExpr};
use dws_ir::{Name, Position};
use dws_stack::ensure_sufficient_stack;

use super::{Interpreter, KnownNames};
use crate::errors::{
    invalid_cast, nil_dereference, undefined_member, undefined_type, undefined_variable, EvalError,
    EvalResult,
};
use crate::types::{ClassInfo, MethodInfo, RuntimeType};
use crate::value::{
    unwrap_json, Closure, EnumValue, FunctionPointer, InterfaceValue, ObjectRef, Value,
};

impl Interpreter {
    /// Evaluate an expression.
    ///
    /// Returns `Nil` without evaluating anything while a script exception
    /// is pending.
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        if self.exceptions.is_pending() {
            return Ok(Value::Nil);
        }
        ensure_sufficient_stack(|| self.eval_expr_inner(expr)).map_err(|e| e.at(expr.pos))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Int(n) => Ok(Value::Integer(*n)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(s) => Ok(Value::string(s)),
            ExprKind::Bool(b) => Ok(Value::Boolean(*b)),
            ExprKind::Nil => Ok(Value::Nil),
            ExprKind::Ident(name) => self.eval_ident(name, expr.pos),
            ExprKind::Binary { op, left, right } => self.eval_binary_expr(*op, left, right, expr.pos),
            ExprKind::Unary { op, operand } => self.eval_unary_expr(*op, operand, expr.pos),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, expr.pos),
            ExprKind::Member { object, member } => self.eval_member(object, member, expr.pos),
            ExprKind::Index { .. } => self.eval_index(expr),
            ExprKind::ArrayLit {
                elements,
                annotation,
            } => {
                let expected = self.semantic_type(expr);
                self.eval_array_literal(elements, annotation.as_ref(), expected.as_ref())
            }
            ExprKind::RecordLit { type_name, fields } => {
                let expected = self.semantic_type(expr);
                self.eval_record_literal(type_name.as_ref(), fields, expected.as_ref())
            }
            ExprKind::Lambda(lambda) => Ok(self.make_closure(lambda)),
            ExprKind::AddressOf(target) => self.eval_address_of(target, expr.pos),
            ExprKind::Is { expr: inner, type_name } => self.eval_is(inner, type_name),
            ExprKind::As { expr: inner, type_name } => self.eval_as(inner, type_name),
            ExprKind::Implements { expr: inner, interface } => {
                self.eval_implements(inner, interface)
            }
            ExprKind::Inherited { method, args } => {
                self.eval_inherited(method.as_ref(), args, expr.pos)
            }
        }
    }

    /// Evaluate with a known target type. Array and record literals take
    /// their type from it; everything else evaluates as usual.
    pub(crate) fn eval_expected(&mut self, expr: &Expr, expected: Option<&RuntimeType>) -> EvalResult {
        if self.exceptions.is_pending() {
            return Ok(Value::Nil);
        }
        match &expr.kind {
            ExprKind::ArrayLit {
                elements,
                annotation,
            } => {
                let fallback = self.semantic_type(expr);
                self.eval_array_literal(elements, annotation.as_ref(), expected.or(fallback.as_ref()))
                    .map_err(|e| e.at(expr.pos))
            }
            ExprKind::RecordLit { type_name, fields } => {
                let fallback = self.semantic_type(expr);
                self.eval_record_literal(type_name.as_ref(), fields, expected.or(fallback.as_ref()))
                    .map_err(|e| e.at(expr.pos))
            }
            _ => self.eval_expr(expr),
        }
    }

    /// Resolve a bare identifier: variable, `ExceptObject`, member of the
    /// implicit `Self`, enum element, class reference, then a routine
    /// called without parentheses.
    fn eval_ident(&mut self, name: &Name, pos: Position) -> EvalResult {
        if let Some(value) = self.env.lookup(name) {
            return Ok(value);
        }
        if name == &self.names.except_object {
            return Ok(self
                .exceptions
                .current_object()
                .map_or(Value::Nil, |e| Value::Object(e.instance.clone())));
        }
        if let Some(receiver) = self.self_value() {
            if let Some(value) = self.self_member(receiver, name, pos)? {
                return Ok(value);
            }
        }
        if let Some(element) = self.types.enum_element(name) {
            return Ok(Value::Enum(element));
        }
        if let Some(class) = self.types.class(name) {
            return Ok(Value::Class(class));
        }
        let callable = self.functions.contains_key(name)
            || self.builtins.lookup(name).is_some()
            || self.externals.read().contains(name);
        if callable {
            return self.call_named(name, &[], pos);
        }
        Err(undefined_variable(name.as_str()))
    }

    /// Field, property or parameterless method of `Self`.
    fn self_member(&mut self, receiver: Value, name: &Name, pos: Position) -> Result<Option<Value>, EvalError> {
        match &receiver {
            Value::Object(object) => {
                if let Some(value) = object.get_field(name) {
                    return Ok(Some(value));
                }
                if let Some(property) = object.class().find_property(name) {
                    if !property.is_indexed() {
                        return self.read_property(receiver, &property, Vec::new(), pos).map(Some);
                    }
                }
            }
            Value::Record(record) => {
                if let Some(value) = record.get_field(name) {
                    return Ok(Some(value));
                }
                if let Some(property) = record.ty().find_property(name) {
                    if !property.is_indexed() {
                        return self.read_property(receiver, &property, Vec::new(), pos).map(Some);
                    }
                }
            }
            _ => {}
        }
        self.call_self_method(receiver, name, &[], pos)
    }

    /// `object.member` without a call.
    fn eval_member(&mut self, object: &Expr, member: &Name, pos: Position) -> EvalResult {
        if let ExprKind::Ident(type_name) = &object.kind {
            if self.env.lookup(type_name).is_none() {
                if let Some(enum_type) = self.types.enum_type(type_name) {
                    return match enum_type.element(member) {
                        Some(ordinal) => Ok(Value::Enum(EnumValue {
                            type_name: enum_type.name.clone(),
                            element: member.clone(),
                            ordinal,
                        })),
                        None => Err(undefined_member(member.as_str(), type_name.as_str())),
                    };
                }
                if self.types.record(type_name).is_some() {
                    return self.call_member(object, member, &[], pos);
                }
            }
        }
        let static_class = self.static_class_of(object);
        let Some(value) = self.eval_checked(object)? else {
            return Ok(Value::Nil);
        };
        self.member_of(value, member, static_class, pos)
    }

    /// Read `member` of an evaluated value.
    pub(crate) fn member_of(
        &mut self,
        value: Value,
        member: &Name,
        static_class: Option<Rc<ClassInfo>>,
        pos: Position,
    ) -> EvalResult {
        match value {
            Value::Object(object) => self.object_member(object, member, static_class, pos),
            Value::Interface(reference) => self.object_member(reference.object, member, None, pos),
            Value::Record(record) => {
                if let Some(field) = record.get_field(member) {
                    return Ok(field);
                }
                if let Some(property) = record.ty().find_property(member) {
                    return self.read_property(Value::Record(record), &property, Vec::new(), pos);
                }
                self.call_on_value(Value::Record(record), None, member, &[], pos)
            }
            Value::Class(class) => self.call_on_class(class, member, &[], pos),
            Value::Json(node) => Ok(json_member(&node, member, &self.names)),
            Value::Array(array) => {
                let (low, high) = array.bounds();
                if member == &self.names.length || member == &self.names.count {
                    Ok(Value::Integer(i64::try_from(array.len()).unwrap_or(i64::MAX)))
                } else if member == &self.names.low {
                    Ok(Value::Integer(low))
                } else if member == &self.names.high {
                    Ok(Value::Integer(high))
                } else {
                    Err(undefined_member(member.as_str(), &array.ty().to_string()))
                }
            }
            Value::String(s) if member == &self.names.length => {
                Ok(Value::Integer(i64::try_from(s.chars().count()).unwrap_or(i64::MAX)))
            }
            Value::Variant(_) => {
                let inner = value.unwrap_variant();
                if inner.is_nil() {
                    return Err(nil_dereference(member.as_str()));
                }
                self.member_of(inner, member, static_class, pos)
            }
            Value::Nil => Err(nil_dereference(member.as_str())),
            other => Err(undefined_member(member.as_str(), &other.type_name())),
        }
    }

    /// Field, then property, then anything callable without arguments.
    fn object_member(
        &mut self,
        object: ObjectRef,
        member: &Name,
        static_class: Option<Rc<ClassInfo>>,
        pos: Position,
    ) -> EvalResult {
        if let Some(field) = object.get_field(member) {
            return Ok(field);
        }
        if let Some(property) = object.class().find_property(member) {
            return self.read_property(Value::Object(object), &property, Vec::new(), pos);
        }
        self.call_on_value(Value::Object(object), static_class, member, &[], pos)
    }

    fn make_closure(&self, lambda: &Rc<LambdaExpr>) -> Value {
        Value::Function(FunctionPointer::Lambda(Rc::new(Closure {
            decl: Rc::clone(lambda),
            scope: self.env.current_scope(),
        })))
    }

    /// `@Name` or `@object.Method`.
    fn eval_address_of(&mut self, target: &Expr, pos: Position) -> EvalResult {
        match &target.kind {
            ExprKind::Ident(name) => {
                if let Some(value) = self.env.lookup(name) {
                    return Ok(value);
                }
                if let Some(decl) = self.functions.get(name).and_then(|d| d.first()) {
                    return Ok(Value::Function(FunctionPointer::Routine(Rc::clone(decl))));
                }
                if let Some(receiver) = self.self_value() {
                    if let Some(pointer) = self.bind_method(&receiver, name, None) {
                        return Ok(pointer);
                    }
                }
                if self.builtins.lookup(name).is_some() {
                    return Ok(Value::Function(FunctionPointer::Builtin(name.clone())));
                }
                if self.externals.read().contains(name) {
                    return Ok(Value::Function(FunctionPointer::External(name.clone())));
                }
                Err(undefined_variable(name.as_str()))
            }
            ExprKind::Member { object, member } => {
                let static_class = self.static_class_of(object);
                let Some(receiver) = self.eval_checked(object)? else {
                    return Ok(Value::Nil);
                };
                if let Some(pointer) = self.bind_method(&receiver, member, static_class) {
                    return Ok(pointer);
                }
                match receiver {
                    Value::Nil => Err(nil_dereference(member.as_str())),
                    other => self.member_of(other, member, None, pos),
                }
            }
            _ => self.eval_expr(target),
        }
    }

    /// A method pointer bound to `receiver`, resolved the way a call
    /// without arguments would be.
    fn bind_method(
        &self,
        receiver: &Value,
        name: &Name,
        static_class: Option<Rc<ClassInfo>>,
    ) -> Option<Value> {
        let (method, bound): (Rc<MethodInfo>, Value) = match receiver {
            Value::Object(object) => {
                let runtime = object.class();
                let static_class = static_class
                    .filter(|s| runtime.inherits_from(&s.name))
                    .unwrap_or_else(|| Rc::clone(&runtime));
                match self.resolve_method(&runtime, &static_class, name, 0) {
                    Some(method) => (method, receiver.clone()),
                    None => (runtime.find_class_method(name, 0)?, Value::Class(runtime)),
                }
            }
            Value::Interface(reference) => {
                let runtime = reference.object.class();
                let method = self.resolve_method(&runtime, &runtime, name, 0)?;
                (method, Value::Object(reference.object.clone()))
            }
            Value::Record(record) => (record.ty().find_method(name, 0)?, receiver.clone()),
            Value::Class(class) => (class.find_class_method(name, 0)?, receiver.clone()),
            _ => return None,
        };
        Some(Value::Function(FunctionPointer::Method {
            method,
            receiver: Box::new(bound),
        }))
    }

    /// `expr is T`: class ancestry for classes, implementation for
    /// interfaces. `nil` is never an instance.
    fn eval_is(&mut self, inner: &Expr, type_name: &Name) -> EvalResult {
        let Some(value) = self.eval_checked(inner)? else {
            return Ok(Value::Nil);
        };
        let class = match value.unwrap_variant() {
            Value::Object(object) => object.class(),
            Value::Interface(reference) => reference.object.class(),
            Value::Class(class) => class,
            _ => return Ok(Value::Boolean(false)),
        };
        if self.types.class(type_name).is_some() {
            return Ok(Value::Boolean(class.inherits_from(type_name)));
        }
        if let Some(interface) = self.types.interface(type_name) {
            return Ok(Value::Boolean(self.class_implements(&class, &interface)));
        }
        Err(undefined_type(type_name.as_str()))
    }

    /// `expr as T`. A failed cast is an error; `nil` casts to `nil`.
    fn eval_as(&mut self, inner: &Expr, type_name: &Name) -> EvalResult {
        let Some(value) = self.eval_checked(inner)? else {
            return Ok(Value::Nil);
        };
        let object = match value.unwrap_variant() {
            Value::Nil => return Ok(Value::Nil),
            Value::Object(object) => object,
            Value::Interface(reference) => reference.object,
            other => return Err(invalid_cast(&other.type_name(), type_name.as_str())),
        };
        let class = object.class();
        if self.types.class(type_name).is_some() {
            if class.inherits_from(type_name) {
                return Ok(Value::Object(object));
            }
            return Err(invalid_cast(class.name.as_str(), type_name.as_str()));
        }
        if let Some(info) = self.types.interface(type_name) {
            if self.class_implements(&class, &info) {
                return Ok(Value::Interface(InterfaceValue { info, object }));
            }
            return Err(invalid_cast(class.name.as_str(), type_name.as_str()));
        }
        Err(undefined_type(type_name.as_str()))
    }

    fn eval_implements(&mut self, inner: &Expr, interface: &Name) -> EvalResult {
        let Some(value) = self.eval_checked(inner)? else {
            return Ok(Value::Nil);
        };
        let Some(info) = self.types.interface(interface) else {
            return Err(undefined_type(interface.as_str()));
        };
        let class = match value.unwrap_variant() {
            Value::Object(object) => object.class(),
            Value::Interface(reference) => reference.object.class(),
            Value::Class(class) => class,
            _ => return Ok(Value::Boolean(false)),
        };
        Ok(Value::Boolean(self.class_implements(&class, &info)))
    }
}

/// `node.member` on a JSON value: object keys, plus `Length`/`Count` on
/// arrays. Missing members read as `nil`.
fn json_member(node: &serde_json::Value, member: &Name, names: &KnownNames) -> Value {
    match node {
        serde_json::Value::Object(map) => map
            .iter()
            .find(|(key, _)| member.is(key))
            .map_or(Value::Nil, |(_, child)| unwrap_json(child)),
        serde_json::Value::Array(items) if member == &names.length || member == &names.count => {
            Value::Integer(i64::try_from(items.len()).unwrap_or(i64::MAX))
        }
        _ => Value::Nil,
    }
}
