//! Method calls: receivers, virtual dispatch, constructors and `inherited`.
//!
//! # Static and runtime class
//!
//! A virtual call is resolved in two steps. The method is first looked up
//! on the call site's static class, the type the receiver expression was
//! declared with; the VMT slot it names is then filled from the runtime
//! class. A `reintroduce` between the two opens a new slot, so code typed
//! against the base class still reaches the base slot.
//!
//! The static class comes from the semantic pass when available, else from
//! the declared type of a variable receiver, else it is the runtime class.

use std::rc::Rc;

use dws_ir::ast::{Expr, ExprKind, ParamMode, RoutineKind};
use dws_ir::{Name, Position};

use super::function_call::{CallOutcome, Invocation};
use super::{CallContext, Interpreter};
use crate::errors::{
    abstract_call, arity_mismatch, nil_dereference, undefined_member, EvalError, EvalResult,
};
use crate::types::{ClassInfo, MethodInfo, RecordType, RuntimeType};
use crate::value::{ObjectRef, Value};

impl Interpreter {
    /// Evaluate `object.member(args)`.
    pub(crate) fn call_member(
        &mut self,
        object: &Expr,
        member: &Name,
        arg_exprs: &[Expr],
        pos: Position,
    ) -> EvalResult {
        if let ExprKind::Ident(type_name) = &object.kind {
            if self.env.lookup(type_name).is_none() {
                if let Some(class) = self.types.class(type_name) {
                    return self.call_on_class(class, member, arg_exprs, pos);
                }
                if let Some(record) = self.types.record(type_name) {
                    return self.call_on_record_type(&record, member, arg_exprs, pos);
                }
            }
        }

        let static_class = self.static_class_of(object);
        let Some(receiver) = self.eval_checked(object)? else {
            return Ok(Value::Nil);
        };
        self.call_on_value(receiver, static_class, member, arg_exprs, pos)
    }

    pub(crate) fn call_on_value(
        &mut self,
        receiver: Value,
        static_class: Option<Rc<ClassInfo>>,
        member: &Name,
        arg_exprs: &[Expr],
        pos: Position,
    ) -> EvalResult {
        match receiver {
            Value::Object(object) => {
                self.call_object_method(object, static_class, member, arg_exprs, pos)
            }
            Value::Interface(reference) => {
                self.call_object_method(reference.object, None, member, arg_exprs, pos)
            }
            Value::Record(record) => {
                let ty = record.ty();
                if let Some(method) = ty.find_method(member, arg_exprs.len()) {
                    let receiver = (!method.decl.is_class_method).then_some(Value::Record(record));
                    return self.call_method_exprs(&method, receiver, arg_exprs, pos);
                }
                match record.get_field(member) {
                    Some(field) => self.call_callable_field(&field, arg_exprs, pos),
                    None => Err(undefined_member(member.as_str(), ty.name.as_str())),
                }
            }
            Value::Class(class) => self.call_on_class(class, member, arg_exprs, pos),
            Value::Nil => Err(nil_dereference(member.as_str())),
            Value::Variant(_) => {
                let inner = receiver.unwrap_variant();
                self.call_on_value(inner, static_class, member, arg_exprs, pos)
            }
            other if arg_exprs.is_empty() => self.member_of(other, member, None, pos),
            other => Err(undefined_member(member.as_str(), &other.type_name())),
        }
    }

    fn call_object_method(
        &mut self,
        object: ObjectRef,
        static_class: Option<Rc<ClassInfo>>,
        member: &Name,
        arg_exprs: &[Expr],
        pos: Position,
    ) -> EvalResult {
        let runtime = object.class();
        let static_class = static_class
            .filter(|s| runtime.inherits_from(&s.name))
            .unwrap_or_else(|| Rc::clone(&runtime));
        let arity = arg_exprs.len();

        if let Some(method) = self.resolve_method(&runtime, &static_class, member, arity) {
            return self.call_method_exprs(&method, Some(Value::Object(object)), arg_exprs, pos);
        }
        if let Some(method) = runtime.find_class_method(member, arity) {
            return self.call_method_exprs(&method, Some(Value::Class(runtime)), arg_exprs, pos);
        }
        if let Some(ctor) = runtime.find_constructor(member, arity) {
            // A constructor called on an instance re-runs as a plain method.
            self.call_method_exprs(&ctor, Some(Value::Object(object.clone())), arg_exprs, pos)?;
            return Ok(Value::Object(object));
        }
        if let Some(destructor) = self.destructor_for(&runtime, member) {
            return self.call_method_exprs(&destructor, Some(Value::Object(object)), arg_exprs, pos);
        }
        if member == &self.names.class_name && arity == 0 {
            return Ok(Value::string(runtime.name.as_str()));
        }
        if let Some(field) = object.get_field(member) {
            return self.call_callable_field(&field, arg_exprs, pos);
        }
        if let Some(property) = runtime.find_property(member).filter(|_| arity == 0) {
            return self.read_property(Value::Object(object), &property, Vec::new(), pos);
        }
        Err(undefined_member(member.as_str(), runtime.name.as_str()))
    }

    /// `Free` and the destructor's own name both run the destructor.
    fn destructor_for(&self, class: &ClassInfo, member: &Name) -> Option<Rc<MethodInfo>> {
        class
            .destructor()
            .filter(|d| member == &self.names.free || d.name() == member)
    }

    /// Calls on a class reference: constructors and class methods.
    pub(crate) fn call_on_class(
        &mut self,
        class: Rc<ClassInfo>,
        member: &Name,
        arg_exprs: &[Expr],
        pos: Position,
    ) -> EvalResult {
        let arity = arg_exprs.len();
        if let Some(ctor) = class
            .find_constructor(member, arity)
            .filter(|c| c.arity() == arity)
        {
            return self.construct(class, &ctor, arg_exprs, pos);
        }
        if let Some(method) = class.find_class_method(member, arity) {
            return self.call_method_exprs(&method, Some(Value::Class(class)), arg_exprs, pos);
        }
        if member == &self.names.class_name && arity == 0 {
            return Ok(Value::string(class.name.as_str()));
        }
        if let Some(ctor) = class.find_constructor(member, arity) {
            return Err(arity_mismatch(
                &format!("{}.{}", class.name, member),
                ctor.arity(),
                arity,
            ));
        }
        Err(undefined_member(member.as_str(), class.name.as_str()))
    }

    fn call_on_record_type(
        &mut self,
        record: &Rc<RecordType>,
        member: &Name,
        arg_exprs: &[Expr],
        pos: Position,
    ) -> EvalResult {
        match record.find_method(member, arg_exprs.len()) {
            Some(method) if method.decl.is_class_method => {
                self.call_method_exprs(&method, None, arg_exprs, pos)
            }
            _ => Err(undefined_member(member.as_str(), record.name.as_str())),
        }
    }

    /// Allocate an instance and run a constructor on it.
    #[tracing::instrument(level = "debug", skip_all, fields(class = %class.name))]
    fn construct(
        &mut self,
        class: Rc<ClassInfo>,
        ctor: &Rc<MethodInfo>,
        arg_exprs: &[Expr],
        pos: Position,
    ) -> EvalResult {
        if class.is_abstract {
            return Err(EvalError::new(format!(
                "cannot create an instance of abstract class {}",
                class.name
            )));
        }
        let fields = self.types.instance_fields(&class);
        let object = ObjectRef::new(class, fields);
        self.call_method_exprs(ctor, Some(Value::Object(object.clone())), arg_exprs, pos)?;
        if self.exceptions.is_pending() {
            return Ok(Value::Nil);
        }
        Ok(Value::Object(object))
    }

    /// Call a method of the implicit `Self`. `None` when `Self` has no
    /// member of that name.
    pub(crate) fn call_self_method(
        &mut self,
        receiver: Value,
        name: &Name,
        arg_exprs: &[Expr],
        pos: Position,
    ) -> Result<Option<Value>, EvalError> {
        let arity = arg_exprs.len();
        match &receiver {
            Value::Object(object) => {
                let runtime = object.class();
                let static_class = self
                    .context_class()
                    .filter(|s| runtime.inherits_from(&s.name))
                    .unwrap_or_else(|| Rc::clone(&runtime));
                if let Some(method) = self.resolve_method(&runtime, &static_class, name, arity) {
                    return self
                        .call_method_exprs(&method, Some(receiver.clone()), arg_exprs, pos)
                        .map(Some);
                }
                if let Some(method) = runtime.find_class_method(name, arity) {
                    return self
                        .call_method_exprs(&method, Some(Value::Class(runtime)), arg_exprs, pos)
                        .map(Some);
                }
                if let Some(destructor) = self.destructor_for(&runtime, name) {
                    return self
                        .call_method_exprs(&destructor, Some(receiver.clone()), arg_exprs, pos)
                        .map(Some);
                }
                Ok(None)
            }
            Value::Record(record) => match record.ty().find_method(name, arity) {
                Some(method) => {
                    let receiver = (!method.decl.is_class_method).then(|| receiver.clone());
                    self.call_method_exprs(&method, receiver, arg_exprs, pos)
                        .map(Some)
                }
                None => Ok(None),
            },
            Value::Class(class) => {
                if let Some(method) = class.find_class_method(name, arity) {
                    return self
                        .call_method_exprs(&method, Some(receiver.clone()), arg_exprs, pos)
                        .map(Some);
                }
                if let Some(ctor) = class.find_constructor(name, arity) {
                    return self
                        .construct(Rc::clone(class), &ctor, arg_exprs, pos)
                        .map(Some);
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Static or class method by owner name, with evaluated arguments.
    /// Used by class operators and class-owned conversions.
    pub(crate) fn call_static_method(
        &mut self,
        owner: &Name,
        name: &Name,
        args: Vec<Value>,
        pos: Position,
    ) -> EvalResult {
        let arity = args.len();
        if let Some(class) = self.types.class(owner) {
            if let Some(method) = class.find_class_method(name, arity) {
                return self
                    .call_method(&method, Some(Value::Class(class)), args, pos)
                    .map(|o| o.result);
            }
            return Err(undefined_member(name.as_str(), owner.as_str()));
        }
        if let Some(record) = self.types.record(owner) {
            if let Some(method) = record.find_method(name, arity) {
                return self.call_method(&method, None, args, pos).map(|o| o.result);
            }
        }
        Err(undefined_member(name.as_str(), owner.as_str()))
    }

    /// Pick the implementation to run for `name` on an instance of
    /// `runtime` seen through `static_class`.
    pub(crate) fn resolve_method(
        &self,
        runtime: &Rc<ClassInfo>,
        static_class: &Rc<ClassInfo>,
        name: &Name,
        arity: usize,
    ) -> Option<Rc<MethodInfo>> {
        let (method, slot_class) = match static_class.find_method(name, arity) {
            Some(method) => (method, static_class),
            None => (runtime.find_method(name, arity)?, runtime),
        };
        if !method.is_virtual() {
            return Some(method);
        }
        let key = (method.name().clone(), method.arity());
        let target = runtime.resolve_virtual(slot_class, &key).unwrap_or(method);
        tracing::trace!(
            method = %name,
            static_class = %static_class.name,
            runtime_class = %runtime.name,
            target = %target.owner,
            "virtual dispatch"
        );
        Some(target)
    }

    /// Class whose method is executing, if any.
    fn context_class(&self) -> Option<Rc<ClassInfo>> {
        self.context.owner.as_ref().and_then(|o| self.types.class(o))
    }

    /// Static class of a receiver expression.
    pub(crate) fn static_class_of(&self, expr: &Expr) -> Option<Rc<ClassInfo>> {
        let ty = match &expr.kind {
            _ if self.semantic.is_some() => self.semantic_type(expr),
            ExprKind::Ident(name) if name == &self.names.self_ => return self.context_class(),
            ExprKind::Ident(name) => self.env.declared_type(name),
            _ => None,
        };
        match ty? {
            RuntimeType::Class(name) => self.types.class(&name),
            _ => None,
        }
    }

    /// Evaluate arguments, call, and copy back `var` parameters.
    pub(crate) fn call_method_exprs(
        &mut self,
        method: &Rc<MethodInfo>,
        receiver: Option<Value>,
        arg_exprs: &[Expr],
        pos: Position,
    ) -> EvalResult {
        let Some(args) = self.eval_args(arg_exprs)? else {
            return Ok(Value::Nil);
        };
        let outcome = self.call_method(method, receiver, args, pos)?;
        self.finish_call(&method.decl.params, arg_exprs, outcome)
    }

    pub(crate) fn call_method(
        &mut self,
        method: &Rc<MethodInfo>,
        receiver: Option<Value>,
        args: Vec<Value>,
        pos: Position,
    ) -> Result<CallOutcome, EvalError> {
        let body = match &method.decl.body {
            Some(body) if !method.is_abstract() => body,
            _ => return Err(abstract_call(method.owner.as_str(), method.name().as_str())),
        };
        let invocation = Invocation {
            frame_name: Name::new(&format!("{}.{}", method.owner, method.name())),
            params: &method.decl.params,
            return_type: method.decl.return_type.as_ref(),
            body,
            scope: self.env.global(),
            self_value: receiver,
            context: CallContext {
                routine: Some(Rc::clone(&method.decl)),
                owner: Some(method.owner.clone()),
            },
        };
        self.invoke(invocation, args, pos)
    }

    /// A field or record member holding a function pointer.
    fn call_callable_field(&mut self, field: &Value, arg_exprs: &[Expr], pos: Position) -> EvalResult {
        let Some(args) = self.eval_args(arg_exprs)? else {
            return Ok(Value::Nil);
        };
        self.call_function_value(field, args, pos)
            .map(|outcome| outcome.result)
    }

    /// `inherited` or `inherited Name(args)`: call the parent class's
    /// implementation without virtual dispatch. A bare `inherited` passes
    /// the current routine's own parameters and is a no-op when the parent
    /// has no such method.
    pub(crate) fn eval_inherited(
        &mut self,
        method: Option<&Name>,
        arg_exprs: &[Expr],
        pos: Position,
    ) -> EvalResult {
        let (Some(owner), Some(routine)) = (self.context.owner.clone(), self.context.routine.clone())
        else {
            return Err(EvalError::new("'inherited' used outside a method"));
        };
        let Some(class) = self.types.class(&owner) else {
            return Err(EvalError::new(format!(
                "'inherited' used in a method of {owner}, which has no parent class"
            )));
        };
        let Some(parent) = class.parent.clone() else {
            return Ok(Value::Nil);
        };

        let name = method.cloned().unwrap_or_else(|| routine.name.clone());
        let forward_params = method.is_none() && arg_exprs.is_empty();
        let arity = if forward_params {
            routine.params.len()
        } else {
            arg_exprs.len()
        };
        let target = match routine.kind {
            RoutineKind::Constructor if method.is_none() => parent.find_constructor(&name, arity),
            RoutineKind::Destructor if method.is_none() => parent.destructor(),
            _ => parent
                .find_method(&name, arity)
                .or_else(|| parent.find_constructor(&name, arity))
                .or_else(|| parent.find_class_method(&name, arity)),
        };
        let Some(target) = target else {
            if method.is_none() {
                return Ok(Value::Nil);
            }
            return Err(undefined_member(name.as_str(), parent.name.as_str()));
        };
        if target.is_abstract() {
            return Err(abstract_call(parent.name.as_str(), name.as_str()));
        }

        let receiver = self.self_value();
        if !forward_params {
            return self.call_method_exprs(&target, receiver, arg_exprs, pos);
        }
        let args = routine
            .params
            .iter()
            .map(|p| self.env.lookup(&p.name).unwrap_or(Value::Nil))
            .collect();
        let outcome = self.call_method(&target, receiver, args, pos)?;
        if self.exceptions.is_pending() {
            return Ok(Value::Nil);
        }
        for (param, value) in target.decl.params.iter().zip(outcome.out_args) {
            if param.mode == ParamMode::Var {
                self.assign_variable(&param.name, value)?;
            }
        }
        Ok(outcome.result)
    }
}
