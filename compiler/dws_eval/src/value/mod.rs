//! Runtime values.
//!
//! `Value` is a closed sum over every kind of data a script can hold. Each
//! consumer matches exhaustively, so adding a kind is a compile error at
//! every site that needs to handle it.
//!
//! # Copy vs. reference semantics
//!
//! - Scalars, strings and enums are plain values.
//! - Objects, interfaces, dynamic arrays, function pointers and JSON nodes
//!   alias on assignment (`Clone` is an `Rc` bump).
//! - Static arrays and records have value semantics. Their storage is still
//!   shared (`Rc<RefCell<_>>`) so that `a[i] := v` and `p.X := v` mutate the
//!   bound location in place; every slot write goes through
//!   [`Value::copy_for_assignment`], which deep-copies them.

mod array;
mod exception;
mod function;
mod json;
mod object;
mod record;
mod variant;

pub use array::ArrayValue;
pub use exception::ExceptionValue;
pub use function::{Closure, FunctionPointer};
pub use json::{to_json, unwrap_json};
pub use object::{InterfaceValue, ObjectInstance, ObjectRef};
pub use record::RecordValue;
pub use variant::VariantValue;

use std::fmt;
use std::rc::Rc;

use dws_ir::Name;

use crate::types::ClassInfo;

/// An element of a declared enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: Name,
    pub element: Name,
    pub ordinal: i64,
}

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Boolean(bool),
    /// Unset object, interface, function pointer or array slot.
    Nil,
    Enum(EnumValue),
    Array(ArrayValue),
    Record(RecordValue),
    Object(ObjectRef),
    Interface(InterfaceValue),
    /// A class reference (`TFoo` used as a value, `class of TFoo`).
    Class(Rc<ClassInfo>),
    Function(FunctionPointer),
    Variant(Rc<VariantValue>),
    Json(Rc<serde_json::Value>),
}

impl Value {
    #[inline]
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Box a value into a Variant slot.
    pub fn variant(value: Value) -> Self {
        match value {
            Value::Variant(_) => value,
            other => Value::Variant(Rc::new(VariantValue::Assigned(other.copy_for_assignment()))),
        }
    }

    /// The initial state of a Variant slot.
    pub fn unassigned() -> Self {
        Value::Variant(Rc::new(VariantValue::Unassigned))
    }

    pub fn json(node: serde_json::Value) -> Self {
        Value::Json(Rc::new(node))
    }

    /// Name of this value's runtime type, as used in diagnostics and as the
    /// key of operator and conversion tables.
    pub fn type_name(&self) -> String {
        match self {
            Value::Integer(_) => "Integer".to_string(),
            Value::Float(_) => "Float".to_string(),
            Value::String(_) => "String".to_string(),
            Value::Boolean(_) => "Boolean".to_string(),
            Value::Nil => "Nil".to_string(),
            Value::Enum(e) => e.type_name.to_string(),
            Value::Array(a) => a.ty().to_string(),
            Value::Record(r) => r.type_name().to_string(),
            Value::Object(o) => o.class_name().to_string(),
            Value::Interface(i) => i.info.name.to_string(),
            Value::Class(c) => format!("class of {}", c.name),
            Value::Function(_) => "Function".to_string(),
            Value::Variant(_) => "Variant".to_string(),
            Value::Json(_) => "JSON".to_string(),
        }
    }

    /// The value's type name followed by its ancestors' (objects only).
    ///
    /// Operator lookup accepts an operand whose chain contains the declared
    /// operand type.
    pub fn type_chain(&self) -> Vec<Name> {
        match self {
            Value::Object(o) => o.class().ancestry().map(|c| c.name.clone()).collect(),
            Value::Interface(i) => vec![i.info.name.clone()],
            other => vec![Name::new(&other.type_name())],
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Whether this kind may be stored in a slot that allows `nil`.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Value::Object(_) | Value::Interface(_) | Value::Class(_) | Value::Function(_)
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer or enum ordinal, the two kinds accepted as an array index.
    pub fn as_ordinal(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Enum(e) => Some(e.ordinal),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Strip a Variant wrapper. Unassigned and Null become `Nil`.
    pub fn unwrap_variant(self) -> Value {
        match self {
            Value::Variant(v) => match &*v {
                VariantValue::Assigned(inner) => inner.clone().unwrap_variant(),
                VariantValue::Unassigned | VariantValue::Null => Value::Nil,
            },
            other => other,
        }
    }

    /// The value to store when assigning into a slot.
    ///
    /// Deep-copies static arrays and records; everything else is returned
    /// as an alias.
    pub fn copy_for_assignment(&self) -> Value {
        match self {
            Value::Array(a) if a.is_static() => Value::Array(a.deep_copy()),
            Value::Record(r) => Value::Record(r.deep_copy()),
            other => other.clone(),
        }
    }

    /// Script truthiness for conditions.
    pub fn is_truthy(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Variant(_) | Value::Json(_) => self.clone().unwrap_variant_or_json().as_bool(),
            Value::Integer(_)
            | Value::Float(_)
            | Value::String(_)
            | Value::Nil
            | Value::Enum(_)
            | Value::Array(_)
            | Value::Record(_)
            | Value::Object(_)
            | Value::Interface(_)
            | Value::Class(_)
            | Value::Function(_) => None,
        }
    }

    /// Unwrap Variant boxes and JSON scalars down to a plain value.
    pub fn unwrap_variant_or_json(self) -> Value {
        match self.unwrap_variant() {
            Value::Json(node) => unwrap_json(&node),
            other => other,
        }
    }
}

/// Format a Float the way `FloatToStr` does: integral values print without
/// a fraction.
pub fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.0}")
    } else {
        format!("{f}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::String(s) => write!(f, "{s}"),
            Value::Boolean(true) => write!(f, "True"),
            Value::Boolean(false) => write!(f, "False"),
            Value::Nil => write!(f, "nil"),
            Value::Enum(e) => write!(f, "{}", e.element),
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, elem) in a.elements().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, "]")
            }
            Value::Record(r) => {
                write!(f, "(")?;
                for (i, (name, value)) in r.fields().iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, ")")
            }
            Value::Object(o) => write!(f, "{}", o.class_name()),
            Value::Interface(i) => write!(f, "{}", i.object.class_name()),
            Value::Class(c) => write!(f, "{}", c.name),
            Value::Function(fp) => write!(f, "{}", fp.display_name()),
            Value::Variant(v) => match &**v {
                VariantValue::Assigned(inner) => write!(f, "{inner}"),
                VariantValue::Unassigned => Ok(()),
                VariantValue::Null => write!(f, "Null"),
            },
            Value::Json(node) => match &**node {
                serde_json::Value::String(s) => write!(f, "{s}"),
                other => write!(f, "{other}"),
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Nil => write!(f, "Nil"),
            Value::Enum(e) => write!(f, "Enum({}.{})", e.type_name, e.element),
            Value::Array(a) => write!(f, "Array({}: {:?})", a.ty(), a.elements()),
            Value::Record(r) => write!(f, "Record({}: {self})", r.type_name()),
            Value::Object(o) => write!(f, "Object({})", o.class_name()),
            Value::Interface(i) => write!(f, "Interface({} of {})", i.info.name, i.object.class_name()),
            Value::Class(c) => write!(f, "Class({})", c.name),
            Value::Function(fp) => write!(f, "Function({})", fp.display_name()),
            Value::Variant(v) => write!(f, "Variant({v:?})"),
            Value::Json(node) => write!(f, "Json({node})"),
        }
    }
}

/// Structural equality, used by tests and by `case` label matching.
///
/// Objects and interfaces compare by identity; containers compare by
/// content. Script-level `=` lives in the operator module.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b) || a.elements() == b.elements(),
            (Value::Record(a), Value::Record(b)) => {
                a.ptr_eq(b) || (a.type_name() == b.type_name() && a.fields() == b.fields())
            }
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Interface(a), Value::Interface(b)) => a.object.ptr_eq(&b.object),
            (Value::Class(a), Value::Class(b)) => a.name == b.name,
            (Value::Function(a), Value::Function(b)) => a.same_target(b),
            (Value::Variant(a), Value::Variant(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}
