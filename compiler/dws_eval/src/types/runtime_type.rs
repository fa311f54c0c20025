use std::fmt;
use std::rc::Rc;

use dws_ir::{ArrayBounds, Name};

/// A resolved type.
///
/// Nominal types (records, classes, interfaces) are referenced by name and
/// looked up in the [`TypeRegistry`](super::TypeRegistry), so a class may
/// hold fields of its own type.
#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeType {
    Integer,
    Float,
    String,
    Boolean,
    Variant,
    Json,
    Enum(Rc<EnumType>),
    Array(Rc<ArrayType>),
    Record(Name),
    Class(Name),
    Interface(Name),
    /// Procedural types and lambdas.
    Function,
    /// No type information; accepts anything.
    Unknown,
}

impl RuntimeType {
    /// Name used as the key of conversion and operator tables.
    pub fn name(&self) -> Name {
        match self {
            RuntimeType::Enum(e) => e.name.clone(),
            RuntimeType::Record(n) | RuntimeType::Class(n) | RuntimeType::Interface(n) => {
                n.clone()
            }
            other => Name::new(&other.to_string()),
        }
    }

    /// Whether `nil` is a valid value of this type.
    pub fn accepts_nil(&self) -> bool {
        matches!(
            self,
            RuntimeType::Class(_)
                | RuntimeType::Interface(_)
                | RuntimeType::Array(_)
                | RuntimeType::Function
                | RuntimeType::Variant
                | RuntimeType::Json
                | RuntimeType::Unknown
        )
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeType::Integer => write!(f, "Integer"),
            RuntimeType::Float => write!(f, "Float"),
            RuntimeType::String => write!(f, "String"),
            RuntimeType::Boolean => write!(f, "Boolean"),
            RuntimeType::Variant => write!(f, "Variant"),
            RuntimeType::Json => write!(f, "JSON"),
            RuntimeType::Enum(e) => write!(f, "{}", e.name),
            RuntimeType::Array(a) => write!(f, "{a}"),
            RuntimeType::Record(n) | RuntimeType::Class(n) | RuntimeType::Interface(n) => {
                write!(f, "{n}")
            }
            RuntimeType::Function => write!(f, "Function"),
            RuntimeType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Static (`bounds: Some`) or dynamic array type.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayType {
    pub element: RuntimeType,
    pub bounds: Option<ArrayBounds>,
}

impl ArrayType {
    pub fn new(element: RuntimeType, bounds: Option<ArrayBounds>) -> Self {
        ArrayType { element, bounds }
    }

    pub fn dynamic(element: RuntimeType) -> Self {
        ArrayType::new(element, None)
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.bounds.is_some()
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            Some(b) => write!(f, "array[{}..{}] of {}", b.low, b.high, self.element),
            None => write!(f, "array of {}", self.element),
        }
    }
}

/// An enumeration: element names with their ordinals, in declaration order.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumType {
    pub name: Name,
    pub elements: Vec<(Name, i64)>,
}

impl EnumType {
    pub fn element(&self, name: &Name) -> Option<i64> {
        self.elements
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ord)| *ord)
    }

    pub fn element_by_ordinal(&self, ordinal: i64) -> Option<&Name> {
        self.elements
            .iter()
            .find(|(_, o)| *o == ordinal)
            .map(|(n, _)| n)
    }
}
