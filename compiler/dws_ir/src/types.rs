//! Type expressions as written in declarations and annotations.

use std::fmt;

use crate::Name;

/// Inclusive bounds of a static array type, `array[low..high]`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArrayBounds {
    pub low: i64,
    pub high: i64,
}

impl ArrayBounds {
    pub const fn new(low: i64, high: i64) -> Self {
        ArrayBounds { low, high }
    }

    /// Number of elements, zero when `high < low`.
    pub fn len(self) -> usize {
        usize::try_from(self.high.saturating_sub(self.low).saturating_add(1)).unwrap_or(0)
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn contains(self, index: i64) -> bool {
        index >= self.low && index <= self.high
    }
}

/// A type reference.
#[derive(Clone, PartialEq, Debug)]
pub enum TypeExpr {
    /// A named type: builtin (`Integer`, `Variant`, ...) or user-declared.
    Named(Name),
    /// `array of T` (dynamic, `bounds: None`) or `array[lo..hi] of T`.
    Array {
        bounds: Option<ArrayBounds>,
        element: Box<TypeExpr>,
    },
    /// Procedural type: `function(Integer): String`, `procedure(String)`.
    Function {
        params: Vec<TypeExpr>,
        result: Option<Box<TypeExpr>>,
    },
}

impl TypeExpr {
    pub fn named(name: &str) -> Self {
        TypeExpr::Named(Name::new(name))
    }

    pub fn dynamic_array(element: TypeExpr) -> Self {
        TypeExpr::Array {
            bounds: None,
            element: Box::new(element),
        }
    }

    pub fn static_array(low: i64, high: i64, element: TypeExpr) -> Self {
        TypeExpr::Array {
            bounds: Some(ArrayBounds::new(low, high)),
            element: Box::new(element),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => write!(f, "{name}"),
            TypeExpr::Array {
                bounds: Some(b),
                element,
            } => write!(f, "array[{}..{}] of {element}", b.low, b.high),
            TypeExpr::Array {
                bounds: None,
                element,
            } => write!(f, "array of {element}"),
            TypeExpr::Function { params, result } => {
                let keyword = if result.is_some() {
                    "function"
                } else {
                    "procedure"
                };
                write!(f, "{keyword}(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")?;
                if let Some(r) = result {
                    write!(f, ": {r}")?;
                }
                Ok(())
            }
        }
    }
}
