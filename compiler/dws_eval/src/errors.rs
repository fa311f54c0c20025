//! Evaluator-internal errors.
//!
//! `EvalError` is the interpreter's failure channel for malformed programs
//! and runtime type errors: it travels through `Err` and every evaluation
//! site propagates it with `?`. Script-level exceptions (`raise`, `try`) do
//! NOT use this channel; they live in the interpreter's exception state.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` gives each failure a typed category. The factory
//! functions below are the public API; they populate both `kind` and the
//! rendered `message`.

use std::fmt;

use dws_ir::{BinaryOp, Position, UnaryOp};

use crate::value::{ExceptionValue, Value};

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Operators
    InvalidBinaryOp {
        left: String,
        op: BinaryOp,
        right: String,
    },
    InvalidUnaryOp {
        op: UnaryOp,
        operand: String,
    },
    IntegerOverflow {
        operation: &'static str,
    },
    /// Integer `div`/`mod` by zero; surfaced to scripts as `EDivByZero`.
    DivisionByZero,
    InvalidShift {
        amount: i64,
    },
    TypeMismatch {
        expected: String,
        got: String,
    },

    // Names
    UndefinedVariable {
        name: String,
    },
    UndefinedFunction {
        name: String,
    },
    UndefinedType {
        name: String,
    },
    UndefinedMember {
        member: String,
        type_name: String,
    },
    AssignToConstant {
        name: String,
    },
    NilDereference {
        member: String,
    },

    // Indexing
    IndexOutOfBounds {
        index: i64,
        low: i64,
        high: i64,
    },
    StringIndexOutOfBounds {
        index: i64,
        len: usize,
    },
    InvalidIndexType {
        got: String,
    },
    CannotIndex {
        type_name: String,
    },
    JsonIndexType {
        container: &'static str,
        expected: &'static str,
    },

    // Array literals
    ArrayElementMismatch {
        position: usize,
        got: String,
        expected: String,
    },
    ArrayLiteralSize {
        got: usize,
        expected: usize,
    },

    // Calls
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    NotCallable {
        type_name: String,
    },
    StackOverflow {
        depth: usize,
    },
    AbstractCall {
        class_name: String,
        method: String,
    },
    InvalidCast {
        from: String,
        to: String,
    },
    PropertyAccess {
        property: String,
        access: &'static str,
    },

    // Exceptions
    BareRaise,
    RaiseNonObject {
        got: String,
    },

    // Declarations
    DuplicateDeclaration {
        what: String,
    },
    DuplicateOperator {
        scope: &'static str,
        symbol: &'static str,
        operand_types: String,
    },

    /// Catch-all for errors without a dedicated category.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBinaryOp { left, op, right } => {
                write!(f, "type mismatch: {left} {} {right}", op.as_symbol())
            }
            Self::InvalidUnaryOp { op, operand } => {
                write!(f, "operator {} cannot be applied to {operand}", op.as_symbol())
            }
            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),
            Self::DivisionByZero => write!(f, "Division by zero"),
            Self::InvalidShift { amount } => write!(f, "invalid shift amount {amount}"),
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),
            Self::UndefinedFunction { name } => write!(f, "undefined function: {name}"),
            Self::UndefinedType { name } => write!(f, "unknown type: {name}"),
            Self::UndefinedMember { member, type_name } => {
                write!(f, "member '{member}' not found in {type_name}")
            }
            Self::AssignToConstant { name } => write!(f, "cannot assign to constant: {name}"),
            Self::NilDereference { member } => {
                write!(f, "cannot access '{member}' of a nil reference")
            }
            Self::IndexOutOfBounds { index, low, high } => {
                write!(f, "index {index} out of bounds ({low}..{high})")
            }
            Self::StringIndexOutOfBounds { index, len } => {
                write!(f, "string index {index} out of bounds (1..{len})")
            }
            Self::InvalidIndexType { got } => {
                write!(f, "index must be an ordinal value, got {got}")
            }
            Self::CannotIndex { type_name } => write!(f, "cannot index type {type_name}"),
            Self::JsonIndexType {
                container,
                expected,
            } => write!(f, "JSON {container} index must be {expected}"),
            Self::ArrayElementMismatch {
                position,
                got,
                expected,
            } => write!(
                f,
                "array element {position} has incompatible type (got {got}, expected {expected})"
            ),
            Self::ArrayLiteralSize { got, expected } => {
                write!(f, "array literal has {got} elements, expected {expected}")
            }
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{name} expects {expected} {arg_word}, got {got}")
            }
            Self::NotCallable { type_name } => write!(f, "value of type {type_name} is not callable"),
            Self::StackOverflow { depth } => write!(f, "Maximal recursion exceeded ({depth})"),
            Self::AbstractCall { class_name, method } => {
                write!(f, "cannot call abstract method {class_name}.{method}")
            }
            Self::InvalidCast { from, to } => {
                write!(f, "cannot cast instance of type {from} to {to}")
            }
            Self::PropertyAccess { property, access } => {
                write!(f, "property '{property}' is not {access}")
            }
            Self::BareRaise => write!(f, "bare raise with no active exception"),
            Self::RaiseNonObject { got } => {
                write!(f, "raise requires exception object, got {got}")
            }
            Self::DuplicateDeclaration { what } => write!(f, "{what} already defined"),
            Self::DuplicateOperator {
                scope,
                symbol,
                operand_types,
            } => write!(
                f,
                "{scope} '{symbol}' already defined for operand types ({operand_types})"
            ),
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// A single frame of a captured call stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Routine name, `<lambda>` for anonymous routines.
    pub name: String,
    /// Position of the call site.
    pub position: Option<Position>,
}

/// Immutable snapshot of the call stack, most recent call first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Frame names, most recent first.
    pub fn names(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.name.as_str()).collect()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            write!(f, "  at {}", frame.name)?;
            if let Some(pos) = frame.position.filter(|p| !p.is_dummy()) {
                write!(f, " [{pos}]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Rendered message; equals `kind.to_string()`.
    pub message: String,
    /// Where the error was detected.
    pub position: Option<Position>,
    /// Call stack at the error site.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    /// Create an uncategorized error.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            position: None,
            backtrace: None,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            position: None,
            backtrace: None,
        }
    }

    /// Attach a position unless one is already present.
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        if self.position.is_none() && !position.is_dummy() {
            self.position = Some(position);
        }
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() && !backtrace.is_empty() {
            self.backtrace = Some(backtrace);
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(pos) = self.position {
            write!(f, " at {pos}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Operators

#[cold]
pub fn invalid_binary_op(left: &str, op: BinaryOp, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBinaryOp {
        left: left.to_string(),
        op,
        right: right.to_string(),
    })
}

#[cold]
pub fn invalid_unary_op(op: UnaryOp, operand: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidUnaryOp {
        op,
        operand: operand.to_string(),
    })
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow { operation })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn invalid_shift(amount: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidShift { amount })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

// Names

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_type(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedType {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_member(member: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedMember {
        member: member.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn assign_to_constant(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssignToConstant {
        name: name.to_string(),
    })
}

#[cold]
pub fn nil_dereference(member: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NilDereference {
        member: member.to_string(),
    })
}

// Indexing

/// Out-of-range index against inclusive bounds `low..high`.
///
/// Dynamic arrays report `0..len-1` (so an empty array reports `0..-1`).
#[cold]
pub fn index_out_of_bounds(index: i64, low: i64, high: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, low, high })
}

#[cold]
pub fn string_index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StringIndexOutOfBounds { index, len })
}

#[cold]
pub fn invalid_index_type(got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidIndexType {
        got: got.to_string(),
    })
}

#[cold]
pub fn cannot_index(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotIndex {
        type_name: type_name.to_string(),
    })
}

/// A string key on a JSON array or an integer on a JSON object.
#[cold]
pub fn json_index_type(container: &'static str, expected: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::JsonIndexType {
        container,
        expected,
    })
}

// Array literals

/// `position` is 1-based.
#[cold]
pub fn array_element_mismatch(position: usize, got: &str, expected: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArrayElementMismatch {
        position,
        got: got.to_string(),
        expected: expected.to_string(),
    })
}

#[cold]
pub fn array_literal_size(got: usize, expected: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArrayLiteralSize { got, expected })
}

// Calls

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

#[cold]
pub fn abstract_call(class_name: &str, method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AbstractCall {
        class_name: class_name.to_string(),
        method: method.to_string(),
    })
}

#[cold]
pub fn invalid_cast(from: &str, to: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidCast {
        from: from.to_string(),
        to: to.to_string(),
    })
}

/// `access` is `"readable"` or `"writable"`.
#[cold]
pub fn property_access(property: &str, access: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PropertyAccess {
        property: property.to_string(),
        access,
    })
}

// Exceptions

#[cold]
pub fn bare_raise_without_exception() -> EvalError {
    EvalError::from_kind(EvalErrorKind::BareRaise)
}

#[cold]
pub fn raise_non_object(got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RaiseNonObject {
        got: got.to_string(),
    })
}

// Declarations

#[cold]
pub fn duplicate_declaration(what: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateDeclaration { what: what.into() })
}

/// Identical operand-type tuple registered twice for one operator.
#[cold]
pub fn duplicate_operator(scope: &'static str, symbol: &'static str, operand_types: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateOperator {
        scope,
        symbol,
        operand_types: operand_types.to_string(),
    })
}

/// Outcome of running a program, as seen by the host.
#[derive(Clone, Debug, thiserror::Error)]
pub enum RunError {
    /// The evaluator gave up: malformed program or runtime type error.
    #[error(transparent)]
    Internal(#[from] EvalError),

    /// A script exception escaped the main block.
    #[error("uncaught exception {class_name}: {message}")]
    Uncaught {
        class_name: String,
        message: String,
        position: Position,
        backtrace: EvalBacktrace,
    },
}

impl RunError {
    pub(crate) fn uncaught(exception: ExceptionValue) -> Self {
        RunError::Uncaught {
            class_name: exception.class_name().to_string(),
            message: exception.message,
            position: exception.position,
            backtrace: exception.call_stack,
        }
    }

    /// Class name of an uncaught exception.
    pub fn exception_class(&self) -> Option<&str> {
        match self {
            RunError::Uncaught { class_name, .. } => Some(class_name),
            RunError::Internal(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RunError::Internal(err) => &err.message,
            RunError::Uncaught { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests;
