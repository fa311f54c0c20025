//! Binary and unary operators.
//!
//! Operator overload tables are keyed by the source symbol (`as_symbol`), so
//! `class operator + ...` and a global `operator + ...` resolve against the
//! same key the evaluator computes from a `BinaryOp`.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    /// `/`, always produces a Float.
    Div,
    /// `div`, integer division.
    IntDiv,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical / bitwise (Boolean operands are logical, Integer bitwise)
    And,
    Or,
    Xor,
    Shl,
    Shr,

    // Membership
    In,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::IntDiv => "div",
            Self::Mod => "mod",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::In => "in",
        }
    }

    /// Whether this is one of the six comparison operators.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "not",
        }
    }
}

/// The operator named by an `operator` declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OperatorSymbol {
    Binary(BinaryOp),
    Unary(UnaryOp),
    /// `operator implicit (A): B uses F` - registers a conversion, not an overload.
    Implicit,
}

impl OperatorSymbol {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Binary(op) => op.as_symbol(),
            Self::Unary(op) => op.as_symbol(),
            Self::Implicit => "implicit",
        }
    }
}
