//! Expression nodes.

use std::rc::Rc;

use super::{Block, Param};
use crate::{BinaryOp, ExprId, Name, Position, TypeExpr, UnaryOp};

/// An expression with its identity and source position.
#[derive(Clone, Debug)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
    pub pos: Position,
}

impl Expr {
    /// Create an expression node with a fresh id.
    pub fn new(kind: ExprKind, pos: Position) -> Self {
        Expr {
            id: ExprId::fresh(),
            kind,
            pos,
        }
    }
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,

    /// Variable, constant, function, type or `Self`/`Result` reference.
    Ident(Name),

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// `callee(args)`. The callee is an identifier (function, builtin,
    /// external, or function-pointer variable), a member access (method or
    /// constructor), or any expression yielding a function pointer.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// `object.member`: field, property, method reference or class member.
    Member {
        object: Box<Expr>,
        member: Name,
    },

    /// `base[index]`. A source-level `base[i, j]` is the nested node
    /// `Index(Index(base, i), j)`.
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },

    /// `[e1, e2, ...]`, optionally carrying an explicit element/array type.
    ArrayLit {
        elements: Vec<Expr>,
        annotation: Option<TypeExpr>,
    },

    /// `TPoint(X: 1; Y: 2)` or an anonymous `(X: 1; Y: 2)` typed by context.
    RecordLit {
        type_name: Option<Name>,
        fields: Vec<(Name, Expr)>,
    },

    /// `lambda (x: Integer): Integer => x * 2` and anonymous procedures.
    Lambda(Rc<LambdaExpr>),

    /// `@Func` or `@obj.Method`.
    AddressOf(Box<Expr>),

    /// `expr is TClass`
    Is {
        expr: Box<Expr>,
        type_name: Name,
    },
    /// `expr as TClass` / `expr as IIntf`
    As {
        expr: Box<Expr>,
        type_name: Name,
    },
    /// `expr implements IIntf`
    Implements {
        expr: Box<Expr>,
        interface: Name,
    },

    /// `inherited` / `inherited Method(args)` inside a method body.
    Inherited {
        method: Option<Name>,
        args: Vec<Expr>,
    },
}

/// A lambda or anonymous routine body.
#[derive(Debug)]
pub struct LambdaExpr {
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub body: Block,
    pub pos: Position,
}
