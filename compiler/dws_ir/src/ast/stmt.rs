//! Statement nodes.

use super::Expr;
use crate::{BinaryOp, Name, Position, TypeExpr};

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Position,
}

impl Stmt {
    pub fn new(kind: StmtKind, pos: Position) -> Self {
        Stmt { kind, pos }
    }
}

/// A `begin ... end` statement list.
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Block { stmts }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ForDirection {
    To,
    DownTo,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    /// `var a, b: T := init;`
    Var {
        names: Vec<Name>,
        ty: Option<TypeExpr>,
        init: Option<Expr>,
    },
    /// `target := value`
    Assign {
        target: Expr,
        value: Expr,
    },
    /// `target += value` and friends (`op` is `Add`, `Sub`, `Mul` or `Div`).
    CompoundAssign {
        op: BinaryOp,
        target: Expr,
        value: Expr,
    },
    Expr(Expr),
    Block(Block),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Repeat {
        body: Block,
        until: Expr,
    },
    For {
        var: Name,
        start: Expr,
        end: Expr,
        direction: ForDirection,
        body: Box<Stmt>,
    },
    ForIn {
        var: Name,
        collection: Expr,
        body: Box<Stmt>,
    },
    Case {
        selector: Expr,
        branches: Vec<CaseBranch>,
        else_branch: Option<Block>,
    },
    Break,
    Continue,
    Exit(Option<Expr>),
    Try(TryStmt),
    /// `raise expr;` or a bare `raise;` (re-raise inside a handler).
    Raise(Option<Expr>),
}

#[derive(Clone, Debug)]
pub struct CaseBranch {
    pub values: Vec<Expr>,
    pub body: Stmt,
}

/// `try ... [except ...] [finally ...] end`
#[derive(Clone, Debug)]
pub struct TryStmt {
    pub body: Block,
    pub except: Option<ExceptClause>,
    pub finally: Option<Block>,
}

/// The `except` part of a try statement.
///
/// With no handlers, the clause catches everything and `else_block` holds
/// the statements written directly after `except`.
#[derive(Clone, Debug, Default)]
pub struct ExceptClause {
    pub handlers: Vec<ExceptHandler>,
    pub else_block: Option<Block>,
}

/// `on [E:] EClass do stmt`
#[derive(Clone, Debug)]
pub struct ExceptHandler {
    pub variable: Option<Name>,
    /// `None` catches every exception class.
    pub class_name: Option<Name>,
    pub body: Stmt,
}
