//! Syntax tree consumed by the evaluator.
//!
//! Trees are produced by the external parser (or by hand through
//! [`crate::build`]) and are never mutated by the evaluator. Routine and
//! lambda bodies are reference-counted so runtime values (function pointers,
//! method tables, closures) can hold them without copying.

mod decl;
mod expr;
mod stmt;

pub use decl::{
    ClassDecl, Decl, EnumDecl, FieldDecl, FunctionDecl, InterfaceDecl, MethodBinding,
    OperatorDecl, Param, ParamMode, Program, PropertyDecl, RecordDecl, RoutineKind,
};
pub use expr::{Expr, ExprKind, LambdaExpr};
pub use stmt::{
    Block, CaseBranch, ExceptClause, ExceptHandler, ForDirection, Stmt, StmtKind, TryStmt,
};
