//! DWS IR - syntax tree types for the DWScript evaluator.
//!
//! This crate contains the data the evaluator consumes but does not own:
//! - `Name` for case-insensitive identifiers
//! - `Position` and `ExprId` for diagnostics and side-table lookups
//! - AST nodes (`Expr`, `Stmt`, `Decl`, `Program`)
//! - `TypeExpr` for declared types
//! - `SemanticInfo`, the read-only contract of the semantic pass
//!
//! The lexer, parser and analyzer live elsewhere; [`build`] offers a
//! parser-free way to assemble trees.

pub mod ast;
pub mod build;
mod name;
mod operators;
mod position;
mod semantic;
mod types;

pub use name::Name;
pub use operators::{BinaryOp, OperatorSymbol, UnaryOp};
pub use position::{ExprId, Position};
pub use semantic::{SemanticInfo, SemanticTable};
pub use types::{ArrayBounds, TypeExpr};
