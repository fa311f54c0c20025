use std::rc::Rc;

use dws_ir::ast::{FunctionDecl, LambdaExpr};
use dws_ir::Name;

use crate::environment::{LocalScope, Scope};
use crate::types::MethodInfo;

use super::Value;

/// A lambda together with the scope it was created in.
///
/// The scope is shared, not copied: writes the lambda makes to captured
/// variables are visible to the defining code and vice versa.
pub struct Closure {
    pub decl: Rc<LambdaExpr>,
    pub scope: LocalScope<Scope>,
}

/// A callable value.
#[derive(Clone)]
pub enum FunctionPointer {
    /// `@Func` for a global routine.
    Routine(Rc<FunctionDecl>),
    /// `@obj.Method`: a method bound to its receiver.
    Method {
        method: Rc<MethodInfo>,
        receiver: Box<Value>,
    },
    Lambda(Rc<Closure>),
    Builtin(Name),
    External(Name),
}

impl FunctionPointer {
    /// Name used for call-stack frames.
    pub fn display_name(&self) -> String {
        match self {
            FunctionPointer::Routine(decl) => decl.name.to_string(),
            FunctionPointer::Method { method, .. } => {
                format!("{}.{}", method.owner, method.decl.name)
            }
            FunctionPointer::Lambda(_) => "<lambda>".to_string(),
            FunctionPointer::Builtin(name) | FunctionPointer::External(name) => name.to_string(),
        }
    }

    /// Whether two pointers call the same code (receivers compared by identity).
    pub fn same_target(&self, other: &FunctionPointer) -> bool {
        match (self, other) {
            (FunctionPointer::Routine(a), FunctionPointer::Routine(b)) => Rc::ptr_eq(a, b),
            (
                FunctionPointer::Method {
                    method: a,
                    receiver: ra,
                },
                FunctionPointer::Method {
                    method: b,
                    receiver: rb,
                },
            ) => Rc::ptr_eq(&a.decl, &b.decl) && ra == rb,
            (FunctionPointer::Lambda(a), FunctionPointer::Lambda(b)) => Rc::ptr_eq(a, b),
            (FunctionPointer::Builtin(a), FunctionPointer::Builtin(b))
            | (FunctionPointer::External(a), FunctionPointer::External(b)) => a == b,
            _ => false,
        }
    }
}
