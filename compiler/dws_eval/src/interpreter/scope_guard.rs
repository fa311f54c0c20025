//! RAII scope guards for block scopes.
//!
//! [`ScopedInterpreter`] pushes a scope on creation and pops it on drop, so
//! a `?` in the middle of a block, handler or loop body cannot leak the
//! scope. The guard derefs to the interpreter.
//!
//! ```text
//! interpreter.with_env_scope(|scoped| {
//!     scoped.env.define(name, value, Mutability::Mutable);
//!     scoped.exec_block(body)
//! })
//! ```

use std::ops::{Deref, DerefMut};

use dws_ir::Name;

use super::Interpreter;
use crate::environment::Mutability;
use crate::value::Value;

/// Guard that pops the environment scope it pushed when dropped.
pub struct ScopedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_scope();
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push a scope that is popped when the returned guard drops.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_> {
        self.env.push_scope();
        ScopedInterpreter { interpreter: self }
    }

    /// Run `f` inside a fresh block scope.
    pub fn with_env_scope<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
    {
        let mut scoped = self.scoped();
        f(&mut scoped)
    }

    /// Run `f` in a fresh scope holding a single binding: an exception
    /// handler's variable or a `for..in` loop variable.
    pub fn with_binding<T, F>(&mut self, name: Name, value: Value, mutability: Mutability, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
    {
        self.with_env_scope(|scoped| {
            scoped.env.define(name, value, mutability);
            f(scoped)
        })
    }
}
