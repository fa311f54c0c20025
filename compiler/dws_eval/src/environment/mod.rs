//! Environment for variable scoping in the interpreter.
//!
//! Scopes form a parent-linked chain. The environment keeps a stack of the
//! scopes entered by the current routine; a call swaps the whole stack for
//! one rooted at the callee's defining scope (the global scope for routines,
//! the captured scope for lambdas) and restores it on return.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use dws_ir::Name;

use crate::types::RuntimeType;
use crate::value::Value;

/// Whether a variable binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// `var x ...`, parameters, `Result`.
    Mutable,
    /// `const X = ...`, `Self`, routine names.
    Immutable,
}

impl Mutability {
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Error returned by `Scope::assign` when assignment fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// Variable exists but is a constant.
    Immutable,
    /// Variable not found in any scope.
    Undefined,
}

/// A single-threaded scope wrapper for reference-counted interior mutability.
///
/// Closures hold a `LocalScope<Scope>` to the frame they were created in, so
/// the frame outlives the call that created it and writes through either
/// handle are visible to both.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &LocalScope<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A variable binding.
#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
    /// Declared type, used to coerce assigned values. `None` for untyped
    /// bindings (`var x := ...` without annotation picks the initializer's).
    declared_type: Option<RuntimeType>,
}

/// A single scope containing variable bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Binding>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Define a variable in this scope, shadowing any outer binding.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value, mutability: Mutability) {
        self.define_typed(name, value, mutability, None);
    }

    pub fn define_typed(
        &mut self,
        name: Name,
        value: Value,
        mutability: Mutability,
        declared_type: Option<RuntimeType>,
    ) {
        self.bindings.insert(
            name,
            Binding {
                value,
                mutability,
                declared_type,
            },
        );
    }

    pub fn lookup(&self, name: &Name) -> Option<Value> {
        if let Some(binding) = self.bindings.get(name) {
            return Some(binding.value.clone());
        }
        self.parent.as_ref()?.borrow().lookup(name)
    }

    /// Whether `name` is bound in this scope itself, ignoring parents.
    pub fn has_own(&self, name: &Name) -> bool {
        self.bindings.contains_key(name)
    }

    /// Declared type of the nearest binding, `None` if untyped or unbound.
    pub fn declared_type(&self, name: &Name) -> Option<RuntimeType> {
        if let Some(binding) = self.bindings.get(name) {
            return binding.declared_type.clone();
        }
        self.parent.as_ref()?.borrow().declared_type(name)
    }

    /// Assign to the nearest binding of `name`.
    pub fn assign(&mut self, name: &Name, value: Value) -> Result<(), AssignError> {
        if let Some(binding) = self.bindings.get_mut(name) {
            if !binding.mutability.is_mutable() {
                return Err(AssignError::Immutable);
            }
            binding.value = value;
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(AssignError::Undefined),
        }
    }
}

/// Scope stack saved by [`Environment::enter`].
#[must_use = "the saved scopes must be handed back to `Environment::restore`"]
pub struct SavedScopes(Vec<LocalScope<Scope>>);

/// Environment for the interpreter using a scope stack.
pub struct Environment {
    /// Stack of scopes, with current scope at the top.
    scopes: Vec<LocalScope<Scope>>,
    /// Global scope: declared routines' bodies see it as their parent.
    global: LocalScope<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        let global = LocalScope::new(Scope::new());
        Environment {
            scopes: vec![global.clone()],
            global,
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn push_scope(&mut self) {
        let parent = self.current_scope();
        self.scopes
            .push(LocalScope::new(Scope::with_parent(parent)));
    }

    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// The innermost scope, shared. Lambdas capture this.
    #[inline]
    pub fn current_scope(&self) -> LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.global).clone()
    }

    pub fn global(&self) -> LocalScope<Scope> {
        self.global.clone()
    }

    /// Replace the scope stack with a fresh frame whose parent is `parent`.
    ///
    /// Used by calls: the callee sees its defining scope, never the caller's
    /// locals. Hand the result back to [`restore`](Self::restore).
    pub fn enter(&mut self, parent: LocalScope<Scope>) -> SavedScopes {
        let frame = LocalScope::new(Scope::with_parent(parent));
        SavedScopes(std::mem::replace(&mut self.scopes, vec![frame]))
    }

    pub fn restore(&mut self, saved: SavedScopes) {
        self.scopes = saved.0;
    }

    #[inline]
    pub fn define(&mut self, name: Name, value: Value, mutability: Mutability) {
        self.define_typed(name, value, mutability, None);
    }

    pub fn define_typed(
        &mut self,
        name: Name,
        value: Value,
        mutability: Mutability,
        declared_type: Option<RuntimeType>,
    ) {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .define_typed(name, value, mutability, declared_type);
    }

    #[inline]
    pub fn lookup(&self, name: &Name) -> Option<Value> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow()
            .lookup(name)
    }

    pub fn declared_type(&self, name: &Name) -> Option<RuntimeType> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow()
            .declared_type(name)
    }

    /// Whether `name` is bound in the innermost frame.
    pub fn is_local(&self, name: &Name) -> bool {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow()
            .has_own(name)
    }

    #[inline]
    pub fn assign(&mut self, name: &Name, value: Value) -> Result<(), AssignError> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .assign(name, value)
    }

    /// Define a global constant.
    pub fn define_global(&mut self, name: Name, value: Value) {
        self.global
            .borrow_mut()
            .define(name, value, Mutability::Immutable);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
