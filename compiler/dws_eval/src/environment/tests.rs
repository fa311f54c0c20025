use super::*;
use pretty_assertions::assert_eq;

fn n(s: &str) -> Name {
    Name::new(s)
}

#[test]
fn test_scope_define_lookup() {
    let mut scope = Scope::new();
    scope.define(n("x"), Value::Integer(42), Mutability::Immutable);
    assert_eq!(scope.lookup(&n("X")), Some(Value::Integer(42)));
}

#[test]
fn test_scope_shadowing() {
    let parent = LocalScope::new(Scope::new());
    parent
        .borrow_mut()
        .define(n("x"), Value::Integer(1), Mutability::Mutable);

    let mut child = Scope::with_parent(parent.clone());
    child.define(n("x"), Value::Integer(2), Mutability::Mutable);

    assert_eq!(child.lookup(&n("x")), Some(Value::Integer(2)));
    assert_eq!(parent.borrow().lookup(&n("x")), Some(Value::Integer(1)));
}

#[test]
fn test_assign_reaches_nearest_binding() {
    let parent = LocalScope::new(Scope::new());
    parent
        .borrow_mut()
        .define(n("count"), Value::Integer(0), Mutability::Mutable);
    let mut child = Scope::with_parent(parent.clone());

    assert_eq!(child.assign(&n("Count"), Value::Integer(5)), Ok(()));
    assert_eq!(parent.borrow().lookup(&n("count")), Some(Value::Integer(5)));
    assert!(!child.has_own(&n("count")));
}

#[test]
fn test_environment_push_pop() {
    let mut env = Environment::new();
    env.define(n("x"), Value::Integer(1), Mutability::Mutable);

    env.push_scope();
    env.define(n("x"), Value::Integer(2), Mutability::Mutable);
    assert_eq!(env.lookup(&n("x")), Some(Value::Integer(2)));

    env.pop_scope();
    assert_eq!(env.lookup(&n("x")), Some(Value::Integer(1)));
}

#[test]
fn test_pop_never_removes_global() {
    let mut env = Environment::new();
    env.pop_scope();
    env.pop_scope();
    assert_eq!(env.depth(), 1);
}

#[test]
fn test_environment_constant() {
    let mut env = Environment::new();
    env.define_global(n("Pi"), Value::Float(2.5));
    assert_eq!(
        env.assign(&n("pi"), Value::Float(3.0)),
        Err(AssignError::Immutable)
    );
    assert_eq!(
        env.assign(&n("missing"), Value::Integer(1)),
        Err(AssignError::Undefined)
    );
}

#[test]
fn test_enter_hides_caller_locals() {
    let mut env = Environment::new();
    env.define_global(n("g"), Value::Integer(1));
    env.push_scope();
    env.define(n("local"), Value::Integer(2), Mutability::Mutable);

    let saved = env.enter(env.global());
    assert_eq!(env.lookup(&n("g")), Some(Value::Integer(1)));
    assert_eq!(env.lookup(&n("local")), None);

    env.restore(saved);
    assert_eq!(env.lookup(&n("local")), Some(Value::Integer(2)));
}

#[test]
fn test_captured_scope_sees_later_writes() {
    let mut env = Environment::new();
    env.push_scope();
    env.define(n("counter"), Value::Integer(0), Mutability::Mutable);
    let captured = env.current_scope();

    assert_eq!(env.assign(&n("counter"), Value::Integer(7)), Ok(()));
    assert_eq!(captured.borrow().lookup(&n("counter")), Some(Value::Integer(7)));

    // Writes through the captured handle are visible to the owner.
    let saved = env.enter(captured);
    assert_eq!(env.assign(&n("counter"), Value::Integer(8)), Ok(()));
    env.restore(saved);
    assert_eq!(env.lookup(&n("counter")), Some(Value::Integer(8)));
}

#[test]
fn test_declared_type_lookup() {
    let mut env = Environment::new();
    env.define_typed(
        n("f"),
        Value::Float(0.0),
        Mutability::Mutable,
        Some(RuntimeType::Float),
    );
    env.push_scope();
    assert_eq!(env.declared_type(&n("F")), Some(RuntimeType::Float));
    assert_eq!(env.declared_type(&n("g")), None);
}

#[test]
fn test_local_scope_clone_shares() {
    let scope1 = LocalScope::new(42);
    let scope2 = scope1.clone();
    *scope1.borrow_mut() = 100;
    assert_eq!(*scope2.borrow(), 100);
    assert!(scope1.ptr_eq(&scope2));
}
