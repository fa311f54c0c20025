use std::rc::Rc;

use dws_ir::build::{procedure, ty};
use dws_ir::Name;
use pretty_assertions::assert_eq;

use super::*;

fn frozen(mut info: ClassInfo) -> Rc<ClassInfo> {
    assert!(info.build_vmt().is_ok());
    Rc::new(info)
}

fn speak_key() -> VmtKey {
    (Name::new("Speak"), 0)
}

fn owner_of(method: Option<Rc<MethodInfo>>) -> Option<String> {
    method.map(|m| m.owner.to_string())
}

#[test]
fn fields_are_copied_down_before_own_fields() {
    let mut base = ClassInfo::new(Name::new("TBase"), None);
    assert!(base
        .add_field(FieldInfo {
            name: Name::new("A"),
            ty: RuntimeType::Integer,
            default: None,
        })
        .is_ok());
    let base = frozen(base);

    let mut child = ClassInfo::new(Name::new("TChild"), Some(base));
    assert!(child
        .add_field(FieldInfo {
            name: Name::new("B"),
            ty: RuntimeType::String,
            default: None,
        })
        .is_ok());

    assert_eq!(child.field_index(&Name::new("a")), Some(0));
    assert_eq!(child.field_index(&Name::new("b")), Some(1));
    assert!(child
        .add_field(FieldInfo {
            name: Name::new("A"),
            ty: RuntimeType::Integer,
            default: None,
        })
        .is_err());
}

#[test]
fn override_replaces_implementation_in_inherited_slot() {
    let mut animal = ClassInfo::new(Name::new("TAnimal"), None);
    animal.add_method(procedure("Speak", vec![]).virtual_().body(vec![]));
    let animal = frozen(animal);

    let mut dog = ClassInfo::new(Name::new("TDog"), Some(Rc::clone(&animal)));
    dog.add_method(procedure("Speak", vec![]).override_().body(vec![]));
    let dog = frozen(dog);

    let entry = dog.vmt_entry(&speak_key()).map(|e| e.slot_owner.to_string());
    assert_eq!(entry.as_deref(), Some("TAnimal"));
    assert_eq!(
        owner_of(dog.resolve_virtual(&animal, &speak_key())),
        Some("TDog".to_string())
    );
}

#[test]
fn override_without_virtual_is_rejected() {
    let mut base = ClassInfo::new(Name::new("TBase"), None);
    base.add_method(procedure("Speak", vec![]).body(vec![]));
    let base = frozen(base);

    let mut child = ClassInfo::new(Name::new("TChild"), Some(base));
    child.add_method(procedure("Speak", vec![]).override_().body(vec![]));
    let message = child.build_vmt().err().map(|e| e.message);
    assert_eq!(
        message.as_deref(),
        Some("method 'TChild.Speak' marked override but no inherited virtual method found")
    );
}

#[test]
fn reintroduce_starts_a_new_dispatch_chain() {
    let mut animal = ClassInfo::new(Name::new("TAnimal"), None);
    animal.add_method(procedure("Speak", vec![]).virtual_().body(vec![]));
    let animal = frozen(animal);

    let mut dog = ClassInfo::new(Name::new("TDog"), Some(Rc::clone(&animal)));
    dog.add_method(procedure("Speak", vec![]).override_().body(vec![]));
    let dog = frozen(dog);

    let mut puppy = ClassInfo::new(Name::new("TPuppy"), Some(Rc::clone(&dog)));
    puppy.add_method(procedure("Speak", vec![]).reintroduce().body(vec![]));
    let puppy = frozen(puppy);

    // Through a TAnimal-typed reference the old chain still applies.
    assert_eq!(
        owner_of(puppy.resolve_virtual(&animal, &speak_key())),
        Some("TDog".to_string())
    );
    // Through a TPuppy-typed reference the new slot applies.
    assert_eq!(
        owner_of(puppy.resolve_virtual(&puppy, &speak_key())),
        Some("TPuppy".to_string())
    );
}

#[test]
fn overloads_resolve_by_arity() {
    let mut calc = ClassInfo::new(Name::new("TCalc"), None);
    calc.add_method(procedure("Add", vec![]).body(vec![]));
    calc.add_method(
        procedure(
            "Add",
            vec![dws_ir::ast::Param::new("x", ty("Integer"))],
        )
        .body(vec![]),
    );
    let calc = frozen(calc);

    let add = Name::new("add");
    assert_eq!(calc.find_method(&add, 1).map(|m| m.arity()), Some(1));
    assert_eq!(calc.find_method(&add, 0).map(|m| m.arity()), Some(0));
    assert!(calc.find_method(&add, 2).is_none());
}

#[test]
fn structural_interface_check_includes_inherited_methods() {
    let base_intf = Rc::new(InterfaceInfo::new(
        Name::new("IBase"),
        None,
        vec![Name::new("Foo")],
    ));
    let intf = InterfaceInfo::new(
        Name::new("IDerived"),
        Some(base_intf),
        vec![Name::new("Bar")],
    );

    let mut parent = ClassInfo::new(Name::new("TParent"), None);
    parent.add_method(procedure("Foo", vec![]).body(vec![]));
    let parent = frozen(parent);

    let mut child = ClassInfo::new(Name::new("TChild"), Some(Rc::clone(&parent)));
    child.add_method(procedure("Bar", vec![]).body(vec![]));
    let child = frozen(child);

    assert!(child.implements(&intf));
    assert!(!parent.implements(&intf));
}
