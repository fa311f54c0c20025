use pretty_assertions::assert_eq;

use super::*;

fn names(list: &[&str]) -> Vec<Name> {
    list.iter().map(|n| Name::new(n)).collect()
}

#[test]
fn all_methods_includes_parent_chain() {
    let root = Rc::new(InterfaceInfo::new(Name::new("IRoot"), None, names(&["A"])));
    let mid = Rc::new(InterfaceInfo::new(
        Name::new("IMid"),
        Some(root),
        names(&["B"]),
    ));
    let leaf = InterfaceInfo::new(Name::new("ILeaf"), Some(mid), names(&["C", "a"]));
    assert_eq!(leaf.all_methods(), names(&["C", "a", "B"]));
    assert!(leaf.inherits_from(&Name::new("iroot")));
}

#[test]
fn compatibility_is_a_superset_check() {
    let small = InterfaceInfo::new(Name::new("ISmall"), None, names(&["Foo"]));
    let big = InterfaceInfo::new(Name::new("IBig"), None, names(&["Foo", "Bar"]));
    assert!(big.is_compatible_with(&small));
    assert!(!small.is_compatible_with(&big));
}
