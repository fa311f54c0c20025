use super::Name;
use rustc_hash::FxHashMap;

#[test]
fn names_compare_case_insensitively() {
    assert_eq!(Name::new("Result"), Name::new("RESULT"));
    assert_ne!(Name::new("Result"), Name::new("Results"));
    assert!(Name::new("TObject").is("tobject"));
}

#[test]
fn names_hash_case_insensitively() {
    let mut map = FxHashMap::default();
    map.insert(Name::new("Message"), 1);
    assert_eq!(map.get(&Name::new("message")), Some(&1));
    assert_eq!(map.get(&Name::new("MESSAGE")), Some(&1));
}

#[test]
fn display_keeps_original_spelling() {
    let name = Name::new("ExceptObject");
    assert_eq!(name.to_string(), "ExceptObject");
    assert_eq!(name.key(), "exceptobject");
}

#[test]
fn ordering_ignores_case() {
    let mut names = vec![Name::new("beta"), Name::new("Alpha"), Name::new("GAMMA")];
    names.sort();
    let spelled: Vec<&str> = names.iter().map(Name::as_str).collect();
    assert_eq!(spelled, vec!["Alpha", "beta", "GAMMA"]);
}
