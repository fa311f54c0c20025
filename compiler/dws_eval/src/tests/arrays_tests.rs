//! Arrays, array literals and string indexing.

use dws_ir::ast::{Expr, Stmt};
use dws_ir::build::{
    array_lit, array_of, assign, call_fn, class, expr_stmt, float, ident, index, index_multi, int,
    new_object, program, static_array, string, ty, typed_array_lit, var, var_init, var_typed,
};
use pretty_assertions::assert_eq;

use super::{failure_of, interpreter, lines, output_of};
use crate::errors::EvalErrorKind;
use crate::types::RuntimeType;
use crate::value::Value;
use crate::RunError;

fn println(e: Expr) -> Stmt {
    expr_stmt(call_fn("PrintLn", vec![e]))
}

fn internal_kind(err: RunError) -> EvalErrorKind {
    match err {
        RunError::Internal(err) => err.kind,
        other => panic!("expected an internal error, got {other:?}"),
    }
}

/// Run `stmts` and return the element type of the array left in `name`.
fn element_type_of(stmts: Vec<Stmt>, name: &str) -> RuntimeType {
    let mut interp = interpreter();
    if let Err(e) = interp.run(&program(Vec::new(), stmts)) {
        panic!("program failed: {e}");
    }
    match interp.lookup_variable(name) {
        Some(Value::Array(array)) => array.ty().element.clone(),
        other => panic!("{name} is not an array: {other:?}"),
    }
}

#[test]
fn static_array_uses_declared_bounds() {
    let p = program(
        Vec::new(),
        vec![
            var_typed("a", static_array(1, 3, ty("Integer"))),
            assign(index(ident("a"), int(1)), int(5)),
            println(call_fn("Low", vec![ident("a")])),
            println(call_fn("High", vec![ident("a")])),
            println(index(ident("a"), int(1))),
            println(index(ident("a"), int(3))),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["1", "3", "5", "0"]);
}

#[test]
fn index_outside_static_bounds_fails() {
    let p = program(
        Vec::new(),
        vec![
            var_typed("a", static_array(1, 3, ty("Integer"))),
            println(index(ident("a"), int(4))),
        ],
    );
    let (err, _) = failure_of(&p);
    assert_eq!(
        internal_kind(err),
        EvalErrorKind::IndexOutOfBounds {
            index: 4,
            low: 1,
            high: 3,
        }
    );
}

#[test]
fn set_length_grows_with_zero_values() {
    let p = program(
        Vec::new(),
        vec![
            var_typed("d", array_of(ty("Integer"))),
            expr_stmt(call_fn("SetLength", vec![ident("d"), int(3)])),
            assign(index(ident("d"), int(2)), int(8)),
            println(call_fn("Length", vec![ident("d")])),
            println(ident("d")),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["3", "[0, 0, 8]"]);
}

#[test]
fn static_arrays_copy_and_dynamic_arrays_share() {
    let p = program(
        Vec::new(),
        vec![
            var(
                "s",
                Some(static_array(0, 1, ty("Integer"))),
                Some(array_lit(vec![int(1), int(2)])),
            ),
            var_init("s2", ident("s")),
            assign(index(ident("s2"), int(0)), int(9)),
            var(
                "d",
                Some(array_of(ty("Integer"))),
                Some(array_lit(vec![int(1), int(2)])),
            ),
            var_init("d2", ident("d")),
            assign(index(ident("d2"), int(0)), int(9)),
            println(index(ident("s"), int(0))),
            println(index(ident("d"), int(0))),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["1", "9"]);
}

#[test]
fn literal_mixing_integer_and_float_widens_to_float() {
    let element = element_type_of(
        vec![var_init("a", array_lit(vec![int(1), float(2.5)]))],
        "a",
    );
    assert_eq!(element, RuntimeType::Float);
}

#[test]
fn literal_of_sibling_objects_takes_their_common_ancestor() {
    let mut interp = interpreter();
    let decls = vec![
        class("TShape").build(),
        class("TCircle").parent("TShape").build(),
        class("TSquare").parent("TShape").build(),
    ];
    let p = program(
        decls,
        vec![var_init(
            "shapes",
            array_lit(vec![
                new_object("TCircle", Vec::new()),
                new_object("TSquare", Vec::new()),
            ]),
        )],
    );
    if let Err(e) = interp.run(&p) {
        panic!("program failed: {e}");
    }
    let Some(Value::Array(shapes)) = interp.lookup_variable("shapes") else {
        panic!("shapes is not an array");
    };
    assert_eq!(
        shapes.ty().element,
        RuntimeType::Class(dws_ir::Name::new("TShape"))
    );
}

#[test]
fn annotated_literal_converts_elements() {
    let element = element_type_of(
        vec![var_init(
            "a",
            typed_array_lit(vec![int(1), int(2)], ty("Float")),
        )],
        "a",
    );
    assert_eq!(element, RuntimeType::Float);
}

#[test]
fn empty_literal_is_a_dynamic_array() {
    let mut interp = interpreter();
    if let Err(e) = interp.run(&program(Vec::new(), vec![var_init("a", array_lit(Vec::new()))])) {
        panic!("program failed: {e}");
    }
    let Some(Value::Array(a)) = interp.lookup_variable("a") else {
        panic!("a is not an array");
    };
    assert!(!a.is_static());
    assert!(a.is_empty());
}

#[test]
fn incompatible_literal_elements_fail() {
    let p = program(
        Vec::new(),
        vec![var_init("a", array_lit(vec![int(1), string("two")]))],
    );
    let (err, _) = failure_of(&p);
    assert_eq!(
        internal_kind(err),
        EvalErrorKind::ArrayElementMismatch {
            position: 2,
            got: "String".to_string(),
            expected: "Integer".to_string(),
        }
    );
}

#[test]
fn static_literal_needs_the_exact_element_count() {
    let p = program(
        Vec::new(),
        vec![var(
            "a",
            Some(static_array(0, 2, ty("Integer"))),
            Some(array_lit(vec![int(1), int(2)])),
        )],
    );
    let (err, _) = failure_of(&p);
    assert_eq!(
        internal_kind(err),
        EvalErrorKind::ArrayLiteralSize {
            got: 2,
            expected: 3,
        }
    );
}

#[test]
fn nested_arrays_take_several_indices() {
    let p = program(
        Vec::new(),
        vec![
            var_init(
                "m",
                array_lit(vec![
                    array_lit(vec![int(1), int(2)]),
                    array_lit(vec![int(3), int(4)]),
                ]),
            ),
            println(index_multi(ident("m"), vec![int(1), int(0)])),
            assign(index_multi(ident("m"), vec![int(0), int(1)]), int(7)),
            println(ident("m")),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["3", "[[1, 7], [3, 4]]"]);
}

#[test]
fn strings_index_from_one() {
    let p = program(
        Vec::new(),
        vec![
            var_init("s", string("abc")),
            println(index(ident("s"), int(2))),
            assign(index(ident("s"), int(1)), string("X")),
            println(ident("s")),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["b", "Xbc"]);
}

#[test]
fn string_index_counts_characters_not_bytes() {
    let p = program(
        Vec::new(),
        vec![
            var_init("s", string("hé😀lo")),
            println(index(ident("s"), int(2))),
            println(index(ident("s"), int(3))),
            println(index(ident("s"), int(5))),
            assign(index(ident("s"), int(3)), string("!")),
            println(ident("s")),
            println(call_fn("Length", vec![ident("s")])),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["é", "😀", "o", "hé!lo", "5"]);
}

#[test]
fn string_index_past_the_end_fails() {
    let p = program(
        Vec::new(),
        vec![println(index(string("abc"), int(4)))],
    );
    let (err, _) = failure_of(&p);
    assert_eq!(
        internal_kind(err),
        EvalErrorKind::StringIndexOutOfBounds { index: 4, len: 3 }
    );
}

#[test]
fn indexing_a_number_fails() {
    let p = program(Vec::new(), vec![println(index(int(5), int(0)))]);
    let (err, _) = failure_of(&p);
    assert_eq!(
        internal_kind(err),
        EvalErrorKind::CannotIndex {
            type_name: "Integer".to_string()
        }
    );
}
