//! Classes: construction, virtual dispatch, `inherited`, casts, interfaces
//! and properties.

use dws_ir::ast::{Decl, Expr, Param, Stmt};
use dws_ir::build::{
    as_, assign, binary, call_fn, class, constructor, expr_stmt, function, ident, index,
    index_multi, indexed_property, inherited, int, interface, is_, implements, member,
    method_call, new_object, nil, procedure, program, property, set, string, ty, var,
};
use dws_ir::build::RoutineBuilder;
use dws_ir::BinaryOp;
use pretty_assertions::assert_eq;

use super::{failure_of, lines, output_of};
use crate::errors::EvalErrorKind;
use crate::RunError;

fn println(e: Expr) -> Stmt {
    expr_stmt(call_fn("PrintLn", vec![e]))
}

fn speak() -> RoutineBuilder {
    function("Speak", Vec::new(), ty("String"))
}

fn says(text: &str) -> Vec<Stmt> {
    vec![set("Result", string(text))]
}

/// `TAnimal` with virtual `Speak`, `TDog` overriding it and `TCat`
/// reintroducing it.
fn animals() -> Vec<Decl> {
    vec![
        class("TAnimal")
            .method(speak().virtual_().body(says("...")))
            .build(),
        class("TDog")
            .parent("TAnimal")
            .method(speak().override_().body(says("Woof")))
            .build(),
        class("TCat")
            .parent("TAnimal")
            .method(speak().reintroduce().body(says("Meow")))
            .build(),
    ]
}

fn internal_kind(err: RunError) -> EvalErrorKind {
    match err {
        RunError::Internal(err) => err.kind,
        other => panic!("expected an internal error, got {other:?}"),
    }
}

#[test]
fn override_dispatches_on_the_runtime_class() {
    let p = program(
        animals(),
        vec![
            var("a", Some(ty("TAnimal")), Some(new_object("TDog", Vec::new()))),
            println(method_call(ident("a"), "Speak", Vec::new())),
        ],
    );
    assert_eq!(output_of(&p), "Woof\n");
}

#[test]
fn reintroduce_hides_only_for_the_new_static_type() {
    let p = program(
        animals(),
        vec![
            var("a", Some(ty("TAnimal")), Some(new_object("TCat", Vec::new()))),
            var("c", Some(ty("TCat")), Some(new_object("TCat", Vec::new()))),
            println(method_call(ident("a"), "Speak", Vec::new())),
            println(method_call(ident("c"), "Speak", Vec::new())),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["...", "Meow"]);
}

#[test]
fn inherited_calls_the_parent_implementation() {
    let decls = vec![
        class("TBase")
            .method(speak().virtual_().body(says("base")))
            .build(),
        class("TDerived")
            .parent("TBase")
            .method(speak().override_().body(vec![set(
                "Result",
                binary(
                    BinaryOp::Add,
                    string("derived+"),
                    inherited(Some("Speak"), Vec::new()),
                ),
            )]))
            .build(),
    ];
    let p = program(
        decls,
        vec![println(method_call(
            new_object("TDerived", Vec::new()),
            "Speak",
            Vec::new(),
        ))],
    );
    assert_eq!(output_of(&p), "derived+base\n");
}

#[test]
fn constructor_initialises_fields() {
    let point = class("TPoint")
        .field("X", ty("Integer"))
        .field("Y", ty("Integer"))
        .method(
            constructor(
                "Create",
                vec![Param::new("AX", ty("Integer")), Param::new("AY", ty("Integer"))],
            )
            .body(vec![set("X", ident("AX")), set("Y", ident("AY"))]),
        )
        .method(
            function("Sum", Vec::new(), ty("Integer"))
                .body(vec![set("Result", binary(BinaryOp::Add, ident("X"), ident("Y")))]),
        )
        .build();
    let p = program(
        vec![point],
        vec![
            var(
                "p",
                None,
                Some(new_object("TPoint", vec![int(3), int(4)])),
            ),
            assign(member(ident("p"), "X"), int(10)),
            println(method_call(ident("p"), "Sum", Vec::new())),
            println(method_call(ident("p"), "ClassName", Vec::new())),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["14", "TPoint"]);
}

#[test]
fn objects_are_shared_references() {
    let counter = class("TCounter").field("N", ty("Integer")).build();
    let p = program(
        vec![counter],
        vec![
            var("a", None, Some(new_object("TCounter", Vec::new()))),
            var("b", None, Some(ident("a"))),
            assign(member(ident("b"), "N"), int(7)),
            println(member(ident("a"), "N")),
        ],
    );
    assert_eq!(output_of(&p), "7\n");
}

#[test]
fn is_and_as_follow_the_class_hierarchy() {
    let p = program(
        animals(),
        vec![
            var("a", Some(ty("TAnimal")), Some(new_object("TDog", Vec::new()))),
            println(is_(ident("a"), "TDog")),
            println(is_(ident("a"), "TCat")),
            println(method_call(as_(ident("a"), "TDog"), "Speak", Vec::new())),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["True", "False", "Woof"]);
}

#[test]
fn failed_as_cast_is_an_internal_error() {
    let p = program(
        animals(),
        vec![
            var("a", Some(ty("TAnimal")), Some(new_object("TDog", Vec::new()))),
            expr_stmt(as_(ident("a"), "TCat")),
        ],
    );
    let (err, _) = failure_of(&p);
    assert_eq!(
        internal_kind(err),
        EvalErrorKind::InvalidCast {
            from: "TDog".to_string(),
            to: "TCat".to_string(),
        }
    );
}

#[test]
fn interface_calls_reach_the_implementing_class() {
    let decls = vec![
        interface("IGreeter", None, &["Greet"]),
        class("TFriendly")
            .implements("IGreeter")
            .method(function("Greet", Vec::new(), ty("String")).body(says("hello")))
            .build(),
        class("TPlain").build(),
    ];
    let p = program(
        decls,
        vec![
            var("f", None, Some(new_object("TFriendly", Vec::new()))),
            println(implements(ident("f"), "IGreeter")),
            println(implements(new_object("TPlain", Vec::new()), "IGreeter")),
            var("g", Some(ty("IGreeter")), Some(ident("f"))),
            println(method_call(ident("g"), "Greet", Vec::new())),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["True", "False", "hello"]);
}

#[test]
fn abstract_method_call_fails() {
    let shape = class("TShape")
        .method(function("Area", Vec::new(), ty("Integer")).abstract_())
        .build();
    let p = program(
        vec![shape],
        vec![println(method_call(
            new_object("TShape", Vec::new()),
            "Area",
            Vec::new(),
        ))],
    );
    let (err, _) = failure_of(&p);
    assert_eq!(
        internal_kind(err),
        EvalErrorKind::AbstractCall {
            class_name: "TShape".to_string(),
            method: "Area".to_string(),
        }
    );
}

#[test]
fn method_call_on_nil_fails() {
    let p = program(
        animals(),
        vec![
            var("a", Some(ty("TAnimal")), Some(nil())),
            expr_stmt(method_call(ident("a"), "Speak", Vec::new())),
        ],
    );
    let (err, _) = failure_of(&p);
    assert_eq!(
        internal_kind(err),
        EvalErrorKind::NilDereference {
            member: "Speak".to_string()
        }
    );
}

#[test]
fn property_reads_through_getter_and_writes_field() {
    let person = class("TPerson")
        .field("FName", ty("String"))
        .method(
            function("GetName", Vec::new(), ty("String")).body(vec![set(
                "Result",
                binary(BinaryOp::Add, string("Dr. "), ident("FName")),
            )]),
        )
        .property(property("Name", ty("String"), Some("GetName"), Some("FName")))
        .build();
    let p = program(
        vec![person],
        vec![
            var("p", None, Some(new_object("TPerson", Vec::new()))),
            assign(member(ident("p"), "Name"), string("Who")),
            println(member(ident("p"), "Name")),
            println(member(ident("p"), "FName")),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["Dr. Who", "Who"]);
}

#[test]
fn write_only_property_cannot_be_read() {
    let sink = class("TSink")
        .field("FValue", ty("Integer"))
        .property(property("Value", ty("Integer"), None, Some("FValue")))
        .build();
    let p = program(
        vec![sink],
        vec![
            var("s", None, Some(new_object("TSink", Vec::new()))),
            println(member(ident("s"), "Value")),
        ],
    );
    let (err, _) = failure_of(&p);
    assert_eq!(
        internal_kind(err),
        EvalErrorKind::PropertyAccess {
            property: "Value".to_string(),
            access: "readable",
        }
    );
}

/// `TGrid` with a default indexed `Items[i]` and a two-index `Cell[r, c]`.
fn grid() -> Decl {
    let int_param = |name: &str| Param::new(name, ty("Integer"));
    class("TGrid")
        .method(
            function("GetItem", vec![int_param("i")], ty("Integer"))
                .body(vec![set("Result", binary(BinaryOp::Mul, ident("i"), int(10)))]),
        )
        .method(
            procedure("SetItem", vec![int_param("i"), int_param("v")]).body(vec![println_all(
                vec![ident("i"), string(":"), ident("v")],
            )]),
        )
        .method(
            function("GetCell", vec![int_param("r"), int_param("c")], ty("Integer")).body(vec![
                set(
                    "Result",
                    binary(
                        BinaryOp::Add,
                        binary(BinaryOp::Mul, ident("r"), int(10)),
                        ident("c"),
                    ),
                ),
            ]),
        )
        .property(indexed_property(
            "Items",
            vec![int_param("i")],
            ty("Integer"),
            Some("GetItem"),
            Some("SetItem"),
            true,
        ))
        .property(indexed_property(
            "Cell",
            vec![int_param("r"), int_param("c")],
            ty("Integer"),
            Some("GetCell"),
            None,
            false,
        ))
        .build()
}

fn println_all(args: Vec<Expr>) -> Stmt {
    expr_stmt(call_fn("PrintLn", args))
}

#[test]
fn indexed_properties_pass_indices_in_order() {
    let p = program(
        vec![grid()],
        vec![
            var("g", None, Some(new_object("TGrid", Vec::new()))),
            println(index(member(ident("g"), "Items"), int(3))),
            println(index_multi(member(ident("g"), "Cell"), vec![int(1), int(2)])),
            assign(index(member(ident("g"), "Items"), int(4)), int(7)),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["30", "12", "4:7"]);
}

#[test]
fn default_property_serves_bare_indexing() {
    let p = program(
        vec![grid()],
        vec![
            var("g", None, Some(new_object("TGrid", Vec::new()))),
            println(index(ident("g"), int(5))),
            assign(index(ident("g"), int(2)), int(9)),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["50", "2:9"]);
}

#[test]
fn class_method_runs_without_an_instance() {
    let factory = class("TFactory")
        .method(
            function("Version", Vec::new(), ty("Integer"))
                .class_method()
                .body(vec![set("Result", int(2))]),
        )
        .build();
    let p = program(
        vec![factory],
        vec![println(method_call(ident("TFactory"), "Version", Vec::new()))],
    );
    assert_eq!(output_of(&p), "2\n");
}
