//! User operator overloads and implicit conversion chains.

use dws_ir::ast::{Decl, Expr, Param, Stmt};
use dws_ir::build::{
    assign, binary, call_fn, class, constructor, exit, expr_stmt, function, ident,
    implicit_conversion, int, lambda, member, method_call, new_object, operator, procedure, program,
    record, record_lit, set, ty, var, var_init,
};
use dws_ir::{BinaryOp, OperatorSymbol};
use pretty_assertions::assert_eq;

use super::{failure_of, interpreter, lines, output_of};
use crate::errors::EvalErrorKind;
use crate::value::Value;
use crate::RunError;

fn println(e: Expr) -> Stmt {
    expr_stmt(call_fn("PrintLn", vec![e]))
}

fn point() -> Decl {
    record("TPoint")
        .field("X", ty("Integer"))
        .field("Y", ty("Integer"))
        .build()
}

fn point_lit(x: i64, y: i64) -> Expr {
    record_lit(Some("TPoint"), vec![("X", int(x)), ("Y", int(y))])
}

fn field_sum(field: &str) -> Expr {
    binary(
        BinaryOp::Add,
        member(ident("A"), field),
        member(ident("B"), field),
    )
}

#[test]
fn global_operator_binds_to_a_function() {
    let add = function(
        "AddPoints",
        vec![Param::new("A", ty("TPoint")), Param::new("B", ty("TPoint"))],
        ty("TPoint"),
    )
    .body(vec![
        assign(member(ident("Result"), "X"), field_sum("X")),
        assign(member(ident("Result"), "Y"), field_sum("Y")),
    ]);
    let plus = Decl::Operator(operator(
        OperatorSymbol::Binary(BinaryOp::Add),
        vec![ty("TPoint"), ty("TPoint")],
        Some(ty("TPoint")),
        "AddPoints",
    ));
    let p = program(
        vec![point(), Decl::Function(add), plus],
        vec![
            var_init("c", binary(BinaryOp::Add, point_lit(1, 2), point_lit(10, 20))),
            println(ident("c")),
        ],
    );
    assert_eq!(output_of(&p), "(X: 11; Y: 22)\n");
}

#[test]
fn operand_types_without_an_overload_fail() {
    let p = program(
        vec![point()],
        vec![println(binary(BinaryOp::Sub, point_lit(1, 2), point_lit(3, 4)))],
    );
    let (err, _) = failure_of(&p);
    let RunError::Internal(err) = err else {
        panic!("expected an internal error, got {err:?}");
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::InvalidBinaryOp {
            left: "TPoint".to_string(),
            op: BinaryOp::Sub,
            right: "TPoint".to_string(),
        }
    );
}

#[test]
fn class_operator_binds_to_an_instance_method() {
    let money = class("TMoney")
        .field("Cents", ty("Integer"))
        .method(
            constructor("Create", vec![Param::new("C", ty("Integer"))])
                .body(vec![set("Cents", ident("C"))]),
        )
        .method(
            function("AddCents", vec![Param::new("N", ty("Integer"))], ty("TMoney")).body(vec![
                set(
                    "Result",
                    new_object(
                        "TMoney",
                        vec![binary(BinaryOp::Add, ident("Cents"), ident("N"))],
                    ),
                ),
            ]),
        )
        .operator(operator(
            OperatorSymbol::Binary(BinaryOp::Add),
            vec![ty("TMoney"), ty("Integer")],
            Some(ty("TMoney")),
            "AddCents",
        ))
        .build();
    let p = program(
        vec![money],
        vec![
            var_init("m", new_object("TMoney", vec![int(250)])),
            var_init("n", binary(BinaryOp::Add, ident("m"), int(5))),
            println(member(ident("n"), "Cents")),
            println(member(ident("m"), "Cents")),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["255", "250"]);
}

/// Records `TA`..`TD`, each holding `V`, with conversions
/// `Integer -> TA -> TB -> TC -> TD` that add 1, 10, 100 and 1000.
fn conversion_ladder() -> Vec<Decl> {
    let steps = [
        ("Integer", "TA", "IntToA", 1),
        ("TA", "TB", "AToB", 10),
        ("TB", "TC", "BToC", 100),
        ("TC", "TD", "CToD", 1000),
    ];
    let mut decls: Vec<Decl> = ["TA", "TB", "TC", "TD"]
        .into_iter()
        .map(|name| record(name).field("V", ty("Integer")).build())
        .collect();
    for (from, to, binding, delta) in steps {
        let source = if from == "Integer" {
            ident("P")
        } else {
            member(ident("P"), "V")
        };
        let convert = function(binding, vec![Param::new("P", ty(from))], ty(to)).body(vec![
            assign(
                member(ident("Result"), "V"),
                binary(BinaryOp::Add, source, int(delta)),
            ),
        ]);
        decls.push(Decl::Function(convert));
        decls.push(implicit_conversion(ty(from), ty(to), binding));
    }
    decls
}

#[test]
fn conversion_chain_of_three_steps_applies() {
    let p = program(
        conversion_ladder(),
        vec![
            var("c", Some(ty("TC")), Some(int(5))),
            println(member(ident("c"), "V")),
        ],
    );
    assert_eq!(output_of(&p), "116\n");
}

#[test]
fn conversion_chain_applies_at_arguments_and_results() {
    let show_v = || vec![println(member(ident("x"), "V"))];
    let mut decls = conversion_ladder();
    decls.push(Decl::Function(
        procedure("ShowC", vec![Param::new("x", ty("TC"))]).body(show_v()),
    ));
    decls.push(
        class("TBox")
            .method(procedure("ShowC", vec![Param::new("x", ty("TC"))]).body(show_v()))
            .build(),
    );
    decls.push(Decl::Function(
        function("ExitC", Vec::new(), ty("TC")).body(vec![exit(Some(int(5)))]),
    ));
    decls.push(Decl::Function(
        function("ResultC", Vec::new(), ty("TC")).body(vec![set("Result", int(5))]),
    ));
    let p = program(
        decls,
        vec![
            expr_stmt(call_fn("ShowC", vec![int(5)])),
            expr_stmt(method_call(new_object("TBox", Vec::new()), "ShowC", vec![int(5)])),
            var_init(
                "show",
                lambda(vec![Param::new("x", ty("TC"))], None, show_v()),
            ),
            expr_stmt(call_fn("show", vec![int(5)])),
            println(member(call_fn("ExitC", Vec::new()), "V")),
            println(member(call_fn("ResultC", Vec::new()), "V")),
        ],
    );
    assert_eq!(
        lines(&output_of(&p)),
        vec!["116", "116", "116", "116", "116"]
    );
}

#[test]
fn conversion_chain_longer_than_the_limit_leaves_the_value_alone() {
    let mut interp = interpreter();
    let p = program(
        conversion_ladder(),
        vec![var("d", Some(ty("TD")), Some(int(5)))],
    );
    if let Err(e) = interp.run(&p) {
        panic!("program failed: {e}");
    }
    assert_eq!(interp.lookup_variable("d"), Some(Value::Integer(5)));
}

#[test]
fn conversion_limit_is_configurable() {
    let mut interp = crate::InterpreterBuilder::new()
        .mode(crate::EvalMode::TestRun)
        .max_conversion_chain_depth(4)
        .build()
        .unwrap_or_else(|e| panic!("build failed: {e}"));
    let p = program(
        conversion_ladder(),
        vec![
            var("d", Some(ty("TD")), Some(int(5))),
            println(member(ident("d"), "V")),
        ],
    );
    if let Err(e) = interp.run(&p) {
        panic!("program failed: {e}");
    }
    assert_eq!(interp.print_handler().get_output(), "1116\n");
}
