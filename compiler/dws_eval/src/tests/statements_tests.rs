//! Statements, loops, routines and closures.

use dws_ir::ast::{Decl, Param};
use dws_ir::build::{
    array_lit, assign, binary, block, boolean, break_, call_fn, case, compound_assign, continue_,
    exit, expr_stmt, for_downto, for_in, for_to, function, ident, if_, int, lambda, lambda_expr,
    member, nil, procedure, program, record, repeat, set, string, ty, var, var_init, var_typed,
    while_,
};
use dws_ir::BinaryOp;
use pretty_assertions::assert_eq;

use super::{failure_of, lines, output_of};
use crate::errors::EvalErrorKind;
use crate::standard_classes::ESTACK_OVERFLOW;
use crate::RunError;

fn println(e: dws_ir::ast::Expr) -> dws_ir::ast::Stmt {
    expr_stmt(call_fn("PrintLn", vec![e]))
}

#[test]
fn for_loop_accumulates() {
    let p = program(
        Vec::new(),
        vec![
            var_init("total", int(0)),
            for_to(
                "i",
                int(1),
                int(5),
                set("total", binary(BinaryOp::Add, ident("total"), ident("i"))),
            ),
            println(ident("total")),
        ],
    );
    assert_eq!(output_of(&p), "15\n");
}

#[test]
fn for_downto_stops_at_break() {
    let p = program(
        Vec::new(),
        vec![for_downto(
            "i",
            int(5),
            int(1),
            block(vec![
                if_(
                    binary(BinaryOp::Eq, ident("i"), int(2)),
                    break_(),
                    None,
                ),
                println(ident("i")),
            ]),
        )],
    );
    assert_eq!(lines(&output_of(&p)), vec!["5", "4", "3"]);
}

#[test]
fn for_loop_with_empty_range_never_runs() {
    let p = program(
        Vec::new(),
        vec![
            for_to("i", int(3), int(1), println(ident("i"))),
            println(string("done")),
        ],
    );
    assert_eq!(output_of(&p), "done\n");
}

#[test]
fn while_loop_skips_on_continue() {
    let p = program(
        Vec::new(),
        vec![
            var_init("i", int(0)),
            while_(
                binary(BinaryOp::Lt, ident("i"), int(5)),
                block(vec![
                    set("i", binary(BinaryOp::Add, ident("i"), int(1))),
                    if_(
                        binary(
                            BinaryOp::Eq,
                            binary(BinaryOp::Mod, ident("i"), int(2)),
                            int(0),
                        ),
                        continue_(),
                        None,
                    ),
                    println(ident("i")),
                ]),
            ),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["1", "3", "5"]);
}

#[test]
fn repeat_body_runs_at_least_once() {
    let p = program(
        Vec::new(),
        vec![
            var_init("n", int(10)),
            repeat(
                vec![
                    println(ident("n")),
                    set("n", binary(BinaryOp::Add, ident("n"), int(1))),
                ],
                boolean(true),
            ),
        ],
    );
    assert_eq!(output_of(&p), "10\n");
}

#[test]
fn case_picks_matching_branch_or_else() {
    let case_of = |selector: i64| {
        case(
            int(selector),
            vec![
                (vec![int(1), int(2)], println(string("low"))),
                (vec![int(3)], println(string("three"))),
            ],
            Some(vec![println(string("other"))]),
        )
    };
    let p = program(Vec::new(), vec![case_of(2), case_of(3), case_of(9)]);
    assert_eq!(lines(&output_of(&p)), vec!["low", "three", "other"]);
}

#[test]
fn for_in_walks_string_characters_and_arrays() {
    let p = program(
        Vec::new(),
        vec![
            for_in("c", string("ab"), println(ident("c"))),
            for_in("n", array_lit(vec![int(7), int(8)]), println(ident("n"))),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["a", "b", "7", "8"]);
}

#[test]
fn compound_assignment_updates_in_place() {
    let p = program(
        Vec::new(),
        vec![
            var_init("x", int(4)),
            compound_assign(BinaryOp::Mul, ident("x"), int(3)),
            println(ident("x")),
        ],
    );
    assert_eq!(output_of(&p), "12\n");
}

#[test]
fn exit_with_value_sets_result() {
    let sign = function("Sign", vec![Param::new("x", ty("Integer"))], ty("Integer")).body(vec![
        if_(
            binary(BinaryOp::Lt, ident("x"), int(0)),
            exit(Some(int(-1))),
            None,
        ),
        set("Result", int(1)),
    ]);
    let p = program(
        vec![Decl::Function(sign)],
        vec![
            println(call_fn("Sign", vec![int(-4)])),
            println(call_fn("Sign", vec![int(9)])),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["-1", "1"]);
}

#[test]
fn routine_name_assigns_result() {
    let double = function("Double", vec![Param::new("x", ty("Integer"))], ty("Integer"))
        .body(vec![set(
            "Double",
            binary(BinaryOp::Mul, ident("x"), int(2)),
        )]);
    let p = program(
        vec![Decl::Function(double)],
        vec![println(call_fn("Double", vec![int(21)]))],
    );
    assert_eq!(output_of(&p), "42\n");
}

#[test]
fn recursion() {
    let fact = function("Fact", vec![Param::new("n", ty("Integer"))], ty("Integer")).body(vec![
        if_(
            binary(BinaryOp::LtEq, ident("n"), int(1)),
            set("Result", int(1)),
            Some(set(
                "Result",
                binary(
                    BinaryOp::Mul,
                    ident("n"),
                    call_fn(
                        "Fact",
                        vec![binary(BinaryOp::Sub, ident("n"), int(1))],
                    ),
                ),
            )),
        ),
    ]);
    let p = program(
        vec![Decl::Function(fact)],
        vec![println(call_fn("Fact", vec![int(5)]))],
    );
    assert_eq!(output_of(&p), "120\n");
}

#[test]
fn runaway_recursion_raises_stack_overflow() {
    let forever = function("Forever", vec![Param::new("n", ty("Integer"))], ty("Integer"))
        .body(vec![set(
            "Result",
            call_fn(
                "Forever",
                vec![binary(BinaryOp::Add, ident("n"), int(1))],
            ),
        )]);
    let p = program(
        vec![Decl::Function(forever)],
        vec![expr_stmt(call_fn("Forever", vec![int(0)]))],
    );
    let (err, _) = failure_of(&p);
    assert_eq!(err.exception_class(), Some(ESTACK_OVERFLOW));
}

#[test]
fn var_parameter_writes_back() {
    let bump = procedure(
        "Bump",
        vec![Param::new("x", ty("Integer")).by_ref()],
    )
    .body(vec![compound_assign(BinaryOp::Add, ident("x"), int(2))]);
    let p = program(
        vec![Decl::Function(bump)],
        vec![
            var_init("a", int(1)),
            expr_stmt(call_fn("Bump", vec![ident("a")])),
            println(ident("a")),
        ],
    );
    assert_eq!(output_of(&p), "3\n");
}

#[test]
fn lambda_captures_enclosing_variable() {
    let p = program(
        Vec::new(),
        vec![
            var_init("base", int(10)),
            var_init(
                "add",
                lambda_expr(
                    vec![Param::new("x", ty("Integer"))],
                    ty("Integer"),
                    binary(BinaryOp::Add, ident("x"), ident("base")),
                ),
            ),
            set("base", int(20)),
            println(call_fn("add", vec![int(5)])),
        ],
    );
    assert_eq!(output_of(&p), "25\n");
}

#[test]
fn typed_variable_starts_at_zero_value() {
    let p = program(
        Vec::new(),
        vec![
            var_typed("n", ty("Integer")),
            var_typed("s", ty("String")),
            println(ident("n")),
            println(binary(BinaryOp::Add, ident("s"), string("!"))),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["0", "!"]);
}

#[test]
fn nil_into_a_value_slot_is_a_type_mismatch() {
    let p = program(
        Vec::new(),
        vec![var("i", Some(ty("Integer")), Some(nil()))],
    );
    let (err, _) = failure_of(&p);
    let RunError::Internal(err) = err else {
        panic!("expected an internal error, got {err:?}");
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            expected: "Integer".to_string(),
            got: "Nil".to_string(),
        }
    );
}

#[test]
fn unassigned_variant_reads_as_zero_in_a_value_slot() {
    let p = program(
        Vec::new(),
        vec![
            var_typed("v", ty("Variant")),
            var("i", Some(ty("Integer")), Some(ident("v"))),
            println(ident("i")),
        ],
    );
    assert_eq!(output_of(&p), "0\n");
}

#[test]
fn lambda_record_result_is_fresh_per_call() {
    let counter = record("TCounter").field("N", ty("Integer")).build();
    let bump = lambda(
        Vec::new(),
        Some(ty("TCounter")),
        vec![assign(
            member(ident("Result"), "N"),
            binary(BinaryOp::Add, member(ident("Result"), "N"), int(1)),
        )],
    );
    let p = program(
        vec![counter],
        vec![
            var_init("next", bump),
            println(member(call_fn("next", Vec::new()), "N")),
            println(member(call_fn("next", Vec::new()), "N")),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["1", "1"]);
}

#[test]
fn non_boolean_condition_is_an_internal_error() {
    let p = program(
        Vec::new(),
        vec![if_(int(1), println(string("yes")), None)],
    );
    let (err, _) = failure_of(&p);
    let RunError::Internal(err) = err else {
        panic!("expected an internal error, got {err:?}");
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            expected: "Boolean".to_string(),
            got: "Integer".to_string(),
        }
    );
}

#[test]
fn assigning_to_a_constant_fails() {
    let p = program(
        vec![dws_ir::build::constant("Limit", int(3))],
        vec![assign(ident("Limit"), int(4))],
    );
    let (err, _) = failure_of(&p);
    let RunError::Internal(err) = err else {
        panic!("expected an internal error, got {err:?}");
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::AssignToConstant {
            name: "Limit".to_string()
        }
    );
}
