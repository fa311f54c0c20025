//! `raise`, `try`/`except`/`finally` and runtime-raised exceptions.

use dws_ir::ast::{Decl, Expr, Param, Stmt};
use dws_ir::build::{
    binary, block, call_fn, class, exit, expr_stmt, function, ident, int, member, new_object, on,
    procedure, program, raise, reraise, set, string, try_catch_all, try_except, try_finally, ty,
};
use dws_ir::BinaryOp;
use pretty_assertions::assert_eq;

use super::{failure_of, lines, output_of};
use crate::errors::EvalErrorKind;
use crate::standard_classes::{EDIV_BY_ZERO, ERANGE_ERROR};
use crate::RunError;

fn println(e: Expr) -> Stmt {
    expr_stmt(call_fn("PrintLn", vec![e]))
}

fn raise_new(class_name: &str, message: &str) -> Stmt {
    raise(new_object(class_name, vec![string(message)]))
}

fn print_message(var: &str) -> Stmt {
    println(member(ident(var), "Message"))
}

#[test]
fn handler_binds_the_exception_object() {
    let p = program(
        Vec::new(),
        vec![try_except(
            vec![raise_new("EConvertError", "bad input")],
            vec![on(Some("E"), "EConvertError", print_message("E"))],
            None,
        )],
    );
    assert_eq!(output_of(&p), "bad input\n");
}

#[test]
fn first_matching_handler_wins_and_ancestors_match() {
    let p = program(
        Vec::new(),
        vec![try_except(
            vec![raise_new(ERANGE_ERROR, "out")],
            vec![
                on(Some("E"), "EConvertError", println(string("convert"))),
                on(Some("E"), "Exception", println(string("general"))),
                on(Some("E"), ERANGE_ERROR, println(string("range"))),
            ],
            None,
        )],
    );
    assert_eq!(output_of(&p), "general\n");
}

#[test]
fn unmatched_exception_escapes_the_program() {
    let p = program(
        Vec::new(),
        vec![
            try_except(
                vec![raise_new(ERANGE_ERROR, "too big")],
                vec![on(None, "EConvertError", println(string("wrong handler")))],
                None,
            ),
            println(string("unreachable")),
        ],
    );
    let (err, output) = failure_of(&p);
    assert_eq!(err.exception_class(), Some(ERANGE_ERROR));
    assert_eq!(err.message(), "too big");
    assert_eq!(output, "");
}

#[test]
fn finally_runs_on_both_paths() {
    let normal = program(
        Vec::new(),
        vec![try_finally(
            vec![println(string("body"))],
            vec![println(string("cleanup"))],
        )],
    );
    assert_eq!(lines(&output_of(&normal)), vec!["body", "cleanup"]);

    let raising = program(
        Vec::new(),
        vec![try_finally(
            vec![raise_new("Exception", "boom")],
            vec![println(string("cleanup"))],
        )],
    );
    let (err, output) = failure_of(&raising);
    assert_eq!(err.message(), "boom");
    assert_eq!(output, "cleanup\n");
}

#[test]
fn exception_raised_in_finally_replaces_the_original() {
    let p = program(
        Vec::new(),
        vec![try_catch_all(
            vec![try_finally(
                vec![raise_new("Exception", "first")],
                vec![raise_new("EConvertError", "second")],
            )],
            vec![println(member(ident("ExceptObject"), "Message"))],
        )],
    );
    assert_eq!(output_of(&p), "second\n");
}

#[test]
fn bare_raise_rethrows_the_handled_exception() {
    let inner = try_except(
        vec![raise_new("Exception", "again")],
        vec![on(
            Some("E"),
            "Exception",
            block(vec![println(string("inner")), reraise()]),
        )],
        None,
    );
    let p = program(
        Vec::new(),
        vec![try_except(
            vec![inner],
            vec![on(Some("E"), "Exception", print_message("E"))],
            None,
        )],
    );
    assert_eq!(lines(&output_of(&p)), vec!["inner", "again"]);
}

#[test]
fn bare_raise_outside_a_handler_is_an_internal_error() {
    let p = program(Vec::new(), vec![reraise()]);
    let (err, _) = failure_of(&p);
    let RunError::Internal(err) = err else {
        panic!("expected an internal error, got {err:?}");
    };
    assert_eq!(err.kind, EvalErrorKind::BareRaise);
}

#[test]
fn integer_division_by_zero_is_catchable() {
    let p = program(
        Vec::new(),
        vec![try_except(
            vec![println(binary(BinaryOp::IntDiv, int(1), int(0)))],
            vec![on(Some("E"), EDIV_BY_ZERO, println(string("caught")))],
            None,
        )],
    );
    assert_eq!(output_of(&p), "caught\n");
}

#[test]
fn exception_unwinds_through_routine_calls() {
    let fail = procedure("Fail", Vec::new()).body(vec![
        raise_new("Exception", "deep"),
        println(string("after raise")),
    ]);
    let outer = procedure("Outer", Vec::new()).body(vec![
        expr_stmt(call_fn("Fail", Vec::new())),
        println(string("after call")),
    ]);
    let p = program(
        vec![Decl::Function(fail), Decl::Function(outer)],
        vec![
            try_catch_all(
                vec![expr_stmt(call_fn("Outer", Vec::new()))],
                vec![println(string("handled"))],
            ),
            println(string("continues")),
        ],
    );
    assert_eq!(lines(&output_of(&p)), vec!["handled", "continues"]);
}

#[test]
fn uncaught_exception_carries_the_call_stack() {
    let fail = procedure("Fail", Vec::new()).body(vec![raise_new("Exception", "deep")]);
    let p = program(
        vec![Decl::Function(fail)],
        vec![expr_stmt(call_fn("Fail", Vec::new()))],
    );
    let (err, _) = failure_of(&p);
    let RunError::Uncaught { backtrace, .. } = err else {
        panic!("expected an uncaught exception, got {err:?}");
    };
    assert_eq!(backtrace.names(), vec!["Fail"]);
}

#[test]
fn exit_inside_try_still_runs_finally() {
    let early = function("Early", Vec::new(), ty("Integer")).body(vec![try_finally(
        vec![exit(Some(int(1))), set("Result", int(2))],
        vec![println(string("fin"))],
    )]);
    let p = program(
        vec![Decl::Function(early)],
        vec![println(call_fn("Early", Vec::new()))],
    );
    assert_eq!(lines(&output_of(&p)), vec!["fin", "1"]);
}

#[test]
fn user_exception_subclass_keeps_its_fields() {
    let app_error = class("EAppError")
        .parent("Exception")
        .field("Code", ty("Integer"))
        .method(
            dws_ir::build::constructor(
                "Create",
                vec![
                    Param::new("Msg", ty("String")),
                    Param::new("ACode", ty("Integer")),
                ],
            )
            .body(vec![
                set("Message", ident("Msg")),
                set("Code", ident("ACode")),
            ]),
        )
        .build();
    let p = program(
        vec![app_error],
        vec![try_except(
            vec![raise(new_object(
                "EAppError",
                vec![string("denied"), int(403)],
            ))],
            vec![on(
                Some("E"),
                "EAppError",
                block(vec![print_message("E"), println(member(ident("E"), "Code"))]),
            )],
            None,
        )],
    );
    assert_eq!(lines(&output_of(&p)), vec!["denied", "403"]);
}

#[test]
fn raising_a_non_object_fails() {
    let p = program(Vec::new(), vec![raise(int(5))]);
    let (err, _) = failure_of(&p);
    let RunError::Internal(err) = err else {
        panic!("expected an internal error, got {err:?}");
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::RaiseNonObject {
            got: "Integer".to_string()
        }
    );
}

#[test]
fn except_object_survives_a_clean_nested_finally() {
    let nested = try_finally(
        Vec::new(),
        vec![println(member(ident("ExceptObject"), "Message"))],
    );
    let p = program(
        Vec::new(),
        vec![try_except(
            vec![raise_new("Exception", "boom")],
            vec![on(Some("E"), "Exception", nested)],
            None,
        )],
    );
    assert_eq!(output_of(&p), "boom\n");
}
