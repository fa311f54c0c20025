use dws_ir::ast::{Decl, Expr, Param, Stmt};
use dws_ir::build::{
    address_of, binary, call_fn, expr_stmt, ident, int, lambda_expr, member, new_object, on, procedure,
    program, raise, string, try_except, ty,
};
use dws_ir::BinaryOp;
use pretty_assertions::assert_eq;

use super::*;
use crate::standard_classes::EHOST;
use crate::tests::{interpreter, lines};

fn println(e: Expr) -> Stmt {
    expr_stmt(call_fn("PrintLn", vec![e]))
}

/// Run `main` on a fresh interpreter after `setup` registered host
/// functions; returns the interpreter for inspection.
fn run_with(setup: impl FnOnce(&mut ExternalRegistry), decls: Vec<Decl>, main: Vec<Stmt>) -> Interpreter {
    let mut interp = interpreter();
    setup(&mut interp.externals().write());
    if let Err(e) = interp.run(&program(decls, main)) {
        panic!("program failed: {e}");
    }
    interp
}

fn output(interp: &Interpreter) -> String {
    interp.print_handler().get_output()
}

/// `try <body> except on E: EHost do PrintLn(E.ExceptionClass, '|', E.Message) end`
fn catching_host_errors(body: Vec<Stmt>) -> Stmt {
    let report = expr_stmt(call_fn(
        "PrintLn",
        vec![
            member(ident("E"), "ExceptionClass"),
            string("|"),
            member(ident("E"), "Message"),
        ],
    ));
    try_except(body, vec![on(Some("E"), EHOST, report)], None)
}

#[test]
fn registry_lookup_ignores_case() {
    let mut registry = ExternalRegistry::new();
    assert!(registry.is_empty());
    registry.register("ReadConfig", |_call, _args| Ok(Value::Nil));
    assert!(registry.contains(&Name::new("readconfig")));
    assert!(registry.get(&Name::new("READCONFIG")).is_some());
    assert_eq!(registry.len(), 1);
    assert_eq!(
        format!("{registry:?}"),
        r#"ExternalRegistry { functions: ["readconfig"] }"#
    );
}

#[test]
fn host_error_display() {
    let err = HostError::new("IOError", "disk full");
    assert_eq!(err.to_string(), "IOError: disk full");
}

#[test]
fn scripts_call_host_functions() {
    let interp = run_with(
        |registry| {
            registry.register("Twice", |_call, args| match args {
                [Value::Integer(n)] => Ok(Value::Integer(n * 2)),
                _ => Err(HostError::new("ArgumentError", "expected one Integer")),
            });
        },
        Vec::new(),
        vec![println(call_fn("Twice", vec![int(21)]))],
    );
    assert_eq!(output(&interp), "42\n");
}

#[test]
fn registrations_after_build_are_visible() {
    let mut interp = interpreter();
    let externals = interp.externals();
    externals
        .write()
        .register("Answer", |_call, _args| Ok(Value::Integer(42)));
    let p = program(Vec::new(), vec![println(call_fn("Answer", Vec::new()))]);
    if let Err(e) = interp.run(&p) {
        panic!("program failed: {e}");
    }
    assert_eq!(output(&interp), "42\n");
}

#[test]
fn host_error_becomes_ehost() {
    let interp = run_with(
        |registry| {
            registry.register("Fetch", |_call, _args| {
                Err(HostError::new("TimeoutError", "no response"))
            });
        },
        Vec::new(),
        vec![catching_host_errors(vec![
            println(call_fn("Fetch", Vec::new())),
            println(string("unreachable")),
        ])],
    );
    assert_eq!(output(&interp), "TimeoutError|no response\n");
}

#[test]
fn host_panic_becomes_ehost_and_state_is_restored() {
    let interp = run_with(
        |registry| {
            registry.register("Explode", |_call, _args| panic!("boom"));
        },
        Vec::new(),
        vec![
            catching_host_errors(vec![expr_stmt(call_fn("Explode", Vec::new()))]),
            println(string("after")),
        ],
    );
    assert_eq!(lines(&output(&interp)), vec!["panic|panic: boom", "after"]);
    assert_eq!(interp.call_depth(), 0);
    assert!(!interp.exception_pending());
}

#[test]
fn uncaught_host_error_escapes_the_program() {
    let mut interp = interpreter();
    interp.externals().write().register("Fail", |_call, _args| {
        Err(HostError::new("IOError", "disk full"))
    });
    let p = program(Vec::new(), vec![expr_stmt(call_fn("Fail", Vec::new()))]);
    let Err(err) = interp.run(&p) else {
        panic!("expected the host error to escape");
    };
    assert_eq!(err.exception_class(), Some(EHOST));
    assert_eq!(err.message(), "disk full");
}

#[test]
fn host_functions_call_back_into_scripts() {
    let interp = run_with(
        |registry| {
            registry.register("Apply", |call, args| match args {
                [callee, arg] => call.invoke(callee, vec![arg.clone()]),
                _ => Err(HostError::new("ArgumentError", "expected a callee and a value")),
            });
        },
        Vec::new(),
        vec![println(call_fn(
            "Apply",
            vec![
                lambda_expr(
                    vec![Param::new("x", ty("Integer"))],
                    ty("Integer"),
                    binary(BinaryOp::Add, ident("x"), int(1)),
                ),
                int(41),
            ],
        ))],
    );
    assert_eq!(output(&interp), "42\n");
}

#[test]
fn script_exception_inside_a_callback_stays_pending() {
    let fail = procedure("Fail", Vec::new()).body(vec![raise(new_object(
        "EConvertError",
        vec![string("from script")],
    ))]);
    let interp = run_with(
        |registry| {
            registry.register("Run", |call, args| {
                let [callee] = args else {
                    return Err(HostError::new("ArgumentError", "expected a callee"));
                };
                call.invoke(callee, Vec::new())?;
                if call.exception_pending() {
                    call.println("host saw the exception");
                }
                Ok(Value::Nil)
            });
        },
        vec![Decl::Function(fail)],
        vec![try_except(
            vec![expr_stmt(call_fn(
                "Run",
                vec![address_of(ident("Fail"))],
            ))],
            vec![on(
                Some("E"),
                "EConvertError",
                println(member(ident("E"), "Message")),
            )],
            None,
        )],
    );
    assert_eq!(
        lines(&output(&interp)),
        vec!["host saw the exception", "from script"]
    );
}
