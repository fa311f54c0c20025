use super::*;
use pretty_assertions::assert_eq;

#[test]
fn static_bounds_message_names_index_and_bounds() {
    let err = index_out_of_bounds(0, 1, 5);
    assert_eq!(err.message, "index 0 out of bounds (1..5)");
    assert_eq!(
        err.kind,
        EvalErrorKind::IndexOutOfBounds {
            index: 0,
            low: 1,
            high: 5
        }
    );
}

#[test]
fn array_element_message_is_one_based() {
    let err = array_element_mismatch(2, "String", "Integer");
    assert_eq!(
        err.message,
        "array element 2 has incompatible type (got String, expected Integer)"
    );
}

#[test]
fn position_is_attached_once() {
    let err = undefined_variable("x")
        .at(Position::new(3, 7))
        .at(Position::new(9, 9));
    assert_eq!(err.position, Some(Position::new(3, 7)));
    assert_eq!(err.to_string(), "undefined variable: x at line 3, column 7");
}

#[test]
fn dummy_position_is_ignored() {
    let err = bare_raise_without_exception().at(Position::DUMMY);
    assert_eq!(err.position, None);
    assert_eq!(err.to_string(), "bare raise with no active exception");
}

#[test]
fn backtrace_renders_most_recent_first() {
    let trace = EvalBacktrace::new(vec![
        BacktraceFrame {
            name: "<lambda>".to_string(),
            position: Some(Position::new(4, 2)),
        },
        BacktraceFrame {
            name: "Outer".to_string(),
            position: None,
        },
    ]);
    assert_eq!(trace.names(), vec!["<lambda>", "Outer"]);
    assert_eq!(
        trace.to_string(),
        "  at <lambda> [line 4, column 2]\n  at Outer\n"
    );
}
