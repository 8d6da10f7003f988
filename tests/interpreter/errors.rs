//! Fatal errors surfaced to the host

use super::{error_kind, eval_result, run_in};
use steprun::ast::build::*;
use steprun::{Config, Evaluator, JsError, JsValue, Program, Realm};

#[test]
fn test_unresolved_identifier() {
    let err = eval_result(vec![expr_stmt(ident("missing"))]).unwrap_err();
    assert_eq!(err.to_string(), "ReferenceError: missing is not defined");

    // Assignment never creates an implicit global
    let err = eval_result(vec![expr_stmt(assign("=", ident("fresh"), num(1.0)))]).unwrap_err();
    assert_eq!(err.kind(), "ReferenceError");

    // typeof tolerates unresolved names
    let value = eval_result(vec![expr_stmt(unary("typeof", ident("missing")))]).unwrap();
    assert_eq!(value, JsValue::from("undefined"));
}

#[test]
fn test_calling_a_non_function() {
    // var x = 1; x()
    let err = eval_result(vec![
        var("x", Some(num(1.0))),
        expr_stmt(call(ident("x"), vec![])),
    ])
    .unwrap_err();
    assert_eq!(err.to_string(), "TypeError: x is not a function");

    // var o = {}; o.nope()
    let err = eval_result(vec![
        var("o", Some(object(vec![]))),
        expr_stmt(method_call(ident("o"), "nope", vec![])),
    ])
    .unwrap_err();
    assert_eq!(err.to_string(), "TypeError: nope is not a function");

    let kind = error_kind(vec![expr_stmt(new_expr(num(1.0), vec![]))]);
    assert_eq!(kind, "TypeError");
}

#[test]
fn test_reading_from_undefined() {
    let err = eval_result(vec![expr_stmt(member(unary("void", num(0.0)), "x"))]).unwrap_err();
    assert_eq!(err.to_string(), "TypeError: Cannot read property 'x' of undefined");
}

#[test]
fn test_throw_is_fatal_and_carries_value() {
    // throw {code: 7}
    let err = eval_result(vec![throw_stmt(object(vec![("code", num(7.0))]))]).unwrap_err();
    assert_eq!(err.kind(), "Thrown");
    assert!(matches!(err.thrown_value(), Some(JsValue::Object(_))));

    let err = eval_result(vec![throw_stmt(str_lit("boom"))]).unwrap_err();
    assert_eq!(err.to_string(), "Uncaught boom");
    assert_eq!(err.thrown_value(), Some(&JsValue::from("boom")));
}

#[test]
fn test_throw_stops_following_statements() {
    // var reached = false; throw 1; reached = true;
    let mut evaluator = Evaluator::new(program(vec![
        var("reached", Some(bool_lit(false))),
        throw_stmt(num(1.0)),
        expr_stmt(assign("=", ident("reached"), bool_lit(true))),
    ]));
    assert!(matches!(evaluator.run(), Err(JsError::Thrown { .. })));
    assert_eq!(evaluator.get_global("reached"), JsValue::Boolean(false));
}

#[test]
fn test_regex_literal_is_type_error() {
    let json = r#"{"type": "Program", "body": [{"type": "ExpressionStatement",
        "expression": {"type": "Literal", "value": {}, "regex": {"pattern": "a+", "flags": "g"}}}]}"#;
    let mut evaluator = Evaluator::new(Program::from_json(json).unwrap());
    assert_eq!(evaluator.run().unwrap_err().kind(), "TypeError");
}

#[test]
fn test_unsupported_node_is_syntax_error() {
    let json = r#"{"type": "Program", "body": [{"type": "TryStatement", "block": {}}]}"#;
    let mut evaluator = Evaluator::new(Program::from_json(json).unwrap());
    assert_eq!(evaluator.run().unwrap_err().kind(), "SyntaxError");
}

#[test]
fn test_unknown_operator() {
    let err = eval_result(vec![expr_stmt(binary("**", num(2.0), num(3.0)))]).unwrap_err();
    assert_eq!(err.kind(), "UnknownOperator");
    assert_eq!(err.to_string(), "Unknown operator: **");

    let json = r#"{"type": "Program", "body": [{"type": "ExpressionStatement",
        "expression": {"type": "UnaryExpression", "operator": "~~", "prefix": true,
                       "argument": {"type": "Literal", "value": 1}}}]}"#;
    let mut evaluator = Evaluator::new(Program::from_json(json).unwrap());
    assert_eq!(evaluator.run().unwrap_err().kind(), "UnknownOperator");
}

#[test]
fn test_malformed_tree() {
    let err = Program::from_json(r#"{"type": "Program", "body": 3}"#).unwrap_err();
    assert_eq!(err.kind(), "MalformedInput");
    let err = Program::from_json("not json").unwrap_err();
    assert_eq!(err.kind(), "MalformedInput");
}

#[test]
fn test_stack_depth_limit() {
    // function down(n) { return down(n + 1); } down(0)
    let realm = Realm::with_config(Config::default().with_max_stack_depth(500));
    let err = run_in(
        realm,
        vec![
            func_decl(
                "down",
                &["n"],
                vec![return_stmt(Some(call(
                    ident("down"),
                    vec![binary("+", ident("n"), num(1.0))],
                )))],
            ),
            expr_stmt(call(ident("down"), vec![num(0.0)])),
        ],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "RangeError: Maximum call stack size exceeded");
}

#[test]
fn test_limit_allows_shallow_programs() {
    let realm = Realm::with_config(Config::from_json(r#"{"max_stack_depth": 64}"#).unwrap());
    let evaluator = run_in(
        realm,
        vec![expr_stmt(binary("+", num(1.0), binary("*", num(2.0), num(3.0))))],
    )
    .unwrap();
    assert_eq!(evaluator.completion_value(), JsValue::from(7));
}

#[test]
fn test_step_after_error_is_idle() {
    let mut evaluator = Evaluator::new(program(vec![
        expr_stmt(ident("missing")),
        expr_stmt(num(1.0)),
    ]));
    assert!(evaluator.run().is_err());
    assert!(evaluator.is_done());
    assert!(!evaluator.step().unwrap());
    assert_eq!(evaluator.completion_value(), JsValue::Undefined);
}
