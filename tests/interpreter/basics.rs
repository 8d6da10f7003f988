//! Literals, operators and coercion

use super::{eval, eval_string, json_parser, run};
use steprun::ast::build::*;
use steprun::{Evaluator, JsValue, Program, Realm};

#[test]
fn test_primitive_coercion_table() {
    let cases = [
        (JsValue::from(""), false, 0.0, ""),
        (JsValue::from("3"), true, 3.0, "3"),
        (JsValue::from(" 42 "), true, 42.0, " 42 "),
        (JsValue::from("0x1f"), true, 31.0, "0x1f"),
        (JsValue::Boolean(true), true, 1.0, "true"),
        (JsValue::Boolean(false), false, 0.0, "false"),
        (JsValue::Null, false, 0.0, "null"),
        (JsValue::from(0), false, 0.0, "0"),
        (JsValue::from(-1.5), true, -1.5, "-1.5"),
        (JsValue::from(1e21), true, 1e21, "1e+21"),
    ];
    for (value, boolean, number, string) in cases {
        assert_eq!(value.to_boolean(), boolean, "to_boolean({value:?})");
        assert_eq!(value.to_number(), number, "to_number({value:?})");
        assert_eq!(value.to_js_string().as_str(), string, "to_string({value:?})");
    }

    assert!(JsValue::Undefined.to_number().is_nan());
    assert_eq!(JsValue::Undefined.to_js_string().as_str(), "undefined");
    assert!(JsValue::from("abc").to_number().is_nan());
    assert!(!JsValue::Number(f64::NAN).to_boolean());
    assert_eq!(JsValue::Number(f64::NAN).to_js_string().as_str(), "NaN");
    assert_eq!(JsValue::Number(f64::NEG_INFINITY).to_js_string().as_str(), "-Infinity");
}

#[test]
fn test_var_declaration() {
    let evaluator = run(vec![var("x", Some(num(1.0)))]).unwrap();
    assert_eq!(evaluator.get_global("x"), JsValue::from(1));
}

#[test]
fn test_program_from_json() {
    let json = r#"{
        "type": "Program",
        "start": 0,
        "end": 14,
        "body": [{
            "type": "ExpressionStatement",
            "expression": {
                "type": "BinaryExpression",
                "operator": "*",
                "left": { "type": "Literal", "value": 6, "raw": "6" },
                "right": { "type": "Literal", "value": 7, "raw": "7" }
            }
        }]
    }"#;
    let mut evaluator = Evaluator::new(Program::from_json(json).unwrap());
    evaluator.run().unwrap();
    assert_eq!(evaluator.completion_value(), JsValue::from(42));
}

#[test]
fn test_string_concatenation_wins_over_addition() {
    assert_eq!(eval(vec![expr_stmt(binary("+", num(1.0), str_lit("2")))]), JsValue::from("12"));
    assert_eq!(eval(vec![expr_stmt(binary("+", str_lit("a"), null()))]), JsValue::from("anull"));
    assert_eq!(
        eval(vec![expr_stmt(binary("+", binary("+", num(1.0), num(2.0)), str_lit("3")))]),
        JsValue::from("33")
    );
    assert_eq!(eval(vec![expr_stmt(binary("+", bool_lit(true), num(1.0)))]), JsValue::from(2));
    assert_eq!(eval(vec![expr_stmt(binary("-", str_lit("5"), num(2.0)))]), JsValue::from(3));
}

#[test]
fn test_arrays_concatenate_as_strings() {
    // [1, 2] + [3]
    let value = eval(vec![expr_stmt(binary(
        "+",
        array(vec![Some(num(1.0)), Some(num(2.0))]),
        array(vec![Some(num(3.0))]),
    ))]);
    assert_eq!(value, JsValue::from("1,23"));
}

#[test]
fn test_equality() {
    let cases = [
        (binary("==", str_lit("1"), num(1.0)), true),
        (binary("===", str_lit("1"), num(1.0)), false),
        (binary("==", null(), unary("void", num(0.0))), true),
        (binary("==", null(), num(0.0)), false),
        (binary("!=", bool_lit(true), num(1.0)), false),
        (binary("!==", num(1.0), num(1.0)), false),
        (binary("==", object(vec![]), object(vec![])), false),
        (binary("==", ident("NaN"), ident("NaN")), false),
    ];
    for (expr, expected) in cases {
        assert_eq!(eval(vec![expr_stmt(expr)]), JsValue::Boolean(expected));
    }
}

#[test]
fn test_object_identity() {
    // var o = {}; var p = o; o === p
    let value = eval(vec![
        var("o", Some(object(vec![]))),
        var("p", Some(ident("o"))),
        expr_stmt(binary("===", ident("o"), ident("p"))),
    ]);
    assert_eq!(value, JsValue::Boolean(true));
}

#[test]
fn test_nan_is_incomparable() {
    for op in ["<", "<=", ">", ">="] {
        let value = eval(vec![expr_stmt(binary(op, ident("NaN"), num(1.0)))]);
        assert_eq!(value, JsValue::Boolean(false), "NaN {op} 1");
        let value = eval(vec![expr_stmt(binary(op, num(1.0), str_lit("abc")))]);
        assert_eq!(value, JsValue::Boolean(false), "1 {op} 'abc'");
    }
}

#[test]
fn test_relational_strings_compare_lexically() {
    assert_eq!(
        eval(vec![expr_stmt(binary("<", str_lit("10"), str_lit("9")))]),
        JsValue::Boolean(true)
    );
    assert_eq!(
        eval(vec![expr_stmt(binary("<", str_lit("10"), num(9.0)))]),
        JsValue::Boolean(false)
    );
    // Code unit order: the surrogate 0xD83D sorts before 0xFF61
    assert_eq!(
        eval(vec![expr_stmt(binary("<", str_lit("\u{1F600}"), str_lit("\u{FF61}")))]),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_arithmetic_and_bitwise() {
    let cases = [
        (binary("%", num(7.0), num(3.0)), 1.0),
        (binary("/", num(1.0), num(4.0)), 0.25),
        (binary("|", num(5.5), num(0.0)), 5.0),
        (binary("&", num(6.0), num(3.0)), 2.0),
        (binary("^", num(6.0), num(3.0)), 5.0),
        (binary("<<", num(1.0), num(33.0)), 2.0),
        (binary(">>", num(-8.0), num(1.0)), -4.0),
        (binary(">>>", num(-1.0), num(28.0)), 15.0),
        (unary("~", num(5.0)), -6.0),
        (unary("-", str_lit("3")), -3.0),
        (unary("+", bool_lit(true)), 1.0),
    ];
    for (expr, expected) in cases {
        assert_eq!(eval(vec![expr_stmt(expr)]), JsValue::Number(expected));
    }
}

#[test]
fn test_typeof() {
    let cases = [
        (num(1.0), "number"),
        (str_lit("s"), "string"),
        (bool_lit(false), "boolean"),
        (null(), "object"),
        (object(vec![]), "object"),
        (array(vec![]), "object"),
        (func_expr(None, &[], vec![]), "function"),
        (ident("Math"), "object"),
        (ident("parseInt"), "function"),
        (ident("notDeclared"), "undefined"),
    ];
    for (operand, expected) in cases {
        assert_eq!(eval(vec![expr_stmt(unary("typeof", operand))]), JsValue::from(expected));
    }
}

#[test]
fn test_compound_assignment() {
    // var s = "a"; s += 1; var n = 10; n -= 3; n *= 2; n
    let evaluator = run(vec![
        var("s", Some(str_lit("a"))),
        expr_stmt(assign("+=", ident("s"), num(1.0))),
        var("n", Some(num(10.0))),
        expr_stmt(assign("-=", ident("n"), num(3.0))),
        expr_stmt(assign("*=", ident("n"), num(2.0))),
        expr_stmt(assign("%=", ident("n"), num(5.0))),
        expr_stmt(assign("<<=", ident("n"), num(2.0))),
    ])
    .unwrap();
    assert_eq!(evaluator.get_global("s"), JsValue::from("a1"));
    assert_eq!(evaluator.get_global("n"), JsValue::from(16));
}

#[test]
fn test_compound_assignment_targets_resolved_reference() {
    // var o = {n: 1}; var p = o; o.n += (o = {n: 100}, 1); p.n
    let value = eval(vec![
        var("o", Some(object(vec![("n", num(1.0))]))),
        var("p", Some(ident("o"))),
        expr_stmt(assign(
            "+=",
            member(ident("o"), "n"),
            sequence(vec![
                assign("=", ident("o"), object(vec![("n", num(100.0))])),
                num(1.0),
            ]),
        )),
        expr_stmt(member(ident("p"), "n")),
    ]);
    assert_eq!(value, JsValue::from(2));
}

#[test]
fn test_update_expressions() {
    // var i = 5; var a = i++; var b = ++i; var c = i--; [a, b, c, i].join()
    let value = eval_string(vec![
        var("i", Some(num(5.0))),
        var("a", Some(update("++", false, ident("i")))),
        var("b", Some(update("++", true, ident("i")))),
        var("c", Some(update("--", false, ident("i")))),
        expr_stmt(array(vec![
            Some(ident("a")),
            Some(ident("b")),
            Some(ident("c")),
            Some(ident("i")),
        ])),
    ]);
    assert_eq!(value, "5,7,7,6");
}

#[test]
fn test_conditional_and_sequence() {
    let value = eval(vec![expr_stmt(conditional(
        sequence(vec![num(1.0), num(0.0)]),
        str_lit("yes"),
        str_lit("no"),
    ))]);
    assert_eq!(value, JsValue::from("no"));
}

#[test]
fn test_logical_returns_operand() {
    assert_eq!(
        eval(vec![expr_stmt(logical("||", str_lit(""), num(5.0)))]),
        JsValue::from(5)
    );
    assert_eq!(
        eval(vec![expr_stmt(logical("&&", num(1.0), str_lit("last")))]),
        JsValue::from("last")
    );
}

#[test]
fn test_logical_skips_right_side() {
    // var hit = 0; false && hit++; true || hit++; hit
    let value = eval(vec![
        var("hit", Some(num(0.0))),
        expr_stmt(logical("&&", bool_lit(false), update("++", false, ident("hit")))),
        expr_stmt(logical("||", bool_lit(true), update("++", false, ident("hit")))),
        expr_stmt(ident("hit")),
    ]);
    assert_eq!(value, JsValue::from(0));
}

#[test]
fn test_completion_value_is_last_expression_statement() {
    let evaluator = run(vec![expr_stmt(num(1.0)), var("y", Some(num(2.0)))]).unwrap();
    assert_eq!(evaluator.completion_value(), JsValue::from(1));

    let evaluator = run(vec![var("y", Some(num(2.0)))]).unwrap();
    assert_eq!(evaluator.completion_value(), JsValue::Undefined);
}

#[test]
fn test_evaluators_are_isolated() {
    let mut first = Evaluator::new(program(vec![var("shared", Some(num(1.0)))]));
    let second = Evaluator::new(program(vec![]));
    first.run().unwrap();
    assert_eq!(first.get_global("shared"), JsValue::from(1));
    assert_eq!(second.get_global("shared"), JsValue::Undefined);
}

#[test]
fn test_parser_can_be_installed() {
    let mut realm = Realm::new();
    realm.set_parser(json_parser);
    assert!(realm.has_parser());
    assert!(realm.parse("{\"type\": \"Program\", \"body\": []}").is_ok());
}
