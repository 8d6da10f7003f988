//! Number constructor, constants and formatting

use super::{eval, eval_string};
use steprun::JsValue;
use steprun::ast::build::*;

#[test]
fn test_number_conversion() {
    let cases = [
        (call(ident("Number"), vec![str_lit(" 12 ")]), 12.0),
        (call(ident("Number"), vec![str_lit("")]), 0.0),
        (call(ident("Number"), vec![bool_lit(true)]), 1.0),
        (call(ident("Number"), vec![null()]), 0.0),
        (call(ident("Number"), vec![]), 0.0),
        (call(ident("Number"), vec![array(vec![Some(num(7.0))])]), 7.0),
    ];
    for (expr, expected) in cases {
        assert_eq!(eval(vec![expr_stmt(expr)]), JsValue::Number(expected));
    }
    let value = eval(vec![expr_stmt(call(ident("Number"), vec![str_lit("12px")]))]);
    assert!(matches!(value, JsValue::Number(n) if n.is_nan()));
}

#[test]
fn test_constants() {
    let value = eval_string(vec![expr_stmt(array(vec![
        Some(member(ident("Number"), "MAX_VALUE")),
        Some(member(ident("Number"), "MIN_VALUE")),
        Some(member(ident("Number"), "POSITIVE_INFINITY")),
        Some(member(ident("Number"), "NEGATIVE_INFINITY")),
        Some(member(ident("Number"), "NaN")),
    ]))]);
    assert_eq!(value, "1.7976931348623157e+308,5e-324,Infinity,-Infinity,NaN");
}

#[test]
fn test_constants_are_readonly() {
    // Number.MAX_VALUE = 1; Number.MAX_VALUE === 1
    let value = eval(vec![
        expr_stmt(assign("=", member(ident("Number"), "MAX_VALUE"), num(1.0))),
        expr_stmt(binary("===", member(ident("Number"), "MAX_VALUE"), num(1.0))),
    ]);
    assert_eq!(value, JsValue::Boolean(false));
}

#[test]
fn test_formatting_methods() {
    let cases = [
        (method_call(num(3.14159), "toFixed", vec![num(2.0)]), "3.14"),
        (method_call(num(2.5), "toFixed", vec![]), "3"),
        (method_call(num(123.456), "toPrecision", vec![num(4.0)]), "123.5"),
        (method_call(num(0.00015), "toPrecision", vec![num(2.0)]), "0.00015"),
        (method_call(num(123456.0), "toPrecision", vec![num(2.0)]), "1.2e+5"),
        (method_call(num(12345.0), "toExponential", vec![num(2.0)]), "1.23e+4"),
        (method_call(num(255.0), "toString", vec![num(16.0)]), "ff"),
        (method_call(num(-10.0), "toString", vec![num(2.0)]), "-1010"),
        (method_call(num(0.1), "toString", vec![]), "0.1"),
    ];
    for (expr, expected) in cases {
        assert_eq!(eval(vec![expr_stmt(expr)]), JsValue::from(expected));
    }
}

#[test]
fn test_number_wrapper() {
    // var n = new Number(5); [typeof n, n + 1, n.valueOf(), n.toFixed(1)]
    let value = eval_string(vec![
        var("n", Some(new_expr(ident("Number"), vec![num(5.0)]))),
        expr_stmt(array(vec![
            Some(unary("typeof", ident("n"))),
            Some(binary("+", ident("n"), num(1.0))),
            Some(method_call(ident("n"), "valueOf", vec![])),
            Some(method_call(ident("n"), "toFixed", vec![num(1.0)])),
        ])),
    ]);
    assert_eq!(value, "object,6,5,5.0");
}

#[test]
fn test_boolean_wrapper_is_truthy() {
    // var b = new Boolean(false); [b ? "yes" : "no", Boolean(""), b.toString()]
    let value = eval_string(vec![
        var("b", Some(new_expr(ident("Boolean"), vec![bool_lit(false)]))),
        expr_stmt(array(vec![
            Some(conditional(ident("b"), str_lit("yes"), str_lit("no"))),
            Some(call(ident("Boolean"), vec![str_lit("")])),
            Some(method_call(ident("b"), "toString", vec![])),
        ])),
    ]);
    assert_eq!(value, "yes,false,false");
}
