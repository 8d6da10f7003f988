//! Plain objects, property access and the Object constructor

use super::{error_kind, eval, eval_string, run};
use steprun::JsValue;
use steprun::ast::build::*;

#[test]
fn test_literal_and_access() {
    // var o = {a: 1, "b c": 2}; o.d = o.a + o["b c"]; [o.a, o["b c"], o.d, o.missing]
    let value = eval_string(vec![
        var("o", Some(object(vec![("a", num(1.0)), ("b c", num(2.0))]))),
        expr_stmt(assign(
            "=",
            member(ident("o"), "d"),
            binary("+", member(ident("o"), "a"), index(ident("o"), str_lit("b c"))),
        )),
        expr_stmt(array(vec![
            Some(member(ident("o"), "a")),
            Some(index(ident("o"), str_lit("b c"))),
            Some(member(ident("o"), "d")),
            Some(member(ident("o"), "missing")),
        ])),
    ]);
    assert_eq!(value, "1,2,3,");
}

#[test]
fn test_numeric_keys_are_strings() {
    // var o = {}; o[1] = "x"; o["1"]
    let value = eval(vec![
        var("o", Some(object(vec![]))),
        expr_stmt(assign("=", index(ident("o"), num(1.0)), str_lit("x"))),
        expr_stmt(index(ident("o"), str_lit("1"))),
    ]);
    assert_eq!(value, JsValue::from("x"));
}

#[test]
fn test_in_and_delete() {
    // var o = {a: 1}; var before = "a" in o; var removed = delete o.a; [before, removed, "a" in o, "toString" in o]
    let value = eval_string(vec![
        var("o", Some(object(vec![("a", num(1.0))]))),
        var("before", Some(binary("in", str_lit("a"), ident("o")))),
        var("removed", Some(unary("delete", member(ident("o"), "a")))),
        expr_stmt(array(vec![
            Some(ident("before")),
            Some(ident("removed")),
            Some(binary("in", str_lit("a"), ident("o"))),
            Some(binary("in", str_lit("toString"), ident("o"))),
        ])),
    ]);
    assert_eq!(value, "true,true,false,true");
}

#[test]
fn test_readonly_properties_survive_delete() {
    // [delete Math.PI, typeof Math.PI]
    let value = eval_string(vec![expr_stmt(array(vec![
        Some(unary("delete", member(ident("Math"), "PI"))),
        Some(unary("typeof", member(ident("Math"), "PI"))),
    ]))]);
    assert_eq!(value, "false,number");
}

#[test]
fn test_shadowing_the_prototype() {
    // function P() {} P.prototype.v = 1; var a = new P(), b = new P(); a.v = 2; [a.v, b.v]
    let value = eval_string(vec![
        func_decl("P", &[], vec![]),
        expr_stmt(assign("=", member(member(ident("P"), "prototype"), "v"), num(1.0))),
        vars(vec![
            ("a", Some(new_expr(ident("P"), vec![]))),
            ("b", Some(new_expr(ident("P"), vec![]))),
        ]),
        expr_stmt(assign("=", member(ident("a"), "v"), num(2.0))),
        expr_stmt(array(vec![
            Some(member(ident("a"), "v")),
            Some(member(ident("b"), "v")),
        ])),
    ]);
    assert_eq!(value, "2,1");
}

#[test]
fn test_object_constructor() {
    // var o = {}; [Object(o) === o, typeof Object(1), typeof new Object(), Object("ab").length]
    let value = eval_string(vec![
        var("o", Some(object(vec![]))),
        expr_stmt(array(vec![
            Some(binary("===", call(ident("Object"), vec![ident("o")]), ident("o"))),
            Some(unary("typeof", call(ident("Object"), vec![num(1.0)]))),
            Some(unary("typeof", new_expr(ident("Object"), vec![]))),
            Some(member(call(ident("Object"), vec![str_lit("ab")]), "length")),
        ])),
    ]);
    assert_eq!(value, "true,object,object,2");
}

#[test]
fn test_to_string_and_value_of() {
    // var o = {}; [o.toString(), o.valueOf() === o, "" + o]
    let value = eval_string(vec![
        var("o", Some(object(vec![]))),
        expr_stmt(array(vec![
            Some(method_call(ident("o"), "toString", vec![])),
            Some(binary("===", method_call(ident("o"), "valueOf", vec![]), ident("o"))),
            Some(binary("+", str_lit(""), ident("o"))),
        ])),
    ]);
    assert_eq!(value, "[object Object],true,[object Object]");
}

#[test]
fn test_every_object_is_an_object_instance() {
    // [{} instanceof Object, [] instanceof Object, (function () {}) instanceof Object, self instanceof Object]
    let value = eval_string(vec![expr_stmt(array(vec![
        Some(binary("instanceof", object(vec![]), ident("Object"))),
        Some(binary("instanceof", array(vec![]), ident("Object"))),
        Some(binary("instanceof", func_expr(None, &[], vec![]), ident("Object"))),
        Some(binary("instanceof", ident("self"), ident("Object"))),
    ]))]);
    assert_eq!(value, "true,true,true,true");
}

#[test]
fn test_prototype_extension_reaches_globals() {
    // Object.prototype.marker = 7; marker
    let value = eval(vec![
        expr_stmt(assign(
            "=",
            member(member(ident("Object"), "prototype"), "marker"),
            num(7.0),
        )),
        expr_stmt(ident("marker")),
    ]);
    assert_eq!(value, JsValue::from(7));
}

#[test]
fn test_host_reads_properties() {
    let evaluator = run(vec![var(
        "o",
        Some(object(vec![("name", str_lit("steprun")), ("n", num(3.0))])),
    )])
    .unwrap();
    let realm = evaluator.realm();
    let o = evaluator.get_global("o");
    let id = o.as_object().unwrap();
    assert_eq!(realm.get(id, "name"), JsValue::from("steprun"));
    assert_eq!(realm.get(id, "n"), JsValue::from(3));
    assert_eq!(realm.get(id, "nothing"), JsValue::Undefined);
}

#[test]
fn test_property_of_undefined_is_type_error() {
    let kind = error_kind(vec![
        var("o", None),
        expr_stmt(member(ident("o"), "x")),
    ]);
    assert_eq!(kind, "TypeError");
    let kind = error_kind(vec![expr_stmt(assign("=", member(null(), "x"), num(1.0)))]);
    assert_eq!(kind, "TypeError");
}
