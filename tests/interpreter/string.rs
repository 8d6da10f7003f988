//! Strings: indexing, wrappers and String.prototype

use super::{error_kind, eval, eval_string};
use steprun::JsValue;
use steprun::ast::build::*;

#[test]
fn test_length_and_indexing() {
    assert_eq!(eval(vec![expr_stmt(member(str_lit("héllo"), "length"))]), JsValue::from(5));
    assert_eq!(eval(vec![expr_stmt(index(str_lit("abc"), num(1.0)))]), JsValue::from("b"));
    assert_eq!(eval(vec![expr_stmt(index(str_lit("abc"), num(5.0)))]), JsValue::Undefined);
}

#[test]
fn test_string_writes_are_ignored() {
    // var s = "abc"; s[0] = "x"; s.length = 1; s.extra = 1; [s, s.length, typeof s.extra]
    let value = eval_string(vec![
        var("s", Some(str_lit("abc"))),
        expr_stmt(assign("=", index(ident("s"), num(0.0)), str_lit("x"))),
        expr_stmt(assign("=", member(ident("s"), "length"), num(1.0))),
        expr_stmt(assign("=", member(ident("s"), "extra"), num(1.0))),
        expr_stmt(array(vec![
            Some(ident("s")),
            Some(member(ident("s"), "length")),
            Some(unary("typeof", member(ident("s"), "extra"))),
        ])),
    ]);
    assert_eq!(value, "abc,3,undefined");
}

#[test]
fn test_methods_on_primitives() {
    let cases = [
        (method_call(str_lit("Hello"), "toUpperCase", vec![]), "HELLO"),
        (method_call(str_lit("Hello"), "toLocaleLowerCase", vec![]), "hello"),
        (method_call(str_lit("  pad \n"), "trim", vec![]), "pad"),
        (method_call(str_lit("  pad "), "trimLeft", vec![]), "pad "),
        (method_call(str_lit("  pad "), "trimRight", vec![]), "  pad"),
        (method_call(str_lit("abc"), "charAt", vec![num(2.0)]), "c"),
        (method_call(str_lit("abc"), "charAt", vec![num(9.0)]), ""),
        (method_call(str_lit("abcdef"), "substring", vec![num(4.0), num(1.0)]), "bcd"),
        (method_call(str_lit("abcdef"), "substr", vec![num(-3.0), num(2.0)]), "de"),
        (method_call(str_lit("ab"), "concat", vec![num(1.0), null()]), "ab1null"),
    ];
    for (expr, expected) in cases {
        assert_eq!(eval(vec![expr_stmt(expr)]), JsValue::from(expected));
    }
}

#[test]
fn test_search_methods() {
    let cases = [
        (method_call(str_lit("banana"), "indexOf", vec![str_lit("an")]), 1.0),
        (method_call(str_lit("banana"), "indexOf", vec![str_lit("an"), num(2.0)]), 3.0),
        (method_call(str_lit("banana"), "lastIndexOf", vec![str_lit("an")]), 3.0),
        (method_call(str_lit("banana"), "indexOf", vec![str_lit("x")]), -1.0),
        (method_call(str_lit("A"), "charCodeAt", vec![num(0.0)]), 65.0),
    ];
    for (expr, expected) in cases {
        assert_eq!(eval(vec![expr_stmt(expr)]), JsValue::Number(expected));
    }
}

#[test]
fn test_split() {
    let cases = [
        (method_call(str_lit("a,b,,c"), "split", vec![str_lit(",")]), "a|b||c"),
        (method_call(str_lit("abc"), "split", vec![str_lit("")]), "a|b|c"),
        (method_call(str_lit("a,b,c"), "split", vec![str_lit(","), num(2.0)]), "a|b"),
        (method_call(str_lit("a,b"), "split", vec![]), "a,b"),
    ];
    for (expr, expected) in cases {
        let value = eval_string(vec![expr_stmt(method_call(expr, "join", vec![str_lit("|")]))]);
        assert_eq!(value, expected);
    }
}

#[test]
fn test_string_wrapper() {
    // var w = new String("ab"); [typeof w, w.length, w + "c", w[1], w == "ab", w === "ab"]
    let value = eval_string(vec![
        var("w", Some(new_expr(ident("String"), vec![str_lit("ab")]))),
        expr_stmt(array(vec![
            Some(unary("typeof", ident("w"))),
            Some(member(ident("w"), "length")),
            Some(binary("+", ident("w"), str_lit("c"))),
            Some(index(ident("w"), num(1.0))),
            Some(binary("==", ident("w"), str_lit("ab"))),
            Some(binary("===", ident("w"), str_lit("ab"))),
        ])),
    ]);
    assert_eq!(value, "object,2,abc,b,true,false");
}

#[test]
fn test_string_conversion_function() {
    let value = eval_string(vec![expr_stmt(array(vec![
        Some(call(ident("String"), vec![num(123.0)])),
        Some(call(ident("String"), vec![bool_lit(true)])),
        Some(call(ident("String"), vec![null()])),
        Some(call(ident("String"), vec![array(vec![Some(num(1.0)), Some(num(2.0))])])),
    ]))]);
    assert_eq!(value, "123,true,null,1,2");
}

#[test]
fn test_value_of_rejects_other_receivers() {
    // String.prototype.valueOf.call(1)
    let kind = error_kind(vec![expr_stmt(method_call(
        member(member(ident("String"), "prototype"), "valueOf"),
        "call",
        vec![num(1.0)],
    ))]);
    assert_eq!(kind, "TypeError");
}

#[test]
fn test_in_rejects_primitives() {
    let kind = error_kind(vec![expr_stmt(binary("in", str_lit("length"), str_lit("abc")))]);
    assert_eq!(kind, "TypeError");
}

#[test]
fn test_lengths_count_utf16_code_units() {
    // ["😀".length, "😀".charCodeAt(0), "😀".charCodeAt(1), "x😀y"[3]]
    let emoji = "\u{1F600}";
    let rendered = eval_string(vec![expr_stmt(array(vec![
        Some(member(str_lit(emoji), "length")),
        Some(method_call(str_lit(emoji), "charCodeAt", vec![num(0.0)])),
        Some(method_call(str_lit(emoji), "charCodeAt", vec![num(1.0)])),
        Some(index(str_lit("x\u{1F600}y"), num(3.0))),
    ]))]);
    assert_eq!(rendered, "2,55357,56832,y");
}
