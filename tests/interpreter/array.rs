//! Arrays: literals, length bookkeeping and Array.prototype

use super::{error_kind, eval, eval_string, run};
use steprun::value::PropertyKey;
use steprun::{Evaluator, JsValue, Realm};
use steprun::ast::build::*;

fn nums(values: &[f64]) -> steprun::ast::NodeRef {
    array(values.iter().map(|n| Some(num(*n))).collect())
}

#[test]
fn test_splice_removes_and_inserts() {
    // var a = [1, 2, 3]; var removed = a.splice(1, 1, "x", "y");
    let evaluator = run(vec![
        var("a", Some(nums(&[1.0, 2.0, 3.0]))),
        var(
            "removed",
            Some(method_call(
                ident("a"),
                "splice",
                vec![num(1.0), num(1.0), str_lit("x"), str_lit("y")],
            )),
        ),
    ])
    .unwrap();
    let realm = evaluator.realm();
    let removed = realm.array_elements(&evaluator.get_global("removed")).unwrap();
    assert_eq!(removed, vec![JsValue::from(2)]);
    let a = realm.array_elements(&evaluator.get_global("a")).unwrap();
    assert_eq!(
        a,
        vec![JsValue::from(1), JsValue::from("x"), JsValue::from("y"), JsValue::from(3)]
    );
}

#[test]
fn test_index_write_extends_length() {
    // var a = []; a[9] = 1; a.length
    let value = eval(vec![
        var("a", Some(array(vec![]))),
        expr_stmt(assign("=", index(ident("a"), num(9.0)), num(1.0))),
        expr_stmt(member(ident("a"), "length")),
    ]);
    assert_eq!(value, JsValue::from(10));
}

#[test]
fn test_shrinking_length_deletes_elements() {
    // var a = [1, 2, 3, 4]; a.length = 2; a.length = 4; [a[2] === undefined, 3 in a, a.join("-")]
    let value = eval_string(vec![
        var("a", Some(nums(&[1.0, 2.0, 3.0, 4.0]))),
        expr_stmt(assign("=", member(ident("a"), "length"), num(2.0))),
        expr_stmt(assign("=", member(ident("a"), "length"), num(4.0))),
        expr_stmt(array(vec![
            Some(binary("===", index(ident("a"), num(2.0)), unary("void", num(0.0)))),
            Some(binary("in", num(3.0), ident("a"))),
            Some(method_call(ident("a"), "join", vec![str_lit("-")])),
        ])),
    ]);
    assert_eq!(value, "true,false,1-2--");
}

#[test]
fn test_invalid_length_is_range_error() {
    for length in [-1.0, 1.5, f64::INFINITY] {
        let kind = error_kind(vec![
            var("a", Some(array(vec![]))),
            expr_stmt(assign("=", member(ident("a"), "length"), num(length))),
        ]);
        assert_eq!(kind, "RangeError", "length = {length}");
    }
    assert_eq!(
        error_kind(vec![expr_stmt(new_expr(ident("Array"), vec![num(-3.0)]))]),
        "RangeError"
    );
}

#[test]
fn test_length_is_not_a_stored_property() {
    // var a = [1]; var keys = ""; for (var k in a) keys += k; delete a.length; [keys, a.length]
    let value = eval_string(vec![
        var("a", Some(nums(&[1.0]))),
        var("keys", Some(str_lit(""))),
        for_in(var("k", None), ident("a"), expr_stmt(assign("+=", ident("keys"), ident("k")))),
        expr_stmt(unary("delete", member(ident("a"), "length"))),
        expr_stmt(array(vec![Some(ident("keys")), Some(member(ident("a"), "length"))])),
    ]);
    assert_eq!(value, "0,1");
}

#[test]
fn test_array_constructor() {
    // [new Array(3).length, Array(1, 2).length, new Array("3").length, Array().length]
    let value = eval_string(vec![expr_stmt(array(vec![
        Some(member(new_expr(ident("Array"), vec![num(3.0)]), "length")),
        Some(member(call(ident("Array"), vec![num(1.0), num(2.0)]), "length")),
        Some(member(new_expr(ident("Array"), vec![str_lit("3")]), "length")),
        Some(member(call(ident("Array"), vec![]), "length")),
    ]))]);
    assert_eq!(value, "3,2,1,0");
}

#[test]
fn test_push_pop_shift_unshift() {
    // var a = [2]; a.push(3, 4); a.unshift(0, 1); var p = a.pop(); var s = a.shift();
    let evaluator = run(vec![
        var("a", Some(nums(&[2.0]))),
        var("pushed", Some(method_call(ident("a"), "push", vec![num(3.0), num(4.0)]))),
        var("unshifted", Some(method_call(ident("a"), "unshift", vec![num(0.0), num(1.0)]))),
        var("p", Some(method_call(ident("a"), "pop", vec![]))),
        var("s", Some(method_call(ident("a"), "shift", vec![]))),
        var("empty", Some(method_call(array(vec![]), "pop", vec![]))),
    ])
    .unwrap();
    assert_eq!(evaluator.get_global("pushed"), JsValue::from(3));
    assert_eq!(evaluator.get_global("unshifted"), JsValue::from(5));
    assert_eq!(evaluator.get_global("p"), JsValue::from(4));
    assert_eq!(evaluator.get_global("s"), JsValue::from(0));
    assert_eq!(evaluator.get_global("empty"), JsValue::Undefined);
    let a = evaluator.realm().array_elements(&evaluator.get_global("a")).unwrap();
    assert_eq!(a, vec![JsValue::from(1), JsValue::from(2), JsValue::from(3)]);
}

#[test]
fn test_slice_concat_reverse_join() {
    let cases = [
        (method_call(nums(&[1.0, 2.0, 3.0, 4.0]), "slice", vec![num(1.0), num(-1.0)]), "2,3"),
        (method_call(nums(&[1.0, 2.0, 3.0]), "slice", vec![num(-2.0)]), "2,3"),
        (
            method_call(nums(&[1.0]), "concat", vec![nums(&[2.0, 3.0]), num(4.0)]),
            "1,2,3,4",
        ),
        (method_call(nums(&[1.0, 2.0, 3.0]), "reverse", vec![]), "3,2,1"),
        (method_call(nums(&[1.0, 2.0]), "join", vec![]), "1,2"),
        (
            method_call(
                array(vec![Some(num(1.0)), None, Some(null()), Some(str_lit("x"))]),
                "join",
                vec![str_lit("|")],
            ),
            "1|||x",
        ),
        (method_call(nums(&[1.0, 2.0]), "toString", vec![]), "1,2"),
    ];
    for (expr, expected) in cases {
        assert_eq!(eval_string(vec![expr_stmt(expr)]), expected);
    }
}

#[test]
fn test_index_of_uses_strict_equality() {
    let haystack = || {
        array(vec![
            Some(num(1.0)),
            Some(str_lit("1")),
            Some(num(2.0)),
            Some(num(1.0)),
        ])
    };
    let cases = [
        (method_call(haystack(), "indexOf", vec![num(1.0)]), 0.0),
        (method_call(haystack(), "indexOf", vec![str_lit("1")]), 1.0),
        (method_call(haystack(), "indexOf", vec![num(1.0), num(1.0)]), 3.0),
        (method_call(haystack(), "lastIndexOf", vec![num(1.0)]), 3.0),
        (method_call(haystack(), "lastIndexOf", vec![num(1.0), num(2.0)]), 0.0),
        (method_call(haystack(), "indexOf", vec![num(9.0)]), -1.0),
        (method_call(haystack(), "indexOf", vec![ident("NaN")]), -1.0),
    ];
    for (expr, expected) in cases {
        assert_eq!(eval(vec![expr_stmt(expr)]), JsValue::Number(expected));
    }
}

#[test]
fn test_nested_arrays_join_flat() {
    let value = eval_string(vec![expr_stmt(array(vec![
        Some(nums(&[1.0, 2.0])),
        Some(nums(&[3.0])),
    ]))]);
    assert_eq!(value, "1,2,3");
}

#[test]
fn test_array_instanceof() {
    let value = eval(vec![expr_stmt(binary("instanceof", array(vec![]), ident("Array")))]);
    assert_eq!(value, JsValue::Boolean(true));
}

fn max_length_array() -> Vec<steprun::ast::NodeRef> {
    // var a = []; a.length = 4294967295;
    vec![
        var("a", Some(array(vec![]))),
        expr_stmt(assign("=", member(ident("a"), "length"), num(4294967295.0))),
    ]
}

#[test]
fn test_growing_past_max_length_is_range_error() {
    for method in ["unshift", "push"] {
        let mut body = max_length_array();
        body.push(expr_stmt(method_call(ident("a"), method, vec![num(1.0), num(2.0)])));
        assert_eq!(error_kind(body), "RangeError", "{method}");
    }

    // The failed unshift leaves the array untouched
    let mut body = max_length_array();
    body.push(expr_stmt(assign("=", index(ident("a"), num(0.0)), str_lit("first"))));
    body.push(expr_stmt(method_call(ident("a"), "unshift", vec![num(1.0), num(2.0)])));
    let mut evaluator = Evaluator::with_realm(program(body), Realm::new(), None);
    assert_eq!(evaluator.run().unwrap_err().kind(), "RangeError");
    let a = evaluator.get_global("a");
    let realm = evaluator.realm();
    assert_eq!(realm.length_of(&a), u32::MAX);
    assert_eq!(
        realm.get_property(&a, &PropertyKey::from(0u32)).unwrap(),
        JsValue::from("first")
    );
}

#[test]
fn test_huge_sparse_array_visits_present_indices() {
    // a[5] = "x"; [a.indexOf("x"), a.lastIndexOf("x"), a.indexOf("y"), a.join("")]
    let mut body = max_length_array();
    body.push(expr_stmt(assign("=", index(ident("a"), num(5.0)), str_lit("x"))));
    body.push(expr_stmt(array(vec![
        Some(method_call(ident("a"), "indexOf", vec![str_lit("x")])),
        Some(method_call(ident("a"), "lastIndexOf", vec![str_lit("x")])),
        Some(method_call(ident("a"), "indexOf", vec![str_lit("y")])),
        Some(method_call(ident("a"), "join", vec![str_lit("")])),
    ])));
    assert_eq!(eval_string(body), "5,5,-1,x");

    // a.shift(); [a[4], 5 in a, a.length]
    let mut body = max_length_array();
    body.push(expr_stmt(assign("=", index(ident("a"), num(5.0)), str_lit("x"))));
    body.push(expr_stmt(method_call(ident("a"), "shift", vec![])));
    body.push(expr_stmt(array(vec![
        Some(index(ident("a"), num(4.0))),
        Some(binary("in", num(5.0), ident("a"))),
        Some(member(ident("a"), "length")),
    ])));
    assert_eq!(eval_string(body), "x,false,4294967294");
}

#[test]
fn test_rendering_huge_array_is_range_error() {
    // a + "", a.join(), String(a), a.slice(0, 1)
    let renders = [
        binary("+", ident("a"), str_lit("")),
        method_call(ident("a"), "join", vec![]),
        call(ident("String"), vec![ident("a")]),
        method_call(ident("a"), "slice", vec![num(0.0), num(1.0)]),
    ];
    for render in renders {
        let mut body = max_length_array();
        body.push(expr_stmt(render));
        assert_eq!(error_kind(body), "RangeError");
    }
}
