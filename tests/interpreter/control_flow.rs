//! Loops, labels and jumps

use super::{error_kind, eval, eval_result, eval_string, run};
use steprun::JsValue;
use steprun::ast::build::*;

#[test]
fn test_for_loop_push() {
    // for (var i = 0, a = []; i < 5; i++) a.push(i);
    let evaluator = run(vec![
        for_stmt(
            Some(vars(vec![("i", Some(num(0.0))), ("a", Some(array(vec![])))])),
            Some(binary("<", ident("i"), num(5.0))),
            Some(update("++", false, ident("i"))),
            expr_stmt(method_call(ident("a"), "push", vec![ident("i")])),
        ),
        expr_stmt(member(ident("a"), "length")),
    ])
    .unwrap();
    assert_eq!(evaluator.completion_value(), JsValue::from(5));

    let a = evaluator.get_global("a");
    let element = evaluator.realm().get_property(&a, &4u32.into()).unwrap();
    assert_eq!(element, JsValue::from(4));
}

#[test]
fn test_while_and_do_while() {
    // var n = 0; while (n < 10) n += 3; var m = 100; do { m++; } while (m < 5);
    let evaluator = run(vec![
        var("n", Some(num(0.0))),
        while_stmt(
            binary("<", ident("n"), num(10.0)),
            expr_stmt(assign("+=", ident("n"), num(3.0))),
        ),
        var("m", Some(num(100.0))),
        do_while(
            block(vec![expr_stmt(update("++", false, ident("m")))]),
            binary("<", ident("m"), num(5.0)),
        ),
    ])
    .unwrap();
    assert_eq!(evaluator.get_global("n"), JsValue::from(12));
    assert_eq!(evaluator.get_global("m"), JsValue::from(101));
}

#[test]
fn test_for_without_clauses_needs_break() {
    // var i = 0; for (;;) { if (++i === 4) break; } i
    let value = eval(vec![
        var("i", Some(num(0.0))),
        for_stmt(
            None,
            None,
            None,
            block(vec![if_stmt(
                binary("===", update("++", true, ident("i")), num(4.0)),
                break_stmt(None),
                None,
            )]),
        ),
        expr_stmt(ident("i")),
    ]);
    assert_eq!(value, JsValue::from(4));
}

#[test]
fn test_continue_skips_rest_of_body() {
    // var odd = 0; for (var i = 0; i < 10; i++) { if (i % 2 === 0) continue; odd++; }
    let value = eval(vec![
        var("odd", Some(num(0.0))),
        for_stmt(
            Some(var("i", Some(num(0.0)))),
            Some(binary("<", ident("i"), num(10.0))),
            Some(update("++", false, ident("i"))),
            block(vec![
                if_stmt(
                    binary("===", binary("%", ident("i"), num(2.0)), num(0.0)),
                    continue_stmt(None),
                    None,
                ),
                expr_stmt(update("++", false, ident("odd"))),
            ]),
        ),
        expr_stmt(ident("odd")),
    ]);
    assert_eq!(value, JsValue::from(5));
}

#[test]
fn test_continue_in_while_and_do_while() {
    // var i = 0, hits = 0; while (i < 5) { i++; if (i < 3) continue; hits++; }
    // var j = 0; do { j++; continue; } while (j < 4);
    let evaluator = run(vec![
        vars(vec![("i", Some(num(0.0))), ("hits", Some(num(0.0)))]),
        while_stmt(
            binary("<", ident("i"), num(5.0)),
            block(vec![
                expr_stmt(update("++", false, ident("i"))),
                if_stmt(binary("<", ident("i"), num(3.0)), continue_stmt(None), None),
                expr_stmt(update("++", false, ident("hits"))),
            ]),
        ),
        var("j", Some(num(0.0))),
        do_while(
            block(vec![
                expr_stmt(update("++", false, ident("j"))),
                continue_stmt(None),
            ]),
            binary("<", ident("j"), num(4.0)),
        ),
    ])
    .unwrap();
    assert_eq!(evaluator.get_global("hits"), JsValue::from(3));
    assert_eq!(evaluator.get_global("j"), JsValue::from(4));
}

#[test]
fn test_labeled_break_leaves_outer_loop() {
    // var count = 0;
    // outer: for (var i = 0; i < 3; i++) for (var j = 0; j < 3; j++) { if (j == 1) break outer; count++; }
    // [count, i]
    let rendered = eval_string(vec![
        var("count", Some(num(0.0))),
        labeled(
            "outer",
            for_stmt(
                Some(var("i", Some(num(0.0)))),
                Some(binary("<", ident("i"), num(3.0))),
                Some(update("++", false, ident("i"))),
                for_stmt(
                    Some(var("j", Some(num(0.0)))),
                    Some(binary("<", ident("j"), num(3.0))),
                    Some(update("++", false, ident("j"))),
                    block(vec![
                        if_stmt(
                            binary("==", ident("j"), num(1.0)),
                            break_stmt(Some("outer")),
                            None,
                        ),
                        expr_stmt(update("++", false, ident("count"))),
                    ]),
                ),
            ),
        ),
        expr_stmt(array(vec![Some(ident("count")), Some(ident("i"))])),
    ]);
    assert_eq!(rendered, "1,0");
}

#[test]
fn test_labeled_continue_matches_only_its_loop() {
    // var log = "";
    // outer: for (var i = 0; i < 2; i++) { inner: for (var j = 0; j < 3; j++) { if (j == 1) continue outer; log += i + "" + j; } }
    let value = eval(vec![
        var("log", Some(str_lit(""))),
        labeled(
            "outer",
            for_stmt(
                Some(var("i", Some(num(0.0)))),
                Some(binary("<", ident("i"), num(2.0))),
                Some(update("++", false, ident("i"))),
                block(vec![labeled(
                    "inner",
                    for_stmt(
                        Some(var("j", Some(num(0.0)))),
                        Some(binary("<", ident("j"), num(3.0))),
                        Some(update("++", false, ident("j"))),
                        block(vec![
                            if_stmt(
                                binary("==", ident("j"), num(1.0)),
                                continue_stmt(Some("outer")),
                                None,
                            ),
                            expr_stmt(assign(
                                "+=",
                                ident("log"),
                                binary("+", binary("+", ident("i"), str_lit("")), ident("j")),
                            )),
                        ]),
                    ),
                )]),
            ),
        ),
        expr_stmt(ident("log")),
    ]);
    assert_eq!(value, JsValue::from("0010"));
}

#[test]
fn test_continue_to_non_loop_label_is_syntax_error() {
    // lbl: { for (;;) { continue lbl; } }
    let kind = error_kind(vec![labeled(
        "lbl",
        block(vec![for_stmt(None, None, None, block(vec![continue_stmt(Some("lbl"))]))]),
    )]);
    assert_eq!(kind, "SyntaxError");
}

#[test]
fn test_break_and_continue_outside_loop() {
    assert_eq!(error_kind(vec![break_stmt(None)]), "SyntaxError");
    assert_eq!(error_kind(vec![continue_stmt(None)]), "SyntaxError");
    assert_eq!(error_kind(vec![break_stmt(Some("nowhere"))]), "SyntaxError");

    let err = eval_result(vec![continue_stmt(None)]).unwrap_err();
    assert_eq!(err.to_string(), "SyntaxError: Illegal continue statement");
}

#[test]
fn test_break_does_not_cross_function_boundary() {
    // while (true) { (function () { break; })(); }
    let kind = error_kind(vec![while_stmt(
        bool_lit(true),
        block(vec![expr_stmt(call(
            func_expr(None, &[], vec![break_stmt(None)]),
            vec![],
        ))]),
    )]);
    assert_eq!(kind, "SyntaxError");
}

#[test]
fn test_return_outside_function() {
    let err = eval_result(vec![return_stmt(Some(num(1.0)))]).unwrap_err();
    assert_eq!(err.to_string(), "SyntaxError: Illegal return statement");
}

#[test]
fn test_if_else_chain() {
    // var x = 15, r; if (x < 10) r = "small"; else if (x < 20) r = "medium"; else r = "large";
    let value = eval(vec![
        vars(vec![("x", Some(num(15.0))), ("r", None)]),
        if_stmt(
            binary("<", ident("x"), num(10.0)),
            expr_stmt(assign("=", ident("r"), str_lit("small"))),
            Some(if_stmt(
                binary("<", ident("x"), num(20.0)),
                expr_stmt(assign("=", ident("r"), str_lit("medium"))),
                Some(expr_stmt(assign("=", ident("r"), str_lit("large")))),
            )),
        ),
        expr_stmt(ident("r")),
    ]);
    assert_eq!(value, JsValue::from("medium"));
}

#[test]
fn test_for_in_walks_prototype_chain_once() {
    // function P() {} P.prototype.shared = 1; P.prototype.own = 2;
    // var o = new P(); o.own = 3; o.extra = 4;
    // var keys = ""; for (var k in o) keys += k + ";";
    let value = eval(vec![
        func_decl("P", &[], vec![]),
        expr_stmt(assign("=", member(member(ident("P"), "prototype"), "shared"), num(1.0))),
        expr_stmt(assign("=", member(member(ident("P"), "prototype"), "own"), num(2.0))),
        var("o", Some(new_expr(ident("P"), vec![]))),
        expr_stmt(assign("=", member(ident("o"), "own"), num(3.0))),
        expr_stmt(assign("=", member(ident("o"), "extra"), num(4.0))),
        var("keys", Some(str_lit(""))),
        for_in(
            var("k", None),
            ident("o"),
            expr_stmt(assign("+=", ident("keys"), binary("+", ident("k"), str_lit(";")))),
        ),
        expr_stmt(ident("keys")),
    ]);
    assert_eq!(value, JsValue::from("own;extra;shared;"));
}

#[test]
fn test_for_in_over_array_indices() {
    // var sum = 0; var a = [10, 20, 30]; for (var k in a) sum += a[k];
    let value = eval(vec![
        var("sum", Some(num(0.0))),
        var(
            "a",
            Some(array(vec![Some(num(10.0)), Some(num(20.0)), Some(num(30.0))])),
        ),
        for_in(
            var("k", None),
            ident("a"),
            expr_stmt(assign("+=", ident("sum"), index(ident("a"), ident("k")))),
        ),
        expr_stmt(ident("sum")),
    ]);
    assert_eq!(value, JsValue::from(60));
}

#[test]
fn test_for_in_into_member_target() {
    // var o = {a: 1, b: 2}; var t = {}; for (t.last in o) ; t.last
    let value = eval(vec![
        var("o", Some(object(vec![("a", num(1.0)), ("b", num(2.0))]))),
        var("t", Some(object(vec![]))),
        for_in(member(ident("t"), "last"), ident("o"), empty()),
        expr_stmt(member(ident("t"), "last")),
    ]);
    assert_eq!(value, JsValue::from("b"));
}

#[test]
fn test_for_in_skips_builtin_members() {
    // var n = 0; for (var k in {}) n++; for (var k in null) n++;
    let value = eval(vec![
        var("n", Some(num(0.0))),
        for_in(var("k", None), object(vec![]), expr_stmt(update("++", false, ident("n")))),
        for_in(var("k", None), null(), expr_stmt(update("++", false, ident("n")))),
        expr_stmt(ident("n")),
    ]);
    assert_eq!(value, JsValue::from(0));
}

#[test]
fn test_break_inside_for_in() {
    // var first; for (var k in {x: 1, y: 2}) { first = k; break; }
    let value = eval(vec![
        var("first", None),
        for_in(
            var("k", None),
            object(vec![("x", num(1.0)), ("y", num(2.0))]),
            block(vec![
                expr_stmt(assign("=", ident("first"), ident("k"))),
                break_stmt(None),
            ]),
        ),
        expr_stmt(ident("first")),
    ]);
    assert_eq!(value, JsValue::from("x"));
}

#[test]
fn test_for_in_over_string_indices() {
    // var keys = ""; for (var k in "abc") keys += k; for (var k in 5) keys += "!";
    let value = eval(vec![
        var("keys", Some(str_lit(""))),
        for_in(var("k", None), str_lit("abc"), expr_stmt(assign("+=", ident("keys"), ident("k")))),
        for_in(var("k", None), num(5.0), expr_stmt(assign("+=", ident("keys"), str_lit("!")))),
        expr_stmt(ident("keys")),
    ]);
    assert_eq!(value, JsValue::from("012"));
}
