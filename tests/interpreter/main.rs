//! Integration tests for the evaluator, organized by feature
//!
//! These tests exercise the evaluator through the public API. Programs are
//! assembled with `steprun::ast::build`; tests that need source text for
//! `eval` or `Function` install [`json_parser`], which reads ESTree JSON.

mod array;
mod basics;
mod control_flow;
mod errors;
mod number;
mod object;
mod string;

use steprun::ast::NodeRef;
use steprun::ast::build::program;
use steprun::{Evaluator, JsError, JsValue, Program, Realm};

/// Parser stand-in: source text is an ESTree `Program` in JSON form
pub fn json_parser(source: &str) -> Result<Program, JsError> {
    Program::from_json(source)
}

/// Run statements to completion and return the evaluator for inspection
pub fn run(body: Vec<NodeRef>) -> Result<Evaluator, JsError> {
    run_in(Realm::new(), body)
}

pub fn run_in(realm: Realm, body: Vec<NodeRef>) -> Result<Evaluator, JsError> {
    let mut evaluator = Evaluator::with_realm(program(body), realm, None);
    evaluator.run()?;
    Ok(evaluator)
}

/// Completion value of the last expression statement
#[allow(clippy::expect_used)]
pub fn eval(body: Vec<NodeRef>) -> JsValue {
    eval_result(body).expect("evaluation failed")
}

pub fn eval_result(body: Vec<NodeRef>) -> Result<JsValue, JsError> {
    Ok(run(body)?.completion_value())
}

/// Evaluate and return the error kind (`"TypeError"`, `"SyntaxError"`, ...)
#[allow(clippy::expect_used)]
pub fn error_kind(body: Vec<NodeRef>) -> &'static str {
    eval_result(body).expect_err("expected an error").kind()
}

/// Completion value rendered the way a script's String() would
#[allow(clippy::expect_used)]
pub fn eval_string(body: Vec<NodeRef>) -> String {
    let evaluator = run(body).expect("evaluation failed");
    let value = evaluator.completion_value();
    evaluator.realm().to_string(&value).as_str().to_string()
}
