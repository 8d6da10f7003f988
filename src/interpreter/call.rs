//! Calls, construction and nested `eval`
//!
//! A call frame evaluates its callee in reference mode (so a member callee
//! yields its receiver), collects the arguments left to right, then dispatches
//! on the function kind. Native functions run to completion inside the step.
//! Script functions push their body above the call frame, which waits in the
//! `Running` stage until the body finishes or a `return` unwinds to it.

use std::rc::Rc;

use tracing::debug;

use super::stack::{Completion, Frame, Machine, PendingCall, Reference, Stage};
use crate::ast::{CallExpression, Node, NodeRef};
use crate::error::JsError;
use crate::realm::Realm;
use crate::scope;
use crate::value::{CheapClone, JsFunction, JsString, JsValue, ObjectId};

impl Machine {
    /// `f(..)` and `new F(..)`
    pub(super) fn step_call(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &CallExpression,
        construct: bool,
    ) -> Result<(), JsError> {
        match std::mem::replace(&mut frame.stage, Stage::Start) {
            Stage::Callee => {
                let call = self.resolve_callee(realm, &mut frame, construct)?;
                self.next_argument(realm, frame, &expr.arguments, call, 0)
            }
            Stage::Arguments { mut call, next } => {
                call.args.push(frame.take_value());
                self.next_argument(realm, frame, &expr.arguments, call, next)
            }
            Stage::Running { constructed } => {
                let result = frame.take_value();
                self.finish(construct_result(constructed, result));
                Ok(())
            }
            _ => {
                frame.stage = Stage::Callee;
                self.descend(realm, frame, Frame::reference(expr.callee.cheap_clone()))
            }
        }
    }

    /// Turn the evaluated callee into a function and receiver
    fn resolve_callee(
        &self,
        realm: &mut Realm,
        frame: &mut Frame,
        construct: bool,
    ) -> Result<Box<PendingCall>, JsError> {
        let global = JsValue::Object(realm.global_scope());
        let (callee, this, description) = match frame.value.take() {
            Some(Completion::Reference(Reference::Property { base, key })) => {
                let callee = realm.get_property(&base, &key)?;
                (callee, base, key.to_string())
            }
            Some(Completion::Reference(Reference::Variable(name))) => {
                let callee = self.read_reference(realm, &Reference::Variable(name.cheap_clone()))?;
                (callee, global, name.to_string())
            }
            Some(Completion::Value(value)) => {
                let description = realm.display(&value);
                (value, global, description)
            }
            None => (JsValue::Undefined, global, "undefined".to_string()),
        };

        let Some(func) = callee.as_object().filter(|_| realm.is_callable(&callee)) else {
            return Err(JsError::type_error(if construct {
                format!("{} is not a constructor", description)
            } else {
                format!("{} is not a function", description)
            }));
        };

        let (this, constructed) = if construct {
            let receiver = JsValue::Object(realm.create_object(Some(func)));
            (receiver.cheap_clone(), Some(receiver))
        } else {
            (this, None)
        };
        Ok(Box::new(PendingCall {
            func,
            this,
            constructed,
            args: Vec::new(),
        }))
    }

    /// Evaluate the argument at `next`, or invoke once all are collected
    fn next_argument(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        arguments: &[NodeRef],
        call: Box<PendingCall>,
        next: usize,
    ) -> Result<(), JsError> {
        match arguments.get(next) {
            Some(argument) => {
                frame.stage = Stage::Arguments {
                    call,
                    next: next + 1,
                };
                self.descend(realm, frame, Frame::new(argument.cheap_clone()))
            }
            None => self.invoke(realm, frame, *call),
        }
    }

    /// Dispatch on the function kind. `apply` and `call` markers rewrite the
    /// call in place and loop, so `f.call.call(g, ..)` works too.
    fn invoke(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        call: PendingCall,
    ) -> Result<(), JsError> {
        let PendingCall {
            mut func,
            mut this,
            constructed,
            mut args,
        } = call;

        loop {
            let function = realm
                .object(func)
                .and_then(|obj| obj.as_function())
                .cloned()
                .ok_or_else(|| JsError::type_error("Value is not a function"))?;

            match function {
                JsFunction::Apply | JsFunction::Call => {
                    let spread = matches!(function, JsFunction::Apply);
                    let Some(target) = this.as_object().filter(|_| realm.is_callable(&this)) else {
                        return Err(JsError::type_error(format!(
                            "Function.prototype.{} called on a non-function",
                            if spread { "apply" } else { "call" }
                        )));
                    };
                    let mut rest = args.into_iter();
                    this = match rest.next() {
                        Some(value) if !value.is_null_or_undefined() => value,
                        _ => JsValue::Object(realm.global_scope()),
                    };
                    args = if spread {
                        match rest.next() {
                            Some(list @ JsValue::Object(_)) => realm.array_elements(&list)?,
                            _ => Vec::new(),
                        }
                    } else {
                        rest.collect()
                    };
                    func = target;
                }
                JsFunction::Native(native) => {
                    let result = (native.func)(realm, this, &args)?;
                    self.finish(construct_result(constructed, result));
                    return Ok(());
                }
                JsFunction::Eval => {
                    if constructed.is_some() {
                        return Err(JsError::type_error("eval is not a constructor"));
                    }
                    let result = self.eval_source(realm, &args)?;
                    self.finish(result);
                    return Ok(());
                }
                JsFunction::Script { func: script, closure } => {
                    let scope = realm.create_scope(Some(closure));
                    let arguments = realm.create_array(args.clone());
                    scope::declare(
                        realm,
                        scope,
                        &JsString::from("arguments"),
                        JsValue::Object(arguments),
                    );
                    for (i, param) in script.params.iter().enumerate() {
                        let value = args.get(i).cloned().unwrap_or_default();
                        scope::declare(realm, scope, &param.name, value);
                    }
                    scope::hoist(realm, std::slice::from_ref(&script.body), scope);

                    frame.stage = Stage::Running { constructed };
                    return self.descend(
                        realm,
                        frame,
                        Frame::scoped(script.body.cheap_clone(), scope, this),
                    );
                }
            }
        }
    }

    /// Run source text in a child machine whose scope hangs off the caller's.
    ///
    /// The child is stepped to exhaustion here, inside the caller's step, so
    /// nesting is capped by `max_eval_depth`. Non-string arguments are
    /// returned unchanged.
    fn eval_source(&self, realm: &mut Realm, args: &[JsValue]) -> Result<JsValue, JsError> {
        let source = match args.first() {
            None => return Ok(JsValue::Undefined),
            Some(JsValue::String(source)) => source.cheap_clone(),
            Some(other) => return Ok(other.cheap_clone()),
        };
        if realm.eval_depth >= realm.config().max_eval_depth {
            return Err(JsError::range_error("Maximum call stack size exceeded"));
        }
        let program = realm.parse(source.as_str())?;

        let caller_scope = self.current_scope().unwrap_or_else(|| realm.global_scope());
        let scope = realm.create_scope(Some(caller_scope));
        scope::hoist(realm, &program.body, scope);
        debug!(
            statements = program.body.len(),
            depth = self.depth(),
            nesting = realm.eval_depth + 1,
            "spawning nested eval"
        );

        let this = self.this_value(realm);
        let root = Frame::scoped(Rc::new(Node::Program(program)), scope, this);
        let outer_frames = realm.outer_frames;
        realm.eval_depth += 1;
        realm.outer_frames = outer_frames + self.depth();
        let result = run_nested(realm, root);
        realm.eval_depth -= 1;
        realm.outer_frames = outer_frames;
        result
    }
}

fn run_nested(realm: &mut Realm, root: Frame) -> Result<JsValue, JsError> {
    let mut nested = Machine::empty();
    nested.push(realm, root)?;
    while nested.step(realm)? {}
    Ok(nested.completion)
}

/// `new` yields the receiver unless the constructor returned an object
fn construct_result(constructed: Option<JsValue>, result: JsValue) -> JsValue {
    match (constructed, result) {
        (Some(_), result @ JsValue::Object(_)) => result,
        (Some(receiver), _) => receiver,
        (None, result) => result,
    }
}

/// Create a script function from parameter names and body source, the way the
/// `Function` constructor does. Closes over the global scope.
pub(crate) fn compile_function(
    realm: &mut Realm,
    params: &[JsString],
    body: &str,
) -> Result<ObjectId, JsError> {
    let names: Vec<&str> = params.iter().map(JsString::as_str).collect();
    let source = format!("(function({}) {{\n{}\n}})", names.join(","), body);
    let program = realm.parse(&source)?;
    let function = program.body.iter().find_map(|stmt| match stmt.as_ref() {
        Node::ExpressionStatement(stmt) => match stmt.expression.as_ref() {
            Node::FunctionExpression(func) => Some(func.clone()),
            _ => None,
        },
        _ => None,
    });
    match function {
        Some(func) => {
            let global = realm.global_scope();
            Ok(realm.create_function(func, global))
        }
        None => Err(JsError::syntax_error(
            "Function constructor source did not produce a function",
        )),
    }
}
