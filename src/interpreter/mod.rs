//! Step evaluator
//!
//! [`Evaluator`] walks a [`Program`] one micro-step at a time on an explicit
//! continuation stack. A host may stop between any two steps and resume later;
//! no partial step is ever observable.

// Builtin function implementations (split into separate files)
pub mod builtins;

mod call;
mod expressions;
pub mod operators;
mod stack;
mod statements;

pub(crate) use call::compile_function;

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::{Node, Program};
use crate::error::JsError;
use crate::realm::Realm;
use crate::scope;
use crate::value::{CheapClone, JsValue, ObjectId, PropertyKey};

use stack::Machine;

/// Host initialization hook: runs once, before the first step
pub type InitCallback = Box<dyn FnOnce(&mut Evaluator, ObjectId)>;

impl Machine {
    /// Perform one micro-operation. `Ok(false)` when nothing was left to do.
    pub(crate) fn step(&mut self, realm: &mut Realm) -> Result<bool, JsError> {
        let Some(frame) = self.frames.pop() else {
            return Ok(false);
        };
        let node = frame.node.cheap_clone();
        trace!(kind = node.kind(), depth = self.frames.len(), "step");

        match node.as_ref() {
            // Statements
            Node::Program(program) => self.step_statements(realm, frame, &program.body)?,
            Node::BlockStatement(block) => self.step_statements(realm, frame, &block.body)?,
            Node::ExpressionStatement(stmt) => {
                self.step_expression_statement(realm, frame, stmt)?
            }
            Node::VariableDeclaration(decl) => {
                self.step_variable_declaration(realm, frame, decl)?
            }
            Node::VariableDeclarator(decl) => self.step_variable_declarator(realm, frame, decl)?,
            // Hoisted before the body runs
            Node::FunctionDeclaration(_) => {}
            Node::IfStatement(stmt) => self.step_if(realm, frame, stmt)?,
            Node::ForStatement(stmt) => self.step_for(realm, frame, stmt)?,
            Node::ForInStatement(stmt) => self.step_for_in(realm, frame, stmt)?,
            Node::WhileStatement(stmt) => self.step_while(realm, frame, stmt)?,
            Node::DoWhileStatement(stmt) => self.step_do_while(realm, frame, stmt)?,
            Node::BreakStatement(stmt) => self.step_break(stmt)?,
            Node::ContinueStatement(stmt) => self.step_continue(stmt)?,
            Node::ReturnStatement(stmt) => self.step_return(realm, frame, stmt)?,
            Node::ThrowStatement(stmt) => self.step_throw(realm, frame, stmt)?,
            Node::LabeledStatement(stmt) => self.step_labeled(realm, frame, stmt)?,
            Node::EmptyStatement => {}

            // Expressions
            Node::Identifier(ident) => self.step_identifier(realm, frame, ident)?,
            Node::Literal(literal) => self.step_literal(literal)?,
            Node::ThisExpression => self.step_this(realm),
            Node::FunctionExpression(func) => self.step_function_expression(realm, frame, func),
            Node::ArrayExpression(expr) => self.step_array(realm, frame, expr)?,
            Node::ObjectExpression(expr) => self.step_object(realm, frame, expr)?,
            Node::BinaryExpression(expr) => self.step_binary(realm, frame, expr)?,
            Node::LogicalExpression(expr) => self.step_logical(realm, frame, expr)?,
            Node::AssignmentExpression(expr) => self.step_assignment(realm, frame, expr)?,
            Node::UpdateExpression(expr) => self.step_update(realm, frame, expr)?,
            Node::UnaryExpression(expr) => self.step_unary(realm, frame, expr)?,
            Node::ConditionalExpression(expr) => self.step_conditional(realm, frame, expr)?,
            Node::CallExpression(expr) => self.step_call(realm, frame, expr, false)?,
            Node::NewExpression(expr) => self.step_call(realm, frame, expr, true)?,
            Node::MemberExpression(expr) => self.step_member(realm, frame, expr)?,
            Node::SequenceExpression(expr) => {
                self.step_sequence(realm, frame, &expr.expressions)?
            }

            Node::Unsupported => {
                return Err(JsError::syntax_error("Unsupported syntax tree node"));
            }
        }
        Ok(true)
    }
}

/// A pausable evaluator over one program.
///
/// ```
/// use steprun::ast::build::*;
/// use steprun::{Evaluator, JsValue};
///
/// let program = program(vec![
///     var("x", Some(num(1.0))),
///     expr_stmt(binary("+", ident("x"), num(41.0))),
/// ]);
/// let mut evaluator = Evaluator::new(program);
/// while evaluator.step().unwrap() {}
/// assert_eq!(evaluator.completion_value(), JsValue::from(42));
/// ```
pub struct Evaluator {
    realm: Realm,
    machine: Machine,
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("stack_depth", &self.machine.depth())
            .field("completion", &self.machine.completion)
            .field("objects", &self.realm.object_count())
            .finish_non_exhaustive()
    }
}

impl Evaluator {
    /// Evaluate `program` in a fresh realm with the standard library
    pub fn new(program: Program) -> Self {
        Self::with_realm(program, Realm::new(), None)
    }

    /// Like [`Evaluator::new`], letting the host add globals first
    pub fn with_init(
        program: Program,
        init: impl FnOnce(&mut Evaluator, ObjectId) + 'static,
    ) -> Self {
        Self::with_realm(program, Realm::new(), Some(Box::new(init)))
    }

    /// Evaluate `program` in an existing realm.
    ///
    /// Declarations are hoisted into the realm's global scope, then `init`
    /// runs, then the program is seeded onto the stack.
    pub fn with_realm(program: Program, realm: Realm, init: Option<InitCallback>) -> Self {
        let global = realm.global_scope();
        let mut evaluator = Evaluator {
            realm,
            machine: Machine::empty(),
        };
        scope::hoist(&mut evaluator.realm, &program.body, global);
        if let Some(init) = init {
            init(&mut evaluator, global);
        }
        debug!(
            statements = program.body.len(),
            objects = evaluator.realm.object_count(),
            "evaluator created"
        );
        evaluator.machine = Machine::new(
            Rc::new(Node::Program(program)),
            global,
            JsValue::Object(global),
        );
        evaluator
    }

    /// Advance by one micro-step. Returns whether any work remained.
    ///
    /// After an error the stack is discarded; later calls return `Ok(false)`.
    pub fn step(&mut self) -> Result<bool, JsError> {
        match self.machine.step(&mut self.realm) {
            Ok(more) => Ok(more),
            Err(err) => {
                debug!(error = %err, depth = self.machine.depth(), "step failed");
                self.machine.clear();
                Err(err)
            }
        }
    }

    /// Step until no work remains
    pub fn run(&mut self) -> Result<(), JsError> {
        while self.step()? {}
        Ok(())
    }

    /// Innermost scope among the active frames; the global scope when idle
    pub fn current_scope(&self) -> ObjectId {
        self.machine
            .current_scope()
            .unwrap_or_else(|| self.realm.global_scope())
    }

    /// Value of the most recently executed expression statement
    pub fn completion_value(&self) -> JsValue {
        self.machine.completion.cheap_clone()
    }

    pub fn is_done(&self) -> bool {
        !self.machine.has_frames()
    }

    pub fn stack_depth(&self) -> usize {
        self.machine.depth()
    }

    pub fn global_scope(&self) -> ObjectId {
        self.realm.global_scope()
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn realm_mut(&mut self) -> &mut Realm {
        &mut self.realm
    }

    pub fn into_realm(self) -> Realm {
        self.realm
    }

    /// Read a global variable; undefined when it does not exist
    pub fn get_global(&self, name: &str) -> JsValue {
        self.realm.get(self.realm.global_scope(), name)
    }

    /// Create or overwrite a global variable
    pub fn set_global(&mut self, name: &str, value: JsValue) {
        let global = self.realm.global_scope();
        self.realm
            .define_property(global, PropertyKey::from(name), value, false, true);
    }

    /// Expose a host function as a global
    pub fn register_native<F>(&mut self, name: &str, func: F, arity: u32)
    where
        F: Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        let function = self.realm.create_native_function(name, func, arity);
        self.set_global(name, JsValue::Object(function));
    }
}
