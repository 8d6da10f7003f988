//! Continuation stack for suspendable execution
//!
//! Every syntax tree node under evaluation owns one [`Frame`]. A handler either
//! pushes a child frame (descending into a sub-expression) or pops its own frame
//! and writes its result into the value slot of the frame below. Nothing here
//! recurses on the host stack, so script recursion depth is bounded only by the
//! frames vector.

use rustc_hash::FxHashSet;

use crate::ast::{Node, NodeRef};
use crate::error::JsError;
use crate::realm::Realm;
use crate::value::{CheapClone, JsString, JsValue, ObjectId, PropertyKey};

// ═══════════════════════════════════════════════════════════════════════════════
// Stack Types
// ═══════════════════════════════════════════════════════════════════════════════

/// An assignable location produced by evaluating a node in reference mode
#[derive(Debug, Clone)]
pub enum Reference {
    /// Identifier resolved through the scope chain
    Variable(JsString),
    /// `base[key]`
    Property { base: JsValue, key: PropertyKey },
}

/// What a finished child hands to its parent
#[derive(Debug, Clone)]
pub enum Completion {
    Value(JsValue),
    Reference(Reference),
}

impl From<JsValue> for Completion {
    fn from(value: JsValue) -> Self {
        Completion::Value(value)
    }
}

impl From<Reference> for Completion {
    fn from(reference: Reference) -> Self {
        Completion::Reference(reference)
    }
}

/// A call whose callee and receiver are known, collecting arguments
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub func: ObjectId,
    pub this: JsValue,
    /// The receiver object for `new`, returned instead of the call's result
    pub constructed: Option<JsValue>,
    pub args: Vec<JsValue>,
}

/// Enumeration progress of a `for-in` loop
#[derive(Debug, Clone)]
pub struct ForInState {
    pub target: Reference,
    /// Objects still to enumerate, nearest first
    pub chain: Vec<ObjectId>,
    /// Keys queued from the current object, with the object that owns them
    pub queue: Vec<(Option<ObjectId>, PropertyKey)>,
    pub next: usize,
    /// Names seen on objects closer to the start of the chain
    pub seen: FxHashSet<PropertyKey>,
}

/// Progress marker of a frame. Which variants a frame passes through depends
/// on its node kind.
#[derive(Debug, Clone)]
pub enum Stage {
    Start,
    /// Index of the next child in a list
    Next(usize),
    /// Waiting on a single operand
    Operand,
    /// Left operand pending
    Left,
    /// Right operand pending
    Right { left: JsValue },
    LogicalRight,
    AssignValue {
        target: Reference,
        current: Option<JsValue>,
    },
    /// Condition pending
    Test,
    /// Chosen branch or loop body running
    Body,
    ForTest,
    ForBody,
    ForUpdate,
    Elements { array: ObjectId, next: usize },
    Properties { object: ObjectId, next: usize },
    MemberObject,
    MemberProperty { base: JsValue },
    Callee,
    Arguments { call: Box<PendingCall>, next: usize },
    /// Script function body executing above this call frame
    Running { constructed: Option<JsValue> },
    ForInTarget,
    ForInObject { target: Reference },
    ForInIterate(Box<ForInState>),
}

/// A frame on the evaluation stack
#[derive(Debug, Clone)]
pub struct Frame {
    pub node: NodeRef,
    pub stage: Stage,
    /// Result written by the most recently finished child
    pub value: Option<Completion>,
    /// Evaluate to a [`Reference`] rather than a value
    pub reference: bool,
    /// Set on frames that open a scope (program, function body)
    pub scope: Option<ObjectId>,
    pub this_value: Option<JsValue>,
    /// Labels from enclosing labeled statements
    pub labels: Vec<JsString>,
}

impl Frame {
    pub fn new(node: NodeRef) -> Self {
        Frame {
            node,
            stage: Stage::Start,
            value: None,
            reference: false,
            scope: None,
            this_value: None,
            labels: Vec::new(),
        }
    }

    /// A frame whose result is a [`Reference`]
    pub fn reference(node: NodeRef) -> Self {
        Frame {
            reference: true,
            ..Frame::new(node)
        }
    }

    /// A frame that opens `scope` with `this` bound
    pub fn scoped(node: NodeRef, scope: ObjectId, this: JsValue) -> Self {
        Frame {
            scope: Some(scope),
            this_value: Some(this),
            ..Frame::new(node)
        }
    }

    /// Consume the value slot; references and empty slots read as undefined
    pub fn take_value(&mut self) -> JsValue {
        match self.value.take() {
            Some(Completion::Value(value)) => value,
            _ => JsValue::Undefined,
        }
    }

    /// Consume the value slot, which must hold a reference
    pub fn take_reference(&mut self) -> Result<Reference, JsError> {
        match self.value.take() {
            Some(Completion::Reference(reference)) => Ok(reference),
            _ => Err(JsError::syntax_error("Invalid left-hand side in assignment")),
        }
    }

    /// Frames of script function calls waiting for their body
    pub fn is_call_boundary(&self) -> bool {
        matches!(self.stage, Stage::Running { .. })
    }

    pub fn is_loop(&self) -> bool {
        self.node.is_loop()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Execution State
// ═══════════════════════════════════════════════════════════════════════════════

/// A continuation stack plus the value of the last expression statement.
///
/// The top-level evaluator and every nested `eval` each own one; they share
/// the realm.
#[derive(Debug, Clone)]
pub struct Machine {
    pub(crate) frames: Vec<Frame>,
    pub(crate) completion: JsValue,
}

impl Machine {
    /// Seed the stack with a frame for `root` running in `scope`
    pub fn new(root: NodeRef, scope: ObjectId, this: JsValue) -> Self {
        Machine {
            frames: vec![Frame::scoped(root, scope, this)],
            completion: JsValue::Undefined,
        }
    }

    /// A machine with nothing to do
    pub fn empty() -> Self {
        Machine {
            frames: Vec::new(),
            completion: JsValue::Undefined,
        }
    }

    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Push a frame, enforcing the configured depth limit. Frames of the
    /// machines suspended in `eval` beneath this one count too.
    pub(crate) fn push(&mut self, realm: &Realm, frame: Frame) -> Result<(), JsError> {
        let depth = realm.outer_frames + self.frames.len() + 1;
        if !realm.config().stack_depth_allowed(depth) {
            return Err(JsError::range_error("Maximum call stack size exceeded"));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Put a popped frame back, then push `child` above it
    pub(crate) fn descend(
        &mut self,
        realm: &Realm,
        frame: Frame,
        child: Frame,
    ) -> Result<(), JsError> {
        self.frames.push(frame);
        self.push(realm, child)
    }

    /// Put a popped frame back without descending
    pub(crate) fn resume(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Hand a finished frame's result to the frame below
    pub(crate) fn finish(&mut self, completion: impl Into<Completion>) {
        if let Some(parent) = self.frames.last_mut() {
            parent.value = Some(completion.into());
        }
    }

    /// Innermost scope among the active frames
    pub fn current_scope(&self) -> Option<ObjectId> {
        self.frames.iter().rev().find_map(|frame| frame.scope)
    }

    /// Scope for a handler whose own frame is popped
    pub(crate) fn scope_for(&self, frame: &Frame, realm: &Realm) -> ObjectId {
        frame
            .scope
            .or_else(|| self.current_scope())
            .unwrap_or_else(|| realm.global_scope())
    }

    /// `this` of the innermost function or program
    pub(crate) fn this_value(&self, realm: &Realm) -> JsValue {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.this_value.as_ref().map(CheapClone::cheap_clone))
            .unwrap_or(JsValue::Object(realm.global_scope()))
    }

    /// `break`: drop frames up to and including the target
    pub(crate) fn unwind_break(&mut self, label: Option<&JsString>) -> Result<(), JsError> {
        while let Some(frame) = self.frames.pop() {
            let matched = match label {
                Some(label) => frame.labels.contains(label),
                None => frame.is_loop(),
            };
            if matched {
                return Ok(());
            }
            if frame.scope.is_some() {
                break;
            }
        }
        Err(JsError::syntax_error(match label {
            Some(label) => format!("Undefined label '{}'", label),
            None => "Illegal break statement".to_string(),
        }))
    }

    /// `continue`: drop frames above the target loop, which then advances
    pub(crate) fn unwind_continue(&mut self, label: Option<&JsString>) -> Result<(), JsError> {
        while let Some(frame) = self.frames.last() {
            if frame.is_loop() && label.is_none_or(|label| frame.labels.contains(label)) {
                return Ok(());
            }
            if frame.scope.is_some() {
                break;
            }
            self.frames.pop();
        }
        Err(JsError::syntax_error(match label {
            Some(label) => format!("Undefined label '{}'", label),
            None => "Illegal continue statement".to_string(),
        }))
    }

    /// `return`: drop frames down to the calling frame and hand it `value`
    pub(crate) fn unwind_return(&mut self, value: JsValue) -> Result<(), JsError> {
        while let Some(frame) = self.frames.last_mut() {
            if frame.is_call_boundary() {
                frame.value = Some(Completion::Value(value));
                return Ok(());
            }
            if matches!(frame.node.as_ref(), Node::Program(_)) {
                break;
            }
            self.frames.pop();
        }
        Err(JsError::syntax_error("Illegal return statement"))
    }
}
