//! Statement handlers
//!
//! Statements do not hand a value to their parent. Expression statements
//! record theirs as the machine's completion value instead; loops keep their
//! frame on the stack for the whole iteration so `break` and `continue` can
//! find it.

use rustc_hash::FxHashSet;

use super::stack::{ForInState, Frame, Machine, Reference, Stage};
use crate::ast::{
    ExpressionStatement, ForInStatement, ForStatement, IfStatement, JumpStatement,
    LabeledStatement, Node, NodeRef, ReturnStatement, ThrowStatement, VariableDeclaration,
    VariableDeclarator, WhileStatement,
};
use crate::error::JsError;
use crate::realm::Realm;
use crate::scope;
use crate::value::{CheapClone, JsValue, PropertyKey};

impl Machine {
    /// Program and block bodies: run each statement in turn
    pub(super) fn step_statements(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        body: &[NodeRef],
    ) -> Result<(), JsError> {
        let next = match frame.stage {
            Stage::Next(next) => next,
            _ => 0,
        };
        match body.get(next) {
            Some(statement) => {
                frame.stage = Stage::Next(next + 1);
                frame.value = None;
                self.descend(realm, frame, Frame::new(statement.cheap_clone()))
            }
            None => {
                self.finish(JsValue::Undefined);
                Ok(())
            }
        }
    }

    pub(super) fn step_expression_statement(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        stmt: &ExpressionStatement,
    ) -> Result<(), JsError> {
        if matches!(frame.stage, Stage::Operand) {
            self.completion = frame.take_value();
            return Ok(());
        }
        frame.stage = Stage::Operand;
        self.descend(realm, frame, Frame::new(stmt.expression.cheap_clone()))
    }

    pub(super) fn step_variable_declaration(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        decl: &VariableDeclaration,
    ) -> Result<(), JsError> {
        let next = match frame.stage {
            Stage::Next(next) => next,
            _ => 0,
        };
        if let Some(declarator) = decl.declarations.get(next) {
            frame.stage = Stage::Next(next + 1);
            return self.descend(realm, frame, Frame::new(declarator.cheap_clone()));
        }
        Ok(())
    }

    /// The binding was hoisted; only an initializer does anything here
    pub(super) fn step_variable_declarator(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        decl: &VariableDeclarator,
    ) -> Result<(), JsError> {
        let Some(init) = &decl.init else {
            return Ok(());
        };
        if matches!(frame.stage, Stage::Operand) {
            let value = frame.take_value();
            let scope = self.scope_for(&frame, realm);
            return scope::assign(realm, scope, &decl.id.name, value);
        }
        frame.stage = Stage::Operand;
        self.descend(realm, frame, Frame::new(init.cheap_clone()))
    }

    /// The chosen branch replaces the `if` frame, inheriting its labels
    pub(super) fn step_if(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        stmt: &IfStatement,
    ) -> Result<(), JsError> {
        if !matches!(frame.stage, Stage::Test) {
            frame.stage = Stage::Test;
            return self.descend(realm, frame, Frame::new(stmt.test.cheap_clone()));
        }
        let branch = if frame.take_value().to_boolean() {
            Some(&stmt.consequent)
        } else {
            stmt.alternate.as_ref()
        };
        match branch {
            Some(branch) => self.push(
                realm,
                Frame {
                    labels: frame.labels,
                    ..Frame::new(branch.cheap_clone())
                },
            ),
            None => Ok(()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Loops
    // ═══════════════════════════════════════════════════════════════════════

    /// init → test → body → update → test ...
    pub(super) fn step_for(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        stmt: &ForStatement,
    ) -> Result<(), JsError> {
        match frame.stage {
            Stage::ForTest => {
                frame.value = None;
                frame.stage = Stage::ForBody;
                match &stmt.test {
                    Some(test) => self.descend(realm, frame, Frame::new(test.cheap_clone())),
                    None => {
                        self.resume(frame);
                        Ok(())
                    }
                }
            }
            Stage::ForBody => {
                if stmt.test.is_some() && !frame.take_value().to_boolean() {
                    return Ok(());
                }
                frame.stage = Stage::ForUpdate;
                self.descend(realm, frame, Frame::new(stmt.body.cheap_clone()))
            }
            Stage::ForUpdate => {
                frame.stage = Stage::ForTest;
                match &stmt.update {
                    Some(update) => self.descend(realm, frame, Frame::new(update.cheap_clone())),
                    None => {
                        self.resume(frame);
                        Ok(())
                    }
                }
            }
            _ => {
                frame.stage = Stage::ForTest;
                match &stmt.init {
                    Some(init) => self.descend(realm, frame, Frame::new(init.cheap_clone())),
                    None => {
                        self.resume(frame);
                        Ok(())
                    }
                }
            }
        }
    }

    /// test → body → test ...
    pub(super) fn step_while(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        stmt: &WhileStatement,
    ) -> Result<(), JsError> {
        if matches!(frame.stage, Stage::Test) {
            if !frame.take_value().to_boolean() {
                return Ok(());
            }
            frame.stage = Stage::Start;
            return self.descend(realm, frame, Frame::new(stmt.body.cheap_clone()));
        }
        frame.stage = Stage::Test;
        self.descend(realm, frame, Frame::new(stmt.test.cheap_clone()))
    }

    /// body → test → body ...
    pub(super) fn step_do_while(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        stmt: &WhileStatement,
    ) -> Result<(), JsError> {
        match frame.stage {
            Stage::Body => {
                frame.stage = Stage::Test;
                self.descend(realm, frame, Frame::new(stmt.test.cheap_clone()))
            }
            Stage::Test => {
                if !frame.take_value().to_boolean() {
                    return Ok(());
                }
                frame.stage = Stage::Body;
                self.descend(realm, frame, Frame::new(stmt.body.cheap_clone()))
            }
            _ => {
                frame.stage = Stage::Body;
                self.descend(realm, frame, Frame::new(stmt.body.cheap_clone()))
            }
        }
    }

    /// Resolve the loop variable, evaluate the object, then enumerate one
    /// prototype level at a time
    pub(super) fn step_for_in(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        stmt: &ForInStatement,
    ) -> Result<(), JsError> {
        match std::mem::replace(&mut frame.stage, Stage::Start) {
            Stage::ForInTarget => {
                let target = frame.take_reference()?;
                frame.stage = Stage::ForInObject { target };
                self.descend(realm, frame, Frame::new(stmt.right.cheap_clone()))
            }
            Stage::ForInObject { target } => {
                let object = frame.take_value();
                let state = enumeration_start(realm, target, &object);
                self.for_in_next(realm, frame, stmt, state)
            }
            Stage::ForInIterate(state) => self.for_in_next(realm, frame, stmt, state),
            _ => {
                // `for (var k in ..)` names the hoisted variable directly
                let declared = match stmt.left.as_ref() {
                    Node::VariableDeclaration(decl) => {
                        decl.declarations.first().and_then(|d| match d.as_ref() {
                            Node::VariableDeclarator(d) => Some(d.id.name.cheap_clone()),
                            _ => None,
                        })
                    }
                    _ => None,
                };
                match declared {
                    Some(name) => {
                        frame.stage = Stage::ForInObject {
                            target: Reference::Variable(name),
                        };
                        self.descend(realm, frame, Frame::new(stmt.right.cheap_clone()))
                    }
                    None => {
                        frame.stage = Stage::ForInTarget;
                        self.descend(realm, frame, Frame::reference(stmt.left.cheap_clone()))
                    }
                }
            }
        }
    }

    fn for_in_next(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        stmt: &ForInStatement,
        mut state: Box<ForInState>,
    ) -> Result<(), JsError> {
        loop {
            if let Some((owner, key)) = state.queue.get(state.next).cloned() {
                state.next += 1;
                // Deleted during an earlier iteration
                let present = owner.is_none_or(|id| {
                    realm
                        .object(id)
                        .is_some_and(|obj| obj.properties.contains_key(&key))
                });
                if !present {
                    continue;
                }
                self.write_reference(realm, &state.target, JsValue::String(key.to_js_string()))?;
                frame.stage = Stage::ForInIterate(state);
                return self.descend(realm, frame, Frame::new(stmt.body.cheap_clone()));
            }

            let Some(object) = state.chain.pop() else {
                return Ok(());
            };
            state.queue.clear();
            state.next = 0;
            let Some(obj) = realm.object(object) else {
                continue;
            };
            for key in obj.own_keys() {
                if !state.seen.insert(key.clone()) {
                    continue;
                }
                if obj.properties.get(&key).is_some_and(|prop| prop.enumerable) {
                    state.queue.push((Some(object), key));
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Jumps
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn step_labeled(
        &mut self,
        realm: &mut Realm,
        frame: Frame,
        stmt: &LabeledStatement,
    ) -> Result<(), JsError> {
        let mut labels = frame.labels;
        labels.push(stmt.label.name.cheap_clone());
        self.push(
            realm,
            Frame {
                labels,
                ..Frame::new(stmt.body.cheap_clone())
            },
        )
    }

    pub(super) fn step_break(&mut self, stmt: &JumpStatement) -> Result<(), JsError> {
        self.unwind_break(stmt.label.as_ref().map(|label| &label.name))
    }

    pub(super) fn step_continue(&mut self, stmt: &JumpStatement) -> Result<(), JsError> {
        self.unwind_continue(stmt.label.as_ref().map(|label| &label.name))
    }

    pub(super) fn step_return(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        stmt: &ReturnStatement,
    ) -> Result<(), JsError> {
        if matches!(frame.stage, Stage::Operand) {
            let value = frame.take_value();
            return self.unwind_return(value);
        }
        match &stmt.argument {
            Some(argument) => {
                frame.stage = Stage::Operand;
                self.descend(realm, frame, Frame::new(argument.cheap_clone()))
            }
            None => self.unwind_return(JsValue::Undefined),
        }
    }

    /// There is no `try`: a thrown value ends evaluation
    pub(super) fn step_throw(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        stmt: &ThrowStatement,
    ) -> Result<(), JsError> {
        if matches!(frame.stage, Stage::Operand) {
            let value = frame.take_value();
            return Err(JsError::thrown(realm.display(&value), value));
        }
        frame.stage = Stage::Operand;
        self.descend(realm, frame, Frame::new(stmt.argument.cheap_clone()))
    }
}

/// Build the enumeration state for `for (target in object)`
fn enumeration_start(realm: &Realm, target: Reference, object: &JsValue) -> Box<ForInState> {
    let mut state = ForInState {
        target,
        chain: Vec::new(),
        queue: Vec::new(),
        next: 0,
        seen: FxHashSet::default(),
    };
    match object {
        JsValue::String(s) => {
            for index in 0..s.utf16_len() as u32 {
                let key = PropertyKey::from(index);
                state.seen.insert(key.clone());
                state.queue.push((None, key));
            }
            state.chain = realm.prototype_chain(object);
        }
        JsValue::Object(_) => state.chain = realm.prototype_chain(object),
        _ => {}
    }
    // Popped from the back, nearest object first
    state.chain.reverse();
    Box::new(state)
}
